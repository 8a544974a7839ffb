//! Analytics and cash-flow projection.
//!
//! Read-side only: everything here derives from committed rows. Pricing
//! assumptions and the current date come in as explicit parameters so the
//! numbers are reproducible.

use crate::{
    config::pricing::PricingConfig,
    core::{ledger, program, purchase, sale},
    entities::{
        enums::{ProgramType, TransactionType},
        loyalty_program,
    },
    errors::Result,
};
use chrono::{Datelike, Months, NaiveDate};
use sea_orm::DatabaseConnection;

// Cast safety: mile counts stay far below 2^53, f64 holds them exactly.
#[allow(clippy::cast_precision_loss)]
fn miles_as_f64(miles: i64) -> f64 {
    miles as f64
}

/// Cost per thousand miles. The desk's core unit price.
///
/// # Returns
/// `total_cost_brl / miles × 1000`, or 0.0 for zero miles.
#[must_use]
pub fn calculate_cpm(total_cost_brl: f64, miles: i64) -> f64 {
    if miles == 0 {
        return 0.0;
    }

    total_cost_brl / miles_as_f64(miles) * 1000.0
}

/// Profit of a sale against the cost of the miles sold.
#[must_use]
pub fn calculate_profit(sale_value_brl: f64, cost_brl: f64) -> f64 {
    sale_value_brl - cost_brl
}

/// Profit as a percentage of cost; 0.0 when the cost is zero.
#[must_use]
pub fn calculate_profit_margin(sale_value_brl: f64, cost_brl: f64) -> f64 {
    if cost_brl == 0.0 {
        return 0.0;
    }

    (sale_value_brl - cost_brl) / cost_brl * 100.0
}

/// What a program's balance would fetch if liquidated today.
///
/// With purchase history the desk marks its own average cost up by
/// `markup_factor`; without it (or with a zero or negative balance) the
/// configured market rate for the program decides.
#[must_use]
pub fn expected_program_value(
    program_type: ProgramType,
    balance: i64,
    avg_cpm: f64,
    pricing: &PricingConfig,
) -> f64 {
    if balance > 0 && avg_cpm > 0.0 {
        avg_cpm / 1000.0 * miles_as_f64(balance) * pricing.markup_factor
    } else {
        miles_as_f64(balance) * pricing.rate_per_mile(program_type)
    }
}

/// Position of one loyalty program within the inventory.
#[derive(Debug, Clone)]
pub struct ProgramStats {
    /// The program being reported on
    pub program: loyalty_program::Model,
    /// Miles ever bought into the program (PURCHASE entries)
    pub purchased_miles: i64,
    /// Money spent on those miles, in BRL
    pub total_invested: f64,
    /// Average cost per thousand of the purchased miles
    pub avg_cpm: f64,
    /// Estimated liquidation value of the current balance
    pub expected_value: f64,
}

/// Whole-inventory snapshot across every program in the organization.
#[derive(Debug, Clone)]
pub struct InventoryStats {
    /// Sum of all current balances
    pub total_miles: i64,
    /// Sum of all purchase spending, in BRL
    pub total_invested: f64,
    /// Weighted average cost per thousand across all purchased miles
    pub avg_cpm: f64,
    /// Sum of per-program expected liquidation values
    pub expected_value: f64,
    /// Programs whose balance has gone negative (oversold)
    pub negative_balance_programs: Vec<i64>,
    /// Per-program breakdown, in program listing order
    pub programs: Vec<ProgramStats>,
}

/// Builds the inventory snapshot for an organization.
///
/// Average CPM is computed from PURCHASE ledger entries only, so sales,
/// adjustments, and transfers never move it. Programs with negative
/// balances are flagged, not hidden; their expected value is whatever the
/// fallback rate says the hole is worth.
pub async fn inventory_stats(
    db: &DatabaseConnection,
    organization_id: i64,
    pricing: &PricingConfig,
) -> Result<InventoryStats> {
    let programs = program::get_programs(db, organization_id).await?;

    let mut stats = InventoryStats {
        total_miles: 0,
        total_invested: 0.0,
        avg_cpm: 0.0,
        expected_value: 0.0,
        negative_balance_programs: Vec::new(),
        programs: Vec::with_capacity(programs.len()),
    };
    let mut total_purchased_miles: i64 = 0;

    for program in programs {
        let purchases = ledger::entries_for_program(
            db,
            organization_id,
            program.id,
            Some(TransactionType::Purchase),
        )
        .await?;

        let purchased_miles: i64 = purchases.iter().map(|e| e.amount).sum();
        let invested: f64 = purchases.iter().filter_map(|e| e.cost_brl).sum();
        let avg_cpm = calculate_cpm(invested, purchased_miles);
        let expected = expected_program_value(
            program.program_type,
            program.current_balance,
            avg_cpm,
            pricing,
        );

        stats.total_miles += program.current_balance;
        stats.total_invested += invested;
        stats.expected_value += expected;
        total_purchased_miles += purchased_miles;
        if program.current_balance < 0 {
            stats.negative_balance_programs.push(program.id);
        }

        stats.programs.push(ProgramStats {
            program,
            purchased_miles,
            total_invested: invested,
            avg_cpm,
            expected_value: expected,
        });
    }

    stats.avg_cpm = calculate_cpm(stats.total_invested, total_purchased_miles);

    Ok(stats)
}

/// Direction of a projected cash movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CashFlowKind {
    /// Money coming in (sales)
    Income,
    /// Money going out (purchase installments)
    Expense,
}

/// Settlement state of a projected cash movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CashFlowStatus {
    /// Already settled
    Paid,
    /// Due in the future
    Pending,
    /// Due date passed without payment
    Overdue,
}

/// One dated movement in the projected cash flow.
#[derive(Debug, Clone)]
pub struct CashFlowItem {
    /// Due or settlement date
    pub date: NaiveDate,
    /// Direction of the movement
    pub kind: CashFlowKind,
    /// Unsigned amount, in BRL
    pub amount: f64,
    /// Human-readable line for statements
    pub description: String,
    /// Statement grouping
    pub category: String,
    /// Settlement state as of the projection date
    pub status: CashFlowStatus,
}

/// Month-period totals derived from a cash-flow projection.
#[derive(Debug, Clone)]
pub struct CashFlowSummary {
    /// Net of everything already paid
    pub realized_balance: f64,
    /// Income falling in the projection month, any status
    pub month_income: f64,
    /// Expenses falling in the projection month, any status
    pub month_expenses: f64,
    /// Income falling in the following month
    pub next_month_income: f64,
    /// Expenses falling in the following month
    pub next_month_expenses: f64,
    /// Realized balance plus unsettled items through end of next month
    pub projected_balance: f64,
}

/// Steps a date forward by whole months, clamping the day at short
/// months (Jan 31 + 1 month = Feb 28).
#[must_use]
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months)).unwrap_or(date)
}

fn signed_amount(item: &CashFlowItem) -> f64 {
    match item.kind {
        CashFlowKind::Income => item.amount,
        CashFlowKind::Expense => -item.amount,
    }
}

fn in_month(date: NaiveDate, anchor: NaiveDate) -> bool {
    date.year() == anchor.year() && date.month() == anchor.month()
}

/// Projects the organization's cash flow from its purchases and sales.
///
/// Each purchase with a `first_due_date` contributes one EXPENSE item per
/// installment, stepping monthly from that date; installments already due
/// count as paid. Each sale with a payment date contributes one INCOME
/// item, overdue when the expected date passed without payment. Sales
/// with no payment date at all are not cash flow yet and contribute
/// nothing. Items come back sorted by date.
pub async fn project_cash_flow(
    db: &DatabaseConnection,
    organization_id: i64,
    today: NaiveDate,
) -> Result<Vec<CashFlowItem>> {
    let purchases = purchase::get_purchases(db, organization_id).await?;
    let sales = sale::get_sales(db, organization_id).await?;

    let mut items = Vec::new();

    for purchase in purchases {
        let Some(first_due) = purchase.first_due_date else {
            continue;
        };
        let per_installment = purchase
            .installment_amount
            .unwrap_or(purchase.total_cost_brl);
        let installment_count = u32::try_from(purchase.installments).unwrap_or(1);

        for seq in 0..installment_count {
            let due = add_months(first_due, seq);
            let status = if due < today {
                CashFlowStatus::Paid
            } else {
                CashFlowStatus::Pending
            };
            items.push(CashFlowItem {
                date: due,
                kind: CashFlowKind::Expense,
                amount: per_installment,
                description: format!(
                    "Parcela {}/{} - Compra {} milhas",
                    seq + 1,
                    purchase.installments,
                    purchase.amount_miles
                ),
                category: "Compra de Milhas".to_string(),
                status,
            });
        }
    }

    for sale in sales {
        let Some(date) = sale.actual_payment_date.or(sale.expected_payment_date) else {
            continue;
        };
        let status = if sale.actual_payment_date.is_some() {
            CashFlowStatus::Paid
        } else if date < today {
            CashFlowStatus::Overdue
        } else {
            CashFlowStatus::Pending
        };
        items.push(CashFlowItem {
            date,
            kind: CashFlowKind::Income,
            amount: sale.amount_paid.unwrap_or(sale.total_price_brl),
            description: format!(
                "Venda {} milhas - {}",
                sale.amount_miles, sale.sale_channel
            ),
            category: "Venda de Milhas".to_string(),
            status,
        });
    }

    items.sort_by_key(|item| item.date);

    Ok(items)
}

/// Net of the PAID items dated strictly before `up_to`.
#[must_use]
pub fn running_balance(items: &[CashFlowItem], up_to: NaiveDate) -> f64 {
    items
        .iter()
        .filter(|item| item.status == CashFlowStatus::Paid && item.date < up_to)
        .map(signed_amount)
        .sum()
}

/// Condenses a projection into the desk's snapshot numbers.
///
/// The projected balance assumes every pending and overdue item dated in
/// the current or following month settles at face value.
#[must_use]
pub fn summarize_cash_flow(items: &[CashFlowItem], today: NaiveDate) -> CashFlowSummary {
    let next_month = add_months(today, 1);

    let mut summary = CashFlowSummary {
        realized_balance: 0.0,
        month_income: 0.0,
        month_expenses: 0.0,
        next_month_income: 0.0,
        next_month_expenses: 0.0,
        projected_balance: 0.0,
    };

    for item in items {
        let signed = signed_amount(item);
        if item.status == CashFlowStatus::Paid {
            summary.realized_balance += signed;
        }

        if in_month(item.date, today) {
            match item.kind {
                CashFlowKind::Income => summary.month_income += item.amount,
                CashFlowKind::Expense => summary.month_expenses += item.amount,
            }
        } else if in_month(item.date, next_month) {
            match item.kind {
                CashFlowKind::Income => summary.next_month_income += item.amount,
                CashFlowKind::Expense => summary.next_month_expenses += item.amount,
            }
        }

        if item.status != CashFlowStatus::Paid
            && (in_month(item.date, today) || in_month(item.date, next_month))
        {
            summary.projected_balance += signed;
        }
    }

    summary.projected_balance += summary.realized_balance;

    summary
}

fn group_thousands(value: i64) -> String {
    let digits = value.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Formats an amount in BRL, pt-BR style: `R$ 1.234,56`.
#[must_use]
pub fn format_brl(value: f64) -> String {
    // Cast safety: rounded centavo totals fit i64 for any realistic amount.
    #[allow(clippy::cast_possible_truncation)]
    let total_cents = (value * 100.0).round() as i64;
    let reais = (total_cents / 100).abs();
    let cents = (total_cents % 100).abs();
    let sign = if total_cents < 0 { "-" } else { "" };

    format!("{sign}R$ {},{cents:02}", group_thousands(reais))
}

/// Formats a mile count with pt-BR thousand separators: `50.000`.
#[must_use]
pub fn format_miles(miles: i64) -> String {
    group_thousands(miles)
}
