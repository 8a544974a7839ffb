//! Sale business logic - selling miles out of a loyalty program.
//!
//! Mirror image of the purchase flow: the business row and its paired SALE
//! ledger entry (negative amount) are written in one database transaction.
//! Selling more than the current balance is allowed, the resulting negative
//! balance is recorded as-is and logged.

use crate::{
    core::{ledger, report},
    entities::{
        Beneficiary, LoyaltyProgram, Sale, beneficiary,
        enums::{SaleChannel, TransactionType},
        loyalty_program, sale,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::warn;

/// Data for recording a sale.
#[derive(Debug, Clone)]
pub struct CreateSaleData {
    /// Program the miles leave from
    pub loyalty_program_id: i64,
    /// Beneficiary the tickets get issued to, when slot-tracked
    pub beneficiary_id: Option<i64>,
    /// Miles sold (positive)
    pub amount_miles: i64,
    /// Total agreed price, in BRL
    pub total_price_brl: f64,
    /// Where the sale was brokered
    pub sale_channel: SaleChannel,
    /// Business date of the sale
    pub sale_date: NaiveDate,
    /// When the buyer is expected to pay
    pub expected_payment_date: Option<NaiveDate>,
    /// Buyer name for direct sales
    pub customer_name: Option<String>,
    /// Free-form operator notes
    pub notes: Option<String>,
}

/// Data for rewriting a sale. The source program is fixed at creation.
#[derive(Debug, Clone)]
pub struct UpdateSaleData {
    /// Beneficiary the tickets get issued to, when slot-tracked
    pub beneficiary_id: Option<i64>,
    /// Miles sold (positive)
    pub amount_miles: i64,
    /// Total agreed price, in BRL
    pub total_price_brl: f64,
    /// Where the sale was brokered
    pub sale_channel: SaleChannel,
    /// Business date of the sale
    pub sale_date: NaiveDate,
    /// When the buyer is expected to pay
    pub expected_payment_date: Option<NaiveDate>,
    /// Buyer name for direct sales
    pub customer_name: Option<String>,
    /// Free-form operator notes
    pub notes: Option<String>,
}

fn validate_sale_numbers(amount_miles: i64, total_price_brl: f64) -> Result<()> {
    if amount_miles <= 0 {
        return Err(Error::InvalidMiles {
            amount: amount_miles,
        });
    }
    if total_price_brl < 0.0 || !total_price_brl.is_finite() {
        return Err(Error::InvalidMoney {
            amount: total_price_brl,
        });
    }
    Ok(())
}

async fn check_beneficiary<C: ConnectionTrait>(
    conn: &C,
    organization_id: i64,
    beneficiary_id: Option<i64>,
) -> Result<()> {
    if let Some(id) = beneficiary_id {
        Beneficiary::find_by_id(id)
            .filter(beneficiary::Column::OrganizationId.eq(organization_id))
            .one(conn)
            .await?
            .ok_or(Error::BeneficiaryNotFound { id })?;
    }
    Ok(())
}

/// Retrieves all sales in the organization, newest first.
pub async fn get_sales(db: &DatabaseConnection, organization_id: i64) -> Result<Vec<sale::Model>> {
    Sale::find()
        .filter(sale::Column::OrganizationId.eq(organization_id))
        .order_by_desc(sale::Column::SaleDate)
        .order_by_desc(sale::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific sale within the organization.
///
/// # Errors
/// Returns [`Error::SaleNotFound`] when the sale does not exist in the
/// organization.
pub async fn get_sale_by_id(
    db: &DatabaseConnection,
    organization_id: i64,
    sale_id: i64,
) -> Result<sale::Model> {
    Sale::find_by_id(sale_id)
        .filter(sale::Column::OrganizationId.eq(organization_id))
        .one(db)
        .await?
        .ok_or(Error::SaleNotFound { id: sale_id })
}

/// Records a sale and its paired SALE ledger entry atomically.
///
/// The ledger entry carries `-amount_miles` so the balance projection drops
/// by the miles sold. The balance is allowed to go negative; when it does,
/// the sale still commits and a warning is logged so the desk can chase the
/// missing inventory.
///
/// # Errors
/// Returns an error if:
/// - `amount_miles` or `total_price_brl` fail validation
/// - The program (or the beneficiary, when given) is not in the
///   organization
/// - The paired write cannot commit
pub async fn create_sale(
    db: &DatabaseConnection,
    organization_id: i64,
    data: CreateSaleData,
) -> Result<sale::Model> {
    validate_sale_numbers(data.amount_miles, data.total_price_brl)?;

    let txn = db.begin().await?;

    let program = LoyaltyProgram::find_by_id(data.loyalty_program_id)
        .filter(loyalty_program::Column::OrganizationId.eq(organization_id))
        .one(&txn)
        .await?
        .ok_or(Error::ProgramNotFound {
            id: data.loyalty_program_id,
        })?;
    check_beneficiary(&txn, organization_id, data.beneficiary_id).await?;

    let now = chrono::Utc::now();
    let sale_model = sale::ActiveModel {
        organization_id: Set(organization_id),
        loyalty_program_id: Set(program.id),
        beneficiary_id: Set(data.beneficiary_id),
        amount_miles: Set(data.amount_miles),
        price_per_thousand: Set(report::calculate_cpm(
            data.total_price_brl,
            data.amount_miles,
        )),
        total_price_brl: Set(data.total_price_brl),
        sale_channel: Set(data.sale_channel),
        sale_date: Set(data.sale_date),
        expected_payment_date: Set(data.expected_payment_date),
        actual_payment_date: Set(None),
        amount_paid: Set(None),
        customer_name: Set(data.customer_name),
        notes: Set(data.notes.clone()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let created = sale_model.insert(&txn).await?;

    ledger::append(
        &txn,
        organization_id,
        program.id,
        ledger::NewLedgerEntry {
            transaction_type: TransactionType::Sale,
            amount: -data.amount_miles,
            cost_brl: None,
            price_brl: Some(data.total_price_brl),
            transaction_date: data.sale_date,
            notes: Some(data.notes.unwrap_or_else(|| "Venda de milhas".to_string())),
            purchase_id: None,
            sale_id: Some(created.id),
        },
    )
    .await
    .map_err(Error::into_consistency_failure)?;

    let balance = ledger::sum_for_program(&txn, organization_id, program.id).await?;
    if balance < 0 {
        warn!(
            "sale {} drove loyalty program {} balance to {}",
            created.id, program.id, balance
        );
    }

    txn.commit().await?;

    Ok(created)
}

/// Rewrites a sale and amends its paired ledger entry atomically.
///
/// Payment fields (`amount_paid`, `actual_payment_date`) are untouched;
/// use [`record_payment`] for those.
pub async fn update_sale(
    db: &DatabaseConnection,
    organization_id: i64,
    sale_id: i64,
    data: UpdateSaleData,
) -> Result<sale::Model> {
    validate_sale_numbers(data.amount_miles, data.total_price_brl)?;

    let txn = db.begin().await?;

    let existing = Sale::find_by_id(sale_id)
        .filter(sale::Column::OrganizationId.eq(organization_id))
        .one(&txn)
        .await?
        .ok_or(Error::SaleNotFound { id: sale_id })?;
    check_beneficiary(&txn, organization_id, data.beneficiary_id).await?;

    let program_id = existing.loyalty_program_id;
    let mut sale_model: sale::ActiveModel = existing.into();
    sale_model.beneficiary_id = Set(data.beneficiary_id);
    sale_model.amount_miles = Set(data.amount_miles);
    sale_model.price_per_thousand = Set(report::calculate_cpm(
        data.total_price_brl,
        data.amount_miles,
    ));
    sale_model.total_price_brl = Set(data.total_price_brl);
    sale_model.sale_channel = Set(data.sale_channel);
    sale_model.sale_date = Set(data.sale_date);
    sale_model.expected_payment_date = Set(data.expected_payment_date);
    sale_model.customer_name = Set(data.customer_name);
    sale_model.notes = Set(data.notes);
    sale_model.updated_at = Set(chrono::Utc::now());
    let updated = sale_model.update(&txn).await?;

    ledger::amend_for_sale(
        &txn,
        organization_id,
        updated.id,
        -data.amount_miles,
        Some(data.total_price_brl),
        data.sale_date,
    )
    .await
    .map_err(Error::into_consistency_failure)?;

    let balance = ledger::sum_for_program(&txn, organization_id, program_id).await?;
    if balance < 0 {
        warn!(
            "sale {} drove loyalty program {} balance to {}",
            updated.id, program_id, balance
        );
    }

    txn.commit().await?;

    Ok(updated)
}

/// Marks a sale as paid.
///
/// Single-row update, no ledger involvement: payment settles cash, not
/// miles.
pub async fn record_payment(
    db: &DatabaseConnection,
    organization_id: i64,
    sale_id: i64,
    amount_paid: f64,
    paid_date: NaiveDate,
) -> Result<sale::Model> {
    if amount_paid < 0.0 || !amount_paid.is_finite() {
        return Err(Error::InvalidMoney {
            amount: amount_paid,
        });
    }

    let existing = get_sale_by_id(db, organization_id, sale_id).await?;

    let mut sale_model: sale::ActiveModel = existing.into();
    sale_model.amount_paid = Set(Some(amount_paid));
    sale_model.actual_payment_date = Set(Some(paid_date));
    sale_model.updated_at = Set(chrono::Utc::now());
    sale_model.update(db).await.map_err(Into::into)
}

/// Deletes a sale and its paired ledger entry atomically, returning the
/// sold miles to the program balance.
pub async fn delete_sale(db: &DatabaseConnection, organization_id: i64, sale_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let existing = Sale::find_by_id(sale_id)
        .filter(sale::Column::OrganizationId.eq(organization_id))
        .one(&txn)
        .await?
        .ok_or(Error::SaleNotFound { id: sale_id })?;

    ledger::remove_for_sale(&txn, organization_id, existing.id)
        .await
        .map_err(Error::into_consistency_failure)?;

    Sale::delete_by_id(existing.id)
        .exec(&txn)
        .await
        .map_err(|e| Error::Database(e).into_consistency_failure())?;

    txn.commit().await?;

    Ok(())
}
