//! Purchase business logic - buying miles into a loyalty program.
//!
//! A purchase is one atomic unit: the business row and its paired PURCHASE
//! ledger entry are written inside a single database transaction, and the
//! ledger's projector updates the program balance before that transaction
//! commits. Deletion dismantles the pair in the opposite order, ledger
//! half first.

use crate::{
    core::{ledger, report},
    entities::{
        LoyaltyProgram, ManagedAccount, Purchase, enums::TransactionType, loyalty_program,
        managed_account, purchase,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};

/// Data for recording a purchase.
#[derive(Debug, Clone)]
pub struct CreatePurchaseData {
    /// Managed account the miles were bought for
    pub managed_account_id: i64,
    /// Program the miles land in; must belong to the account
    pub loyalty_program_id: i64,
    /// Miles bought (positive)
    pub amount_miles: i64,
    /// Total paid, in BRL
    pub total_cost_brl: f64,
    /// Business date of the purchase
    pub purchase_date: NaiveDate,
    /// Number of installments the payment was split into (>= 1)
    pub installments: i32,
    /// Due date of the first installment, when financed
    pub first_due_date: Option<NaiveDate>,
    /// Card the purchase was paid with, when tracked
    pub credit_card_id: Option<i64>,
    /// Free-form operator notes
    pub notes: Option<String>,
}

/// Data for rewriting a purchase. The owning account and program are fixed
/// at creation and cannot be moved.
#[derive(Debug, Clone)]
pub struct UpdatePurchaseData {
    /// Miles bought (positive)
    pub amount_miles: i64,
    /// Total paid, in BRL
    pub total_cost_brl: f64,
    /// Business date of the purchase
    pub purchase_date: NaiveDate,
    /// Number of installments the payment was split into (>= 1)
    pub installments: i32,
    /// Due date of the first installment, when financed
    pub first_due_date: Option<NaiveDate>,
    /// Card the purchase was paid with, when tracked
    pub credit_card_id: Option<i64>,
    /// Free-form operator notes
    pub notes: Option<String>,
}

fn validate_purchase_numbers(
    amount_miles: i64,
    total_cost_brl: f64,
    installments: i32,
) -> Result<()> {
    if amount_miles <= 0 {
        return Err(Error::InvalidMiles {
            amount: amount_miles,
        });
    }
    if total_cost_brl < 0.0 || !total_cost_brl.is_finite() {
        return Err(Error::InvalidMoney {
            amount: total_cost_brl,
        });
    }
    if installments < 1 {
        return Err(Error::InvalidInstallments {
            count: installments,
        });
    }
    Ok(())
}

fn installment_amount(total_cost_brl: f64, installments: i32) -> Option<f64> {
    if installments > 1 {
        Some(total_cost_brl / f64::from(installments))
    } else {
        None
    }
}

/// Retrieves all purchases in the organization, newest first.
pub async fn get_purchases(
    db: &DatabaseConnection,
    organization_id: i64,
) -> Result<Vec<purchase::Model>> {
    Purchase::find()
        .filter(purchase::Column::OrganizationId.eq(organization_id))
        .order_by_desc(purchase::Column::PurchaseDate)
        .order_by_desc(purchase::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific purchase within the organization.
///
/// # Errors
/// Returns [`Error::PurchaseNotFound`] when the purchase does not exist in
/// the organization.
pub async fn get_purchase_by_id(
    db: &DatabaseConnection,
    organization_id: i64,
    purchase_id: i64,
) -> Result<purchase::Model> {
    Purchase::find_by_id(purchase_id)
        .filter(purchase::Column::OrganizationId.eq(organization_id))
        .one(db)
        .await?
        .ok_or(Error::PurchaseNotFound { id: purchase_id })
}

/// Records a purchase and its paired PURCHASE ledger entry atomically.
///
/// Validation runs before anything is written. The business row and the
/// ledger entry (amount `+amount_miles`, cost `total_cost_brl`) commit
/// together or not at all; a storage failure between the two writes rolls
/// the whole operation back and surfaces as
/// [`Error::ConsistencyFailure`].
///
/// # Errors
/// Returns an error if:
/// - `amount_miles`, `total_cost_brl`, or `installments` fail validation
/// - The account or program is not in the organization, or the program is
///   held by a different account
/// - The paired write cannot commit
pub async fn create_purchase(
    db: &DatabaseConnection,
    organization_id: i64,
    data: CreatePurchaseData,
) -> Result<purchase::Model> {
    validate_purchase_numbers(data.amount_miles, data.total_cost_brl, data.installments)?;

    let txn = db.begin().await?;

    ManagedAccount::find_by_id(data.managed_account_id)
        .filter(managed_account::Column::OrganizationId.eq(organization_id))
        .one(&txn)
        .await?
        .ok_or(Error::AccountNotFound {
            id: data.managed_account_id,
        })?;

    let program = LoyaltyProgram::find_by_id(data.loyalty_program_id)
        .filter(loyalty_program::Column::OrganizationId.eq(organization_id))
        .one(&txn)
        .await?
        .ok_or(Error::ProgramNotFound {
            id: data.loyalty_program_id,
        })?;
    if program.managed_account_id != data.managed_account_id {
        return Err(Error::ProgramAccountMismatch {
            program_id: program.id,
            account_id: data.managed_account_id,
        });
    }

    let now = chrono::Utc::now();
    let purchase_model = purchase::ActiveModel {
        organization_id: Set(organization_id),
        managed_account_id: Set(data.managed_account_id),
        loyalty_program_id: Set(program.id),
        amount_miles: Set(data.amount_miles),
        total_cost_brl: Set(data.total_cost_brl),
        cost_per_thousand: Set(report::calculate_cpm(data.total_cost_brl, data.amount_miles)),
        purchase_date: Set(data.purchase_date),
        installments: Set(data.installments),
        installment_amount: Set(installment_amount(data.total_cost_brl, data.installments)),
        first_due_date: Set(data.first_due_date),
        credit_card_id: Set(data.credit_card_id),
        notes: Set(data.notes.clone()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let created = purchase_model.insert(&txn).await?;

    ledger::append(
        &txn,
        organization_id,
        program.id,
        ledger::NewLedgerEntry {
            transaction_type: TransactionType::Purchase,
            amount: data.amount_miles,
            cost_brl: Some(data.total_cost_brl),
            price_brl: None,
            transaction_date: data.purchase_date,
            notes: Some(
                data.notes
                    .unwrap_or_else(|| "Compra de milhas".to_string()),
            ),
            purchase_id: Some(created.id),
            sale_id: None,
        },
    )
    .await
    .map_err(Error::into_consistency_failure)?;

    txn.commit().await?;

    Ok(created)
}

/// Rewrites a purchase and amends its paired ledger entry atomically.
///
/// Derived fields (`cost_per_thousand`, `installment_amount`) are
/// recomputed from the new values; the ledger half follows the new miles,
/// cost, and date.
pub async fn update_purchase(
    db: &DatabaseConnection,
    organization_id: i64,
    purchase_id: i64,
    data: UpdatePurchaseData,
) -> Result<purchase::Model> {
    validate_purchase_numbers(data.amount_miles, data.total_cost_brl, data.installments)?;

    let txn = db.begin().await?;

    let existing = Purchase::find_by_id(purchase_id)
        .filter(purchase::Column::OrganizationId.eq(organization_id))
        .one(&txn)
        .await?
        .ok_or(Error::PurchaseNotFound { id: purchase_id })?;

    let mut purchase_model: purchase::ActiveModel = existing.into();
    purchase_model.amount_miles = Set(data.amount_miles);
    purchase_model.total_cost_brl = Set(data.total_cost_brl);
    purchase_model.cost_per_thousand = Set(report::calculate_cpm(
        data.total_cost_brl,
        data.amount_miles,
    ));
    purchase_model.purchase_date = Set(data.purchase_date);
    purchase_model.installments = Set(data.installments);
    purchase_model.installment_amount =
        Set(installment_amount(data.total_cost_brl, data.installments));
    purchase_model.first_due_date = Set(data.first_due_date);
    purchase_model.credit_card_id = Set(data.credit_card_id);
    purchase_model.notes = Set(data.notes);
    purchase_model.updated_at = Set(chrono::Utc::now());
    let updated = purchase_model.update(&txn).await?;

    ledger::amend_for_purchase(
        &txn,
        organization_id,
        updated.id,
        data.amount_miles,
        Some(data.total_cost_brl),
        data.purchase_date,
    )
    .await
    .map_err(Error::into_consistency_failure)?;

    txn.commit().await?;

    Ok(updated)
}

/// Deletes a purchase and its paired ledger entry atomically.
///
/// The ledger half goes first; only then is the business row removed. A
/// purchase whose paired entry is already missing is a broken pair and
/// surfaces as [`Error::ConsistencyFailure`] without deleting anything.
pub async fn delete_purchase(
    db: &DatabaseConnection,
    organization_id: i64,
    purchase_id: i64,
) -> Result<()> {
    let txn = db.begin().await?;

    let existing = Purchase::find_by_id(purchase_id)
        .filter(purchase::Column::OrganizationId.eq(organization_id))
        .one(&txn)
        .await?
        .ok_or(Error::PurchaseNotFound { id: purchase_id })?;

    ledger::remove_for_purchase(&txn, organization_id, existing.id)
        .await
        .map_err(Error::into_consistency_failure)?;

    Purchase::delete_by_id(existing.id)
        .exec(&txn)
        .await
        .map_err(|e| Error::Database(e).into_consistency_failure())?;

    txn.commit().await?;

    Ok(())
}
