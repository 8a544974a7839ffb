//! Miles ledger - the append-style log every program balance is projected from.
//!
//! Each entry moves one loyalty program's balance by a signed `amount` and
//! records the money that moved with it. Every mutation in this module
//! re-projects the owning program's `current_balance` before returning,
//! against whatever connection the caller supplies, so a business operation
//! that opens a database transaction gets entry and projection committed
//! together. This module is the only writer of
//! `loyalty_programs.current_balance`; everything else reads it.

use crate::{
    entities::{
        LoyaltyProgram, MilesTransaction, enums::TransactionType, loyalty_program,
        miles_transaction,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::sea_query::Expr;
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};

/// Data for a new ledger entry.
///
/// `purchase_id`/`sale_id` are set only when the entry is created as the
/// ledger half of a business record; standalone entries (adjustments,
/// transfers, expirations) leave both as None.
#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    /// Kind of movement being recorded
    pub transaction_type: TransactionType,
    /// Signed miles amount (positive credits the program)
    pub amount: i64,
    /// Money spent on the movement, in BRL
    pub cost_brl: Option<f64>,
    /// Money received for the movement, in BRL
    pub price_brl: Option<f64>,
    /// Business date of the movement
    pub transaction_date: NaiveDate,
    /// Free-form note shown in statements
    pub notes: Option<String>,
    /// Owning purchase, for paired entries
    pub purchase_id: Option<i64>,
    /// Owning sale, for paired entries
    pub sale_id: Option<i64>,
}

/// Appends an entry to a program's ledger and re-projects its balance.
///
/// The program must exist within the given organization. The entry is not
/// judged here: an amount that drives the projected balance negative is
/// accepted and recorded (policy on overselling lives in the business
/// operations).
///
/// # Errors
/// Returns [`Error::ProgramNotFound`] when the program does not exist in
/// the organization, or a database error if a write fails.
pub async fn append<C: ConnectionTrait>(
    conn: &C,
    organization_id: i64,
    loyalty_program_id: i64,
    entry: NewLedgerEntry,
) -> Result<miles_transaction::Model> {
    let program = LoyaltyProgram::find_by_id(loyalty_program_id)
        .filter(loyalty_program::Column::OrganizationId.eq(organization_id))
        .one(conn)
        .await?
        .ok_or(Error::ProgramNotFound {
            id: loyalty_program_id,
        })?;

    let entry_model = miles_transaction::ActiveModel {
        organization_id: Set(organization_id),
        loyalty_program_id: Set(program.id),
        transaction_type: Set(entry.transaction_type),
        amount: Set(entry.amount),
        cost_brl: Set(entry.cost_brl),
        price_brl: Set(entry.price_brl),
        transaction_date: Set(entry.transaction_date),
        notes: Set(entry.notes),
        purchase_id: Set(entry.purchase_id),
        sale_id: Set(entry.sale_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let inserted = entry_model.insert(conn).await?;
    project_balance(conn, program.id).await?;

    Ok(inserted)
}

/// Rewrites the ledger half of a purchase and re-projects the balance.
///
/// # Errors
/// Returns [`Error::ConsistencyFailure`] when no entry in the organization
/// carries the given `purchase_id`: the pair is already broken and the
/// caller's transaction must not commit.
pub async fn amend_for_purchase<C: ConnectionTrait>(
    conn: &C,
    organization_id: i64,
    purchase_id: i64,
    amount: i64,
    cost_brl: Option<f64>,
    transaction_date: NaiveDate,
) -> Result<miles_transaction::Model> {
    let entry = MilesTransaction::find()
        .filter(miles_transaction::Column::OrganizationId.eq(organization_id))
        .filter(miles_transaction::Column::PurchaseId.eq(purchase_id))
        .one(conn)
        .await?
        .ok_or_else(|| Error::ConsistencyFailure {
            message: format!("no ledger entry paired with purchase {purchase_id}"),
        })?;

    let program_id = entry.loyalty_program_id;
    let mut entry: miles_transaction::ActiveModel = entry.into();
    entry.amount = Set(amount);
    entry.cost_brl = Set(cost_brl);
    entry.transaction_date = Set(transaction_date);
    let updated = entry.update(conn).await?;

    project_balance(conn, program_id).await?;

    Ok(updated)
}

/// Rewrites the ledger half of a sale and re-projects the balance.
///
/// # Errors
/// Returns [`Error::ConsistencyFailure`] when no entry in the organization
/// carries the given `sale_id`.
pub async fn amend_for_sale<C: ConnectionTrait>(
    conn: &C,
    organization_id: i64,
    sale_id: i64,
    amount: i64,
    price_brl: Option<f64>,
    transaction_date: NaiveDate,
) -> Result<miles_transaction::Model> {
    let entry = MilesTransaction::find()
        .filter(miles_transaction::Column::OrganizationId.eq(organization_id))
        .filter(miles_transaction::Column::SaleId.eq(sale_id))
        .one(conn)
        .await?
        .ok_or_else(|| Error::ConsistencyFailure {
            message: format!("no ledger entry paired with sale {sale_id}"),
        })?;

    let program_id = entry.loyalty_program_id;
    let mut entry: miles_transaction::ActiveModel = entry.into();
    entry.amount = Set(amount);
    entry.price_brl = Set(price_brl);
    entry.transaction_date = Set(transaction_date);
    let updated = entry.update(conn).await?;

    project_balance(conn, program_id).await?;

    Ok(updated)
}

/// Removes the ledger half of a purchase and re-projects the balance.
///
/// Business-record deletion removes the ledger half first; the caller
/// deletes the purchase row afterwards in the same transaction.
///
/// # Errors
/// Returns [`Error::ConsistencyFailure`] when no entry in the organization
/// carries the given `purchase_id`.
pub async fn remove_for_purchase<C: ConnectionTrait>(
    conn: &C,
    organization_id: i64,
    purchase_id: i64,
) -> Result<()> {
    let entry = MilesTransaction::find()
        .filter(miles_transaction::Column::OrganizationId.eq(organization_id))
        .filter(miles_transaction::Column::PurchaseId.eq(purchase_id))
        .one(conn)
        .await?
        .ok_or_else(|| Error::ConsistencyFailure {
            message: format!("no ledger entry paired with purchase {purchase_id}"),
        })?;

    let program_id = entry.loyalty_program_id;
    entry.delete(conn).await?;

    project_balance(conn, program_id).await?;

    Ok(())
}

/// Removes the ledger half of a sale and re-projects the balance.
///
/// # Errors
/// Returns [`Error::ConsistencyFailure`] when no entry in the organization
/// carries the given `sale_id`.
pub async fn remove_for_sale<C: ConnectionTrait>(
    conn: &C,
    organization_id: i64,
    sale_id: i64,
) -> Result<()> {
    let entry = MilesTransaction::find()
        .filter(miles_transaction::Column::OrganizationId.eq(organization_id))
        .filter(miles_transaction::Column::SaleId.eq(sale_id))
        .one(conn)
        .await?
        .ok_or_else(|| Error::ConsistencyFailure {
            message: format!("no ledger entry paired with sale {sale_id}"),
        })?;

    let program_id = entry.loyalty_program_id;
    entry.delete(conn).await?;

    project_balance(conn, program_id).await?;

    Ok(())
}

/// Signed sum of a program's ledger entries; 0 for an empty ledger or a
/// program outside the organization.
pub async fn sum_for_program<C: ConnectionTrait>(
    conn: &C,
    organization_id: i64,
    loyalty_program_id: i64,
) -> Result<i64> {
    let total: Option<Option<i64>> = MilesTransaction::find()
        .select_only()
        .column_as(miles_transaction::Column::Amount.sum(), "total")
        .filter(miles_transaction::Column::OrganizationId.eq(organization_id))
        .filter(miles_transaction::Column::LoyaltyProgramId.eq(loyalty_program_id))
        .into_tuple()
        .one(conn)
        .await?;

    Ok(total.flatten().unwrap_or(0))
}

/// Lists a program's ledger entries, newest business date first, with an
/// optional entry-kind filter.
pub async fn entries_for_program(
    db: &DatabaseConnection,
    organization_id: i64,
    loyalty_program_id: i64,
    transaction_type: Option<TransactionType>,
) -> Result<Vec<miles_transaction::Model>> {
    let mut query = MilesTransaction::find()
        .filter(miles_transaction::Column::OrganizationId.eq(organization_id))
        .filter(miles_transaction::Column::LoyaltyProgramId.eq(loyalty_program_id));

    if let Some(kind) = transaction_type {
        query = query.filter(miles_transaction::Column::TransactionType.eq(kind));
    }

    query
        .order_by_desc(miles_transaction::Column::TransactionDate)
        .order_by_desc(miles_transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Writes the current ledger sum into the program's `current_balance`.
///
/// Every mutating function above calls this before returning, so within
/// one database transaction the projection can never drift from the
/// entries it summarizes. Runs unscoped: the program id was already
/// resolved inside the caller's organization, and the projection must
/// cover every entry the program has.
async fn project_balance<C: ConnectionTrait>(conn: &C, loyalty_program_id: i64) -> Result<i64> {
    let total: Option<Option<i64>> = MilesTransaction::find()
        .select_only()
        .column_as(miles_transaction::Column::Amount.sum(), "total")
        .filter(miles_transaction::Column::LoyaltyProgramId.eq(loyalty_program_id))
        .into_tuple()
        .one(conn)
        .await?;
    let total = total.flatten().unwrap_or(0);

    LoyaltyProgram::update_many()
        .col_expr(loyalty_program::Column::CurrentBalance, Expr::value(total))
        .filter(loyalty_program::Column::Id.eq(loyalty_program_id))
        .exec(conn)
        .await?;

    Ok(total)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    fn adjustment(amount: i64, day: u32) -> NewLedgerEntry {
        NewLedgerEntry {
            transaction_type: TransactionType::Adjustment,
            amount,
            cost_brl: None,
            price_brl: None,
            transaction_date: date(2025, 3, day),
            notes: None,
            purchase_id: None,
            sale_id: None,
        }
    }

    #[tokio::test]
    async fn test_append_creates_entry_and_projects_balance() -> Result<()> {
        let (db, org, _account, program) = setup_with_program().await?;

        let entry = append(&db, org.id, program.id, adjustment(10_000, 1)).await?;
        assert_eq!(entry.loyalty_program_id, program.id);
        assert_eq!(entry.amount, 10_000);
        assert_eq!(entry.transaction_type, TransactionType::Adjustment);

        let program = LoyaltyProgram::find_by_id(program.id)
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(program.current_balance, 10_000);

        Ok(())
    }

    #[tokio::test]
    async fn test_append_unknown_program() -> Result<()> {
        let (db, org, _account, _program) = setup_with_program().await?;

        let result = append(&db, org.id, 999, adjustment(1_000, 1)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::ProgramNotFound { id: 999 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_append_is_scoped_to_organization() -> Result<()> {
        let (db, org, _account, program) = setup_with_program().await?;

        // Same program id, wrong organization: must read as not found
        let result = append(&db, org.id + 1, program.id, adjustment(1_000, 1)).await;
        assert!(matches!(result.unwrap_err(), Error::ProgramNotFound { .. }));

        // And nothing was written
        let entries = entries_for_program(&db, org.id, program.id, None).await?;
        assert!(entries.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_balance_equals_sum_after_mixed_entries() -> Result<()> {
        let (db, org, _account, program) = setup_with_program().await?;

        append(&db, org.id, program.id, adjustment(50_000, 1)).await?;
        append(&db, org.id, program.id, adjustment(-30_000, 2)).await?;
        append(&db, org.id, program.id, adjustment(5_000, 3)).await?;

        let total = sum_for_program(&db, org.id, program.id).await?;
        assert_eq!(total, 25_000);

        let program = LoyaltyProgram::find_by_id(program.id)
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(program.current_balance, total);

        Ok(())
    }

    #[tokio::test]
    async fn test_append_allows_negative_balance() -> Result<()> {
        let (db, org, _account, program) = setup_with_program().await?;

        append(&db, org.id, program.id, adjustment(-5_000, 1)).await?;

        let program = LoyaltyProgram::find_by_id(program.id)
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(program.current_balance, -5_000);

        Ok(())
    }

    #[tokio::test]
    async fn test_sum_for_program_empty_ledger() -> Result<()> {
        let (db, org, _account, program) = setup_with_program().await?;
        assert_eq!(sum_for_program(&db, org.id, program.id).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_amend_for_purchase_reprojects() -> Result<()> {
        let (db, org, _account, program) = setup_with_program().await?;

        let bought = create_test_purchase(&db, org.id, &program, 40_000, 600.0).await?;

        let updated =
            amend_for_purchase(&db, org.id, bought.id, 45_000, Some(700.0), date(2025, 3, 2))
                .await?;
        assert_eq!(updated.amount, 45_000);
        assert_eq!(updated.cost_brl, Some(700.0));
        assert_eq!(updated.transaction_date, date(2025, 3, 2));

        let program = LoyaltyProgram::find_by_id(program.id)
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(program.current_balance, 45_000);

        Ok(())
    }

    #[tokio::test]
    async fn test_amend_missing_pair_is_consistency_failure() -> Result<()> {
        let (db, org, _account, _program) = setup_with_program().await?;

        let result = amend_for_purchase(&db, org.id, 12345, 1_000, None, date(2025, 3, 1)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::ConsistencyFailure { .. }
        ));

        let result = amend_for_sale(&db, org.id, 12345, -1_000, None, date(2025, 3, 1)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::ConsistencyFailure { .. }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_pair_operations_scoped_to_organization() -> Result<()> {
        let (db, org, _account, program) = setup_with_program().await?;
        let bought = create_test_purchase(&db, org.id, &program, 40_000, 600.0).await?;

        // A foreign organization cannot see the pair, let alone touch it
        let result =
            amend_for_purchase(&db, org.id + 1, bought.id, 1_000, None, date(2025, 3, 2)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::ConsistencyFailure { .. }
        ));

        let result = remove_for_purchase(&db, org.id + 1, bought.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::ConsistencyFailure { .. }
        ));

        // Its ledger reads as empty from outside
        assert_eq!(sum_for_program(&db, org.id + 1, program.id).await?, 0);

        // The pair is untouched in its own organization
        assert_eq!(sum_for_program(&db, org.id, program.id).await?, 40_000);
        let entries = entries_for_program(&db, org.id, program.id, None).await?;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].amount, 40_000);

        Ok(())
    }

    #[tokio::test]
    async fn test_remove_for_sale_reprojects() -> Result<()> {
        let (db, org, _account, program) = setup_with_program().await?;

        append(&db, org.id, program.id, adjustment(50_000, 1)).await?;
        let sold = create_test_sale(&db, org.id, program.id, 30_000, 450.0).await?;

        let program_row = LoyaltyProgram::find_by_id(program.id)
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(program_row.current_balance, 20_000);

        remove_for_sale(&db, org.id, sold.id).await?;

        let program_row = LoyaltyProgram::find_by_id(program.id)
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(program_row.current_balance, 50_000);

        Ok(())
    }

    #[tokio::test]
    async fn test_remove_missing_pair_is_consistency_failure() -> Result<()> {
        let (db, org, _account, _program) = setup_with_program().await?;

        let result = remove_for_purchase(&db, org.id, 4242).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::ConsistencyFailure { .. }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_entries_for_program_filter_and_order() -> Result<()> {
        let (db, org, _account, program) = setup_with_program().await?;

        let mut transfer_in = adjustment(40_000, 1);
        transfer_in.transaction_type = TransactionType::TransferIn;
        append(&db, org.id, program.id, transfer_in).await?;

        let mut transfer_out = adjustment(-10_000, 3);
        transfer_out.transaction_type = TransactionType::TransferOut;
        append(&db, org.id, program.id, transfer_out).await?;

        append(&db, org.id, program.id, adjustment(2_000, 2)).await?;

        let all = entries_for_program(&db, org.id, program.id, None).await?;
        assert_eq!(all.len(), 3);
        // Newest business date first
        assert_eq!(all[0].transaction_date, date(2025, 3, 3));
        assert_eq!(all[2].transaction_date, date(2025, 3, 1));

        let transfers_in =
            entries_for_program(&db, org.id, program.id, Some(TransactionType::TransferIn)).await?;
        assert_eq!(transfers_in.len(), 1);
        assert_eq!(transfers_in[0].amount, 40_000);

        Ok(())
    }
}
