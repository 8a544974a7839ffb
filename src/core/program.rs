//! Loyalty program business logic.
//!
//! Programs are the accounts miles live in: one row per managed account
//! and program type. Balances are never written here; creation seeds the
//! ledger with an initial adjustment entry and `adjust_balance` appends
//! further ones, leaving `current_balance` to the ledger's projector.

use crate::{
    core::ledger::{self, NewLedgerEntry},
    entities::{
        LoyaltyProgram, ManagedAccount, MilesTransaction, Purchase, Sale,
        enums::{ProgramType, TransactionType},
        loyalty_program, managed_account, miles_transaction, purchase, sale,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};

/// Data for registering a loyalty program.
#[derive(Debug, Clone)]
pub struct CreateProgramData {
    /// Managed account that holds the program
    pub managed_account_id: i64,
    /// Which loyalty program this is
    pub program_type: ProgramType,
    /// Membership number at the airline, for reference
    pub account_number: Option<String>,
    /// Miles already sitting in the account when it is registered
    pub initial_balance: i64,
}

/// Retrieves all programs in the organization, ordered by program type.
pub async fn get_programs(
    db: &DatabaseConnection,
    organization_id: i64,
) -> Result<Vec<loyalty_program::Model>> {
    LoyaltyProgram::find()
        .filter(loyalty_program::Column::OrganizationId.eq(organization_id))
        .order_by_asc(loyalty_program::Column::ProgramType)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific program within the organization.
///
/// # Errors
/// Returns [`Error::ProgramNotFound`] when the program does not exist in
/// the organization.
pub async fn get_program_by_id(
    db: &DatabaseConnection,
    organization_id: i64,
    program_id: i64,
) -> Result<loyalty_program::Model> {
    LoyaltyProgram::find_by_id(program_id)
        .filter(loyalty_program::Column::OrganizationId.eq(organization_id))
        .one(db)
        .await?
        .ok_or(Error::ProgramNotFound { id: program_id })
}

/// Registers a loyalty program for a managed account.
///
/// The balance column starts at zero; when the account already holds miles
/// the starting quantity is recorded as an initial ADJUSTMENT ledger entry
/// in the same transaction, so the projected balance covers it from the
/// first commit.
///
/// # Errors
/// Returns an error if:
/// - `initial_balance` is negative
/// - The managed account does not exist in the organization
/// - The account already has a program of this type
/// - A database write fails
pub async fn create_program(
    db: &DatabaseConnection,
    organization_id: i64,
    data: CreateProgramData,
) -> Result<loyalty_program::Model> {
    if data.initial_balance < 0 {
        return Err(Error::InvalidMiles {
            amount: data.initial_balance,
        });
    }

    let txn = db.begin().await?;

    ManagedAccount::find_by_id(data.managed_account_id)
        .filter(managed_account::Column::OrganizationId.eq(organization_id))
        .one(&txn)
        .await?
        .ok_or(Error::AccountNotFound {
            id: data.managed_account_id,
        })?;

    let existing = LoyaltyProgram::find()
        .filter(loyalty_program::Column::OrganizationId.eq(organization_id))
        .filter(loyalty_program::Column::ManagedAccountId.eq(data.managed_account_id))
        .filter(loyalty_program::Column::ProgramType.eq(data.program_type))
        .one(&txn)
        .await?;
    if existing.is_some() {
        return Err(Error::DuplicateProgram {
            account_id: data.managed_account_id,
            program_type: data.program_type,
        });
    }

    let now = chrono::Utc::now();
    let program = loyalty_program::ActiveModel {
        organization_id: Set(organization_id),
        managed_account_id: Set(data.managed_account_id),
        program_type: Set(data.program_type),
        account_number: Set(data.account_number),
        current_balance: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let mut program = program.insert(&txn).await?;

    if data.initial_balance != 0 {
        ledger::append(
            &txn,
            organization_id,
            program.id,
            NewLedgerEntry {
                transaction_type: TransactionType::Adjustment,
                amount: data.initial_balance,
                cost_brl: None,
                price_brl: None,
                transaction_date: chrono::Utc::now().date_naive(),
                notes: Some("Saldo inicial".to_string()),
                purchase_id: None,
                sale_id: None,
            },
        )
        .await
        .map_err(Error::into_consistency_failure)?;

        program = LoyaltyProgram::find_by_id(program.id)
            .one(&txn)
            .await?
            .ok_or(Error::ProgramNotFound { id: program.id })?;
    }

    txn.commit().await?;

    Ok(program)
}

/// Updates a program's airline membership number.
///
/// The balance is deliberately not updatable: it is a projection of the
/// ledger and only `adjust_balance` can move it.
pub async fn update_program(
    db: &DatabaseConnection,
    organization_id: i64,
    program_id: i64,
    account_number: Option<String>,
) -> Result<loyalty_program::Model> {
    let program = get_program_by_id(db, organization_id, program_id).await?;

    let mut program: loyalty_program::ActiveModel = program.into();
    program.account_number = Set(account_number);
    program.updated_at = Set(chrono::Utc::now());

    program.update(db).await.map_err(Into::into)
}

/// Deletes a program together with its ledger entries.
///
/// # Errors
/// Returns [`Error::ProgramInUse`] while purchases or sales still
/// reference the program; their deletion flows must run first so no
/// business record is left pointing at nothing.
pub async fn delete_program(
    db: &DatabaseConnection,
    organization_id: i64,
    program_id: i64,
) -> Result<()> {
    let program = get_program_by_id(db, organization_id, program_id).await?;

    let purchase_count = Purchase::find()
        .filter(purchase::Column::LoyaltyProgramId.eq(program.id))
        .count(db)
        .await?;
    let sale_count = Sale::find()
        .filter(sale::Column::LoyaltyProgramId.eq(program.id))
        .count(db)
        .await?;
    if purchase_count > 0 || sale_count > 0 {
        return Err(Error::ProgramInUse { id: program.id });
    }

    let txn = db.begin().await?;

    MilesTransaction::delete_many()
        .filter(miles_transaction::Column::LoyaltyProgramId.eq(program.id))
        .exec(&txn)
        .await?;
    LoyaltyProgram::delete_by_id(program.id).exec(&txn).await?;

    txn.commit().await?;

    Ok(())
}

/// Records a manual balance correction as an ADJUSTMENT ledger entry.
///
/// Used when the airline's statement disagrees with the projection:
/// promotional credits, partner postings, call-center fixes. The signed
/// `adjustment` is appended to the ledger and the projector brings
/// `current_balance` along inside the same transaction.
///
/// # Errors
/// Returns [`Error::ZeroAdjustment`] for a zero adjustment and
/// [`Error::ProgramNotFound`] when the program is not in the organization.
pub async fn adjust_balance(
    db: &DatabaseConnection,
    organization_id: i64,
    program_id: i64,
    adjustment: i64,
    notes: Option<String>,
) -> Result<()> {
    if adjustment == 0 {
        return Err(Error::ZeroAdjustment);
    }

    let txn = db.begin().await?;

    ledger::append(
        &txn,
        organization_id,
        program_id,
        NewLedgerEntry {
            transaction_type: TransactionType::Adjustment,
            amount: adjustment,
            cost_brl: None,
            price_brl: None,
            transaction_date: chrono::Utc::now().date_naive(),
            notes: Some(notes.unwrap_or_else(|| "Ajuste manual de saldo".to_string())),
            purchase_id: None,
            sale_id: None,
        },
    )
    .await?;

    txn.commit().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_program_starts_at_zero() -> Result<()> {
        let db = setup_test_db().await?;
        let org = create_test_organization(&db).await?;
        let account = create_test_account(&db, org.id, "Ana", "111.111.111-11").await?;

        let program = create_program(
            &db,
            org.id,
            CreateProgramData {
                managed_account_id: account.id,
                program_type: ProgramType::Latam,
                account_number: Some("LA-123".to_string()),
                initial_balance: 0,
            },
        )
        .await?;

        assert_eq!(program.current_balance, 0);
        assert_eq!(program.program_type, ProgramType::Latam);

        let entries = ledger::entries_for_program(&db, org.id, program.id, None).await?;
        assert!(entries.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_create_program_with_initial_balance_seeds_ledger() -> Result<()> {
        let db = setup_test_db().await?;
        let org = create_test_organization(&db).await?;
        let account = create_test_account(&db, org.id, "Ana", "111.111.111-11").await?;

        let program = create_program(
            &db,
            org.id,
            CreateProgramData {
                managed_account_id: account.id,
                program_type: ProgramType::Smiles,
                account_number: None,
                initial_balance: 12_000,
            },
        )
        .await?;

        // The returned model already carries the projected balance
        assert_eq!(program.current_balance, 12_000);

        let entries = ledger::entries_for_program(&db, org.id, program.id, None).await?;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].transaction_type, TransactionType::Adjustment);
        assert_eq!(entries[0].amount, 12_000);
        assert_eq!(entries[0].notes.as_deref(), Some("Saldo inicial"));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_program_rejects_negative_initial_balance() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_program(
            &db,
            1,
            CreateProgramData {
                managed_account_id: 1,
                program_type: ProgramType::Azul,
                account_number: None,
                initial_balance: -100,
            },
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidMiles { amount: -100 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_program_duplicate_rejected() -> Result<()> {
        let (db, org, account, _program) = setup_with_program().await?;

        let result = create_program(
            &db,
            org.id,
            CreateProgramData {
                managed_account_id: account.id,
                program_type: ProgramType::Latam,
                account_number: None,
                initial_balance: 0,
            },
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::DuplicateProgram {
                program_type: ProgramType::Latam,
                ..
            }
        ));

        // The same type under another account is fine
        let other = create_test_account(&db, org.id, "Bruno", "222.222.222-22").await?;
        let program = create_program(
            &db,
            org.id,
            CreateProgramData {
                managed_account_id: other.id,
                program_type: ProgramType::Latam,
                account_number: None,
                initial_balance: 0,
            },
        )
        .await?;
        assert_eq!(program.managed_account_id, other.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_program_unknown_account() -> Result<()> {
        let db = setup_test_db().await?;
        let org = create_test_organization(&db).await?;

        let result = create_program(
            &db,
            org.id,
            CreateProgramData {
                managed_account_id: 999,
                program_type: ProgramType::Azul,
                account_number: None,
                initial_balance: 0,
            },
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::AccountNotFound { id: 999 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_programs_ordered_by_type() -> Result<()> {
        let db = setup_test_db().await?;
        let org = create_test_organization(&db).await?;
        let account = create_test_account(&db, org.id, "Ana", "111.111.111-11").await?;

        for program_type in [ProgramType::Smiles, ProgramType::Azul, ProgramType::Latam] {
            create_test_program(&db, org.id, account.id, program_type).await?;
        }

        let programs = get_programs(&db, org.id).await?;
        assert_eq!(programs.len(), 3);
        assert_eq!(programs[0].program_type, ProgramType::Azul);
        assert_eq!(programs[1].program_type, ProgramType::Latam);
        assert_eq!(programs[2].program_type, ProgramType::Smiles);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_program_account_number_only() -> Result<()> {
        let (db, org, _account, program) = setup_with_program().await?;

        let updated = update_program(&db, org.id, program.id, Some("XY-99".to_string())).await?;
        assert_eq!(updated.account_number.as_deref(), Some("XY-99"));
        assert_eq!(updated.current_balance, program.current_balance);

        Ok(())
    }

    #[tokio::test]
    async fn test_adjust_balance_appends_and_projects() -> Result<()> {
        let (db, org, _account, program) = setup_with_program().await?;

        adjust_balance(&db, org.id, program.id, 7_500, None).await?;
        adjust_balance(&db, org.id, program.id, -2_500, Some("Estorno".to_string())).await?;

        let program = get_program_by_id(&db, org.id, program.id).await?;
        assert_eq!(program.current_balance, 5_000);

        let entries =
            ledger::entries_for_program(&db, org.id, program.id, Some(TransactionType::Adjustment))
                .await?;
        assert_eq!(entries.len(), 2);
        assert!(
            entries
                .iter()
                .any(|e| e.notes.as_deref() == Some("Ajuste manual de saldo"))
        );
        assert!(entries.iter().any(|e| e.notes.as_deref() == Some("Estorno")));

        Ok(())
    }

    #[tokio::test]
    async fn test_adjust_balance_zero_rejected() -> Result<()> {
        let (db, org, _account, program) = setup_with_program().await?;

        let result = adjust_balance(&db, org.id, program.id, 0, None).await;
        assert!(matches!(result.unwrap_err(), Error::ZeroAdjustment));

        // Nothing written, balance untouched
        let entries = ledger::entries_for_program(&db, org.id, program.id, None).await?;
        assert!(entries.is_empty());
        let program = get_program_by_id(&db, org.id, program.id).await?;
        assert_eq!(program.current_balance, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_adjust_balance_foreign_organization() -> Result<()> {
        let (db, org, _account, program) = setup_with_program().await?;

        let result = adjust_balance(&db, org.id + 1, program.id, 1_000, None).await;
        assert!(matches!(result.unwrap_err(), Error::ProgramNotFound { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_program_removes_ledger_entries() -> Result<()> {
        let db = setup_test_db().await?;
        let org = create_test_organization(&db).await?;
        let account = create_test_account(&db, org.id, "Ana", "111.111.111-11").await?;

        let program = create_program(
            &db,
            org.id,
            CreateProgramData {
                managed_account_id: account.id,
                program_type: ProgramType::Livelo,
                account_number: None,
                initial_balance: 9_000,
            },
        )
        .await?;

        delete_program(&db, org.id, program.id).await?;

        let result = get_program_by_id(&db, org.id, program.id).await;
        assert!(matches!(result.unwrap_err(), Error::ProgramNotFound { .. }));

        let orphans = MilesTransaction::find()
            .filter(miles_transaction::Column::LoyaltyProgramId.eq(program.id))
            .all(&db)
            .await?;
        assert!(orphans.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_program_with_purchases_refused() -> Result<()> {
        let (db, org, _account, program) = setup_with_program().await?;
        create_test_purchase(&db, org.id, &program, 50_000, 750.0).await?;

        let result = delete_program(&db, org.id, program.id).await;
        assert!(matches!(result.unwrap_err(), Error::ProgramInUse { .. }));

        // Still there
        get_program_by_id(&db, org.id, program.id).await?;

        Ok(())
    }
}
