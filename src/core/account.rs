//! Managed account business logic.
//!
//! A managed account is the person whose loyalty programs the desk
//! operates. CPF is the natural key within an organization and duplicates
//! are rejected.

use crate::{
    entities::{
        Beneficiary, LoyaltyProgram, ManagedAccount, beneficiary, loyalty_program, managed_account,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*};

fn validate_account_fields(name: &str, cpf: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::EmptyField {
            field: "managed account name",
        });
    }
    if cpf.trim().is_empty() {
        return Err(Error::EmptyField {
            field: "managed account CPF",
        });
    }
    Ok(())
}

async fn cpf_taken(
    db: &DatabaseConnection,
    organization_id: i64,
    cpf: &str,
    exclude_id: Option<i64>,
) -> Result<bool> {
    let mut query = ManagedAccount::find()
        .filter(managed_account::Column::OrganizationId.eq(organization_id))
        .filter(managed_account::Column::Cpf.eq(cpf));
    if let Some(id) = exclude_id {
        query = query.filter(managed_account::Column::Id.ne(id));
    }
    Ok(query.count(db).await? > 0)
}

/// Retrieves all managed accounts in the organization, ordered by name.
pub async fn get_accounts(
    db: &DatabaseConnection,
    organization_id: i64,
) -> Result<Vec<managed_account::Model>> {
    ManagedAccount::find()
        .filter(managed_account::Column::OrganizationId.eq(organization_id))
        .order_by_asc(managed_account::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific managed account within the organization.
///
/// # Errors
/// Returns [`Error::AccountNotFound`] when the account does not exist in
/// the organization.
pub async fn get_account_by_id(
    db: &DatabaseConnection,
    organization_id: i64,
    account_id: i64,
) -> Result<managed_account::Model> {
    ManagedAccount::find_by_id(account_id)
        .filter(managed_account::Column::OrganizationId.eq(organization_id))
        .one(db)
        .await?
        .ok_or(Error::AccountNotFound { id: account_id })
}

/// Creates a managed account, enforcing CPF uniqueness within the
/// organization.
///
/// Name and CPF are trimmed before storage.
///
/// # Errors
/// Returns an error if:
/// - The name or CPF is empty or whitespace-only
/// - Another account in the organization already holds the CPF
/// - The database insert operation fails
pub async fn create_account(
    db: &DatabaseConnection,
    organization_id: i64,
    name: String,
    cpf: String,
    birth_date: Option<NaiveDate>,
    notes: Option<String>,
) -> Result<managed_account::Model> {
    validate_account_fields(&name, &cpf)?;
    let cpf = cpf.trim().to_string();

    if cpf_taken(db, organization_id, &cpf, None).await? {
        return Err(Error::DuplicateCpf { cpf });
    }

    let now = chrono::Utc::now();
    let account = managed_account::ActiveModel {
        organization_id: Set(organization_id),
        name: Set(name.trim().to_string()),
        cpf: Set(cpf),
        birth_date: Set(birth_date),
        notes: Set(notes),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    account.insert(db).await.map_err(Into::into)
}

/// Updates a managed account's fields, re-checking CPF uniqueness against
/// the other accounts in the organization.
pub async fn update_account(
    db: &DatabaseConnection,
    organization_id: i64,
    account_id: i64,
    name: String,
    cpf: String,
    birth_date: Option<NaiveDate>,
    notes: Option<String>,
) -> Result<managed_account::Model> {
    validate_account_fields(&name, &cpf)?;
    let cpf = cpf.trim().to_string();

    let existing = get_account_by_id(db, organization_id, account_id).await?;

    if cpf_taken(db, organization_id, &cpf, Some(existing.id)).await? {
        return Err(Error::DuplicateCpf { cpf });
    }

    let mut account: managed_account::ActiveModel = existing.into();
    account.name = Set(name.trim().to_string());
    account.cpf = Set(cpf);
    account.birth_date = Set(birth_date);
    account.notes = Set(notes);
    account.updated_at = Set(chrono::Utc::now());

    account.update(db).await.map_err(Into::into)
}

/// Deletes a managed account.
///
/// Refused while loyalty programs or beneficiaries still reference the
/// account; those carry history and must be removed first.
pub async fn delete_account(
    db: &DatabaseConnection,
    organization_id: i64,
    account_id: i64,
) -> Result<()> {
    let existing = get_account_by_id(db, organization_id, account_id).await?;

    let program_count = LoyaltyProgram::find()
        .filter(loyalty_program::Column::ManagedAccountId.eq(existing.id))
        .count(db)
        .await?;
    let beneficiary_count = Beneficiary::find()
        .filter(beneficiary::Column::ManagedAccountId.eq(existing.id))
        .count(db)
        .await?;
    if program_count > 0 || beneficiary_count > 0 {
        return Err(Error::AccountInUse { id: existing.id });
    }

    ManagedAccount::delete_by_id(existing.id).exec(db).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::program::{self, CreateProgramData};
    use crate::entities::enums::ProgramType;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_account_trims_fields() -> Result<()> {
        let db = setup_test_db().await?;
        let org = create_test_organization(&db).await?;

        let account = create_account(
            &db,
            org.id,
            "  Ana Souza  ".to_string(),
            " 111.222.333-44 ".to_string(),
            Some(date(1990, 5, 17)),
            None,
        )
        .await?;

        assert_eq!(account.name, "Ana Souza");
        assert_eq!(account.cpf, "111.222.333-44");
        assert_eq!(account.birth_date, Some(date(1990, 5, 17)));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_account_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_account(&db, 1, String::new(), "111".to_string(), None, None).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::EmptyField {
                field: "managed account name"
            }
        ));

        let result = create_account(&db, 1, "Ana".to_string(), "   ".to_string(), None, None).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::EmptyField {
                field: "managed account CPF"
            }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_account_duplicate_cpf_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let org = create_test_organization(&db).await?;
        create_test_account(&db, org.id, "Ana", "111.222.333-44").await?;

        let result = create_account(
            &db,
            org.id,
            "Outra Ana".to_string(),
            "111.222.333-44".to_string(),
            None,
            None,
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::DuplicateCpf { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_same_cpf_allowed_across_organizations() -> Result<()> {
        let db = setup_test_db().await?;
        let org_a = create_test_organization(&db).await?;
        let org_b = crate::core::organization::ensure_organization(
            &db,
            "operator-b",
            Some("Outra Mesa".to_string()),
        )
        .await?;

        create_test_account(&db, org_a.id, "Ana", "111.222.333-44").await?;
        let twin = create_test_account(&db, org_b.id, "Ana", "111.222.333-44").await?;
        assert_eq!(twin.organization_id, org_b.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_account_keeps_own_cpf() -> Result<()> {
        let db = setup_test_db().await?;
        let org = create_test_organization(&db).await?;
        let account = create_test_account(&db, org.id, "Ana", "111.222.333-44").await?;

        let updated = update_account(
            &db,
            org.id,
            account.id,
            "Ana S.".to_string(),
            "111.222.333-44".to_string(),
            None,
            Some("VIP".to_string()),
        )
        .await?;

        assert_eq!(updated.name, "Ana S.");
        assert_eq!(updated.notes.as_deref(), Some("VIP"));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_account_cannot_steal_cpf() -> Result<()> {
        let db = setup_test_db().await?;
        let org = create_test_organization(&db).await?;
        create_test_account(&db, org.id, "Ana", "111.222.333-44").await?;
        let bruno = create_test_account(&db, org.id, "Bruno", "222.333.444-55").await?;

        let result = update_account(
            &db,
            org.id,
            bruno.id,
            "Bruno".to_string(),
            "111.222.333-44".to_string(),
            None,
            None,
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::DuplicateCpf { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_account_with_programs_refused() -> Result<()> {
        let db = setup_test_db().await?;
        let org = create_test_organization(&db).await?;
        let account = create_test_account(&db, org.id, "Ana", "111.222.333-44").await?;
        program::create_program(
            &db,
            org.id,
            CreateProgramData {
                managed_account_id: account.id,
                program_type: ProgramType::Latam,
                account_number: None,
                initial_balance: 0,
            },
        )
        .await?;

        let result = delete_account(&db, org.id, account.id).await;
        assert!(matches!(result.unwrap_err(), Error::AccountInUse { .. }));

        // Account survives the refused delete
        assert_eq!(get_accounts(&db, org.id).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_clean_account() -> Result<()> {
        let db = setup_test_db().await?;
        let org = create_test_organization(&db).await?;
        let account = create_test_account(&db, org.id, "Ana", "111.222.333-44").await?;

        delete_account(&db, org.id, account.id).await?;

        assert!(get_accounts(&db, org.id).await?.is_empty());
        let result = get_account_by_id(&db, org.id, account.id).await;
        assert!(matches!(result.unwrap_err(), Error::AccountNotFound { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_accounts_ordered_by_name() -> Result<()> {
        let db = setup_test_db().await?;
        let org = create_test_organization(&db).await?;
        create_test_account(&db, org.id, "Carla", "333.444.555-66").await?;
        create_test_account(&db, org.id, "Ana", "111.222.333-44").await?;
        create_test_account(&db, org.id, "Bruno", "222.333.444-55").await?;

        let accounts = get_accounts(&db, org.id).await?;
        let names: Vec<&str> = accounts.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Bruno", "Carla"]);

        Ok(())
    }
}
