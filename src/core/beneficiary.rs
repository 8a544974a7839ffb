//! Beneficiary business logic - ticket-issuance quota tracking.
//!
//! Loyalty programs cap how many distinct passengers an account may issue
//! tickets for per cycle. A beneficiary row tracks one passenger's slot
//! usage under one account and program type, plus a quarantine window some
//! programs impose after a passenger is swapped out. Quarantine expiry is
//! computed at read time; rows are never rewritten by the clock.

use crate::{
    entities::{
        Beneficiary, ManagedAccount, Sale, beneficiary,
        enums::{BeneficiaryStatus, ProgramType},
        managed_account, sale,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::sea_query::Expr;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};

/// Data for registering a beneficiary.
#[derive(Debug, Clone)]
pub struct CreateBeneficiaryData {
    /// Account whose quota the beneficiary occupies
    pub managed_account_id: i64,
    /// Program the quota belongs to
    pub program_type: ProgramType,
    /// Passenger name
    pub name: String,
    /// Passenger CPF, when known
    pub cpf: Option<String>,
    /// Slots the program grants this passenger
    pub total_slots: i32,
    /// Slots already consumed
    pub used_slots: i32,
    /// Starting status
    pub status: BeneficiaryStatus,
    /// Last quarantined day, for quarantined imports
    pub quarantine_until: Option<NaiveDate>,
    /// Free-form operator notes
    pub notes: Option<String>,
}

/// Data for rewriting a beneficiary's quota fields. Status changes go
/// through [`set_status`].
#[derive(Debug, Clone)]
pub struct UpdateBeneficiaryData {
    /// Passenger name
    pub name: String,
    /// Passenger CPF, when known
    pub cpf: Option<String>,
    /// Slots the program grants this passenger
    pub total_slots: i32,
    /// Slots already consumed
    pub used_slots: i32,
    /// Free-form operator notes
    pub notes: Option<String>,
}

fn validate_slots(total_slots: i32, used_slots: i32) -> Result<()> {
    if total_slots < 0 || used_slots < 0 || used_slots > total_slots {
        return Err(Error::InvalidSlotCount {
            total: total_slots,
            used: used_slots,
        });
    }
    Ok(())
}

/// Slots still available on the beneficiary.
#[must_use]
pub fn remaining_slots(beneficiary: &beneficiary::Model) -> i32 {
    beneficiary.total_slots - beneficiary.used_slots
}

/// The status the beneficiary reads as on `today`.
///
/// A quarantine whose last day has passed reads as ACTIVE without the row
/// being touched; every other case reads the stored status.
#[must_use]
pub fn effective_status(beneficiary: &beneficiary::Model, today: NaiveDate) -> BeneficiaryStatus {
    match (beneficiary.status, beneficiary.quarantine_until) {
        (BeneficiaryStatus::Quarantine, Some(until)) if until < today => BeneficiaryStatus::Active,
        (status, _) => status,
    }
}

/// Retrieves all beneficiaries in the organization, ordered by name.
pub async fn get_beneficiaries(
    db: &DatabaseConnection,
    organization_id: i64,
) -> Result<Vec<beneficiary::Model>> {
    Beneficiary::find()
        .filter(beneficiary::Column::OrganizationId.eq(organization_id))
        .order_by_asc(beneficiary::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific beneficiary within the organization.
///
/// # Errors
/// Returns [`Error::BeneficiaryNotFound`] when the beneficiary does not
/// exist in the organization.
pub async fn get_beneficiary_by_id(
    db: &DatabaseConnection,
    organization_id: i64,
    beneficiary_id: i64,
) -> Result<beneficiary::Model> {
    Beneficiary::find_by_id(beneficiary_id)
        .filter(beneficiary::Column::OrganizationId.eq(organization_id))
        .one(db)
        .await?
        .ok_or(Error::BeneficiaryNotFound { id: beneficiary_id })
}

/// Registers a beneficiary under a managed account.
///
/// # Errors
/// Returns an error if:
/// - The name is empty or whitespace-only
/// - The slot counts are negative or `used_slots` exceeds `total_slots`
/// - The account is not in the organization
pub async fn create_beneficiary(
    db: &DatabaseConnection,
    organization_id: i64,
    data: CreateBeneficiaryData,
) -> Result<beneficiary::Model> {
    if data.name.trim().is_empty() {
        return Err(Error::EmptyField {
            field: "beneficiary name",
        });
    }
    validate_slots(data.total_slots, data.used_slots)?;

    ManagedAccount::find_by_id(data.managed_account_id)
        .filter(managed_account::Column::OrganizationId.eq(organization_id))
        .one(db)
        .await?
        .ok_or(Error::AccountNotFound {
            id: data.managed_account_id,
        })?;

    let quarantine_until = if data.status == BeneficiaryStatus::Quarantine {
        data.quarantine_until
    } else {
        None
    };

    let now = chrono::Utc::now();
    let beneficiary = beneficiary::ActiveModel {
        organization_id: Set(organization_id),
        managed_account_id: Set(data.managed_account_id),
        program_type: Set(data.program_type),
        name: Set(data.name.trim().to_string()),
        cpf: Set(data.cpf),
        total_slots: Set(data.total_slots),
        used_slots: Set(data.used_slots),
        status: Set(data.status),
        quarantine_until: Set(quarantine_until),
        notes: Set(data.notes),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    beneficiary.insert(db).await.map_err(Into::into)
}

/// Updates a beneficiary's quota fields.
///
/// A total that would drop below the slots already consumed is rejected;
/// the stored counts stay untouched.
pub async fn update_beneficiary(
    db: &DatabaseConnection,
    organization_id: i64,
    beneficiary_id: i64,
    data: UpdateBeneficiaryData,
) -> Result<beneficiary::Model> {
    if data.name.trim().is_empty() {
        return Err(Error::EmptyField {
            field: "beneficiary name",
        });
    }
    validate_slots(data.total_slots, data.used_slots)?;

    let existing = get_beneficiary_by_id(db, organization_id, beneficiary_id).await?;

    let mut beneficiary: beneficiary::ActiveModel = existing.into();
    beneficiary.name = Set(data.name.trim().to_string());
    beneficiary.cpf = Set(data.cpf);
    beneficiary.total_slots = Set(data.total_slots);
    beneficiary.used_slots = Set(data.used_slots);
    beneficiary.notes = Set(data.notes);
    beneficiary.updated_at = Set(chrono::Utc::now());

    beneficiary.update(db).await.map_err(Into::into)
}

/// Consumes one slot, for a ticket issued to this beneficiary.
pub async fn consume_slot(
    db: &DatabaseConnection,
    organization_id: i64,
    beneficiary_id: i64,
) -> Result<beneficiary::Model> {
    let existing = get_beneficiary_by_id(db, organization_id, beneficiary_id).await?;

    let used = existing.used_slots + 1;
    if used > existing.total_slots {
        return Err(Error::InvalidSlotCount {
            total: existing.total_slots,
            used,
        });
    }

    let mut beneficiary: beneficiary::ActiveModel = existing.into();
    beneficiary.used_slots = Set(used);
    beneficiary.updated_at = Set(chrono::Utc::now());

    beneficiary.update(db).await.map_err(Into::into)
}

/// Releases one slot, for a cancelled or refunded ticket.
pub async fn release_slot(
    db: &DatabaseConnection,
    organization_id: i64,
    beneficiary_id: i64,
) -> Result<beneficiary::Model> {
    let existing = get_beneficiary_by_id(db, organization_id, beneficiary_id).await?;

    let used = existing.used_slots - 1;
    if used < 0 {
        return Err(Error::InvalidSlotCount {
            total: existing.total_slots,
            used,
        });
    }

    let mut beneficiary: beneficiary::ActiveModel = existing.into();
    beneficiary.used_slots = Set(used);
    beneficiary.updated_at = Set(chrono::Utc::now());

    beneficiary.update(db).await.map_err(Into::into)
}

/// Sets the stored status.
///
/// `quarantine_until` is only meaningful for QUARANTINE and is cleared on
/// any other status.
pub async fn set_status(
    db: &DatabaseConnection,
    organization_id: i64,
    beneficiary_id: i64,
    status: BeneficiaryStatus,
    quarantine_until: Option<NaiveDate>,
) -> Result<beneficiary::Model> {
    let existing = get_beneficiary_by_id(db, organization_id, beneficiary_id).await?;

    let quarantine_until = if status == BeneficiaryStatus::Quarantine {
        quarantine_until
    } else {
        None
    };

    let mut beneficiary: beneficiary::ActiveModel = existing.into();
    beneficiary.status = Set(status);
    beneficiary.quarantine_until = Set(quarantine_until);
    beneficiary.updated_at = Set(chrono::Utc::now());

    beneficiary.update(db).await.map_err(Into::into)
}

/// Deletes a beneficiary.
///
/// Sales that pointed at the beneficiary keep their rows; the link is
/// cleared in the same transaction as the delete.
pub async fn delete_beneficiary(
    db: &DatabaseConnection,
    organization_id: i64,
    beneficiary_id: i64,
) -> Result<()> {
    let existing = get_beneficiary_by_id(db, organization_id, beneficiary_id).await?;

    let txn = db.begin().await?;

    Sale::update_many()
        .col_expr(sale::Column::BeneficiaryId, Expr::value(Option::<i64>::None))
        .filter(sale::Column::BeneficiaryId.eq(existing.id))
        .exec(&txn)
        .await?;
    Beneficiary::delete_by_id(existing.id).exec(&txn).await?;

    txn.commit().await?;

    Ok(())
}
