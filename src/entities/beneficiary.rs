//! Beneficiary entity - a person registered to receive tickets issued
//! from a managed account's program.
//!
//! Airlines cap how many beneficiaries an account may register per
//! period and quarantine freshly removed ones. `used_slots` counts
//! registrations consumed at the airline; the remaining count is always
//! derived, never stored.

use super::enums::{BeneficiaryStatus, ProgramType};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Beneficiary database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "beneficiaries")]
pub struct Model {
    /// Unique identifier for the beneficiary
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Organization this beneficiary belongs to
    pub organization_id: i64,
    /// Managed account the beneficiary is registered under
    pub managed_account_id: i64,
    /// Program the registration applies to
    pub program_type: ProgramType,
    /// Full name of the beneficiary
    pub name: String,
    /// Beneficiary CPF, when known
    pub cpf: Option<String>,
    /// Registration slots the airline grants for this beneficiary
    pub total_slots: i32,
    /// Slots already consumed at the airline (0 <= used <= total)
    pub used_slots: i32,
    /// Stored status; quarantine expiry is computed at read time
    pub status: BeneficiaryStatus,
    /// Last day of quarantine, when the airline imposed one
    pub quarantine_until: Option<Date>,
    /// Free-form operator notes
    pub notes: Option<String>,
    /// When the beneficiary was registered
    pub created_at: DateTimeUtc,
    /// When the beneficiary was last updated
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Beneficiary and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each beneficiary belongs to one organization
    #[sea_orm(
        belongs_to = "super::organization::Entity",
        from = "Column::OrganizationId",
        to = "super::organization::Column::Id"
    )]
    Organization,
    /// Each beneficiary is registered under one managed account
    #[sea_orm(
        belongs_to = "super::managed_account::Entity",
        from = "Column::ManagedAccountId",
        to = "super::managed_account::Column::Id"
    )]
    ManagedAccount,
}

impl Related<super::organization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organization.def()
    }
}

impl Related<super::managed_account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ManagedAccount.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
