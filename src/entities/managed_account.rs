//! Managed account entity - a CPF holder whose loyalty accounts the desk operates.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Managed account database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "managed_accounts")]
pub struct Model {
    /// Unique identifier for the managed account
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Organization this account belongs to
    pub organization_id: i64,
    /// Full name of the account holder
    pub name: String,
    /// Brazilian taxpayer id; unique within the organization
    pub cpf: String,
    /// Holder's birth date, when known
    pub birth_date: Option<Date>,
    /// Free-form operator notes
    pub notes: Option<String>,
    /// When the account was registered
    pub created_at: DateTimeUtc,
    /// When the account was last updated
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between `ManagedAccount` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each managed account belongs to one organization
    #[sea_orm(
        belongs_to = "super::organization::Entity",
        from = "Column::OrganizationId",
        to = "super::organization::Column::Id"
    )]
    Organization,
    /// One managed account holds many loyalty programs
    #[sea_orm(has_many = "super::loyalty_program::Entity")]
    LoyaltyPrograms,
    /// One managed account can register many beneficiaries
    #[sea_orm(has_many = "super::beneficiary::Entity")]
    Beneficiaries,
}

impl Related<super::organization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organization.def()
    }
}

impl Related<super::loyalty_program::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LoyaltyPrograms.def()
    }
}

impl Related<super::beneficiary::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Beneficiaries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
