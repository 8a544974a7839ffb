//! Organization entity - the tenant boundary.
//!
//! Every business table carries an `organization_id` and every query
//! filters by it; rows from different organizations never mix.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Organization database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "organizations")]
pub struct Model {
    /// Unique identifier for the organization
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name of the operation (e.g., "Minha Operação de Milhas")
    pub name: String,
    /// External identity of the operator who owns this organization
    #[sea_orm(unique)]
    pub owner_id: String,
    /// When the organization was created
    pub created_at: DateTimeUtc,
    /// When the organization was last updated
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Organization and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One organization manages many CPF-holding accounts
    #[sea_orm(has_many = "super::managed_account::Entity")]
    ManagedAccounts,
    /// One organization operates many loyalty programs
    #[sea_orm(has_many = "super::loyalty_program::Entity")]
    LoyaltyPrograms,
}

impl Related<super::managed_account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ManagedAccounts.def()
    }
}

impl Related<super::loyalty_program::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LoyaltyPrograms.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
