//! Loyalty program entity - one airline/points account held by a managed account.
//!
//! `current_balance` is a projection of the miles ledger: it is written
//! exclusively by the balance projector in `core::ledger`, inside the same
//! transaction as the ledger mutation it follows. Nothing else in the crate
//! touches the column.

use super::enums::ProgramType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Loyalty program database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "loyalty_programs")]
pub struct Model {
    /// Unique identifier for the program
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Organization this program belongs to
    pub organization_id: i64,
    /// Managed account that holds this program
    pub managed_account_id: i64,
    /// Which loyalty program this is (one per account and type)
    pub program_type: ProgramType,
    /// Membership number at the airline, for reference only
    pub account_number: Option<String>,
    /// Projected miles balance; equals the signed sum of this program's
    /// ledger entries after every committed operation
    pub current_balance: i64,
    /// When the program was registered
    pub created_at: DateTimeUtc,
    /// When the program was last updated
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between `LoyaltyProgram` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each program belongs to one organization
    #[sea_orm(
        belongs_to = "super::organization::Entity",
        from = "Column::OrganizationId",
        to = "super::organization::Column::Id"
    )]
    Organization,
    /// Each program is held by one managed account
    #[sea_orm(
        belongs_to = "super::managed_account::Entity",
        from = "Column::ManagedAccountId",
        to = "super::managed_account::Column::Id"
    )]
    ManagedAccount,
    /// One program accumulates many ledger entries
    #[sea_orm(has_many = "super::miles_transaction::Entity")]
    MilesTransactions,
    /// One program receives many purchases
    #[sea_orm(has_many = "super::purchase::Entity")]
    Purchases,
    /// One program fulfills many sales
    #[sea_orm(has_many = "super::sale::Entity")]
    Sales,
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

impl Related<super::miles_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MilesTransactions.def()
    }
}

impl Related<super::purchase::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Purchases.def()
    }
}

impl Related<super::sale::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sales.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
