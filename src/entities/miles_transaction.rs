//! Miles transaction entity - one entry in the append-style miles ledger.
//!
//! Each entry carries a signed `amount` (positive adds miles to the
//! program, negative removes them) plus the money that moved with it:
//! `cost_brl` for money spent, `price_brl` for money received. Entries
//! created as the ledger half of a purchase or sale carry the owning
//! record's id in `purchase_id`/`sale_id`; all amendments go through
//! those links, never through the entry id.

use super::enums::TransactionType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Miles transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "miles_transactions")]
pub struct Model {
    /// Unique identifier for the ledger entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Organization this entry belongs to
    pub organization_id: i64,
    /// Program whose balance this entry moves
    pub loyalty_program_id: i64,
    /// Kind of movement recorded by this entry
    pub transaction_type: TransactionType,
    /// Signed miles amount (positive credits, negative debits)
    pub amount: i64,
    /// Money spent on this movement, in BRL (purchases)
    pub cost_brl: Option<f64>,
    /// Money received for this movement, in BRL (sales)
    pub price_brl: Option<f64>,
    /// Business date of the movement
    pub transaction_date: Date,
    /// Free-form note shown in statements
    pub notes: Option<String>,
    /// Owning purchase when this entry is the ledger half of one
    pub purchase_id: Option<i64>,
    /// Owning sale when this entry is the ledger half of one
    pub sale_id: Option<i64>,
    /// When the entry was recorded
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `MilesTransaction` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each entry belongs to one organization
    #[sea_orm(
        belongs_to = "super::organization::Entity",
        from = "Column::OrganizationId",
        to = "super::organization::Column::Id"
    )]
    Organization,
    /// Each entry moves exactly one program's balance
    #[sea_orm(
        belongs_to = "super::loyalty_program::Entity",
        from = "Column::LoyaltyProgramId",
        to = "super::loyalty_program::Column::Id"
    )]
    LoyaltyProgram,
    /// Ledger half of a purchase, when set
    #[sea_orm(
        belongs_to = "super::purchase::Entity",
        from = "Column::PurchaseId",
        to = "super::purchase::Column::Id"
    )]
    Purchase,
    /// Ledger half of a sale, when set
    #[sea_orm(
        belongs_to = "super::sale::Entity",
        from = "Column::SaleId",
        to = "super::sale::Column::Id"
    )]
    Sale,
}

impl Related<super::organization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organization.def()
    }
}

impl Related<super::loyalty_program::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LoyaltyProgram.def()
    }
}

impl Related<super::purchase::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Purchase.def()
    }
}

impl Related<super::sale::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sale.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
