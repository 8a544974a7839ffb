//! Purchase entity - a batch of miles bought into a loyalty program.
//!
//! Every purchase row has exactly one paired PURCHASE entry in the miles
//! ledger; the pair is written, amended, and deleted together inside one
//! database transaction.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Purchase database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchases")]
pub struct Model {
    /// Unique identifier for the purchase
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Organization this purchase belongs to
    pub organization_id: i64,
    /// Managed account the miles were bought for
    pub managed_account_id: i64,
    /// Program the miles landed in
    pub loyalty_program_id: i64,
    /// Miles bought
    pub amount_miles: i64,
    /// Total paid, in BRL
    pub total_cost_brl: f64,
    /// Derived acquisition cost per thousand miles (CPM)
    pub cost_per_thousand: f64,
    /// Business date of the purchase
    pub purchase_date: Date,
    /// Number of installments the payment was split into (>= 1)
    pub installments: i32,
    /// Per-installment amount; None when paid in a single installment
    pub installment_amount: Option<f64>,
    /// Due date of the first installment; anchors the amortization schedule
    pub first_due_date: Option<Date>,
    /// Card the purchase was paid with, when tracked
    pub credit_card_id: Option<i64>,
    /// Free-form operator notes
    pub notes: Option<String>,
    /// When the purchase was recorded
    pub created_at: DateTimeUtc,
    /// When the purchase was last updated
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Purchase and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each purchase belongs to one organization
    #[sea_orm(
        belongs_to = "super::organization::Entity",
        from = "Column::OrganizationId",
        to = "super::organization::Column::Id"
    )]
    Organization,
    /// Each purchase was made for one managed account
    #[sea_orm(
        belongs_to = "super::managed_account::Entity",
        from = "Column::ManagedAccountId",
        to = "super::managed_account::Column::Id"
    )]
    ManagedAccount,
    /// Each purchase lands in one loyalty program
    #[sea_orm(
        belongs_to = "super::loyalty_program::Entity",
        from = "Column::LoyaltyProgramId",
        to = "super::loyalty_program::Column::Id"
    )]
    LoyaltyProgram,
    /// Card the purchase was paid with, when tracked
    #[sea_orm(
        belongs_to = "super::credit_card::Entity",
        from = "Column::CreditCardId",
        to = "super::credit_card::Column::Id"
    )]
    CreditCard,
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

impl Related<super::loyalty_program::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LoyaltyProgram.def()
    }
}

impl Related<super::credit_card::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CreditCard.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
