//! Sale entity - a batch of miles sold out of a loyalty program.
//!
//! Mirrors the purchase pairing: every sale row has exactly one paired
//! SALE entry in the miles ledger with a negative amount. Payment fields
//! stay open until the broker settles.

use super::enums::SaleChannel;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sale database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales")]
pub struct Model {
    /// Unique identifier for the sale
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Organization this sale belongs to
    pub organization_id: i64,
    /// Program the miles were sold from
    pub loyalty_program_id: i64,
    /// Beneficiary whose slot issued the tickets, when tracked
    pub beneficiary_id: Option<i64>,
    /// Miles sold
    pub amount_miles: i64,
    /// Derived sale price per thousand miles
    pub price_per_thousand: f64,
    /// Total agreed price, in BRL
    pub total_price_brl: f64,
    /// Marketplace or direct channel the sale went through
    pub sale_channel: SaleChannel,
    /// Business date of the sale
    pub sale_date: Date,
    /// When the broker is expected to pay
    pub expected_payment_date: Option<Date>,
    /// When the broker actually paid
    pub actual_payment_date: Option<Date>,
    /// Amount actually received, when it differs from the agreed price
    pub amount_paid: Option<f64>,
    /// End customer name, for direct sales
    pub customer_name: Option<String>,
    /// Free-form operator notes
    pub notes: Option<String>,
    /// When the sale was recorded
    pub created_at: DateTimeUtc,
    /// When the sale was last updated
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Sale and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each sale belongs to one organization
    #[sea_orm(
        belongs_to = "super::organization::Entity",
        from = "Column::OrganizationId",
        to = "super::organization::Column::Id"
    )]
    Organization,
    /// Each sale draws from one loyalty program
    #[sea_orm(
        belongs_to = "super::loyalty_program::Entity",
        from = "Column::LoyaltyProgramId",
        to = "super::loyalty_program::Column::Id"
    )]
    LoyaltyProgram,
    /// Beneficiary slot used for ticket issuance, when tracked
    #[sea_orm(
        belongs_to = "super::beneficiary::Entity",
        from = "Column::BeneficiaryId",
        to = "super::beneficiary::Column::Id"
    )]
    Beneficiary,
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

impl Related<super::beneficiary::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Beneficiary.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
