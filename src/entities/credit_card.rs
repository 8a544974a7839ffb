//! Credit card entity - payment cards purchases can reference.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Credit card database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "credit_cards")]
pub struct Model {
    /// Unique identifier for the card
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Organization this card belongs to
    pub organization_id: i64,
    /// Display name (e.g., "Itaú Personnalité Visa Infinite")
    pub name: String,
    /// Last four digits, for disambiguation
    pub last_four_digits: Option<String>,
    /// Deactivated cards are hidden but keep their purchase history
    pub is_active: bool,
    /// When the card was registered
    pub created_at: DateTimeUtc,
    /// When the card was last updated
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between `CreditCard` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each card belongs to one organization
    #[sea_orm(
        belongs_to = "super::organization::Entity",
        from = "Column::OrganizationId",
        to = "super::organization::Column::Id"
    )]
    Organization,
    /// One card pays for many purchases
    #[sea_orm(has_many = "super::purchase::Entity")]
    Purchases,
}

impl Related<super::organization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organization.def()
    }
}

impl Related<super::purchase::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Purchases.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
