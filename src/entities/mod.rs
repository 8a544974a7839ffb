//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod beneficiary;
pub mod credit_card;
pub mod enums;
pub mod loyalty_program;
pub mod managed_account;
pub mod miles_transaction;
pub mod organization;
pub mod purchase;
pub mod sale;

// Re-export specific types to avoid conflicts
pub use beneficiary::{Column as BeneficiaryColumn, Entity as Beneficiary, Model as BeneficiaryModel};
pub use credit_card::{Column as CreditCardColumn, Entity as CreditCard, Model as CreditCardModel};
pub use loyalty_program::{
    Column as LoyaltyProgramColumn, Entity as LoyaltyProgram, Model as LoyaltyProgramModel,
};
pub use managed_account::{
    Column as ManagedAccountColumn, Entity as ManagedAccount, Model as ManagedAccountModel,
};
pub use miles_transaction::{
    Column as MilesTransactionColumn, Entity as MilesTransaction, Model as MilesTransactionModel,
};
pub use organization::{
    Column as OrganizationColumn, Entity as Organization, Model as OrganizationModel,
};
pub use purchase::{Column as PurchaseColumn, Entity as Purchase, Model as PurchaseModel};
pub use sale::{Column as SaleColumn, Entity as Sale, Model as SaleModel};
