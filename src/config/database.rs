//! Database configuration module for milheiro.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! It provides functions for establishing database connections and creating all necessary tables
//! based on the entity definitions. The module uses `SeaORM`'s `Schema::create_table_from_entity`
//! method to automatically generate SQL statements from the entity models, ensuring that the
//! database schema matches the Rust struct definitions without requiring manual SQL.

use crate::entities::{
    Beneficiary, CreditCard, LoyaltyProgram, ManagedAccount, MilesTransaction, Organization,
    Purchase, Sale,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Default local `SQLite` path used when neither the environment nor the
/// configuration file names a database.
#[must_use]
pub fn default_database_url() -> String {
    "sqlite://data/milheiro.sqlite".to_string()
}

/// Establishes a connection to the `SQLite` database.
///
/// This function handles connection errors and provides a clean interface for database access
/// throughout the application.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all necessary database tables using `SeaORM`'s schema generation from entity definitions.
///
/// Tables are created parents-first so the generated foreign keys always
/// reference an existing table: organizations, then managed accounts and
/// cards, then programs and beneficiaries, then purchases and sales, and
/// the miles ledger last. Safe to call on an already-initialized database.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let statements = vec![
        schema.create_table_from_entity(Organization),
        schema.create_table_from_entity(ManagedAccount),
        schema.create_table_from_entity(CreditCard),
        schema.create_table_from_entity(LoyaltyProgram),
        schema.create_table_from_entity(Beneficiary),
        schema.create_table_from_entity(Purchase),
        schema.create_table_from_entity(Sale),
        schema.create_table_from_entity(MilesTransaction),
    ];

    for mut statement in statements {
        statement.if_not_exists();
        db.execute(builder.build(&statement)).await?;
    }

    Ok(())
}
