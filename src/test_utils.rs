//! Shared test utilities for Milheiro.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

#![allow(clippy::unwrap_used)]

use crate::{
    core::{account, organization, program, purchase, sale},
    entities,
    entities::enums::{ProgramType, SaleChannel},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// Builds a calendar date; panics on invalid input, which in tests means a
/// broken fixture, not a broken subject.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test organization owned by a fixed operator.
pub async fn create_test_organization(
    db: &DatabaseConnection,
) -> Result<entities::organization::Model> {
    organization::ensure_organization(db, "test-operator", Some("Organização Teste".to_string()))
        .await
}

/// Creates a test managed account.
pub async fn create_test_account(
    db: &DatabaseConnection,
    organization_id: i64,
    name: &str,
    cpf: &str,
) -> Result<entities::managed_account::Model> {
    account::create_account(
        db,
        organization_id,
        name.to_string(),
        cpf.to_string(),
        None,
        None,
    )
    .await
}

/// Creates a test loyalty program with a zero starting balance.
pub async fn create_test_program(
    db: &DatabaseConnection,
    organization_id: i64,
    managed_account_id: i64,
    program_type: ProgramType,
) -> Result<entities::loyalty_program::Model> {
    program::create_program(
        db,
        organization_id,
        program::CreateProgramData {
            managed_account_id,
            program_type,
            account_number: None,
            initial_balance: 0,
        },
    )
    .await
}

/// Creates a single-installment test purchase with sensible defaults.
///
/// # Defaults
/// * `purchase_date`: 2025-01-10
/// * `installments`: 1, no due date, no card, no notes
pub async fn create_test_purchase(
    db: &DatabaseConnection,
    organization_id: i64,
    program: &entities::loyalty_program::Model,
    amount_miles: i64,
    total_cost_brl: f64,
) -> Result<entities::purchase::Model> {
    purchase::create_purchase(
        db,
        organization_id,
        purchase::CreatePurchaseData {
            managed_account_id: program.managed_account_id,
            loyalty_program_id: program.id,
            amount_miles,
            total_cost_brl,
            purchase_date: date(2025, 1, 10),
            installments: 1,
            first_due_date: None,
            credit_card_id: None,
            notes: None,
        },
    )
    .await
}

/// Creates a test sale with sensible defaults.
///
/// # Defaults
/// * `sale_date`: 2025-02-05
/// * channel HOTMILHAS, no beneficiary, no payment dates, no notes
pub async fn create_test_sale(
    db: &DatabaseConnection,
    organization_id: i64,
    loyalty_program_id: i64,
    amount_miles: i64,
    total_price_brl: f64,
) -> Result<entities::sale::Model> {
    sale::create_sale(
        db,
        organization_id,
        sale::CreateSaleData {
            loyalty_program_id,
            beneficiary_id: None,
            amount_miles,
            total_price_brl,
            sale_channel: SaleChannel::Hotmilhas,
            sale_date: date(2025, 2, 5),
            expected_payment_date: None,
            customer_name: None,
            notes: None,
        },
    )
    .await
}

/// Sets up a complete test environment with one LATAM program.
/// Returns (db, organization, account, program) for common test scenarios.
pub async fn setup_with_program() -> Result<(
    DatabaseConnection,
    entities::organization::Model,
    entities::managed_account::Model,
    entities::loyalty_program::Model,
)> {
    let db = setup_test_db().await?;
    let org = create_test_organization(&db).await?;
    let account = create_test_account(&db, org.id, "Ana Teste", "123.456.789-00").await?;
    let program = create_test_program(&db, org.id, account.id, ProgramType::Latam).await?;
    Ok((db, org, account, program))
}
