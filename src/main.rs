//! Milheiro snapshot binary.
//!
//! Boots the store, makes sure the operator's organization exists, and
//! prints the desk's inventory and cash-flow position.

use dotenvy::dotenv;
use milheiro::config;
use milheiro::core::{organization, report};
use milheiro::errors::{Error, Result};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (as early as possible)
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the main application configuration
    let app_config = config::load_app_configuration()
        .inspect_err(|e| error!("Failed to load application configuration: {e}"))?;
    info!("Successfully processed application configuration.");

    // 4. Initialize database
    let db = config::database::create_connection(&app_config.database_url)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {e}"))?;
    config::database::create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create tables: {e}"))?;

    // 5. Resolve the operator and their organization
    let operator_id = config::operator::get_operator_id()
        .ok_or(Error::NotAuthenticated)
        .inspect_err(|_| error!("OPERATOR_ID is not set"))?;
    let org = organization::ensure_organization(&db, &operator_id, config::operator::get_operator_name())
        .await
        .inspect(|org| info!("Operating as organization '{}' (id {})", org.name, org.id))?;

    // 6. Print the inventory snapshot
    let stats = report::inventory_stats(&db, org.id, &app_config.pricing).await?;
    println!("== Estoque de milhas ==");
    println!("Milhas em estoque:  {}", report::format_miles(stats.total_miles));
    println!("Total investido:    {}", report::format_brl(stats.total_invested));
    println!("CPM médio:          {}", report::format_brl(stats.avg_cpm));
    println!("Valor esperado:     {}", report::format_brl(stats.expected_value));
    for entry in &stats.programs {
        println!(
            "  {:12} {:>12} milhas  CPM {:>10}  valor {:>12}",
            entry.program.program_type.to_string(),
            report::format_miles(entry.program.current_balance),
            report::format_brl(entry.avg_cpm),
            report::format_brl(entry.expected_value),
        );
    }
    if !stats.negative_balance_programs.is_empty() {
        warn!(
            "{} program(s) with negative balance: {:?}",
            stats.negative_balance_programs.len(),
            stats.negative_balance_programs
        );
    }

    // 7. Print the cash-flow snapshot
    let today = chrono::Utc::now().date_naive();
    let items = report::project_cash_flow(&db, org.id, today).await?;
    let summary = report::summarize_cash_flow(&items, today);
    println!("== Fluxo de caixa ==");
    println!("Saldo realizado:    {}", report::format_brl(summary.realized_balance));
    println!(
        "Mês atual:          +{} / -{}",
        report::format_brl(summary.month_income),
        report::format_brl(summary.month_expenses),
    );
    println!(
        "Próximo mês:        +{} / -{}",
        report::format_brl(summary.next_month_income),
        report::format_brl(summary.next_month_expenses),
    );
    println!("Saldo projetado:    {}", report::format_brl(summary.projected_balance));

    Ok(())
}
