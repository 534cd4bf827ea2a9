//! Bootstrap binary: prepares the `rosterbook` database schema.

use dotenvy::dotenv;
use rosterbook::config::database;
use rosterbook::errors::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Non-fatal; env vars can be set externally
    dotenv().ok();

    let db = database::create_connection().await?;
    database::create_tables(&db).await?;
    info!(url = %database::get_database_url(), "rosterbook schema ready");

    Ok(())
}
