//! FitTrack
//!
//! An MCP server for fitness and habit tracking.

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use fittrack::build_info;
use fittrack::config::Config;
use fittrack::db::Database;
use fittrack::mcp::FitTrackService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();

    // Logging goes to stderr so it never interferes with MCP stdio
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.log_filter)?)
        .with_writer(std::io::stderr)
        .init();

    build_info::print_startup_banner();
    tracing::info!(path = %config.database_path.display(), "starting MCP server on stdio");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let database = Database::open_and_migrate(&config.database_path)?;
    let version = database.schema_version()?;
    tracing::info!(schema_version = version, "database ready");

    let service = FitTrackService::new(database);

    let server = service.serve((stdin(), stdout())).await?;
    server.waiting().await?;

    Ok(())
}
