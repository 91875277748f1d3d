//! oxide-rest CLI
//!
//! Serves a SQLite database over HTTP.

use std::sync::Arc;

use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Filterable CRUD endpoints for every table of a SQLite database.
#[derive(Parser)]
#[command(name = "oxide-rest")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL (SQLite path or connection string).
    #[arg(short, long, env = "DATABASE_URL", default_value = "sqlite:db.sqlite3")]
    database: String,

    /// Address to listen on.
    #[arg(long, env = "OXIDE_REST_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on.
    #[arg(short, long, env = "OXIDE_REST_PORT", default_value_t = 3000)]
    port: u16,

    /// Maximum number of pooled connections.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    /// Largest request body accepted, in bytes.
    #[arg(long, default_value_t = oxide_rest::DEFAULT_MAX_BODY_BYTES)]
    max_body_bytes: usize,

    /// Print the introspected catalog as JSON and exit.
    #[arg(long)]
    print_catalog: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let api = oxide_rest::connect(&cli.database, cli.max_connections)
        .await?
        .max_body_bytes(cli.max_body_bytes);

    if cli.print_catalog {
        println!(
            "{}",
            serde_json::to_string_pretty(api.executor().catalog())?
        );
        return Ok(());
    }

    for route in api.routes() {
        info!(path = %route.path, table = %route.table, "Registered route");
    }

    let listener = oxide_rest::bind(&cli.host, cli.port).await?;
    oxide_rest::serve(listener, Arc::new(api)).await?;
    Ok(())
}
