use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use learning_tracker::config::{ServerConfig, TransferConfig};
use learning_tracker::{api, db, transfer};

#[derive(Parser)]
#[command(name = "learning-tracker")]
#[command(about = "Daily learning tracker API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server (storage from DATABASE_URL)
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port for HTTP API
        #[arg(short, long, default_value = "8000")]
        port: u16,
    },
    /// Copy every day record from SQLITE_PATH into POSTGRES_URL
    MigrateToPostgres,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "learning_tracker=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn serve(host: &str, port: u16) -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;
    let db = db::Database::open(&config.database_url)
        .with_context(|| format!("Failed to open database {}", config.database_url))?;
    db.migrate().await.context("Failed to create day_records table")?;

    let app = api::create_router(db.clone());

    let listener = tokio::net::TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind {host}:{port}"))?;
    let addr = listener.local_addr()?;
    tracing::info!(
        "Learning tracker listening on http://{} (db: {})",
        addr,
        db.connection_info()
    );

    axum::serve(listener, app).await?;
    Ok(())
}

async fn migrate_to_postgres() -> anyhow::Result<()> {
    let config = TransferConfig::from_env()?;
    let report = transfer::run(&config).await?;
    tracing::info!(
        "Transfer finished: {} rows read, {} rows written",
        report.read,
        report.written
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Some(Commands::Serve { host, port }) => serve(&host, port).await,
        Some(Commands::MigrateToPostgres) => migrate_to_postgres().await,
        None => serve("127.0.0.1", 8000).await,
    }
}
