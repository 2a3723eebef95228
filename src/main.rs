// Business Registry Filer - CLI
//
//   business-filer init-db          create tables (WAL mode)
//   business-filer process <id>     apply one filing
//   business-filer [queue]          consume {"filing": {"id": N}} lines from stdin

use anyhow::{bail, Context, Result};
use business_registry::{setup_database, Config, FilingMessage, FilingWorker, Services};
use rusqlite::Connection;
use std::env;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,business_registry=debug")),
        )
        .init();

    let config = Config::from_env();
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("init-db") => run_init_db(&config),
        Some("process") => {
            let filing_id: i64 = args
                .get(2)
                .context("usage: business-filer process <filing-id>")?
                .parse()
                .context("filing id must be an integer")?;
            run_process(&config, filing_id).await
        }
        Some("queue") | None => run_queue(&config).await,
        Some(other) => bail!("unknown command '{other}' (expected init-db, process or queue)"),
    }
}

fn open_database(config: &Config) -> Result<Connection> {
    let conn = Connection::open(&config.database_path)
        .with_context(|| format!("Failed to open database {}", config.database_path))?;
    setup_database(&conn)?;
    Ok(conn)
}

fn build_worker(config: &Config) -> Result<FilingWorker> {
    let conn = open_database(config)?;
    let services = Services::from_config(config)?;
    Ok(FilingWorker::new(Arc::new(Mutex::new(conn)), services))
}

fn run_init_db(config: &Config) -> Result<()> {
    println!("🗄️  Business Registry - database setup");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    open_database(config)?;
    println!("✓ Database initialized with WAL mode: {}", config.database_path);

    Ok(())
}

async fn run_process(config: &Config, filing_id: i64) -> Result<()> {
    let worker = build_worker(config)?;
    let outcome = worker.process_filing(&FilingMessage::new(filing_id)).await?;

    println!("✅ Filing {filing_id}: {outcome:?}");
    Ok(())
}

async fn run_queue(config: &Config) -> Result<()> {
    let worker = build_worker(config)?;
    tracing::info!(database = %config.database_path, "Consuming filing messages from stdin");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        // one bad message never stops the queue
        match worker.handle_message(line).await {
            Ok(outcome) => tracing::info!(?outcome, "Message processed"),
            Err(e) => tracing::error!(error = %e, payload = line, "Message failed"),
        }
    }

    tracing::info!("stdin closed, exiting");
    Ok(())
}
