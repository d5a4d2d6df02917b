use bulkpool::application::engine::{PaymentSubmission, PoolEngine};
use bulkpool::domain::payment::{PaymentDetails, PaymentOutcome};
use bulkpool::domain::ports::PoolStoreBox;
use bulkpool::error::Result as PoolResult;
use bulkpool::infrastructure::clock::SystemClock;
use bulkpool::infrastructure::in_memory::InMemoryPoolStore;
use bulkpool::infrastructure::seed::{default_pools, load_pools, seed_store};
use bulkpool::interfaces::csv::command_reader::{CommandReader, PoolCommand};
use bulkpool::interfaces::csv::pool_writer::PoolWriter;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input commands CSV file
    input: PathBuf,

    /// JSON file with the pools to seed. Defaults to the built-in demo pools.
    #[arg(long)]
    pools: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Only report pools whose text fields contain this query
    #[arg(long, default_value = "")]
    query: String,

    /// Only report pools whose supplier or organizer location contains this token
    #[arg(long)]
    country: Option<String>,
}

#[cfg(feature = "storage-rocksdb")]
fn open_store(db_path: Option<PathBuf>) -> Result<PoolStoreBox> {
    use bulkpool::infrastructure::rocksdb::RocksDBStore;

    match db_path {
        Some(path) => Ok(Box::new(RocksDBStore::open(path).into_diagnostic()?)),
        None => Ok(Box::new(InMemoryPoolStore::new())),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_store(db_path: Option<PathBuf>) -> Result<PoolStoreBox> {
    if db_path.is_some() {
        eprintln!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(Box::new(InMemoryPoolStore::new()))
}

async fn run_command(engine: &PoolEngine, command: PoolCommand) -> PoolResult<()> {
    match command {
        PoolCommand::Join {
            pool,
            member,
            quantity,
        } => {
            engine.join(&pool, &member, quantity).await?;
        }
        PoolCommand::Pay(submission) => {
            engine.submit_payment(submission).await?;
        }
        PoolCommand::Control { pool, member } => {
            let control_number = engine.generate_control_number(&pool).await?;
            let outcome = engine
                .submit_payment(PaymentSubmission {
                    pool,
                    member,
                    quantity: None,
                    details: PaymentDetails::Control {
                        control_number: Some(control_number),
                    },
                })
                .await?;
            if let PaymentOutcome::PendingConfirmation { control_number } = outcome {
                eprintln!("Pending confirmation: {}", control_number);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")),
        )
        .init();

    let cli = Cli::parse();

    let store = open_store(cli.db_path)?;

    let pools = match &cli.pools {
        Some(path) => load_pools(File::open(path).into_diagnostic()?).into_diagnostic()?,
        None => default_pools(),
    };
    let seeded = seed_store(&*store, pools).await.into_diagnostic()?;
    tracing::info!(seeded, "pools seeded");

    let engine = PoolEngine::new(store, Box::new(SystemClock));

    let file = File::open(cli.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    for command in reader.commands() {
        match command {
            Ok(command) => {
                if let Err(e) = run_command(&engine, command).await {
                    eprintln!("Error processing command: {}", e);
                }
            }
            Err(e) => {
                eprintln!("Error reading command: {}", e);
            }
        }
    }

    let matching = engine
        .search(&cli.query, cli.country.as_deref())
        .await
        .into_diagnostic()?;

    let stdout = io::stdout();
    let mut writer = PoolWriter::new(stdout.lock());
    writer.write_pools(&matching).into_diagnostic()?;

    Ok(())
}
