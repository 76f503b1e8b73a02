use std::error::Error;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ticket_store::core::errors::QueryError;
use ticket_store::engine::{FileStore, IngestReport, QueryEngine, StorageGateway, UpsertEngine};
use ticket_store::io::RecordSource;

#[derive(Parser)]
#[command(
    name = "ticket-store",
    version,
    about = "Batch-load ticket orders and barcodes, then report on them"
)]
struct Cli {
    /// Snapshot file backing the store
    #[arg(
        long,
        env = "TICKET_STORE_PATH",
        default_value = "tickets.json",
        global = true
    )]
    store: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Populate an empty store from two CSV extracts
    Load {
        orders: PathBuf,
        barcodes: PathBuf,
        /// Clear the store first instead of failing when it is non-empty
        #[arg(long)]
        truncate: bool,
    },
    /// Merge two CSV extracts into an existing store
    Append { orders: PathBuf, barcodes: PathBuf },
    /// Print every barcode with its order and customer
    ListBarcodes,
    /// Rank customers by number of tickets purchased
    TopCustomers {
        #[arg(default_value_t = 5)]
        n: usize,
    },
    /// Count barcodes not yet redeemed
    UnusedBarcodes,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut store = FileStore::open(&cli.store)?;

    match cli.command {
        Command::Load {
            orders,
            barcodes,
            truncate,
        } => {
            let (orders, barcodes) = order_inputs(orders, barcodes)?;
            if truncate {
                store.truncate()?;
            }
            let report = UpsertEngine::new(&mut store)
                .load(open_source(&orders)?, open_source(&barcodes)?)?;
            store.persist()?;
            print_report(&report);
        }
        Command::Append { orders, barcodes } => {
            let (orders, barcodes) = order_inputs(orders, barcodes)?;
            let report = UpsertEngine::new(&mut store)
                .append(open_source(&orders)?, open_source(&barcodes)?)?;
            store.persist()?;
            print_report(&report);
        }
        Command::ListBarcodes => {
            let rows = QueryEngine::new(&store).list_barcodes().map_err(query_hint)?;
            let mut out = csv::Writer::from_writer(std::io::stdout());
            out.write_record(["barcode_id", "order_id", "customer_id", "used"])?;
            for row in rows {
                out.write_record(&[
                    row.barcode_id,
                    row.order_id,
                    row.customer_id,
                    row.used.to_string(),
                ])?;
            }
            out.flush()?;
        }
        Command::TopCustomers { n } => {
            let ranked = QueryEngine::new(&store).top_customers(n).map_err(query_hint)?;
            let mut out = csv::Writer::from_writer(std::io::stdout());
            out.write_record(["customer_id", "tickets"])?;
            for rank in ranked {
                out.write_record(&[rank.customer_id, rank.tickets.to_string()])?;
            }
            out.flush()?;
        }
        Command::UnusedBarcodes => {
            let count = QueryEngine::new(&store)
                .unused_barcodes_count()
                .map_err(query_hint)?;
            println!("{count}");
        }
    }

    Ok(())
}

fn open_source(path: &Path) -> Result<RecordSource<'static>, Box<dyn Error>> {
    RecordSource::from_path(path).map_err(|e| format!("{}: {e}", path.display()).into())
}

// The operator may hand over the two extracts in either order; the orders
// file is the one whose header carries customer_id.
fn order_inputs(a: PathBuf, b: PathBuf) -> Result<(PathBuf, PathBuf), Box<dyn Error>> {
    let file = File::open(&a).map_err(|e| format!("{}: {e}", a.display()))?;
    let mut header = String::new();
    BufReader::new(file).read_line(&mut header)?;
    if header.contains("customer_id") {
        Ok((a, b))
    } else {
        Ok((b, a))
    }
}

fn print_report(report: &IngestReport) {
    for file_report in [&report.orders, &report.barcodes] {
        println!(
            "{}: {} accepted, {} updated, {} skipped, {} rejected",
            file_report.file,
            file_report.accepted,
            file_report.updated,
            file_report.skipped,
            file_report.rejected
        );
    }
    for (file, error) in report.errors() {
        println!("  {file}: {error}");
    }
}

fn query_hint(e: QueryError) -> Box<dyn Error> {
    match e {
        QueryError::DataNotLoaded => {
            format!("{e}; run `ticket-store load <orders.csv> <barcodes.csv>` first").into()
        }
        other => Box::new(other),
    }
}
