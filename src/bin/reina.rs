//! Reina Binary - investment ranking CLI
//!
//! Loads the ZIP reference table and opens the market database, then either
//! runs the interactive prompt loop or a single query given on the command
//! line.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin reina
//! cargo run --release --bin reina -- zip 20164 --radius 15
//! cargo run --release --bin reina -- city Reston
//! ```
//!
//! ## Environment Variables
//!
//! - REINA_DB_PATH - SQLite database with the market table (default: reina_redfinzipdata.db)
//! - REINA_TABLE - Market table name (default: zip_data)
//! - REINA_ZIPS_PATH - Reference CSV (default: uszips.csv)
//! - REINA_TOP_K - Entries per result (default: 5)
//! - REINA_DEFAULT_RADIUS_MILES - Radius when none is given (default: 20)
//! - RUST_LOG - Logging level (optional, default: info)

use clap::{Parser, Subcommand};
use reina::cli::{parse_radius, CommandLoop};
use reina::ui::Report;
use reina::{
    PostalCode, Query, QueryEngine, QueryError, Ranker, ReferenceDirectory, ReinaConfig,
    RegionKind, SqliteMarketGateway,
};
use std::io;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "reina",
    version,
    about = "Rank ZIP codes by real-estate investment score"
)]
struct Cli {
    /// SQLite database with the market table (overrides REINA_DB_PATH)
    #[arg(long, value_name = "FILE")]
    db: Option<PathBuf>,

    /// Reference CSV of ZIP coordinates (overrides REINA_ZIPS_PATH)
    #[arg(long, value_name = "FILE")]
    zips: Option<PathBuf>,

    /// Market table name (overrides REINA_TABLE)
    #[arg(long)]
    table: Option<String>,

    /// Entries per result (overrides REINA_TOP_K)
    #[arg(long, value_name = "K")]
    top_k: Option<usize>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    #[command(subcommand)]
    command: Option<OneShot>,
}

/// Run a single query and exit instead of starting the prompt loop
#[derive(Subcommand, Debug)]
enum OneShot {
    /// Top ZIPs near a center ZIP
    Zip {
        code: String,
        /// Search radius in miles
        #[arg(short, long)]
        radius: Option<String>,
    },
    /// Top ZIPs in a city
    City { name: String },
    /// Top ZIPs in a state
    State { name: String },
}

impl OneShot {
    fn into_query(self, default_radius: f64) -> Result<Query, QueryError> {
        match self {
            OneShot::Zip { code, radius } => Ok(Query::Proximity {
                center: PostalCode::parse(&code)?,
                radius_miles: parse_radius(radius.as_deref().unwrap_or(""), default_radius)?,
            }),
            OneShot::City { name } => Ok(Query::Region {
                kind: RegionKind::City,
                value: name,
            }),
            OneShot::State { name } => Ok(Query::Region {
                kind: RegionKind::State,
                value: name,
            }),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ReinaConfig::from_env();
    if let Some(db) = &cli.db {
        config.db_path = db.display().to_string();
    }
    if let Some(zips) = &cli.zips {
        config.zips_path = zips.display().to_string();
    }
    if let Some(table) = &cli.table {
        config.table = table.clone();
    }
    if let Some(top_k) = cli.top_k.filter(|k| *k > 0) {
        config.top_k = top_k;
    }

    log::info!("🚀 Starting Reina");
    log::info!("📊 Configuration:");
    log::info!("   Database: {} (table {})", config.db_path, config.table);
    log::info!("   Reference ZIPs: {}", config.zips_path);
    log::info!("   Top-K: {}", config.top_k);
    log::info!("   Default radius: {} mi", config.default_radius_miles);

    let directory = ReferenceDirectory::load(&config.zips_path)
        .inspect_err(|e| log::error!("❌ Failed to load reference ZIPs: {}", e))?;
    let gateway = SqliteMarketGateway::open(&config.db_path, &config.table)
        .inspect_err(|e| log::error!("❌ Failed to open market database: {}", e))?;
    log::info!("📊 Market table rows: {}", gateway.row_count()?);

    let engine = QueryEngine::new(&directory, gateway).with_ranker(Ranker::new(config.top_k));
    let report = if cli.no_color {
        Report::new(false)
    } else {
        Report::for_stdout()
    };

    match cli.command {
        Some(one_shot) => {
            let result = one_shot
                .into_query(config.default_radius_miles)
                .and_then(|query| engine.run(query));
            match result {
                Ok(outcome) => report.render(&mut io::stdout().lock(), &outcome)?,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        None => {
            let cli_loop = CommandLoop::new(&engine, report, config.default_radius_miles);
            cli_loop.run(&mut io::stdin().lock(), &mut io::stdout().lock())?;
        }
    }

    Ok(())
}
