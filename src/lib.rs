pub mod address;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod coords;
pub mod dataset;
pub mod districts;
pub mod error;
pub mod ingest;
pub mod io_utils;
pub mod query;
pub mod resolver;
pub mod roles;
pub mod table;

use std::{collections::BTreeSet, env, io::Write, sync::OnceLock};

use anyhow::{Context, Result, bail};
use clap::Parser;
use itertools::Itertools;
use log::{LevelFilter, debug, info};

use crate::{
    catalog::BinCatalog,
    cli::{Cli, Commands, ConfigCommands},
    config::Config,
    ingest::LoadReport,
    query::BinQuery,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("bin_atlas", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Ingest(args) => handle_ingest(&args),
        Commands::Query(args) => handle_query(&args),
        Commands::Config(ConfigCommands::Init(args)) => handle_config_init(&args),
        Commands::Districts(args) => handle_districts(&args),
    }
}

fn open_catalog(args: &cli::SourceArgs) -> Result<(BinCatalog, LoadReport)> {
    let config = Config::load_or_default(args.config.as_deref())
        .with_context(|| format!("Loading configuration {:?}", args.config))?;
    BinCatalog::load(&args.data_dir, config)
        .with_context(|| format!("Ingesting sources from {:?}", args.data_dir))
}

fn handle_ingest(args: &cli::IngestArgs) -> Result<()> {
    let (_, report) = open_catalog(&args.source)?;
    if args.json {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        serde_json::to_writer_pretty(&mut handle, &report).context("Writing load report")?;
        writeln!(handle)?;
    } else {
        print!("{}", table::render_load_report(&report));
        println!(
            "{} record(s); loaded: [{}]; failed: [{}]",
            report.total_records,
            join_set(&report.succeeded_districts),
            join_set(&report.failed_districts)
        );
    }
    Ok(())
}

fn handle_query(args: &cli::QueryArgs) -> Result<()> {
    let (catalog, _) = open_catalog(&args.source)?;
    let query = BinQuery::new(args.query.as_deref(), args.district.as_deref());
    let results = catalog
        .query_engine()
        .query(&query)
        .context("Filtering collection bins")?;
    info!("Query returned {} record(s)", results.len());

    if args.table {
        print!("{}", table::render_records(&results));
        return Ok(());
    }
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    let written = if args.pretty {
        serde_json::to_writer_pretty(&mut handle, &results)
    } else {
        serde_json::to_writer(&mut handle, &results)
    };
    written.context("Writing query results")?;
    writeln!(handle)?;
    Ok(())
}

fn handle_config_init(args: &cli::ConfigInitArgs) -> Result<()> {
    if args.output.exists() && !args.force {
        bail!(
            "{:?} already exists; pass --force to overwrite",
            args.output
        );
    }
    Config::default()
        .save(&args.output)
        .with_context(|| format!("Writing configuration to {:?}", args.output))?;
    info!("Default configuration written to {:?}", args.output);
    Ok(())
}

fn handle_districts(args: &cli::DistrictsArgs) -> Result<()> {
    let config = Config::load_or_default(args.config.as_deref())?;
    debug!("Listing {} district rule(s)", config.districts.rules().len());
    print!("{}", table::render_districts(&config.districts));
    Ok(())
}

fn join_set(values: &BTreeSet<String>) -> String {
    values.iter().join(", ")
}
