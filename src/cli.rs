use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Normalize and query collection-bin CSV sources", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Ingest every source file and print the load report
    Ingest(IngestArgs),
    /// Ingest sources, then filter bins by free text and/or district
    Query(QueryArgs),
    /// Manage the YAML configuration file
    #[command(subcommand)]
    Config(ConfigCommands),
    /// List the district table in effect
    Districts(DistrictsArgs),
}

#[derive(Debug, Clone, Args)]
pub struct SourceArgs {
    /// Directory holding the per-district source files
    #[arg(short = 'd', long = "data-dir", default_value = "data")]
    pub data_dir: PathBuf,
    /// Optional YAML configuration (defaults are used when omitted)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct IngestArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Emit the report as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Case-insensitive substring to match against addresses
    #[arg(short = 'q', long = "query")]
    pub query: Option<String>,
    /// District name (or fragment) the address must contain
    #[arg(long)]
    pub district: Option<String>,
    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
    /// Render results as a table instead of JSON
    #[arg(long, conflicts_with = "pretty")]
    pub table: bool,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Write the default configuration to a file
    Init(ConfigInitArgs),
}

#[derive(Debug, Args)]
pub struct ConfigInitArgs {
    /// Destination YAML file
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct DistrictsArgs {
    /// Optional YAML configuration whose district table should be listed
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
}
