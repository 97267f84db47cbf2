use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use crate::workspace::EnrichmentKind;

#[derive(Debug, Parser)]
#[command(author, version, about = "Call-record analytics data core", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Register a call-log file (.csv, .tsv, .txt) and report schema drift
    Upload(UploadArgs),
    /// List registered files, active and inactive
    Files(FilesArgs),
    /// Deactivate a registered file (soft delete)
    Remove(RemoveArgs),
    /// Reactivate a previously removed file
    Restore(RestoreArgs),
    /// Print the merged dataset for the active file set
    Data(DataArgs),
    /// Run one enrichment pass over the merged dataset
    Enrich(EnrichArgs),
    /// Apply a structured filter/sort/aggregation specification
    Query(QueryArgs),
}

#[derive(Debug, Args)]
pub struct CommonArgs {
    /// Optional YAML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Data directory override (registry, stored uploads, caches)
    #[arg(long = "data-dir")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct UploadArgs {
    #[command(flatten)]
    pub common: CommonArgs,
    /// Call-log file to register
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Uploader identity recorded on the file
    #[arg(long = "uploaded-by", default_value = "local")]
    pub uploaded_by: String,
}

#[derive(Debug, Args)]
pub struct FilesArgs {
    #[command(flatten)]
    pub common: CommonArgs,
    /// Emit JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct RemoveArgs {
    #[command(flatten)]
    pub common: CommonArgs,
    /// Id of the registered file
    pub id: Uuid,
    /// Also delete the stored bytes (makes restore impossible)
    #[arg(long)]
    pub purge: bool,
}

#[derive(Debug, Args)]
pub struct RestoreArgs {
    #[command(flatten)]
    pub common: CommonArgs,
    /// Id of the registered file
    pub id: Uuid,
}

#[derive(Debug, Args)]
pub struct DataArgs {
    #[command(flatten)]
    pub common: CommonArgs,
    /// Rebuild the merged dataset even when a cached copy exists
    #[arg(long = "force-refresh")]
    pub force_refresh: bool,
    /// Render as a table instead of JSON
    #[arg(long)]
    pub table: bool,
    /// Limit the number of rows printed (0 means all)
    #[arg(long, default_value_t = 0)]
    pub limit: usize,
}

#[derive(Debug, Args)]
pub struct EnrichArgs {
    #[command(flatten)]
    pub common: CommonArgs,
    /// Enrichment pass to run
    pub kind: EnrichKindArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum EnrichKindArg {
    Carrier,
    Geocode,
    Timezone,
    PropertyTax,
    PropertyLinks,
}

impl From<EnrichKindArg> for EnrichmentKind {
    fn from(value: EnrichKindArg) -> Self {
        match value {
            EnrichKindArg::Carrier => EnrichmentKind::Carrier,
            EnrichKindArg::Geocode => EnrichmentKind::Geocode,
            EnrichKindArg::Timezone => EnrichmentKind::Timezone,
            EnrichKindArg::PropertyTax => EnrichmentKind::PropertyTax,
            EnrichKindArg::PropertyLinks => EnrichmentKind::PropertyLinks,
        }
    }
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    #[command(flatten)]
    pub common: CommonArgs,
    /// Inline JSON query specification
    #[arg(long = "spec", conflicts_with = "spec_file")]
    pub spec: Option<String>,
    /// Path to a JSON query specification
    #[arg(long = "spec-file")]
    pub spec_file: Option<PathBuf>,
}
