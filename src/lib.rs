pub mod boe;
pub mod cli;
pub mod config;
pub mod data;
pub mod enrich;
pub mod error;
pub mod ingest;
pub mod parse;
pub mod query;
pub mod reference;
pub mod registry;
pub mod schema;
pub mod table;
pub mod workspace;

use std::{env, fs, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};

use crate::{
    cli::{Cli, Commands, CommonArgs},
    config::Config,
    workspace::Workspace,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("calldeck", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Upload(args) => handle_upload(&args),
        Commands::Files(args) => handle_files(&args),
        Commands::Remove(args) => handle_remove(&args),
        Commands::Restore(args) => handle_restore(&args),
        Commands::Data(args) => handle_data(&args),
        Commands::Enrich(args) => handle_enrich(&args),
        Commands::Query(args) => handle_query(&args),
    }
}

fn open_workspace(common: &CommonArgs) -> Result<Workspace> {
    let mut config = Config::load(common.config.as_deref())?;
    if let Some(data_dir) = &common.data_dir {
        config.data_dir = data_dir.clone();
    }
    Workspace::open(config)
}

fn handle_upload(args: &cli::UploadArgs) -> Result<()> {
    let mut workspace = open_workspace(&args.common)?;
    let outcome = workspace.upload(&args.input, &args.uploaded_by)?;
    if outcome.diff.has_changes {
        info!(
            "Schema drift: {} new, {} missing column(s)",
            outcome.diff.new_columns.len(),
            outcome.diff.missing_columns.len()
        );
    }
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

fn handle_files(args: &cli::FilesArgs) -> Result<()> {
    let workspace = open_workspace(&args.common)?;
    let files = workspace.list_files();
    if args.json {
        println!("{}", serde_json::to_string_pretty(files)?);
        return Ok(());
    }
    let headers = [
        "id",
        "name",
        "rows",
        "columns",
        "uploaded_by",
        "uploaded_at",
        "active",
    ]
    .iter()
    .map(|h| h.to_string())
    .collect::<Vec<_>>();
    let rows = files
        .iter()
        .map(|f| {
            vec![
                f.id.to_string(),
                f.original_name.clone(),
                f.row_count.to_string(),
                f.columns.len().to_string(),
                f.uploaded_by.clone(),
                f.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                f.active.to_string(),
            ]
        })
        .collect::<Vec<_>>();
    table::print_table(&headers, &rows);
    Ok(())
}

fn handle_remove(args: &cli::RemoveArgs) -> Result<()> {
    let mut workspace = open_workspace(&args.common)?;
    let file = workspace.remove_file(args.id, args.purge)?;
    println!("Removed '{}' ({})", file.original_name, file.id);
    Ok(())
}

fn handle_restore(args: &cli::RestoreArgs) -> Result<()> {
    let mut workspace = open_workspace(&args.common)?;
    let file = workspace.restore_file(args.id)?;
    println!("Restored '{}' ({})", file.original_name, file.id);
    Ok(())
}

fn handle_data(args: &cli::DataArgs) -> Result<()> {
    let mut workspace = open_workspace(&args.common)?;
    let dataset = workspace.load_all(args.force_refresh)?;
    if args.table {
        let headers = dataset.columns.clone();
        let limit = if args.limit > 0 {
            args.limit.min(dataset.rows.len())
        } else {
            dataset.rows.len()
        };
        let rows = dataset.rows[..limit]
            .iter()
            .map(|row| {
                headers
                    .iter()
                    .map(|column| row.get(column).map(|c| c.display()).unwrap_or_default())
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();
        table::print_table(&headers, &rows);
    } else {
        println!("{}", serde_json::to_string_pretty(dataset)?);
    }
    Ok(())
}

fn handle_enrich(args: &cli::EnrichArgs) -> Result<()> {
    let mut workspace = open_workspace(&args.common)?;
    let outcome = workspace.enrich(args.kind.into())?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

fn handle_query(args: &cli::QueryArgs) -> Result<()> {
    let raw = match (&args.spec, &args.spec_file) {
        (Some(inline), _) => inline.clone(),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("Reading query specification {path:?}"))?,
        (None, None) => {
            return Err(error::CoreError::validation(
                "Provide a query specification via --spec or --spec-file",
            )
            .into())
        }
    };
    let spec = query::parse_spec(&raw)?;
    let mut workspace = open_workspace(&args.common)?;
    let outcome = workspace.query(&spec)?;
    println!("{}", serde_json::to_string_pretty(&outcome.to_json())?);
    Ok(())
}
