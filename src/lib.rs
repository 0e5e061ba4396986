pub mod analyzer;
pub mod cli;
pub mod data;
pub mod dataset;
pub mod drift;
pub mod error;
pub mod io_utils;
pub mod mapping;
pub mod profile;
pub mod report;
pub mod stats;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};

use crate::{
    analyzer::ProfileAnalyzer,
    cli::{Cli, Commands, OutputFormat, ProfileArgs},
    dataset::Dataset,
    mapping::ColumnMapping,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_profiler", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Profile(args) => handle_profile(&args),
    }
}

fn handle_profile(args: &ProfileArgs) -> Result<()> {
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let mapping = ColumnMapping::load(&args.mapping)
        .with_context(|| format!("Loading column mapping from {:?}", args.mapping))?;

    let reference_delimiter = io_utils::resolve_input_delimiter(&args.reference, args.delimiter);
    let reference = Dataset::from_csv(&args.reference, &mapping, reference_delimiter, encoding)
        .with_context(|| format!("Loading reference snapshot {:?}", args.reference))?;
    info!(
        "Loaded reference snapshot '{}' with {} row(s)",
        args.reference.display(),
        reference.row_count()
    );

    let current = match &args.current {
        Some(path) => {
            let delimiter = io_utils::resolve_input_delimiter(path, args.delimiter);
            let snapshot = Dataset::from_csv(path, &mapping, delimiter, encoding)
                .with_context(|| format!("Loading current snapshot {path:?}"))?;
            info!(
                "Loaded current snapshot '{}' with {} row(s)",
                path.display(),
                snapshot.row_count()
            );
            Some(snapshot)
        }
        None => None,
    };

    let result = ProfileAnalyzer::run(&reference, current.as_ref(), &mapping)?;

    match args.format {
        OutputFormat::Table => report::print_result(&result),
        OutputFormat::Json => println!("{}", report::result_to_json(&result)?),
    }
    Ok(())
}
