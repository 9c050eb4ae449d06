//! termsync: make a term store snapshot match a taxonomy model.
//!
//! Usage:
//!   termsync --model taxonomy.json --store store.json
//!   termsync -m taxonomy.json -s store.json --parameter Client=Contoso --overwrite
//!
//! Resolved ids are written back into the model file so later runs match by id.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use termsync_cli::{RunOptions, parse_parameter, run, summarize};
use termsync_types::Lcid;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "termsync")]
#[command(about = "Reconcile a taxonomy model against a term store")]
struct Args {
    /// Path to the JSON taxonomy model
    #[arg(short, long)]
    model: PathBuf,

    /// Path to the JSON term store snapshot (created if missing)
    #[arg(short, long)]
    store: PathBuf,

    /// JSON array of known principals; all principals are accepted when omitted
    #[arg(short, long)]
    principals: Option<PathBuf>,

    /// Token parameter used by {parameter:KEY}, may be repeated
    #[arg(long = "parameter", value_name = "KEY=VALUE", value_parser = parse_parameter)]
    parameters: Vec<(String, String)>,

    /// Default language of a new store
    #[arg(long, default_value_t = Lcid::EN_US)]
    language: Lcid,

    /// Update matched nodes in groups that do not set their own behavior
    #[arg(long)]
    overwrite: bool,

    /// Reconcile without writing the store or the model back
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    info!("Reconciling {} against {}", args.model.display(), args.store.display());

    let options = RunOptions {
        model: args.model,
        store: args.store,
        principals: args.principals,
        parameters: args.parameters,
        language: args.language,
        overwrite: args.overwrite,
        dry_run: args.dry_run,
    };
    let report = run(&options)?;
    print!("{}", summarize(&report));
    Ok(())
}
