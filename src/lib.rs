// src/lib.rs

pub mod cli;
pub mod cluster;
pub mod config;
pub mod errors;
pub mod logging;
pub mod report;
pub mod types;
pub mod unit;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{assemble, load_and_validate};

pub use crate::cluster::{ChainPath, IsolatedDependencyChain, TaskUnitCluster};
pub use crate::errors::TaskbraidError;
pub use crate::unit::{PrerequisitesIteration, TaskEvent, TaskUnit, UnitDefinition};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - project loading and validation
/// - unit assembly against a single reference time
/// - clustering and ranking
/// - the text report on stdout
pub fn run(args: CliArgs) -> Result<()> {
    let project_path = PathBuf::from(&args.project);
    let cfg = load_and_validate(&project_path)
        .with_context(|| format!("loading project {}", project_path.display()))?;

    let now = reference_time(args.now, cfg.project.now);
    info!(%now, project = %project_path.display(), "using reference time");

    let project = assemble(&cfg, now)?;

    if args.dry_run {
        print!("{}", report::render_units(&project));
        debug!("dry-run complete (no clustering)");
        return Ok(());
    }

    let cluster = TaskUnitCluster::new(project.heads.clone())?;
    print!("{}", report::render_units(&project));
    println!();
    print!("{}", report::render_cluster(&cluster));
    Ok(())
}

/// CLI override, then the project file, then the wall clock.
///
/// This is the only place the wall clock is read.
fn reference_time(cli: Option<DateTime<Utc>>, file: Option<DateTime<Utc>>) -> DateTime<Utc> {
    cli.or(file).unwrap_or_else(Utc::now)
}
