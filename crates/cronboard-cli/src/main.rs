use std::sync::Arc;

use clap::Parser;
use cronboard_core::{types::FILTER_COLUMNS, CronboardConfig};
use cronboard_scheduler::{
    selector::PLACEHOLDER_FILTER, HandlerRegistry, JobTrigger, SelectionRequest,
    SqliteScheduleStore, StaticCatalog,
};
use tracing::{error, info, warn};

mod args;
mod output;

use args::{Cli, Command, SelectionArgs};

/// Used when `RUST_LOG` is unset. The binary logs under the `cronboard` target.
const DEFAULT_LOG_FILTER: &str = "cronboard=info,cronboard_core=info,cronboard_scheduler=info";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!(code = e.code(), "{e}");
        return Err(e.into());
    }
    Ok(())
}

/// Job failures are reported in the output, never returned here; only setup
/// problems (config, database, selection payload) are errors.
fn run(cli: Cli) -> cronboard_core::Result<()> {
    // explicit --config / CRONBOARD_CONFIG > ~/.cronboard/cronboard.toml
    let config = CronboardConfig::load(cli.config.as_deref())?;

    let db_path = &config.database.path;
    ensure_parent_dir(db_path);
    info!(path = %db_path, "opening SQLite database");
    let store = SqliteScheduleStore::open(db_path)?;

    let catalog = StaticCatalog::from_config(&config);
    info!(jobs = catalog.len(), "job catalog loaded");

    let trigger = JobTrigger::new(
        Arc::new(catalog),
        Arc::new(store),
        Arc::new(HandlerRegistry::with_builtins()),
    );

    let mut out = std::io::stdout().lock();
    match cli.command {
        Command::List(selection) => {
            let names = resolve(&trigger, &selection)?;
            output::print_jobs(&mut out, trigger.catalog(), &names)?;
        }
        Command::Run(selection) => {
            let names = resolve(&trigger, &selection)?;
            let outcome = trigger.execute_jobs(&names);
            output::print_execution(&mut out, &outcome)?;
        }
        Command::Schedule { selection, status } => {
            let names = resolve(&trigger, &selection)?;
            let outcome = trigger.schedule_jobs(&names, status);
            output::print_enqueue(&mut out, &outcome, status)?;
        }
        Command::History { job, limit } => {
            let records = trigger.history(job.as_deref(), limit)?;
            output::print_history(&mut out, &records)?;
        }
    }
    Ok(())
}

fn resolve(trigger: &JobTrigger, selection: &SelectionArgs) -> cronboard_core::Result<Vec<String>> {
    let request = match (selection.request(), &selection.payload) {
        (Some(request), _) => request,
        (None, Some(raw)) => {
            let payload: serde_json::Value = serde_json::from_str(raw)?;
            SelectionRequest::from_payload(&payload)?
        }
        (None, None) => SelectionRequest::default(),
    };

    if let SelectionRequest::Filtered { filters } = &request {
        for column in filters.keys() {
            if column != PLACEHOLDER_FILTER && !FILTER_COLUMNS.contains(&column.as_str()) {
                warn!(%column, "unknown filter column; it only matches an empty value");
            }
        }
    }

    Ok(trigger.resolve(&request))
}

fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_log_filter_covers_every_crate() {
        assert_eq!(
            DEFAULT_LOG_FILTER,
            "cronboard=info,cronboard_core=info,cronboard_scheduler=info"
        );
        assert!(tracing_subscriber::EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
    }
}
