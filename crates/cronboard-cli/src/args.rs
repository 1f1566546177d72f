use std::collections::BTreeMap;

use clap::{Args, Parser, Subcommand};
use cronboard_scheduler::{ScheduleStatus, SelectionRequest};

#[derive(Debug, Parser)]
#[command(name = "cronboard", version, about = "Run or enqueue catalog jobs on demand")]
pub struct Cli {
    /// Path to cronboard.toml (default: ~/.cronboard/cronboard.toml).
    #[arg(long, global = true, env = "CRONBOARD_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the jobs a selection resolves to.
    List(SelectionArgs),
    /// Execute the selected jobs now and record the outcome.
    Run(SelectionArgs),
    /// Write schedule records for the selected jobs without running them.
    Schedule {
        #[command(flatten)]
        selection: SelectionArgs,
        /// Status of the new records.
        #[arg(long, default_value = "pending", value_parser = parse_status)]
        status: ScheduleStatus,
    },
    /// Show recent schedule records.
    History {
        /// Only records of this job.
        #[arg(long)]
        job: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct SelectionArgs {
    /// Exactly these jobs (comma separated).
    #[arg(long, value_delimiter = ',', conflicts_with_all = ["exclude", "filter", "payload"])]
    pub select: Vec<String>,

    /// Every job except these (comma separated).
    #[arg(long, value_delimiter = ',', conflicts_with_all = ["filter", "payload"])]
    pub exclude: Vec<String>,

    /// column=value, case-insensitive substring; repeat to narrow further.
    #[arg(long, value_parser = parse_filter, conflicts_with = "payload")]
    pub filter: Vec<(String, String)>,

    /// Raw JSON payload with `selected`, `excluded` or `filters`.
    #[arg(long)]
    pub payload: Option<String>,
}

impl SelectionArgs {
    /// Typed request, or `None` when a raw payload must be parsed instead.
    pub fn request(&self) -> Option<SelectionRequest> {
        if self.payload.is_some() {
            return None;
        }
        if !self.select.is_empty() {
            return Some(SelectionRequest::Explicit {
                ids: self.select.clone(),
            });
        }
        if !self.exclude.is_empty() {
            return Some(SelectionRequest::Excluded {
                excluded: self.exclude.clone(),
            });
        }
        let filters: BTreeMap<String, String> = self.filter.iter().cloned().collect();
        Some(SelectionRequest::Filtered { filters })
    }
}

fn parse_status(s: &str) -> Result<ScheduleStatus, String> {
    s.parse()
}

fn parse_filter(s: &str) -> Result<(String, String), String> {
    let (column, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected column=value, got '{s}'"))?;
    let column = column.trim();
    if column.is_empty() {
        return Err(format!("missing column in '{s}'"));
    }
    Ok((column.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("cronboard").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn select_is_explicit() {
        let cli = parse(&["run", "--select", "a,b"]);
        let Command::Run(sel) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(
            sel.request(),
            Some(SelectionRequest::Explicit {
                ids: vec!["a".into(), "b".into()]
            })
        );
    }

    #[test]
    fn filters_collect_into_map() {
        let cli = parse(&["list", "--filter", "name=ship", "--filter", "group=sales"]);
        let Command::List(sel) = cli.command else {
            panic!("expected list");
        };
        let Some(SelectionRequest::Filtered { filters }) = sel.request() else {
            panic!("expected filters");
        };
        assert_eq!(filters.get("name").map(String::as_str), Some("ship"));
        assert_eq!(filters.get("group").map(String::as_str), Some("sales"));
    }

    #[test]
    fn empty_filter_value_allowed() {
        assert_eq!(parse_filter("name="), Ok(("name".into(), String::new())));
        assert!(parse_filter("=x").is_err());
        assert!(parse_filter("name").is_err());
    }

    #[test]
    fn no_flags_selects_everything() {
        let cli = parse(&["list"]);
        let Command::List(sel) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(sel.request(), Some(SelectionRequest::default()));
    }

    #[test]
    fn schedule_status_parsed() {
        let cli = parse(&["schedule", "--exclude", "x", "--status", "missed"]);
        let Command::Schedule { status, selection } = cli.command else {
            panic!("expected schedule");
        };
        assert_eq!(status, ScheduleStatus::Missed);
        assert_eq!(selection.exclude, vec!["x"]);
    }

    #[test]
    fn filter_and_payload_conflict() {
        let res =
            Cli::try_parse_from(["cronboard", "run", "--filter", "name=x", "--payload", "{}"]);
        assert!(res.is_err());
    }

    #[test]
    fn select_and_exclude_conflict() {
        let res = Cli::try_parse_from(["cronboard", "run", "--select", "a", "--exclude", "b"]);
        assert!(res.is_err());
    }

    #[test]
    fn payload_defers_to_json() {
        let cli = parse(&["run", "--payload", r#"{"selected":["a"]}"#]);
        let Command::Run(sel) = cli.command else {
            panic!("expected run");
        };
        assert!(sel.request().is_none());
    }
}
