use serde::{Deserialize, Serialize};
use std::fmt;

/// Column names accepted by filtered selection.
pub const FILTER_COLUMNS: &[&str] = &["name", "group", "instance", "method", "schedule", "status"];

/// One entry of the job catalog.
///
/// `instance` picks the handler that runs the job; `method` is handed to that
/// handler verbatim (for the `command` handler it is the command line).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDescriptor {
    /// Unique key within the catalog.
    pub name: String,
    #[serde(default = "default_group")]
    pub group: String,
    pub instance: String,
    #[serde(default)]
    pub method: String,
    /// Cron expression, informational only — nothing in this workspace
    /// interprets it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    #[serde(default = "bool_true")]
    pub enabled: bool,
}

impl JobDescriptor {
    pub fn new(name: impl Into<String>, instance: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: default_group(),
            instance: instance.into(),
            method: String::new(),
            schedule: None,
            enabled: true,
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn with_schedule(mut self, expr: impl Into<String>) -> Self {
        self.schedule = Some(expr.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Text value of a filterable column. Unknown columns read as `""`.
    pub fn column(&self, column: &str) -> &str {
        match column {
            "name" => &self.name,
            "group" => &self.group,
            "instance" => &self.instance,
            "method" => &self.method,
            "schedule" => self.schedule.as_deref().unwrap_or(""),
            "status" => {
                if self.enabled {
                    "enabled"
                } else {
                    "disabled"
                }
            }
            _ => "",
        }
    }
}

impl fmt::Display for JobDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}/{})", self.name, self.group, self.instance)
    }
}

fn default_group() -> String {
    "default".to_string()
}

fn bool_true() -> bool {
    true
}
