//! Turning an operator's selection into an ordered list of job names.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{catalog::JobCatalog, error::SelectionError};

/// Filter key the admin grid sends along with real filters; never a column.
pub const PLACEHOLDER_FILTER: &str = "placeholder";

/// Which jobs an operator wants to act on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionRequest {
    /// Exactly these names, passed through untouched.
    Explicit { ids: Vec<String> },
    /// Every catalog name except these (exact match).
    Excluded { excluded: Vec<String> },
    /// Catalog entries whose columns contain every value, case-insensitively.
    Filtered { filters: BTreeMap<String, String> },
}

impl Default for SelectionRequest {
    /// No filters: the whole catalog.
    fn default() -> Self {
        SelectionRequest::Filtered {
            filters: BTreeMap::new(),
        }
    }
}

impl SelectionRequest {
    /// Parse the loosely typed payload an admin form or CLI sends.
    ///
    /// Precedence: `selected`, then `excluded` (the string `"false"` means
    /// "no exclusion list"), then `filters`. A missing `filters` key is an
    /// empty filter set.
    pub fn from_payload(payload: &Value) -> Result<Self, SelectionError> {
        let obj = payload
            .as_object()
            .ok_or_else(|| invalid("payload must be a JSON object"))?;

        if let Some(selected) = present(obj, "selected") {
            return Ok(SelectionRequest::Explicit {
                ids: string_list(selected, "selected")?,
            });
        }

        match present(obj, "excluded") {
            Some(Value::String(s)) if s == "false" => {}
            Some(excluded) => {
                return Ok(SelectionRequest::Excluded {
                    excluded: string_list(excluded, "excluded")?,
                });
            }
            None => {}
        }

        let filters: BTreeMap<String, String> = match present(obj, "filters") {
            None => BTreeMap::new(),
            Some(Value::Object(map)) => map
                .iter()
                .map(|(column, value)| Ok((column.clone(), filter_text(column, value)?)))
                .collect::<Result<_, SelectionError>>()?,
            Some(_) => return Err(invalid("'filters' must be an object")),
        };

        Ok(SelectionRequest::Filtered { filters })
    }

    /// Resolve against `catalog`. Pure: reads one catalog snapshot, writes nothing.
    pub fn resolve(&self, catalog: &dyn JobCatalog) -> Vec<String> {
        match self {
            SelectionRequest::Explicit { ids } => ids.clone(),

            SelectionRequest::Excluded { excluded } => {
                let excluded: HashSet<&str> = excluded.iter().map(String::as_str).collect();
                catalog
                    .names()
                    .into_iter()
                    .filter(|name| !excluded.contains(name.as_str()))
                    .collect()
            }

            SelectionRequest::Filtered { filters } => {
                let mut jobs = catalog.all();
                for (column, value) in filters {
                    if column == PLACEHOLDER_FILTER {
                        continue;
                    }
                    let needle = value.to_lowercase();
                    jobs.retain(|job| job.column(column).to_lowercase().contains(&needle));
                }
                jobs.into_iter().map(|job| job.name).collect()
            }
        }
    }
}

/// `Some` for keys that exist and are not JSON null.
fn present<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

fn string_list(value: &Value, key: &str) -> Result<Vec<String>, SelectionError> {
    let items = value
        .as_array()
        .ok_or_else(|| invalid(format!("'{key}' must be an array")))?;
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(invalid(format!("'{key}' contains a non-scalar entry: {other}"))),
        })
        .collect()
}

fn filter_text(column: &str, value: &Value) -> Result<String, SelectionError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Null => Ok(String::new()),
        Value::Number(_) | Value::Bool(_) => Ok(value.to_string()),
        _ => Err(invalid(format!("filter '{column}' must be a scalar"))),
    }
}

fn invalid(msg: impl Into<String>) -> SelectionError {
    SelectionError::InvalidPayload(msg.into())
}
