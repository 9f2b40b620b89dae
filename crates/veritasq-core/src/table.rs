use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{ClauseResult, Verdict};

/// Normalized tabular result: ordered column names plus row cells.
///
/// The remote space returns its assessment as a dataframe-like value that
/// arrives in one of two shapes; [`Table::from_dataframe`] folds both (and
/// anything malformed) into this stable shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    /// Column names, insertion order meaningful. May be empty.
    pub headers: Vec<String>,
    /// Row cells. Row length is passed through as-is, not reconciled
    /// against `headers`.
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Normalize a dataframe-like value. Total: never fails.
    ///
    /// Recognized shapes:
    /// - `{data: [[..], ..], headers: ["..", ..]}`: both passed through;
    /// - bare `[[..], ..]`: rows with empty headers.
    ///
    /// Anything else degrades to an empty table rather than an error, so a
    /// malformed remote response shows up as "no results", not a crash.
    pub fn from_dataframe(value: &Value) -> Self {
        if let Some(obj) = value.as_object() {
            if let (Some(data), Some(headers)) = (
                obj.get("data").and_then(Value::as_array),
                obj.get("headers").and_then(Value::as_array),
            ) {
                if data.iter().all(Value::is_array) && headers.iter().all(Value::is_string) {
                    return Table {
                        headers: headers
                            .iter()
                            .filter_map(Value::as_str)
                            .map(str::to_string)
                            .collect(),
                        rows: data
                            .iter()
                            .filter_map(Value::as_array)
                            .cloned()
                            .collect(),
                    };
                }
            }
            return Table::default();
        }

        if let Some(rows) = value.as_array() {
            if rows.iter().all(Value::is_array) {
                return Table {
                    headers: vec![],
                    rows: rows.iter().filter_map(Value::as_array).cloned().collect(),
                };
            }
        }

        Table::default()
    }

    /// True when the table carries no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Best-effort typed view of the rows as clause results.
    ///
    /// Cell order follows the space's output: clause, verdict, evidence,
    /// gaps. Missing trailing cells become empty strings; rows without any
    /// cell are skipped. Array-valued cells are joined with "; ".
    pub fn clause_results(&self) -> Vec<ClauseResult> {
        self.rows
            .iter()
            .filter(|row| !row.is_empty())
            .map(|row| ClauseResult {
                clause: cell_text(row.first()),
                verdict: Verdict::parse(&cell_text(row.get(1))),
                evidence: cell_text(row.get(2)),
                gaps: cell_text(row.get(3)),
            })
            .collect()
    }
}

/// Render a cell as display text. Strings pass through, arrays are joined
/// with "; ", null/missing become empty, other scalars use JSON rendering.
fn cell_text(cell: Option<&Value>) -> String {
    match cell {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join("; "),
        Some(other) => other.to_string(),
    }
}
