use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::ValidationReport;
use crate::table::Table;

/// A file artifact reference as the space reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactRef {
    /// Retrievable URL of the artifact, when exposed.
    #[serde(default)]
    pub url: Option<String>,
    /// Server-side name of the artifact.
    #[serde(default)]
    pub name: Option<String>,
}

/// Reply payload that does not match the expected tuple shape.
#[derive(Debug, thiserror::Error)]
pub enum ReplyError {
    /// The reply's data payload was not an array at all.
    #[error("reply payload is not an array (got {found})")]
    NotAnArray {
        /// JSON type name of what arrived instead.
        found: &'static str,
    },
    /// The reply array was too short to contain a dataframe slot.
    #[error("reply payload has {len} element(s), expected at least 2")]
    TooShort {
        /// Number of elements received.
        len: usize,
    },
}

/// The validate endpoint's reply, split into its tuple positions.
///
/// The wire shape is an ordered tuple
/// `[filename, dataframe, artifact, summary]`. Positions 2 and 3 are
/// optional on the wire (older space builds omit them); positions beyond 4
/// are ignored.
#[derive(Debug, Clone)]
pub struct ReplyParts {
    /// Remote-resolved filename, when the space sent a non-empty string.
    pub filename: Option<String>,
    /// The dataframe-like value, kept loose until normalization.
    pub dataframe: Value,
    /// CSV artifact reference, when position 2 was an object.
    pub artifact: Option<ArtifactRef>,
    /// Summary markdown, when position 3 was a string.
    pub summary: Option<String>,
}

impl ReplyParts {
    /// Split a reply data payload into its tuple positions.
    ///
    /// A payload that is not an array, or that lacks even the dataframe
    /// slot, is rejected as malformed rather than silently yielding empty
    /// fields. Missing trailing positions are tolerated.
    pub fn parse(data: Value) -> Result<Self, ReplyError> {
        let items = match data {
            Value::Array(items) => items,
            other => {
                return Err(ReplyError::NotAnArray {
                    found: json_type_name(&other),
                })
            }
        };
        if items.len() < 2 {
            return Err(ReplyError::TooShort { len: items.len() });
        }

        let mut items = items.into_iter();
        let filename = match items.next() {
            Some(Value::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        };
        let dataframe = items.next().unwrap_or(Value::Null);
        let artifact = items
            .next()
            .filter(Value::is_object)
            .and_then(|v| serde_json::from_value::<ArtifactRef>(v).ok());
        let summary = items.next().and_then(|v| match v {
            Value::String(s) => Some(s),
            _ => None,
        });

        Ok(Self {
            filename,
            dataframe,
            artifact,
            summary,
        })
    }

    /// Assemble the client-facing report.
    ///
    /// `fallback_name` is the original file's name, used when the space did
    /// not resolve one. The CSV URL is carried only when the artifact
    /// exposes a non-empty `url`. The summary is always a string, never
    /// absent.
    pub fn into_report(self, fallback_name: &str) -> ValidationReport {
        let table = Table::from_dataframe(&self.dataframe);
        let csv_url = self
            .artifact
            .and_then(|a| a.url)
            .filter(|u| !u.is_empty());
        ValidationReport {
            filename: self.filename.unwrap_or_else(|| fallback_name.to_string()),
            table,
            csv_url,
            summary_md: self.summary.unwrap_or_default(),
        }
    }
}

fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
