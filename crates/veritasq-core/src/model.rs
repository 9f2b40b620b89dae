use serde::{Deserialize, Serialize};

use crate::table::Table;

/// Default number of evidence snippets retrieved per compliance check.
pub const DEFAULT_K_PER_CHECK: u32 = 8;

/// Default embedding model the remote space uses for retrieval.
pub const DEFAULT_MODEL_NAME: &str = "intfloat/e5-base-v2";

/// A document selected for validation: name plus raw bytes.
///
/// The client does not interpret the content; the remote space does the
/// actual parsing and analysis.
#[derive(Debug, Clone)]
pub struct DocumentFile {
    /// Original filename, used as the fallback name in reports.
    pub name: String,
    /// Raw file content.
    pub bytes: Vec<u8>,
}

impl DocumentFile {
    /// Build a document from a name and its content.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Tuning parameters for a validation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationRequest {
    /// How many evidence snippets the space retrieves per compliance check.
    pub k_per_check: u32,
    /// Embedding/retrieval model the space should use.
    pub model_name: String,
}

impl Default for ValidationRequest {
    fn default() -> Self {
        Self {
            k_per_check: DEFAULT_K_PER_CHECK,
            model_name: DEFAULT_MODEL_NAME.to_string(),
        }
    }
}

/// Compliance verdict for a single clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Verdict {
    /// The clause is fully covered by the document.
    Fully,
    /// The clause is partially covered.
    Partially,
    /// Evidence was insufficient to assess the clause.
    Insufficient,
    /// Any verdict string the space emits that we do not recognize.
    Other(String),
}

impl Verdict {
    /// Parse a verdict cell. Total: unrecognized strings land in `Other`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "fully" => Verdict::Fully,
            "partially" => Verdict::Partially,
            "insufficient" => Verdict::Insufficient,
            _ => Verdict::Other(s.trim().to_string()),
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Fully => write!(f, "Fully"),
            Verdict::Partially => write!(f, "Partially"),
            Verdict::Insufficient => write!(f, "Insufficient"),
            Verdict::Other(s) => write!(f, "{s}"),
        }
    }
}

impl From<String> for Verdict {
    fn from(s: String) -> Self {
        Verdict::parse(&s)
    }
}

impl From<Verdict> for String {
    fn from(v: Verdict) -> Self {
        v.to_string()
    }
}

/// One typed row of the assessment table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClauseResult {
    /// Clause identifier, e.g. "7.5.3".
    pub clause: String,
    /// Compliance verdict for the clause.
    pub verdict: Verdict,
    /// Evidence snippets supporting the verdict, joined if multi-valued.
    pub evidence: String,
    /// Identified gaps, joined if multi-valued.
    pub gaps: String,
}

/// Counts of verdicts across a clause table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerdictTally {
    /// Clauses judged fully covered.
    pub fully: usize,
    /// Clauses judged partially covered.
    pub partially: usize,
    /// Clauses with insufficient evidence.
    pub insufficient: usize,
    /// Clauses with an unrecognized verdict.
    pub other: usize,
}

impl VerdictTally {
    /// Tally verdicts over a set of clause results.
    pub fn from_results(results: &[ClauseResult]) -> Self {
        let mut t = Self::default();
        for r in results {
            match r.verdict {
                Verdict::Fully => t.fully += 1,
                Verdict::Partially => t.partially += 1,
                Verdict::Insufficient => t.insufficient += 1,
                Verdict::Other(_) => t.other += 1,
            }
        }
        t
    }

    /// Total clauses counted.
    pub fn total(&self) -> usize {
        self.fully + self.partially + self.insufficient + self.other
    }

    /// Compliance score: full matches count 1, partial 0.5, out of total.
    /// Returns `None` for an empty table.
    pub fn compliance_percent(&self) -> Option<f64> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let score = self.fully as f64 + 0.5 * self.partially as f64;
        Some(100.0 * score / total as f64)
    }
}

/// Client-facing result of a validation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Resolved filename: remote-supplied when present, else the input name.
    pub filename: String,
    /// Normalized assessment table.
    pub table: Table,
    /// URL of the CSV artifact, when the space produced one.
    pub csv_url: Option<String>,
    /// Prose summary of the run (markdown); empty when the space sent none.
    pub summary_md: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_parse_is_case_insensitive() {
        assert_eq!(Verdict::parse("fully"), Verdict::Fully);
        assert_eq!(Verdict::parse("FULLY"), Verdict::Fully);
        assert_eq!(Verdict::parse(" Partially "), Verdict::Partially);
        assert_eq!(Verdict::parse("insufficient"), Verdict::Insufficient);
    }

    #[test]
    fn verdict_parse_keeps_unknown_strings() {
        assert_eq!(
            Verdict::parse("Not Applicable"),
            Verdict::Other("Not Applicable".to_string())
        );
    }

    #[test]
    fn tally_and_percent() {
        let results = vec![
            ClauseResult {
                clause: "5.2".into(),
                verdict: Verdict::Fully,
                evidence: "p.3".into(),
                gaps: "none".into(),
            },
            ClauseResult {
                clause: "7.5".into(),
                verdict: Verdict::Partially,
                evidence: "p.1".into(),
                gaps: "missing dates".into(),
            },
        ];
        let tally = VerdictTally::from_results(&results);
        assert_eq!(tally.fully, 1);
        assert_eq!(tally.partially, 1);
        assert_eq!(tally.total(), 2);
        assert_eq!(tally.compliance_percent(), Some(75.0));
    }

    #[test]
    fn empty_tally_has_no_percent() {
        assert_eq!(VerdictTally::default().compliance_percent(), None);
    }
}
