use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use veritasq_client::SpaceConfig;
use veritasq_core::{DocumentFile, ValidationReport, ValidationRequest, VerdictTally};

#[derive(Parser, Debug)]
#[command(name = "veritasqctl", version, about = "Validate documents against the VeritasQ compliance space")]
struct Args {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Upload a document and print its compliance assessment
    Validate {
        /// Document to validate
        #[arg(long)]
        file: PathBuf,

        /// Evidence snippets retrieved per compliance check
        #[arg(long, default_value_t = veritasq_core::DEFAULT_K_PER_CHECK)]
        k_per_check: u32,

        /// Embedding model the space should use for retrieval
        #[arg(long, default_value = veritasq_core::DEFAULT_MODEL_NAME)]
        model: String,

        /// Space id override (otherwise VERITASQ_SPACE_ID or the default)
        #[arg(long)]
        space: Option<String>,

        /// Print the full report as JSON instead of the rendered table
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Download the CSV artifact to this path when the space produced one
        #[arg(long)]
        csv_out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    match args.cmd {
        Cmd::Validate {
            file,
            k_per_check,
            model,
            space,
            json,
            csv_out,
        } => {
            let mut config = SpaceConfig::from_env();
            if let Some(space) = space {
                config.space_id = space;
            }

            let name = file
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string)
                .with_context(|| format!("no usable filename in {}", file.display()))?;
            let bytes = tokio::fs::read(&file)
                .await
                .with_context(|| format!("read {}", file.display()))?;
            let document = DocumentFile::new(name, bytes);

            let request = ValidationRequest {
                k_per_check,
                model_name: model,
            };

            let report = veritasq_client::validate_document(&document, &request, &config)
                .await
                .context("validation failed")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }

            if let Some(out) = csv_out {
                download_csv(&report, &out).await?;
            }
        }
    }

    Ok(())
}

fn print_report(report: &ValidationReport) {
    print!("{}", render_report(report));
}

fn render_report(report: &ValidationReport) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    let _ = writeln!(out, "Document: {}", report.filename);

    let results = report.table.clause_results();
    if results.is_empty() {
        if report.table.rows.is_empty() {
            let _ = writeln!(out, "(no assessment rows returned)");
        } else {
            render_raw_rows(&mut out, &report.table);
        }
    } else {
        let clause_w = results
            .iter()
            .map(|r| r.clause.len())
            .chain(["Clause".len()])
            .max()
            .unwrap_or(6);
        let verdict_w = results
            .iter()
            .map(|r| r.verdict.to_string().len())
            .chain(["Verdict".len()])
            .max()
            .unwrap_or(7);

        let _ = writeln!(
            out,
            "{:clause_w$}  {:verdict_w$}  {}",
            "Clause", "Verdict", "Evidence / Gaps"
        );
        for r in &results {
            let detail = if r.gaps.is_empty() {
                r.evidence.clone()
            } else {
                format!("{} | gaps: {}", r.evidence, r.gaps)
            };
            let _ = writeln!(
                out,
                "{:clause_w$}  {:verdict_w$}  {detail}",
                r.clause,
                r.verdict.to_string()
            );
        }

        let tally = VerdictTally::from_results(&results);
        match tally.compliance_percent() {
            Some(pct) => {
                let _ = writeln!(
                    out,
                    "\n{} clauses: {} fully, {} partially, {} insufficient ({pct:.0}% compliant)",
                    tally.total(),
                    tally.fully,
                    tally.partially,
                    tally.insufficient
                );
            }
            None => {
                let _ = writeln!(out, "\nno clauses assessed");
            }
        }
    }

    if !report.summary_md.is_empty() {
        let _ = writeln!(out, "\n{}", report.summary_md);
    }
    if let Some(url) = &report.csv_url {
        let _ = writeln!(out, "\nCSV artifact: {url}");
    }
    out
}

/// Rows that do not project into clause results still get shown as-is.
fn render_raw_rows(out: &mut String, table: &veritasq_core::Table) {
    use std::fmt::Write;

    if !table.headers.is_empty() {
        let _ = writeln!(out, "{}", table.headers.join("  |  "));
    }
    for row in &table.rows {
        let cells: Vec<String> = row
            .iter()
            .map(|cell| match cell {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();
        let _ = writeln!(out, "{}", cells.join("  |  "));
    }
}

async fn download_csv(report: &ValidationReport, out: &Path) -> anyhow::Result<()> {
    let Some(url) = &report.csv_url else {
        warn!("space produced no CSV artifact; nothing to download");
        return Ok(());
    };
    let bytes = reqwest::get(url)
        .await
        .context("fetch csv artifact")?
        .error_for_status()
        .context("csv artifact status")?
        .bytes()
        .await
        .context("read csv artifact")?;
    tokio::fs::write(out, &bytes)
        .await
        .with_context(|| format!("write {}", out.display()))?;
    println!("CSV written to {}", out.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use veritasq_core::Table;

    fn report_with(table: Table) -> ValidationReport {
        ValidationReport {
            filename: "doc.pdf".to_string(),
            table,
            csv_url: None,
            summary_md: String::new(),
        }
    }

    #[test]
    fn typed_rows_render_as_clause_table() {
        let table = Table::from_dataframe(&json!({
            "data": [["5.2", "Fully", "p.3", "none"]],
            "headers": ["Clause", "Verdict", "Evidence", "Gaps"],
        }));
        let out = render_report(&report_with(table));
        assert!(out.contains("5.2"));
        assert!(out.contains("Fully"));
        assert!(out.contains("% compliant"));
    }

    #[test]
    fn unprojectable_rows_fall_back_to_raw_cells() {
        // Rows exist but none carries a first cell, so the typed view is
        // empty and the raw cells must still be shown.
        let table = Table {
            headers: vec!["Note".to_string()],
            rows: vec![vec![], vec![]],
        };
        let out = render_report(&report_with(table));
        assert!(!out.contains("(no assessment rows returned)"));
        assert!(out.contains("Note"));
    }

    #[test]
    fn empty_table_says_so() {
        let out = render_report(&report_with(Table::default()));
        assert!(out.contains("(no assessment rows returned)"));
    }
}
