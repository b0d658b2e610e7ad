// Markdown report generation.
//
// Writes a self-contained report of a batch run: totals, then one section per
// result with its duplicate clusters and pair table. Pipes in question text
// are escaped so tables stay intact.

use std::fmt::{self, Write};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::analysis::models::{AnalysisResult, BatchReport};

use super::{flatten_whitespace, format_percent, truncate_chars};

const TABLE_TEXT_CHARS: usize = 100;

/// Render a batch report to markdown.
pub fn render_report(report: &BatchReport, generated_at: &str) -> Result<String> {
    let mut md = String::new();
    write_report(&mut md, report, generated_at).context("Failed to render markdown report")?;
    Ok(md)
}

/// Render the report and write it to `path`, creating parent directories.
///
/// Returns the path written, for display.
pub fn generate_report(report: &BatchReport, path: &str) -> Result<String> {
    let generated_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let md = render_report(report, &generated_at)?;

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create report directory {}", parent.display()))?;
        }
    }
    fs::write(path, md).with_context(|| format!("Failed to write report to {path}"))?;

    info!(path, "Markdown report written");
    Ok(path.to_string())
}

fn write_report(md: &mut String, report: &BatchReport, generated_at: &str) -> fmt::Result {
    let aggregate = &report.aggregate;

    writeln!(md, "# Similar Question Report\n")?;
    writeln!(md, "Generated: {generated_at}  ")?;
    writeln!(md, "Mode: {}\n", report.mode)?;
    writeln!(md, "| Documents | Questions | Similar pairs | Clusters |")?;
    writeln!(md, "|---:|---:|---:|---:|")?;
    writeln!(
        md,
        "| {} | {} | {} | {} |\n",
        aggregate.total_documents,
        aggregate.total_questions,
        aggregate.total_pairs,
        aggregate.total_clusters
    )?;

    for result in &report.results {
        write_result(md, result)?;
    }
    Ok(())
}

fn write_result(md: &mut String, result: &AnalysisResult) -> fmt::Result {
    writeln!(md, "## {}\n", result.source_name)?;
    writeln!(md, "{}\n", result.summary())?;

    if !result.clusters.is_empty() {
        writeln!(md, "### Duplicate clusters\n")?;
        for cluster in &result.clusters {
            let ordinals: Vec<String> = cluster.ordinals.iter().map(|o| format!("#{o}")).collect();
            writeln!(
                md,
                "- **{}**: questions {} ({})",
                escape(&cluster.label),
                ordinals.join(", "),
                cluster.document_ids.join(", ")
            )?;
        }
        writeln!(md)?;
    }

    if !result.pairs.is_empty() {
        writeln!(md, "### Similar pairs\n")?;
        writeln!(md, "| Similarity | Question 1 | Question 2 |")?;
        writeln!(md, "|---:|---|---|")?;
        for pair in &result.pairs {
            writeln!(
                md,
                "| {} | {} | {} |",
                format_percent(pair.score),
                cell(&pair.question_a.text, &pair.question_a.document_id),
                cell(&pair.question_b.text, &pair.question_b.document_id),
            )?;
        }
        writeln!(md)?;
    }
    Ok(())
}

fn cell(text: &str, document_id: &str) -> String {
    format!(
        "{} _({})_",
        escape(&truncate_chars(&flatten_whitespace(text), TABLE_TEXT_CHARS)),
        escape(document_id)
    )
}

fn escape(text: &str) -> String {
    text.replace('|', "\\|")
}
