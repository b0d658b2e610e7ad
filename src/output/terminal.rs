// Colored terminal output for analysis results.
//
// main.rs delegates here for everything a human reads: per-file pair lists,
// duplicate clusters, the batch summary, and the raw segmentation listing.

use colored::Colorize;

use crate::analysis::models::{AnalysisResult, BatchReport, Question};

use super::{flatten_whitespace, format_percent, truncate_chars};

/// How much of each question to show in pair listings.
const PREVIEW_CHARS: usize = 120;

/// Display one result: its similar pairs, then its clusters.
pub fn display_result(result: &AnalysisResult) {
    println!(
        "\n{}",
        format!("=== Question Analysis for {} ===", result.source_name).bold()
    );

    if result.questions.is_empty() {
        println!("  {}", "No questions recognized in this document.".dimmed());
        return;
    }

    if result.pairs.is_empty() {
        println!(
            "  {}",
            format!("No similar pairs among {} questions.", result.questions.len()).dimmed()
        );
        return;
    }

    for pair in &result.pairs {
        println!(
            "\n  {} {}",
            "Similarity:".bold(),
            colorize_score(pair.score)
        );
        println!(
            "  Q1 {}: {}",
            origin(&pair.question_a).dimmed(),
            preview(&pair.question_a.text)
        );
        println!(
            "  Q2 {}: {}",
            origin(&pair.question_b).dimmed(),
            preview(&pair.question_b.text)
        );
    }

    if !result.clusters.is_empty() {
        println!("\n  {}", "Duplicate clusters:".bold());
        for (i, cluster) in result.clusters.iter().enumerate() {
            println!(
                "  {:>3}. {:<40} {} questions across {} file(s)",
                i + 1,
                cluster.label.bold(),
                cluster.ordinals.len(),
                cluster.document_ids.len()
            );
        }
    }

    println!("\n  {}", result.summary());
}

/// Display the end-of-run summary across all results.
pub fn display_batch_summary(report: &BatchReport) {
    println!(
        "\n{}",
        format!("=== Summary ({} mode) ===", report.mode).bold()
    );

    for result in &report.results {
        let count = result.pairs.len();
        let count_str = if count > 0 {
            count.to_string().yellow().bold()
        } else {
            count.to_string().green()
        };
        println!(
            "  File: {:<40} Found {} sets of similar questions",
            result.source_name, count_str
        );
    }

    let aggregate = &report.aggregate;
    println!();
    println!("  Documents analyzed: {}", aggregate.total_documents);
    println!("  Questions extracted: {}", aggregate.total_questions);
    println!("  Similar pairs: {}", aggregate.total_pairs);
    println!("  Duplicate clusters: {}", aggregate.total_clusters);
}

/// List extracted questions with ordinals and markers.
pub fn display_questions(questions: &[Question]) {
    if questions.is_empty() {
        println!("No questions recognized.");
        return;
    }

    for question in questions {
        let sub_parts = if question.sub_parts.is_empty() {
            String::new()
        } else {
            let labels: Vec<String> = question.sub_parts.iter().map(|c| format!("({c})")).collect();
            format!(" [{}]", labels.join(" "))
        };
        println!(
            "  {:>3}  {:<6} {}{}",
            question.ordinal,
            question.marker.to_string().cyan(),
            preview(&question.text),
            sub_parts.dimmed()
        );
    }
}

fn preview(text: &str) -> String {
    truncate_chars(&flatten_whitespace(text), PREVIEW_CHARS)
}

fn origin(question: &Question) -> String {
    format!("[{} {}]", question.document_id, question.marker)
}

/// Stronger matches get louder colors.
fn colorize_score(score: f64) -> colored::ColoredString {
    let text = format_percent(score);
    if score >= 0.9 {
        text.red().bold()
    } else if score >= 0.75 {
        text.bright_red()
    } else {
        text.yellow()
    }
}
