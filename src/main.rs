use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use paperdupe::analysis::batch::BatchAnalyzer;
use paperdupe::analysis::models::AnalysisMode;
use paperdupe::config::{parse_threshold, Config};
use paperdupe::ingest::{self, DirectorySource, DocumentSource};
use paperdupe::output::{markdown, terminal};
use paperdupe::similarity::cosine::ScoringParams;
use paperdupe::text::segment;

/// Paperdupe: find near-duplicate questions across exam papers.
///
/// Reads the extracted text of each paper, splits it into questions, and
/// reports pairs of questions that ask nearly the same thing.
#[derive(Parser)]
#[command(name = "paperdupe", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze every extracted paper in a directory
    Batch {
        /// Directory of extracted text files (default: PAPERDUPE_DATA_DIR or ./data)
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Corpus scoping: per-document or combined
        #[arg(long)]
        mode: Option<AnalysisMode>,

        /// Similarity threshold in [0, 1]; pairs must score above it
        #[arg(long, value_parser = parse_threshold)]
        threshold: Option<f64>,

        /// Documents analyzed in parallel (per-document mode)
        #[arg(long)]
        concurrency: Option<usize>,

        /// Print the full report as JSON instead of the terminal view
        #[arg(long)]
        json: bool,

        /// Also write a markdown report (default path: PAPERDUPE_REPORT_PATH)
        #[arg(long, num_args = 0..=1, default_missing_value = "")]
        report: Option<String>,
    },

    /// Analyze a single text (file, or stdin when omitted)
    Check {
        /// Extracted text file to analyze
        file: Option<PathBuf>,

        /// Similarity threshold in [0, 1]; pairs must score above it
        #[arg(long, value_parser = parse_threshold)]
        threshold: Option<f64>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show how a text is segmented into questions
    Segment {
        /// Extracted text file (stdin when omitted)
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Logs go to stderr so --json output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("paperdupe=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Batch {
            dir,
            mode,
            threshold,
            concurrency,
            json,
            report,
        } => {
            let data_dir = match dir {
                Some(dir) => dir,
                None => {
                    config.require_data_dir()?;
                    config.data_dir.clone()
                }
            };
            let mode = mode.unwrap_or(config.mode);
            let params = ScoringParams {
                threshold: threshold.unwrap_or(config.threshold),
            };
            let concurrency = concurrency.unwrap_or(config.concurrency);

            let source = DirectorySource::new(&data_dir, &config.extension);
            let documents = source.load()?;

            if documents.is_empty() {
                println!(
                    "No .{} files found in {}.",
                    config.extension,
                    data_dir.display()
                );
                return Ok(());
            }

            if !json {
                println!(
                    "Analyzing {} documents ({} mode, threshold {:.2})...",
                    documents.len(),
                    mode,
                    params.threshold
                );
            }

            let analyzer = BatchAnalyzer::new(params);
            let batch = analyzer
                .analyze_batch_parallel(documents, mode, concurrency, !json)
                .await?;

            info!(
                questions = batch.aggregate.total_questions,
                pairs = batch.aggregate.total_pairs,
                "Batch complete"
            );

            if json {
                println!("{}", serde_json::to_string_pretty(&batch)?);
            } else {
                for result in &batch.results {
                    terminal::display_result(result);
                }
                terminal::display_batch_summary(&batch);
            }

            if let Some(path) = report {
                let path = if path.is_empty() {
                    config.report_path.clone()
                } else {
                    path
                };
                let written = markdown::generate_report(&batch, &path)?;
                if !json {
                    println!(
                        "\n{}",
                        format!("Markdown report saved to: {written}").bold()
                    );
                }
            }
        }

        Commands::Check {
            file,
            threshold,
            json,
        } => {
            let text = ingest::read_text_input(file.as_deref())?;
            let source_name = file
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "stdin".to_string());

            let analyzer = BatchAnalyzer::new(ScoringParams {
                threshold: threshold.unwrap_or(config.threshold),
            });
            let result = analyzer.analyze_document(&source_name, &text);

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                terminal::display_result(&result);
            }
        }

        Commands::Segment { file } => {
            let text = ingest::read_text_input(file.as_deref())?;
            let document_id = file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "stdin".to_string());

            let questions = segment::segment(&document_id, &text);
            println!(
                "{}",
                format!("=== {} questions extracted ===", questions.len()).bold()
            );
            terminal::display_questions(&questions);
        }
    }

    Ok(())
}
