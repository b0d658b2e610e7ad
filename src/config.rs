use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::analysis::models::AnalysisMode;
use crate::similarity::cosine::SIMILARITY_THRESHOLD;

/// Default number of documents analyzed at once in per-document mode.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Every value
/// has a default, and CLI flags override whatever is loaded here.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding extracted paper text (PAPERDUPE_DATA_DIR, default ./data)
    pub data_dir: PathBuf,
    /// File extension of extracted text files (PAPERDUPE_EXTENSION, default txt)
    pub extension: String,
    /// Similarity threshold (PAPERDUPE_THRESHOLD, default 0.60)
    pub threshold: f64,
    /// Batch scoping (PAPERDUPE_MODE, default per-document)
    pub mode: AnalysisMode,
    /// Parallel workers for per-document mode (PAPERDUPE_CONCURRENCY, default 4)
    pub concurrency: usize,
    /// Where the markdown report goes (PAPERDUPE_REPORT_PATH)
    pub report_path: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Fails only when a variable is set to something unparseable; unset
    /// variables fall back to their defaults.
    pub fn load() -> Result<Self> {
        let threshold = match env::var("PAPERDUPE_THRESHOLD") {
            Ok(raw) => parse_threshold(&raw)?,
            Err(_) => SIMILARITY_THRESHOLD,
        };

        let mode = match env::var("PAPERDUPE_MODE") {
            Ok(raw) => raw
                .parse::<AnalysisMode>()
                .context("Invalid PAPERDUPE_MODE")?,
            Err(_) => AnalysisMode::default(),
        };

        let concurrency = match env::var("PAPERDUPE_CONCURRENCY") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("Invalid PAPERDUPE_CONCURRENCY '{raw}'"))?
                .max(1),
            Err(_) => DEFAULT_CONCURRENCY,
        };

        Ok(Self {
            data_dir: env::var("PAPERDUPE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data")),
            extension: env::var("PAPERDUPE_EXTENSION").unwrap_or_else(|_| "txt".to_string()),
            threshold,
            mode,
            concurrency,
            report_path: env::var("PAPERDUPE_REPORT_PATH")
                .unwrap_or_else(|_| "output/paperdupe-report.md".to_string()),
        })
    }

    /// Check that the data directory exists before scanning it.
    pub fn require_data_dir(&self) -> Result<()> {
        if !self.data_dir.is_dir() {
            anyhow::bail!(
                "Document directory {} not found.\n\
                 Set PAPERDUPE_DATA_DIR in your .env file or pass --dir.",
                self.data_dir.display()
            );
        }
        Ok(())
    }
}

/// Parse a similarity threshold, which must be a number in [0, 1].
pub fn parse_threshold(raw: &str) -> Result<f64> {
    let value: f64 = raw
        .trim()
        .parse()
        .with_context(|| format!("Invalid similarity threshold '{raw}'"))?;
    if !(0.0..=1.0).contains(&value) {
        anyhow::bail!("Similarity threshold must be between 0 and 1, got {value}");
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_threshold() {
        assert_eq!(parse_threshold("0.75").unwrap(), 0.75);
        assert_eq!(parse_threshold(" 1 ").unwrap(), 1.0);
        assert!(parse_threshold("1.5").is_err());
        assert!(parse_threshold("-0.1").is_err());
        assert!(parse_threshold("high").is_err());
        assert!(parse_threshold("NaN").is_err());
    }
}
