// Document ingestion: where already-extracted text enters the pipeline.
//
// Decoding PDFs (text layer or OCR) happens upstream. This module only reads
// the plain-text output of that step, one file per exam paper, and hands the
// analyzer an ordered list of documents.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::analysis::models::Document;

/// Trait for anything that can supply a batch of documents.
///
/// The directory reader is the default; a PDF extractor or an upload store
/// can implement this without touching the analyzer.
pub trait DocumentSource {
    /// Load every document, in a stable order.
    fn load(&self) -> Result<Vec<Document>>;
}

/// Reads every file with a given extension from one directory.
///
/// Files are sorted by name so batch output is stable across runs. The file
/// name doubles as document id and source name.
pub struct DirectorySource {
    pub dir: PathBuf,
    /// Extension without the leading dot, matched case-insensitively
    pub extension: String,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into().trim_start_matches('.').to_string(),
        }
    }

    fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension))
    }
}

impl DocumentSource for DirectorySource {
    fn load(&self) -> Result<Vec<Document>> {
        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read document directory {}", self.dir.display()))?;

        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let path = entry
                .with_context(|| format!("Failed to list {}", self.dir.display()))?
                .path();
            if path.is_file() && self.matches_extension(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        if paths.is_empty() {
            warn!(
                dir = %self.dir.display(),
                extension = self.extension,
                "No matching documents found"
            );
        }

        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            let text = read_text_file(&path)?;
            debug!(file = name, bytes = text.len(), "Loaded document");
            documents.push(Document::new(name, text));
        }

        info!(count = documents.len(), dir = %self.dir.display(), "Documents loaded");
        Ok(documents)
    }
}

/// Read a text file, replacing invalid UTF-8 rather than failing on it.
///
/// Extracted exam text often carries stray bytes from the PDF layer; losing
/// one character is better than losing the paper.
pub fn read_text_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!(file = %path.display(), "File is not valid UTF-8, replacing invalid bytes");
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    })
}

/// Read text from a file, or from stdin when no path is given.
pub fn read_text_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => read_text_file(path),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read text from stdin")?;
            Ok(text)
        }
    }
}
