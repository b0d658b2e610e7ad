// Data types that flow through the analysis pipeline.
//
// Everything here is plain data: documents come in from the text-extraction
// side, questions and pairs are derived artifacts recomputed every run, and
// the result types are serializable so downstream consumers (vector-store
// ingestion, dashboards) can treat them as opaque records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One extracted document: the raw text of a single exam paper.
///
/// Immutable once created. Produced by whatever decoded the source file
/// (PDF text layer, OCR, plain text) and consumed once per analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub source_name: String,
    pub raw_text: String,
}

impl Document {
    /// Create a document whose id is its source name.
    pub fn new(source_name: impl Into<String>, raw_text: impl Into<String>) -> Self {
        let source_name = source_name.into();
        Self {
            id: source_name.clone(),
            source_name,
            raw_text: raw_text.into(),
        }
    }

    /// Create a document with an explicit id distinct from its source name.
    pub fn with_id(
        id: impl Into<String>,
        source_name: impl Into<String>,
        raw_text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source_name: source_name.into(),
            raw_text: raw_text.into(),
        }
    }
}

/// The structural marker a question was captured from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "label", rename_all = "snake_case")]
pub enum Marker {
    /// A top-level marker at line start, e.g. "12." or "3)" or "Q4".
    Numbered(String),
    /// A lettered sub-part marker, e.g. "(b)".
    Lettered(char),
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Marker::Numbered(label) => write!(f, "{label}."),
            Marker::Lettered(label) => write!(f, "({label})"),
        }
    }
}

/// A single extracted question unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Trimmed question body, without its marker
    pub text: String,
    /// Id of the document the question was extracted from
    pub document_id: String,
    /// Position in extraction order within its corpus
    pub ordinal: usize,
    pub marker: Marker,
    /// Lettered sub-part labels embedded in a top-level question's body.
    /// Always empty for lettered questions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_parts: Vec<char>,
}

/// Two questions whose similarity cleared the threshold.
///
/// `question_a.ordinal < question_b.ordinal` always holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityPair {
    pub question_a: Question,
    pub question_b: Question,
    /// Cosine similarity in [0, 1]
    pub score: f64,
}

impl SimilarityPair {
    /// Whether the two questions came from different documents.
    /// Only possible in combined mode.
    pub fn is_cross_document(&self) -> bool {
        self.question_a.document_id != self.question_b.document_id
    }
}

/// A connected group of near-duplicate questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateCluster {
    /// Short human-readable label built from the cluster's top keywords
    pub label: String,
    /// Member question ordinals, ascending
    pub ordinals: Vec<usize>,
    /// Distinct originating document ids, in first-seen member order
    pub document_ids: Vec<String>,
}

/// Analysis output for one corpus scope (one file, or the combined batch).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub source_name: String,
    pub questions: Vec<Question>,
    pub pairs: Vec<SimilarityPair>,
    #[serde(default)]
    pub clusters: Vec<DuplicateCluster>,
}

impl AnalysisResult {
    /// A result with no questions, pairs or clusters.
    pub fn empty(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            questions: Vec::new(),
            pairs: Vec::new(),
            clusters: Vec::new(),
        }
    }

    /// One-line description of what was found.
    pub fn summary(&self) -> String {
        format!(
            "Found {} pairs of similar questions in {} total questions.",
            self.pairs.len(),
            self.questions.len()
        )
    }
}

/// How a batch of documents is scoped for TF-IDF and pair finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisMode {
    /// Each document is its own corpus; no cross-file comparison.
    #[default]
    PerDocument,
    /// All documents are concatenated into one corpus before segmentation.
    Combined,
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisMode::PerDocument => f.write_str("per-document"),
            AnalysisMode::Combined => f.write_str("combined"),
        }
    }
}

impl FromStr for AnalysisMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "per-document" | "per_document" | "perdocument" => Ok(AnalysisMode::PerDocument),
            "combined" => Ok(AnalysisMode::Combined),
            other => anyhow::bail!(
                "Unknown analysis mode '{other}' (expected 'per-document' or 'combined')"
            ),
        }
    }
}

/// Corpus-level totals across a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Aggregate {
    pub total_documents: usize,
    pub total_questions: usize,
    pub total_pairs: usize,
    pub total_clusters: usize,
}

impl Aggregate {
    /// Sum the per-result counts.
    pub fn from_results(total_documents: usize, results: &[AnalysisResult]) -> Self {
        Self {
            total_documents,
            total_questions: results.iter().map(|r| r.questions.len()).sum(),
            total_pairs: results.iter().map(|r| r.pairs.len()).sum(),
            total_clusters: results.iter().map(|r| r.clusters.len()).sum(),
        }
    }
}

/// Everything a batch run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub mode: AnalysisMode,
    /// One result per document in per-document mode, exactly one in combined mode
    pub results: Vec<AnalysisResult>,
    pub aggregate: Aggregate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parse_round_trip() {
        for mode in [AnalysisMode::PerDocument, AnalysisMode::Combined] {
            let parsed: AnalysisMode = mode.to_string().parse().unwrap();
            assert_eq!(parsed, mode);
        }
        assert!("both".parse::<AnalysisMode>().is_err());
    }

    #[test]
    fn test_summary_wording() {
        let result = AnalysisResult::empty("a.pdf");
        assert_eq!(
            result.summary(),
            "Found 0 pairs of similar questions in 0 total questions."
        );
    }

    #[test]
    fn test_marker_serializes_tagged() {
        let json = serde_json::to_string(&Marker::Lettered('b')).unwrap();
        assert_eq!(json, r#"{"kind":"lettered","label":"b"}"#);
    }
}
