// Batch analysis: drive segmentation, weighting and pair finding across files.
//
// Two scopes, kept as separate entry points:
//
// - Per-document: every file is its own corpus. IDF and pairs never cross
//   file boundaries, and files can be analyzed in parallel because nothing
//   is shared between them.
// - Combined: all texts are joined (in input order) before segmentation, so
//   one IDF covers the whole batch and pairs can link questions from
//   different years. Each question keeps the id of the file it came from.

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::similarity::clusters::find_clusters;
use crate::similarity::cosine::{find_pairs, ScoringParams};
use crate::similarity::tfidf::TermWeightModel;
use crate::text::segment::{self, spans};

use super::models::{Aggregate, AnalysisMode, AnalysisResult, BatchReport, Document, Question};

/// Inserted between documents in combined mode. A blank line keeps the next
/// document's first marker at line start.
pub const COMBINED_SEPARATOR: &str = "\n\n";

/// Source name given to the single result of a combined run.
pub const COMBINED_SOURCE_NAME: &str = "combined";

/// Runs the question pipeline with a fixed scoring policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchAnalyzer {
    pub params: ScoringParams,
}

impl BatchAnalyzer {
    pub fn new(params: ScoringParams) -> Self {
        Self { params }
    }

    /// Analyze one piece of text as a single document.
    ///
    /// Empty text, or text with no recognizable question markers, gives an
    /// empty result rather than an error.
    pub fn analyze_document(&self, source_name: &str, raw_text: &str) -> AnalysisResult {
        self.analyze(&Document::new(source_name, raw_text))
    }

    /// Analyze one document in its own corpus scope.
    pub fn analyze(&self, document: &Document) -> AnalysisResult {
        let questions = segment::segment(&document.id, &document.raw_text);
        let result = self.score_questions(&document.source_name, questions);

        debug!(
            source = document.source_name,
            questions = result.questions.len(),
            pairs = result.pairs.len(),
            "Analyzed document"
        );

        result
    }

    /// Analyze every document independently, returning results in input order.
    pub fn analyze_per_document(&self, documents: &[Document]) -> Vec<AnalysisResult> {
        documents.iter().map(|doc| self.analyze(doc)).collect()
    }

    /// Analyze all documents as one concatenated corpus.
    pub fn analyze_combined(&self, documents: &[Document]) -> AnalysisResult {
        let mut combined = String::new();
        // (start, end, document id) of each document within `combined`
        let mut bounds: Vec<(usize, usize, &str)> = Vec::with_capacity(documents.len());

        for (i, document) in documents.iter().enumerate() {
            if i > 0 {
                combined.push_str(COMBINED_SEPARATOR);
            }
            let start = combined.len();
            combined.push_str(&document.raw_text);
            bounds.push((start, combined.len(), document.id.as_str()));
        }

        let questions = segment::number(spans(&combined).iter().filter_map(|span| {
            // The marker position decides which document a span belongs to;
            // a top-level body never runs past that document's end.
            let index = bounds.iter().rposition(|(start, _, _)| *start <= span.start)?;
            let (_, end, document_id) = bounds[index];
            span.to_question(&combined, end, document_id)
        }));

        let result = self.score_questions(COMBINED_SOURCE_NAME, questions);

        info!(
            documents = documents.len(),
            questions = result.questions.len(),
            pairs = result.pairs.len(),
            cross_document = result.pairs.iter().filter(|p| p.is_cross_document()).count(),
            "Combined analysis complete"
        );

        result
    }

    /// Analyze a batch in the given mode and total it up.
    pub fn analyze_batch(&self, documents: &[Document], mode: AnalysisMode) -> BatchReport {
        let results = match mode {
            AnalysisMode::PerDocument => self.analyze_per_document(documents),
            AnalysisMode::Combined => vec![self.analyze_combined(documents)],
        };
        report(mode, documents.len(), results)
    }

    /// Like `analyze_batch`, but per-document analyses run on blocking worker
    /// threads, up to `concurrency` at a time.
    ///
    /// Results are merged in input order regardless of which worker finishes
    /// first. Combined mode has one shared corpus and runs as a single task.
    pub async fn analyze_batch_parallel(
        &self,
        documents: Vec<Document>,
        mode: AnalysisMode,
        concurrency: usize,
        show_progress: bool,
    ) -> Result<BatchReport> {
        let total_documents = documents.len();

        if mode == AnalysisMode::Combined {
            let analyzer = *self;
            let result = tokio::task::spawn_blocking(move || analyzer.analyze_combined(&documents))
                .await
                .context("Combined analysis task failed")?;
            return Ok(report(mode, total_documents, vec![result]));
        }

        let pb = if show_progress {
            let pb = ProgressBar::new(total_documents as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("  Analyzing [{bar:30}] {pos}/{len} ({eta})")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        let analyzer = *self;
        // `buffered` (not `buffer_unordered`) yields in submission order
        let outcomes: Vec<Result<AnalysisResult>> =
            stream::iter(documents.into_iter().map(|document| {
                let pb = pb.clone();
                async move {
                    let source = document.source_name.clone();
                    let result = tokio::task::spawn_blocking(move || analyzer.analyze(&document))
                        .await
                        .with_context(|| format!("Analysis task for {source} failed"));
                    pb.inc(1);
                    result
                }
            }))
            .buffered(concurrency.max(1))
            .collect()
            .await;
        pb.finish_and_clear();

        let results = outcomes.into_iter().collect::<Result<Vec<_>>>()?;

        info!(
            documents = total_documents,
            questions = results.iter().map(|r| r.questions.len()).sum::<usize>(),
            "Per-document analysis complete"
        );

        Ok(report(mode, total_documents, results))
    }

    /// Weight, pair and cluster an already-segmented question list.
    fn score_questions(&self, source_name: &str, questions: Vec<Question>) -> AnalysisResult {
        if questions.is_empty() {
            return AnalysisResult::empty(source_name);
        }

        let model = TermWeightModel::build(&questions);
        let pairs = find_pairs(&model, &self.params);
        let clusters = find_clusters(&questions, &pairs);

        AnalysisResult {
            source_name: source_name.to_string(),
            questions,
            pairs,
            clusters,
        }
    }
}

fn report(mode: AnalysisMode, total_documents: usize, results: Vec<AnalysisResult>) -> BatchReport {
    BatchReport {
        mode,
        aggregate: Aggregate::from_results(total_documents, &results),
        results,
    }
}
