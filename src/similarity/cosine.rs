// Cosine similarity and threshold-filtered pair finding.
//
// Pair finding compares every unordered pair of questions in one model, so
// it is quadratic in the number of questions. That is fine for exam papers
// (tens of questions each), but a combined run over hundreds of papers will
// feel it. Pairs come out in nested-loop order (i ascending, then j
// ascending), never sorted by score.

use std::collections::BTreeMap;

use crate::analysis::models::{Question, SimilarityPair};

use super::tfidf::{TermWeightModel, TermWeightVector};

/// Default similarity threshold. A pair is retained only when its score is
/// strictly greater than this. Raising it cuts false-positive duplicates at
/// the cost of missing looser near-duplicates.
pub const SIMILARITY_THRESHOLD: f64 = 0.60;

/// Tunable scoring policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringParams {
    /// Exclusive lower bound on retained pair scores (default 0.60)
    pub threshold: f64,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            threshold: SIMILARITY_THRESHOLD,
        }
    }
}

impl ScoringParams {
    /// Whether a pair with this score is kept. Scores equal to the
    /// threshold are dropped.
    pub fn retains(&self, score: f64) -> bool {
        score > self.threshold
    }
}

/// Cosine similarity between two vectors from the same model.
pub fn score(vec_a: &TermWeightVector, vec_b: &TermWeightVector) -> f64 {
    cosine_from_weights(vec_a.weights(), vec_b.weights())
}

/// Cosine similarity between two sparse weight maps.
///
/// Missing terms count as 0. A zero-magnitude side scores 0.0 rather than
/// NaN. Sums run in term order, so equal inputs give bit-equal scores. The result is clamped to [0, 1] to absorb floating-point drift.
pub fn cosine_from_weights(
    weights_a: &BTreeMap<String, f64>,
    weights_b: &BTreeMap<String, f64>,
) -> f64 {
    let magnitude_a = weights_a.values().map(|w| w * w).sum::<f64>().sqrt();
    let magnitude_b = weights_b.values().map(|w| w * w).sum::<f64>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    // Only shared terms contribute to the dot product; walk the smaller map
    let (small, large) = if weights_a.len() <= weights_b.len() {
        (weights_a, weights_b)
    } else {
        (weights_b, weights_a)
    };
    let dot: f64 = small
        .iter()
        .filter_map(|(term, w)| large.get(term).map(|other| w * other))
        .sum();

    (dot / (magnitude_a * magnitude_b)).clamp(0.0, 1.0)
}

/// Every pair in the model scoring strictly above the threshold.
pub fn find_pairs(model: &TermWeightModel<'_>, params: &ScoringParams) -> Vec<SimilarityPair> {
    let entries: Vec<_> = model.iter().collect();
    let mut pairs = Vec::new();

    for (i, (question_a, vec_a)) in entries.iter().enumerate() {
        for (question_b, vec_b) in entries.iter().skip(i + 1) {
            let similarity = score(vec_a, vec_b);
            if params.retains(similarity) {
                pairs.push(SimilarityPair {
                    question_a: (*question_a).clone(),
                    question_b: (*question_b).clone(),
                    score: similarity,
                });
            }
        }
    }

    pairs
}

/// Build a model over `questions` and find its similar pairs in one step.
pub fn find_similar_questions(questions: &[Question], params: &ScoringParams) -> Vec<SimilarityPair> {
    find_pairs(&TermWeightModel::build(questions), params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::segment::segment;

    fn weights(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_identical_weights() {
        let w = weights(&[("gravity", 1.4), ("force", 0.7)]);
        let s = cosine_from_weights(&w, &w);
        assert!((s - 1.0).abs() < 1e-9, "Self-similarity should be 1.0, got {s}");
    }

    #[test]
    fn test_disjoint_weights() {
        let a = weights(&[("gravity", 1.0)]);
        let b = weights(&[("momentum", 1.0)]);
        assert_eq!(cosine_from_weights(&a, &b), 0.0);
    }

    #[test]
    fn test_zero_magnitude_is_zero_not_nan() {
        let empty = BTreeMap::new();
        let zeros = weights(&[("gravity", 0.0)]);
        let a = weights(&[("gravity", 1.0)]);
        assert_eq!(cosine_from_weights(&empty, &a), 0.0);
        assert_eq!(cosine_from_weights(&zeros, &a), 0.0);
        assert_eq!(cosine_from_weights(&empty, &empty), 0.0);
    }

    #[test]
    fn test_scenario_pairs() {
        let questions = segment(
            "p",
            "1. What is gravity?\n2. What is gravity force?\n3. Define momentum.",
        );
        let pairs = find_similar_questions(&questions, &ScoringParams::default());
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].question_a.ordinal, 0);
        assert_eq!(pairs[0].question_b.ordinal, 1);
        // idf: what/is/gravity = 1.0, force = 1 + ln(1.5)
        let force = 1.0 + 1.5f64.ln();
        let expected = 3.0 / (3.0f64.sqrt() * (3.0 + force * force).sqrt());
        assert!((pairs[0].score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        // Identical questions score exactly 1.0 after clamping, which is not
        // strictly greater than a 1.0 threshold
        let questions = segment("p", "1. Define work\n2. Define work");
        let at_limit = find_similar_questions(&questions, &ScoringParams { threshold: 1.0 });
        assert!(at_limit.is_empty());

        let below = find_similar_questions(&questions, &ScoringParams { threshold: 0.99 });
        assert_eq!(below.len(), 1);
    }

    #[test]
    fn test_score_of_exactly_point_six_is_dropped() {
        // 3-4-5 triangle: cos = 3 / (5 * 1) = 0.6 with no rounding
        let a = weights(&[("force", 3.0), ("mass", 4.0)]);
        let b = weights(&[("force", 1.0)]);
        let s = cosine_from_weights(&a, &b);
        assert_eq!(s, SIMILARITY_THRESHOLD);

        let params = ScoringParams::default();
        assert!(!params.retains(s));
        assert!(params.retains(f64::from_bits(s.to_bits() + 1)));
    }

    #[test]
    fn test_pair_emission_order() {
        let questions = segment(
            "p",
            "1. define work done\n2. define power\n3. define work done by force\n4. define power output",
        );
        let pairs = find_similar_questions(&questions, &ScoringParams { threshold: 0.0 });
        let order: Vec<(usize, usize)> = pairs
            .iter()
            .map(|p| (p.question_a.ordinal, p.question_b.ordinal))
            .collect();
        let mut sorted = order.clone();
        sorted.sort();
        assert_eq!(order, sorted);
        assert!(order.iter().all(|(i, j)| i < j));
    }
}
