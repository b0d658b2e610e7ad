// TF-IDF term weighting over a set of questions.
//
// Each question is one document, and the corpus is exactly the slice handed
// to `TermWeightModel::build`: one paper's questions in per-document mode, or
// every question of the batch in combined mode. IDF never leaks between
// builds, so a term shared across two papers analyzed separately has no
// effect on either paper's weights.
//
// Weighting:
//
//   tf(t, q) = raw count of t in q
//   idf(t)   = 1 + ln(N / (1 + df(t)))
//
// where N is the number of questions and df(t) the number of questions
// containing t. The similarity threshold is calibrated against this exact
// smoothing; changing it shifts which pairs clear 0.60. Since df(t) <= N the
// IDF never drops below 1 + ln(1/2), so every weight is strictly positive.
//
// Vectors keep their weights in term order. Every float sum over a vector
// (magnitude, dot product) runs in that order, so the same input scores
// bit-identically on every run.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::analysis::models::Question;
use crate::text::normalize::tokenize;

/// Sparse term -> weight map for one question, ordered by term.
///
/// Only `TermWeightModel::build` creates these, and a vector is only
/// meaningful next to the other vectors of the model that built it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TermWeightVector {
    weights: BTreeMap<String, f64>,
}

impl TermWeightVector {
    /// Weight of a term; absent terms weigh 0.
    pub fn weight(&self, term: &str) -> f64 {
        self.weights.get(term).copied().unwrap_or(0.0)
    }

    pub fn weights(&self) -> &BTreeMap<String, f64> {
        &self.weights
    }

    /// Number of distinct terms with a weight.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Euclidean norm.
    pub fn magnitude(&self) -> f64 {
        self.weights.values().map(|w| w * w).sum::<f64>().sqrt()
    }
}

/// Smoothed inverse document frequency.
pub fn idf(corpus_size: usize, document_frequency: usize) -> f64 {
    1.0 + (corpus_size as f64 / (1.0 + document_frequency as f64)).ln()
}

/// A TF-IDF model built over one corpus of questions.
///
/// Holds the questions it was built from alongside their vectors, so pair
/// finding always compares vectors from the same corpus.
#[derive(Debug, Clone)]
pub struct TermWeightModel<'q> {
    questions: &'q [Question],
    vectors: Vec<TermWeightVector>,
    idf: HashMap<String, f64>,
}

impl<'q> TermWeightModel<'q> {
    /// Build the model. An empty slice gives an empty model.
    pub fn build(questions: &'q [Question]) -> Self {
        let tokenized: Vec<Vec<String>> = questions.iter().map(|q| tokenize(&q.text)).collect();

        let mut document_frequency: HashMap<&str, usize> = HashMap::new();
        for tokens in &tokenized {
            let unique: HashSet<&str> = tokens.iter().map(String::as_str).collect();
            for term in unique {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let corpus_size = questions.len();
        let idf_by_term: HashMap<String, f64> = document_frequency
            .into_iter()
            .map(|(term, df)| (term.to_string(), idf(corpus_size, df)))
            .collect();

        let vectors = tokenized
            .into_iter()
            .map(|tokens| {
                let mut weights: BTreeMap<String, f64> = BTreeMap::new();
                for token in tokens {
                    *weights.entry(token).or_insert(0.0) += 1.0;
                }
                for (term, weight) in weights.iter_mut() {
                    *weight *= idf_by_term.get(term).copied().unwrap_or(0.0);
                }
                TermWeightVector { weights }
            })
            .collect();

        Self {
            questions,
            vectors,
            idf: idf_by_term,
        }
    }

    pub fn questions(&self) -> &'q [Question] {
        self.questions
    }

    pub fn vectors(&self) -> &[TermWeightVector] {
        &self.vectors
    }

    /// Vector of the question at `index` in build order.
    pub fn vector(&self, index: usize) -> Option<&TermWeightVector> {
        self.vectors.get(index)
    }

    /// IDF of a term within this corpus, if any question contains it.
    pub fn idf(&self, term: &str) -> Option<f64> {
        self.idf.get(term).copied()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Questions paired with their vectors, in build order.
    pub fn iter(&self) -> impl Iterator<Item = (&'q Question, &TermWeightVector)> + '_ {
        self.questions.iter().zip(self.vectors.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::segment::segment;

    #[test]
    fn test_idf_smoothing() {
        assert!((idf(3, 2) - 1.0).abs() < 1e-12);
        assert!((idf(3, 1) - (1.0 + 1.5f64.ln())).abs() < 1e-12);
        // Term in every question still weighs more than zero
        assert!(idf(10, 10) > 0.0);
    }

    #[test]
    fn test_raw_count_term_frequency() {
        let questions = segment("p", "1. force force mass\n2. energy");
        let model = TermWeightModel::build(&questions);
        let v = model.vector(0).unwrap();
        let force_idf = model.idf("force").unwrap();
        assert!((v.weight("force") - 2.0 * force_idf).abs() < 1e-12);
        assert_eq!(v.weight("energy"), 0.0);
    }

    #[test]
    fn test_empty_model() {
        let model = TermWeightModel::build(&[]);
        assert!(model.is_empty());
        assert!(model.vectors().is_empty());
        assert_eq!(model.idf("anything"), None);
    }

    #[test]
    fn test_question_without_words_has_empty_vector() {
        let questions = segment("p", "1. ???\n2. Define work");
        let model = TermWeightModel::build(&questions);
        let v = model.vector(0).unwrap();
        assert!(v.is_empty());
        assert_eq!(v.magnitude(), 0.0);
    }

    #[test]
    fn test_rebuilt_model_scores_bit_identical() {
        use crate::similarity::cosine::score;

        let text = "1. Question about topic 0\n2. Question about topic 0 again";
        let scores: HashSet<u64> = (0..50)
            .map(|_| {
                let questions = segment("paper-0", text);
                let model = TermWeightModel::build(&questions);
                let (a, b) = (model.vector(0).unwrap(), model.vector(1).unwrap());
                score(a, b).to_bits()
            })
            .collect();
        assert_eq!(scores.len(), 1, "Scores differ across builds: {scores:?}");
    }

    #[test]
    fn test_weights_iterate_in_term_order() {
        let questions = segment("p", "1. zeta alpha mu alpha");
        let model = TermWeightModel::build(&questions);
        let terms: Vec<&str> = model.vector(0).unwrap().weights().keys().map(String::as_str).collect();
        assert_eq!(terms, vec!["alpha", "mu", "zeta"]);
    }

    #[test]
    fn test_weights_non_negative() {
        let questions = segment("p", "1. a b c\n2. a b\n3. a");
        let model = TermWeightModel::build(&questions);
        for (_, vector) in model.iter() {
            assert!(vector.weights().values().all(|w| *w > 0.0));
        }
    }
}
