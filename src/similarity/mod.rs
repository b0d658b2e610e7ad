// Similarity scoring: TF-IDF weighting, cosine pair finding, duplicate clusters.

pub mod clusters;
pub mod cosine;
pub mod tfidf;
