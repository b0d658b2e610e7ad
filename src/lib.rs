// Paperdupe: near-duplicate question detection for exam papers
//
// This is the library root. Text goes in as already-extracted plain text,
// gets segmented into questions, weighted with TF-IDF, and compared pairwise.

pub mod analysis;
pub mod config;
pub mod ingest;
pub mod output;
pub mod similarity;
pub mod text;
