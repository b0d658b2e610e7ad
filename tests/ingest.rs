// Ingestion tests: loading extracted paper text from a directory.
//
// Uses temporary directories so nothing outside the test's sandbox is touched.

use std::fs;

use paperdupe::analysis::batch::BatchAnalyzer;
use paperdupe::analysis::models::AnalysisMode;
use paperdupe::ingest::{read_text_file, DirectorySource, DocumentSource};

#[test]
fn loads_matching_files_sorted_by_name() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("2020.txt"), "1. Define power").unwrap();
    fs::write(dir.path().join("2019.txt"), "1. Define work").unwrap();
    fs::write(dir.path().join("notes.md"), "1. Not a paper").unwrap();
    fs::create_dir(dir.path().join("2018.txt")).unwrap();

    let documents = DirectorySource::new(dir.path(), "txt").load().unwrap();
    let names: Vec<&str> = documents.iter().map(|d| d.source_name.as_str()).collect();
    assert_eq!(names, vec!["2019.txt", "2020.txt"]);
    assert_eq!(documents[0].id, "2019.txt");
    assert_eq!(documents[0].raw_text, "1. Define work");
}

#[test]
fn empty_directory_loads_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let documents = DirectorySource::new(dir.path(), "txt").load().unwrap();
    assert!(documents.is_empty());
}

#[test]
fn invalid_utf8_is_replaced_not_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scan.txt");
    fs::write(&path, b"1. Define \xFF work").unwrap();

    let text = read_text_file(&path).unwrap();
    assert!(text.starts_with("1. Define "));
    assert!(text.ends_with(" work"));
    assert!(text.contains('\u{FFFD}'));
}

#[test]
fn loaded_directory_feeds_batch() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("2019.txt"),
        "1. What is gravity?\n2. Define momentum.",
    )
    .unwrap();
    fs::write(
        dir.path().join("2020.txt"),
        "1. What is gravity?\n2. State Hooke's law.",
    )
    .unwrap();

    let documents = DirectorySource::new(dir.path(), "txt").load().unwrap();
    let analyzer = BatchAnalyzer::default();

    let per_document = analyzer.analyze_batch(&documents, AnalysisMode::PerDocument);
    assert_eq!(per_document.aggregate.total_pairs, 0);

    let combined = analyzer.analyze_batch(&documents, AnalysisMode::Combined);
    assert_eq!(combined.aggregate.total_pairs, 1);
    assert!(combined.results[0].pairs[0].is_cross_document());
}
