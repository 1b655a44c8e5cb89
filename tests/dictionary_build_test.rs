use std::fs;
use std::sync::Arc;

use tempfile::Builder;

use symcompound::error::SpellError;
use symcompound::spelling::{
    BatchConfig, BatchCorrector, DictionaryBuilder, SpellConfig, SpellIndex, Verbosity,
};

#[test]
fn test_build_from_frequency_file() {
    let dir = Builder::new().prefix("test_dictionary").tempdir().unwrap();
    let path = dir.path().join("frequency.txt");
    fs::write(
        &path,
        "the 23135851162\nof 13151942776\nAnd 12997637966\n\nbroken\nto notanumber\nhello 5 extra\n",
    )
    .unwrap();

    let mut builder = DictionaryBuilder::new(SpellConfig::default()).unwrap();
    let stats = builder.load_dictionary(&path, 0, 1).unwrap();
    assert_eq!(stats.lines, 7);
    assert_eq!(stats.entries, 4);
    assert_eq!(stats.skipped, 3);

    let index = builder.build();
    assert_eq!(index.len(), 4);
    assert_eq!(index.count("and"), Some(12997637966));
    assert!(!index.contains("And"));
    assert_eq!(index.lookup("teh", 2, Verbosity::Top)[0].term, "the");
}

#[test]
fn test_count_index_before_term_index() {
    let dir = Builder::new().prefix("test_dictionary").tempdir().unwrap();
    let path = dir.path().join("reversed.txt");
    fs::write(&path, "120 cat\n80 dog\n").unwrap();

    let mut builder = DictionaryBuilder::new(SpellConfig::default()).unwrap();
    builder.load_dictionary(&path, 1, 0).unwrap();
    let index = builder.build();

    assert_eq!(index.count("cat"), Some(120));
    assert_eq!(index.count("dog"), Some(80));
}

#[test]
fn test_missing_dictionary_is_a_load_error() {
    let dir = Builder::new().prefix("test_dictionary").tempdir().unwrap();
    let mut builder = DictionaryBuilder::new(SpellConfig::default()).unwrap();

    let result = builder.load_dictionary(dir.path().join("missing.txt"), 0, 1);
    assert!(matches!(result, Err(SpellError::Load(_))));

    // The builder is still usable after a failed load.
    builder.add_term("still", 1);
    assert!(builder.build().contains("still"));
}

#[test]
fn test_corpus_with_threshold() {
    let dir = Builder::new().prefix("test_dictionary").tempdir().unwrap();
    let path = dir.path().join("corpus.txt");
    fs::write(
        &path,
        "the cat sat on the mat\nThe dog sat on the log\nA cat is not a dog\n",
    )
    .unwrap();

    let mut builder = DictionaryBuilder::new(SpellConfig::default().with_count_threshold(2)).unwrap();
    let stats = builder.load_corpus(&path).unwrap();
    assert_eq!(stats.entries, 18);

    let index = builder.build();
    assert_eq!(index.count("the"), Some(4));
    assert_eq!(index.count("cat"), Some(2));
    assert_eq!(index.count("a"), Some(2));
    assert!(!index.contains("mat"));
    assert!(!index.contains("log"));
}

#[test]
fn test_corpus_build_and_batch_correct() {
    let dir = Builder::new().prefix("test_dictionary").tempdir().unwrap();
    let corpus = dir.path().join("corpus.txt");
    let snapshot = dir.path().join("corpus.symc");
    fs::write(&corpus, "where is the love\nthe cat sat on the mat\n").unwrap();

    let mut builder = DictionaryBuilder::new(SpellConfig::default()).unwrap();
    builder.load_corpus(&corpus).unwrap();
    builder.build().save(&snapshot).unwrap();

    let index = Arc::new(SpellIndex::load(&snapshot).unwrap());
    let corrector = BatchCorrector::new(index, BatchConfig::with_threads(3)).unwrap();

    let lines = vec![
        "whe re is teh love".to_string(),
        "thecat sat".to_string(),
        "the mat".to_string(),
    ];
    let (corrections, stats) = corrector.correct_lines_with_stats(&lines, 2);

    assert_eq!(corrections[0].result.term, "where is the love");
    assert_eq!(corrections[1].result.term, "the cat sat");
    assert_eq!(corrections[2].result.term, "the mat");
    assert_eq!(stats.lines, 3);
    assert_eq!(stats.changed, 2);
    assert_eq!(stats.unresolved, 0);
}
