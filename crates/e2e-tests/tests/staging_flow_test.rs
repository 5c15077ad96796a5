//! Indexing failures flow into the staging queue and back out.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use e2e_tests::{PartialOutageEmbedder, TestHarness};
use heritage_embeddings::{fallback_vector, DEFAULT_DIMENSION};
use heritage_indexing::{ModelSelection, ProcessOptions};
use heritage_search::SearchRequest;

#[tokio::test]
async fn test_stage_then_force_fallback() {
    let harness = TestHarness::new();
    let artifact = harness.record("a paper tide", &[]);
    harness.staging.add(&artifact.id, "nomic-embed-text").unwrap();

    let results = harness
        .processor()
        .process(&ProcessOptions::new().with_force_fallback(true))
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert!(results[0].success);
    assert!(harness.staging.list().unwrap().is_empty());

    let stored = harness.store.load(&artifact.id).unwrap();
    assert_eq!(
        stored.model_embedding("nomic-embed-text").unwrap(),
        fallback_vector("a paper tide", DEFAULT_DIMENSION)
    );
}

#[tokio::test]
async fn test_unreachable_model_is_staged_and_retried() {
    let harness = TestHarness::with_embedder(Arc::new(PartialOutageEmbedder::new(&["down"])));
    let a1 = harness.record("echoing corridors", &[]);
    let a2 = harness.record("luminous moss", &[]);

    let selection = ModelSelection::Many(vec!["up".to_string(), "down".to_string()]);
    let report = harness.indexer().index(&selection).await.unwrap();
    assert_eq!(report.updated.len(), 2);
    assert_eq!(report.staged, 2);

    let mut staged: Vec<_> = harness
        .staging
        .list()
        .unwrap()
        .into_iter()
        .map(|e| (e.artifact_id, e.model))
        .collect();
    staged.sort();
    let mut expected = vec![(a1.id.clone(), "down".to_string()), (a2.id.clone(), "down".to_string())];
    expected.sort();
    assert_eq!(staged, expected);

    // Model still down: one attempt each, consumed without re-staging
    let results = harness.processor().process(&ProcessOptions::new()).await.unwrap();
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| !r.success));
    assert!(harness.staging.list().unwrap().is_empty());

    let stored = harness.store.load(&a1.id).unwrap();
    assert_eq!(stored.embedding_models(), vec!["up"]);
}

#[tokio::test]
async fn test_overlapping_passes_are_safe() {
    let harness = TestHarness::new();
    for i in 0..10 {
        let artifact = harness.record(&format!("fragment {i}"), &[]);
        harness.staging.add(&artifact.id, "m").unwrap();
    }

    let first = harness.processor();
    let second = harness.processor();
    let options = ProcessOptions::new().with_force_fallback(true);
    let (a, b) = tokio::join!(first.process(&options), second.process(&options));

    let a = a.unwrap();
    let b = b.unwrap();
    assert!(a.len() + b.len() >= 10);
    assert!(harness.staging.list().unwrap().is_empty());

    for artifact in harness.store.list().unwrap() {
        assert!(artifact.model_embedding("m").is_some(), "{} missing vector", artifact.id);
    }
}

#[tokio::test]
async fn test_ensemble_over_indexed_models() {
    let harness = TestHarness::with_embedder(Arc::new(PartialOutageEmbedder::new(&[])));
    harness.record("ocean of circuits and lenses", &["ocean"]);
    harness.record("a glass city", &[]);
    harness.record("salt and static", &[]);

    let selection = ModelSelection::Many(vec!["m1".to_string(), "m2".to_string()]);
    harness.indexer().index(&selection).await.unwrap();

    let single = harness
        .searcher()
        .search(&SearchRequest::new("ocean").with_model("m1").with_top_k(3))
        .await;
    let same_model_twice = harness
        .searcher()
        .search(
            &SearchRequest::new("ocean")
                .with_models(vec!["m1".to_string(), "m1".to_string()])
                .with_top_k(3),
        )
        .await;
    let ids = |hits: &[heritage_search::SearchHit]| {
        hits.iter().map(|h| h.artifact.id.clone()).collect::<Vec<_>>()
    };
    assert_eq!(ids(&same_model_twice), ids(&single));

    let blended = harness
        .searcher()
        .search(
            &SearchRequest::new("ocean")
                .with_models(vec!["m1".to_string(), "m2".to_string()])
                .with_top_k(2),
        )
        .await;
    assert_eq!(blended.len(), 2);
    assert!(blended.iter().all(|h| h.score.is_finite()));
}
