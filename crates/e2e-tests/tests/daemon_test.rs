//! Sleep daemon scenarios against the process-wide daemon.

use std::time::Duration;

use pretty_assertions::assert_eq;

use e2e_tests::TestHarness;
use heritage_scheduler::{DaemonOptions, SleepDaemon};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_daemon_drains_staging_within_interval() {
    let harness = TestHarness::new();
    let daemon = SleepDaemon::global();

    let options = DaemonOptions {
        interval_ms: 100,
        ..Default::default()
    };
    let config = daemon
        .start(harness.base_dir(), options, harness.embedder.clone())
        .unwrap();
    assert_eq!(config.interval_ms, 100);

    let artifact = harness.record("clockwork clouds", &[]);
    harness.staging.add(&artifact.id, "nomic-embed-text").unwrap();

    tokio::time::sleep(Duration::from_millis(350)).await;
    assert_eq!(harness.staging.list().unwrap().len(), 0);
    assert!(harness
        .store
        .load(&artifact.id)
        .unwrap()
        .model_embedding("nomic-embed-text")
        .is_some());

    let status = daemon.status();
    assert!(status.running);
    assert!(status.stats.ticks_run >= 1);

    daemon.stop();
    let status = daemon.status();
    assert!(!status.running);
    assert!(status.config.is_none());

    // Stopped daemon no longer drains the queue
    harness.staging.add(&artifact.id, "later").unwrap();
    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(harness.staging.list().unwrap().len(), 1);
}
