// Integration tests for the session registry state machine.
//
// These tests drive the lifecycle directly against an in-memory byte sink:
// forward-only transitions, byte accounting, idempotent finish signals,
// and loud id-collision failures.

use anyhow::Result;
use audio_uplink::{
    Begin, ByteSink, MemorySink, Outcome, SessionRegistry, SessionStatus, UplinkError,
};
use std::sync::Arc;

fn registry() -> (SessionRegistry, Arc<audio_uplink::MemorySink>) {
    let sink = MemorySink::new();
    (SessionRegistry::new(sink.clone()), sink)
}

fn success_outcome() -> Outcome {
    Outcome::Success {
        transcript: "hello world".to_string(),
        translation: "halo dunia".to_string(),
        audio_ref: "record_test.wav".to_string(),
        duration_secs: 1.5,
    }
}

#[tokio::test]
async fn test_full_lifecycle() -> Result<()> {
    let (registry, sink) = registry();

    let id = registry.create().await?;
    assert!(id.starts_with("upload-"), "id should be prefixed: {}", id);

    let snapshot = registry.get(&id).await.unwrap();
    assert_eq!(snapshot.status, SessionStatus::Collecting);
    assert_eq!(snapshot.byte_count, 0);
    assert!(snapshot.outcome.is_none());

    let receipt = registry.append(&id, &[0u8; 100]).await?;
    assert_eq!(receipt.received_bytes, 100);
    assert_eq!(receipt.total_bytes, 100);

    let receipt = registry.append(&id, &[1u8; 50]).await?;
    assert_eq!(receipt.received_bytes, 50);
    assert_eq!(receipt.total_bytes, 150);

    assert_eq!(registry.begin_processing(&id).await?, Begin::Started);
    let snapshot = registry.get(&id).await.unwrap();
    assert_eq!(snapshot.status, SessionStatus::Processing);

    registry.complete(&id, success_outcome()).await?;
    let snapshot = registry.get(&id).await.unwrap();
    assert_eq!(snapshot.status, SessionStatus::Done);
    assert!(snapshot.finished_at.is_some());
    assert!(snapshot.outcome.as_ref().unwrap().ok());

    // Bytes landed in the sink in append order.
    let mut expected = vec![0u8; 100];
    expected.extend_from_slice(&[1u8; 50]);
    assert_eq!(sink.read_all(&id).await?, expected);

    Ok(())
}

#[tokio::test]
async fn test_append_unknown_id_is_not_found() {
    let (registry, _) = registry();

    let err = registry.append("upload-missing", &[0u8; 4]).await.unwrap_err();
    assert!(matches!(err, UplinkError::NotFound { .. }), "got {:?}", err);
}

#[tokio::test]
async fn test_empty_chunk_is_rejected() -> Result<()> {
    let (registry, _) = registry();
    let id = registry.create().await?;

    let err = registry.append(&id, &[]).await.unwrap_err();
    assert!(matches!(err, UplinkError::EmptyChunk { .. }), "got {:?}", err);

    // Rejected append does not change byte accounting.
    assert_eq!(registry.get(&id).await.unwrap().byte_count, 0);
    Ok(())
}

#[tokio::test]
async fn test_append_after_finish_is_invalid_state() -> Result<()> {
    let (registry, _) = registry();
    let id = registry.create().await?;

    registry.append(&id, &[0u8; 64]).await?;
    registry.begin_processing(&id).await?;

    let err = registry.append(&id, &[0u8; 64]).await.unwrap_err();
    assert!(matches!(err, UplinkError::InvalidState { .. }), "got {:?}", err);
    assert_eq!(registry.get(&id).await.unwrap().byte_count, 64);

    // Still rejected once Done.
    registry.complete(&id, success_outcome()).await?;
    let err = registry.append(&id, &[0u8; 64]).await.unwrap_err();
    assert!(matches!(err, UplinkError::InvalidState { .. }));
    assert_eq!(registry.get(&id).await.unwrap().byte_count, 64);

    Ok(())
}

#[tokio::test]
async fn test_begin_processing_started_at_most_once() -> Result<()> {
    let (registry, _) = registry();
    let id = registry.create().await?;

    assert_eq!(registry.begin_processing(&id).await?, Begin::Started);
    assert_eq!(registry.begin_processing(&id).await?, Begin::AlreadyStarted);

    registry.complete(&id, success_outcome()).await?;
    assert_eq!(registry.begin_processing(&id).await?, Begin::AlreadyStarted);

    Ok(())
}

#[tokio::test]
async fn test_concurrent_begin_processing_yields_one_started() -> Result<()> {
    let sink = MemorySink::new();
    let registry = Arc::new(SessionRegistry::new(sink));
    let id = registry.create().await?;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let registry = Arc::clone(&registry);
        let id = id.clone();
        handles.push(tokio::spawn(
            async move { registry.begin_processing(&id).await },
        ));
    }

    let mut started = 0;
    for handle in handles {
        if handle.await?? == Begin::Started {
            started += 1;
        }
    }
    assert_eq!(started, 1, "exactly one caller may win the transition");

    Ok(())
}

#[tokio::test]
async fn test_complete_requires_processing() -> Result<()> {
    let (registry, _) = registry();
    let id = registry.create().await?;

    let err = registry.complete(&id, success_outcome()).await.unwrap_err();
    assert!(matches!(err, UplinkError::InvalidState { .. }), "got {:?}", err);

    registry.begin_processing(&id).await?;
    registry.complete(&id, success_outcome()).await?;

    // No backward transition: a second complete fails too.
    let err = registry.complete(&id, success_outcome()).await.unwrap_err();
    assert!(matches!(err, UplinkError::InvalidState { .. }));

    Ok(())
}

#[tokio::test]
async fn test_duplicate_id_fails_loudly() -> Result<()> {
    let (registry, _) = registry();

    registry.create_with_id("upload-fixed".to_string()).await?;
    registry.append("upload-fixed", &[0u8; 10]).await?;

    let err = registry
        .create_with_id("upload-fixed".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, UplinkError::DuplicateId { .. }), "got {:?}", err);

    // The in-flight session was not overwritten.
    assert_eq!(registry.get("upload-fixed").await.unwrap().byte_count, 10);
    Ok(())
}

#[tokio::test]
async fn test_snapshot_after_done_is_stable() -> Result<()> {
    let (registry, _) = registry();
    let id = registry.create().await?;
    registry.append(&id, &[0u8; 32]).await?;
    registry.begin_processing(&id).await?;
    registry.complete(&id, success_outcome()).await?;

    let first = registry.get(&id).await.unwrap();
    for _ in 0..5 {
        let again = registry.get(&id).await.unwrap();
        assert_eq!(again.status, SessionStatus::Done);
        assert_eq!(again.outcome, first.outcome);
        assert_eq!(again.finished_at, first.finished_at);
    }

    Ok(())
}

#[tokio::test]
async fn test_all_returns_every_session() -> Result<()> {
    let (registry, _) = registry();
    let a = registry.create().await?;
    let b = registry.create().await?;
    registry.begin_processing(&b).await?;

    let snapshots = registry.all().await;
    assert_eq!(snapshots.len(), 2);

    let status_of = |id: &str| {
        snapshots
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.status)
            .unwrap()
    };
    assert_eq!(status_of(&a), SessionStatus::Collecting);
    assert_eq!(status_of(&b), SessionStatus::Processing);

    Ok(())
}
