// Integration tests for session-manager orchestration: single active
// recording, lifecycle transitions, stats, signal reporting, and view
// switching.

mod common;

use anyhow::Result;
use common::{harness, MockGenerator, MockTranscriber};
use encounter_scribe::monitor::SignalQuality;
use encounter_scribe::session::SessionStatus;
use encounter_scribe::ScribeError;
use std::time::Duration;

fn quick() -> common::TestHarness {
    harness(
        MockTranscriber::new().with_batches(1, 1),
        MockGenerator::new(),
        Duration::from_millis(60),
    )
}

#[tokio::test]
async fn test_only_one_recording_may_be_active() -> Result<()> {
    let h = quick();

    h.manager.start_recording(Some("enc-1".to_string())).await?;

    let err = h
        .manager
        .start_recording(Some("enc-2".to_string()))
        .await
        .expect_err("second start must fail");
    assert!(matches!(err, ScribeError::InvalidTransition { .. }));

    h.manager.stop_recording().await?;

    // After stopping, a new recording may begin
    h.manager.start_recording(Some("enc-2".to_string())).await?;
    h.manager.stop_recording().await?;

    Ok(())
}

#[tokio::test]
async fn test_lifecycle_is_reflected_in_stats() -> Result<()> {
    let h = quick();

    let session_id = h.manager.start_recording(None).await?;

    let stats = h.manager.stats(&session_id).await?;
    assert_eq!(stats.status, SessionStatus::Active);

    h.manager.pause_recording().await?;
    let stats = h.manager.stats(&session_id).await?;
    assert_eq!(stats.status, SessionStatus::Paused);

    h.manager.resume_recording().await?;
    let stats = h.manager.stats(&session_id).await?;
    assert_eq!(stats.status, SessionStatus::Active);

    tokio::time::sleep(Duration::from_millis(80)).await;
    let stats = h.manager.stop_recording().await?;
    assert_eq!(stats.status, SessionStatus::Completed);
    assert!(stats.duration_secs > 0.0);

    // The finalized record is queryable after the fact
    let stored = h.manager.stats(&session_id).await?;
    assert_eq!(stored.status, SessionStatus::Completed);
    assert!(stored.duration_secs > 0.0);

    Ok(())
}

#[tokio::test]
async fn test_pause_and_resume_require_an_active_recording() -> Result<()> {
    let h = quick();

    assert!(matches!(
        h.manager.pause_recording().await,
        Err(ScribeError::InvalidTransition { .. })
    ));
    assert!(matches!(
        h.manager.resume_recording().await,
        Err(ScribeError::InvalidTransition { .. })
    ));
    assert!(matches!(
        h.manager.stop_recording().await,
        Err(ScribeError::InvalidTransition { .. })
    ));

    Ok(())
}

#[tokio::test]
async fn test_view_unknown_session_is_not_found() {
    let h = quick();

    let err = h
        .manager
        .view_session("no-such-session")
        .await
        .expect_err("unknown session");
    assert!(matches!(err, ScribeError::SessionNotFound { .. }));
}

#[tokio::test]
async fn test_starting_a_recording_views_that_session() -> Result<()> {
    let h = quick();

    let session_id = h.manager.start_recording(None).await?;
    assert_eq!(h.manager.viewed_session().await, Some(session_id.clone()));

    h.manager.stop_recording().await?;
    Ok(())
}

#[tokio::test]
async fn test_signal_report_tracks_the_active_recording() -> Result<()> {
    let h = quick();

    // Idle service: quality is none
    let report = h.manager.signal().await;
    assert_eq!(report.quality, SignalQuality::None);

    h.manager.start_recording(None).await?;
    tokio::time::sleep(Duration::from_millis(150)).await;

    let report = h.manager.signal().await;
    assert_ne!(report.quality, SignalQuality::None);
    assert!(report.sample.rms > 0.0);

    h.manager.stop_recording().await?;
    let report = h.manager.signal().await;
    assert_eq!(report.quality, SignalQuality::None);

    Ok(())
}

#[tokio::test]
async fn test_completed_session_can_be_recorded_again() -> Result<()> {
    let h = quick();

    let session_id = h.manager.start_recording(Some("enc-again".to_string())).await?;
    tokio::time::sleep(Duration::from_millis(150)).await;
    let first = h.manager.stop_recording().await?;
    assert!(first.segment_count > 0);

    // A new attempt on the same session entity
    let resumed_id = h
        .manager
        .start_recording(Some("enc-again".to_string()))
        .await?;
    assert_eq!(resumed_id, session_id);
    tokio::time::sleep(Duration::from_millis(80)).await;
    let second = h.manager.stop_recording().await?;

    // The transcript keeps growing across attempts; timestamps stay
    // strictly increasing
    assert!(second.segment_count >= first.segment_count);
    let transcript = h.manager.transcript(&session_id).await?;
    for pair in transcript.windows(2) {
        assert!(pair[0].timestamp < pair[1].timestamp);
    }

    h.manager.dismiss_notice(&session_id).await?;
    Ok(())
}
