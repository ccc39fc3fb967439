// Integration tests for session persistence: partial updates are
// last-write-wins per field, and the JSON store survives reopening.

mod common;

use anyhow::Result;
use encounter_scribe::notes::{ClinicalFacts, VitalSign};
use encounter_scribe::session::{EncounterSession, SessionStatus, Speaker, TranscriptSegment};
use encounter_scribe::store::{JsonStore, MemoryStore, SessionPatch, SessionStore};
use encounter_scribe::ScribeError;
use tempfile::TempDir;

fn segment(timestamp: u64, text: &str) -> TranscriptSegment {
    TranscriptSegment {
        id: format!("seg-{}", timestamp),
        timestamp,
        speaker: Speaker::Unknown,
        text: text.to_string(),
        confidence: None,
    }
}

#[tokio::test]
async fn test_memory_store_roundtrip_and_patch() -> Result<()> {
    let store = MemoryStore::new();
    let session = EncounterSession::new("enc-1".to_string());
    store.create(&session).await?;

    let loaded = store.get("enc-1").await?.expect("created session");
    assert_eq!(loaded.status, SessionStatus::Idle);
    assert!(loaded.transcript.is_empty());

    store
        .update(
            "enc-1",
            SessionPatch {
                status: Some(SessionStatus::Completed),
                duration_secs: Some(12.5),
                ..SessionPatch::default()
            },
        )
        .await?;

    let loaded = store.get("enc-1").await?.expect("session");
    assert_eq!(loaded.status, SessionStatus::Completed);
    assert_eq!(loaded.metadata.duration_secs, 12.5);

    Ok(())
}

#[tokio::test]
async fn test_update_unknown_session_fails() {
    let store = MemoryStore::new();

    let err = store
        .update("missing", SessionPatch::default())
        .await
        .expect_err("unknown session");
    assert!(matches!(err, ScribeError::Persistence { .. }));
}

#[tokio::test]
async fn test_patches_are_last_write_wins_per_field() -> Result<()> {
    let store = MemoryStore::new();
    store
        .create(&EncounterSession::new("enc-2".to_string()))
        .await?;

    // Two updates touching disjoint fields both stick
    store
        .update(
            "enc-2",
            SessionPatch {
                transcript: Some(vec![segment(1, "hello")]),
                ..SessionPatch::default()
            },
        )
        .await?;
    store
        .update(
            "enc-2",
            SessionPatch {
                facts: Some(ClinicalFacts {
                    vital_signs: vec![VitalSign {
                        name: "heart rate".to_string(),
                        value: "72".to_string(),
                        unit: Some("bpm".to_string()),
                    }],
                    action_items: vec![],
                }),
                ..SessionPatch::default()
            },
        )
        .await?;

    let loaded = store.get("enc-2").await?.expect("session");
    assert_eq!(loaded.transcript.len(), 1);
    assert!(loaded.facts.is_some());

    // A later transcript write supersedes the earlier one wholesale
    store
        .update(
            "enc-2",
            SessionPatch {
                transcript: Some(vec![segment(1, "hello"), segment(2, "again")]),
                ..SessionPatch::default()
            },
        )
        .await?;
    let loaded = store.get("enc-2").await?.expect("session");
    assert_eq!(loaded.transcript.len(), 2);
    assert!(loaded.facts.is_some(), "untouched fields survive");

    Ok(())
}

#[tokio::test]
async fn test_notice_patch_sets_and_clears() -> Result<()> {
    let store = MemoryStore::new();
    store
        .create(&EncounterSession::new("enc-3".to_string()))
        .await?;

    store
        .update(
            "enc-3",
            SessionPatch {
                generation_notice: Some(Some("drafting failed".to_string())),
                ..SessionPatch::default()
            },
        )
        .await?;
    assert!(store
        .get("enc-3")
        .await?
        .expect("session")
        .generation_notice
        .is_some());

    store
        .update(
            "enc-3",
            SessionPatch {
                generation_notice: Some(None),
                ..SessionPatch::default()
            },
        )
        .await?;
    assert!(store
        .get("enc-3")
        .await?
        .expect("session")
        .generation_notice
        .is_none());

    Ok(())
}

#[tokio::test]
async fn test_json_store_persists_across_reopen() -> Result<()> {
    let dir = TempDir::new()?;

    {
        let store = JsonStore::open(dir.path())?;
        let mut session = EncounterSession::new("enc-4".to_string());
        session.transcript.push(segment(1, "persisted"));
        store.create(&session).await?;

        store
            .update(
                "enc-4",
                SessionPatch {
                    status: Some(SessionStatus::Completed),
                    duration_secs: Some(30.0),
                    ..SessionPatch::default()
                },
            )
            .await?;
    }

    // A fresh handle over the same directory sees the finalized record
    let store = JsonStore::open(dir.path())?;
    let loaded = store.get("enc-4").await?.expect("persisted session");
    assert_eq!(loaded.status, SessionStatus::Completed);
    assert_eq!(loaded.metadata.duration_secs, 30.0);
    assert_eq!(loaded.transcript.len(), 1);
    assert_eq!(loaded.transcript[0].text, "persisted");

    Ok(())
}

#[tokio::test]
async fn test_json_store_lists_sessions_and_rejects_unknown_updates() -> Result<()> {
    let dir = TempDir::new()?;
    let store = JsonStore::open(dir.path())?;

    assert!(store.list().await?.is_empty());
    assert!(store.get("absent").await?.is_none());

    store
        .create(&EncounterSession::new("enc-b".to_string()))
        .await?;
    store
        .create(&EncounterSession::new("enc-a".to_string()))
        .await?;

    assert_eq!(store.list().await?, vec!["enc-a", "enc-b"]);

    let err = store
        .update("absent", SessionPatch::default())
        .await
        .expect_err("unknown session");
    assert!(matches!(err, ScribeError::Persistence { .. }));

    Ok(())
}
