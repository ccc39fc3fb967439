use super::{SessionPatch, SessionStore};
use crate::error::{Result, ScribeError};
use crate::session::EncounterSession;
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::info;

/// File-backed session store: one JSON document per session id under a
/// data directory. Writes are serialized through a single lock so
/// concurrent partial updates cannot interleave a read-modify-write.
pub struct JsonStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonStore {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .map_err(|e| ScribeError::persistence(format!("failed to create {:?}: {}", dir, e)))?;

        info!("Session store initialized at {:?}", dir);

        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    fn path_for(&self, session_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", session_id))
    }

    fn read(&self, session_id: &str) -> Result<Option<EncounterSession>> {
        let path = self.path_for(session_id);
        if !path.exists() {
            return Ok(None);
        }

        let data = fs::read(&path)
            .map_err(|e| ScribeError::persistence(format!("failed to read {:?}: {}", path, e)))?;

        let session = serde_json::from_slice(&data)
            .map_err(|e| ScribeError::persistence(format!("corrupt record {:?}: {}", path, e)))?;

        Ok(Some(session))
    }

    fn write(&self, session: &EncounterSession) -> Result<()> {
        let path = self.path_for(&session.id);
        let data = serde_json::to_vec_pretty(session)
            .map_err(|e| ScribeError::persistence(format!("failed to encode session: {}", e)))?;

        fs::write(&path, data)
            .map_err(|e| ScribeError::persistence(format!("failed to write {:?}: {}", path, e)))
    }
}

#[async_trait]
impl SessionStore for JsonStore {
    async fn create(&self, session: &EncounterSession) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write(session)
    }

    async fn get(&self, session_id: &str) -> Result<Option<EncounterSession>> {
        self.read(session_id)
    }

    async fn update(&self, session_id: &str, patch: SessionPatch) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut session = self.read(session_id)?.ok_or_else(|| {
            ScribeError::persistence(format!("unknown session: {}", session_id))
        })?;

        patch.apply(&mut session);
        self.write(&session)
    }

    async fn list(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.dir)
            .map_err(|e| ScribeError::persistence(format!("failed to list sessions: {}", e)))?;

        let mut ids = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| ScribeError::persistence(format!("failed to list: {}", e)))?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if let Some(id) = name.strip_suffix(".json") {
                ids.push(id.to_string());
            }
        }

        ids.sort();
        Ok(ids)
    }
}
