//! Liveness heartbeat
//!
//! One RFC 3339 timestamp at a well-known path, rewritten after every
//! successful tick. External supervision watches the file age; the keeper
//! itself never reads it back. Written via temp file + rename so a
//! supervisor never observes a partial write.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::AppResult;

pub struct HeartbeatWriter {
    path: PathBuf,
}

impl HeartbeatWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn write_now(&self) -> AppResult<()> {
        self.write_at(Utc::now()).await
    }

    pub async fn write_at(&self, timestamp: DateTime<Utc>) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, timestamp.to_rfc3339()).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
