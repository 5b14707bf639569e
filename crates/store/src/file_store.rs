//! File-based schedule store: one pretty-printed JSON file per user.
//!
//! Layout: `<dir>/<user_id>.json`, with `dir` taken from the config
//! (`~/.gymbot/user_data` by default).
//!
//! Every save writes the whole schedule to `<user_id>.json.tmp` and renames
//! it over the real file, so an interrupted write never leaves a truncated
//! schedule behind. Users never share a file.

use async_trait::async_trait;
use gymbot_core::error::StoreError;
use gymbot_core::schedule::{UserId, UserSchedule};
use gymbot_core::store::ScheduleStore;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A directory of per-user JSON schedule files.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a user's schedule file.
    pub fn user_file(&self, user: UserId) -> PathBuf {
        self.dir.join(format!("{user}.json"))
    }

    /// Users that have a schedule file, in id order. A missing directory
    /// means nobody has saved yet.
    pub async fn stored_users(&self) -> Result<Vec<UserId>, StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Self::io_error(&self.dir, e)),
        };

        let mut users = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Self::io_error(&self.dir, e))?
        {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            if let Some(id) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.parse::<i64>().ok())
            {
                users.push(UserId(id));
            }
        }
        users.sort();
        Ok(users)
    }

    fn io_error(path: &Path, e: std::io::Error) -> StoreError {
        StoreError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
    }
}

#[async_trait]
impl ScheduleStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn load(&self, user: UserId) -> Result<UserSchedule, StoreError> {
        let path = self.user_file(user);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(c) => c,
            // No file yet: the user simply has no schedule
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(UserSchedule::new()),
            Err(e) => return Err(Self::io_error(&path, e)),
        };

        let schedule: UserSchedule =
            serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        debug!(user = %user, days = schedule.weekdays().len(), "Schedule loaded");
        Ok(schedule)
    }

    async fn save(&self, user: UserId, schedule: &UserSchedule) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| Self::io_error(&self.dir, e))?;

        let content = serde_json::to_string_pretty(schedule)
            .map_err(|e| StoreError::Serialize(e.to_string()))?;

        let path = self.user_file(user);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content.as_bytes())
            .await
            .map_err(|e| Self::io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| Self::io_error(&path, e))?;

        info!(
            user = %user,
            exercises = schedule.exercise_count(),
            "Schedule saved"
        );
        Ok(())
    }
}
