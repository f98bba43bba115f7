//! Per-stack state on disk
//!
//! Manages `.blogstack/<stack>/state.json`, which keeps the last deployment
//! document handed to the engine and the attribute values the engine reported
//! back (used to resolve stack outputs).

use crate::error::{CloudError, Result};
use crate::output::Attributes;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

const STATE_VERSION: u32 = 1;
const STATE_DIR: &str = ".blogstack";
const STATE_FILE: &str = "state.json";
const STATE_BACKUP: &str = "state.json.backup";
const STATE_STAGING: &str = "state.json.tmp";
const LOCK_FILE: &str = "lock.json";

/// Age after which a lock left behind by a crashed run may be taken over
pub const STALE_LOCK_HOURS: i64 = 1;

/// State of a single stack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackState {
    /// State file version
    pub version: u32,

    pub stack: String,

    /// Last modified timestamp
    pub updated_at: DateTime<Utc>,

    /// Last deployment document submitted for this stack
    pub document: Option<serde_json::Value>,

    /// Attribute values reported by the engine
    #[serde(default)]
    pub attributes: Attributes,
}

impl StackState {
    pub fn new(stack: impl Into<String>) -> Self {
        Self {
            version: STATE_VERSION,
            stack: stack.into(),
            updated_at: Utc::now(),
            document: None,
            attributes: Attributes::new(),
        }
    }

    pub fn set_document(&mut self, document: serde_json::Value) {
        self.document = Some(document);
        self.updated_at = Utc::now();
    }

    pub fn merge_attributes(&mut self, attributes: Attributes) {
        self.attributes.merge(attributes);
        self.updated_at = Utc::now();
    }
}

/// State manager for reading/writing stack state files
#[derive(Debug, Clone)]
pub struct StateManager {
    /// Project root directory
    project_root: PathBuf,
}

impl StateManager {
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            project_root: project_root.as_ref().to_path_buf(),
        }
    }

    /// Get the state directory of a stack
    pub fn stack_dir(&self, stack: &str) -> PathBuf {
        self.project_root.join(STATE_DIR).join(stack)
    }

    /// Get the state file path
    pub fn state_path(&self, stack: &str) -> PathBuf {
        self.stack_dir(stack).join(STATE_FILE)
    }

    async fn ensure_stack_dir(&self, stack: &str) -> Result<PathBuf> {
        let dir = self.stack_dir(stack);
        fs::create_dir_all(&dir).await?;
        Ok(dir)
    }

    /// Load the current state; a missing file is an empty state
    pub async fn load(&self, stack: &str) -> Result<StackState> {
        let path = self.state_path(stack);
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(stack, "No state yet");
                return Ok(StackState::new(stack));
            }
            Err(e) => return Err(e.into()),
        };
        let state: StackState = serde_json::from_str(&content)?;

        if state.version > STATE_VERSION {
            return Err(CloudError::StateError(format!(
                "{} has version {}, this build reads up to {}",
                path.display(),
                state.version,
                STATE_VERSION
            )));
        }
        if state.stack != stack {
            return Err(CloudError::StateError(format!(
                "{} belongs to stack '{}', not '{}'",
                path.display(),
                state.stack,
                stack
            )));
        }

        tracing::debug!(stack, attributes = state.attributes.len(), "Loaded state");
        Ok(state)
    }

    /// Writes the state through a temporary file; the previous state becomes
    /// `state.json.backup`
    pub async fn save(&self, state: &StackState) -> Result<PathBuf> {
        let dir = self.ensure_stack_dir(&state.stack).await?;
        let path = dir.join(STATE_FILE);
        let staging = dir.join(STATE_STAGING);

        fs::write(&staging, serde_json::to_vec_pretty(state)?).await?;
        match fs::rename(&path, dir.join(STATE_BACKUP)).await {
            Ok(()) => tracing::debug!(stack = %state.stack, "Kept previous state as backup"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        fs::rename(&staging, &path).await?;

        tracing::debug!(stack = %state.stack, "Saved state");
        Ok(path)
    }

    /// Takes the stack lock
    ///
    /// The lock file is created with `create_new`, so two processes can never
    /// both hold it. A lock older than [`STALE_LOCK_HOURS`] is taken over once.
    pub async fn acquire_lock(&self, stack: &str) -> Result<StateLock> {
        let lock_path = self.ensure_stack_dir(stack).await?.join(LOCK_FILE);
        let holder = LockInfo::current();

        let mut took_over = false;
        loop {
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&lock_path)
                .await
            {
                Ok(mut file) => {
                    file.write_all(&serde_json::to_vec_pretty(&holder)?).await?;
                    file.flush().await?;
                    tracing::debug!(stack, holder = %holder.holder, "Acquired state lock");
                    return Ok(StateLock {
                        path: Some(lock_path),
                    });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    // A lock file still being written reads as unparseable and counts as held
                    let existing = fs::read_to_string(&lock_path)
                        .await
                        .ok()
                        .and_then(|content| serde_json::from_str::<LockInfo>(&content).ok());
                    match existing {
                        Some(info) if info.is_stale() && !took_over => {
                            tracing::warn!(stack, holder = %info.holder, "Taking over stale lock");
                            match fs::remove_file(&lock_path).await {
                                Ok(()) => {}
                                Err(e) if e.kind() == ErrorKind::NotFound => {}
                                Err(e) => return Err(e.into()),
                            }
                            took_over = true;
                        }
                        Some(info) => {
                            return Err(CloudError::LockError(format!(
                                "stack {} is locked by {} since {}",
                                stack, info.holder, info.acquired_at
                            )));
                        }
                        None => {
                            return Err(CloudError::LockError(format!(
                                "stack {} is locked ({})",
                                stack,
                                lock_path.display()
                            )));
                        }
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct LockInfo {
    holder: String,
    acquired_at: DateTime<Utc>,
}

impl LockInfo {
    fn current() -> Self {
        let host = std::env::var("HOSTNAME")
            .or_else(|_| std::env::var("HOST"))
            .unwrap_or_else(|_| "unknown".to_string());
        Self {
            holder: format!("{}:{}", host, std::process::id()),
            acquired_at: Utc::now(),
        }
    }

    fn is_stale(&self) -> bool {
        Utc::now().signed_duration_since(self.acquired_at) >= Duration::hours(STALE_LOCK_HOURS)
    }
}

/// Held stack lock; the lock file is removed on release or drop
pub struct StateLock {
    path: Option<PathBuf>,
}

impl StateLock {
    pub async fn release(mut self) -> Result<()> {
        if let Some(path) = self.path.take() {
            fs::remove_file(&path).await?;
            tracing::debug!("Released state lock");
        }
        Ok(())
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{ResourceKind, Urn};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_state_save_load() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        let mut state = StackState::new("prod");
        let mut attributes = Attributes::new();
        attributes.set(
            Urn::new(ResourceKind::WebApp, "blog-prod-app"),
            "defaultHostName",
            "blog-prod-app.azurewebsites.net",
        );
        state.merge_attributes(attributes);
        state.set_document(serde_json::json!({"version": 1}));

        let path = manager.save(&state).await.unwrap();
        assert!(path.ends_with(".blogstack/prod/state.json"));

        let loaded = manager.load("prod").await.unwrap();
        assert_eq!(loaded.attributes.len(), 1);
        assert!(loaded.document.is_some());
    }

    #[tokio::test]
    async fn test_empty_state() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        let state = manager.load("dev").await.unwrap();
        assert!(state.attributes.is_empty());
        assert!(state.document.is_none());
    }

    #[tokio::test]
    async fn test_second_save_keeps_backup() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        manager.save(&StackState::new("dev")).await.unwrap();
        manager.save(&StackState::new("dev")).await.unwrap();

        assert!(manager.stack_dir("dev").join(STATE_BACKUP).exists());
    }

    #[tokio::test]
    async fn test_lock_is_exclusive() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        let lock = manager.acquire_lock("prod").await.unwrap();
        assert!(matches!(
            manager.acquire_lock("prod").await,
            Err(CloudError::LockError(_))
        ));
        // other stacks are unaffected
        let other = manager.acquire_lock("dev").await.unwrap();

        lock.release().await.unwrap();
        other.release().await.unwrap();
        assert!(manager.acquire_lock("prod").await.is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_lock_has_one_winner() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let manager = manager.clone();
                tokio::spawn(async move { manager.acquire_lock("prod").await })
            })
            .collect();

        let mut locks = Vec::new();
        for task in tasks {
            if let Ok(lock) = task.await.unwrap() {
                locks.push(lock);
            }
        }
        assert_eq!(locks.len(), 1);
    }

    #[tokio::test]
    async fn test_stale_lock_is_taken_over() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());
        let lock_path = manager.stack_dir("prod").join(LOCK_FILE);

        std::fs::create_dir_all(manager.stack_dir("prod")).unwrap();
        let stale = LockInfo {
            holder: "ci-runner:42".to_string(),
            acquired_at: Utc::now() - Duration::hours(STALE_LOCK_HOURS + 1),
        };
        std::fs::write(&lock_path, serde_json::to_string(&stale).unwrap()).unwrap();

        let lock = manager.acquire_lock("prod").await.unwrap();
        let info: LockInfo =
            serde_json::from_str(&std::fs::read_to_string(&lock_path).unwrap()).unwrap();
        assert_ne!(info.holder, "ci-runner:42");

        drop(lock);
        assert!(!lock_path.exists());
    }

    #[tokio::test]
    async fn test_unreadable_lock_counts_as_held() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        std::fs::create_dir_all(manager.stack_dir("dev")).unwrap();
        std::fs::write(manager.stack_dir("dev").join(LOCK_FILE), "").unwrap();

        assert!(matches!(
            manager.acquire_lock("dev").await,
            Err(CloudError::LockError(_))
        ));
    }
}
