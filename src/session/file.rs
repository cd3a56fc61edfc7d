use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;

use super::{SessionState, SessionStore, StoreError};

const SESSION_FILE: &str = "session.json";

/// Resolve the directory holding persisted console state.
///
/// `configured` wins, then `$HOME/.config/chargeops`. The directory is created
/// if missing.
pub fn get_config_dir(configured: Option<&Path>) -> anyhow::Result<PathBuf> {
    let config_dir = match configured {
        Some(dir) => dir.to_path_buf(),
        None => {
            let home = std::env::var("HOME")
                .map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
            PathBuf::from(home).join(".config").join("chargeops")
        }
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

/// JSON file backed store, persisted across runs like browser local storage.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Store at `session.json` inside `config_dir`
    pub fn in_dir(config_dir: &Path) -> Self {
        Self::new(config_dir.join(SESSION_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_state(&self) -> Result<SessionState, StoreError> {
        if !self.path.exists() {
            return Ok(SessionState::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(SessionState::default());
        }

        Ok(serde_json::from_str(&content)?)
    }

    fn write_state(&self, state: &SessionState) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(state)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<SessionState, StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        self.read_state()
    }

    fn update(&self, apply: &mut dyn FnMut(&mut SessionState)) -> Result<(), StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        let mut state = self.read_state()?;
        apply(&mut state);
        state.updated_at = Some(Utc::now());
        self.write_state(&state)
    }
}
