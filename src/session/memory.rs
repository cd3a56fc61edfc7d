use std::sync::Mutex;

use chrono::Utc;

use super::{SessionState, SessionStore, StoreError};

/// Process-local store; state is lost when the process exits.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    state: Mutex<SessionState>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: SessionState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<SessionState, StoreError> {
        let state = self.state.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(state.clone())
    }

    fn update(&self, apply: &mut dyn FnMut(&mut SessionState)) -> Result<(), StoreError> {
        let mut state = self.state.lock().map_err(|_| StoreError::Poisoned)?;
        apply(&mut state);
        state.updated_at = Some(Utc::now());
        Ok(())
    }
}
