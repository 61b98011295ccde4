// SPDX-License-Identifier: AGPL-3.0
// Rentboard Core - Search criteria store
//
// Holds the active filter and whether a search ran, persisted as one JSON blob.

use crate::storage::SessionStorage;
use crate::types::{AppError, SearchCriteria, SessionState};
use std::sync::{Arc, PoisonError, RwLock};

/// Storage key of the persisted session
pub const SESSION_KEY: &str = "searchState";

/// Owner of the session's [`SessionState`]
pub struct CriteriaStore {
    state: RwLock<SessionState>,
    storage: Arc<dyn SessionStorage>,
}

impl CriteriaStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            state: RwLock::new(SessionState::default()),
            storage,
        }
    }

    /// Current session state
    pub fn current(&self) -> SessionState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the criteria, mark the session as searched and persist it.
    ///
    /// The write completes before this returns. On a write failure the new
    /// criteria are still active in memory.
    pub fn set_criteria(&self, criteria: SearchCriteria) -> Result<(), AppError> {
        let snapshot = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            state.criteria = criteria.normalized();
            state.is_searched = true;
            state.clone()
        };

        let content = serde_json::to_string(&snapshot)
            .map_err(|e| AppError::Serialization(format!("Failed to serialize session: {}", e)))?;
        self.storage.set(SESSION_KEY, &content)?;

        tracing::debug!("Persisted search criteria: {:?}", snapshot.criteria);
        Ok(())
    }

    /// Read the persisted session. Absent or malformed state yields `None`.
    ///
    /// A successfully read session also becomes the current one.
    pub fn load_persisted(&self) -> Option<SessionState> {
        let content = match self.storage.get(SESSION_KEY) {
            Ok(Some(content)) => content,
            Ok(None) => {
                tracing::info!("No persisted session found");
                return None;
            }
            Err(e) => {
                tracing::warn!("{}", e);
                return None;
            }
        };

        match serde_json::from_str::<SessionState>(&content) {
            Ok(mut session) => {
                session.criteria = session.criteria.normalized();
                *self.state.write().unwrap_or_else(PoisonError::into_inner) = session.clone();
                tracing::info!(
                    "Loaded persisted session, searched: {}",
                    session.is_searched
                );
                Some(session)
            }
            Err(e) => {
                tracing::warn!(
                    "{}",
                    AppError::PersistenceRead(format!("Ignoring malformed session: {}", e))
                );
                None
            }
        }
    }
}
