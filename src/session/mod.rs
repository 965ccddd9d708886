//! Session State
//!
//! Owns the bearer token and the user's persisted preferences.
//!
//! ## Lifecycle
//!
//! 1. `Session::restore` reads a previously stored token into memory
//! 2. login/register set it (memory + store)
//! 3. every request reads it
//! 4. logout or a 401 response clears it (memory + store)

mod preferences;
mod store;

pub use preferences::{Preferences, PreferencesError};
pub use store::{
    FileStore, KeyValueStore, MemoryStore, StoreError, StoreResult, SELECTED_PRESET_KEY,
    TEMPERATURE_KEY, TOKEN_KEY,
};

use std::sync::{Arc, RwLock};

/// Bearer token held in memory and mirrored to a persisted store
pub struct Session {
    store: Arc<dyn KeyValueStore>,
    token: RwLock<Option<String>>,
}

impl Session {
    /// Rehydrate the session from `store`
    pub fn restore(store: Arc<dyn KeyValueStore>) -> StoreResult<Self> {
        let token = store.get(TOKEN_KEY)?.filter(|t| !t.is_empty());
        if token.is_some() {
            tracing::debug!("Restored persisted session token");
        }

        Ok(Self {
            store,
            token: RwLock::new(token),
        })
    }

    /// Session backed by an in-memory store
    pub fn ephemeral() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            token: RwLock::new(None),
        }
    }

    /// Current token, if logged in
    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Store a freshly issued token
    pub fn set_token(&self, token: &str) -> StoreResult<()> {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = Some(token.to_string());
        self.store.set(TOKEN_KEY, token)
    }

    /// Forget the token. Memory is cleared even when the store write fails.
    pub fn clear(&self) -> StoreResult<()> {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = None;
        self.store.remove(TOKEN_KEY)
    }

    /// The backing store, shared with [`Preferences`]
    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.store)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restore_reads_persisted_token() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        store.set(TOKEN_KEY, "persisted").unwrap();

        let session = Session::restore(Arc::clone(&store)).unwrap();
        assert_eq!(session.token().as_deref(), Some("persisted"));
    }

    #[test]
    fn test_empty_persisted_token_is_ignored() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        store.set(TOKEN_KEY, "").unwrap();

        let session = Session::restore(store).unwrap();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_set_and_clear_mirror_to_store() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let session = Session::restore(Arc::clone(&store)).unwrap();

        session.set_token("fresh").unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("fresh"));

        session.clear().unwrap();
        assert!(session.token().is_none());
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_debug_hides_token() {
        let session = Session::ephemeral();
        session.set_token("do-not-print").unwrap();
        assert!(!format!("{:?}", session).contains("do-not-print"));
    }
}
