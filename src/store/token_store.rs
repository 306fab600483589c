//! The session's credentials: access token, refresh token and cached profile.
//!
//! A single `TokenStore` is shared (behind an `Arc`) by the HTTP client and the
//! navigator. Every mutation updates memory first and then writes through to
//! durable storage; storage failures are logged and otherwise ignored.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info, warn};

use super::KeyValueStorage;
use crate::models::{CredentialSet, UserProfile};

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const USER_KEY: &str = "user";

pub struct TokenStore {
    storage: Arc<dyn KeyValueStorage>,
    state: RwLock<CredentialSet>,
}

impl TokenStore {
    /// Builds the store from whatever a previous run left in `storage`.
    pub fn load(storage: Arc<dyn KeyValueStorage>) -> Self {
        let access_token = read_token(storage.as_ref(), ACCESS_TOKEN_KEY);
        let refresh_token = read_token(storage.as_ref(), REFRESH_TOKEN_KEY);
        let user = read_token(storage.as_ref(), USER_KEY).and_then(|raw| {
            match serde_json::from_str::<Option<UserProfile>>(&raw) {
                Ok(user) => user,
                Err(e) => {
                    warn!("Ignoring cached profile that does not decode: {}", e);
                    None
                }
            }
        });

        debug!(
            storage = storage.get_name(),
            has_access_token = access_token.is_some(),
            has_refresh_token = refresh_token.is_some(),
            has_user = user.is_some(),
            "Loaded session from storage"
        );

        TokenStore {
            storage,
            state: RwLock::new(CredentialSet {
                access_token,
                refresh_token,
                user,
            }),
        }
    }

    pub fn set_tokens(&self, access: &str, refresh: &str) {
        {
            let mut state = self.write();
            state.access_token = Some(access.to_string());
            state.refresh_token = Some(refresh.to_string());
        }
        self.persist(ACCESS_TOKEN_KEY, access);
        self.persist(REFRESH_TOKEN_KEY, refresh);
    }

    /// Replaces the access token only; the refresh token is left alone.
    pub fn update_access_token(&self, access: &str) {
        self.write().access_token = Some(access.to_string());
        self.persist(ACCESS_TOKEN_KEY, access);
    }

    /// Used when the server rotates refresh tokens.
    pub fn update_refresh_token(&self, refresh: &str) {
        self.write().refresh_token = Some(refresh.to_string());
        self.persist(REFRESH_TOKEN_KEY, refresh);
    }

    pub fn set_user(&self, user: UserProfile) {
        let serialized = serde_json::to_string(&user);
        self.write().user = Some(user);
        match serialized {
            Ok(raw) => self.persist(USER_KEY, &raw),
            Err(e) => warn!("Failed to serialize profile for storage: {}", e),
        }
    }

    /// Drops the cached profile only; tokens are kept.
    pub fn clear_user(&self) {
        self.write().user = None;
        if let Err(e) = self.storage.remove(USER_KEY) {
            warn!("Failed to remove '{}' from {} storage: {}", USER_KEY, self.storage.get_name(), e);
        }
    }

    /// Forgets the whole session, in memory and in storage.
    pub fn clear_tokens(&self) {
        *self.write() = CredentialSet::default();
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key) {
                warn!("Failed to remove '{}' from {} storage: {}", key, self.storage.get_name(), e);
            }
        }
        info!("Session cleared");
    }

    pub fn access_token(&self) -> Option<String> {
        self.read().access_token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read().refresh_token.clone()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.read().user.clone()
    }

    pub fn snapshot(&self) -> CredentialSet {
        self.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated()
    }

    fn persist(&self, key: &str, value: &str) {
        if let Err(e) = self.storage.set(key, value) {
            warn!("Failed to persist '{}' to {} storage: {}", key, self.storage.get_name(), e);
        }
    }

    // Assignments cannot leave the credential set half-written, so a poisoned
    // lock still holds usable data.
    fn read(&self) -> RwLockReadGuard<'_, CredentialSet> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CredentialSet> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn read_token(storage: &dyn KeyValueStorage, key: &str) -> Option<String> {
    match storage.get(key) {
        Ok(value) => value.filter(|v| !v.is_empty()),
        Err(e) => {
            warn!("Failed to read '{}' from {} storage: {}", key, storage.get_name(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn profile() -> UserProfile {
        UserProfile {
            id: Some(1),
            username: "reader".to_string(),
            book_mbti: Some("INFJ".to_string()),
            ..Default::default()
        }
    }

    fn fresh() -> (Arc<MemoryStore>, TokenStore) {
        let storage = Arc::new(MemoryStore::new());
        let store = TokenStore::load(storage.clone());
        (storage, store)
    }

    #[test]
    fn test_empty_storage_is_unauthenticated() {
        let (_, store) = fresh();
        assert!(!store.is_authenticated());
        assert_eq!(store.snapshot(), CredentialSet::default());
    }

    #[test]
    fn test_set_tokens_persists_both() {
        let (storage, store) = fresh();
        store.set_tokens("access-1", "refresh-1");

        assert_eq!(store.access_token().as_deref(), Some("access-1"));
        assert_eq!(store.refresh_token().as_deref(), Some("refresh-1"));
        assert_eq!(storage.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("access-1"));
        assert_eq!(storage.get(REFRESH_TOKEN_KEY).unwrap().as_deref(), Some("refresh-1"));
    }

    #[test]
    fn test_update_access_token_keeps_refresh_token() {
        let (storage, store) = fresh();
        store.set_tokens("access-1", "refresh-1");
        store.update_access_token("access-2");

        assert_eq!(store.access_token().as_deref(), Some("access-2"));
        assert_eq!(store.refresh_token().as_deref(), Some("refresh-1"));
        assert_eq!(storage.get(REFRESH_TOKEN_KEY).unwrap().as_deref(), Some("refresh-1"));
    }

    #[test]
    fn test_clear_tokens_removes_everything() {
        let (storage, store) = fresh();
        store.set_tokens("access-1", "refresh-1");
        store.set_user(profile());

        store.clear_tokens();

        assert_eq!(store.access_token(), None);
        assert_eq!(store.refresh_token(), None);
        assert_eq!(store.user(), None);
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY] {
            assert_eq!(storage.get(key).unwrap(), None, "'{}' should be gone", key);
        }
    }

    #[test]
    fn test_clear_user_keeps_tokens() {
        let (storage, store) = fresh();
        store.set_tokens("access-1", "refresh-1");
        store.set_user(profile());

        store.clear_user();

        assert_eq!(store.user(), None);
        assert_eq!(storage.get(USER_KEY).unwrap(), None);
        assert_eq!(store.access_token().as_deref(), Some("access-1"));
        assert_eq!(store.refresh_token().as_deref(), Some("refresh-1"));
    }

    #[test]
    fn test_reload_restores_previous_session() {
        let (storage, store) = fresh();
        store.set_tokens("access-1", "refresh-1");
        store.set_user(profile());

        let reloaded = TokenStore::load(storage);
        assert_eq!(reloaded.snapshot(), store.snapshot());
    }

    #[test]
    fn test_invalid_cached_profile_reads_as_absent() {
        let storage = Arc::new(MemoryStore::new());
        storage.set(ACCESS_TOKEN_KEY, "access-1").unwrap();
        storage.set(USER_KEY, "{broken").unwrap();

        let store = TokenStore::load(storage);
        assert!(store.is_authenticated());
        assert_eq!(store.user(), None);
    }

    #[test]
    fn test_null_and_empty_values_read_as_absent() {
        let storage = Arc::new(MemoryStore::new());
        storage.set(ACCESS_TOKEN_KEY, "").unwrap();
        storage.set(USER_KEY, "null").unwrap();

        let store = TokenStore::load(storage);
        assert!(!store.is_authenticated());
        assert_eq!(store.user(), None);
    }
}
