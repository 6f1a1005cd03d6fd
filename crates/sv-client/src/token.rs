//! Bearer-token storage.
//!
//! The identity provider hands the UI a bearer token that must ride on
//! every request and be dropped on a 401. The token is wrapped so its
//! memory is zeroized on drop and never leaks through `Debug` output.

use std::fmt;
use std::sync::{Arc, RwLock};

use zeroize::Zeroizing;

/// A bearer token whose backing memory is zeroized on drop.
#[derive(Clone)]
pub struct BearerToken(Zeroizing<String>);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Zeroizing::new(token.into()))
    }

    /// Exposes the raw token. Avoid copying the returned value; copies
    /// are not zeroized.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// The `Authorization` header value for this token.
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.0.as_str())
    }
}

impl From<&str> for BearerToken {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken([REDACTED])")
    }
}

impl fmt::Display for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Shared slot holding the current bearer token, if any.
///
/// Cloning shares the slot: an `invalidate()` through one handle is
/// visible to every other handle, which is what the 401 flow relies on.
#[derive(Clone, Default)]
pub struct TokenStore {
    inner: Arc<RwLock<Option<BearerToken>>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding a token.
    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store.set(BearerToken::new(token));
        store
    }

    pub fn set(&self, token: BearerToken) {
        *write_lock(&self.inner) = Some(token);
    }

    /// Clears the held token; called exactly once per 401 error.
    pub fn invalidate(&self) {
        *write_lock(&self.inner) = None;
    }

    pub fn is_set(&self) -> bool {
        read_lock(&self.inner).is_some()
    }

    /// The `Authorization` header value, when a token is held.
    pub fn header_value(&self) -> Option<String> {
        read_lock(&self.inner).as_ref().map(BearerToken::header_value)
    }
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore")
            .field("set", &self.is_set())
            .finish()
    }
}

// A poisoned lock only means another thread panicked mid-write; the slot
// itself is still a plain Option and safe to use.
fn read_lock(
    lock: &RwLock<Option<BearerToken>>,
) -> std::sync::RwLockReadGuard<'_, Option<BearerToken>> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_lock(
    lock: &RwLock<Option<BearerToken>>,
) -> std::sync::RwLockWriteGuard<'_, Option<BearerToken>> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_value() {
        let store = TokenStore::with_token("abc123");
        assert_eq!(store.header_value().unwrap(), "Bearer abc123");
    }

    #[test]
    fn test_invalidate_clears_shared_slot() {
        let store = TokenStore::with_token("abc123");
        let clone = store.clone();
        clone.invalidate();
        assert!(!store.is_set());
        assert_eq!(store.header_value(), None);
    }

    #[test]
    fn test_debug_is_redacted() {
        let token = BearerToken::new("super-secret");
        assert!(!format!("{token:?}").contains("super-secret"));
        assert!(!format!("{token}").contains("super-secret"));

        let store = TokenStore::with_token("super-secret");
        assert!(!format!("{store:?}").contains("super-secret"));
    }
}
