//! session.rs — Authenticated user record
//!
//! The logged-in user is kept as JSON under the `userInfo` preference so it
//! survives a restart, like the filter and tab selections.

use std::sync::Arc;

use gift_api::UserSession;
use tracing::{info, warn};

use crate::prefs::Preferences;

pub const USER_INFO: &str = "userInfo";

#[derive(Clone)]
pub struct SessionStore {
    prefs: Arc<dyn Preferences>,
}

impl SessionStore {
    pub fn new(prefs: Arc<dyn Preferences>) -> Self {
        Self { prefs }
    }

    pub fn current(&self) -> Option<UserSession> {
        let raw = self.prefs.read(USER_INFO)?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(error = %e, "stored session is corrupt, ignoring");
                None
            }
        }
    }

    pub fn auth_token(&self) -> Option<String> {
        self.current().map(|s| s.auth_token)
    }

    pub fn is_logged_in(&self) -> bool {
        self.current().is_some()
    }

    pub fn login(&self, session: &UserSession) {
        match serde_json::to_string(session) {
            Ok(raw) => {
                self.prefs.write(USER_INFO, &raw);
                info!(email = %session.email, "session stored");
            }
            Err(e) => warn!(error = %e, "could not encode session"),
        }
    }

    pub fn logout(&self) {
        self.prefs.remove(USER_INFO);
        info!("session cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::MemoryPreferences;

    fn user() -> UserSession {
        UserSession {
            email: "test@kakao.com".into(),
            name: "Test User".into(),
            auth_token: "mock-auth-token".into(),
        }
    }

    #[test]
    fn login_then_logout() {
        let store = SessionStore::new(Arc::new(MemoryPreferences::new()));
        assert!(!store.is_logged_in());

        store.login(&user());
        assert_eq!(store.current(), Some(user()));
        assert_eq!(store.auth_token().as_deref(), Some("mock-auth-token"));

        store.logout();
        assert_eq!(store.current(), None);
    }

    #[test]
    fn corrupt_record_is_absent() {
        let prefs = Arc::new(MemoryPreferences::with_values([(USER_INFO, "not json")]));
        let store = SessionStore::new(prefs);
        assert_eq!(store.current(), None);
    }
}
