use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::models::principal::{Principal, Role};
use crate::utils::{time, token};

pub const TOKEN_COOKIE: &str = "token";
pub const TOKEN_MAX_AGE_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    pub path: String,
    pub expires_at: DateTime<Utc>,
}

impl StoredCookie {
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Persistence seam for the session cookie.
#[cfg_attr(test, mockall::automock)]
pub trait CookieJar: Send + Sync {
    fn get(&self, name: &str) -> Option<StoredCookie>;
    fn set(&self, cookie: StoredCookie);
    fn remove(&self, name: &str);
}

#[derive(Debug, Default)]
pub struct MemoryCookieJar {
    cookies: Mutex<HashMap<String, StoredCookie>>,
}

impl CookieJar for MemoryCookieJar {
    fn get(&self, name: &str) -> Option<StoredCookie> {
        let guard = self.cookies.lock().unwrap_or_else(|e| e.into_inner());
        guard.get(name).cloned()
    }

    fn set(&self, cookie: StoredCookie) {
        let mut guard = self.cookies.lock().unwrap_or_else(|e| e.into_inner());
        guard.insert(cookie.name.clone(), cookie);
    }

    fn remove(&self, name: &str) {
        let mut guard = self.cookies.lock().unwrap_or_else(|e| e.into_inner());
        guard.remove(name);
    }
}

/// Cookie file shared by every process using the same data dir.
/// Every read goes to disk, so a login in one process is seen by the next
/// read in another.
#[derive(Debug, Clone)]
pub struct FileCookieJar {
    path: PathBuf,
}

impl FileCookieJar {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> HashMap<String, StoredCookie> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, path = %self.path.display(), "Ignoring unreadable cookie file");
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        }
    }

    fn store(&self, cookies: &HashMap<String, StoredCookie>) {
        let write = || -> std::io::Result<()> {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            let raw = serde_json::to_string_pretty(cookies)?;
            fs::write(&self.path, raw)
        };
        if let Err(e) = write() {
            error!(error = %e, path = %self.path.display(), "Failed to persist cookie file");
        }
    }
}

impl CookieJar for FileCookieJar {
    fn get(&self, name: &str) -> Option<StoredCookie> {
        self.load().remove(name)
    }

    fn set(&self, cookie: StoredCookie) {
        let mut cookies = self.load();
        cookies.insert(cookie.name.clone(), cookie);
        self.store(&cookies);
    }

    fn remove(&self, name: &str) {
        let mut cookies = self.load();
        if cookies.remove(name).is_some() {
            self.store(&cookies);
        }
    }
}

/// Jar for contexts with no client-side storage (e.g. server rendering).
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedCookieJar;

impl CookieJar for DetachedCookieJar {
    fn get(&self, _name: &str) -> Option<StoredCookie> {
        None
    }

    fn set(&self, _cookie: StoredCookie) {}

    fn remove(&self, _name: &str) {}
}

/// Single source of truth for who is signed in.
#[derive(Clone)]
pub struct SessionStore {
    jar: Arc<dyn CookieJar>,
}

impl SessionStore {
    pub fn new(jar: Arc<dyn CookieJar>) -> Self {
        Self { jar }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCookieJar::default()))
    }

    pub fn detached() -> Self {
        Self::new(Arc::new(DetachedCookieJar))
    }

    pub fn set_token(&self, token: &str) {
        self.jar.set(StoredCookie {
            name: TOKEN_COOKIE.to_string(),
            value: token.to_string(),
            path: "/".to_string(),
            expires_at: time::days_from_now(TOKEN_MAX_AGE_DAYS),
        });
        info!("Session token stored");
    }

    pub fn get_token(&self) -> Option<String> {
        let cookie = self.jar.get(TOKEN_COOKIE)?;
        if !cookie.is_live(time::now()) {
            self.jar.remove(TOKEN_COOKIE);
            return None;
        }
        Some(cookie.value).filter(|v| !v.is_empty())
    }

    pub fn clear_token(&self) {
        self.jar.remove(TOKEN_COOKIE);
        info!("Session token cleared");
    }

    pub fn claims(&self) -> Option<token::Claims> {
        self.get_token().and_then(|t| token::try_decode(&t))
    }

    pub fn principal(&self) -> Option<Principal> {
        self.claims().map(|c| c.principal())
    }

    pub fn subject_id(&self) -> Option<String> {
        self.claims().map(|c| c.sub)
    }

    pub fn role(&self) -> Option<Role> {
        self.claims().map(|c| c.role)
    }

    /// No token, an undecodable token and a past `exp` all read as expired.
    pub fn is_expired(&self) -> bool {
        match self.get_token() {
            Some(t) => token::is_expired(&t, time::now()),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::token::test_tokens::issue;
    use chrono::Duration;
    use mockall::predicate::eq;

    #[test]
    fn set_token_writes_site_wide_cookie_for_seven_days() {
        let mut jar = MockCookieJar::new();
        jar.expect_set()
            .withf(|cookie| {
                let ttl = cookie.expires_at - Utc::now();
                cookie.name == "token"
                    && cookie.value == "abc"
                    && cookie.path == "/"
                    && ttl > Duration::days(7) - Duration::minutes(1)
                    && ttl <= Duration::days(7)
            })
            .times(1)
            .return_const(());
        SessionStore::new(Arc::new(jar)).set_token("abc");
    }

    #[test]
    fn lapsed_cookie_is_removed_on_read() {
        let mut jar = MockCookieJar::new();
        jar.expect_get().with(eq("token")).returning(|_| {
            Some(StoredCookie {
                name: "token".into(),
                value: "stale".into(),
                path: "/".into(),
                expires_at: Utc::now() - Duration::seconds(1),
            })
        });
        jar.expect_remove().with(eq("token")).times(1).return_const(());
        assert_eq!(SessionStore::new(Arc::new(jar)).get_token(), None);
    }

    #[test]
    fn derives_principal_from_stored_token() {
        let session = SessionStore::in_memory();
        assert!(session.is_expired());
        session.set_token(&issue("12", "company", Duration::hours(2)));
        assert_eq!(session.subject_id().as_deref(), Some("12"));
        assert_eq!(session.role(), Some(Role::Company));
        assert!(!session.is_expired());
        session.clear_token();
        assert_eq!(session.get_token(), None);
        assert_eq!(session.principal(), None);
    }

    #[test]
    fn detached_store_never_has_a_token() {
        let session = SessionStore::detached();
        session.set_token("abc");
        assert_eq!(session.get_token(), None);
    }

    #[test]
    fn file_jar_is_read_fresh_by_another_instance() {
        let dir = std::env::temp_dir().join(format!("jobboard-jar-{}", std::process::id()));
        let path = dir.join("cookies.json");
        let writer = SessionStore::new(Arc::new(FileCookieJar::new(&path)));
        let reader = SessionStore::new(Arc::new(FileCookieJar::new(&path)));

        writer.set_token("shared");
        assert_eq!(reader.get_token().as_deref(), Some("shared"));
        reader.clear_token();
        assert_eq!(writer.get_token(), None);

        let _ = fs::remove_dir_all(dir);
    }
}
