//! Session storage (encrypted file-based token store)
//!
//! The bearer token and the username of the logged-in admin live in
//! ~/.config/planet-admin/session.enc, sealed with AES-256-GCM. A
//! [`TokenStore`] is an explicit object handed to the API client rather than
//! a process-wide global, so tests can run against an in-memory store.

mod vault;

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use crate::paths;

/// Settings key for the bearer token
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Settings key for the logged-in username
pub const USERNAME_KEY: &str = "username";

/// Snapshot of the current login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Opaque bearer token sent in the `token` header
    pub token: String,
    /// Username used to log in
    pub username: String,
}

enum Backend {
    Memory,
    File(PathBuf),
}

/// The one authoritative session value
///
/// Reads are served from memory; every write is persisted synchronously
/// before returning. Storage failures are logged and not surfaced.
pub struct TokenStore {
    backend: Backend,
    values: RwLock<HashMap<String, String>>,
}

impl TokenStore {
    /// Open the store at the default location
    pub fn open() -> Result<Self> {
        let path = paths::session_path()?;
        Self::open_path(&path)
    }

    /// Open or create the store at a specific path
    ///
    /// A file that fails to decrypt (for example one copied from another
    /// machine) is treated as an empty session.
    pub fn open_path(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create session directory")?;
        }

        let values = if path.exists() {
            let sealed = fs::read(path).context("Failed to read session file")?;
            match decode(&sealed) {
                Ok(values) => values,
                Err(e) => {
                    tracing::warn!("Discarding unreadable session file: {e:#}");
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        Ok(Self {
            backend: Backend::File(path.to_path_buf()),
            values: RwLock::new(values),
        })
    }

    /// Create a store that never touches the disk
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory,
            values: RwLock::new(HashMap::new()),
        }
    }

    /// Store the bearer token
    pub fn save_token(&self, token: &str) {
        self.put(ACCESS_TOKEN_KEY, token);
    }

    /// Get the stored bearer token, if any
    pub fn token(&self) -> Option<String> {
        self.get(ACCESS_TOKEN_KEY)
    }

    /// Store the username of the logged-in admin
    pub fn save_username(&self, username: &str) {
        self.put(USERNAME_KEY, username);
    }

    /// Get the stored username, if any
    pub fn username(&self) -> Option<String> {
        self.get(USERNAME_KEY)
    }

    /// Remove both token and username
    pub fn clear(&self) {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.remove(ACCESS_TOKEN_KEY);
        values.remove(USERNAME_KEY);
        self.persist(&values);
    }

    /// True iff a non-blank token is stored
    pub fn is_logged_in(&self) -> bool {
        self.token().is_some_and(|t| !t.trim().is_empty())
    }

    /// Current session, when both token and username are present
    pub fn session(&self) -> Option<Session> {
        let token = self.token().filter(|t| !t.trim().is_empty())?;
        Some(Session {
            token,
            username: self.username().unwrap_or_default(),
        })
    }

    fn get(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn put(&self, key: &str, value: &str) {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        self.persist(&values);
    }

    fn persist(&self, values: &HashMap<String, String>) {
        let Backend::File(path) = &self.backend else {
            return;
        };
        if let Err(e) = write_file(path, values) {
            tracing::warn!("Failed to persist session: {e:#}");
        }
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the token itself
        f.debug_struct("TokenStore")
            .field("logged_in", &self.is_logged_in())
            .field("username", &self.username())
            .finish()
    }
}

fn decode(sealed: &[u8]) -> Result<HashMap<String, String>> {
    let plaintext = vault::open(sealed)?;
    let json = String::from_utf8(plaintext).context("Invalid UTF-8 in session")?;
    serde_json::from_str(&json).context("Invalid session contents")
}

fn write_file(path: &Path, values: &HashMap<String, String>) -> Result<()> {
    let json = serde_json::to_string(values)?;
    let sealed = vault::seal(json.as_bytes())?;
    fs::write(path, sealed).context("Failed to write session file")?;

    // Set restrictive permissions on Unix
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(path, perms)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_logged_in_follows_token() {
        let store = TokenStore::in_memory();
        assert!(!store.is_logged_in());

        store.save_token("abc");
        assert!(store.is_logged_in());
        assert_eq!(store.token().as_deref(), Some("abc"));

        store.save_token("   ");
        assert!(!store.is_logged_in());
        assert!(store.session().is_none());
    }

    #[test]
    fn test_clear_removes_token_and_username() {
        let store = TokenStore::in_memory();
        store.save_token("abc");
        store.save_username("admin");
        assert_eq!(
            store.session(),
            Some(Session {
                token: "abc".to_string(),
                username: "admin".to_string()
            })
        );

        store.clear();
        assert!(store.token().is_none());
        assert!(store.username().is_none());
        assert!(!store.is_logged_in());
    }

    #[test]
    fn test_session_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.enc");

        let store = TokenStore::open_path(&path).unwrap();
        store.save_token("tok-1");
        store.save_username("moderator");
        drop(store);

        let raw = std::fs::read(&path).unwrap();
        assert!(!String::from_utf8_lossy(&raw).contains("tok-1"));

        let reopened = TokenStore::open_path(&path).unwrap();
        assert_eq!(reopened.token().as_deref(), Some("tok-1"));
        assert_eq!(reopened.username().as_deref(), Some("moderator"));

        reopened.clear();
        let cleared = TokenStore::open_path(&path).unwrap();
        assert!(!cleared.is_logged_in());
    }

    #[test]
    fn test_corrupt_file_opens_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.enc");
        std::fs::write(&path, b"not a sealed payload at all").unwrap();

        let store = TokenStore::open_path(&path).unwrap();
        assert!(!store.is_logged_in());
    }

    #[test]
    fn test_debug_hides_token() {
        let store = TokenStore::in_memory();
        store.save_token("very-secret");
        assert!(!format!("{store:?}").contains("very-secret"));
    }
}
