//! Locally persisted login. Presence of an unexpired token is all that is
//! checked; the backend remains the authority on whether it is valid.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::get_session_path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub(crate) struct Session {
    pub auth_token: String,
    pub auth_user: String,
    pub auth_expires: DateTime<Utc>,
}

impl Session {
    /// `None` when the expiry would overflow the calendar.
    pub(crate) fn new(token: String, user: String, ttl: Duration) -> Option<Self> {
        let auth_expires = Utc::now().checked_add_signed(ttl)?;
        Some(Self { auth_token: token, auth_user: user, auth_expires })
    }

    pub(crate) fn is_authenticated(&self) -> bool {
        self.is_authenticated_at(Utc::now())
    }

    fn is_authenticated_at(&self, now: DateTime<Utc>) -> bool {
        !self.auth_token.is_empty() && self.auth_expires > now
    }
}

pub(crate) struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub(crate) const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// `None` when there is no session file or it cannot be parsed.
    pub(crate) fn load(&self) -> Result<Option<Session>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", self.path.display()));
            },
        };
        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!("Ignoring unreadable session file {}: {}", self.path.display(), e);
                Ok(None)
            },
        }
    }

    pub(crate) fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(session)?)
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }

    /// Returns whether a session file was removed.
    pub(crate) fn clear(&self) -> Result<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", self.path.display())),
        }
    }
}

pub(crate) fn run_login(token: String, user: String, ttl_hours: i64) -> Result<()> {
    if token.trim().is_empty() {
        anyhow::bail!("Token must not be empty");
    }
    if ttl_hours <= 0 {
        anyhow::bail!("--ttl-hours must be positive");
    }
    let session = Duration::try_hours(ttl_hours)
        .and_then(|ttl| Session::new(token, user, ttl))
        .ok_or_else(|| anyhow::anyhow!("--ttl-hours {ttl_hours} is out of range"))?;
    let store = SessionStore::new(get_session_path());
    store.save(&session)?;
    tracing::info!("Session stored at {}", store.path().display());
    println!("Logged in as {} until {}", session.auth_user, session.auth_expires.to_rfc3339());
    Ok(())
}

pub(crate) fn run_logout() -> Result<()> {
    if SessionStore::new(get_session_path()).clear()? {
        println!("Logged out");
    } else {
        println!("No active session");
    }
    Ok(())
}

pub(crate) fn run_whoami() -> Result<()> {
    match SessionStore::new(get_session_path()).load()? {
        Some(session) if session.is_authenticated() => {
            println!("{} (expires {})", session.auth_user, session.auth_expires.to_rfc3339());
        },
        Some(session) => println!("Session for {} expired at {}", session.auth_user, session.auth_expires.to_rfc3339()),
        None => println!("Not logged in"),
    }
    Ok(())
}
