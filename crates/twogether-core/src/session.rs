use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub user_id: String,

    #[serde(default)]
    pub nickname: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PartnerInfo {
    #[serde(default)]
    pub partner_id: Option<String>,

    #[serde(default)]
    pub nickname: Option<String>,

    /// Short code used to link the two accounts.
    #[serde(default)]
    pub link_code: Option<String>,
}

/// Everything that used to live in the persisted auth store. Callers pass it
/// to whatever needs credentials instead of reading it from a global.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default)]
    pub user: Option<SessionUser>,

    #[serde(default)]
    pub partner: Option<PartnerInfo>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.access_token
            .as_deref()
            .is_some_and(|token| !token.trim().is_empty())
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty, signed-out session.
    #[tracing::instrument(skip(self), fields(file = %self.path.display()))]
    pub fn load(&self) -> anyhow::Result<Session> {
        if !self.path.exists() {
            debug!("no session file; starting signed out");
            return Ok(Session::default());
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        if raw.trim().is_empty() {
            return Ok(Session::default());
        }

        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse session {}", self.path.display()))
    }

    #[tracing::instrument(skip(self, session), fields(file = %self.path.display()))]
    pub fn save(&self, session: &Session) -> anyhow::Result<()> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

        let mut temp = NamedTempFile::new_in(dir)?;
        let serialized = serde_json::to_string_pretty(session)?;
        writeln!(temp, "{serialized}")?;
        temp.flush()?;
        temp.persist(&self.path)
            .map_err(|err| anyhow!("failed to persist {}: {}", self.path.display(), err))?;

        info!(authenticated = session.is_authenticated(), "saved session");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(file = %self.path.display()))]
    pub fn clear(&self) -> anyhow::Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("failed to remove {}", self.path.display()))?;
            info!("cleared session");
        }
        Ok(())
    }
}
