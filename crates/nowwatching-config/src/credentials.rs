use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// OAuth tokens of the Trakt account being watched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraktTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CredentialsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    trakt: Option<TraktTokens>,
}

/// `credentials.toml`, kept apart from `config.toml` so the config can be
/// shared without leaking tokens.
pub struct CredentialStore {
    path: PathBuf,
    contents: CredentialsFile,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            contents: CredentialsFile::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file. A missing file leaves the store empty.
    pub fn load(&mut self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        let content = std::fs::read_to_string(&self.path)?;
        self.contents = toml::from_str(&content)?;
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, toml::to_string_pretty(&self.contents)?)?;
        Ok(())
    }

    pub fn trakt_tokens(&self) -> Option<&TraktTokens> {
        self.contents.trakt.as_ref()
    }

    pub fn set_trakt_tokens(&mut self, tokens: TraktTokens) {
        self.contents.trakt = Some(tokens);
    }

    /// Forget the Trakt tokens. Returns whether any were stored.
    pub fn clear_trakt_tokens(&mut self) -> bool {
        self.contents.trakt.take().is_some()
    }
}
