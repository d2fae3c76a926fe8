use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::{Error, Result};

/// Default API host.
pub const DEFAULT_BASE_URL: &str = "https://api.awhere.com";

/// Endpoint configuration for a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn token_url(&self) -> String {
        format!("{}/oauth/token", self.base_url.trim_end_matches('/'))
    }

    pub fn weather_url(&self) -> String {
        format!("{}/v1/weather", self.base_url.trim_end_matches('/'))
    }
}

/// API key pair used for the client-credentials grant.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"***")
            .finish()
    }
}

impl Credentials {
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
        }
    }

    /// Use `key` and `secret` verbatim when both are given and non-empty,
    /// otherwise fall back to the default credentials file.
    pub fn obtain(key: Option<&str>, secret: Option<&str>) -> Result<Self> {
        match (key, secret) {
            (Some(key), Some(secret)) if !key.is_empty() && !secret.is_empty() => {
                Ok(Self::new(key, secret))
            }
            _ => Self::load(),
        }
    }

    /// Read credentials from the default credentials file.
    pub fn load() -> Result<Self> {
        let path = CredentialsFile::config_file_path()?;
        Self::from_file(&path)
    }

    /// Read credentials from a TOML file with a `[Weather]` table.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        CredentialsFile::read(path)?.credentials(path)
    }
}

/// Credentials file stored on disk.
///
/// Example TOML:
/// ```toml
/// [Weather]
/// consumer_key = "..."
/// consumer_secret = "..."
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialsFile {
    #[serde(rename = "Weather", default)]
    pub weather: KeySection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeySection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumer_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumer_secret: Option<String>,
}

impl CredentialsFile {
    pub fn read(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| Error::TomlParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the file, creating parent directories as needed.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| Error::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let toml = toml::to_string_pretty(self)?;

        fs::write(path, toml).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save to the default location and return the path written.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.write(&path)?;
        Ok(path)
    }

    /// Path to the default credentials file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "awhere", "awhere").ok_or(Error::ConfigDir)?;

        Ok(dirs.config_dir().join("keys.toml"))
    }

    /// `path` is only used to label a missing-field error.
    pub fn credentials(&self, path: &Path) -> Result<Credentials> {
        let missing = |field| Error::MissingCredential {
            field,
            path: path.to_path_buf(),
        };

        let key = self.weather.consumer_key.as_ref().ok_or_else(|| missing("consumer_key"))?;
        let secret = self
            .weather
            .consumer_secret
            .as_ref()
            .ok_or_else(|| missing("consumer_secret"))?;

        Ok(Credentials::new(key.as_str(), secret.as_str()))
    }
}

impl From<&Credentials> for CredentialsFile {
    fn from(credentials: &Credentials) -> Self {
        Self {
            weather: KeySection {
                consumer_key: Some(credentials.consumer_key.clone()),
                consumer_secret: Some(credentials.consumer_secret.clone()),
            },
        }
    }
}
