use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

/// Errors produced by the aWhere client.
#[derive(Debug, Error)]
pub enum Error {
    /// The credentials file lacks `consumer_key` or `consumer_secret`.
    #[error("API key '{field}' not found in configuration file: {}", path.display())]
    MissingCredential { field: &'static str, path: PathBuf },

    /// The token endpoint answered without `access_token`/`expires_in`.
    /// Carries the raw response body.
    #[error("unexpected token response: {0}")]
    TokenExchangeFailed(String),

    #[error("\"{0}\" is not a valid optional parameter")]
    InvalidParameterName(String),

    #[error("attribute parameter must be passed as a list, got {0}")]
    InvalidAttributeType(Value),

    #[error("\"{0}\" is not a valid requestable weather attribute")]
    InvalidAttributeValue(String),

    #[error("invalid value for parameter \"{name}\": {value}")]
    InvalidParameterValue { name: &'static str, value: Value },

    /// The weather endpoint returned a non-200 status. `body` is the parsed
    /// JSON error body, or the raw text as a JSON string if it was not JSON.
    #[error("API request failed with status {status}: {body}")]
    ApiRequestFailed { status: u16, body: Value },

    #[error("response data is not properly formatted: {0}")]
    MalformedRecord(String),

    #[error("client is not authorized; call authorize() first")]
    NotAuthorized,

    #[error("HTTP transport error")]
    Http(#[from] reqwest::Error),

    #[error("Could not determine platform config directory")]
    ConfigDir,

    #[error("Failed to access credentials file '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse credentials file '{}'", path.display())]
    TomlParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize credentials to TOML")]
    TomlSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
