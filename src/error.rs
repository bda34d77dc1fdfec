//! Unified error model for the session/permission core.
//! One enum covers every failure class the portal client distinguishes, with
//! helper constructors and `From` mappings so call sites stay terse. Several
//! classes (network, malformed persisted identity) are deliberately swallowed
//! by the Session Store; keeping them as named variants keeps that policy
//! testable instead of an anonymous catch.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Error {
    /// No bearer token in the durable store; refresh/reconcile no-op on this.
    NoAuthToken,
    /// Persisted identity exists but does not parse; resolves to Anonymous.
    MalformedPersistedIdentity { message: String },
    /// Transport-level failure talking to the backend.
    Network { message: String },
    /// Backend answered but reported `success: false`.
    ServerRejection { message: String },
    /// Account type with no permission catalog; a caller contract violation.
    UnknownAccountType { account_type: String },
    /// Durable local storage read/write failure.
    Storage { message: String },
}

impl Error {
    pub fn malformed_identity<S: Into<String>>(msg: S) -> Self {
        Error::MalformedPersistedIdentity { message: msg.into() }
    }
    pub fn network<S: Into<String>>(msg: S) -> Self { Error::Network { message: msg.into() } }
    pub fn rejected<S: Into<String>>(msg: S) -> Self { Error::ServerRejection { message: msg.into() } }
    pub fn unknown_account_type<S: Into<String>>(at: S) -> Self {
        Error::UnknownAccountType { account_type: at.into() }
    }
    pub fn storage<S: Into<String>>(msg: S) -> Self { Error::Storage { message: msg.into() } }

    pub fn code_str(&self) -> &'static str {
        match self {
            Error::NoAuthToken => "no_auth_token",
            Error::MalformedPersistedIdentity { .. } => "malformed_persisted_identity",
            Error::Network { .. } => "network",
            Error::ServerRejection { .. } => "server_rejection",
            Error::UnknownAccountType { .. } => "unknown_account_type",
            Error::Storage { .. } => "storage",
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::NoAuthToken => write!(f, "no_auth_token: no bearer token available"),
            Error::MalformedPersistedIdentity { message } => {
                write!(f, "malformed_persisted_identity: {}", message)
            }
            Error::Network { message } => write!(f, "network: {}", message),
            Error::ServerRejection { message } => write!(f, "server_rejection: {}", message),
            Error::UnknownAccountType { account_type } => {
                write!(f, "unknown_account_type: no permission catalog for '{}'", account_type)
            }
            Error::Storage { message } => write!(f, "storage: {}", message),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self { Error::network(err.to_string()) }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self { Error::malformed_identity(err.to_string()) }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self { Error::storage(err.to_string()) }
}
