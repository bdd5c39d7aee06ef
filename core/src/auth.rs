//! Credential selection
//!
//! Picks the authentication mode from whatever secrets the resolved
//! configuration carries. Nothing here touches the network or mutates
//! state; exchanging a password for a token happens in the CLI crate.

use crate::errors::{FsrError, FsrResult};
use std::fmt;

/// Message used whenever no usable credential is available
pub const MISSING_CREDENTIALS: &str = "Either token or username/password must be provided";

/// Authentication mode selected for an invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Token,
    UserPass,
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMode::Token => write!(f, "token"),
            AuthMode::UserPass => write!(f, "userpass"),
        }
    }
}

/// A credential ready to hand to the client factory
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Token(String),
    UserPass { username: String, password: String },
}

impl Credential {
    pub fn mode(&self) -> AuthMode {
        match self {
            Credential::Token(_) => AuthMode::Token,
            Credential::UserPass { .. } => AuthMode::UserPass,
        }
    }
}

// Secrets stay out of logs and error output.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Token(_) => f.debug_tuple("Token").field(&"***").finish(),
            Credential::UserPass { username, .. } => f
                .debug_struct("UserPass")
                .field("username", username)
                .field("password", &"***")
                .finish(),
        }
    }
}

/// Derive the credential from optional secrets, if any combination is usable.
///
/// A non-empty token always wins; otherwise both username and password
/// must be non-empty.
pub fn derive_credential(
    token: Option<&str>,
    username: Option<&str>,
    password: Option<&str>,
) -> Option<Credential> {
    if let Some(token) = non_empty(token) {
        return Some(Credential::Token(token.to_string()));
    }

    match (non_empty(username), non_empty(password)) {
        (Some(username), Some(password)) => Some(Credential::UserPass {
            username: username.to_string(),
            password: password.to_string(),
        }),
        _ => None,
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Select the authentication mode and credential.
///
/// `server` is accepted for symmetry with the client factory but does not
/// influence the selection. Conflicting token and username/password input
/// is rejected by callers before this runs.
pub fn resolve_credentials(
    _server: Option<&str>,
    token: Option<&str>,
    username: Option<&str>,
    password: Option<&str>,
) -> FsrResult<(AuthMode, Credential)> {
    derive_credential(token, username, password)
        .map(|credential| (credential.mode(), credential))
        .ok_or_else(|| FsrError::authentication(MISSING_CREDENTIALS))
}
