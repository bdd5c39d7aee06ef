//! # fsr-core
//!
//! Error taxonomy, credential selection and result shaping shared by the
//! `fsrctl` command-line client. This crate does no I/O.

pub mod auth;
pub mod errors;
pub mod view;

// Re-export commonly used types
pub use auth::{derive_credential, resolve_credentials, AuthMode, Credential};
pub use errors::{FsrError, FsrResult};
pub use view::{ShapeRule, SimpleView, View, DEFAULT_SHAPES};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::auth::*;
    pub use crate::errors::*;
    pub use crate::view::*;
}
