//! Authentication and authorization.
//!
//! Provides:
//! - A startup-loaded credential store (bcrypt hashes)
//! - HS256 bearer tokens with a configurable lifetime
//! - Basic/Bearer request authentication as axum extractors
//! - The ownership guard applied to per-device operations

mod authenticator;
mod config;
mod credentials;
mod error;
pub mod guard;
mod principal;
mod token;

pub use authenticator::{AuthState, BasicUser, CredentialAttempt, CurrentUser};
pub use config::{
    AuthConfig, ConfigValidationError, DEFAULT_TOKEN_TTL_SECS, MAX_TOKEN_TTL_SECS, UserEntry,
};
pub use credentials::CredentialStore;
pub use error::AuthError;
pub use guard::Access;
pub use principal::Principal;
pub use token::{Claims, TokenCodec, TokenError};
