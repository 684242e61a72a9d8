//! Request authentication.
//!
//! Credential material comes from the `Authorization` header and is parsed
//! into a [`CredentialAttempt`] first, then resolved to a [`Principal`] by
//! [`AuthState::authenticate`]. The scheme named in the header decides which
//! path runs; a request never falls through from one scheme to the other.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use tracing::debug;

use super::{AuthConfig, AuthError, ConfigValidationError, CredentialStore, Principal, TokenCodec};

/// Credential material supplied with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialAttempt {
    /// `Authorization: Basic base64(username:password)`.
    Basic { username: String, password: String },
    /// `Authorization: Bearer <token>`.
    Bearer(String),
    /// No `Authorization` header.
    None,
}

impl CredentialAttempt {
    /// Parse the `Authorization` header of a request.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, AuthError> {
        match headers.get(AUTHORIZATION) {
            None => Ok(Self::None),
            Some(value) => {
                let value = value.to_str().map_err(|_| AuthError::InvalidAuthHeader)?;
                Self::parse(value)
            }
        }
    }

    /// Parse an `Authorization` header value.
    pub fn parse(header_value: &str) -> Result<Self, AuthError> {
        let mut parts = header_value.split_whitespace();
        let scheme = parts.next().ok_or(AuthError::InvalidAuthHeader)?;
        let credentials = parts.next().ok_or(AuthError::InvalidAuthHeader)?;

        if parts.next().is_some() {
            return Err(AuthError::InvalidAuthHeader);
        }

        if scheme.eq_ignore_ascii_case("basic") {
            let decoded = BASE64
                .decode(credentials)
                .map_err(|_| AuthError::InvalidAuthHeader)?;
            let decoded = String::from_utf8(decoded).map_err(|_| AuthError::InvalidAuthHeader)?;
            let (username, password) = decoded
                .split_once(':')
                .ok_or(AuthError::InvalidAuthHeader)?;

            Ok(Self::Basic {
                username: username.to_string(),
                password: password.to_string(),
            })
        } else if scheme.eq_ignore_ascii_case("bearer") {
            Ok(Self::Bearer(credentials.to_string()))
        } else {
            Err(AuthError::InvalidAuthHeader)
        }
    }
}

/// Authentication state shared across handlers.
///
/// Both parts are fixed at startup and only read afterwards.
#[derive(Clone, Debug)]
pub struct AuthState {
    credentials: Arc<CredentialStore>,
    tokens: Arc<TokenCodec>,
}

impl AuthState {
    pub fn new(credentials: CredentialStore, tokens: TokenCodec) -> Self {
        Self {
            credentials: Arc::new(credentials),
            tokens: Arc::new(tokens),
        }
    }

    /// Validate `config` and build the auth state from it.
    pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigValidationError> {
        let secret = config.validate()?;
        Ok(Self::new(
            CredentialStore::new(&config.users),
            TokenCodec::new(secret.as_bytes(), config.token_ttl_secs),
        ))
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn tokens(&self) -> &TokenCodec {
        &self.tokens
    }

    /// Resolve a credential attempt to a principal at time `now`.
    pub fn authenticate(
        &self,
        attempt: &CredentialAttempt,
        now: DateTime<Utc>,
    ) -> Result<Principal, AuthError> {
        match attempt {
            CredentialAttempt::Basic { username, password } => {
                if self.credentials.verify(username, password) {
                    Ok(Principal::new(username.clone()))
                } else {
                    Err(AuthError::InvalidPassword)
                }
            }
            CredentialAttempt::Bearer(token) => Ok(self.tokens.verify(token, now)?),
            CredentialAttempt::None => Err(AuthError::MissingCredentials),
        }
    }

    /// Issue a bearer token for an authenticated principal.
    pub fn issue_token(&self, principal: &Principal) -> Result<String, AuthError> {
        self.tokens
            .issue(principal, Utc::now())
            .map_err(|e| AuthError::Internal(e.to_string()))
    }
}

/// Principal of a request authenticated with Basic or Bearer credentials.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

impl CurrentUser {
    pub fn principal(&self) -> &Principal {
        &self.0
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthState::from_ref(state);
        let result = CredentialAttempt::from_headers(&parts.headers)
            .and_then(|attempt| auth.authenticate(&attempt, Utc::now()));

        match result {
            Ok(principal) => Ok(CurrentUser(principal)),
            Err(err) => {
                debug!(path = %parts.uri.path(), reason = %err, "Authentication failed");
                Err(err)
            }
        }
    }
}

/// Principal of a request authenticated with Basic credentials only.
#[derive(Debug, Clone)]
pub struct BasicUser(pub Principal);

impl<S> FromRequestParts<S> for BasicUser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthState::from_ref(state);
        let result = CredentialAttempt::from_headers(&parts.headers).and_then(|attempt| {
            match attempt {
                CredentialAttempt::Basic { .. } | CredentialAttempt::None => {
                    auth.authenticate(&attempt, Utc::now())
                }
                CredentialAttempt::Bearer(_) => Err(AuthError::BasicRequired),
            }
        });

        match result {
            Ok(principal) => Ok(BasicUser(principal)),
            Err(err) => {
                debug!(reason = %err, "Basic authentication failed");
                Err(err)
            }
        }
    }
}
