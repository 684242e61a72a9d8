//! Authentication errors.

use thiserror::Error;

use super::token::TokenError;

/// Authentication errors.
///
/// Every variant except `Internal` reaches the client as the same generic
/// "Invalid credentials" response; the variants exist for logging.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No credential material on the request.
    #[error("missing credentials")]
    MissingCredentials,

    /// Authorization header present but not a usable Basic/Bearer value.
    #[error("invalid authorization header format")]
    InvalidAuthHeader,

    /// Unknown user or wrong password.
    #[error("invalid username or password")]
    InvalidPassword,

    /// Bearer token failed verification.
    #[error("{0}")]
    InvalidToken(#[from] TokenError),

    /// The endpoint only accepts Basic credentials.
    #[error("basic credentials required")]
    BasicRequired,

    /// Internal error.
    #[error("internal auth error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_display() {
        assert_eq!(
            AuthError::MissingCredentials.to_string(),
            "missing credentials"
        );
        assert_eq!(
            AuthError::from(TokenError::Expired).to_string(),
            "token expired"
        );
    }
}
