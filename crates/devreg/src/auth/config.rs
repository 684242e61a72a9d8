//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Default bearer token lifetime in seconds.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

/// Longest accepted bearer token lifetime (ten years).
pub const MAX_TOKEN_TTL_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// Minimum accepted length of the token signing secret.
pub const MIN_SECRET_LEN: usize = 32;

/// Authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret used to sign bearer tokens.
    /// Either a literal value or `env:VAR_NAME`.
    pub token_secret: Option<String>,

    /// Lifetime of issued tokens, in seconds.
    pub token_ttl_secs: i64,

    /// Users allowed to authenticate. Passwords are stored as bcrypt hashes.
    pub users: Vec<UserEntry>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            // No default secret - must be explicitly configured
            token_secret: None,
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            users: Vec::new(),
        }
    }
}

impl AuthConfig {
    /// Resolve the token secret, expanding `env:VAR_NAME` syntax.
    /// Returns the resolved secret or None if not configured.
    pub fn resolve_token_secret(&self) -> Result<Option<String>, ConfigValidationError> {
        match &self.token_secret {
            None => Ok(None),
            Some(value) => {
                if let Some(var_name) = value.strip_prefix("env:") {
                    match std::env::var(var_name) {
                        Ok(secret) if !secret.is_empty() => Ok(Some(secret)),
                        Ok(_) => Err(ConfigValidationError::EnvVarEmpty(var_name.to_string())),
                        Err(_) => Err(ConfigValidationError::EnvVarNotFound(var_name.to_string())),
                    }
                } else {
                    Ok(Some(value.clone()))
                }
            }
        }
    }

    /// Validate the configuration and return the resolved secret.
    pub fn validate(&self) -> Result<String, ConfigValidationError> {
        let secret = self
            .resolve_token_secret()?
            .ok_or(ConfigValidationError::MissingTokenSecret)?;

        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigValidationError::TokenSecretTooShort);
        }

        if !(1..=MAX_TOKEN_TTL_SECS).contains(&self.token_ttl_secs) {
            return Err(ConfigValidationError::InvalidTokenTtl(self.token_ttl_secs));
        }

        let mut seen = std::collections::HashSet::new();
        for user in &self.users {
            if user.username.is_empty() {
                return Err(ConfigValidationError::EmptyUsername);
            }
            if !seen.insert(user.username.as_str()) {
                return Err(ConfigValidationError::DuplicateUser(user.username.clone()));
            }
        }

        Ok(secret)
    }

    /// Generate a random token secret.
    ///
    /// Backed by `rand::rng()`, which is seeded from the OS generator.
    pub fn generate_token_secret() -> String {
        use rand::Rng;

        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
        const SECRET_LENGTH: usize = 64;

        let mut rng = rand::rng();
        (0..SECRET_LENGTH)
            .map(|_| {
                let idx = rng.random_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect()
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// No token secret configured.
    MissingTokenSecret,
    /// Token secret shorter than [`MIN_SECRET_LEN`].
    TokenSecretTooShort,
    /// Token lifetime outside `1..=MAX_TOKEN_TTL_SECS`.
    InvalidTokenTtl(i64),
    /// A user entry has an empty username.
    EmptyUsername,
    /// The same username is configured twice.
    DuplicateUser(String),
    /// Environment variable not found (for `env:VAR_NAME` syntax).
    EnvVarNotFound(String),
    /// Environment variable is empty (for `env:VAR_NAME` syntax).
    EnvVarEmpty(String),
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTokenSecret => {
                write!(
                    f,
                    "token secret is required. Set DEVREG__AUTH__TOKEN_SECRET or auth.token_secret in config."
                )
            }
            Self::TokenSecretTooShort => {
                write!(
                    f,
                    "token secret must be at least {} characters long.",
                    MIN_SECRET_LEN
                )
            }
            Self::InvalidTokenTtl(ttl) => {
                write!(
                    f,
                    "token_ttl_secs must be between 1 and {} (got {}).",
                    MAX_TOKEN_TTL_SECS, ttl
                )
            }
            Self::EmptyUsername => write!(f, "auth.users contains an entry with an empty username."),
            Self::DuplicateUser(name) => {
                write!(f, "user '{}' is configured more than once.", name)
            }
            Self::EnvVarNotFound(var) => {
                write!(
                    f,
                    "Environment variable '{}' not found (referenced via env:{} in config).",
                    var, var
                )
            }
            Self::EnvVarEmpty(var) => {
                write!(
                    f,
                    "Environment variable '{}' is empty (referenced via env:{} in config).",
                    var, var
                )
            }
        }
    }
}

impl std::error::Error for ConfigValidationError {}

/// A configured user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEntry {
    /// Login name, also the principal identity.
    pub username: String,
    /// Password hash (bcrypt).
    pub password_hash: String,
}

impl UserEntry {
    /// Build an entry by hashing a plaintext password.
    pub fn with_password(
        username: impl Into<String>,
        password: &str,
        cost: u32,
    ) -> Result<Self, bcrypt::BcryptError> {
        Ok(Self {
            username: username.into(),
            password_hash: bcrypt::hash(password, cost)?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::field_reassign_with_default)]
mod tests {
    use super::*;

    const LONG_SECRET: &str = "a-very-long-and-secure-token-secret-of-32-chars-plus";

    #[test]
    fn test_auth_config_default() {
        let config = AuthConfig::default();
        assert!(config.token_secret.is_none());
        assert_eq!(config.token_ttl_secs, 3600);
        assert!(config.users.is_empty());
    }

    #[test]
    fn test_validate_missing_secret() {
        let config = AuthConfig::default();
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigValidationError::MissingTokenSecret
        );
    }

    #[test]
    fn test_validate_short_secret() {
        let mut config = AuthConfig::default();
        config.token_secret = Some("tooshort".to_string());
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigValidationError::TokenSecretTooShort
        );
    }

    #[test]
    fn test_validate_bad_ttl() {
        let mut config = AuthConfig::default();
        config.token_secret = Some(LONG_SECRET.to_string());
        config.token_ttl_secs = 0;
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigValidationError::InvalidTokenTtl(0)
        );

        config.token_ttl_secs = 9_000_000_000_000;
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigValidationError::InvalidTokenTtl(9_000_000_000_000)
        );

        config.token_ttl_secs = MAX_TOKEN_TTL_SECS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_duplicate_user() {
        let mut config = AuthConfig::default();
        config.token_secret = Some(LONG_SECRET.to_string());
        config.users = vec![
            UserEntry {
                username: "alice".to_string(),
                password_hash: "x".to_string(),
            },
            UserEntry {
                username: "alice".to_string(),
                password_hash: "y".to_string(),
            },
        ];
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigValidationError::DuplicateUser("alice".to_string())
        );
    }

    #[test]
    fn test_validate_returns_resolved_secret() {
        let mut config = AuthConfig::default();
        config.token_secret = Some(LONG_SECRET.to_string());
        assert_eq!(config.validate().unwrap(), LONG_SECRET);
    }

    #[test]
    fn test_resolve_token_secret_env_var() {
        // SAFETY: test-only variable with a unique name
        unsafe {
            std::env::set_var("DEVREG_TEST_TOKEN_SECRET_1", LONG_SECRET);
        }

        let mut config = AuthConfig::default();
        config.token_secret = Some("env:DEVREG_TEST_TOKEN_SECRET_1".to_string());
        assert_eq!(
            config.resolve_token_secret().unwrap(),
            Some(LONG_SECRET.to_string())
        );

        // SAFETY: cleaning up the variable set above
        unsafe {
            std::env::remove_var("DEVREG_TEST_TOKEN_SECRET_1");
        }
    }

    #[test]
    fn test_resolve_token_secret_env_var_not_found() {
        let mut config = AuthConfig::default();
        config.token_secret = Some("env:DEVREG_NONEXISTENT_VAR_12345".to_string());
        assert_eq!(
            config.resolve_token_secret().unwrap_err(),
            ConfigValidationError::EnvVarNotFound("DEVREG_NONEXISTENT_VAR_12345".to_string())
        );
    }

    #[test]
    fn test_generate_token_secret() {
        let secret = AuthConfig::generate_token_secret();
        assert_eq!(secret.len(), 64);
        assert!(secret.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(secret, AuthConfig::generate_token_secret());

        let mut config = AuthConfig::default();
        config.token_secret = Some(secret);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_user_entry_with_password() {
        let user = UserEntry::with_password("alice", "wonderland", 4).unwrap();
        assert_eq!(user.username, "alice");
        assert_ne!(user.password_hash, "wonderland");
        assert!(user.password_hash.starts_with("$2"));
    }
}
