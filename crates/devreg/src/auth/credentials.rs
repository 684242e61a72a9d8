//! Startup-loaded username to password-hash lookup.

use std::collections::HashMap;

use super::UserEntry;

const DUMMY_PASSWORD: &str = "devreg-dummy-password";

/// Cost range bcrypt accepts.
const MIN_COST: u32 = 4;
const MAX_COST: u32 = 31;

/// Cost factor of a bcrypt hash (`$2b$NN$...`).
fn hash_cost(hash: &str) -> Option<u32> {
    let cost = hash.split('$').nth(2)?;
    if cost.len() != 2 {
        return None;
    }
    cost.parse()
        .ok()
        .filter(|c| (MIN_COST..=MAX_COST).contains(c))
}

/// Read-only credential store, built once from configuration.
///
/// Unknown users and unreadable stored hashes are verified against a dummy
/// hash at the highest configured cost, so every failed attempt performs
/// one comparable bcrypt verification.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    hashes: HashMap<String, String>,
    dummy_hash: String,
}

impl CredentialStore {
    /// Build the store from configured users.
    pub fn new(users: &[UserEntry]) -> Self {
        let hashes: HashMap<String, String> = users
            .iter()
            .map(|u| (u.username.clone(), u.password_hash.clone()))
            .collect();

        let cost = hashes
            .values()
            .filter_map(|hash| hash_cost(hash))
            .max()
            .unwrap_or(bcrypt::DEFAULT_COST);
        let dummy_hash = bcrypt::hash(DUMMY_PASSWORD, cost).unwrap_or_default();

        Self { hashes, dummy_hash }
    }

    /// Look up the stored hash for a username.
    pub fn lookup(&self, username: &str) -> Option<&str> {
        self.hashes.get(username).map(String::as_str)
    }

    /// Number of configured users.
    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    /// Check a username/password pair.
    ///
    /// Malformed stored hashes count as a mismatch.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        let stored = self
            .lookup(username)
            .and_then(|hash| bcrypt::verify(password, hash).ok());

        match stored {
            Some(matched) => matched,
            None => {
                let _ = bcrypt::verify(password, &self.dummy_hash);
                false
            }
        }
    }
}
