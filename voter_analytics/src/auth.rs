use log::{debug, info, warn};

use std::error::Error;
use std::fmt::Display;

/// A user as recorded in the credential store.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct StoredUser {
    pub id: String,
    pub name: String,
    /// Hex SHA-256 digest, see `hash_password`.
    pub password_hash: String,
}

/// A source of users, queried by name.
///
/// Lookups may go through an external service and fail: the message is
/// reported to the user as is.
pub trait CredentialStore {
    fn find_user(&self, username: &str) -> Result<Option<StoredUser>, String>;
}

impl CredentialStore for [StoredUser] {
    fn find_user(&self, username: &str) -> Result<Option<StoredUser>, String> {
        Ok(self.iter().find(|u| u.name == username).cloned())
    }
}

impl CredentialStore for Vec<StoredUser> {
    fn find_user(&self, username: &str) -> Result<Option<StoredUser>, String> {
        self.as_slice().find_user(username)
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum AuthError {
    /// Unknown user or wrong password. Which one is not disclosed.
    InvalidCredentials,
    StoreUnavailable(String),
}

impl Error for AuthError {}

impl Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "invalid user name or password"),
            AuthError::StoreUnavailable(msg) => write!(f, "authentication error: {}", msg),
        }
    }
}

/// The digest stored for a user: hex SHA-256 of the user name, the
/// password and the salt, concatenated in that order.
pub fn hash_password(username: &str, password: &str, salt: &str) -> String {
    sha256::digest(format!("{}{}{}", username, password, salt))
}

/// Compares two strings in a time that only depends on their lengths.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Checks a user name and password against the store.
pub fn authenticate<S: CredentialStore + ?Sized>(
    store: &S,
    username: &str,
    password: &str,
    salt: &str,
) -> Result<StoredUser, AuthError> {
    let user = match store.find_user(username) {
        Ok(Some(u)) => u,
        Ok(None) => {
            debug!("authenticate: no user {:?}", username);
            return Err(AuthError::InvalidCredentials);
        }
        Err(msg) => {
            warn!("authenticate: credential store failure: {}", msg);
            return Err(AuthError::StoreUnavailable(msg));
        }
    };
    let candidate = hash_password(username, password, salt);
    if constant_time_eq(&candidate, &user.password_hash.to_lowercase()) {
        info!("authenticate: user {} logged in", user.name);
        Ok(user)
    } else {
        debug!("authenticate: wrong password for {:?}", username);
        Err(AuthError::InvalidCredentials)
    }
}
