use rand::Rng;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::db::DbConnection;
use crate::error::{is_unique_violation, DomainError, DomainResult};
use crate::storage::UserRepository;

/// Minimal credential store: username plus salted, hashed password.
/// Independent of the record tables.
#[derive(Clone)]
pub struct AuthService {
    users: UserRepository,
}

impl AuthService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            users: UserRepository::new(db),
        }
    }

    fn hash_password(salt: &str, password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(password.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Register a new user; usernames are unique
    pub async fn register(&self, username: &str, password: &str) -> DomainResult<i64> {
        let username = username.trim();
        if username.is_empty() {
            return Err(DomainError::validation("username", "must not be empty"));
        }
        if password.is_empty() {
            return Err(DomainError::validation("password", "must not be empty"));
        }

        let salt = format!("{:032x}", rand::thread_rng().gen::<u128>());
        let hash = Self::hash_password(&salt, password);

        let id = self
            .users
            .insert(username, &hash, &salt)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DomainError::duplicate("user", format!("username '{}' is taken", username))
                } else {
                    e.into()
                }
            })?;

        info!("Registered user '{}'", username);
        Ok(id)
    }

    /// Check a username/password pair. Unknown usernames and wrong passwords
    /// both come back as a plain false.
    pub async fn verify(&self, username: &str, password: &str) -> DomainResult<bool> {
        match self.users.find_credentials(username.trim()).await? {
            Some(stored) => {
                Ok(Self::hash_password(&stored.password_salt, password) == stored.password_hash)
            }
            None => Ok(false),
        }
    }
}
