use sqlx::Row;

use crate::db::DbConnection;

/// Stored credential material for one user.
#[derive(Debug, Clone)]
pub struct StoredCredential {
    pub password_hash: String,
    pub password_salt: String,
}

/// Repository for the credentials table.
///
/// Registration relies on the UNIQUE username constraint rather than a
/// pre-check; the service maps the conflict to a duplicate failure.
#[derive(Clone)]
pub struct UserRepository {
    db: DbConnection,
}

impl UserRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn find_credentials(&self, username: &str) -> sqlx::Result<Option<StoredCredential>> {
        let row = sqlx::query(
            r#"
            SELECT password_hash, password_salt
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(|r| StoredCredential {
            password_hash: r.get("password_hash"),
            password_salt: r.get("password_salt"),
        }))
    }

    pub async fn insert(&self, username: &str, hash: &str, salt: &str) -> sqlx::Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, password_salt)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(username)
        .bind(hash)
        .bind(salt)
        .execute(self.db.pool())
        .await?;
        Ok(result.last_insert_rowid())
    }
}
