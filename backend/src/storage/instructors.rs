use sqlx::{Row, SqliteConnection};

use crate::db::DbConnection;
use crate::domain::models::Instructor;

/// Repository for instructor lookups
#[derive(Clone)]
pub struct InstructorRepository {
    db: DbConnection,
}

impl InstructorRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// List all instructors ordered by name
    pub async fn list(&self) -> sqlx::Result<Vec<shared::InstructorDto>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, specialty
            FROM instructors
            ORDER BY name ASC, id ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows
            .iter()
            .map(|row| shared::InstructorDto {
                id: row.get("id"),
                name: row.get("name"),
                specialty: row.get("specialty"),
            })
            .collect())
    }

    /// Resolve an instructor by name; the oldest match wins when several
    /// specialties share a name.
    pub async fn find_by_name(
        conn: &mut SqliteConnection,
        name: &str,
    ) -> sqlx::Result<Option<Instructor>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, specialty
            FROM instructors
            WHERE name = ?
            ORDER BY id ASC
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row.map(|r| Instructor {
            id: r.get("id"),
            name: r.get("name"),
            specialty: r.get("specialty"),
        }))
    }
}
