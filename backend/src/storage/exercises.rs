use sqlx::{Row, SqliteConnection};

use crate::db::DbConnection;
use crate::domain::models::Exercise;

/// Repository for exercise operations
#[derive(Clone)]
pub struct ExerciseRepository {
    db: DbConnection,
}

impl ExerciseRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// List all exercises ordered by name
    pub async fn list(&self) -> sqlx::Result<Vec<shared::ExerciseDto>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, muscle_group
            FROM exercises
            ORDER BY name ASC, id ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows
            .iter()
            .map(|row| shared::ExerciseDto {
                id: row.get("id"),
                name: row.get("name"),
                muscle_group: row.get("muscle_group"),
            })
            .collect())
    }

    pub async fn find_by_name(
        conn: &mut SqliteConnection,
        name: &str,
    ) -> sqlx::Result<Option<Exercise>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, muscle_group
            FROM exercises
            WHERE name = ?
            ORDER BY id ASC
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row.map(|r| Exercise {
            id: r.get("id"),
            name: r.get("name"),
            muscle_group: r.get("muscle_group"),
        }))
    }

    /// True if the (name, muscle group) natural key is already present
    pub async fn pair_exists(
        conn: &mut SqliteConnection,
        name: &str,
        muscle_group: &str,
    ) -> sqlx::Result<bool> {
        let row = sqlx::query("SELECT 1 FROM exercises WHERE name = ? AND muscle_group = ?")
            .bind(name)
            .bind(muscle_group)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row.is_some())
    }

    pub async fn insert(
        conn: &mut SqliteConnection,
        name: &str,
        muscle_group: &str,
    ) -> sqlx::Result<i64> {
        let result = sqlx::query("INSERT INTO exercises (name, muscle_group) VALUES (?, ?)")
            .bind(name)
            .bind(muscle_group)
            .execute(&mut *conn)
            .await?;
        Ok(result.last_insert_rowid())
    }
}
