use chrono::NaiveDate;
use sqlx::{Row, SqliteConnection};

use crate::db::DbConnection;

/// Repository for workout operations
#[derive(Clone)]
pub struct WorkoutRepository {
    db: DbConnection,
}

impl WorkoutRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// List a client's workouts by start date, for the assign-exercise form
    pub async fn list_for_client(&self, client_name: &str) -> sqlx::Result<Vec<shared::WorkoutDto>> {
        let rows = sqlx::query(
            r#"
            SELECT w.id, w.start_date, w.end_date
            FROM workouts w
            JOIN clients c ON w.client_id = c.id
            WHERE c.name = ?
            ORDER BY w.start_date ASC, w.id ASC
            "#,
        )
        .bind(client_name)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows
            .iter()
            .map(|row| shared::WorkoutDto {
                id: row.get("id"),
                start_date: row.get::<NaiveDate, _>("start_date").to_string(),
                end_date: row.get::<NaiveDate, _>("end_date").to_string(),
            })
            .collect())
    }

    pub async fn exists(conn: &mut SqliteConnection, workout_id: i64) -> sqlx::Result<bool> {
        let row = sqlx::query("SELECT 1 FROM workouts WHERE id = ?")
            .bind(workout_id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row.is_some())
    }

    /// True if the client already has a workout with this exact period
    pub async fn period_exists(
        conn: &mut SqliteConnection,
        client_id: i64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> sqlx::Result<bool> {
        let row = sqlx::query(
            "SELECT 1 FROM workouts WHERE client_id = ? AND start_date = ? AND end_date = ?",
        )
        .bind(client_id)
        .bind(start_date)
        .bind(end_date)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(row.is_some())
    }

    pub async fn insert(
        conn: &mut SqliteConnection,
        client_id: i64,
        instructor_id: i64,
        start_date: NaiveDate,
        end_date: NaiveDate,
        plan_id: i64,
    ) -> sqlx::Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO workouts (client_id, instructor_id, start_date, end_date, plan_id)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(client_id)
        .bind(instructor_id)
        .bind(start_date)
        .bind(end_date)
        .bind(plan_id)
        .execute(&mut *conn)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// True if the identical (workout, exercise, sets, reps) assignment exists
    pub async fn assignment_exists(
        conn: &mut SqliteConnection,
        workout_id: i64,
        exercise_id: i64,
        sets: i64,
        reps: i64,
    ) -> sqlx::Result<bool> {
        let row = sqlx::query(
            r#"
            SELECT 1 FROM workout_exercises
            WHERE workout_id = ? AND exercise_id = ? AND sets = ? AND reps = ?
            "#,
        )
        .bind(workout_id)
        .bind(exercise_id)
        .bind(sets)
        .bind(reps)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(row.is_some())
    }

    pub async fn insert_assignment(
        conn: &mut SqliteConnection,
        workout_id: i64,
        exercise_id: i64,
        sets: i64,
        reps: i64,
    ) -> sqlx::Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO workout_exercises (workout_id, exercise_id, sets, reps)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(workout_id)
        .bind(exercise_id)
        .bind(sets)
        .bind(reps)
        .execute(&mut *conn)
        .await?;
        Ok(result.last_insert_rowid())
    }
}
