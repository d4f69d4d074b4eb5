use anyhow::Result;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;

// The database URL for the production database
const DATABASE_URL: &str = "sqlite:gym.db";

/// DbConnection manages database operations.
///
/// Cloneable handle over a shared pool; every repository and service gets its
/// own handle instead of reaching for a global connection.
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Create a new database connection
    pub async fn new(url: &str) -> Result<Self> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?
        }

        // Foreign keys stay declarative: services enforce referential
        // validity at write time, and reports must still be able to group
        // historical rows whose references no longer resolve. sqlx enables
        // `PRAGMA foreign_keys = ON` by default, so disable it explicitly to
        // keep the store non-enforcing.
        let options = SqliteConnectOptions::from_str(url)?.foreign_keys(false);

        // Connect to the database
        let pool = SqlitePool::connect_with(options).await?;

        sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

        // Setup database schema
        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Initialize the standard database, honoring `GYM_DATABASE_URL`
    pub async fn init() -> Result<Self> {
        let url = std::env::var("GYM_DATABASE_URL").unwrap_or_else(|_| DATABASE_URL.to_string());
        Self::new(&url).await
    }

    /// Initialize a test database with a unique name
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        // Generate a unique database name for tests
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url).await
    }

    /// Set up the record tables and the credentials table.
    ///
    /// Create-if-absent throughout: safe to invoke any number of times
    /// against the same store. Each table carries a surrogate integer key and
    /// a UNIQUE constraint on its natural key.
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS instructors (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                specialty TEXT NOT NULL,
                UNIQUE (name, specialty)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS plans (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                monthly_price REAL NOT NULL,
                duration_months INTEGER NOT NULL,
                UNIQUE (name, monthly_price, duration_months)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS exercises (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                muscle_group TEXT NOT NULL,
                UNIQUE (name, muscle_group)
            );
            "#,
        )
        .execute(pool)
        .await?;

        // workout_id is a weak back-reference: lookup only, set once after the
        // first workout is created, no cascade behavior anywhere.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS clients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                age INTEGER NOT NULL,
                sex TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                phone TEXT NOT NULL,
                plan_id INTEGER NOT NULL,
                instructor_id INTEGER NOT NULL,
                workout_id INTEGER,
                FOREIGN KEY(plan_id) REFERENCES plans(id),
                FOREIGN KEY(instructor_id) REFERENCES instructors(id),
                FOREIGN KEY(workout_id) REFERENCES workouts(id)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS workouts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                client_id INTEGER NOT NULL,
                instructor_id INTEGER NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                plan_id INTEGER NOT NULL,
                FOREIGN KEY(client_id) REFERENCES clients(id),
                FOREIGN KEY(instructor_id) REFERENCES instructors(id),
                FOREIGN KEY(plan_id) REFERENCES plans(id),
                UNIQUE (client_id, instructor_id, start_date, end_date, plan_id)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS workout_exercises (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                workout_id INTEGER NOT NULL,
                exercise_id INTEGER NOT NULL,
                sets INTEGER NOT NULL,
                reps INTEGER NOT NULL,
                FOREIGN KEY(workout_id) REFERENCES workouts(id),
                FOREIGN KEY(exercise_id) REFERENCES exercises(id),
                UNIQUE (workout_id, exercise_id, sets, reps)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS payments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                client_id INTEGER NOT NULL,
                payment_date TEXT NOT NULL,
                amount REAL NOT NULL,
                plan_id INTEGER NOT NULL,
                FOREIGN KEY(client_id) REFERENCES clients(id),
                FOREIGN KEY(plan_id) REFERENCES plans(id),
                UNIQUE (client_id, payment_date, amount, plan_id)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                password_salt TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Get the underlying SQLite pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_schema_setup_is_idempotent() {
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);

        let first = DbConnection::new(&db_url).await.expect("first setup failed");

        // Reapplying against the same store must neither error nor duplicate
        let _second = DbConnection::new(&db_url).await.expect("schema reapply failed");

        // The store is usable after the second pass
        sqlx::query("INSERT INTO instructors (name, specialty) VALUES (?, ?)")
            .bind("Carla")
            .bind("crossfit")
            .execute(first.pool())
            .await
            .expect("insert after reapply failed");
    }

    #[tokio::test]
    async fn test_natural_key_constraints_are_enforced() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");

        sqlx::query("INSERT INTO exercises (name, muscle_group) VALUES (?, ?)")
            .bind("squat")
            .bind("legs")
            .execute(db.pool())
            .await
            .expect("first insert failed");

        let dup = sqlx::query("INSERT INTO exercises (name, muscle_group) VALUES (?, ?)")
            .bind("squat")
            .bind("legs")
            .execute(db.pool())
            .await;
        assert!(crate::error::is_unique_violation(&dup.unwrap_err()));

        // Same name under a different muscle group is a distinct natural key
        sqlx::query("INSERT INTO exercises (name, muscle_group) VALUES (?, ?)")
            .bind("squat")
            .bind("glutes")
            .execute(db.pool())
            .await
            .expect("distinct natural key rejected");
    }
}
