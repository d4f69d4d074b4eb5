use sqlx::{Row, SqliteConnection};

use crate::db::DbConnection;
use crate::domain::models::Client;

/// Fields for a client row about to be inserted.
#[derive(Debug)]
pub struct NewClient<'a> {
    pub name: &'a str,
    pub age: i64,
    pub sex: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub plan_id: i64,
    pub instructor_id: i64,
}

/// Repository for client operations
#[derive(Clone)]
pub struct ClientRepository {
    db: DbConnection,
}

fn map_client(row: &sqlx::sqlite::SqliteRow) -> Client {
    Client {
        id: row.get("id"),
        name: row.get("name"),
        age: row.get("age"),
        sex: row.get("sex"),
        email: row.get("email"),
        phone: row.get("phone"),
        plan_id: row.get("plan_id"),
        instructor_id: row.get("instructor_id"),
        workout_id: row.get("workout_id"),
    }
}

impl ClientRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// List all clients with their plan and instructor names resolved,
    /// ordered by name. Left joins: a client whose references no longer
    /// resolve still appears, with blank labels.
    pub async fn list(&self) -> sqlx::Result<Vec<shared::ClientDto>> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.name, c.age, c.sex, c.email, c.phone,
                   COALESCE(p.name, '') AS plan, COALESCE(i.name, '') AS instructor
            FROM clients c
            LEFT JOIN plans p ON c.plan_id = p.id
            LEFT JOIN instructors i ON c.instructor_id = i.id
            ORDER BY c.name ASC, c.id ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows
            .iter()
            .map(|row| shared::ClientDto {
                id: row.get("id"),
                name: row.get("name"),
                age: row.get("age"),
                sex: row.get("sex"),
                email: row.get("email"),
                phone: row.get("phone"),
                plan: row.get("plan"),
                instructor: row.get("instructor"),
            })
            .collect())
    }

    pub async fn find_by_name(
        conn: &mut SqliteConnection,
        name: &str,
    ) -> sqlx::Result<Option<Client>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, age, sex, email, phone, plan_id, instructor_id, workout_id
            FROM clients
            WHERE name = ?
            ORDER BY id ASC
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row.as_ref().map(map_client))
    }

    pub async fn name_exists(conn: &mut SqliteConnection, name: &str) -> sqlx::Result<bool> {
        let row = sqlx::query("SELECT 1 FROM clients WHERE name = ?")
            .bind(name)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row.is_some())
    }

    pub async fn email_exists(conn: &mut SqliteConnection, email: &str) -> sqlx::Result<bool> {
        let row = sqlx::query("SELECT 1 FROM clients WHERE email = ?")
            .bind(email)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row.is_some())
    }

    pub async fn insert(conn: &mut SqliteConnection, client: &NewClient<'_>) -> sqlx::Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO clients (name, age, sex, email, phone, plan_id, instructor_id)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(client.name)
        .bind(client.age)
        .bind(client.sex)
        .bind(client.email)
        .bind(client.phone)
        .bind(client.plan_id)
        .bind(client.instructor_id)
        .execute(&mut *conn)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Point the client at its first workout. A no-op for any later workout:
    /// the back-reference is set once and never overwritten.
    pub async fn set_first_workout(
        conn: &mut SqliteConnection,
        client_id: i64,
        workout_id: i64,
    ) -> sqlx::Result<()> {
        sqlx::query("UPDATE clients SET workout_id = ? WHERE id = ? AND workout_id IS NULL")
            .bind(workout_id)
            .bind(client_id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}
