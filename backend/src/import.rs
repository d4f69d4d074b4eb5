//! Bulk record import with idempotent reconciliation.
//!
//! Seed batches arrive as comma-separated UTF-8 files with header-named
//! columns, one file per entity. Reconciliation inserts only those records
//! whose natural key is absent from both the batch itself and the persisted
//! store, so re-running an import is a no-op. The key comparison is by
//! value: an incoming record whose key matches an existing row is discarded
//! even when its other columns differ (no upsert semantics).

use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use sqlx::{Row, SqliteConnection};
use tracing::{error, info};

use crate::db::DbConnection;
use crate::error::{DomainError, DomainResult};

/// One component of a natural-key tuple, compared by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyPart {
    Int(i64),
    /// Bit pattern of an f64; REAL columns round-trip exactly through SQLite
    Real(u64),
    Text(String),
}

impl KeyPart {
    pub fn int(value: i64) -> Self {
        Self::Int(value)
    }

    pub fn real(value: f64) -> Self {
        Self::Real(value.to_bits())
    }

    pub fn text(value: &str) -> Self {
        Self::Text(value.trim().to_string())
    }
}

/// A natural-key tuple in declaration order.
pub type NaturalKey = Vec<KeyPart>;

/// A record type that can be reconciled into its table.
#[allow(async_fn_in_trait)]
pub trait ImportRecord: Sized {
    /// Target table name, for logging
    const TABLE: &'static str;

    /// The record's natural-key tuple
    fn natural_key(&self) -> NaturalKey;

    /// SELECT of the natural-key columns over the whole table
    fn persisted_key_sql() -> &'static str;

    /// The natural-key tuple of one persisted row
    fn key_from_row(row: &sqlx::sqlite::SqliteRow) -> NaturalKey;

    /// Append this record inside the reconciliation transaction
    async fn insert(&self, conn: &mut SqliteConnection) -> sqlx::Result<()>;
}

/// Insert the records of `batch` whose natural key is not yet persisted.
///
/// Intra-batch duplicates collapse to their first occurrence, in input
/// order. The persisted-key read and the inserts share one transaction, so
/// two concurrent reconciliations of the same table cannot double-insert.
/// Returns the records actually inserted; when every record is already
/// present no write is performed at all.
pub async fn reconcile<R: ImportRecord>(db: &DbConnection, batch: Vec<R>) -> DomainResult<Vec<R>> {
    let mut seen = HashSet::new();
    let batch: Vec<R> = batch
        .into_iter()
        .filter(|record| seen.insert(record.natural_key()))
        .collect();

    let mut tx = db.pool().begin().await?;

    let rows = sqlx::query(R::persisted_key_sql())
        .fetch_all(&mut *tx)
        .await?;
    let existing: HashSet<NaturalKey> = rows.iter().map(R::key_from_row).collect();

    let fresh: Vec<R> = batch
        .into_iter()
        .filter(|record| !existing.contains(&record.natural_key()))
        .collect();

    if fresh.is_empty() {
        // Dropping the transaction rolls back the (read-only) work
        return Ok(fresh);
    }

    for record in &fresh {
        record.insert(&mut tx).await?;
    }
    tx.commit().await?;

    Ok(fresh)
}

// ---------------------------------------------------------------------------
// Record types, one per seed file
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClientRecord {
    pub name: String,
    pub age: i64,
    pub sex: String,
    pub email: String,
    pub phone: String,
    pub plan_id: i64,
    pub instructor_id: i64,
}

impl ImportRecord for ClientRecord {
    const TABLE: &'static str = "clients";

    fn natural_key(&self) -> NaturalKey {
        vec![KeyPart::text(&self.email)]
    }

    fn persisted_key_sql() -> &'static str {
        "SELECT email FROM clients"
    }

    fn key_from_row(row: &sqlx::sqlite::SqliteRow) -> NaturalKey {
        vec![KeyPart::text(row.get("email"))]
    }

    async fn insert(&self, conn: &mut SqliteConnection) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO clients (name, age, sex, email, phone, plan_id, instructor_id)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&self.name)
        .bind(self.age)
        .bind(&self.sex)
        .bind(&self.email)
        .bind(&self.phone)
        .bind(self.plan_id)
        .bind(self.instructor_id)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InstructorRecord {
    pub name: String,
    pub specialty: String,
}

impl ImportRecord for InstructorRecord {
    const TABLE: &'static str = "instructors";

    fn natural_key(&self) -> NaturalKey {
        vec![KeyPart::text(&self.name), KeyPart::text(&self.specialty)]
    }

    fn persisted_key_sql() -> &'static str {
        "SELECT name, specialty FROM instructors"
    }

    fn key_from_row(row: &sqlx::sqlite::SqliteRow) -> NaturalKey {
        vec![
            KeyPart::text(row.get("name")),
            KeyPart::text(row.get("specialty")),
        ]
    }

    async fn insert(&self, conn: &mut SqliteConnection) -> sqlx::Result<()> {
        sqlx::query("INSERT INTO instructors (name, specialty) VALUES (?, ?)")
            .bind(&self.name)
            .bind(&self.specialty)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlanRecord {
    pub name: String,
    pub monthly_price: f64,
    pub duration_months: i64,
}

impl ImportRecord for PlanRecord {
    const TABLE: &'static str = "plans";

    fn natural_key(&self) -> NaturalKey {
        vec![
            KeyPart::text(&self.name),
            KeyPart::real(self.monthly_price),
            KeyPart::int(self.duration_months),
        ]
    }

    fn persisted_key_sql() -> &'static str {
        "SELECT name, monthly_price, duration_months FROM plans"
    }

    fn key_from_row(row: &sqlx::sqlite::SqliteRow) -> NaturalKey {
        vec![
            KeyPart::text(row.get("name")),
            KeyPart::real(row.get("monthly_price")),
            KeyPart::int(row.get("duration_months")),
        ]
    }

    async fn insert(&self, conn: &mut SqliteConnection) -> sqlx::Result<()> {
        sqlx::query("INSERT INTO plans (name, monthly_price, duration_months) VALUES (?, ?, ?)")
            .bind(&self.name)
            .bind(self.monthly_price)
            .bind(self.duration_months)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExerciseRecord {
    pub name: String,
    pub muscle_group: String,
}

impl ImportRecord for ExerciseRecord {
    const TABLE: &'static str = "exercises";

    fn natural_key(&self) -> NaturalKey {
        vec![KeyPart::text(&self.name), KeyPart::text(&self.muscle_group)]
    }

    fn persisted_key_sql() -> &'static str {
        "SELECT name, muscle_group FROM exercises"
    }

    fn key_from_row(row: &sqlx::sqlite::SqliteRow) -> NaturalKey {
        vec![
            KeyPart::text(row.get("name")),
            KeyPart::text(row.get("muscle_group")),
        ]
    }

    async fn insert(&self, conn: &mut SqliteConnection) -> sqlx::Result<()> {
        sqlx::query("INSERT INTO exercises (name, muscle_group) VALUES (?, ?)")
            .bind(&self.name)
            .bind(&self.muscle_group)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorkoutRecord {
    pub client_id: i64,
    pub instructor_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub plan_id: i64,
}

impl ImportRecord for WorkoutRecord {
    const TABLE: &'static str = "workouts";

    fn natural_key(&self) -> NaturalKey {
        vec![
            KeyPart::int(self.client_id),
            KeyPart::int(self.instructor_id),
            KeyPart::text(&self.start_date.to_string()),
            KeyPart::text(&self.end_date.to_string()),
            KeyPart::int(self.plan_id),
        ]
    }

    fn persisted_key_sql() -> &'static str {
        "SELECT client_id, instructor_id, start_date, end_date, plan_id FROM workouts"
    }

    fn key_from_row(row: &sqlx::sqlite::SqliteRow) -> NaturalKey {
        vec![
            KeyPart::int(row.get("client_id")),
            KeyPart::int(row.get("instructor_id")),
            KeyPart::text(row.get("start_date")),
            KeyPart::text(row.get("end_date")),
            KeyPart::int(row.get("plan_id")),
        ]
    }

    async fn insert(&self, conn: &mut SqliteConnection) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO workouts (client_id, instructor_id, start_date, end_date, plan_id)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(self.client_id)
        .bind(self.instructor_id)
        .bind(self.start_date)
        .bind(self.end_date)
        .bind(self.plan_id)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorkoutExerciseRecord {
    pub workout_id: i64,
    pub exercise_id: i64,
    pub sets: i64,
    pub reps: i64,
}

impl ImportRecord for WorkoutExerciseRecord {
    const TABLE: &'static str = "workout_exercises";

    fn natural_key(&self) -> NaturalKey {
        vec![
            KeyPart::int(self.workout_id),
            KeyPart::int(self.exercise_id),
            KeyPart::int(self.sets),
            KeyPart::int(self.reps),
        ]
    }

    fn persisted_key_sql() -> &'static str {
        "SELECT workout_id, exercise_id, sets, reps FROM workout_exercises"
    }

    fn key_from_row(row: &sqlx::sqlite::SqliteRow) -> NaturalKey {
        vec![
            KeyPart::int(row.get("workout_id")),
            KeyPart::int(row.get("exercise_id")),
            KeyPart::int(row.get("sets")),
            KeyPart::int(row.get("reps")),
        ]
    }

    async fn insert(&self, conn: &mut SqliteConnection) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO workout_exercises (workout_id, exercise_id, sets, reps)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(self.workout_id)
        .bind(self.exercise_id)
        .bind(self.sets)
        .bind(self.reps)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaymentRecord {
    pub client_id: i64,
    pub payment_date: NaiveDate,
    pub amount: f64,
    pub plan_id: i64,
}

impl ImportRecord for PaymentRecord {
    const TABLE: &'static str = "payments";

    fn natural_key(&self) -> NaturalKey {
        vec![
            KeyPart::int(self.client_id),
            KeyPart::text(&self.payment_date.to_string()),
            KeyPart::real(self.amount),
            KeyPart::int(self.plan_id),
        ]
    }

    fn persisted_key_sql() -> &'static str {
        "SELECT client_id, payment_date, amount, plan_id FROM payments"
    }

    fn key_from_row(row: &sqlx::sqlite::SqliteRow) -> NaturalKey {
        vec![
            KeyPart::int(row.get("client_id")),
            KeyPart::text(row.get("payment_date")),
            KeyPart::real(row.get("amount")),
            KeyPart::int(row.get("plan_id")),
        ]
    }

    async fn insert(&self, conn: &mut SqliteConnection) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO payments (client_id, payment_date, amount, plan_id)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(self.client_id)
        .bind(self.payment_date)
        .bind(self.amount)
        .bind(self.plan_id)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Seed-file loading
// ---------------------------------------------------------------------------

/// Parse one seed file into typed records
pub fn load_records<R: DeserializeOwned>(path: &Path) -> DomainResult<Vec<R>> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| DomainError::validation("file", format!("{}: {}", path.display(), e)))?;

    let mut records = Vec::new();
    for result in reader.deserialize() {
        let record: R = result
            .map_err(|e| DomainError::validation("record", format!("{}: {}", path.display(), e)))?;
        records.push(record);
    }
    Ok(records)
}

async fn import_file<R>(db: &DbConnection, dir: &Path, file_name: &str)
where
    R: ImportRecord + DeserializeOwned,
{
    let path = dir.join(file_name);
    if !path.exists() {
        info!("seed file {} not present, skipping", path.display());
        return;
    }

    let batch: Vec<R> = match load_records(&path) {
        Ok(batch) => batch,
        Err(e) => {
            error!("skipping {}: {}", R::TABLE, e);
            return;
        }
    };
    let total = batch.len();

    match reconcile(db, batch).await {
        Ok(inserted) => info!(
            "{}: {} of {} records were new",
            R::TABLE,
            inserted.len(),
            total
        ),
        Err(e) => error!("skipping {}: {}", R::TABLE, e),
    }
}

/// Import every seed file found in `dir`, in foreign-key order.
///
/// A failed batch is logged and skipped; the remaining batches still run.
pub async fn run_seed_import(db: &DbConnection, dir: &Path) {
    info!("Importing seed records from {}", dir.display());

    import_file::<InstructorRecord>(db, dir, "instructors.csv").await;
    import_file::<PlanRecord>(db, dir, "plans.csv").await;
    import_file::<ExerciseRecord>(db, dir, "exercises.csv").await;
    import_file::<ClientRecord>(db, dir, "clients.csv").await;
    import_file::<WorkoutRecord>(db, dir, "workouts.csv").await;
    import_file::<WorkoutExerciseRecord>(db, dir, "workout_exercises.csv").await;
    import_file::<PaymentRecord>(db, dir, "payments.csv").await;
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test() -> DbConnection {
        DbConnection::init_test().await.expect("Failed to create test database")
    }

    fn plan(name: &str, price: f64, months: i64) -> PlanRecord {
        PlanRecord {
            name: name.to_string(),
            monthly_price: price,
            duration_months: months,
        }
    }

    #[tokio::test]
    async fn test_reconcile_inserts_new_records() {
        let db = setup_test().await;

        let batch = vec![plan("Basic", 80.0, 1), plan("Gold", 120.0, 6)];
        let inserted = reconcile(&db, batch).await.expect("reconcile failed");
        assert_eq!(inserted.len(), 2);
    }

    #[tokio::test]
    async fn test_reconcile_is_idempotent() {
        let db = setup_test().await;

        let batch = vec![plan("Basic", 80.0, 1), plan("Gold", 120.0, 6)];
        let first = reconcile(&db, batch.clone()).await.expect("first run failed");
        assert_eq!(first.len(), 2);

        // The identical batch a second time inserts nothing
        let second = reconcile(&db, batch).await.expect("second run failed");
        assert!(second.is_empty());

        let row = sqlx::query("SELECT COUNT(*) AS n FROM plans")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(row.get::<i64, _>("n"), 2);
    }

    #[tokio::test]
    async fn test_intra_batch_duplicates_keep_first_occurrence() {
        let db = setup_test().await;

        let batch = vec![
            InstructorRecord {
                name: "Carla".to_string(),
                specialty: "crossfit".to_string(),
            },
            InstructorRecord {
                name: "Carla".to_string(),
                specialty: "crossfit".to_string(),
            },
            InstructorRecord {
                name: "Carla".to_string(),
                specialty: "pilates".to_string(),
            },
        ];

        let inserted = reconcile(&db, batch).await.expect("reconcile failed");
        // Same (name, specialty) pair collapses; a different specialty does not
        assert_eq!(inserted.len(), 2);
    }

    #[tokio::test]
    async fn test_value_equality_never_updates_existing_rows() {
        let db = setup_test().await;

        reconcile(&db, vec![plan("Gold", 120.0, 6)]).await.unwrap();

        // Same natural key: silently discarded, not upserted
        let again = reconcile(&db, vec![plan("Gold", 120.0, 6)]).await.unwrap();
        assert!(again.is_empty());

        // A different price is a different natural key and a new row
        let repriced = reconcile(&db, vec![plan("Gold", 135.0, 6)]).await.unwrap();
        assert_eq!(repriced.len(), 1);

        let rows = sqlx::query("SELECT monthly_price FROM plans WHERE name = 'Gold' ORDER BY id")
            .fetch_all(db.pool())
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get::<f64, _>("monthly_price"), 120.0);
    }

    #[tokio::test]
    async fn test_client_dedup_key_is_email_only() {
        let db = setup_test().await;

        reconcile(&db, vec![plan("Basic", 80.0, 1)]).await.unwrap();
        reconcile(
            &db,
            vec![InstructorRecord {
                name: "Carla".to_string(),
                specialty: "crossfit".to_string(),
            }],
        )
        .await
        .unwrap();

        let ana = ClientRecord {
            name: "Ana".to_string(),
            age: 29,
            sex: "F".to_string(),
            email: "ana@example.com".to_string(),
            phone: "555-0100".to_string(),
            plan_id: 1,
            instructor_id: 1,
        };
        let mut renamed = ana.clone();
        renamed.name = "Ana Paula".to_string();

        let first = reconcile(&db, vec![ana]).await.unwrap();
        assert_eq!(first.len(), 1);

        // Same email with different non-key columns is discarded, and the
        // stored row keeps its original values
        let second = reconcile(&db, vec![renamed]).await.unwrap();
        assert!(second.is_empty());

        let row = sqlx::query("SELECT name FROM clients WHERE email = 'ana@example.com'")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(row.get::<String, _>("name"), "Ana");
    }
}
