use chrono::NaiveDate;
use sqlx::{Row, SqliteConnection};

use crate::db::DbConnection;

/// Repository for payment operations
#[derive(Clone)]
pub struct PaymentRepository {
    db: DbConnection,
}

impl PaymentRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// True if the client already has a payment on this date.
    ///
    /// One payment per client per calendar date, regardless of plan or
    /// amount; the store's natural key is wider than this rule.
    pub async fn exists_for_date(
        conn: &mut SqliteConnection,
        client_id: i64,
        date: NaiveDate,
    ) -> sqlx::Result<bool> {
        let row = sqlx::query("SELECT 1 FROM payments WHERE client_id = ? AND payment_date = ?")
            .bind(client_id)
            .bind(date)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row.is_some())
    }

    pub async fn insert(
        conn: &mut SqliteConnection,
        client_id: i64,
        date: NaiveDate,
        amount: f64,
        plan_id: i64,
    ) -> sqlx::Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO payments (client_id, payment_date, amount, plan_id)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(client_id)
        .bind(date)
        .bind(amount)
        .bind(plan_id)
        .execute(&mut *conn)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// List all payments with client and plan names resolved, newest first
    pub async fn list(&self) -> sqlx::Result<Vec<shared::PaymentDto>> {
        let rows = sqlx::query(
            r#"
            SELECT p.id, COALESCE(c.name, '') AS client, p.payment_date, p.amount,
                   COALESCE(pl.name, '') AS plan
            FROM payments p
            LEFT JOIN clients c ON p.client_id = c.id
            LEFT JOIN plans pl ON p.plan_id = pl.id
            ORDER BY p.payment_date DESC, p.id DESC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows
            .iter()
            .map(|row| shared::PaymentDto {
                id: row.get("id"),
                client: row.get("client"),
                payment_date: row.get::<NaiveDate, _>("payment_date").to_string(),
                amount: row.get("amount"),
                plan: row.get("plan"),
            })
            .collect())
    }
}
