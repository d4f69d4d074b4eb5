use sqlx::{Row, SqliteConnection};

use crate::db::DbConnection;
use crate::domain::models::Plan;

/// Repository for plan lookups
#[derive(Clone)]
pub struct PlanRepository {
    db: DbConnection,
}

fn map_plan(row: &sqlx::sqlite::SqliteRow) -> Plan {
    Plan {
        id: row.get("id"),
        name: row.get("name"),
        monthly_price: row.get("monthly_price"),
        duration_months: row.get("duration_months"),
    }
}

impl PlanRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// List all plans ordered by name
    pub async fn list(&self) -> sqlx::Result<Vec<shared::PlanDto>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, monthly_price, duration_months
            FROM plans
            ORDER BY name ASC, id ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows
            .iter()
            .map(|row| shared::PlanDto {
                id: row.get("id"),
                name: row.get("name"),
                monthly_price: row.get("monthly_price"),
                duration_months: row.get("duration_months"),
            })
            .collect())
    }

    /// Resolve a plan by name. Names are not unique on their own (the
    /// natural key is name + price + duration), so the oldest match wins.
    pub async fn find_by_name(
        conn: &mut SqliteConnection,
        name: &str,
    ) -> sqlx::Result<Option<Plan>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, monthly_price, duration_months
            FROM plans
            WHERE name = ?
            ORDER BY id ASC
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row.as_ref().map(map_plan))
    }

    pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> sqlx::Result<Option<Plan>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, monthly_price, duration_months
            FROM plans
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row.as_ref().map(map_plan))
    }
}
