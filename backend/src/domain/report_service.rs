//! Read-only aggregate queries feeding the dashboard.
//!
//! Every operation is a single SELECT against the shared pool; reports run
//! concurrently with each other and with writes at the store's default
//! isolation. KPI queries take `today` as a parameter so callers (and tests)
//! control what "current month" means.

use chrono::{Duration, NaiveDate};
use shared::{
    DashboardSummary, InstructorClientsRow, MonthlyRevenueRow, PaymentSummaryRow, TopPlanRow,
    TrainingScheduleRow,
};
use sqlx::Row;

use crate::db::DbConnection;
use crate::error::DomainResult;

/// Group label for clients whose instructor reference does not resolve.
const UNASSIGNED_INSTRUCTOR: &str = "no instructor assigned";

#[derive(Clone)]
pub struct ReportService {
    db: DbConnection,
}

impl ReportService {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Names of all clients on the named plan, alphabetical
    pub async fn clients_by_plan(&self, plan_name: &str) -> DomainResult<Vec<String>> {
        let rows = sqlx::query(
            r#"
            SELECT c.name
            FROM clients c
            JOIN plans p ON c.plan_id = p.id
            WHERE p.name = ?
            ORDER BY c.name ASC
            "#,
        )
        .bind(plan_name)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(|row| row.get("name")).collect())
    }

    /// Workouts led by the named instructor.
    ///
    /// This counts workout rows, not distinct clients: a client with two
    /// training periods under the same instructor counts twice.
    pub async fn instructor_workload(&self, instructor_name: &str) -> DomainResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM workouts w
            JOIN instructors i ON w.instructor_id = i.id
            WHERE i.name = ?
            "#,
        )
        .bind(instructor_name)
        .fetch_one(self.db.pool())
        .await?;

        Ok(count)
    }

    /// Client counts grouped by instructor. Left-join semantics: clients
    /// whose instructor reference does not resolve are grouped under a
    /// sentinel label rather than dropped.
    pub async fn clients_by_instructor(&self) -> DomainResult<Vec<InstructorClientsRow>> {
        let rows = sqlx::query(
            r#"
            SELECT COALESCE(i.name, ?) AS instructor, COUNT(*) AS clients
            FROM clients c
            LEFT JOIN instructors i ON c.instructor_id = i.id
            GROUP BY instructor
            ORDER BY instructor ASC
            "#,
        )
        .bind(UNASSIGNED_INSTRUCTOR)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows
            .iter()
            .map(|row| InstructorClientsRow {
                instructor: row.get("instructor"),
                clients: row.get("clients"),
            })
            .collect())
    }

    /// Payment totals per client. Every client appears, including those with
    /// no payments: their total is zero and their last payment date absent.
    pub async fn payment_summary(&self) -> DomainResult<Vec<PaymentSummaryRow>> {
        let rows = sqlx::query(
            r#"
            SELECT c.id AS client_id,
                   c.name AS client_name,
                   COALESCE(SUM(p.amount), 0.0) AS total_paid,
                   MAX(p.payment_date) AS last_payment_date
            FROM clients c
            LEFT JOIN payments p ON p.client_id = c.id
            GROUP BY c.id, c.name
            ORDER BY c.id ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows
            .iter()
            .map(|row| PaymentSummaryRow {
                client_id: row.get("client_id"),
                client_name: row.get("client_name"),
                total_paid: row.get("total_paid"),
                last_payment_date: row.get("last_payment_date"),
            })
            .collect())
    }

    /// Revenue per calendar month, ascending. Only months with at least one
    /// payment appear; zero-months are never synthesized.
    pub async fn monthly_revenue(&self) -> DomainResult<Vec<MonthlyRevenueRow>> {
        let rows = sqlx::query(
            r#"
            SELECT strftime('%Y-%m', payment_date) AS month, SUM(amount) AS total
            FROM payments
            GROUP BY month
            ORDER BY month ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows
            .iter()
            .map(|row| MonthlyRevenueRow {
                month: row.get("month"),
                total: row.get("total"),
            })
            .collect())
    }

    /// The plan with the most clients. Ties break to the lexicographically
    /// smallest plan name, so repeated calls agree.
    pub async fn top_plan(&self) -> DomainResult<Option<TopPlanRow>> {
        let row = sqlx::query(
            r#"
            SELECT p.name AS plan, COUNT(*) AS clients
            FROM clients c
            JOIN plans p ON c.plan_id = p.id
            GROUP BY p.id, p.name
            ORDER BY clients DESC, p.name ASC, p.id ASC
            LIMIT 1
            "#,
        )
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(|r| TopPlanRow {
            plan: r.get("plan"),
            clients: r.get("clients"),
        }))
    }

    /// Training schedule: workouts joined to their exercises, optionally
    /// filtered by client. Labels come from the joined rows at read time.
    pub async fn training_schedule(
        &self,
        client_name: Option<&str>,
    ) -> DomainResult<Vec<TrainingScheduleRow>> {
        let base = r#"
            SELECT c.name AS client,
                   i.name AS instructor,
                   w.start_date,
                   w.end_date,
                   e.name AS exercise,
                   we.sets,
                   we.reps
            FROM workout_exercises we
            JOIN workouts w ON we.workout_id = w.id
            JOIN clients c ON w.client_id = c.id
            JOIN instructors i ON w.instructor_id = i.id
            JOIN exercises e ON we.exercise_id = e.id
        "#;

        let rows = match client_name {
            Some(name) => {
                let sql = format!(
                    "{} WHERE c.name = ? ORDER BY c.name, w.start_date, e.name",
                    base
                );
                sqlx::query(&sql).bind(name).fetch_all(self.db.pool()).await?
            }
            None => {
                let sql = format!("{} ORDER BY c.name, w.start_date, e.name", base);
                sqlx::query(&sql).fetch_all(self.db.pool()).await?
            }
        };

        Ok(rows
            .iter()
            .map(|row| TrainingScheduleRow {
                client: row.get("client"),
                instructor: row.get("instructor"),
                start_date: row.get::<NaiveDate, _>("start_date").to_string(),
                end_date: row.get::<NaiveDate, _>("end_date").to_string(),
                exercise: row.get("exercise"),
                sets: row.get("sets"),
                reps: row.get("reps"),
            })
            .collect())
    }

    /// Dashboard KPI scalars, computed against the given current date
    pub async fn dashboard(&self, today: NaiveDate) -> DomainResult<DashboardSummary> {
        let pool = self.db.pool();
        let current_month = today.format("%Y-%m").to_string();

        let total_clients: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clients")
            .fetch_one(pool)
            .await?;
        let total_plans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM plans")
            .fetch_one(pool)
            .await?;
        let payments_this_month: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM payments WHERE strftime('%Y-%m', payment_date) = ?",
        )
        .bind(&current_month)
        .fetch_one(pool)
        .await?;
        let mean_age: f64 = sqlx::query_scalar("SELECT COALESCE(AVG(age), 0.0) FROM clients")
            .fetch_one(pool)
            .await?;
        let active_clients: i64 = sqlx::query_scalar(
            "SELECT COUNT(DISTINCT client_id) FROM workouts WHERE end_date >= ?",
        )
        .bind(today)
        .fetch_one(pool)
        .await?;
        let new_clients_30_days: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(DISTINCT client_id)
            FROM workouts
            WHERE start_date >= ? AND start_date <= ?
            "#,
        )
        .bind(today - Duration::days(30))
        .bind(today)
        .fetch_one(pool)
        .await?;
        let revenue_this_month: f64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0.0) FROM payments WHERE strftime('%Y-%m', payment_date) = ?",
        )
        .bind(&current_month)
        .fetch_one(pool)
        .await?;

        Ok(DashboardSummary {
            total_clients,
            total_plans,
            payments_this_month,
            mean_age,
            active_clients,
            new_clients_30_days,
            revenue_this_month,
            top_plan: self.top_plan().await?,
        })
    }
}
