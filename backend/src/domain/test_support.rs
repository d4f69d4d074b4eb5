//! Seed helpers shared by the service and report tests.

use chrono::NaiveDate;

use crate::db::DbConnection;

pub async fn seed_plan(db: &DbConnection, name: &str, monthly_price: f64, duration_months: i64) -> i64 {
    sqlx::query("INSERT INTO plans (name, monthly_price, duration_months) VALUES (?, ?, ?)")
        .bind(name)
        .bind(monthly_price)
        .bind(duration_months)
        .execute(db.pool())
        .await
        .expect("Failed to seed plan")
        .last_insert_rowid()
}

pub async fn seed_instructor(db: &DbConnection, name: &str, specialty: &str) -> i64 {
    sqlx::query("INSERT INTO instructors (name, specialty) VALUES (?, ?)")
        .bind(name)
        .bind(specialty)
        .execute(db.pool())
        .await
        .expect("Failed to seed instructor")
        .last_insert_rowid()
}

pub async fn seed_exercise(db: &DbConnection, name: &str, muscle_group: &str) -> i64 {
    sqlx::query("INSERT INTO exercises (name, muscle_group) VALUES (?, ?)")
        .bind(name)
        .bind(muscle_group)
        .execute(db.pool())
        .await
        .expect("Failed to seed exercise")
        .last_insert_rowid()
}

pub async fn seed_client(
    db: &DbConnection,
    name: &str,
    email: &str,
    plan_id: i64,
    instructor_id: i64,
) -> i64 {
    sqlx::query(
        r#"
        INSERT INTO clients (name, age, sex, email, phone, plan_id, instructor_id)
        VALUES (?, 30, 'F', ?, '555-0000', ?, ?)
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(plan_id)
    .bind(instructor_id)
    .execute(db.pool())
    .await
    .expect("Failed to seed client")
    .last_insert_rowid()
}

pub async fn seed_payment(
    db: &DbConnection,
    client_id: i64,
    date: NaiveDate,
    amount: f64,
    plan_id: i64,
) -> i64 {
    sqlx::query("INSERT INTO payments (client_id, payment_date, amount, plan_id) VALUES (?, ?, ?, ?)")
        .bind(client_id)
        .bind(date)
        .bind(amount)
        .bind(plan_id)
        .execute(db.pool())
        .await
        .expect("Failed to seed payment")
        .last_insert_rowid()
}

pub async fn seed_workout(
    db: &DbConnection,
    client_id: i64,
    instructor_id: i64,
    start: NaiveDate,
    end: NaiveDate,
    plan_id: i64,
) -> i64 {
    sqlx::query(
        r#"
        INSERT INTO workouts (client_id, instructor_id, start_date, end_date, plan_id)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(client_id)
    .bind(instructor_id)
    .bind(start)
    .bind(end)
    .bind(plan_id)
    .execute(db.pool())
    .await
    .expect("Failed to seed workout")
    .last_insert_rowid()
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("bad test date")
}
