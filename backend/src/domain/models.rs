//! Domain models for the gym's record entities.
//!
//! All rows are identified by an opaque auto-assigned integer key. Business
//! uniqueness lives in the natural keys enforced by the store schema.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub age: i64,
    pub sex: String,
    pub email: String,
    pub phone: String,
    pub plan_id: i64,
    pub instructor_id: i64,
    /// Weak back-reference to the client's first workout. Lookup only: set
    /// once after the first workout is created, never lifecycle-controlling.
    pub workout_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instructor {
    pub id: i64,
    pub name: String,
    pub specialty: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: i64,
    pub name: String,
    pub monthly_price: f64,
    pub duration_months: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    pub muscle_group: String,
}
