use serde::{Deserialize, Serialize};

/// Machine-checkable outcome discriminator for form submissions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandStatus {
    Success,
    Error,
}

/// Structured result returned for every mutating operation.
///
/// Every form submission yields one of these: a status the caller can branch
/// on, a human-readable message naming the offending field or value on
/// failure, and the created row's key on success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResult {
    pub status: CommandStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl CommandResult {
    pub fn success(message: impl Into<String>, id: Option<i64>) -> Self {
        Self {
            status: CommandStatus::Success,
            message: message.into(),
            id,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::Error,
            message: message.into(),
            id: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == CommandStatus::Success
    }
}

// ---------------------------------------------------------------------------
// Form requests
// ---------------------------------------------------------------------------

/// New-client form. Plan and instructor are referenced by name and resolved
/// by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateClientRequest {
    pub name: String,
    pub age: i64,
    pub sex: String,
    pub email: String,
    pub phone: String,
    pub plan: String,
    pub instructor: String,
}

/// New-payment form. The amount is not submitted: it is the named plan's
/// current monthly price at the time of payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePaymentRequest {
    pub client: String,
    pub plan: String,
    /// Payment date, `YYYY-MM-DD`.
    pub date: String,
}

/// New-workout form. Instructor and plan are inherited from the client
/// record; the end date is derived from the plan duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateWorkoutRequest {
    pub client: String,
    /// Start date, `YYYY-MM-DD`.
    pub start_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateExerciseRequest {
    pub name: String,
    pub muscle_group: String,
}

/// Attach an exercise to an existing workout with a set/rep prescription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignExerciseRequest {
    pub exercise: String,
    pub sets: i64,
    pub reps: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// ---------------------------------------------------------------------------
// Listing DTOs (form dropdowns and tables)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientDto {
    pub id: i64,
    pub name: String,
    pub age: i64,
    pub sex: String,
    pub email: String,
    pub phone: String,
    pub plan: String,
    pub instructor: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstructorDto {
    pub id: i64,
    pub name: String,
    pub specialty: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDto {
    pub id: i64,
    pub name: String,
    pub monthly_price: f64,
    pub duration_months: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseDto {
    pub id: i64,
    pub name: String,
    pub muscle_group: String,
}

/// One workout of a client, as offered by the assign-exercise form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutDto {
    pub id: i64,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentDto {
    pub id: i64,
    pub client: String,
    pub payment_date: String,
    pub amount: f64,
    pub plan: String,
}

// ---------------------------------------------------------------------------
// Report rows
// ---------------------------------------------------------------------------

/// Revenue total for one calendar month, keyed `YYYY-MM`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRevenueRow {
    pub month: String,
    pub total: f64,
}

/// Client count per instructor, including the sentinel group for clients
/// whose instructor reference does not resolve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstructorClientsRow {
    pub instructor: String,
    pub clients: i64,
}

/// Per-client payment summary. `total_paid` is zero for clients without
/// payments; `last_payment_date` is absent rather than a sentinel date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSummaryRow {
    pub client_id: i64,
    pub client_name: String,
    pub total_paid: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_payment_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopPlanRow {
    pub plan: String,
    pub clients: i64,
}

/// One line of the training schedule: a workout joined to one of its
/// exercises. Labels are computed from the joined rows, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingScheduleRow {
    pub client: String,
    pub instructor: String,
    pub start_date: String,
    pub end_date: String,
    pub exercise: String,
    pub sets: i64,
    pub reps: i64,
}

/// Dashboard KPI scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// Total registered clients.
    pub total_clients: i64,
    /// Total distinct plans on offer.
    pub total_plans: i64,
    /// Count of payments recorded in the current calendar month.
    pub payments_this_month: i64,
    /// Mean client age; zero when no clients are registered.
    pub mean_age: f64,
    /// Clients with a workout ending on or after today.
    pub active_clients: i64,
    /// Clients with a workout starting within the trailing 30 days.
    pub new_clients_30_days: i64,
    /// Revenue summed over the current calendar month.
    pub revenue_this_month: f64,
    /// Plan with the most clients, if any clients exist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_plan: Option<TopPlanRow>,
}
