//! Domain layer: entity services, aggregate reports, and the credential
//! store. Services own the business invariants; all SQL lives in the
//! storage repositories.

pub mod auth_service;
pub mod client_service;
pub mod exercise_service;
pub mod models;
pub mod payment_service;
pub mod report_service;
pub mod workout_service;

#[cfg(test)]
pub mod test_support;

pub use auth_service::AuthService;
pub use client_service::ClientService;
pub use exercise_service::ExerciseService;
pub use payment_service::PaymentService;
pub use report_service::ReportService;
pub use workout_service::WorkoutService;
