//! SQLite repositories, one per entity.
//!
//! Reads that feed listings run against the shared pool; every check or
//! write that participates in a service transaction takes the transaction's
//! connection instead, so check-then-insert sequences stay atomic.

pub mod clients;
pub mod exercises;
pub mod instructors;
pub mod payments;
pub mod plans;
pub mod users;
pub mod workouts;

pub use clients::{ClientRepository, NewClient};
pub use exercises::ExerciseRepository;
pub use instructors::InstructorRepository;
pub use payments::PaymentRepository;
pub use plans::PlanRepository;
pub use users::UserRepository;
pub use workouts::WorkoutRepository;
