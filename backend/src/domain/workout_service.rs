use chrono::Months;
use shared::{AssignExerciseRequest, CreateWorkoutRequest};
use tracing::info;

use crate::db::DbConnection;
use crate::domain::payment_service::parse_date;
use crate::error::{is_unique_violation, DomainError, DomainResult};
use crate::storage::{
    ClientRepository, ExerciseRepository, PlanRepository, WorkoutRepository,
};

/// Service for creating workouts and attaching exercises to them
#[derive(Clone)]
pub struct WorkoutService {
    db: DbConnection,
    workouts: WorkoutRepository,
}

impl WorkoutService {
    pub fn new(db: DbConnection) -> Self {
        let workouts = WorkoutRepository::new(db.clone());
        Self { db, workouts }
    }

    /// Create a workout for a client.
    ///
    /// Instructor and plan are inherited from the client record, and the end
    /// date is derived once: start date plus the plan's duration in calendar
    /// months, clamping to the last valid day of the resulting month. A later
    /// plan change never recomputes existing workouts.
    pub async fn create_workout(&self, request: CreateWorkoutRequest) -> DomainResult<i64> {
        info!(
            "Creating workout: client={}, start={}",
            request.client, request.start_date
        );

        let start_date = parse_date("start_date", &request.start_date)?;

        let mut tx = self.db.pool().begin().await?;

        let client = ClientRepository::find_by_name(&mut tx, request.client.trim())
            .await?
            .ok_or_else(|| DomainError::unresolved("client", request.client.trim()))?;
        let plan = PlanRepository::find_by_id(&mut tx, client.plan_id)
            .await?
            .ok_or_else(|| DomainError::unresolved("plan", client.plan_id.to_string()))?;

        if plan.duration_months < 1 {
            return Err(DomainError::validation(
                "plan",
                format!("'{}' has no positive duration", plan.name),
            ));
        }
        let end_date = start_date
            .checked_add_months(Months::new(plan.duration_months as u32))
            .ok_or_else(|| {
                DomainError::validation("start_date", "derived end date is out of range")
            })?;

        if WorkoutRepository::period_exists(&mut tx, client.id, start_date, end_date).await? {
            return Err(DomainError::duplicate(
                "workout",
                format!(
                    "client '{}' already has a workout from {} to {}",
                    client.name, start_date, end_date
                ),
            ));
        }

        let id = WorkoutRepository::insert(
            &mut tx,
            client.id,
            client.instructor_id,
            start_date,
            end_date,
            plan.id,
        )
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::duplicate(
                    "workout",
                    format!(
                        "client '{}' already has a workout from {} to {}",
                        client.name, start_date, end_date
                    ),
                )
            } else {
                e.into()
            }
        })?;

        // First workout becomes the client's current one; later workouts
        // leave the back-reference untouched
        ClientRepository::set_first_workout(&mut tx, client.id, id).await?;

        tx.commit().await?;
        info!(
            "Created workout {} for client '{}': {} to {}",
            id, client.name, start_date, end_date
        );
        Ok(id)
    }

    /// Attach an exercise to an existing workout
    pub async fn assign_exercise(
        &self,
        workout_id: i64,
        request: AssignExerciseRequest,
    ) -> DomainResult<i64> {
        info!(
            "Assigning exercise: workout={}, exercise={}, sets={}, reps={}",
            workout_id, request.exercise, request.sets, request.reps
        );

        if request.sets < 1 {
            return Err(DomainError::validation("sets", "must be at least 1"));
        }
        if request.reps < 1 {
            return Err(DomainError::validation("reps", "must be at least 1"));
        }

        let mut tx = self.db.pool().begin().await?;

        if !WorkoutRepository::exists(&mut tx, workout_id).await? {
            return Err(DomainError::unresolved("workout", workout_id.to_string()));
        }
        let exercise = ExerciseRepository::find_by_name(&mut tx, request.exercise.trim())
            .await?
            .ok_or_else(|| DomainError::unresolved("exercise", request.exercise.trim()))?;

        if WorkoutRepository::assignment_exists(
            &mut tx,
            workout_id,
            exercise.id,
            request.sets,
            request.reps,
        )
        .await?
        {
            return Err(DomainError::duplicate(
                "assignment",
                format!(
                    "exercise '{}' with {}x{} is already in this workout",
                    exercise.name, request.sets, request.reps
                ),
            ));
        }

        let id = WorkoutRepository::insert_assignment(
            &mut tx,
            workout_id,
            exercise.id,
            request.sets,
            request.reps,
        )
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::duplicate(
                    "assignment",
                    format!(
                        "exercise '{}' with {}x{} is already in this workout",
                        exercise.name, request.sets, request.reps
                    ),
                )
            } else {
                e.into()
            }
        })?;

        tx.commit().await?;
        Ok(id)
    }

    /// A client's workouts, for the assign-exercise form
    pub async fn list_for_client(&self, client_name: &str) -> DomainResult<Vec<shared::WorkoutDto>> {
        Ok(self.workouts.list_for_client(client_name).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::{seed_client, seed_exercise, seed_instructor, seed_plan};
    use sqlx::Row;

    struct Fixture {
        db: DbConnection,
        service: WorkoutService,
        instructor_id: i64,
        plan_id: i64,
    }

    async fn setup(duration_months: i64) -> Fixture {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let plan_id = seed_plan(&db, "Gold", 120.0, duration_months).await;
        let instructor_id = seed_instructor(&db, "Carla", "crossfit").await;
        seed_client(&db, "Ana", "ana@example.com", plan_id, instructor_id).await;
        let service = WorkoutService::new(db.clone());
        Fixture {
            db,
            service,
            instructor_id,
            plan_id,
        }
    }

    fn request(client: &str, start: &str) -> CreateWorkoutRequest {
        CreateWorkoutRequest {
            client: client.to_string(),
            start_date: start.to_string(),
        }
    }

    #[tokio::test]
    async fn test_end_date_clamps_to_month_end() {
        let fx = setup(1).await;

        // 2024-01-31 plus one month lands on leap-day February 29th
        let id = fx
            .service
            .create_workout(request("Ana", "2024-01-31"))
            .await
            .expect("create failed");

        let row = sqlx::query("SELECT start_date, end_date FROM workouts WHERE id = ?")
            .bind(id)
            .fetch_one(fx.db.pool())
            .await
            .unwrap();
        assert_eq!(row.get::<String, _>("start_date"), "2024-01-31");
        assert_eq!(row.get::<String, _>("end_date"), "2024-02-29");
    }

    #[tokio::test]
    async fn test_workout_inherits_instructor_and_plan_from_client() {
        let fx = setup(6).await;

        let id = fx
            .service
            .create_workout(request("Ana", "2024-03-01"))
            .await
            .unwrap();

        let row = sqlx::query("SELECT instructor_id, plan_id, end_date FROM workouts WHERE id = ?")
            .bind(id)
            .fetch_one(fx.db.pool())
            .await
            .unwrap();
        assert_eq!(row.get::<i64, _>("instructor_id"), fx.instructor_id);
        assert_eq!(row.get::<i64, _>("plan_id"), fx.plan_id);
        assert_eq!(row.get::<String, _>("end_date"), "2024-09-01");
    }

    #[tokio::test]
    async fn test_first_workout_sets_client_back_reference_once() {
        let fx = setup(1).await;

        let first = fx
            .service
            .create_workout(request("Ana", "2024-03-01"))
            .await
            .unwrap();
        let _second = fx
            .service
            .create_workout(request("Ana", "2024-05-01"))
            .await
            .unwrap();

        let row = sqlx::query("SELECT workout_id FROM clients WHERE name = 'Ana'")
            .fetch_one(fx.db.pool())
            .await
            .unwrap();
        assert_eq!(row.get::<Option<i64>, _>("workout_id"), Some(first));
    }

    #[tokio::test]
    async fn test_duplicate_period_is_rejected() {
        let fx = setup(6).await;

        fx.service
            .create_workout(request("Ana", "2024-03-01"))
            .await
            .unwrap();
        let err = fx
            .service
            .create_workout(request("Ana", "2024-03-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn test_unknown_client_is_unresolved() {
        let fx = setup(6).await;

        let err = fx
            .service
            .create_workout(request("Nobody", "2024-03-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::UnresolvedReference { .. }));
    }

    #[tokio::test]
    async fn test_assign_exercise_to_workout() {
        let fx = setup(6).await;
        seed_exercise(&fx.db, "squat", "legs").await;

        let workout_id = fx
            .service
            .create_workout(request("Ana", "2024-03-01"))
            .await
            .unwrap();

        let assignment = AssignExerciseRequest {
            exercise: "squat".to_string(),
            sets: 3,
            reps: 10,
        };
        fx.service
            .assign_exercise(workout_id, assignment.clone())
            .await
            .expect("assignment failed");

        // The identical tuple is a duplicate
        let err = fx
            .service
            .assign_exercise(workout_id, assignment)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Duplicate { .. }));

        // A different prescription of the same exercise is a distinct row
        fx.service
            .assign_exercise(
                workout_id,
                AssignExerciseRequest {
                    exercise: "squat".to_string(),
                    sets: 4,
                    reps: 8,
                },
            )
            .await
            .expect("distinct prescription rejected");
    }

    #[tokio::test]
    async fn test_assign_exercise_requires_existing_references() {
        let fx = setup(6).await;
        seed_exercise(&fx.db, "squat", "legs").await;

        let err = fx
            .service
            .assign_exercise(
                99,
                AssignExerciseRequest {
                    exercise: "squat".to_string(),
                    sets: 3,
                    reps: 10,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::UnresolvedReference { .. }));

        let workout_id = fx
            .service
            .create_workout(request("Ana", "2024-03-01"))
            .await
            .unwrap();
        let err = fx
            .service
            .assign_exercise(
                workout_id,
                AssignExerciseRequest {
                    exercise: "deadlift".to_string(),
                    sets: 3,
                    reps: 10,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::UnresolvedReference { .. }));
    }
}
