use shared::CreateExerciseRequest;
use tracing::info;

use crate::db::DbConnection;
use crate::error::{is_unique_violation, DomainError, DomainResult};
use crate::storage::ExerciseRepository;

/// Service for the exercise catalog
#[derive(Clone)]
pub struct ExerciseService {
    db: DbConnection,
    exercises: ExerciseRepository,
}

impl ExerciseService {
    pub fn new(db: DbConnection) -> Self {
        let exercises = ExerciseRepository::new(db.clone());
        Self { db, exercises }
    }

    /// Add an exercise to the catalog. The natural key is the
    /// (name, muscle group) pair, so the same movement may appear once per
    /// muscle group.
    pub async fn create_exercise(&self, request: CreateExerciseRequest) -> DomainResult<i64> {
        info!(
            "Creating exercise: name={}, muscle_group={}",
            request.name, request.muscle_group
        );

        let name = request.name.trim();
        let muscle_group = request.muscle_group.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name", "must not be empty"));
        }
        if muscle_group.is_empty() {
            return Err(DomainError::validation("muscle_group", "must not be empty"));
        }

        let mut tx = self.db.pool().begin().await?;

        if ExerciseRepository::pair_exists(&mut tx, name, muscle_group).await? {
            return Err(DomainError::duplicate(
                "exercise",
                format!("'{}' for {} is already registered", name, muscle_group),
            ));
        }

        let id = ExerciseRepository::insert(&mut tx, name, muscle_group)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DomainError::duplicate(
                        "exercise",
                        format!("'{}' for {} is already registered", name, muscle_group),
                    )
                } else {
                    e.into()
                }
            })?;

        tx.commit().await?;
        Ok(id)
    }

    /// List the exercise catalog for the assignment form
    pub async fn list(&self) -> DomainResult<Vec<shared::ExerciseDto>> {
        Ok(self.exercises.list().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup() -> ExerciseService {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        ExerciseService::new(db)
    }

    fn request(name: &str, muscle_group: &str) -> CreateExerciseRequest {
        CreateExerciseRequest {
            name: name.to_string(),
            muscle_group: muscle_group.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_succeeds_exactly_once_per_pair() {
        let service = setup().await;

        service.create_exercise(request("squat", "legs")).await.unwrap();

        let err = service
            .create_exercise(request("squat", "legs"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Duplicate { .. }));

        // Same movement under another muscle group is a distinct entry
        service
            .create_exercise(request("squat", "glutes"))
            .await
            .expect("distinct pair rejected");

        let listed = service.list().await.unwrap();
        assert_eq!(listed.len(), 2);
    }

    #[tokio::test]
    async fn test_blank_fields_are_validation_errors() {
        let service = setup().await;

        let err = service.create_exercise(request("  ", "legs")).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "name", .. }));

        let err = service.create_exercise(request("squat", "")).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation {
                field: "muscle_group",
                ..
            }
        ));
    }
}
