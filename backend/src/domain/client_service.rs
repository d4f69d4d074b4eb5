use shared::CreateClientRequest;
use tracing::info;

use crate::db::DbConnection;
use crate::error::{is_unique_violation, DomainError, DomainResult};
use crate::storage::{ClientRepository, InstructorRepository, NewClient, PlanRepository};

/// Service for registering and listing clients
#[derive(Clone)]
pub struct ClientService {
    db: DbConnection,
    clients: ClientRepository,
}

impl ClientService {
    pub fn new(db: DbConnection) -> Self {
        let clients = ClientRepository::new(db.clone());
        Self { db, clients }
    }

    /// Register a new client.
    ///
    /// Plan and instructor are resolved by name before the insert; a client
    /// whose name or email is already registered is rejected with a message
    /// naming the colliding field. Registration inserts the client row only;
    /// workouts are created explicitly, never as a side effect.
    pub async fn create_client(&self, request: CreateClientRequest) -> DomainResult<i64> {
        info!(
            "Registering client: name={}, email={}",
            request.name, request.email
        );

        let name = request.name.trim();
        let email = request.email.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name", "must not be empty"));
        }
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::validation(
                "email",
                format!("'{}' is not a valid address", request.email),
            ));
        }
        if request.age < 1 {
            return Err(DomainError::validation("age", "must be at least 1"));
        }

        let mut tx = self.db.pool().begin().await?;

        let plan = PlanRepository::find_by_name(&mut tx, request.plan.trim())
            .await?
            .ok_or_else(|| DomainError::unresolved("plan", request.plan.trim()))?;
        let instructor = InstructorRepository::find_by_name(&mut tx, request.instructor.trim())
            .await?
            .ok_or_else(|| DomainError::unresolved("instructor", request.instructor.trim()))?;

        if ClientRepository::name_exists(&mut tx, name).await? {
            return Err(DomainError::duplicate(
                "client",
                format!("name '{}' is already registered", name),
            ));
        }
        if ClientRepository::email_exists(&mut tx, email).await? {
            return Err(DomainError::duplicate(
                "client",
                format!("email '{}' is already registered", email),
            ));
        }

        let new_client = NewClient {
            name,
            age: request.age,
            sex: request.sex.trim(),
            email,
            phone: request.phone.trim(),
            plan_id: plan.id,
            instructor_id: instructor.id,
        };
        let id = ClientRepository::insert(&mut tx, &new_client)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DomainError::duplicate(
                        "client",
                        format!("email '{}' is already registered", email),
                    )
                } else {
                    e.into()
                }
            })?;

        tx.commit().await?;
        info!("Registered client '{}' with id {}", name, id);
        Ok(id)
    }

    /// List all clients for the dashboard tables
    pub async fn list(&self) -> DomainResult<Vec<shared::ClientDto>> {
        Ok(self.clients.list().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::{seed_instructor, seed_plan};
    use crate::error::DomainError;

    async fn setup() -> (DbConnection, ClientService) {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        seed_plan(&db, "Gold", 120.0, 6).await;
        seed_instructor(&db, "Carla", "crossfit").await;
        let service = ClientService::new(db.clone());
        (db, service)
    }

    fn request(name: &str, email: &str) -> CreateClientRequest {
        CreateClientRequest {
            name: name.to_string(),
            age: 29,
            sex: "F".to_string(),
            email: email.to_string(),
            phone: "555-0100".to_string(),
            plan: "Gold".to_string(),
            instructor: "Carla".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_client() {
        let (_db, service) = setup().await;

        let id = service
            .create_client(request("Ana", "ana@example.com"))
            .await
            .expect("create failed");
        assert!(id > 0);

        let listed = service.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Ana");
        assert_eq!(listed[0].plan, "Gold");
        assert_eq!(listed[0].instructor, "Carla");
    }

    #[tokio::test]
    async fn test_duplicate_name_and_email_name_the_colliding_field() {
        let (_db, service) = setup().await;
        service
            .create_client(request("Ana", "ana@example.com"))
            .await
            .unwrap();

        let err = service
            .create_client(request("Ana", "other@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Duplicate { .. }));
        assert!(err.to_string().contains("name 'Ana'"));

        let err = service
            .create_client(request("Beatriz", "ana@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Duplicate { .. }));
        assert!(err.to_string().contains("email 'ana@example.com'"));
    }

    #[tokio::test]
    async fn test_unresolved_plan_writes_no_row() {
        let (db, service) = setup().await;

        let mut bad = request("Ana", "ana@example.com");
        bad.plan = "Platinum".to_string();
        let err = service.create_client(bad).await.unwrap_err();
        assert!(matches!(err, DomainError::UnresolvedReference { .. }));
        assert!(err.to_string().contains("Platinum"));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clients")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_unresolved_instructor_is_rejected() {
        let (_db, service) = setup().await;

        let mut bad = request("Ana", "ana@example.com");
        bad.instructor = "Nobody".to_string();
        let err = service.create_client(bad).await.unwrap_err();
        assert!(matches!(err, DomainError::UnresolvedReference { .. }));
    }

    #[tokio::test]
    async fn test_non_positive_age_is_rejected() {
        let (_db, service) = setup().await;

        let mut bad = request("Ana", "ana@example.com");
        bad.age = 0;
        let err = service.create_client(bad).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "age", .. }));
    }
}
