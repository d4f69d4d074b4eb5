use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use shared::{
    AssignExerciseRequest, CommandResult, CreateClientRequest, CreateExerciseRequest,
    CreatePaymentRequest, CreateWorkoutRequest, LoginRequest, RegisterRequest,
};
use tracing::info;

use crate::db::DbConnection;
use crate::domain::{
    AuthService, ClientService, ExerciseService, PaymentService, ReportService, WorkoutService,
};
use crate::error::DomainError;
use crate::storage::{InstructorRepository, PlanRepository};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub clients: ClientService,
    pub payments: PaymentService,
    pub workouts: WorkoutService,
    pub exercises: ExerciseService,
    pub reports: ReportService,
    pub auth: AuthService,
    pub instructors: InstructorRepository,
    pub plans: PlanRepository,
}

impl AppState {
    /// Wire every service onto one shared store handle
    pub fn new(db: DbConnection) -> Self {
        Self {
            clients: ClientService::new(db.clone()),
            payments: PaymentService::new(db.clone()),
            workouts: WorkoutService::new(db.clone()),
            exercises: ExerciseService::new(db.clone()),
            reports: ReportService::new(db.clone()),
            auth: AuthService::new(db.clone()),
            instructors: InstructorRepository::new(db.clone()),
            plans: PlanRepository::new(db),
        }
    }
}

/// The full API surface under /api
pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/clients", post(create_client).get(list_clients))
        .route("/clients/:name/workouts", get(list_client_workouts))
        .route("/instructors", get(list_instructors))
        .route("/plans", get(list_plans))
        .route("/exercises", post(create_exercise).get(list_exercises))
        .route("/payments", post(create_payment).get(list_payments))
        .route("/workouts", post(create_workout))
        .route("/workouts/:id/exercises", post(assign_exercise))
        .route("/reports/dashboard", get(dashboard))
        .route("/reports/monthly-revenue", get(monthly_revenue))
        .route("/reports/clients-by-plan/:plan", get(clients_by_plan))
        .route(
            "/reports/instructor-workload/:instructor",
            get(instructor_workload),
        )
        .route("/reports/clients-by-instructor", get(clients_by_instructor))
        .route("/reports/payment-summary", get(payment_summary))
        .route("/reports/workouts", get(training_schedule))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login));

    Router::new().nest("/api", api_routes).with_state(state)
}

/// Map a domain failure onto a status code and a structured body.
///
/// Business-rule failures surface as a `CommandResult` with `status: error`,
/// never as a generic 500; only a store outage does that.
fn error_response(err: DomainError) -> (StatusCode, Json<CommandResult>) {
    let status = match &err {
        DomainError::Duplicate { .. } => StatusCode::CONFLICT,
        DomainError::UnresolvedReference { .. } => StatusCode::NOT_FOUND,
        DomainError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::StoreUnavailable(_) => {
            tracing::error!("store failure: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(CommandResult::error(err.to_string())))
}

// ---------------------------------------------------------------------------
// Form handlers
// ---------------------------------------------------------------------------

async fn create_client(
    State(state): State<AppState>,
    Json(request): Json<CreateClientRequest>,
) -> (StatusCode, Json<CommandResult>) {
    info!("POST /api/clients - name: {}", request.name);

    let name = request.name.clone();
    match state.clients.create_client(request).await {
        Ok(id) => (
            StatusCode::CREATED,
            Json(CommandResult::success(
                format!("client '{}' registered", name),
                Some(id),
            )),
        ),
        Err(e) => error_response(e),
    }
}

async fn create_payment(
    State(state): State<AppState>,
    Json(request): Json<CreatePaymentRequest>,
) -> (StatusCode, Json<CommandResult>) {
    info!("POST /api/payments - client: {}", request.client);

    let client = request.client.clone();
    match state.payments.create_payment(request).await {
        Ok(id) => (
            StatusCode::CREATED,
            Json(CommandResult::success(
                format!("payment recorded for '{}'", client),
                Some(id),
            )),
        ),
        Err(e) => error_response(e),
    }
}

async fn create_workout(
    State(state): State<AppState>,
    Json(request): Json<CreateWorkoutRequest>,
) -> (StatusCode, Json<CommandResult>) {
    info!("POST /api/workouts - client: {}", request.client);

    let client = request.client.clone();
    match state.workouts.create_workout(request).await {
        Ok(id) => (
            StatusCode::CREATED,
            Json(CommandResult::success(
                format!("workout created for '{}'", client),
                Some(id),
            )),
        ),
        Err(e) => error_response(e),
    }
}

async fn create_exercise(
    State(state): State<AppState>,
    Json(request): Json<CreateExerciseRequest>,
) -> (StatusCode, Json<CommandResult>) {
    info!("POST /api/exercises - name: {}", request.name);

    let name = request.name.clone();
    match state.exercises.create_exercise(request).await {
        Ok(id) => (
            StatusCode::CREATED,
            Json(CommandResult::success(
                format!("exercise '{}' registered", name),
                Some(id),
            )),
        ),
        Err(e) => error_response(e),
    }
}

async fn assign_exercise(
    State(state): State<AppState>,
    Path(workout_id): Path<i64>,
    Json(request): Json<AssignExerciseRequest>,
) -> (StatusCode, Json<CommandResult>) {
    info!(
        "POST /api/workouts/{}/exercises - exercise: {}",
        workout_id, request.exercise
    );

    let exercise = request.exercise.clone();
    match state.workouts.assign_exercise(workout_id, request).await {
        Ok(id) => (
            StatusCode::CREATED,
            Json(CommandResult::success(
                format!("exercise '{}' assigned", exercise),
                Some(id),
            )),
        ),
        Err(e) => error_response(e),
    }
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

async fn list_clients(State(state): State<AppState>) -> impl IntoResponse {
    match state.clients.list().await {
        Ok(clients) => (StatusCode::OK, Json(clients)).into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

async fn list_instructors(State(state): State<AppState>) -> impl IntoResponse {
    match state.instructors.list().await {
        Ok(instructors) => (StatusCode::OK, Json(instructors)).into_response(),
        Err(e) => error_response(e.into()).into_response(),
    }
}

async fn list_plans(State(state): State<AppState>) -> impl IntoResponse {
    match state.plans.list().await {
        Ok(plans) => (StatusCode::OK, Json(plans)).into_response(),
        Err(e) => error_response(e.into()).into_response(),
    }
}

async fn list_exercises(State(state): State<AppState>) -> impl IntoResponse {
    match state.exercises.list().await {
        Ok(exercises) => (StatusCode::OK, Json(exercises)).into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

async fn list_payments(State(state): State<AppState>) -> impl IntoResponse {
    match state.payments.list().await {
        Ok(payments) => (StatusCode::OK, Json(payments)).into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

async fn list_client_workouts(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.workouts.list_for_client(&name).await {
        Ok(workouts) => (StatusCode::OK, Json(workouts)).into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

async fn dashboard(State(state): State<AppState>) -> impl IntoResponse {
    let today = chrono::Local::now().date_naive();
    match state.reports.dashboard(today).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

async fn monthly_revenue(State(state): State<AppState>) -> impl IntoResponse {
    match state.reports.monthly_revenue().await {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

async fn clients_by_plan(
    State(state): State<AppState>,
    Path(plan): Path<String>,
) -> impl IntoResponse {
    match state.reports.clients_by_plan(&plan).await {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

async fn instructor_workload(
    State(state): State<AppState>,
    Path(instructor): Path<String>,
) -> impl IntoResponse {
    match state.reports.instructor_workload(&instructor).await {
        Ok(count) => (StatusCode::OK, Json(count)).into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

async fn clients_by_instructor(State(state): State<AppState>) -> impl IntoResponse {
    match state.reports.clients_by_instructor().await {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

async fn payment_summary(State(state): State<AppState>) -> impl IntoResponse {
    match state.reports.payment_summary().await {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

/// Query parameters for the training-schedule report
#[derive(Deserialize, Debug)]
struct ScheduleQuery {
    client: Option<String>,
}

async fn training_schedule(
    State(state): State<AppState>,
    Query(query): Query<ScheduleQuery>,
) -> impl IntoResponse {
    match state.reports.training_schedule(query.client.as_deref()).await {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> (StatusCode, Json<CommandResult>) {
    info!("POST /api/auth/register - username: {}", request.username);

    match state.auth.register(&request.username, &request.password).await {
        Ok(id) => (
            StatusCode::CREATED,
            Json(CommandResult::success(
                format!("user '{}' registered", request.username.trim()),
                Some(id),
            )),
        ),
        Err(e) => error_response(e),
    }
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> (StatusCode, Json<CommandResult>) {
    match state.auth.verify(&request.username, &request.password).await {
        Ok(true) => (
            StatusCode::OK,
            Json(CommandResult::success(
                format!("welcome, {}", request.username.trim()),
                None,
            )),
        ),
        Ok(false) => (
            StatusCode::UNAUTHORIZED,
            Json(CommandResult::error("invalid username or password")),
        ),
        Err(e) => error_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::{seed_instructor, seed_plan};
    use shared::CommandStatus;

    async fn setup_state() -> AppState {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        seed_plan(&db, "Gold", 120.0, 6).await;
        seed_instructor(&db, "Carla", "crossfit").await;
        AppState::new(db)
    }

    fn client_request(name: &str, email: &str) -> CreateClientRequest {
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
    async fn test_create_client_handler_returns_structured_result() {
        let state = setup_state().await;

        let (status, Json(body)) = create_client(
            State(state.clone()),
            Json(client_request("Ana", "ana@example.com")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.status, CommandStatus::Success);
        assert!(body.id.is_some());

        // A duplicate surfaces as a conflict with an error result, not a 500
        let (status, Json(body)) = create_client(
            State(state),
            Json(client_request("Ana", "ana@example.com")),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.status, CommandStatus::Error);
        assert!(body.message.contains("Ana"));
    }

    #[tokio::test]
    async fn test_unresolved_reference_maps_to_not_found() {
        let state = setup_state().await;

        let mut request = client_request("Ana", "ana@example.com");
        request.plan = "Platinum".to_string();
        let (status, Json(body)) = create_client(State(state), Json(request)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.status, CommandStatus::Error);
        assert!(body.message.contains("Platinum"));
    }

    #[tokio::test]
    async fn test_login_handler_rejects_bad_credentials() {
        let state = setup_state().await;

        let (status, _) = register(
            State(state.clone()),
            Json(RegisterRequest {
                username: "kerry".to_string(),
                password: "hunter2".to_string(),
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, Json(body)) = login(
            State(state.clone()),
            Json(LoginRequest {
                username: "kerry".to_string(),
                password: "wrong".to_string(),
            }),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.status, CommandStatus::Error);

        let (status, Json(body)) = login(
            State(state),
            Json(LoginRequest {
                username: "kerry".to_string(),
                password: "hunter2".to_string(),
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_success());
    }
}
