//! Rutas de trips
//!
//! Cualquier identidad autenticada puede crear y consultar trips; los
//! cambios y la asignación de drivers quedan en admin/manager.

use axum::{
    extract::{Path, State},
    middleware,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::trip_controller::TripController;
use crate::middleware::{auth_middleware, require_roles, AuthenticatedUser};
use crate::models::trip::{AssignTripRequest, CreateTripRequest, TripResponse, UpdateTripRequest};
use crate::models::user::{ApiResponse, Role};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_trip_router(state: AppState) -> Router {
    Router::new()
        .route("/", post(create_trip))
        .route("/", get(list_trips))
        .route("/:id", get(get_trip))
        .route("/:id", put(update_trip))
        .route("/:id", delete(delete_trip))
        .route("/:id/assign", put(assign_driver))
        .route("/:id/unassign", put(unassign_driver))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state)
}

async fn create_trip(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(request): Json<CreateTripRequest>,
) -> Result<Json<ApiResponse<TripResponse>>, AppError> {
    let controller = TripController::from_pool(state.pool.clone());
    let response = controller.create(auth.user_id, request).await?;
    Ok(Json(ApiResponse::success_with_message(
        response,
        "Trip creado exitosamente".to_string(),
    )))
}

async fn list_trips(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<TripResponse>>>, AppError> {
    let controller = TripController::from_pool(state.pool.clone());
    let response = controller.list().await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn get_trip(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TripResponse>>, AppError> {
    let controller = TripController::from_pool(state.pool.clone());
    let response = controller.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn update_trip(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTripRequest>,
) -> Result<Json<ApiResponse<TripResponse>>, AppError> {
    require_roles(&state.policy, &auth, &[Role::Admin, Role::Manager])?;
    let controller = TripController::from_pool(state.pool.clone());
    let response = controller.update(id, request).await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn delete_trip(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    require_roles(&state.policy, &auth, &[Role::Admin, Role::Manager])?;
    let controller = TripController::from_pool(state.pool.clone());
    controller.delete(id).await?;
    Ok(Json(ApiResponse::message_only(
        "Trip eliminado exitosamente".to_string(),
    )))
}

async fn assign_driver(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<AssignTripRequest>,
) -> Result<Json<ApiResponse<TripResponse>>, AppError> {
    require_roles(&state.policy, &auth, &[Role::Admin, Role::Manager])?;
    let controller = TripController::from_pool(state.pool.clone());
    let response = controller.assign_driver(id, request).await?;
    Ok(Json(ApiResponse::success_with_message(
        response,
        "Driver asignado al trip exitosamente".to_string(),
    )))
}

async fn unassign_driver(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TripResponse>>, AppError> {
    require_roles(&state.policy, &auth, &[Role::Admin, Role::Manager])?;
    let controller = TripController::from_pool(state.pool.clone());
    let response = controller.unassign_driver(id).await?;
    Ok(Json(ApiResponse::success_with_message(
        response,
        "Driver desasignado del trip exitosamente".to_string(),
    )))
}
