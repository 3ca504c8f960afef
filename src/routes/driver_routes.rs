//! Rutas de drivers
//!
//! CRUD gestionado por admin/manager, borrado y reconciliación solo
//! admin. /me devuelve el perfil de la identidad driver logueada.

use axum::{
    extract::{Path, State},
    middleware,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::driver_controller::DriverController;
use crate::middleware::{auth_middleware, require_roles, AuthenticatedUser};
use crate::models::driver::{
    AssignVehicleRequest, CreateDriverRequest, CreateDriverResponse, DriverResponse,
    ReconciliationReport, UpdateDriverRequest,
};
use crate::models::user::{ApiResponse, Role};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_driver_router(state: AppState) -> Router {
    Router::new()
        .route("/", post(create_driver))
        .route("/", get(list_drivers))
        .route("/me", get(my_profile))
        .route("/assign", post(assign_vehicle))
        .route("/unassign/:id", put(unassign_vehicle))
        .route("/reconcile", post(reconcile))
        .route("/:id", get(get_driver))
        .route("/:id", put(update_driver))
        .route("/:id", delete(delete_driver))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state)
}

async fn create_driver(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(request): Json<CreateDriverRequest>,
) -> Result<Json<ApiResponse<CreateDriverResponse>>, AppError> {
    require_roles(&state.policy, &auth, &[Role::Admin, Role::Manager])?;
    let controller = DriverController::from_pool(state.pool.clone());
    let response = controller.create(request).await?;
    Ok(Json(ApiResponse::success_with_message(
        response,
        "Driver creado exitosamente".to_string(),
    )))
}

async fn list_drivers(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<DriverResponse>>>, AppError> {
    require_roles(&state.policy, &auth, &[Role::Admin, Role::Manager])?;
    let controller = DriverController::from_pool(state.pool.clone());
    let response = controller.list().await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn my_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<DriverResponse>>, AppError> {
    let controller = DriverController::from_pool(state.pool.clone());
    let response = controller.my_profile(auth.user_id).await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn get_driver(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DriverResponse>>, AppError> {
    require_roles(&state.policy, &auth, &[Role::Admin, Role::Manager])?;
    let controller = DriverController::from_pool(state.pool.clone());
    let response = controller.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn update_driver(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateDriverRequest>,
) -> Result<Json<ApiResponse<DriverResponse>>, AppError> {
    require_roles(&state.policy, &auth, &[Role::Admin, Role::Manager])?;
    let controller = DriverController::from_pool(state.pool.clone());
    let response = controller.update(id, request).await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn delete_driver(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    require_roles(&state.policy, &auth, &[Role::Admin])?;
    let controller = DriverController::from_pool(state.pool.clone());
    controller.delete(id).await?;
    Ok(Json(ApiResponse::message_only(
        "Driver eliminado exitosamente".to_string(),
    )))
}

async fn assign_vehicle(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(request): Json<AssignVehicleRequest>,
) -> Result<Json<ApiResponse<DriverResponse>>, AppError> {
    require_roles(&state.policy, &auth, &[Role::Admin, Role::Manager])?;
    let controller = DriverController::from_pool(state.pool.clone());
    let response = controller.assign_vehicle(request).await?;
    Ok(Json(ApiResponse::success_with_message(
        response,
        "Vehículo asignado exitosamente".to_string(),
    )))
}

async fn unassign_vehicle(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DriverResponse>>, AppError> {
    require_roles(&state.policy, &auth, &[Role::Admin, Role::Manager])?;
    let controller = DriverController::from_pool(state.pool.clone());
    let response = controller.unassign_vehicle(id).await?;
    Ok(Json(ApiResponse::success_with_message(
        response,
        "Vehículo desasignado exitosamente".to_string(),
    )))
}

async fn reconcile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<ReconciliationReport>>, AppError> {
    require_roles(&state.policy, &auth, &[Role::Admin])?;
    let controller = DriverController::from_pool(state.pool.clone());
    let response = controller.reconcile().await?;
    Ok(Json(ApiResponse::success(response)))
}
