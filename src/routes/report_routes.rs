//! Rutas de reportes

use axum::{extract::State, middleware, routing::get, Extension, Json, Router};
use serde_json::Value;

use crate::controllers::report_controller::ReportController;
use crate::middleware::{auth_middleware, require_roles, AuthenticatedUser};
use crate::models::user::{ApiResponse, Role};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_report_router(state: AppState) -> Router {
    Router::new()
        .route("/users", get(users_report))
        .route("/drivers", get(drivers_report))
        .route("/vehicles", get(vehicles_report))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state)
}

async fn users_report(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    require_roles(&state.policy, &auth, &[Role::Admin])?;
    let controller = ReportController::from_pool(state.pool.clone());
    let response = controller.users_report().await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn drivers_report(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    require_roles(&state.policy, &auth, &[Role::Admin, Role::Manager])?;
    let controller = ReportController::from_pool(state.pool.clone());
    let response = controller.drivers_report().await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn vehicles_report(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    require_roles(&state.policy, &auth, &[Role::Admin, Role::Manager])?;
    let controller = ReportController::from_pool(state.pool.clone());
    let response = controller.vehicles_report().await?;
    Ok(Json(ApiResponse::success(response)))
}
