//! Rutas de autenticación y gestión de identidades
//!
//! register y login son públicos (register acepta un token opcional:
//! un admin logueado puede crear cuentas de otros roles). El listado y
//! borrado de usuarios exigen autenticación.

use axum::{
    extract::{Path, State},
    middleware,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::auth_controller::AuthController;
use crate::middleware::{auth_middleware, optional_auth_middleware, AuthenticatedUser};
use crate::models::user::{ApiResponse, AuthResponse, LoginRequest, RegisterRequest, UserResponse};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::JwtConfig;

pub fn create_auth_router(state: AppState) -> Router {
    let public = Router::new()
        .route(
            "/register",
            post(register).layer(middleware::from_fn_with_state(
                state.clone(),
                optional_auth_middleware,
            )),
        )
        .route("/login", post(login));

    let protected = Router::new()
        .route("/users", get(list_users))
        .route("/users/:id", delete(delete_user))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    public.merge(protected).with_state(state)
}

async fn register(
    State(state): State<AppState>,
    caller: Option<Extension<AuthenticatedUser>>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    let controller = AuthController::from_pool(state.pool.clone());
    let jwt = JwtConfig::from(&state.config);
    let response = controller
        .register(
            caller.map(|Extension(auth)| auth.role),
            &state.policy,
            &jwt,
            request,
        )
        .await?;
    Ok(Json(ApiResponse::success_with_message(
        response,
        "Usuario registrado exitosamente".to_string(),
    )))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    let controller = AuthController::from_pool(state.pool.clone());
    let jwt = JwtConfig::from(&state.config);
    let response = controller.login(&jwt, request).await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, AppError> {
    let controller = AuthController::from_pool(state.pool.clone());
    let response = controller.list_users(&auth, &state.policy).await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = AuthController::from_pool(state.pool.clone());
    controller.delete_user(&auth, &state.policy, id).await?;
    Ok(Json(ApiResponse::message_only(
        "Usuario eliminado exitosamente".to_string(),
    )))
}
