//! Middleware de autenticación JWT
//!
//! Este módulo maneja la autenticación JWT, extracción de tokens
//! y verificación de usuarios autenticados.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{
    models::user::{Role, User},
    services::role_policy::RolePolicy,
    state::AppState,
    utils::errors::AppError,
    utils::jwt::{extract_token_from_header, user_id_from_claims, verify_token, JwtConfig},
};

/// Usuario autenticado que se inyecta en las requests
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub role: Role,
}

/// Middleware de autenticación JWT
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Extraer token del header Authorization
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|auth_str| auth_str.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Token de autorización requerido".to_string()))?;
    let token = extract_token_from_header(auth_header)?;

    let authenticated_user = authenticate(&state, token).await?;

    // Inyectar usuario autenticado en las extensions
    request.extensions_mut().insert(authenticated_user);

    Ok(next.run(request).await)
}

/// Middleware opcional de autenticación (para rutas que pueden ser
/// públicas o privadas, como el registro). Un token ausente pasa sin
/// identidad; un token presente pero inválido sigue siendo 401.
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|auth_str| auth_str.to_str().ok());

    if let Some(header_value) = auth_header {
        let token = extract_token_from_header(header_value)?;
        let authenticated_user = authenticate(&state, token).await?;
        request.extensions_mut().insert(authenticated_user);
    }

    Ok(next.run(request).await)
}

/// Gate de autorización por rol, evaluado ANTES de cualquier lookup del
/// recurso: un caller sin permiso recibe 403 aunque el recurso no exista.
pub fn require_roles(
    policy: &RolePolicy,
    auth: &AuthenticatedUser,
    required: &[Role],
) -> Result<(), AppError> {
    if policy.can_access(auth.role, required) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "No tienes permiso para acceder a este recurso".to_string(),
        ))
    }
}

async fn authenticate(state: &AppState, token: &str) -> Result<AuthenticatedUser, AppError> {
    let jwt_config = JwtConfig::from(&state.config);
    let claims = verify_token(token, &jwt_config)?;

    let user_id = user_id_from_claims(&claims)?;

    // Verificar que el usuario todavía existe en la base de datos
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Usuario no encontrado".to_string()))?;

    Ok(AuthenticatedUser {
        user_id: user.id,
        role: user.role,
    })
}
