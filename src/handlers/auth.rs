// src/handlers/auth.rs

use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{AccessBasic, RequireAccess},
    models::auth::{AuthResponse, LoginUserPayload},
};

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Token emitido", body = AuthResponse),
        (status = 401, description = "Usuário ou senha incorretos")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginUserPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    tracing::info!("Logging in '{}'", payload.username);

    let response = app_state.auth_service.login_user(&payload).await?;
    Ok(Json(response))
}

// POST /api/auth/refresh
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    tag = "Auth",
    responses(
        (status = 200, description = "Novo token para o mesmo principal", body = AuthResponse)
    ),
    security(("api_jwt" = []))
)]
pub async fn refresh(
    State(app_state): State<AppState>,
    RequireAccess(principal, _): RequireAccess<AccessBasic>,
) -> Result<Json<AuthResponse>, AppError> {
    tracing::info!("Refreshing token for '{}'", principal.username);
    Ok(Json(app_state.auth_service.refresh(principal)?))
}
