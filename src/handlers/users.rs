// src/handlers/users.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{AccessAdmin, AccessOverview, RequireAccess},
    models::auth::{AuthResponse, CreateUserPayload, UpdateUserPayload, UserResponse},
};

// POST /api/users (cadastro público)
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "Usuário criado e autenticado", body = AuthResponse),
        (status = 400, description = "Dados inválidos ou username em uso")
    )
)]
pub async fn sign_up(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    tracing::info!("Signing up '{}'", payload.username);

    let response = app_state.auth_service.register_user(&payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

// GET /api/users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses((status = 200, body = [UserResponse])),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    _guard: RequireAccess<AccessAdmin>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    tracing::info!("Getting all users");
    Ok(Json(app_state.user_service.list_users().await?))
}

// GET /api/users/{id}
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses((status = 200, body = UserResponse)),
    security(("api_jwt" = []))
)]
pub async fn get_user(
    State(app_state): State<AppState>,
    _guard: RequireAccess<AccessOverview>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    tracing::info!("Getting user {}", id);
    Ok(Json(app_state.user_service.get_user(id).await?))
}

// PUT /api/users/{id}
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    request_body = UpdateUserPayload,
    responses(
        (status = 200, body = UserResponse),
        (status = 403, description = "Sem permissão para editar este usuário")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_user(
    State(app_state): State<AppState>,
    RequireAccess(caller, _): RequireAccess<AccessOverview>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<Json<UserResponse>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    tracing::info!("Updating user {}", id);

    Ok(Json(app_state.user_service.update_user(&caller, id, &payload).await?))
}

// DELETE /api/users/{id}
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses((status = 204, description = "Usuário removido")),
    security(("api_jwt" = []))
)]
pub async fn delete_user(
    State(app_state): State<AppState>,
    _guard: RequireAccess<AccessAdmin>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    tracing::info!("Deleting user {}", id);
    app_state.user_service.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
