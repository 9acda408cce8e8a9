// src/handlers/inventory.rs

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
    middleware::rbac::{AccessAdmin, AccessBasic, AccessOverview, AccessPublic, RequireAccess},
    models::inventory::{
        CheckInPayload, CheckOutPayload, CreateItemPayload, ItemRecord, ItemView,
        UpdateItemPayload, UsefulLifeView,
    },
};

// =============================================================================
//  1. CRUD DE ITENS
// =============================================================================

// GET /api/items
#[utoipa::path(
    get,
    path = "/api/items",
    tag = "Items",
    responses((status = 200, description = "Todos os itens, por código de barras", body = [ItemView])),
    security(("api_jwt" = []))
)]
pub async fn list_items(
    State(app_state): State<AppState>,
    _guard: RequireAccess<AccessBasic>,
) -> Result<Json<Vec<ItemView>>, AppError> {
    tracing::info!("Getting all items");
    Ok(Json(app_state.search_service.all_items().await?))
}

// POST /api/items
#[utoipa::path(
    post,
    path = "/api/items",
    tag = "Items",
    request_body = CreateItemPayload,
    responses(
        (status = 201, description = "Item cadastrado", body = ItemRecord),
        (status = 400, description = "Código de barras em uso ou produto inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_item(
    State(app_state): State<AppState>,
    _guard: RequireAccess<AccessPublic>,
    Json(payload): Json<CreateItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    tracing::info!("Creating item {}", payload.barcode);

    let item = app_state.inventory_service.create_item(&payload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

// GET /api/items/{id}
#[utoipa::path(
    get,
    path = "/api/items/{id}",
    tag = "Items",
    params(("id" = Uuid, Path, description = "ID do item")),
    responses((status = 200, body = ItemRecord)),
    security(("api_jwt" = []))
)]
pub async fn get_item(
    State(app_state): State<AppState>,
    _guard: RequireAccess<AccessBasic>,
    Path(id): Path<Uuid>,
) -> Result<Json<ItemRecord>, AppError> {
    tracing::info!("Getting item {}", id);
    Ok(Json(app_state.inventory_service.get_item(id).await?))
}

// PUT /api/items/{id}: só a localização muda
#[utoipa::path(
    put,
    path = "/api/items/{id}",
    tag = "Items",
    params(("id" = Uuid, Path, description = "ID do item")),
    request_body = UpdateItemPayload,
    responses((status = 200, body = ItemRecord)),
    security(("api_jwt" = []))
)]
pub async fn update_item(
    State(app_state): State<AppState>,
    _guard: RequireAccess<AccessPublic>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateItemPayload>,
) -> Result<Json<ItemRecord>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    tracing::info!("Updating item {}", id);

    Ok(Json(app_state.inventory_service.update_item(id, &payload).await?))
}

// DELETE /api/items/{id}
#[utoipa::path(
    delete,
    path = "/api/items/{id}",
    tag = "Items",
    params(("id" = Uuid, Path, description = "ID do item")),
    responses((status = 204, description = "Item removido")),
    security(("api_jwt" = []))
)]
pub async fn delete_item(
    State(app_state): State<AppState>,
    _guard: RequireAccess<AccessAdmin>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    tracing::info!("Deleting item {}", id);
    app_state.inventory_service.delete_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  2. RELATÓRIOS E LISTAS
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/items/warehouses",
    tag = "Items",
    responses((status = 200, description = "Armazéns distintos, ordenados", body = [String])),
    security(("api_jwt" = []))
)]
pub async fn list_warehouses(
    State(app_state): State<AppState>,
    _guard: RequireAccess<AccessBasic>,
) -> Result<Json<Vec<String>>, AppError> {
    tracing::info!("Getting warehouses");
    Ok(Json(app_state.inventory_service.warehouses().await?))
}

#[utoipa::path(
    get,
    path = "/api/items/useful-life",
    tag = "Items",
    responses((status = 200, body = [UsefulLifeView])),
    security(("api_jwt" = []))
)]
pub async fn useful_life(
    State(app_state): State<AppState>,
    _guard: RequireAccess<AccessOverview>,
) -> Result<Json<Vec<UsefulLifeView>>, AppError> {
    tracing::info!("Getting useful life report");
    Ok(Json(app_state.search_service.useful_life().await?))
}

#[utoipa::path(
    get,
    path = "/api/items/on-shelf/{on_shelf}",
    tag = "Items",
    params(("on_shelf" = bool, Path, description = "true = na prateleira")),
    responses((status = 200, body = [ItemView])),
    security(("api_jwt" = []))
)]
pub async fn items_on_shelf(
    State(app_state): State<AppState>,
    _guard: RequireAccess<AccessBasic>,
    Path(on_shelf): Path<bool>,
) -> Result<Json<Vec<ItemView>>, AppError> {
    tracing::info!("Getting items with onShelf = {}", on_shelf);
    Ok(Json(app_state.search_service.items_on_shelf(on_shelf).await?))
}

// =============================================================================
//  3. SAÍDA / ENTRADA
// =============================================================================

#[utoipa::path(
    put,
    path = "/api/items/check-out/{id}",
    tag = "Items",
    params(("id" = Uuid, Path, description = "ID do item")),
    request_body = CheckOutPayload,
    responses(
        (status = 200, body = ItemView),
        (status = 400, description = "Item já está fora"),
        (status = 409, description = "Outro pedido alterou o item antes")
    ),
    security(("api_jwt" = []))
)]
pub async fn check_out(
    State(app_state): State<AppState>,
    RequireAccess(caller, _): RequireAccess<AccessBasic>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CheckOutPayload>,
) -> Result<Json<ItemView>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    tracing::info!("Checking out item {}", id);

    Ok(Json(app_state.inventory_service.check_out(&caller, id, &payload).await?))
}

#[utoipa::path(
    put,
    path = "/api/items/check-in/{id}",
    tag = "Items",
    params(("id" = Uuid, Path, description = "ID do item")),
    request_body = CheckInPayload,
    responses(
        (status = 200, body = ItemView),
        (status = 400, description = "Item já está na prateleira"),
        (status = 409, description = "Outro pedido alterou o item antes")
    ),
    security(("api_jwt" = []))
)]
pub async fn check_in(
    State(app_state): State<AppState>,
    RequireAccess(caller, _): RequireAccess<AccessBasic>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CheckInPayload>,
) -> Result<Json<ItemView>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    tracing::info!("Checking in item {}", id);

    Ok(Json(app_state.inventory_service.check_in(&caller, id, &payload).await?))
}
