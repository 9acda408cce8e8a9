// src/handlers/catalog.rs

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
    models::catalog::{
        Category, CreateProductPayload, LowStockEntry, Manufacturer, NamePayload, ProductRecord,
        ProductView, UpdateNamePayload, UpdateProductPayload,
    },
};

fn ensure_same_id(path_id: Uuid, body_id: Uuid) -> Result<(), AppError> {
    if path_id != body_id {
        return Err(AppError::BadRequest("The id in the path and body don't match.".to_string()));
    }
    Ok(())
}

// =============================================================================
//  1. CATEGORIAS
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "Catalog",
    responses((status = 200, body = [Category])),
    security(("api_jwt" = []))
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
    _guard: RequireAccess<AccessBasic>,
) -> Result<Json<Vec<Category>>, AppError> {
    tracing::info!("Getting all categories");
    Ok(Json(app_state.catalog_service.list_categories().await?))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID da categoria")),
    responses((status = 200, body = Category)),
    security(("api_jwt" = []))
)]
pub async fn get_category(
    State(app_state): State<AppState>,
    _guard: RequireAccess<AccessBasic>,
    Path(id): Path<Uuid>,
) -> Result<Json<Category>, AppError> {
    tracing::info!("Getting category {}", id);
    Ok(Json(app_state.catalog_service.get_category(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    tag = "Catalog",
    request_body = NamePayload,
    responses((status = 201, body = Category)),
    security(("api_jwt" = []))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    RequireAccess(caller, _): RequireAccess<AccessPublic>,
    Json(payload): Json<NamePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    tracing::info!("Creating category '{}'", payload.name);

    let category = app_state.catalog_service.create_category(&payload.name, caller.id).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID da categoria")),
    request_body = UpdateNamePayload,
    responses((status = 200, body = Category)),
    security(("api_jwt" = []))
)]
pub async fn update_category(
    State(app_state): State<AppState>,
    RequireAccess(caller, _): RequireAccess<AccessPublic>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateNamePayload>,
) -> Result<Json<Category>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    ensure_same_id(id, payload.id)?;
    tracing::info!("Updating category {}", id);

    Ok(Json(app_state.catalog_service.rename_category(id, &payload.name, caller.id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID da categoria")),
    responses(
        (status = 204, description = "Categoria removida"),
        (status = 400, description = "Ainda usada por produtos")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_category(
    State(app_state): State<AppState>,
    _guard: RequireAccess<AccessAdmin>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    tracing::info!("Deleting category {}", id);
    app_state.catalog_service.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  2. FABRICANTES
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/manufacturers",
    tag = "Catalog",
    responses((status = 200, body = [Manufacturer])),
    security(("api_jwt" = []))
)]
pub async fn list_manufacturers(
    State(app_state): State<AppState>,
    _guard: RequireAccess<AccessBasic>,
) -> Result<Json<Vec<Manufacturer>>, AppError> {
    tracing::info!("Getting all manufacturers");
    Ok(Json(app_state.catalog_service.list_manufacturers().await?))
}

#[utoipa::path(
    get,
    path = "/api/manufacturers/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID do fabricante")),
    responses((status = 200, body = Manufacturer)),
    security(("api_jwt" = []))
)]
pub async fn get_manufacturer(
    State(app_state): State<AppState>,
    _guard: RequireAccess<AccessBasic>,
    Path(id): Path<Uuid>,
) -> Result<Json<Manufacturer>, AppError> {
    tracing::info!("Getting manufacturer {}", id);
    Ok(Json(app_state.catalog_service.get_manufacturer(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/manufacturers",
    tag = "Catalog",
    request_body = NamePayload,
    responses((status = 201, body = Manufacturer)),
    security(("api_jwt" = []))
)]
pub async fn create_manufacturer(
    State(app_state): State<AppState>,
    RequireAccess(caller, _): RequireAccess<AccessPublic>,
    Json(payload): Json<NamePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    tracing::info!("Creating manufacturer '{}'", payload.name);

    let manufacturer = app_state.catalog_service.create_manufacturer(&payload.name, caller.id).await?;
    Ok((StatusCode::CREATED, Json(manufacturer)))
}

#[utoipa::path(
    put,
    path = "/api/manufacturers/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID do fabricante")),
    request_body = UpdateNamePayload,
    responses((status = 200, body = Manufacturer)),
    security(("api_jwt" = []))
)]
pub async fn update_manufacturer(
    State(app_state): State<AppState>,
    RequireAccess(caller, _): RequireAccess<AccessPublic>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateNamePayload>,
) -> Result<Json<Manufacturer>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    ensure_same_id(id, payload.id)?;
    tracing::info!("Updating manufacturer {}", id);

    Ok(Json(app_state.catalog_service.rename_manufacturer(id, &payload.name, caller.id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/manufacturers/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID do fabricante")),
    responses(
        (status = 204, description = "Fabricante removido"),
        (status = 400, description = "Ainda usado por produtos")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_manufacturer(
    State(app_state): State<AppState>,
    _guard: RequireAccess<AccessAdmin>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    tracing::info!("Deleting manufacturer {}", id);
    app_state.catalog_service.delete_manufacturer(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  3. PRODUTOS
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Catalog",
    responses((status = 200, body = [ProductView])),
    security(("api_jwt" = []))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    _guard: RequireAccess<AccessBasic>,
) -> Result<Json<Vec<ProductView>>, AppError> {
    tracing::info!("Getting all products");
    Ok(Json(app_state.catalog_service.list_products().await?))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses((status = 200, body = ProductView)),
    security(("api_jwt" = []))
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    _guard: RequireAccess<AccessBasic>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductView>, AppError> {
    tracing::info!("Getting product {}", id);
    Ok(Json(app_state.catalog_service.get_product(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Catalog",
    request_body = CreateProductPayload,
    responses((status = 201, body = ProductRecord)),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    _guard: RequireAccess<AccessPublic>,
    Json(payload): Json<CreateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    tracing::info!("Creating product '{}'", payload.name);

    let product = app_state.catalog_service.create_product(&payload).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID do produto")),
    request_body = UpdateProductPayload,
    responses((status = 200, body = ProductRecord)),
    security(("api_jwt" = []))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    _guard: RequireAccess<AccessPublic>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductPayload>,
) -> Result<Json<ProductRecord>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    tracing::info!("Updating product {}", id);

    Ok(Json(app_state.catalog_service.update_product(id, &payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses((status = 204, description = "Produto e seus itens removidos")),
    security(("api_jwt" = []))
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    _guard: RequireAccess<AccessAdmin>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    tracing::info!("Deleting product {}", id);
    app_state.catalog_service.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/products/low-stock
#[utoipa::path(
    get,
    path = "/api/products/low-stock",
    tag = "Catalog",
    responses((status = 200, description = "Consumíveis abaixo do mínimo", body = [LowStockEntry])),
    security(("api_jwt" = []))
)]
pub async fn low_stock(
    State(app_state): State<AppState>,
    _guard: RequireAccess<AccessOverview>,
) -> Result<Json<Vec<LowStockEntry>>, AppError> {
    tracing::info!("Getting low stock report");
    Ok(Json(app_state.catalog_service.low_stock().await?))
}
