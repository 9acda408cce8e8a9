// src/handlers/search.rs

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{AccessBasic, RequireAccess},
    models::{inventory::ItemView, search::SearchableFields},
};

// GET /api/items/advanced-search?category=...&warehouse=...&onShelf=...
#[utoipa::path(
    get,
    path = "/api/items/advanced-search",
    tag = "Search",
    params(
        ("product" = Option<String>, Query, description = "Nome do produto (contém)"),
        ("name" = Option<String>, Query, description = "Sinônimo de product"),
        ("model" = Option<String>, Query, description = "Modelo (contém)"),
        ("category" = Option<String>, Query, description = "Nome da categoria (contém)"),
        ("manufacturer" = Option<String>, Query, description = "Nome do fabricante (contém)"),
        ("consummable" = Option<bool>, Query),
        ("warehouse" = Option<String>, Query, description = "Armazém (contém)"),
        ("onShelf" = Option<bool>, Query),
        ("barcode" = Option<i64>, Query),
        ("serialNumber" = Option<i64>, Query)
    ),
    responses(
        (status = 200, description = "Itens encontrados (sempre uma lista)", body = [ItemView]),
        (status = 400, description = "Busca vazia, valor inválido ou nenhum item"),
        (status = 504, description = "A busca excedeu o prazo")
    ),
    security(("api_jwt" = []))
)]
pub async fn advanced_search(
    State(app_state): State<AppState>,
    _guard: RequireAccess<AccessBasic>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<ItemView>>, AppError> {
    tracing::info!("Advanced search with {} field(s)", params.len());
    Ok(Json(app_state.search_service.advanced_search(&params).await?))
}

// GET /api/items/search/{term}
#[utoipa::path(
    get,
    path = "/api/items/search/{term}",
    tag = "Search",
    params(("term" = String, Path, description = "Número (código/série) ou texto")),
    responses(
        (status = 200, body = [ItemView]),
        (status = 400, description = "Nenhum item")
    ),
    security(("api_jwt" = []))
)]
pub async fn quick_search(
    State(app_state): State<AppState>,
    _guard: RequireAccess<AccessBasic>,
    Path(term): Path<String>,
) -> Result<Json<Vec<ItemView>>, AppError> {
    tracing::info!("Quick search for '{}'", term);
    Ok(Json(app_state.inventory_service.quick_search(&term).await?))
}

// GET /api/searchable-fields
#[utoipa::path(
    get,
    path = "/api/searchable-fields",
    tag = "Search",
    responses((status = 200, body = SearchableFields)),
    security(("api_jwt" = []))
)]
pub async fn searchable_fields(
    State(app_state): State<AppState>,
    _guard: RequireAccess<AccessBasic>,
) -> Result<Json<SearchableFields>, AppError> {
    tracing::info!("Getting searchable fields");
    Ok(Json(app_state.inventory_service.searchable_fields().await?))
}
