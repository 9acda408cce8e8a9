// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};

use crate::{config::AppState, docs, handlers, middleware::auth::auth_guard};

pub fn router(app_state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/refresh", post(handlers::auth::refresh));

    let user_routes = Router::new()
        .route("/", post(handlers::users::sign_up).get(handlers::users::list_users))
        .route(
            "/{id}",
            get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        );

    let category_routes = Router::new()
        .route(
            "/",
            get(handlers::catalog::list_categories).post(handlers::catalog::create_category),
        )
        .route(
            "/{id}",
            get(handlers::catalog::get_category)
                .put(handlers::catalog::update_category)
                .delete(handlers::catalog::delete_category),
        );

    let manufacturer_routes = Router::new()
        .route(
            "/",
            get(handlers::catalog::list_manufacturers).post(handlers::catalog::create_manufacturer),
        )
        .route(
            "/{id}",
            get(handlers::catalog::get_manufacturer)
                .put(handlers::catalog::update_manufacturer)
                .delete(handlers::catalog::delete_manufacturer),
        );

    let product_routes = Router::new()
        .route(
            "/",
            get(handlers::catalog::list_products).post(handlers::catalog::create_product),
        )
        .route("/low-stock", get(handlers::catalog::low_stock))
        .route(
            "/{id}",
            get(handlers::catalog::get_product)
                .put(handlers::catalog::update_product)
                .delete(handlers::catalog::delete_product),
        );

    let department_routes = Router::new()
        .route(
            "/",
            get(handlers::staff::list_departments).post(handlers::staff::create_department),
        )
        .route(
            "/{id}",
            get(handlers::staff::get_department)
                .put(handlers::staff::update_department)
                .delete(handlers::staff::delete_department),
        );

    let employee_routes = Router::new()
        .route(
            "/",
            get(handlers::staff::list_employees).post(handlers::staff::create_employee),
        )
        .route(
            "/{employee_id}",
            get(handlers::staff::get_employee)
                .put(handlers::staff::update_employee)
                .delete(handlers::staff::delete_employee),
        );

    let item_routes = Router::new()
        .route(
            "/",
            get(handlers::inventory::list_items).post(handlers::inventory::create_item),
        )
        .route("/advanced-search", get(handlers::search::advanced_search))
        .route("/search/{term}", get(handlers::search::quick_search))
        .route("/warehouses", get(handlers::inventory::list_warehouses))
        .route("/useful-life", get(handlers::inventory::useful_life))
        .route("/on-shelf/{on_shelf}", get(handlers::inventory::items_on_shelf))
        .route("/check-out/{id}", put(handlers::inventory::check_out))
        .route("/check-in/{id}", put(handlers::inventory::check_in))
        .route(
            "/{id}",
            get(handlers::inventory::get_item)
                .put(handlers::inventory::update_item)
                .delete(handlers::inventory::delete_item),
        );

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(docs::openapi_json))
        .route("/api/my-account/{employee_id}", get(handlers::staff::my_account))
        .route("/api/searchable-fields", get(handlers::search::searchable_fields))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/categories", category_routes)
        .nest("/api/manufacturers", manufacturer_routes)
        .nest("/api/products", product_routes)
        .nest("/api/departments", department_routes)
        .nest("/api/employees", employee_routes)
        .nest("/api/items", item_routes)
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard))
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::{
        config::Settings,
        db::memory_store::MemoryStore,
        models::auth::{Principal, ACCESS_BASIC},
        services::auth::issue_token,
    };

    const SECRET: &str = "segredo-de-teste";

    fn settings() -> Settings {
        Settings {
            database_url: "postgres://localhost/unused".into(),
            jwt_secret: SECRET.into(),
            jwt_expiry_days: 1,
            server_addr: "127.0.0.1:0".into(),
            db_max_connections: 1,
            db_acquire_timeout: Duration::from_millis(50),
            search_timeout: Duration::from_secs(5),
        }
    }

    // Pool preguiçoso: nunca conecta enquanto só o store de busca for usado
    fn app() -> Router {
        let mut store = MemoryStore::new();
        let electronics = store.add_category("Electronics");
        let acme = store.add_manufacturer("Acme");
        let widget = store.add_product("Widget", Some("W-100"), electronics, acme, false);
        let denver = store.add_item(100, widget, "Denver");
        store.add_item(200, widget, "Austin");
        store.check_out(denver, 1);

        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        router(AppState::from_parts(pool, &settings(), Arc::new(store)))
    }

    fn bearer() -> String {
        let principal = Principal {
            id: Uuid::new_v4(),
            username: "tester".into(),
            access_level: ACCESS_BASIC,
            employee_id: None,
        };
        format!("Bearer {}", issue_token(SECRET, 1, &principal).unwrap())
    }

    async fn get(app: Router, uri: &str, auth: Option<String>) -> (StatusCode, serde_json::Value) {
        let mut request = Request::builder().uri(uri);
        if let Some(value) = auth {
            request = request.header(header::AUTHORIZATION, value);
        }
        let response = app.oneshot(request.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn advanced_search_returns_an_array_of_resolved_items() {
        let (status, body) = get(
            app(),
            "/api/items/advanced-search?category=Electronics&onShelf=true",
            Some(bearer()),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let items = body.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["barcode"], 200);
        assert_eq!(items[0]["warehouse"], "Austin");
        assert_eq!(items[0]["manufacturer"], "Acme");
        assert_eq!(items[0]["isCheckedOut"], false);
    }

    #[tokio::test]
    async fn advanced_search_without_token_is_unauthorized() {
        let (status, _) = get(app(), "/api/items/advanced-search?warehouse=Denver", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn empty_results_are_a_client_error() {
        let (status, body) = get(
            app(),
            "/api/items/advanced-search?manufacturer=NoSuchName",
            Some(bearer()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], crate::common::error::NO_ITEMS_FOUND_MESSAGE);
    }

    #[tokio::test]
    async fn search_without_known_fields_is_rejected() {
        let (status, body) = get(app(), "/api/items/advanced-search?colour=red", Some(bearer())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], crate::models::search::EMPTY_SEARCH_MESSAGE);
    }

    #[tokio::test]
    async fn on_shelf_listing_goes_through_the_store() {
        let (status, body) = get(app(), "/api/items/on-shelf/false", Some(bearer())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["barcode"], 100);
    }

    #[tokio::test]
    async fn openapi_document_is_public() {
        let (status, body) = get(app(), "/api-docs/openapi.json", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/api/items/advanced-search"].is_object());
    }
}
