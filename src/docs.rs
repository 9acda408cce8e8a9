// src/docs.rs

use axum::Json;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::refresh,

        // --- Users ---
        handlers::users::sign_up,
        handlers::users::list_users,
        handlers::users::get_user,
        handlers::users::update_user,
        handlers::users::delete_user,

        // --- Catalog ---
        handlers::catalog::list_categories,
        handlers::catalog::get_category,
        handlers::catalog::create_category,
        handlers::catalog::update_category,
        handlers::catalog::delete_category,
        handlers::catalog::list_manufacturers,
        handlers::catalog::get_manufacturer,
        handlers::catalog::create_manufacturer,
        handlers::catalog::update_manufacturer,
        handlers::catalog::delete_manufacturer,
        handlers::catalog::list_products,
        handlers::catalog::get_product,
        handlers::catalog::create_product,
        handlers::catalog::update_product,
        handlers::catalog::delete_product,
        handlers::catalog::low_stock,

        // --- Staff ---
        handlers::staff::list_departments,
        handlers::staff::get_department,
        handlers::staff::create_department,
        handlers::staff::update_department,
        handlers::staff::delete_department,
        handlers::staff::list_employees,
        handlers::staff::get_employee,
        handlers::staff::create_employee,
        handlers::staff::update_employee,
        handlers::staff::delete_employee,
        handlers::staff::my_account,

        // --- Items ---
        handlers::inventory::list_items,
        handlers::inventory::create_item,
        handlers::inventory::get_item,
        handlers::inventory::update_item,
        handlers::inventory::delete_item,
        handlers::inventory::list_warehouses,
        handlers::inventory::useful_life,
        handlers::inventory::items_on_shelf,
        handlers::inventory::check_out,
        handlers::inventory::check_in,

        // --- Search ---
        handlers::search::advanced_search,
        handlers::search::quick_search,
        handlers::search::searchable_fields,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::AccessLevels,
            models::auth::Principal,
            models::auth::UserResponse,
            models::auth::CreateUserPayload,
            models::auth::UpdateUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Catalog ---
            models::catalog::Category,
            models::catalog::Manufacturer,
            models::catalog::NamedRef,
            models::catalog::MinimumRequired,
            models::catalog::ProductRecord,
            models::catalog::ProductView,
            models::catalog::LowStockEntry,
            models::catalog::NamePayload,
            models::catalog::UpdateNamePayload,
            models::catalog::CreateProductPayload,
            models::catalog::UpdateProductPayload,

            // --- Staff ---
            models::staff::Department,
            models::staff::Employee,
            models::staff::CreateEmployeePayload,
            models::staff::UpdateEmployeePayload,
            models::staff::MyAccount,

            // --- Items ---
            models::inventory::ItemCondition,
            models::inventory::CheckOutCondition,
            models::inventory::CheckOutEvent,
            models::inventory::CheckInEvent,
            models::inventory::Location,
            models::inventory::Registration,
            models::inventory::ItemRecord,
            models::inventory::ResolvedCheckOut,
            models::inventory::ResolvedCheckIn,
            models::inventory::ItemView,
            models::inventory::UsefulLifeView,
            models::inventory::RegistrationPayload,
            models::inventory::CreateItemPayload,
            models::inventory::UpdateItemPayload,
            models::inventory::CheckInPayload,
            models::inventory::CheckOutPayload,

            // --- Search ---
            models::search::EmployeeOption,
            models::search::SearchableFields,
        )
    ),
    tags(
        (name = "Auth", description = "Login e renovação de token"),
        (name = "Users", description = "Contas de usuário e níveis de acesso"),
        (name = "Catalog", description = "Categorias, fabricantes e produtos"),
        (name = "Staff", description = "Departamentos e funcionários"),
        (name = "Items", description = "Itens físicos, saída e entrada"),
        (name = "Search", description = "Busca avançada e rápida de itens")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

// GET /api-docs/openapi.json
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
