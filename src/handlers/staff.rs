// src/handlers/staff.rs

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
    models::{
        catalog::{NamePayload, UpdateNamePayload},
        staff::{CreateEmployeePayload, Department, Employee, MyAccount, UpdateEmployeePayload},
    },
};

// =============================================================================
//  1. DEPARTAMENTOS
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/departments",
    tag = "Staff",
    responses((status = 200, body = [Department])),
    security(("api_jwt" = []))
)]
pub async fn list_departments(
    State(app_state): State<AppState>,
    _guard: RequireAccess<AccessBasic>,
) -> Result<Json<Vec<Department>>, AppError> {
    tracing::info!("Getting all departments");
    Ok(Json(app_state.staff_service.list_departments().await?))
}

#[utoipa::path(
    get,
    path = "/api/departments/{id}",
    tag = "Staff",
    params(("id" = Uuid, Path, description = "ID do departamento")),
    responses((status = 200, body = Department)),
    security(("api_jwt" = []))
)]
pub async fn get_department(
    State(app_state): State<AppState>,
    _guard: RequireAccess<AccessBasic>,
    Path(id): Path<Uuid>,
) -> Result<Json<Department>, AppError> {
    tracing::info!("Getting department {}", id);
    Ok(Json(app_state.staff_service.get_department(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/departments",
    tag = "Staff",
    request_body = NamePayload,
    responses((status = 201, body = Department)),
    security(("api_jwt" = []))
)]
pub async fn create_department(
    State(app_state): State<AppState>,
    _guard: RequireAccess<AccessPublic>,
    Json(payload): Json<NamePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    tracing::info!("Creating department '{}'", payload.name);

    let department = app_state.staff_service.create_department(&payload.name).await?;
    Ok((StatusCode::CREATED, Json(department)))
}

#[utoipa::path(
    put,
    path = "/api/departments/{id}",
    tag = "Staff",
    params(("id" = Uuid, Path, description = "ID do departamento")),
    request_body = UpdateNamePayload,
    responses((status = 200, body = Department)),
    security(("api_jwt" = []))
)]
pub async fn update_department(
    State(app_state): State<AppState>,
    _guard: RequireAccess<AccessPublic>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateNamePayload>,
) -> Result<Json<Department>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    if payload.id != id {
        return Err(AppError::BadRequest("The id in the path and body don't match.".to_string()));
    }
    tracing::info!("Updating department {}", id);

    Ok(Json(app_state.staff_service.rename_department(id, &payload.name).await?))
}

#[utoipa::path(
    delete,
    path = "/api/departments/{id}",
    tag = "Staff",
    params(("id" = Uuid, Path, description = "ID do departamento")),
    responses(
        (status = 204, description = "Departamento removido"),
        (status = 400, description = "Ainda tem funcionários")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_department(
    State(app_state): State<AppState>,
    _guard: RequireAccess<AccessAdmin>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    tracing::info!("Deleting department {}", id);
    app_state.staff_service.delete_department(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  2. FUNCIONÁRIOS (chave = employeeId)
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/employees",
    tag = "Staff",
    responses((status = 200, body = [Employee])),
    security(("api_jwt" = []))
)]
pub async fn list_employees(
    State(app_state): State<AppState>,
    _guard: RequireAccess<AccessBasic>,
) -> Result<Json<Vec<Employee>>, AppError> {
    tracing::info!("Getting all employees");
    Ok(Json(app_state.staff_service.list_employees().await?))
}

#[utoipa::path(
    get,
    path = "/api/employees/{employee_id}",
    tag = "Staff",
    params(("employee_id" = i64, Path, description = "Número do funcionário")),
    responses((status = 200, body = Employee)),
    security(("api_jwt" = []))
)]
pub async fn get_employee(
    State(app_state): State<AppState>,
    _guard: RequireAccess<AccessBasic>,
    Path(employee_id): Path<i64>,
) -> Result<Json<Employee>, AppError> {
    tracing::info!("Getting employee {}", employee_id);
    Ok(Json(app_state.staff_service.get_employee(employee_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/employees",
    tag = "Staff",
    request_body = CreateEmployeePayload,
    responses((status = 201, body = Employee)),
    security(("api_jwt" = []))
)]
pub async fn create_employee(
    State(app_state): State<AppState>,
    _guard: RequireAccess<AccessAdmin>,
    Json(payload): Json<CreateEmployeePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    tracing::info!("Creating employee {}", payload.employee_id);

    let employee = app_state.staff_service.create_employee(&payload).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

#[utoipa::path(
    put,
    path = "/api/employees/{employee_id}",
    tag = "Staff",
    params(("employee_id" = i64, Path, description = "Número do funcionário")),
    request_body = UpdateEmployeePayload,
    responses((status = 200, body = Employee)),
    security(("api_jwt" = []))
)]
pub async fn update_employee(
    State(app_state): State<AppState>,
    _guard: RequireAccess<AccessAdmin>,
    Path(employee_id): Path<i64>,
    Json(payload): Json<UpdateEmployeePayload>,
) -> Result<Json<Employee>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    tracing::info!("Updating employee {}", employee_id);

    Ok(Json(app_state.staff_service.update_employee(employee_id, &payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/employees/{employee_id}",
    tag = "Staff",
    params(("employee_id" = i64, Path, description = "Número do funcionário")),
    responses((status = 204, description = "Funcionário e conta vinculada removidos")),
    security(("api_jwt" = []))
)]
pub async fn delete_employee(
    State(app_state): State<AppState>,
    _guard: RequireAccess<AccessAdmin>,
    Path(employee_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    tracing::info!("Deleting employee {}", employee_id);
    app_state.staff_service.delete_employee(employee_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/my-account/{employee_id}
#[utoipa::path(
    get,
    path = "/api/my-account/{employee_id}",
    tag = "Staff",
    params(("employee_id" = i64, Path, description = "Número do funcionário")),
    responses((status = 200, description = "Funcionário e itens com ele", body = MyAccount)),
    security(("api_jwt" = []))
)]
pub async fn my_account(
    State(app_state): State<AppState>,
    _guard: RequireAccess<AccessOverview>,
    Path(employee_id): Path<i64>,
) -> Result<Json<MyAccount>, AppError> {
    tracing::info!("Getting account of employee {}", employee_id);
    Ok(Json(app_state.staff_service.my_account(employee_id).await?))
}
