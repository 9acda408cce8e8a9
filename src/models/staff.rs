// src/models/staff.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::inventory::ItemRecord;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Funcionário com o nome do departamento já resolvido.
// `employee_id` é o número "humano"; `id` é o identificador interno.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Uuid,
    pub employee_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub department_id: Option<Uuid>,
    pub department: Option<String>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeePayload {
    #[validate(range(min = 1, message = "Employee ID must be a positive number."))]
    pub employee_id: i64,
    #[validate(length(min = 1, message = "First name is required."))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required."))]
    pub last_name: String,
    pub department: Option<Uuid>,
}

// Só nome e departamento podem mudar; o employeeId identifica o registro
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployeePayload {
    pub employee_id: i64,
    #[validate(length(min = 1, message = "First name can't be empty."))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, message = "Last name can't be empty."))]
    pub last_name: Option<String>,
    pub department: Option<Uuid>,
}

// Resposta de /my-account: o funcionário e o que está com ele agora
#[derive(Debug, Serialize, ToSchema)]
pub struct MyAccount {
    pub employee: Employee,
    pub items: Vec<ItemRecord>,
}
