// src/services/staff_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ItemRepository, StaffRepository},
    models::{
        inventory::Item,
        staff::{CreateEmployeePayload, Department, Employee, MyAccount, UpdateEmployeePayload},
    },
};

#[derive(Clone)]
pub struct StaffService {
    staff_repo: StaffRepository,
    item_repo: ItemRepository,
}

impl StaffService {
    pub fn new(staff_repo: StaffRepository, item_repo: ItemRepository) -> Self {
        Self { staff_repo, item_repo }
    }

    // ---
    // Departamentos
    // ---
    pub async fn list_departments(&self) -> Result<Vec<Department>, AppError> {
        self.staff_repo.list_departments().await
    }

    pub async fn get_department(&self, id: Uuid) -> Result<Department, AppError> {
        self.staff_repo.find_department(id).await
    }

    pub async fn create_department(&self, name: &str) -> Result<Department, AppError> {
        self.staff_repo.create_department(name.trim()).await
    }

    pub async fn rename_department(&self, id: Uuid, name: &str) -> Result<Department, AppError> {
        self.staff_repo.rename_department(id, name.trim()).await
    }

    pub async fn delete_department(&self, id: Uuid) -> Result<(), AppError> {
        self.staff_repo.delete_department(id).await
    }

    // ---
    // Funcionários (chave = employeeId "humano")
    // ---
    pub async fn list_employees(&self) -> Result<Vec<Employee>, AppError> {
        self.staff_repo.list_employees().await
    }

    pub async fn get_employee(&self, employee_id: i64) -> Result<Employee, AppError> {
        self.staff_repo.find_by_number_or_fail(employee_id).await
    }

    pub async fn create_employee(&self, payload: &CreateEmployeePayload) -> Result<Employee, AppError> {
        let employee = self
            .staff_repo
            .create_employee(
                payload.employee_id,
                payload.first_name.trim(),
                payload.last_name.trim(),
                payload.department,
            )
            .await?;
        tracing::info!("🧑 Funcionário {} cadastrado.", employee.employee_id);
        Ok(employee)
    }

    pub async fn update_employee(
        &self,
        path_employee_id: i64,
        payload: &UpdateEmployeePayload,
    ) -> Result<Employee, AppError> {
        if payload.employee_id != path_employee_id {
            return Err(AppError::BadRequest(
                "The employee ID in the path and body don't match.".to_string(),
            ));
        }
        self.staff_repo
            .update_employee(
                path_employee_id,
                payload.first_name.as_deref().map(str::trim),
                payload.last_name.as_deref().map(str::trim),
                payload.department,
            )
            .await
    }

    pub async fn delete_employee(&self, employee_id: i64) -> Result<(), AppError> {
        self.staff_repo.delete_employee(employee_id).await
    }

    /// O funcionário e os itens que estão com ele agora.
    pub async fn my_account(&self, employee_id: i64) -> Result<MyAccount, AppError> {
        let employee = self.staff_repo.find_by_number_or_fail(employee_id).await?;
        let items = self.item_repo.held_by(employee.id).await?;
        Ok(MyAccount {
            employee,
            items: items.iter().map(Item::compact).collect(),
        })
    }
}
