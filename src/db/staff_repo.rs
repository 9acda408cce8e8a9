// src/db/staff_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::map_constraint_error, error::AppError},
    models::staff::{Department, Employee},
};

// Funcionário + nome do departamento. `{source}` é a tabela ou CTE de origem.
fn employee_select(source: &str) -> String {
    format!(
        r#"
        SELECT e.id, e.employee_id, e.first_name, e.last_name, e.department_id, d.name AS department
        FROM {source} e
        LEFT JOIN departments d ON d.id = e.department_id
        "#
    )
}

#[derive(Clone)]
pub struct StaffRepository {
    pool: PgPool,
}

impl StaffRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Departamentos
    // ---
    pub async fn list_departments(&self) -> Result<Vec<Department>, AppError> {
        let departments = sqlx::query_as::<_, Department>("SELECT * FROM departments ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(departments)
    }

    pub async fn find_department(&self, id: Uuid) -> Result<Department, AppError> {
        sqlx::query_as::<_, Department>("SELECT * FROM departments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Department not found.".to_string()))
    }

    pub async fn create_department(&self, name: &str) -> Result<Department, AppError> {
        sqlx::query_as::<_, Department>("INSERT INTO departments (name) VALUES ($1) RETURNING *")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                map_constraint_error(
                    e,
                    || AppError::AlreadyExists(format!("Department '{name}' already exists.")),
                    || AppError::BadRequest("Invalid reference.".to_string()),
                )
            })
    }

    pub async fn rename_department(&self, id: Uuid, name: &str) -> Result<Department, AppError> {
        sqlx::query_as::<_, Department>(
            "UPDATE departments SET name = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
            .bind(id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                map_constraint_error(
                    e,
                    || AppError::AlreadyExists(format!("Department '{name}' already exists.")),
                    || AppError::BadRequest("Invalid reference.".to_string()),
                )
            })?
            .ok_or_else(|| AppError::NotFound("Department not found.".to_string()))
    }

    pub async fn delete_department(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM departments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                map_constraint_error(
                    e,
                    || AppError::BadRequest("Invalid reference.".to_string()),
                    || AppError::StillReferenced(
                        "Department still has employees. Move them first.".to_string(),
                    ),
                )
            })?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Department not found.".to_string()));
        }
        Ok(())
    }

    // ---
    // Funcionários
    // ---
    pub async fn list_employees(&self) -> Result<Vec<Employee>, AppError> {
        let sql = format!("{} ORDER BY e.last_name ASC, e.first_name ASC", employee_select("employees"));
        let employees = sqlx::query_as::<_, Employee>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(employees)
    }

    /// Busca pelo número "humano" (employeeId).
    pub async fn find_by_number<'e, E>(
        &self,
        executor: E,
        employee_id: i64,
    ) -> Result<Option<Employee>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // SQL estático: o executor pode viver mais que uma String local
        let employee = sqlx::query_as::<_, Employee>(
            r#"
            SELECT e.id, e.employee_id, e.first_name, e.last_name, e.department_id, d.name AS department
            FROM employees e
            LEFT JOIN departments d ON d.id = e.department_id
            WHERE e.employee_id = $1
            "#,
        )
            .bind(employee_id)
            .fetch_optional(executor)
            .await?;
        Ok(employee)
    }

    pub async fn find_by_number_or_fail(&self, employee_id: i64) -> Result<Employee, AppError> {
        self.find_by_number(&self.pool, employee_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Employee {employee_id} not found.")))
    }

    pub async fn create_employee(
        &self,
        employee_id: i64,
        first_name: &str,
        last_name: &str,
        department_id: Option<Uuid>,
    ) -> Result<Employee, AppError> {
        let sql = format!(
            r#"
            WITH inserted AS (
                INSERT INTO employees (employee_id, first_name, last_name, department_id)
                VALUES ($1, $2, $3, $4)
                RETURNING *
            )
            {}
            "#,
            employee_select("inserted")
        );
        sqlx::query_as::<_, Employee>(&sql)
            .bind(employee_id)
            .bind(first_name)
            .bind(last_name)
            .bind(department_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                map_constraint_error(
                    e,
                    || AppError::AlreadyExists(format!("Employee ID {employee_id} is already in use.")),
                    || AppError::NotFound("Department not found.".to_string()),
                )
            })
    }

    pub async fn update_employee(
        &self,
        employee_id: i64,
        first_name: Option<&str>,
        last_name: Option<&str>,
        department_id: Option<Uuid>,
    ) -> Result<Employee, AppError> {
        let sql = format!(
            r#"
            WITH updated AS (
                UPDATE employees SET
                    first_name    = COALESCE($2, first_name),
                    last_name     = COALESCE($3, last_name),
                    department_id = COALESCE($4, department_id),
                    updated_at    = now()
                WHERE employee_id = $1
                RETURNING *
            )
            {}
            "#,
            employee_select("updated")
        );
        sqlx::query_as::<_, Employee>(&sql)
            .bind(employee_id)
            .bind(first_name)
            .bind(last_name)
            .bind(department_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                map_constraint_error(
                    e,
                    || AppError::BadRequest("Invalid reference.".to_string()),
                    || AppError::NotFound("Department not found.".to_string()),
                )
            })?
            .ok_or_else(|| AppError::NotFound(format!("Employee {employee_id} not found.")))
    }

    // A conta de usuário vinculada cai junto (CASCADE)
    pub async fn delete_employee(&self, employee_id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM employees WHERE employee_id = $1")
            .bind(employee_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Employee {employee_id} not found.")));
        }
        Ok(())
    }
}
