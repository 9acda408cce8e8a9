// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::map_constraint_error, error::AppError},
    models::auth::User,
};

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

// Campos que uma edição pode mudar; `None` mantém o valor atual
#[derive(Debug, Default)]
pub struct UserChanges<'a> {
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub username: Option<&'a str>,
    pub access_level: Option<i32>,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY username ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    // Cria um novo usuário; username duplicado vira erro amigável
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        first_name: &str,
        last_name: &str,
        username: &str,
        password_hash: &str,
        access_level: i32,
        employee_id: Option<Uuid>,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (first_name, last_name, username, password_hash, access_level, employee_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
            .bind(first_name)
            .bind(last_name)
            .bind(username)
            .bind(password_hash)
            .bind(access_level)
            .bind(employee_id)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                map_constraint_error(
                    e,
                    || AppError::AlreadyExists(format!(
                        "The username '{username}' or the employee is already in use."
                    )),
                    || AppError::NotFound("Employee not found.".to_string()),
                )
            })
    }

    pub async fn update_user(&self, id: Uuid, changes: UserChanges<'_>) -> Result<User, AppError> {
        let username = changes.username.unwrap_or_default().to_string();
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                first_name   = COALESCE($2, first_name),
                last_name    = COALESCE($3, last_name),
                username     = COALESCE($4, username),
                access_level = COALESCE($5, access_level),
                updated_at   = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(changes.first_name)
            .bind(changes.last_name)
            .bind(changes.username)
            .bind(changes.access_level)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                map_constraint_error(
                    e,
                    || AppError::AlreadyExists(format!("The username '{username}' is already in use.")),
                    || AppError::BadRequest("Invalid reference.".to_string()),
                )
            })?
            .ok_or_else(|| AppError::NotFound("User not found.".to_string()))
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found.".to_string()));
        }
        Ok(())
    }

    /// Ids internos dos funcionários que já têm conta.
    pub async fn linked_employee_ids(&self) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT employee_id FROM users WHERE employee_id IS NOT NULL",
        )
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }
}
