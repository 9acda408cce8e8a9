// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// ---
// Níveis de acesso (quanto maior, mais permissões)
// ---
pub const ACCESS_BASIC: i32 = 0;
pub const ACCESS_OVERVIEW: i32 = 10;
pub const ACCESS_PUBLIC: i32 = 20;
pub const ACCESS_ADMIN: i32 = 30;

// Usuários de demonstração que ninguém pode editar
pub const PROTECTED_USERNAMES: [&str; 3] = ["admin", "public", "overview"];

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct AccessLevels {
    #[serde(rename = "ACCESS_BASIC")]
    pub basic: i32,
    #[serde(rename = "ACCESS_OVERVIEW")]
    pub overview: i32,
    #[serde(rename = "ACCESS_PUBLIC")]
    pub public: i32,
    #[serde(rename = "ACCESS_ADMIN")]
    pub admin: i32,
}

pub const ACCESS_LEVELS: AccessLevels = AccessLevels {
    basic: ACCESS_BASIC,
    overview: ACCESS_OVERVIEW,
    public: ACCESS_PUBLIC,
    admin: ACCESS_ADMIN,
};

pub fn validate_access_level(level: i32) -> Result<(), ValidationError> {
    if [ACCESS_BASIC, ACCESS_OVERVIEW, ACCESS_PUBLIC, ACCESS_ADMIN].contains(&level) {
        return Ok(());
    }
    let mut err = ValidationError::new("access_level");
    err.message = Some("Access level must be 0, 10, 20 or 30.".into());
    Err(err)
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password_hash: String,
    pub access_level: i32,
    // Funcionário vinculado (id interno)
    pub employee_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// O que sai na API: nunca o hash
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub access_level: i32,
    pub employee_id: Option<Uuid>,
    pub levels: AccessLevels,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            username: user.username.clone(),
            access_level: user.access_level,
            employee_id: user.employee_id,
            levels: ACCESS_LEVELS,
        }
    }
}

// Dados para cadastro de um novo usuário
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[validate(length(min = 1, message = "First name is required."))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required."))]
    pub last_name: String,
    #[validate(length(min = 4, max = 30, message = "Username must have between 4 and 30 characters."))]
    pub username: String,
    #[validate(length(min = 7, max = 30, message = "Password must have between 7 and 30 characters."))]
    pub password: String,
    // employeeId "humano" do funcionário, opcional
    pub employee_id: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    pub id: Uuid,
    #[validate(length(min = 1, message = "First name can't be empty."))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, message = "Last name can't be empty."))]
    pub last_name: Option<String>,
    #[validate(length(min = 4, max = 30, message = "Username must have between 4 and 30 characters."))]
    pub username: Option<String>,
    #[validate(custom(function = "validate_access_level"))]
    pub access_level: Option<i32>,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(length(min = 1, message = "Username is required."))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required."))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub auth_token: String,
    pub user: Principal,
}

// O "principal" autenticado: vai dentro do token e nas extensions da requisição
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: Uuid,
    pub username: String,
    pub access_level: i32,
    pub employee_id: Option<Uuid>,
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            access_level: user.access_level,
            employee_id: user.employee_id,
        }
    }
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub username: String,
    pub access_level: i32,
    pub employee: Option<Uuid>,
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

impl Claims {
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.sub,
            username: self.username.clone(),
            access_level: self.access_level,
            employee_id: self.employee,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_known_access_levels_are_accepted() {
        assert!(validate_access_level(ACCESS_ADMIN).is_ok());
        assert!(validate_access_level(15).is_err());
    }

    #[test]
    fn short_passwords_are_rejected() {
        let payload = CreateUserPayload {
            first_name: "Ana".into(),
            last_name: "Souza".into(),
            username: "asouza".into(),
            password: "123".into(),
            employee_id: None,
        };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }
}
