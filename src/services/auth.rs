// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{StaffRepository, UserRepository},
    models::auth::{
        AuthResponse, Claims, CreateUserPayload, LoginUserPayload, Principal, ACCESS_OVERVIEW,
    },
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    staff_repo: StaffRepository,
    jwt_secret: String,
    expiry_days: i64,
    pool: PgPool,
}

pub(crate) async fn hash_password(password: &str) -> Result<String, AppError> {
    let password_clone = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

pub(crate) fn issue_token(secret: &str, expiry_days: i64, principal: &Principal) -> Result<String, AppError> {
    let now = Utc::now();
    let expires_at = now + chrono::Duration::days(expiry_days);

    let claims = Claims {
        sub: principal.id,
        username: principal.username.clone(),
        access_level: principal.access_level,
        employee: principal.employee_id,
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    Ok(encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_ref()))?)
}

// O token carrega o principal inteiro: validar não precisa ir ao banco
pub(crate) fn decode_token(secret: &str, token: &str) -> Result<Principal, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|_| AppError::InvalidToken)?;
    Ok(token_data.claims.principal())
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        staff_repo: StaffRepository,
        jwt_secret: String,
        expiry_days: i64,
        pool: PgPool,
    ) -> Self {
        Self { user_repo, staff_repo, jwt_secret, expiry_days, pool }
    }

    /// Cadastro: sempre com nível OVERVIEW; `employeeId` opcional vincula um funcionário.
    pub async fn register_user(&self, payload: &CreateUserPayload) -> Result<AuthResponse, AppError> {
        // 1. Hashing fora da transação
        let hashed_password = hash_password(&payload.password).await?;

        // --- INÍCIO DA TRANSAÇÃO ---
        let mut tx = self.pool.begin().await?;

        // 2. Resolve o funcionário pelo número "humano"
        let employee = match payload.employee_id {
            Some(number) => Some(
                self.staff_repo
                    .find_by_number(&mut *tx, number)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Employee {number} not found.")))?,
            ),
            None => None,
        };

        // 3. Cria o usuário na mesma transação
        let new_user = self
            .user_repo
            .create_user(
                &mut *tx,
                &payload.first_name,
                &payload.last_name,
                &payload.username,
                &hashed_password,
                ACCESS_OVERVIEW,
                employee.map(|e| e.id),
            )
            .await?;

        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---

        tracing::info!("👤 Usuário '{}' cadastrado.", new_user.username);
        self.respond_with_token(Principal::from(&new_user))
    }

    pub async fn login_user(&self, payload: &LoginUserPayload) -> Result<AuthResponse, AppError> {
        let user = self
            .user_repo
            .find_by_username(&payload.username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = payload.password.clone();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.respond_with_token(Principal::from(&user))
    }

    pub fn refresh(&self, principal: Principal) -> Result<AuthResponse, AppError> {
        self.respond_with_token(principal)
    }

    pub fn validate_token(&self, token: &str) -> Result<Principal, AppError> {
        decode_token(&self.jwt_secret, token)
    }

    fn respond_with_token(&self, principal: Principal) -> Result<AuthResponse, AppError> {
        let auth_token = issue_token(&self.jwt_secret, self.expiry_days, &principal)?;
        Ok(AuthResponse { auth_token, user: principal })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::ACCESS_PUBLIC;
    use uuid::Uuid;

    fn principal() -> Principal {
        Principal {
            id: Uuid::new_v4(),
            username: "jdoe".into(),
            access_level: ACCESS_PUBLIC,
            employee_id: Some(Uuid::new_v4()),
        }
    }

    #[test]
    fn token_carries_the_whole_principal() {
        let p = principal();
        let token = issue_token("segredo", 20, &p).unwrap();
        assert_eq!(decode_token("segredo", &token).unwrap(), p);
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let token = issue_token("segredo", 20, &principal()).unwrap();
        assert!(matches!(decode_token("outro", &token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = issue_token("segredo", -2, &principal()).unwrap();
        assert!(matches!(decode_token("segredo", &token), Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn hashed_password_verifies() {
        let hashed = hash_password("senha-forte").await.unwrap();
        assert!(verify("senha-forte", &hashed).unwrap());
    }
}
