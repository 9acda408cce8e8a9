// src/services/user_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{user_repo::UserChanges, UserRepository},
    models::auth::{Principal, UpdateUserPayload, User, UserResponse, ACCESS_PUBLIC, PROTECTED_USERNAMES},
};

/// Regras de edição de usuário. Tudo que falhar aqui é 403.
pub fn check_edit_allowed(
    caller: &Principal,
    target: &User,
    requested_level: Option<i32>,
) -> Result<(), AppError> {
    // Contas de demonstração ficam congeladas
    if PROTECTED_USERNAMES.contains(&target.username.as_str()) {
        return Err(AppError::AccessDenied);
    }
    // Até PUBLIC, só o próprio registro
    if caller.access_level <= ACCESS_PUBLIC && caller.id != target.id {
        return Err(AppError::AccessDenied);
    }
    if target.access_level > caller.access_level {
        return Err(AppError::AccessDenied);
    }
    if requested_level.is_some_and(|level| level > caller.access_level) {
        return Err(AppError::AccessDenied);
    }
    Ok(())
}

#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
}

impl UserService {
    pub fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }

    pub async fn list_users(&self) -> Result<Vec<UserResponse>, AppError> {
        let users = self.user_repo.list().await?;
        Ok(users.iter().map(UserResponse::from).collect())
    }

    pub async fn get_user(&self, id: Uuid) -> Result<UserResponse, AppError> {
        self.user_repo
            .find_by_id(id)
            .await?
            .map(|u| UserResponse::from(&u))
            .ok_or_else(|| AppError::NotFound("User not found.".to_string()))
    }

    pub async fn update_user(
        &self,
        caller: &Principal,
        path_id: Uuid,
        payload: &UpdateUserPayload,
    ) -> Result<UserResponse, AppError> {
        if payload.id != path_id {
            return Err(AppError::BadRequest("The id in the path and body don't match.".to_string()));
        }

        let target = self
            .user_repo
            .find_by_id(path_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;

        check_edit_allowed(caller, &target, payload.access_level)?;

        let updated = self
            .user_repo
            .update_user(
                path_id,
                UserChanges {
                    first_name: payload.first_name.as_deref(),
                    last_name: payload.last_name.as_deref(),
                    username: payload.username.as_deref(),
                    access_level: payload.access_level,
                },
            )
            .await?;
        Ok(UserResponse::from(&updated))
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<(), AppError> {
        self.user_repo.delete_user(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::{ACCESS_ADMIN, ACCESS_OVERVIEW};
    use chrono::Utc;

    fn user(username: &str, level: i32) -> User {
        User {
            id: Uuid::new_v4(),
            first_name: "Test".into(),
            last_name: "User".into(),
            username: username.into(),
            password_hash: String::new(),
            access_level: level,
            employee_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn caller_of(user: &User) -> Principal {
        Principal::from(user)
    }

    #[test]
    fn demo_accounts_are_frozen_even_for_admins() {
        let admin = user("root", ACCESS_ADMIN);
        let demo = user("public", ACCESS_PUBLIC);
        assert!(check_edit_allowed(&caller_of(&admin), &demo, None).is_err());
    }

    #[test]
    fn low_levels_only_edit_themselves() {
        let me = user("someone", ACCESS_OVERVIEW);
        let other = user("another", ACCESS_OVERVIEW);
        assert!(check_edit_allowed(&caller_of(&me), &me, None).is_ok());
        assert!(check_edit_allowed(&caller_of(&me), &other, None).is_err());
    }

    #[test]
    fn nobody_grants_above_their_own_level() {
        let me = user("someone", ACCESS_OVERVIEW);
        assert!(check_edit_allowed(&caller_of(&me), &me, Some(ACCESS_ADMIN)).is_err());

        let admin = user("boss", ACCESS_ADMIN);
        let target = user("worker", ACCESS_OVERVIEW);
        assert!(check_edit_allowed(&caller_of(&admin), &target, Some(ACCESS_PUBLIC)).is_ok());
    }
}
