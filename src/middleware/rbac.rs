// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    common::error::AppError,
    models::auth::{Principal, ACCESS_ADMIN, ACCESS_BASIC, ACCESS_OVERVIEW, ACCESS_PUBLIC},
};

/// 1. O trait que define um nível mínimo de acesso
pub trait AccessLevelDef: Send + Sync + 'static {
    const LEVEL: i32;
}

/// 2. O extrator (guardião). Entrega o principal já conferido.
pub struct RequireAccess<L>(pub Principal, pub PhantomData<L>);

pub fn check_access(principal: Option<&Principal>, required: i32) -> Result<&Principal, AppError> {
    // Sem principal = não autenticado (401)
    let principal = principal.ok_or(AppError::InvalidToken)?;
    // Nível abaixo do exigido = proibido (403)
    if principal.access_level < required {
        return Err(AppError::AccessDenied);
    }
    Ok(principal)
}

// 3. Implementação do FromRequestParts
impl<L, S> FromRequestParts<S> for RequireAccess<L>
where
    L: AccessLevelDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let principal = check_access(parts.extensions.get::<Principal>(), L::LEVEL)?;
        Ok(RequireAccess(principal.clone(), PhantomData))
    }
}

// ---
// DEFINIÇÃO DOS NÍVEIS (TIPOS)
// ---
pub struct AccessBasic;
impl AccessLevelDef for AccessBasic {
    const LEVEL: i32 = ACCESS_BASIC;
}

pub struct AccessOverview;
impl AccessLevelDef for AccessOverview {
    const LEVEL: i32 = ACCESS_OVERVIEW;
}

pub struct AccessPublic;
impl AccessLevelDef for AccessPublic {
    const LEVEL: i32 = ACCESS_PUBLIC;
}

pub struct AccessAdmin;
impl AccessLevelDef for AccessAdmin {
    const LEVEL: i32 = ACCESS_ADMIN;
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn at_level(access_level: i32) -> Principal {
        Principal { id: Uuid::new_v4(), username: "tester".into(), access_level, employee_id: None }
    }

    #[test]
    fn missing_principal_is_unauthenticated() {
        assert!(matches!(check_access(None, ACCESS_BASIC), Err(AppError::InvalidToken)));
    }

    #[test]
    fn lower_level_is_forbidden() {
        let p = at_level(ACCESS_OVERVIEW);
        assert!(matches!(check_access(Some(&p), ACCESS_ADMIN), Err(AppError::AccessDenied)));
        assert!(check_access(Some(&p), ACCESS_OVERVIEW).is_ok());
    }
}
