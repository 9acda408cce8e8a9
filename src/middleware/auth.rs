// src/middleware/auth.rs

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::config::AppState;

// O middleware em si: se houver um Bearer válido, guarda o principal nas extensions.
// Quem exige autenticação é o extrator `RequireAccess` de cada handler (401/403).
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(bearer) = request.headers().typed_get::<Authorization<Bearer>>() {
        match app_state.auth_service.validate_token(bearer.token()) {
            Ok(principal) => {
                request.extensions_mut().insert(principal);
            }
            Err(_) => tracing::debug!("Token inválido ignorado"),
        }
    }
    next.run(request).await
}
