//! Admin gate extractor.
//!
//! The legacy deployment shipped with a pass-through auth middleware; real
//! authentication lives in a separate service. This extractor keeps that
//! behavior but enforces a static token when `ADMIN_API_TOKEN` is configured,
//! so staging/production deployments are not wide open by accident.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::errors::AppError;
use crate::AppState;

/// Gate for admin endpoints.
///
/// Accepts the token from either `x-auth-token` or `Authorization` (with or
/// without a `Bearer ` prefix). When no token is configured every request
/// passes.
#[derive(Debug, Clone)]
pub struct AdminGate;

impl FromRequestParts<AppState> for AdminGate {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.config.admin_api_token.as_deref() else {
            return Ok(AdminGate);
        };

        let presented = parts
            .headers
            .get("x-auth-token")
            .or_else(|| parts.headers.get("Authorization"))
            .and_then(|v| v.to_str().ok())
            .map(|v| v.strip_prefix("Bearer ").unwrap_or(v))
            .ok_or(AppError::Unauthorized)?;

        if presented != expected {
            return Err(AppError::Unauthorized);
        }

        Ok(AdminGate)
    }
}
