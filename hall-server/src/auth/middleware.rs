//! 可信身份头中间件
//!
//! The upstream gateway authenticates the caller and forwards its identity as
//! `x-principal-id` / `x-principal-role`. Only honoured when
//! `TRUST_IDENTITY_HEADERS` is enabled.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::{AppError, ErrorCode};

use super::{Principal, PrincipalRole};
use crate::core::ServerState;

pub const PRINCIPAL_ID_HEADER: &str = "x-principal-id";
pub const PRINCIPAL_ROLE_HEADER: &str = "x-principal-role";

fn header<'a>(req: &'a Request, name: &str) -> Option<&'a str> {
    req.headers()
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Insert a [`Principal`] built from the gateway headers.
///
/// Requests without the headers pass through untouched; the extractors reject
/// them where a principal is required.
pub async fn trusted_identity(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !state.config.trust_identity_headers || req.extensions().get::<Principal>().is_some() {
        return Ok(next.run(req).await);
    }

    let principal = match (
        header(&req, PRINCIPAL_ID_HEADER),
        header(&req, PRINCIPAL_ROLE_HEADER),
    ) {
        (Some(subject), Some(role)) => {
            let role: PrincipalRole = role.parse().map_err(|e: String| {
                tracing::warn!(uri = %req.uri(), error = %e, "Rejected identity header");
                AppError::with_message(ErrorCode::TokenInvalid, e)
            })?;
            Some(Principal {
                subject: subject.to_string(),
                role,
            })
        }
        _ => None,
    };

    if let Some(principal) = principal {
        req.extensions_mut().insert(principal);
    }
    Ok(next.run(req).await)
}
