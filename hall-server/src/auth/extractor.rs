//! Principal extractors

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::error::{AppError, ErrorCode};

use super::{Principal, PrincipalRole};

/// Any authenticated caller
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Principal>() {
            Some(principal) => Ok(principal.clone()),
            None => {
                tracing::debug!(uri = %parts.uri, "Request without principal");
                Err(AppError::unauthorized())
            }
        }
    }
}

/// Caller must be a cashier; `0.subject` is the cashier id
#[derive(Debug, Clone)]
pub struct CashierPrincipal(pub Principal);

impl CashierPrincipal {
    pub fn cashier_id(&self) -> &str {
        &self.0.subject
    }
}

impl<S> FromRequestParts<S> for CashierPrincipal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let principal = Principal::from_request_parts(parts, state).await?;
        if principal.role != PrincipalRole::Cashier {
            tracing::warn!(subject = %principal.subject, role = %principal.role, uri = %parts.uri, "Cashier role required");
            return Err(AppError::with_message(
                ErrorCode::RoleRequired,
                "Cashier role required",
            ));
        }
        Ok(Self(principal))
    }
}

/// Caller must be an admin
#[derive(Debug, Clone)]
pub struct AdminPrincipal(pub Principal);

impl<S> FromRequestParts<S> for AdminPrincipal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let principal = Principal::from_request_parts(parts, state).await?;
        if !principal.is_admin() {
            tracing::warn!(subject = %principal.subject, role = %principal.role, uri = %parts.uri, "Admin role required");
            return Err(AppError::new(ErrorCode::AdminRequired));
        }
        Ok(Self(principal))
    }
}
