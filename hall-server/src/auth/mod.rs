//! 认证模块
//!
//! Authentication happens upstream. Handlers only see a [`Principal`] placed in
//! the request extensions, either by the gateway integration or by the
//! trusted-header middleware.
//!
//! - [`Principal`] / [`CashierPrincipal`] / [`AdminPrincipal`] - extractors (401 / 403)
//! - [`trusted_identity`] - builds the principal from gateway headers

mod extractor;
mod middleware;

pub use extractor::{AdminPrincipal, CashierPrincipal};
pub use middleware::{PRINCIPAL_ID_HEADER, PRINCIPAL_ROLE_HEADER, trusted_identity};

use serde::{Deserialize, Serialize};

/// Authenticated caller role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalRole {
    Cashier,
    Admin,
}

impl std::str::FromStr for PrincipalRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cashier" => Ok(Self::Cashier),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

impl std::fmt::Display for PrincipalRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cashier => f.write_str("cashier"),
            Self::Admin => f.write_str("admin"),
        }
    }
}

/// Authenticated identity. For cashiers `subject` is the cashier id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub subject: String,
    pub role: PrincipalRole,
}

impl Principal {
    pub fn cashier(id: impl Into<String>) -> Self {
        Self {
            subject: id.into(),
            role: PrincipalRole::Cashier,
        }
    }

    pub fn admin(id: impl Into<String>) -> Self {
        Self {
            subject: id.into(),
            role: PrincipalRole::Admin,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == PrincipalRole::Admin
    }
}
