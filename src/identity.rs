use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Provider,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Provider => "provider",
        }
    }

    pub fn try_parse(s: &str) -> Option<Self> {
        match s {
            "customer" => Some(Role::Customer),
            "provider" => Some(Role::Provider),
            _ => None,
        }
    }
}

/// The verified identity behind a request. Authentication itself happens
/// upstream; the gateway forwards the result in `x-user-id` / `x-user-role`
/// and this service trusts those headers.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: String,
    pub role: Role,
}

pub fn require_principal(headers: &HeaderMap) -> Result<Principal, AppError> {
    let user_id = headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(AppError::Unauthorized)?;

    let role = headers
        .get("x-user-role")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .and_then(Role::try_parse)
        .ok_or(AppError::Unauthorized)?;

    Ok(Principal {
        user_id: user_id.to_string(),
        role,
    })
}
