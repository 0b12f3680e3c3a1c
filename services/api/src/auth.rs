use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use casework::config::AuthConfig;
use serde_json::json;

/// Bearer tokens the running service accepts, shared with handlers through
/// request extensions. When no token is configured at all the service runs
/// open, which is how local development and the router tests operate.
#[derive(Debug, Clone, Default)]
pub(crate) struct AuthState {
    admin_token: Option<String>,
    case_worker_token: Option<String>,
}

impl AuthState {
    pub(crate) fn from_config(config: &AuthConfig) -> Self {
        Self {
            admin_token: config.admin_token.clone(),
            case_worker_token: config.case_worker_token.clone(),
        }
    }

    fn enabled(&self) -> bool {
        self.admin_token.is_some() || self.case_worker_token.is_some()
    }

    fn check_admin(&self, bearer: Option<&str>) -> Result<(), AuthRejection> {
        if !self.enabled() {
            return Ok(());
        }
        let token = bearer.ok_or(AuthRejection::MissingCredentials)?;
        if self.admin_token.as_deref() == Some(token) {
            Ok(())
        } else {
            Err(AuthRejection::Forbidden)
        }
    }

    fn check_staff(&self, bearer: Option<&str>) -> Result<(), AuthRejection> {
        if !self.enabled() {
            return Ok(());
        }
        let token = bearer.ok_or(AuthRejection::MissingCredentials)?;
        if self.admin_token.as_deref() == Some(token)
            || self.case_worker_token.as_deref() == Some(token)
        {
            Ok(())
        } else {
            Err(AuthRejection::Forbidden)
        }
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
}

fn auth_state(parts: &Parts) -> AuthState {
    parts
        .extensions
        .get::<AuthState>()
        .cloned()
        .unwrap_or_default()
}

/// Extractor gating the admin-only endpoints.
pub(crate) struct RequireAdmin;

#[axum::async_trait]
impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        auth_state(parts).check_admin(bearer_token(parts))?;
        Ok(Self)
    }
}

/// Extractor gating endpoints open to either recognized role.
pub(crate) struct RequireStaff;

#[axum::async_trait]
impl<S> FromRequestParts<S> for RequireStaff
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        auth_state(parts).check_staff(bearer_token(parts))?;
        Ok(Self)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum AuthRejection {
    MissingCredentials,
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthRejection::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "missing bearer token")
            }
            AuthRejection::Forbidden => (StatusCode::FORBIDDEN, "insufficient permissions"),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
