use crate::assessment::{AssessmentError, DatasetError, ModelError, StorageError};
use crate::clients::{CaseManagementError, RepositoryError};
use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Assessment(AssessmentError),
    CaseManagement(CaseManagementError),
    Dataset(DatasetError),
    Serde(serde_json::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Assessment(err) => write!(f, "assessment error: {}", err),
            AppError::CaseManagement(err) => write!(f, "case management error: {}", err),
            AppError::Dataset(err) => write!(f, "dataset error: {}", err),
            AppError::Serde(err) => write!(f, "serialization error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Assessment(err) => Some(err),
            AppError::CaseManagement(err) => Some(err),
            AppError::Dataset(err) => Some(err),
            AppError::Serde(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Assessment(err) => match err {
                AssessmentError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                AssessmentError::Config(_) => StatusCode::BAD_REQUEST,
                AssessmentError::Model(ModelError::NotTrained) => StatusCode::CONFLICT,
                AssessmentError::Model(ModelError::InsufficientData { .. }) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                AssessmentError::Storage(StorageError::Corrupt(_))
                | AssessmentError::Storage(StorageError::Unavailable(_)) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            AppError::CaseManagement(err) => match err {
                CaseManagementError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                CaseManagementError::ClientNotFound(_)
                | CaseManagementError::CaseNotFound(_)
                | CaseManagementError::Repository(RepositoryError::NotFound) => {
                    StatusCode::NOT_FOUND
                }
                CaseManagementError::AlreadyAssigned(_)
                | CaseManagementError::Repository(RepositoryError::Conflict) => {
                    StatusCode::CONFLICT
                }
                CaseManagementError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
                CaseManagementError::Repository(RepositoryError::Unavailable(_)) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            AppError::Dataset(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Serde(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<AssessmentError> for AppError {
    fn from(value: AssessmentError) -> Self {
        Self::Assessment(value)
    }
}

impl From<CaseManagementError> for AppError {
    fn from(value: CaseManagementError) -> Self {
        Self::CaseManagement(value)
    }
}

impl From<DatasetError> for AppError {
    fn from(value: DatasetError) -> Self {
        Self::Dataset(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}
