use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::stays::{StayError, StayReportError, StaySyncError};
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
    Input(serde_json::Error),
    Export(csv::Error),
    Stays(StayError),
    Sync(StaySyncError),
    Report(StayReportError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Input(err) => write!(f, "invalid daily record input: {}", err),
            AppError::Export(err) => write!(f, "report export failed: {}", err),
            AppError::Stays(err) => write!(f, "stay calculation error: {}", err),
            AppError::Sync(err) => write!(f, "stay sync error: {}", err),
            AppError::Report(err) => write!(f, "stay report error: {}", err),
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
            AppError::Input(err) => Some(err),
            AppError::Export(err) => Some(err),
            AppError::Stays(err) => Some(err),
            AppError::Sync(err) => Some(err),
            AppError::Report(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Input(_)
            | AppError::Stays(_)
            | AppError::Sync(StaySyncError::Calculation(_))
            | AppError::Report(StayReportError::Calculation(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Sync(_) | AppError::Report(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
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

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Input(value)
    }
}

impl From<csv::Error> for AppError {
    fn from(value: csv::Error) -> Self {
        Self::Export(value)
    }
}

impl From<StayError> for AppError {
    fn from(value: StayError) -> Self {
        Self::Stays(value)
    }
}

impl From<StaySyncError> for AppError {
    fn from(value: StaySyncError) -> Self {
        Self::Sync(value)
    }
}

impl From<StayReportError> for AppError {
    fn from(value: StayReportError) -> Self {
        Self::Report(value)
    }
}
