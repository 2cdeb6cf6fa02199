//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use called_element_core::CalledElementError;

#[derive(Debug)]
pub enum AppError {
    Core(CalledElementError),
    UnknownProfile(String),
}

impl From<CalledElementError> for AppError {
    fn from(e: CalledElementError) -> Self {
        Self::Core(e)
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Core(e) => {
                StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            Self::UnknownProfile(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Core(e) => e.kind(),
            Self::UnknownProfile(_) => "unknown_profile",
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Core(e) => e.to_string(),
            Self::UnknownProfile(name) => format!("unknown profile: {}", name),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(kind = self.kind(), "{}", self.message());
        } else {
            tracing::debug!(kind = self.kind(), "{}", self.message());
        }
        let body = serde_json::json!({
            "error": self.message(),
            "kind": self.kind(),
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        let backend = AppError::from(CalledElementError::backend("list_packages")(
            anyhow::anyhow!("down"),
        ));
        assert_eq!(backend.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            AppError::from(CalledElementError::UnresolvedPathToken("t".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::UnknownProfile("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::UnknownProfile("x".into()).kind(), "unknown_profile");
    }
}
