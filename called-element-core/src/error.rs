use thiserror::Error;

/// Request-level failures. Per-asset problems (unparsable markup, unreadable
/// source, missing preview, undecodable legacy id) never surface here; they
/// are logged and the asset is skipped or degraded.
#[derive(Debug, Error)]
pub enum CalledElementError {
    #[error("backend unavailable during {operation}: {source}")]
    BackendUnavailable {
        operation: &'static str,
        source: anyhow::Error,
    },

    #[error("path token does not resolve to an asset: {0}")]
    UnresolvedPathToken(String),

    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),
}

impl CalledElementError {
    /// Wrap a collaborator failure for `operation`.
    pub fn backend(operation: &'static str) -> impl FnOnce(anyhow::Error) -> Self {
        move |source| Self::BackendUnavailable { operation, source }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            Self::BackendUnavailable { .. } => 503,
            Self::UnresolvedPathToken(_) => 404,
            Self::MissingParameter(_) => 400,
        }
    }

    /// Stable machine-readable name for error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BackendUnavailable { .. } => "backend_unavailable",
            Self::UnresolvedPathToken(_) => "unresolved_path_token",
            Self::MissingParameter(_) => "missing_parameter",
        }
    }
}

pub type Result<T> = std::result::Result<T, CalledElementError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_per_variant() {
        let err = CalledElementError::backend("list_packages")(anyhow::anyhow!("down"));
        assert_eq!(err.http_status(), 503);
        assert_eq!(
            CalledElementError::UnresolvedPathToken("x".into()).http_status(),
            404
        );
        assert_eq!(CalledElementError::MissingParameter("pid").http_status(), 400);
    }

    #[test]
    fn display_backend_unavailable() {
        let err = CalledElementError::backend("list_packages")(anyhow::anyhow!("connection refused"));
        assert_eq!(
            err.to_string(),
            "backend unavailable during list_packages: connection refused"
        );
        assert_eq!(err.kind(), "backend_unavailable");
    }

    #[test]
    fn display_missing_parameter() {
        let err = CalledElementError::MissingParameter("ppackage");
        assert_eq!(err.to_string(), "missing required parameter: ppackage");
        assert_eq!(err.kind(), "missing_parameter");
    }
}
