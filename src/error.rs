use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProducerError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("http status code: {0}")]
    HttpStatus(u16),

    #[error("message: {message}, code: {code}")]
    Transport { message: String, code: String },

    #[error("message: {0}, code: EPARSE")]
    Parse(String),

    #[error("message: {0}, code: ERANGE")]
    Range(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl ProducerError {
    pub fn transport(message: impl Into<String>, code: impl Into<String>) -> Self {
        ProducerError::Transport {
            message: message.into(),
            code: code.into(),
        }
    }

    /// Only a non-200 answer from the backend counts as an HTTP-layer failure;
    /// everything else that can go wrong during a cycle is transport-class.
    pub fn is_transport_error(&self) -> bool {
        !matches!(self, ProducerError::HttpStatus(_))
    }
}

impl From<serde_json::Error> for ProducerError {
    fn from(err: serde_json::Error) -> Self {
        ProducerError::Parse(err.to_string())
    }
}

impl From<std::io::Error> for ProducerError {
    fn from(err: std::io::Error) -> Self {
        ProducerError::Io(err.to_string())
    }
}

impl From<reqwest::Error> for ProducerError {
    fn from(err: reqwest::Error) -> Self {
        let code = crate::transport::error_code(&err);
        ProducerError::Transport {
            message: err.to_string(),
            code,
        }
    }
}

impl IntoResponse for ProducerError {
    fn into_response(self) -> Response {
        let status = match self {
            ProducerError::NotFound(_) => StatusCode::NOT_FOUND,
            ProducerError::Configuration(_) | ProducerError::Parse(_) | ProducerError::Range(_) => {
                StatusCode::BAD_REQUEST
            }
            ProducerError::HttpStatus(_) | ProducerError::Transport { .. } => StatusCode::BAD_GATEWAY,
            ProducerError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ProducerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptions() {
        assert_eq!(ProducerError::HttpStatus(503).to_string(), "http status code: 503");
        assert_eq!(
            ProducerError::transport("connection refused", "ECONNREFUSED").to_string(),
            "message: connection refused, code: ECONNREFUSED"
        );
        assert!(ProducerError::Parse("EOF".into()).to_string().ends_with("code: EPARSE"));
    }

    #[test]
    fn test_transport_classification() {
        assert!(!ProducerError::HttpStatus(404).is_transport_error());
        assert!(ProducerError::transport("x", "y").is_transport_error());
        assert!(ProducerError::Parse("x".into()).is_transport_error());
        assert!(ProducerError::Range("x".into()).is_transport_error());
    }
}
