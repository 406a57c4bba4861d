//! Client error types

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid client configuration: {0}")]
    Config(String),

    #[error("IAM authentication failed: {0}")]
    Auth(String),

    /// Non-2xx response from the VPC API
    #[error("API error (HTTP {status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
        trace: Option<String>,
    },

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// HTTP status of an API error
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Build an API error from a response status and raw body
    ///
    /// The VPC API reports failures as
    /// `{"errors": [{"code", "message", "more_info"}], "trace", "status_code"}`;
    /// bodies that do not parse are surfaced verbatim.
    pub fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(parsed) if !parsed.errors.is_empty() => {
                let first = &parsed.errors[0];
                let message = parsed
                    .errors
                    .iter()
                    .map(|e| e.message.as_str())
                    .collect::<Vec<_>>()
                    .join("; ");
                ClientError::Api {
                    status,
                    code: Some(first.code.clone()),
                    message,
                    trace: parsed.trace,
                }
            }
            _ => ClientError::Api {
                status,
                code: None,
                message: if body.trim().is_empty() {
                    "empty response body".to_string()
                } else {
                    body.trim().to_string()
                },
                trace: None,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    errors: Vec<ApiErrorDetail>,
    trace: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    code: String,
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_vpc_error_body() {
        let body = r#"{
            "errors": [{
                "code": "not_found",
                "message": "VPC not found",
                "more_info": "https://cloud.ibm.com/docs/vpc?topic=vpc-rias-error-messages"
            }],
            "trace": "7a3b1c",
            "status_code": 404
        }"#;

        let err = ClientError::from_response(404, body);
        assert!(err.is_not_found());
        match err {
            ClientError::Api {
                code,
                message,
                trace,
                ..
            } => {
                assert_eq!(code.as_deref(), Some("not_found"));
                assert_eq!(message, "VPC not found");
                assert_eq!(trace.as_deref(), Some("7a3b1c"));
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn unparseable_body_is_kept() {
        let err = ClientError::from_response(502, "Bad Gateway\n");
        assert_eq!(err.to_string(), "API error (HTTP 502): Bad Gateway");
        assert!(!err.is_not_found());
    }

    #[test]
    fn joins_multiple_messages() {
        let body = r#"{"errors": [
            {"code": "validation_failed", "message": "enable_hub must be false"},
            {"code": "validation_failed", "message": "resolver.vpc is required"}
        ]}"#;
        let err = ClientError::from_response(400, body);
        assert_eq!(
            err.to_string(),
            "API error (HTTP 400): enable_hub must be false; resolver.vpc is required"
        );
    }
}
