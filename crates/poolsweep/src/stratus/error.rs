//! Provider API error classification.

use serde::Deserialize;
use thiserror::Error;

/// Error codes the provider reports when an entity does not exist.
///
/// Deletions race the provider's own garbage collection, so "already gone"
/// has to be recognizable across every service the daemon touches.
const NOT_FOUND_CODES: &[&str] = &[
    "not_found",
    "resource_not_found",
    "instance_not_found",
    "subnet_not_found",
    "vpc_not_found",
    "load_balancer_not_found",
    "workspace_not_found",
    "service_id_not_found",
    "api_key_not_found",
];

/// Errors returned by the Stratus REST APIs.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The API rejected the request.
    #[error("stratus api error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },
    /// The request never produced a usable API response.
    #[error("stratus transport error")]
    Transport(#[from] reqwest::Error),
}

impl ApiError {
    /// Whether the error means the entity does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            ApiError::Api {
                status,
                code,
                message,
            } => {
                *status == 404
                    || code
                        .as_deref()
                        .is_some_and(|code| NOT_FOUND_CODES.contains(&code))
                    || message.contains("cannot be found")
            }
            ApiError::Transport(_) => false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    code: Option<String>,
    message: Option<String>,
}

/// Build an [`ApiError`] from a non-success response's status and body.
///
/// The provider wraps failures in an `errors` array; anything that does not
/// parse is kept verbatim as the message.
pub fn classify_response(status: u16, body: &str) -> ApiError {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(detail) = parsed.errors.into_iter().next() {
            return ApiError::Api {
                status,
                code: detail.code,
                message: detail
                    .message
                    .unwrap_or_else(|| body.trim().to_string()),
            };
        }
    }
    ApiError::Api {
        status,
        code: None,
        message: body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_not_found_code_is_recognized() {
        for code in NOT_FOUND_CODES {
            let body = format!(
                r#"{{"errors": [{{"code": "{code}", "message": "it is gone"}}]}}"#
            );
            let err = classify_response(400, &body);
            assert!(err.is_not_found(), "code {code:?} should read as not found");
        }
    }

    #[test]
    fn a_bare_404_is_not_found() {
        assert!(classify_response(404, "").is_not_found());
    }

    #[test]
    fn cannot_be_found_messages_count_as_not_found() {
        let body = r#"{"errors": [{"code": "lb_weirdness", "message": "load balancer r006-aa cannot be found"}]}"#;
        assert!(classify_response(400, body).is_not_found());
    }

    #[test]
    fn other_failures_are_not_misread_as_not_found() {
        let body = r#"{"errors": [{"code": "over_quota", "message": "too many subnets"}]}"#;
        let err = classify_response(409, body);
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("too many subnets"));
    }

    #[test]
    fn unparseable_bodies_are_kept_verbatim() {
        let err = classify_response(502, "<html>bad gateway</html>\n");
        match err {
            ApiError::Api {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 502);
                assert_eq!(code, None);
                assert_eq!(message, "<html>bad gateway</html>");
            }
            other => panic!("unexpected classification {other:?}"),
        }
    }
}
