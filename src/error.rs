use axum::http::StatusCode;
use thiserror::Error;

use crate::input::ValidationError;

pub const GENERIC_FAILURE: &str = "Analysis failed";
pub const UNREACHABLE: &str = "Could not reach the analysis service";
pub const MALFORMED: &str = "Analysis failed: the analysis service returned an unexpected response";

/// Every way a single check can end without a result. All are terminal for
/// the request that produced them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("An analysis is already in progress")]
    InFlight,

    /// Network failure or non-2xx upstream response. `message` is what the
    /// user sees: the upstream `detail` verbatim, or a generic fallback.
    #[error("{message}")]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// 2xx upstream response whose body is not an analysis result.
    #[error("{}", MALFORMED)]
    MalformedResponse(String),
}

impl CheckError {
    /// Validation and in-flight refusals never reach the network and are not reported.
    pub fn is_reportable(&self) -> bool {
        matches!(
            self,
            CheckError::Transport { .. } | CheckError::MalformedResponse(_)
        )
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            CheckError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CheckError::InFlight => StatusCode::CONFLICT,
            CheckError::Transport { .. } | CheckError::MalformedResponse(_) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reportable_errors() {
        assert!(!CheckError::from(ValidationError::TooShort { min: 10 }).is_reportable());
        assert!(!CheckError::InFlight.is_reportable());
        assert!(CheckError::Transport {
            status: Some(500),
            message: "boom".into()
        }
        .is_reportable());
        assert!(CheckError::MalformedResponse("missing field `score`".into()).is_reportable());
    }

    #[test]
    fn test_messages() {
        let err = CheckError::Transport {
            status: Some(400),
            message: "No valid sentences found in text".into(),
        };
        assert_eq!(err.to_string(), "No valid sentences found in text");
        assert_eq!(
            CheckError::MalformedResponse("x".into()).to_string(),
            MALFORMED
        );
        assert_eq!(
            CheckError::from(ValidationError::TooShort { min: 10 }).to_string(),
            "Please enter at least 10 characters"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(CheckError::InFlight.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            CheckError::from(ValidationError::TooLong { max: 10_000 }).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            CheckError::MalformedResponse(String::new()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }
}
