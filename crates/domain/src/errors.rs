//! Error types used throughout the bridge
//!
//! `BridgeError` carries its classification from the moment an EXT response
//! is inspected, so callers branch on [`ErrorCategory`] exhaustively instead
//! of probing ad hoc properties.

use thiserror::Error;

/// Categories of bridge errors, matching the EXT failure taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Session token rejected or expired - eligible for one silent retry
    Auth,
    /// Record or page does not exist - often "absent", not fatal
    NotFound,
    /// EXT field validation rejected the write - needs human attention
    Validation,
    /// Optimistic concurrency mismatch on update
    Conflict,
    /// Breaker is open; no network call was attempted
    CircuitOpen,
    /// Required credentials are absent - "needs setup", not "service down"
    ConfigurationMissing,
    /// Everything else, including infrastructure faults
    Unknown,
}

/// Main error type for bridge operations
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("authentication failed (code {code}): {message}")]
    Auth { code: String, message: String },

    #[error("not found (code {code}): {message}")]
    NotFound { code: String, message: String },

    #[error("validation rejected (code {code}): {message}")]
    Validation { code: String, message: String },

    #[error("modification conflict (code {code}): {message}")]
    Conflict { code: String, message: String },

    #[error("circuit breaker open for {name}")]
    CircuitOpen { name: String },

    #[error("bridge is not configured: {0}")]
    ConfigurationMissing(String),

    #[error("unexpected EXT response (code {code}): {message}")]
    Unknown { code: String, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("shared state store error: {0}")]
    StateStore(String),

    #[error("repository error: {0}")]
    Repository(String),
}

impl BridgeError {
    /// Get the error category for this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Auth { .. } => ErrorCategory::Auth,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Conflict { .. } => ErrorCategory::Conflict,
            Self::CircuitOpen { .. } => ErrorCategory::CircuitOpen,
            Self::ConfigurationMissing(_) => ErrorCategory::ConfigurationMissing,
            Self::Unknown { .. } | Self::Network(_) | Self::StateStore(_) | Self::Repository(_) => {
                ErrorCategory::Unknown
            }
        }
    }

    /// True if the session should be invalidated and the call replayed once
    pub fn is_auth(&self) -> bool {
        self.category() == ErrorCategory::Auth
    }

    /// True if the failure means "the record is absent" in lookup contexts
    pub fn is_not_found(&self) -> bool {
        self.category() == ErrorCategory::NotFound
    }
}

/// Classify a non-zero EXT error code into a [`BridgeError`].
///
/// The lookup is fixed: specific codes map to auth/not_found/conflict, the
/// 500-599 range is field validation, anything else is unknown. EXT's
/// documented codes:
/// - `212` invalid account, `952` invalid/expired session token
/// - `101` record is missing, `401` no records match the request
/// - `306` record modification id does not match
pub fn classify_ext_error(code: &str, message: &str) -> BridgeError {
    let code = code.trim();
    match code {
        "212" | "952" => BridgeError::Auth { code: code.to_string(), message: message.to_string() },
        "101" | "401" => {
            BridgeError::NotFound { code: code.to_string(), message: message.to_string() }
        }
        "306" => BridgeError::Conflict { code: code.to_string(), message: message.to_string() },
        _ => match code.parse::<u32>() {
            Ok(numeric) if (500..=599).contains(&numeric) => {
                BridgeError::Validation { code: code.to_string(), message: message.to_string() }
            }
            _ => BridgeError::Unknown { code: code.to_string(), message: message.to_string() },
        },
    }
}

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_codes_classify_as_auth() {
        assert_eq!(classify_ext_error("952", "invalid token").category(), ErrorCategory::Auth);
        assert_eq!(classify_ext_error("212", "invalid account").category(), ErrorCategory::Auth);
    }

    #[test]
    fn test_missing_record_codes_classify_as_not_found() {
        assert_eq!(classify_ext_error("101", "record missing").category(), ErrorCategory::NotFound);
        assert_eq!(classify_ext_error("401", "no match").category(), ErrorCategory::NotFound);
    }

    #[test]
    fn test_conflict_code() {
        assert_eq!(classify_ext_error("306", "mod id mismatch").category(), ErrorCategory::Conflict);
    }

    #[test]
    fn test_validation_range() {
        assert_eq!(classify_ext_error("500", "date invalid").category(), ErrorCategory::Validation);
        assert_eq!(classify_ext_error("599", "").category(), ErrorCategory::Validation);
        // Just outside the range
        assert_eq!(classify_ext_error("499", "").category(), ErrorCategory::Unknown);
        assert_eq!(classify_ext_error("600", "").category(), ErrorCategory::Unknown);
    }

    #[test]
    fn test_garbage_code_is_unknown() {
        assert_eq!(classify_ext_error("banana", "?").category(), ErrorCategory::Unknown);
        assert_eq!(classify_ext_error("", "?").category(), ErrorCategory::Unknown);
    }

    #[test]
    fn test_message_is_preserved() {
        match classify_ext_error("506", "value does not meet validation entry options") {
            BridgeError::Validation { code, message } => {
                assert_eq!(code, "506");
                assert!(message.contains("validation entry options"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_infrastructure_errors_are_unknown_category() {
        assert_eq!(BridgeError::Network("down".into()).category(), ErrorCategory::Unknown);
        assert_eq!(BridgeError::StateStore("down".into()).category(), ErrorCategory::Unknown);
        assert_eq!(BridgeError::Repository("down".into()).category(), ErrorCategory::Unknown);
    }
}
