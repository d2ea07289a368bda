use std::fmt;

use mongodb::error::{Error as DriverError, ErrorKind, WriteFailure};
use serde::Serialize;
use thiserror::Error;

/// Server error codes the bootstrap routine reacts to.
pub mod codes {
    pub const BAD_VALUE: i32 = 2;
    pub const FAILED_TO_PARSE: i32 = 9;
    pub const UNAUTHORIZED: i32 = 13;
    pub const TYPE_MISMATCH: i32 = 14;
    pub const AUTHENTICATION_FAILED: i32 = 18;
    pub const NAMESPACE_EXISTS: i32 = 48;
    pub const CANNOT_CREATE_INDEX: i32 = 67;
    pub const INDEX_ALREADY_EXISTS: i32 = 68;
    pub const INDEX_OPTIONS_CONFLICT: i32 = 85;
    pub const INDEX_KEY_SPECS_CONFLICT: i32 = 86;
    pub const COMMAND_NOT_SUPPORTED_ON_VIEW: i32 = 166;
    pub const INVALID_INDEX_SPECIFICATION_OPTION: i32 = 197;
    pub const DUPLICATE_KEY: i32 = 11000;
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("ConnectionError: {0}")]
    Connection(String),

    #[error("ConfigurationConflict: {0}")]
    ConfigurationConflict(String),

    #[error("PermissionDenied: {0}")]
    PermissionDenied(String),

    #[error("ValidationDefinitionError: {0}")]
    ValidationDefinition(String),

    #[error("UnexpectedError: {0}")]
    Unexpected(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKindName {
    ConnectionError,
    ConfigurationConflict,
    PermissionDenied,
    ValidationDefinitionError,
    UnexpectedError,
}

impl fmt::Display for ErrorKindName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ConnectionError => "ConnectionError",
            Self::ConfigurationConflict => "ConfigurationConflict",
            Self::PermissionDenied => "PermissionDenied",
            Self::ValidationDefinitionError => "ValidationDefinitionError",
            Self::UnexpectedError => "UnexpectedError",
        };
        f.write_str(name)
    }
}

impl BootstrapError {
    /// Only connection and permission failures stop the run. Everything else
    /// is recorded against the step and the remaining steps still execute.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::PermissionDenied(_))
    }

    pub fn kind(&self) -> ErrorKindName {
        match self {
            Self::Connection(_) => ErrorKindName::ConnectionError,
            Self::ConfigurationConflict(_) => ErrorKindName::ConfigurationConflict,
            Self::PermissionDenied(_) => ErrorKindName::PermissionDenied,
            Self::ValidationDefinition(_) => ErrorKindName::ValidationDefinitionError,
            Self::Unexpected(_) => ErrorKindName::UnexpectedError,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Connection(m)
            | Self::ConfigurationConflict(m)
            | Self::PermissionDenied(m)
            | Self::ValidationDefinition(m)
            | Self::Unexpected(m) => m,
        }
    }
}

impl From<DriverError> for BootstrapError {
    fn from(err: DriverError) -> Self {
        let message = err.to_string();
        match &*err.kind {
            ErrorKind::Authentication { .. } => return Self::PermissionDenied(message),
            ErrorKind::ServerSelection { .. }
            | ErrorKind::Io(_)
            | ErrorKind::ConnectionPoolCleared { .. }
            | ErrorKind::DnsResolve { .. } => return Self::Connection(message),
            // URI problems are mapped in `db::connect`; anything left is an option we built.
            ErrorKind::InvalidArgument { .. } => return Self::ValidationDefinition(message),
            _ => {}
        }

        match server_code(&err) {
            Some(code) => from_code(code, message),
            None => Self::Unexpected(message),
        }
    }
}

/// Maps a server error code to the bootstrap taxonomy.
pub fn from_code(code: i32, message: String) -> BootstrapError {
    match code {
        codes::UNAUTHORIZED | codes::AUTHENTICATION_FAILED => {
            BootstrapError::PermissionDenied(message)
        }
        // A unique index build over existing duplicates fails with 11000, and a
        // view under a declared collection name rejects index commands with 166.
        codes::INDEX_ALREADY_EXISTS
        | codes::INDEX_OPTIONS_CONFLICT
        | codes::INDEX_KEY_SPECS_CONFLICT
        | codes::NAMESPACE_EXISTS
        | codes::DUPLICATE_KEY
        | codes::COMMAND_NOT_SUPPORTED_ON_VIEW => BootstrapError::ConfigurationConflict(message),
        codes::BAD_VALUE
        | codes::FAILED_TO_PARSE
        | codes::TYPE_MISMATCH
        | codes::CANNOT_CREATE_INDEX
        | codes::INVALID_INDEX_SPECIFICATION_OPTION => {
            BootstrapError::ValidationDefinition(message)
        }
        _ => BootstrapError::Unexpected(message),
    }
}

pub fn server_code(err: &DriverError) -> Option<i32> {
    match &*err.kind {
        ErrorKind::Command(cmd) => Some(cmd.code),
        ErrorKind::Write(WriteFailure::WriteError(write)) => Some(write.code),
        ErrorKind::Write(WriteFailure::WriteConcernError(concern)) => Some(concern.code),
        _ => None,
    }
}

/// A step that did not complete, kept for the final report.
#[derive(Debug, Clone, Serialize)]
pub struct StepFailure {
    pub step: String,
    pub kind: ErrorKindName,
    pub message: String,
}

impl StepFailure {
    pub fn new(step: impl Into<String>, err: &BootstrapError) -> Self {
        Self {
            step: step.into(),
            kind: err.kind(),
            message: err.message().to_string(),
        }
    }
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}: {}", self.step, self.kind, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_conflicts_are_not_fatal() {
        let err = from_code(codes::INDEX_OPTIONS_CONFLICT, "ttl differs".into());
        assert_eq!(err.kind(), ErrorKindName::ConfigurationConflict);
        assert!(!err.is_fatal());

        let err = from_code(codes::INDEX_KEY_SPECS_CONFLICT, "keys differ".into());
        assert_eq!(err.kind(), ErrorKindName::ConfigurationConflict);
    }

    #[test]
    fn authorization_codes_are_fatal() {
        let err = from_code(codes::UNAUTHORIZED, "not authorized".into());
        assert_eq!(err.kind(), ErrorKindName::PermissionDenied);
        assert!(err.is_fatal());
    }

    #[test]
    fn malformed_definitions_map_to_validation_errors() {
        for code in [
            codes::BAD_VALUE,
            codes::FAILED_TO_PARSE,
            codes::INVALID_INDEX_SPECIFICATION_OPTION,
        ] {
            let err = from_code(code, "bad".into());
            assert_eq!(err.kind(), ErrorKindName::ValidationDefinitionError);
            assert!(!err.is_fatal());
        }
    }

    #[test]
    fn unknown_codes_are_recorded_not_fatal() {
        let err = from_code(999_999, "boom".into());
        assert_eq!(err.kind(), ErrorKindName::UnexpectedError);
        assert!(!err.is_fatal());
    }

    #[test]
    fn duplicate_keys_during_unique_build_are_conflicts() {
        let err = from_code(
            codes::DUPLICATE_KEY,
            "E11000 duplicate key error collection: app.users index: email_1".into(),
        );
        assert_eq!(err.kind(), ErrorKindName::ConfigurationConflict);
        assert!(!err.is_fatal());
    }

    #[test]
    fn index_on_view_is_a_conflict() {
        let err = from_code(codes::COMMAND_NOT_SUPPORTED_ON_VIEW, "users is a view".into());
        assert_eq!(err.kind(), ErrorKindName::ConfigurationConflict);
        assert!(!err.is_fatal());
    }

    #[test]
    fn invalid_arguments_are_definition_errors() {
        let driver = DriverError::from(ErrorKind::InvalidArgument {
            message: "expireAfterSeconds out of range".into(),
        });
        let err = BootstrapError::from(driver);
        assert_eq!(err.kind(), ErrorKindName::ValidationDefinitionError);
        assert!(!err.is_fatal());
    }

    #[test]
    fn io_errors_are_connection_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = BootstrapError::from(DriverError::from(io));
        assert_eq!(err.kind(), ErrorKindName::ConnectionError);
        assert!(err.is_fatal());
    }

    #[test]
    fn step_failure_line_names_step_and_kind() {
        let err = BootstrapError::ConfigurationConflict("options differ".into());
        let failure = StepFailure::new("index carts.expiresAt_1", &err);
        assert_eq!(
            failure.to_string(),
            "index carts.expiresAt_1 failed: ConfigurationConflict: options differ"
        );
    }
}
