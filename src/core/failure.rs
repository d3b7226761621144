//! Purpose: Define the closed set of client-facing decode failure kinds.
//! Exports: `FailureKind`, status constants.
//! Role: Single table from failure kind to HTTP status and client message.
//! Invariants: Client messages never include parser text or internal causes.
//! Invariants: Variant order mirrors classification precedence.

use crate::core::limit::describe_limit;
use std::error::Error as StdError;
use std::fmt;

pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_PAYLOAD_TOO_LARGE: u16 = 413;
pub const STATUS_INTERNAL_SERVER_ERROR: u16 = 500;

const INTERNAL_MESSAGE: &str = "internal server error";

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FailureKind {
    MalformedSyntax { offset: u64 },
    TruncatedInput,
    TypeMismatch { field: String, offset: u64 },
    UnknownField { field: String },
    EmptyBody,
    BodyTooLarge { limit: u64 },
    /// `cause` is for operators only; it never reaches the client.
    Unclassified { cause: String },
}

impl FailureKind {
    pub fn status(&self) -> u16 {
        match self {
            FailureKind::BodyTooLarge { .. } => STATUS_PAYLOAD_TOO_LARGE,
            FailureKind::Unclassified { .. } => STATUS_INTERNAL_SERVER_ERROR,
            _ => STATUS_BAD_REQUEST,
        }
    }

    pub fn message(&self) -> String {
        match self {
            FailureKind::MalformedSyntax { offset } => {
                format!("Request body contains badly-formed JSON (at position {offset})")
            }
            FailureKind::TruncatedInput => "request body contains badly-formed JSON".to_string(),
            // An empty path is the body itself, e.g. a missing top-level field.
            FailureKind::TypeMismatch { field, offset } if field.is_empty() => {
                format!("Request body contains an invalid value (at position {offset})")
            }
            FailureKind::TypeMismatch { field, offset } => format!(
                "Request body contains an invalid value for the \"{field}\" field (at position {offset})"
            ),
            FailureKind::UnknownField { field } => {
                format!("Request body contains unknown field \"{field}\"")
            }
            FailureKind::EmptyBody => "request body must not be empty".to_string(),
            FailureKind::BodyTooLarge { limit } => format!(
                "request body must not be larger than {}",
                describe_limit(*limit)
            ),
            FailureKind::Unclassified { .. } => INTERNAL_MESSAGE.to_string(),
        }
    }

    /// Stable label used as the `kind` field of error envelopes.
    pub fn label(&self) -> &'static str {
        match self {
            FailureKind::MalformedSyntax { .. } => "MalformedSyntax",
            FailureKind::TruncatedInput => "TruncatedInput",
            FailureKind::TypeMismatch { .. } => "TypeMismatch",
            FailureKind::UnknownField { .. } => "UnknownField",
            FailureKind::EmptyBody => "EmptyBody",
            FailureKind::BodyTooLarge { .. } => "BodyTooLarge",
            FailureKind::Unclassified { .. } => "Internal",
        }
    }

    pub fn cause(&self) -> Option<&str> {
        match self {
            FailureKind::Unclassified { cause } => Some(cause.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl StdError for FailureKind {}
