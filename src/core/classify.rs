//! Purpose: Map raw decode failures onto exactly one `FailureKind`.
//! Exports: `RawFailure`, `classify`.
//! Role: The precedence table for body-decode failures, written out in one match.
//! Invariants: Classification is pure; the same raw failure always yields the same kind.
//! Invariants: Size-limit detection uses the guard's typed signal, not error text.
//!
//! Precedence (first match wins):
//! 1. `Syntax`: the parser named a concrete offending byte.
//! 2. `Eof` after a value started: the stream ended mid-value.
//! 3. `Data`: a value did not fit the destination field.
//! 4. `UnknownField`: strict mode saw a field outside the schema.
//! 5. `Eof` before any value: nothing but whitespace was read.
//! 6. `Read` carrying `BodyTooLarge`: the size guard cut the stream.
//! 7. Everything else.

use crate::core::failure::FailureKind;
use crate::core::limit::size_limit_signal;
use std::io;

#[derive(Debug)]
pub enum RawFailure {
    Syntax { offset: u64 },
    Eof { value_started: bool },
    Data { field: String, offset: u64 },
    UnknownField { field: String },
    Read(io::Error),
}

pub fn classify(raw: &RawFailure) -> FailureKind {
    match raw {
        RawFailure::Syntax { offset } => FailureKind::MalformedSyntax { offset: *offset },
        RawFailure::Eof {
            value_started: true,
        } => FailureKind::TruncatedInput,
        RawFailure::Data { field, offset } => FailureKind::TypeMismatch {
            field: field.clone(),
            offset: *offset,
        },
        RawFailure::UnknownField { field } => FailureKind::UnknownField {
            field: field.clone(),
        },
        RawFailure::Eof {
            value_started: false,
        } => FailureKind::EmptyBody,
        RawFailure::Read(err) => match size_limit_signal(err) {
            Some(signal) => FailureKind::BodyTooLarge {
                limit: signal.limit,
            },
            None => FailureKind::Unclassified {
                cause: err.to_string(),
            },
        },
    }
}
