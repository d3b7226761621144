//! Purpose: Public HTTP-facing surface for typed JSON body decoding.
//! Exports: Decoder entry points, failure taxonomy, size guard, axum extractors.
//! Role: Stable import path for handlers and the `intake` binary.
//! Invariants: Internal parse details (`bind`, `classify`) stay behind `core`.

mod extract;
mod response;

pub use crate::core::decode::{DecodeRequest, decode, decode_bytes};
pub use crate::core::emit::{Logger, ResponseEmitter, TracingLogger};
#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::failure::FailureKind;
pub use crate::core::limit::{
    BodyLimit, BodyTooLarge, DEFAULT_MAX_BODY_BYTES, LimitedBuffer, LimitedReader,
};
pub use extract::{BodyRejection, JsonBody, StrictJsonBody};
pub use response::{ErrorBody, ErrorEnvelope, ErrorResponse, json_response};
