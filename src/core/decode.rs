//! Purpose: Decode a request body into a typed destination and report failures.
//! Exports: `DecodeRequest`, `decode`, `decode_bytes`, `decode_prefix`, `report`.
//! Role: Wires read -> bind -> classify -> emit for one request.
//! Invariants: Exactly one emitter call per failure; none on success.
//! Invariants: Exactly one log call, and only for unclassified failures.
//! Invariants: The destination is left untouched unless decoding succeeds.
//! Notes: Sources are expected to be size-guarded already (see `limit`).
//! Notes: When the guard cuts a body, the kept prefix is still bound so failures it
//! already proves keep their precedence over `BodyTooLarge`.

use crate::core::bind::{bind_prefix, bind_slice};
use crate::core::classify::{RawFailure, classify};
use crate::core::emit::{Logger, ResponseEmitter};
use crate::core::failure::FailureKind;
use crate::core::limit::{BodyTooLarge, size_limit_signal};
use serde::de::DeserializeOwned;
use std::io::Read;

#[derive(Debug)]
pub struct DecodeRequest<'a, T, R> {
    pub destination: &'a mut T,
    pub source: R,
    /// Reject input fields the destination schema does not consume.
    pub strict: bool,
}

impl<'a, T, R: Read> DecodeRequest<'a, T, R> {
    pub fn new(destination: &'a mut T, source: R) -> Self {
        Self {
            destination,
            source,
            strict: false,
        }
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

pub fn decode<T, R>(
    request: DecodeRequest<'_, T, R>,
    emitter: &mut dyn ResponseEmitter,
    logger: &dyn Logger,
) -> Result<(), FailureKind>
where
    T: DeserializeOwned,
    R: Read,
{
    let DecodeRequest {
        destination,
        mut source,
        strict,
    } = request;

    let mut body = Vec::new();
    let bound = match source.read_to_end(&mut body) {
        Ok(_) => bind_slice::<T>(&body, strict),
        Err(err) => match size_limit_signal(&err) {
            Some(cut) => bind_prefix::<T>(&body, strict, cut),
            None => Err(RawFailure::Read(err)),
        },
    };
    match bound {
        Ok(value) => {
            *destination = value;
            Ok(())
        }
        Err(raw) => Err(report(&raw, emitter, logger)),
    }
}

/// Same as `decode` for a body that is already buffered.
pub fn decode_bytes<T: DeserializeOwned>(
    body: &[u8],
    strict: bool,
    emitter: &mut dyn ResponseEmitter,
    logger: &dyn Logger,
) -> Result<T, FailureKind> {
    bind_slice::<T>(body, strict).map_err(|raw| report(&raw, emitter, logger))
}

/// Same as `decode_bytes` for the prefix a size guard kept before cutting the body.
pub fn decode_prefix<T: DeserializeOwned>(
    prefix: &[u8],
    strict: bool,
    cut: BodyTooLarge,
    emitter: &mut dyn ResponseEmitter,
    logger: &dyn Logger,
) -> Result<T, FailureKind> {
    bind_prefix::<T>(prefix, strict, cut).map_err(|raw| report(&raw, emitter, logger))
}

/// Classifies `raw`, writes the matching response, and returns the kind.
pub fn report(
    raw: &RawFailure,
    emitter: &mut dyn ResponseEmitter,
    logger: &dyn Logger,
) -> FailureKind {
    let kind = classify(raw);
    let message = kind.message();
    match &kind {
        FailureKind::Unclassified { cause } => {
            logger.log(cause);
            emitter.write_internal_error(&message);
        }
        FailureKind::BodyTooLarge { .. } => emitter.write_error(kind.status(), &message),
        _ => emitter.write_bad_request(&message),
    }
    kind
}
