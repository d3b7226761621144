//! Purpose: axum extractors that decode JSON bodies with classified failures.
//! Exports: `JsonBody`, `StrictJsonBody`, `BodyRejection`.
//! Role: Bridges async request bodies into the sync decoder.
//! Invariants: Bodies are collected under the `BodyLimit` request extension (default 1 MiB).
//! Invariants: Rejections carry exactly the response the decoder emitted.
//! Invariants: An over-limit body is still bound up to the limit before it is rejected as too large.

use axum::async_trait;
use axum::body::Body;
use axum::extract::{FromRequest, Request};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::io;
use tokio_stream::StreamExt;

use crate::api::response::ErrorResponse;
use crate::core::classify::RawFailure;
use crate::core::decode::{decode_bytes, decode_prefix, report};
use crate::core::emit::TracingLogger;
use crate::core::failure::FailureKind;
use crate::core::limit::{BodyLimit, BodyTooLarge};

/// Lenient JSON body: input fields outside `T` are ignored.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonBody<T>(pub T);

/// Strict JSON body: input fields outside `T` are rejected with 400.
#[derive(Clone, Copy, Debug, Default)]
pub struct StrictJsonBody<T>(pub T);

#[derive(Debug)]
pub struct BodyRejection {
    kind: FailureKind,
    response: Response,
}

impl BodyRejection {
    pub fn kind(&self) -> &FailureKind {
        &self.kind
    }
}

impl IntoResponse for BodyRejection {
    fn into_response(self) -> Response {
        self.response
    }
}

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = BodyRejection;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        extract_json(req, false).await.map(JsonBody)
    }
}

#[async_trait]
impl<T, S> FromRequest<S> for StrictJsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = BodyRejection;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        extract_json(req, true).await.map(StrictJsonBody)
    }
}

async fn extract_json<T: DeserializeOwned>(req: Request, strict: bool) -> Result<T, BodyRejection> {
    let limit = req
        .extensions()
        .get::<BodyLimit>()
        .copied()
        .unwrap_or_default();
    let collected = collect_body(req.into_body(), limit).await;

    let mut emitter = ErrorResponse::new();
    let result = match collected {
        Ok(Collected::Whole(bytes)) => {
            decode_bytes::<T>(&bytes, strict, &mut emitter, &TracingLogger)
        }
        Ok(Collected::Cut { prefix, signal }) => {
            decode_prefix::<T>(&prefix, strict, signal, &mut emitter, &TracingLogger)
        }
        Err(raw) => Err(report(&raw, &mut emitter, &TracingLogger)),
    };
    result.map_err(|kind| BodyRejection {
        kind,
        response: emitter.into_response(),
    })
}

enum Collected {
    Whole(Bytes),
    Cut { prefix: Bytes, signal: BodyTooLarge },
}

async fn collect_body(body: Body, limit: BodyLimit) -> Result<Collected, RawFailure> {
    let mut stream = body.into_data_stream();
    let mut buf = limit.buffer();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|err| RawFailure::Read(io::Error::other(err)))?;
        if let Err(signal) = buf.push(&chunk) {
            return Ok(Collected::Cut {
                prefix: buf.into_bytes(),
                signal,
            });
        }
    }
    Ok(Collected::Whole(buf.into_bytes()))
}
