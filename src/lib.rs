//! Purpose: Library crate for typed JSON request-body decoding.
//! Exports: `api` (decoder, failure taxonomy, size guard, axum extractors), `core`.
//! Role: Backs the `intake` binary and any axum service that embeds the extractors.
//! Invariants: Decoding holds no process-wide state; each call owns its input and outcome.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod api;
pub mod core;
