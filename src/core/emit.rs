//! Purpose: Narrow collaborator seams used by the body decoder.
//! Exports: `ResponseEmitter`, `Logger`, `TracingLogger`.
//! Role: Lets the decoder write client errors and operator logs without owning either.
//! Invariants: Loggers are shareable across request tasks (`Send + Sync`).

/// Writes the client-visible error for a failed decode.
pub trait ResponseEmitter {
    /// Status 400.
    fn write_bad_request(&mut self, message: &str);
    fn write_error(&mut self, status: u16, message: &str);
    /// Status 500 with a generic body.
    fn write_internal_error(&mut self, message: &str);
}

pub trait Logger: Send + Sync {
    fn log(&self, message: &str);
}

/// Production logger; forwards to the process `tracing` subscriber.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, message: &str) {
        tracing::error!(target: "intake::decode", cause = %message, "unclassified body decode failure");
    }
}
