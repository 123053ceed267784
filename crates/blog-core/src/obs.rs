//! Structured log events for the record service.
//!
//! Every operation runs inside an `rpc` span that is a child of the span the
//! service was built with; the functions below emit the per-call events.
//! Filter with `RUST_LOG`, e.g. `RUST_LOG=blog_core=debug`.

use tracing::{info, warn};

use crate::error::ServiceError;

/// Emit event: a request arrived.
pub fn emit_request(op: &'static str) {
    info!(event = "blog.request", op = op);
}

/// Emit event: a post was created.
pub fn emit_created(blog_id: &str) {
    info!(event = "blog.created", blog_id = %blog_id);
}

/// Emit event: a post was updated.
pub fn emit_updated(blog_id: &str) {
    info!(event = "blog.updated", blog_id = %blog_id);
}

/// Emit event: a post was deleted.
pub fn emit_deleted(blog_id: &str) {
    info!(event = "blog.deleted", blog_id = %blog_id);
}

/// Emit event: a list stream ran to completion.
pub fn emit_list_completed(sent: u64) {
    info!(event = "blog.list_completed", sent = sent);
}

/// Emit event: an operation failed (warning level).
pub fn emit_failure(op: &'static str, error: &ServiceError) {
    warn!(
        event = "blog.failed",
        op = op,
        kind = error.kind(),
        error = %error,
    );
}
