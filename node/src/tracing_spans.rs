//! Span constructors for validation commands.
//!
//! Consistent span names and fields make per-job traces easy to filter.

use agij_types::{Address, JobId};
use tracing::{info_span, Span};

/// Span covering one command handled by the validation service.
pub fn command_span(command: &'static str) -> Span {
    info_span!("validation_command", command)
}

/// Span covering a command on a single job.
pub fn job_span(command: &'static str, job: JobId) -> Span {
    info_span!("validation_command", command, job = %job)
}

/// Span covering a command issued by a specific participant on a job.
pub fn participant_span(command: &'static str, job: JobId, caller: &Address) -> Span {
    info_span!("validation_command", command, job = %job, caller = %caller)
}
