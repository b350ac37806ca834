//! Bounded, supervised execution of untrusted code in remote sandboxes.
//!
//! The [`Supervisor`] admits at most a configured number of concurrent
//! sandboxes, enforces a per-execution deadline, and guarantees teardown
//! on every outcome. Execution-stage failures are never raised; they are
//! normalized into [`ExecutionResult`].

mod diagnostics;
mod error;
mod supervisor;
mod types;

pub use diagnostics::{DiagnosticReport, DiagnosticRunner};
pub use error::{Result, SupervisorError};
pub use supervisor::Supervisor;
pub use types::{ExecutionRequest, ExecutionResult};
