use std::collections::HashMap;
use std::time::Duration;

use sandbox::ExecOutput;

/// Deadline applied when the caller does not specify one (5 minutes).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
/// Runtime used when the caller does not specify one.
pub const DEFAULT_LANGUAGE: &str = "python";

/// Exit code reported when no real exit status was obtained (deadline
/// expiry or internal failure).
pub(crate) const NO_EXIT_CODE: i32 = -1;

/// One payload to run inside an isolated sandbox.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub code: String,
    pub timeout: Duration,
    pub language: String,
    pub env: Option<HashMap<String, String>>,
}

impl ExecutionRequest {
    /// Request with default timeout and language.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            timeout: DEFAULT_TIMEOUT,
            language: DEFAULT_LANGUAGE.to_string(),
            env: None,
        }
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    #[must_use]
    pub fn env(mut self, env: HashMap<String, String>) -> Self {
        self.env = Some(env);
        self
    }
}

/// Outcome of one execution attempt. Produced exactly once per
/// `execute_query` call; execution-stage failures land here, never in an
/// `Err`.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// `true` iff the process exited with status 0 within the deadline.
    pub success: bool,
    /// Captured stdout, empty if nothing was captured.
    pub output: String,
    /// Failure description; `None` when `success` is `true`.
    pub error: Option<String>,
    /// Wall clock from run start to completion, timeout, or error.
    pub execution_time: Duration,
    /// Best-effort resident memory in bytes, 0 if unavailable.
    pub memory_used: u64,
    /// Process exit status; -1 when none was obtained (timeout or
    /// internal failure).
    pub exit_code: i32,
}

impl ExecutionResult {
    /// Result for a process that ran to completion before the deadline.
    pub(crate) fn from_output(output: ExecOutput, elapsed: Duration, memory_used: u64) -> Self {
        let success = output.exit_code == 0;
        let error = if success {
            None
        } else if output.stderr.is_empty() {
            Some(format!("process exited with status {}", output.exit_code))
        } else {
            Some(output.stderr)
        };
        Self {
            success,
            output: output.stdout,
            error,
            execution_time: elapsed,
            memory_used,
            exit_code: output.exit_code,
        }
    }

    /// Result for a run abandoned at the deadline. The remote process is
    /// not necessarily stopped; the caller still owes cleanup.
    pub(crate) fn timed_out(deadline: Duration) -> Self {
        Self {
            success: false,
            output: String::new(),
            error: Some(format!("Execution timeout after {deadline:?}")),
            execution_time: deadline,
            memory_used: 0,
            exit_code: NO_EXIT_CODE,
        }
    }

    /// Result for a creation or execution failure.
    pub(crate) fn internal_failure(error: String, elapsed: Duration) -> Self {
        Self {
            success: false,
            output: String::new(),
            error: Some(error),
            execution_time: elapsed,
            memory_used: 0,
            exit_code: NO_EXIT_CODE,
        }
    }
}
