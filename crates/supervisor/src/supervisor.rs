use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use sandbox::{ExecRequest, Sandbox, SandboxProvider, SessionSpec};
use tokio::sync::{Mutex, Semaphore};
use tracing::{error, info, warn};

use crate::error::{Result, SupervisorError};
use crate::types::{ExecutionRequest, ExecutionResult};

/// Aggregate resident-set query run inside the sandbox for memory
/// sampling. Output is total KB across all processes.
const MEMORY_PROBE_CMD: &str = "ps aux | awk '{sum+=$6} END {print sum}'";

/// Bounds and supervises sandboxed executions.
///
/// At most `max_sessions` sandboxes are alive at once — a hard external
/// resource cap, enforced by the admission gate. The active-session
/// registry and the gate are the only shared mutable state; each session's
/// sandbox is used exclusively by the execution that created it.
///
/// One instance is constructed by the host application and shared via
/// `Arc`; call [`Supervisor::shutdown`] at process shutdown.
pub struct Supervisor {
    provider: Arc<dyn SandboxProvider>,
    gate: Arc<Semaphore>,
    sessions: Mutex<HashMap<String, Arc<dyn Sandbox>>>,
    shut_down: AtomicBool,
}

impl Supervisor {
    /// Supervisor admitting at most `max_sessions` concurrent sandboxes.
    pub fn new(provider: Arc<dyn SandboxProvider>, max_sessions: usize) -> Self {
        Self {
            provider,
            gate: Arc::new(Semaphore::new(max_sessions)),
            sessions: Mutex::new(HashMap::new()),
            shut_down: AtomicBool::new(false),
        }
    }

    /// Run `request.code` in a fresh sandbox under `request.timeout`.
    ///
    /// Suspends while the session pool is saturated. Every execution-stage
    /// failure (creation error, remote error, deadline expiry) is
    /// normalized into the returned [`ExecutionResult`]; `Err` is reserved
    /// for caller misuse and a shut-down supervisor.
    ///
    /// On return the session is deregistered, its sandbox torn down, and
    /// its admission slot released — on every path.
    pub async fn execute_query(&self, request: ExecutionRequest) -> Result<ExecutionResult> {
        let payload_cmd = validate(&request)?;

        // Held for the whole session scope; dropped on every exit path,
        // strictly after cleanup.
        let _permit = self
            .gate
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| SupervisorError::GateClosed)?;

        // v4 UUIDs are unique across concurrent calls, so the registry
        // cannot see colliding entries.
        let session_id = uuid::Uuid::new_v4().to_string();

        let sandbox = match self.create_session(&session_id, &request).await {
            Ok(sandbox) => sandbox,
            Err(e) => {
                error!(session_id = %session_id, error = %e, "sandbox creation failed");
                return Ok(ExecutionResult::internal_failure(
                    e.to_string(),
                    Duration::ZERO,
                ));
            }
        };

        let result = self
            .run_payload(sandbox.as_ref(), &payload_cmd, request.timeout)
            .await;

        // Unconditional: the deadline only bounds our waiting, the remote
        // process may still be running.
        self.cleanup_session(&session_id).await;

        Ok(result)
    }

    /// Provision the sandbox, apply env vars, register the handle.
    ///
    /// Nothing is registered on failure; a sandbox provisioned before a
    /// failed setup step is torn down before the error is returned.
    async fn create_session(
        &self,
        session_id: &str,
        request: &ExecutionRequest,
    ) -> sandbox::Result<Arc<dyn Sandbox>> {
        let env: Vec<(String, String)> = request
            .env
            .iter()
            .flatten()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let spec = SessionSpec {
            id: session_id.to_string(),
            language: request.language.clone(),
            env,
        };

        let sandbox = self.provider.create(&spec).await?;

        for (key, value) in &spec.env {
            let cmd = format!("export {key}={value}");
            if let Err(e) = sandbox.exec(&ExecRequest { cmd: &cmd }).await {
                if let Err(kill_err) = sandbox.kill().await {
                    warn!(
                        session_id = %session_id,
                        error = %kill_err,
                        "teardown after failed env setup also failed"
                    );
                }
                return Err(e);
            }
        }

        self.sessions
            .lock()
            .await
            .insert(session_id.to_string(), Arc::clone(&sandbox));

        info!(
            session_id = %session_id,
            provider = self.provider.name(),
            language = %request.language,
            "created sandbox"
        );
        Ok(sandbox)
    }

    /// Run the payload command, bounding only how long we wait for it.
    async fn run_payload(
        &self,
        sandbox: &dyn Sandbox,
        cmd: &str,
        deadline: Duration,
    ) -> ExecutionResult {
        let started = Instant::now();
        let request = ExecRequest { cmd };

        match tokio::time::timeout(deadline, sandbox.exec(&request)).await {
            Ok(Ok(output)) => {
                let memory_used = self.sample_memory(sandbox).await;
                ExecutionResult::from_output(output, started.elapsed(), memory_used)
            }
            Ok(Err(e)) => {
                error!(session_id = sandbox.id(), error = %e, "execution failed");
                ExecutionResult::internal_failure(e.to_string(), started.elapsed())
            }
            Err(_) => {
                error!(
                    session_id = sandbox.id(),
                    timeout = ?deadline,
                    "gave up waiting for execution"
                );
                ExecutionResult::timed_out(deadline)
            }
        }
    }

    /// Best-effort resident memory sample in bytes. Diagnostic only: any
    /// failure degrades to 0.
    async fn sample_memory(&self, sandbox: &dyn Sandbox) -> u64 {
        let request = ExecRequest {
            cmd: MEMORY_PROBE_CMD,
        };
        match sandbox.exec(&request).await {
            Ok(output) => output
                .stdout
                .trim()
                .parse::<u64>()
                .map(|kb| kb.saturating_mul(1024))
                .unwrap_or(0),
            Err(_) => 0,
        }
    }

    /// Tear down one session. The registry entry is removed even when the
    /// remote kill fails, so table slots never leak; the failure is only
    /// logged.
    async fn cleanup_session(&self, session_id: &str) {
        let handle = self.sessions.lock().await.remove(session_id);
        let Some(sandbox) = handle else {
            return;
        };

        match sandbox.kill().await {
            Ok(()) => info!(session_id = %session_id, "cleaned up sandbox"),
            Err(e) => warn!(session_id = %session_id, error = %e, "sandbox teardown failed"),
        }
    }

    /// Tear down every registered session. Works from a snapshot of ids;
    /// one teardown failure never prevents attempting the others.
    pub async fn cleanup_all(&self) {
        let ids: Vec<String> = self.sessions.lock().await.keys().cloned().collect();
        info!(count = ids.len(), "cleaning up all sandboxes");
        for id in ids {
            self.cleanup_session(&id).await;
        }
    }

    /// Tear down all sessions and refuse further admissions. Idempotent:
    /// later calls return without touching anything.
    pub async fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        self.gate.close();
        self.cleanup_all().await;
        info!("supervisor shut down");
    }

    /// Admission slots currently free.
    pub fn available_slots(&self) -> usize {
        self.gate.available_permits()
    }

    /// Number of live registered sessions.
    pub async fn active_sessions(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

/// Validate the request and build the interpreter invocation for its
/// payload. Fails before any slot is taken.
fn validate(request: &ExecutionRequest) -> Result<String> {
    if request.code.trim().is_empty() {
        return Err(SupervisorError::InvalidRequest(
            "code must not be empty".into(),
        ));
    }
    if request.timeout.is_zero() {
        return Err(SupervisorError::InvalidRequest(
            "timeout must be positive".into(),
        ));
    }
    payload_command(&request.language, &request.code).ok_or_else(|| {
        SupervisorError::InvalidRequest(format!("unsupported language: {}", request.language))
    })
}

fn payload_command(language: &str, code: &str) -> Option<String> {
    let quoted = shell_quote(code);
    match language {
        "python" => Some(format!("python3 -c {quoted}")),
        "bash" => Some(format!("bash -c {quoted}")),
        "node" => Some(format!("node -e {quoted}")),
        _ => None,
    }
}

/// Single-quote `s` for a POSIX shell.
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_command_python() {
        let cmd = payload_command("python", "print('hi')").unwrap();
        assert_eq!(cmd, r#"python3 -c 'print('\''hi'\'')'"#);
    }

    #[test]
    fn payload_command_unknown_language() {
        assert!(payload_command("cobol", "DISPLAY 'HI'").is_none());
    }

    #[test]
    fn shell_quote_plain() {
        assert_eq!(shell_quote("echo hi"), "'echo hi'");
    }

    #[test]
    fn validate_rejects_empty_code() {
        let request = ExecutionRequest::new("   ");
        assert!(matches!(
            validate(&request),
            Err(SupervisorError::InvalidRequest(_))
        ));
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let request = ExecutionRequest::new("print(1)").timeout(Duration::ZERO);
        assert!(matches!(
            validate(&request),
            Err(SupervisorError::InvalidRequest(_))
        ));
    }

    #[test]
    fn validate_accepts_defaults() {
        let request = ExecutionRequest::new("print(1)");
        assert!(validate(&request).is_ok());
    }
}
