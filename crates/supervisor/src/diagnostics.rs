use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::error::Result;
use crate::supervisor::Supervisor;
use crate::types::ExecutionRequest;

const EVENT_LOG_TIMEOUT: Duration = Duration::from_secs(60);
const MEMORY_TIMEOUT: Duration = Duration::from_secs(30);

/// Pull the most recent error-level system event log entries.
const EVENT_LOG_PAYLOAD: &str = r#"
import subprocess

result = subprocess.run(
    ['powershell', '-Command',
     'Get-WinEvent -FilterHashtable @{LogName="System"; Level=1,2,3} -MaxEvents 100 | ConvertTo-Json'],
    capture_output=True, text=True, timeout=30
)
print(result.stdout)
"#;

/// Memory pressure summary plus the top resident processes.
const MEMORY_PAYLOAD: &str = r#"
import psutil

mem = psutil.virtual_memory()
print(f"Memory: {mem.percent}% used, {mem.available / 1024**3:.2f} GB available")

processes = []
for proc in psutil.process_iter(['pid', 'name', 'memory_percent']):
    try:
        if proc.info['memory_percent'] > 1:
            processes.append(proc.info)
    except psutil.Error:
        pass

processes.sort(key=lambda x: x['memory_percent'], reverse=True)
for p in processes[:10]:
    print(f"{p['name']}: {p['memory_percent']:.2f}%")
"#;

/// Outcome of one built-in diagnostic, shaped for API consumers as
/// `{"status": "success", "data": ...}` or `{"status": "error", "error": ...}`.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DiagnosticReport {
    Success { data: String },
    Error { error: String },
}

/// Named diagnostic payloads run through the supervisor.
///
/// Pure adapter: each operation supplies a fixed payload and timeout and
/// translates the [`crate::ExecutionResult`]. No lifecycle or concurrency
/// logic lives here.
pub struct DiagnosticRunner {
    supervisor: Arc<Supervisor>,
}

impl DiagnosticRunner {
    pub fn new(supervisor: Arc<Supervisor>) -> Self {
        Self { supervisor }
    }

    /// Analyze recent system event-log errors inside a sandbox.
    pub async fn analyze_event_log(&self) -> Result<DiagnosticReport> {
        self.run(EVENT_LOG_PAYLOAD, EVENT_LOG_TIMEOUT).await
    }

    /// Report memory pressure and the top resident processes.
    pub async fn analyze_memory(&self) -> Result<DiagnosticReport> {
        self.run(MEMORY_PAYLOAD, MEMORY_TIMEOUT).await
    }

    async fn run(&self, code: &str, timeout: Duration) -> Result<DiagnosticReport> {
        let request = ExecutionRequest::new(code).timeout(timeout);
        let result = self.supervisor.execute_query(request).await?;
        Ok(if result.success {
            DiagnosticReport::Success {
                data: result.output,
            }
        } else {
            DiagnosticReport::Error {
                error: result
                    .error
                    .unwrap_or_else(|| "unknown execution failure".into()),
            }
        })
    }
}
