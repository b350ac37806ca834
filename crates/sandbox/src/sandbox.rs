use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ExecOutput, ExecRequest};

/// One live remote execution environment.
///
/// Every method is a network round trip against the provider. Handles are
/// shared behind `Arc`, so all operations take `&self`.
#[async_trait]
pub trait Sandbox: Send + Sync {
    fn id(&self) -> &str;

    /// Start a process inside the sandbox, await its completion, and
    /// return its exit status with buffered stdout/stderr.
    ///
    /// There is no deadline at this layer; callers bound how long they
    /// are willing to wait.
    async fn exec(&self, request: &ExecRequest<'_>) -> Result<ExecOutput>;

    /// Terminate the remote environment. Any process still running inside
    /// it is killed with it.
    async fn kill(&self) -> Result<()>;
}
