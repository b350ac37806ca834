use std::sync::Arc;

use async_trait::async_trait;

use crate::config::SessionSpec;
use crate::error::Result;
use crate::sandbox::Sandbox;

/// Remote capability that provisions sandboxes. How environments are
/// physically backed (microVM, container, hosted service) is the
/// implementation's business; callers only see handles.
#[async_trait]
pub trait SandboxProvider: Send + Sync {
    /// Human-readable name for this provider implementation (e.g. "e2b").
    fn name(&self) -> &str;

    /// Provision a new sandbox tagged with the session id and language
    /// from `spec`. On success the environment is running and ready to
    /// accept `exec` calls.
    async fn create(&self, spec: &SessionSpec) -> Result<Arc<dyn Sandbox>>;
}
