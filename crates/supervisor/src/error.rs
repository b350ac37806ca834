#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    /// Caller misuse caught before any slot is taken: empty payload,
    /// non-positive timeout, unsupported language.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The supervisor has been shut down and admits no new executions.
    #[error("supervisor is shut down")]
    GateClosed,

    #[error("sandbox error: {0}")]
    Sandbox(#[from] sandbox::SandboxError),
}

pub type Result<T> = std::result::Result<T, SupervisorError>;
