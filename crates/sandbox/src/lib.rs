mod config;
mod error;
mod provider;
mod sandbox;
mod types;

pub use config::SessionSpec;
pub use error::{Result, SandboxError};
pub use provider::SandboxProvider;
pub use sandbox::Sandbox;
pub use types::{ExecOutput, ExecRequest};
