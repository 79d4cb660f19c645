//! Agent gateways: the collaborators that turn a prompt into a move text.
//!
//! A gateway owns everything about talking to its backend (transport,
//! timeouts, credentials). It hands back the raw completion untouched; making
//! sense of it is the caller's job.

pub mod deployment;
pub mod random;
pub mod scripted;

use std::time::Duration;
use thiserror::Error;

/// Core trait for move-producing agents.
pub trait Gateway {
    /// Sends `prompt` unchanged and returns the completion text.
    ///
    /// `Ok("")` is a successful empty answer; every failure to obtain an
    /// answer at all is an `Err`.
    fn generate(&mut self, prompt: &str) -> Result<String, GatewayError>;

    /// Get the gateway's name
    fn name(&self) -> &str;
}

impl<G: Gateway + ?Sized> Gateway for Box<G> {
    fn generate(&mut self, prompt: &str) -> Result<String, GatewayError> {
        (**self).generate(prompt)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("completion had no content")]
    EmptyCompletion,
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error("gateway not configured: {0}")]
    NotConfigured(String),
    #[error("scripted gateway has no responses left")]
    Exhausted,
    #[error("prompt not understood: {0}")]
    Prompt(String),
}

pub use deployment::{DeploymentGateway, ProviderConfig};
pub use random::RandomGateway;
pub use scripted::{PromptLog, ScriptedGateway};
