//! Orchestration for LLM-versus-LLM chess: prompts, answer resolution, the
//! turn loop and its observers.

pub mod config;
pub mod events;
pub mod prompt;
pub mod report;
pub mod resolver;
pub mod scheduler;

pub use config::{AgentSpec, ArenaConfig, Cli, Command, ConfigError, PerftArgs, PlayArgs};
pub use events::{EventSink, JsonLinesSink, LogSink, MemorySink, TurnEvent, TurnOutcome};
pub use prompt::PromptBuilder;
pub use report::{board_diagram, GameReport, Offender};
pub use resolver::{resolve, Rejection, RejectionKind};
pub use scheduler::{CancelToken, HaltReason, Phase, Scheduler, SessionStatus};
