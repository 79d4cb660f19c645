//! Command line and environment configuration.
//!
//! `Cli` is what clap parses; `ArenaConfig` is the validated form the rest of
//! the program works with. Provider credentials travel in a `ProviderConfig`
//! handed to each gateway at construction.

use chess_agents::{
    DeploymentGateway, Gateway, GatewayError, ProviderConfig, RandomGateway, ScriptedGateway,
};
use chess_core::DrawRules;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_MOVE_BUDGET: usize = 10;
pub const MAX_MOVE_BUDGET: usize = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("move budget must be between 1 and 100, got {0}")]
    BudgetOutOfRange(usize),
    #[error("unknown agent spec {0:?}")]
    InvalidAgentSpec(String),
    #[error("cannot set up gateway: {0}")]
    Provider(#[from] GatewayError),
}

#[derive(Debug, Parser)]
#[command(
    name = "chess-arena",
    version,
    about = "Two language-model agents play chess against each other",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub play: PlayArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Play one game (the default)
    Play(PlayArgs),
    /// Count legal move paths to check the move generator
    Perft(PerftArgs),
}

#[derive(Debug, Clone, Args)]
pub struct PlayArgs {
    /// Maximum number of plies to play
    #[arg(long = "moves", default_value_t = DEFAULT_MOVE_BUDGET)]
    pub moves: usize,

    /// Agent playing white: deployment:<name>, <name>, random[:<seed>] or script:<m1,m2,..>
    #[arg(long, env = "AGENT1_DEPLOYMENT", default_value = "gpt-deployment-1")]
    pub white: String,

    /// Agent playing black
    #[arg(long, env = "AGENT2_DEPLOYMENT", default_value = "gpt-deployment-2")]
    pub black: String,

    /// Seed for prompt request ids
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, default_value_t = 0.7)]
    pub temperature: f32,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,

    #[arg(long, value_enum, default_value_t = DrawRuleSet::Automatic)]
    pub draw_rules: DrawRuleSet,

    /// Start from this position instead of the initial one
    #[arg(long)]
    pub fen: Option<String>,

    /// Write turn events as JSON lines to this file
    #[arg(long)]
    pub events: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    #[arg(long, env = "AZURE_OPENAI_ENDPOINT", default_value = "")]
    pub endpoint: String,

    #[arg(long, env = "AZURE_OPENAI_API_KEY", default_value = "", hide_env_values = true)]
    pub api_key: String,

    #[arg(
        long,
        env = "AZURE_OPENAI_API_VERSION",
        default_value = ProviderConfig::DEFAULT_API_VERSION
    )]
    pub api_version: String,
}

#[derive(Debug, Clone, Args)]
pub struct PerftArgs {
    pub depth: u8,

    #[arg(long)]
    pub fen: Option<String>,

    /// Break the count down by root move
    #[arg(long)]
    pub divide: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DrawRuleSet {
    /// Fivefold repetition and the 75-move rule
    Automatic,
    /// Threefold repetition and the 50-move rule
    Claimable,
}

impl From<DrawRuleSet> for DrawRules {
    fn from(set: DrawRuleSet) -> Self {
        match set {
            DrawRuleSet::Automatic => DrawRules::automatic(),
            DrawRuleSet::Claimable => DrawRules::claimable(),
        }
    }
}

/// Who sits in a seat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentSpec {
    Deployment(String),
    Random(Option<u64>),
    Script(Vec<String>),
}

impl FromStr for AgentSpec {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || ConfigError::InvalidAgentSpec(s.to_string());

        match s.split_once(':') {
            None if s.is_empty() => Err(invalid()),
            None if s == "random" => Ok(AgentSpec::Random(None)),
            None => Ok(AgentSpec::Deployment(s.to_string())),
            Some(("deployment", name)) if !name.is_empty() => {
                Ok(AgentSpec::Deployment(name.to_string()))
            }
            Some(("random", seed)) => seed
                .parse()
                .map(|seed| AgentSpec::Random(Some(seed)))
                .map_err(|_| invalid()),
            Some(("script", moves)) => Ok(AgentSpec::Script(
                moves
                    .split(',')
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .map(String::from)
                    .collect(),
            )),
            Some(_) => Err(invalid()),
        }
    }
}

impl AgentSpec {
    pub fn build(&self, provider: &ProviderConfig) -> Result<Box<dyn Gateway>, ConfigError> {
        let gateway: Box<dyn Gateway> = match self {
            AgentSpec::Deployment(name) => {
                Box::new(DeploymentGateway::new(name.clone(), provider.clone())?)
            }
            AgentSpec::Random(None) => Box::new(RandomGateway::new()),
            AgentSpec::Random(Some(seed)) => Box::new(RandomGateway::with_seed(*seed)),
            AgentSpec::Script(moves) => {
                Box::new(ScriptedGateway::from_moves("script", moves.clone()))
            }
        };
        Ok(gateway)
    }
}

/// Validated settings for one session.
#[derive(Debug, Clone)]
pub struct ArenaConfig {
    pub budget: usize,
    pub white: AgentSpec,
    pub black: AgentSpec,
    pub seed: Option<u64>,
    pub draw_rules: DrawRules,
    pub start_fen: Option<String>,
    pub events: Option<PathBuf>,
    pub json: bool,
    pub provider: ProviderConfig,
}

impl ArenaConfig {
    pub fn from_args(args: PlayArgs) -> Result<Self, ConfigError> {
        if !(1..=MAX_MOVE_BUDGET).contains(&args.moves) {
            return Err(ConfigError::BudgetOutOfRange(args.moves));
        }

        Ok(ArenaConfig {
            budget: args.moves,
            white: args.white.parse()?,
            black: args.black.parse()?,
            seed: args.seed,
            draw_rules: args.draw_rules.into(),
            start_fen: args.fen,
            events: args.events,
            json: args.json,
            provider: ProviderConfig {
                endpoint: args.endpoint,
                api_key: args.api_key,
                api_version: args.api_version,
                temperature: args.temperature,
                timeout: Duration::from_secs(args.timeout_secs),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("chess-arena").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_agent_specs() {
        assert_eq!(
            "gpt-4o".parse::<AgentSpec>().unwrap(),
            AgentSpec::Deployment("gpt-4o".into())
        );
        assert_eq!(
            "deployment:gpt-deployment-2".parse::<AgentSpec>().unwrap(),
            AgentSpec::Deployment("gpt-deployment-2".into())
        );
        assert_eq!("random".parse::<AgentSpec>().unwrap(), AgentSpec::Random(None));
        assert_eq!("random:17".parse::<AgentSpec>().unwrap(), AgentSpec::Random(Some(17)));
        assert_eq!(
            "script:e4, Nf3".parse::<AgentSpec>().unwrap(),
            AgentSpec::Script(vec!["e4".into(), "Nf3".into()])
        );

        for bad in ["", "random:x", "deployment:", "telnet:host"] {
            assert!(
                matches!(bad.parse::<AgentSpec>(), Err(ConfigError::InvalidAgentSpec(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_budget_bounds() {
        let cli = parse(&["--moves", "0", "--white", "random", "--black", "random"]);
        assert!(matches!(
            ArenaConfig::from_args(cli.play),
            Err(ConfigError::BudgetOutOfRange(0))
        ));

        let cli = parse(&["--moves", "101", "--white", "random", "--black", "random"]);
        assert!(matches!(
            ArenaConfig::from_args(cli.play),
            Err(ConfigError::BudgetOutOfRange(101))
        ));

        let cli = parse(&["--moves", "100", "--white", "random", "--black", "random"]);
        assert_eq!(ArenaConfig::from_args(cli.play).unwrap().budget, 100);
    }

    #[test]
    fn test_play_options() {
        let cli = parse(&[
            "--white",
            "random:1",
            "--black",
            "script:e5",
            "--seed",
            "9",
            "--draw-rules",
            "claimable",
            "--timeout-secs",
            "5",
            "--json",
        ]);
        let config = ArenaConfig::from_args(cli.play).unwrap();

        assert_eq!(config.budget, DEFAULT_MOVE_BUDGET);
        assert_eq!(config.white, AgentSpec::Random(Some(1)));
        assert_eq!(config.black, AgentSpec::Script(vec!["e5".into()]));
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.draw_rules, DrawRules::claimable());
        assert_eq!(config.provider.timeout, Duration::from_secs(5));
        assert!(config.json);
    }

    #[test]
    fn test_perft_subcommand() {
        let cli = parse(&["perft", "3", "--divide"]);
        match cli.command {
            Some(Command::Perft(args)) => {
                assert_eq!(args.depth, 3);
                assert!(args.divide);
                assert!(args.fen.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_deployment_needs_credentials() {
        let provider = ProviderConfig {
            endpoint: String::new(),
            api_key: String::new(),
            api_version: ProviderConfig::DEFAULT_API_VERSION.to_string(),
            temperature: 0.7,
            timeout: Duration::from_secs(1),
        };

        assert!(matches!(
            AgentSpec::Deployment("gpt".into()).build(&provider),
            Err(ConfigError::Provider(GatewayError::NotConfigured(_)))
        ));
        assert!(AgentSpec::Random(Some(3)).build(&provider).is_ok());
    }
}
