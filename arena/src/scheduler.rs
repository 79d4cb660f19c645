//! The turn loop.
//!
//! One state machine drives the session: ask the agent seated on the side to
//! move, resolve its answer, apply it, check for the end. Every failure halts
//! the session and ends up in the report; nothing here returns an error.

use crate::events::{EventSink, TurnEvent, TurnOutcome};
use crate::prompt::PromptBuilder;
use crate::report::GameReport;
use crate::resolver::{resolve, Rejection, RejectionKind};
use chess_agents::{Gateway, GatewayError};
use chess_core::{to_san, Color, Game, Termination};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Where the session is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    AwaitingMove(Color),
    Applying { side: Color, raw_text: String },
    CheckingTermination,
    Halted(HaltReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HaltReason {
    GameOver(Termination),
    InvalidMove {
        side: Color,
        raw_text: String,
        rejection: Rejection,
    },
    BudgetExhausted,
    AgentFailure {
        side: Color,
        error: GatewayError,
    },
    Cancelled,
}

impl HaltReason {
    pub fn status(&self) -> SessionStatus {
        match self {
            HaltReason::GameOver(_) => SessionStatus::CompletedNormally,
            HaltReason::InvalidMove { .. } => SessionStatus::AbortedOnInvalidMove,
            HaltReason::BudgetExhausted => SessionStatus::AbortedOnBudget,
            HaltReason::AgentFailure { .. } => SessionStatus::AbortedOnAgentFailure,
            HaltReason::Cancelled => SessionStatus::Cancelled,
        }
    }

    /// The side whose turn caused the halt, if one did.
    pub fn offender(&self) -> Option<Color> {
        match self {
            HaltReason::InvalidMove { side, .. } | HaltReason::AgentFailure { side, .. } => {
                Some(*side)
            }
            _ => None,
        }
    }
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HaltReason::GameOver(kind) => write!(f, "game-over:{kind}"),
            HaltReason::InvalidMove { .. } => f.write_str("invalid-move"),
            HaltReason::BudgetExhausted => f.write_str("budget-exhausted"),
            HaltReason::AgentFailure { .. } => f.write_str("agent-failure"),
            HaltReason::Cancelled => f.write_str("cancelled"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    InProgress,
    CompletedNormally,
    AbortedOnInvalidMove,
    AbortedOnBudget,
    AbortedOnAgentFailure,
    Cancelled,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::InProgress => "in-progress",
            SessionStatus::CompletedNormally => "completed-normally",
            SessionStatus::AbortedOnInvalidMove => "aborted-on-invalid-move",
            SessionStatus::AbortedOnBudget => "aborted-on-budget",
            SessionStatus::AbortedOnAgentFailure => "aborted-on-agent-failure",
            SessionStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stop request shared with whoever may want to end the session early.
/// Checked between turns only.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct Scheduler {
    game: Game,
    white: Box<dyn Gateway>,
    black: Box<dyn Gateway>,
    budget: usize,
    prompts: PromptBuilder,
    sinks: Vec<Box<dyn EventSink>>,
    cancel: CancelToken,
}

impl Scheduler {
    pub fn new(game: Game, white: Box<dyn Gateway>, black: Box<dyn Gateway>, budget: usize) -> Self {
        Scheduler {
            game,
            white,
            black,
            budget,
            prompts: PromptBuilder::from_entropy(),
            sinks: Vec::new(),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_prompts(mut self, prompts: PromptBuilder) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_sink(mut self, sink: Box<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Plays until a halt and reports the result.
    pub fn run(mut self) -> GameReport {
        info!(
            white = self.white.name(),
            black = self.black.name(),
            budget = self.budget,
            fen = %self.game.serialize_position(),
            "session started"
        );

        let mut phase = match self.game.is_terminal() {
            Some(kind) => Phase::Halted(HaltReason::GameOver(kind)),
            None => Phase::AwaitingMove(self.game.side_to_move()),
        };

        loop {
            debug!(ply = self.game.ply_count(), ?phase, "transition");
            phase = match phase {
                Phase::AwaitingMove(side) => self.await_move(side),
                Phase::Applying { side, raw_text } => self.apply(side, raw_text),
                Phase::CheckingTermination => self.check_termination(),
                Phase::Halted(reason) => return self.finish(reason),
            };
        }
    }

    fn seat(&mut self, side: Color) -> &mut dyn Gateway {
        match side {
            Color::White => self.white.as_mut(),
            Color::Black => self.black.as_mut(),
        }
    }

    fn agent_name(&self, side: Color) -> String {
        match side {
            Color::White => self.white.name().to_string(),
            Color::Black => self.black.name().to_string(),
        }
    }

    fn await_move(&mut self, side: Color) -> Phase {
        if self.cancel.is_cancelled() {
            return Phase::Halted(HaltReason::Cancelled);
        }

        let prompt = self.prompts.build(&self.game);
        let ply = self.game.ply_count() + 1;
        debug!(ply, side = %side, "prompting agent");

        match self.seat(side).generate(&prompt) {
            Ok(raw_text) => Phase::Applying { side, raw_text },
            Err(error) => {
                self.emit(side, None, TurnOutcome::AgentFailure {
                    error: error.to_string(),
                });
                Phase::Halted(HaltReason::AgentFailure { side, error })
            }
        }
    }

    fn apply(&mut self, side: Color, raw_text: String) -> Phase {
        let mv = match resolve(self.game.state(), &raw_text) {
            Ok(mv) => mv,
            Err(rejection) => return self.reject(side, raw_text, rejection),
        };

        let san = to_san(self.game.state(), mv);
        if let Err(err) = self.game.apply(mv).map(|_| ()) {
            // resolve only yields legal moves
            let rejection = Rejection {
                kind: RejectionKind::IllegalMove,
                detail: err.to_string(),
            };
            return self.reject(side, raw_text, rejection);
        }

        self.emit(side, Some(raw_text), TurnOutcome::Applied {
            san,
            uci: mv.to_string(),
        });
        Phase::CheckingTermination
    }

    fn reject(&mut self, side: Color, raw_text: String, rejection: Rejection) -> Phase {
        self.emit(side, Some(raw_text.clone()), TurnOutcome::Rejected {
            reason: rejection.kind,
            detail: rejection.detail.clone(),
        });
        Phase::Halted(HaltReason::InvalidMove {
            side,
            raw_text,
            rejection,
        })
    }

    fn check_termination(&self) -> Phase {
        if let Some(kind) = self.game.is_terminal() {
            Phase::Halted(HaltReason::GameOver(kind))
        } else if self.game.ply_count() >= self.budget {
            Phase::Halted(HaltReason::BudgetExhausted)
        } else {
            Phase::AwaitingMove(self.game.side_to_move())
        }
    }

    /// Sends a turn event to every sink. The ply is the attempted ply, which
    /// for an applied move is the one just played.
    fn emit(&mut self, side: Color, raw_text: Option<String>, outcome: TurnOutcome) {
        let ply = match &outcome {
            TurnOutcome::Applied { .. } => self.game.ply_count(),
            _ => self.game.ply_count() + 1,
        };
        let event = TurnEvent {
            ply,
            side,
            agent: self.agent_name(side),
            raw_text,
            outcome,
            board_snapshot: self.game.serialize_position(),
        };

        for sink in &mut self.sinks {
            sink.record(&event);
        }
    }

    fn finish(self, reason: HaltReason) -> GameReport {
        let report = GameReport::new(&self.game, &reason);
        info!(
            status = %report.status,
            reason = %reason,
            plies = report.plies,
            score = report.score,
            "session halted"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MemorySink;
    use chess_agents::ScriptedGateway;

    fn scripted(moves: &[&str]) -> Box<dyn Gateway> {
        Box::new(ScriptedGateway::from_moves("script", moves.iter().copied()))
    }

    #[test]
    fn test_halt_reason_status_mapping() {
        let cases = [
            (
                HaltReason::GameOver(Termination::Stalemate),
                SessionStatus::CompletedNormally,
                "game-over:stalemate",
            ),
            (
                HaltReason::BudgetExhausted,
                SessionStatus::AbortedOnBudget,
                "budget-exhausted",
            ),
            (
                HaltReason::AgentFailure {
                    side: Color::Black,
                    error: GatewayError::EmptyCompletion,
                },
                SessionStatus::AbortedOnAgentFailure,
                "agent-failure",
            ),
            (HaltReason::Cancelled, SessionStatus::Cancelled, "cancelled"),
        ];

        for (reason, status, text) in cases {
            assert_eq!(reason.status(), status);
            assert_eq!(reason.to_string(), text);
        }
    }

    #[test]
    fn test_alternates_seats_by_side_to_move() {
        let sink = MemorySink::new();
        let scheduler = Scheduler::new(
            Game::new(),
            scripted(&["e4", "Nf3"]),
            scripted(&["e5", "Nc6"]),
            4,
        )
        .with_prompts(PromptBuilder::seeded(0))
        .with_sink(Box::new(sink.clone()));

        let report = scheduler.run();
        assert_eq!(report.moves, vec!["e4", "e5", "Nf3", "Nc6"]);
        assert_eq!(report.status, SessionStatus::AbortedOnBudget);

        let sides: Vec<Color> = sink.events().iter().map(|e| e.side).collect();
        assert_eq!(sides, [Color::White, Color::Black, Color::White, Color::Black]);
        let plies: Vec<usize> = sink.events().iter().map(|e| e.ply).collect();
        assert_eq!(plies, [1, 2, 3, 4]);
    }

    #[test]
    fn test_black_to_move_start_asks_black_first() {
        let game =
            Game::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1").unwrap();
        let report = Scheduler::new(game, scripted(&[]), scripted(&["c5"]), 1)
            .with_prompts(PromptBuilder::seeded(0))
            .run();

        assert_eq!(report.moves, vec!["c5"]);
        assert_eq!(report.movetext, "1... c5");
        assert_eq!(report.status, SessionStatus::AbortedOnBudget);
    }

    #[test]
    fn test_cancel_before_first_turn() {
        let cancel = CancelToken::new();
        cancel.cancel();

        let report = Scheduler::new(Game::new(), scripted(&["e4"]), scripted(&[]), 10)
            .with_cancel(cancel)
            .run();

        assert_eq!(report.status, SessionStatus::Cancelled);
        assert_eq!(report.plies, 0);
    }

    #[test]
    fn test_already_finished_position_halts_immediately() {
        let game = Game::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let report = Scheduler::new(game, scripted(&[]), scripted(&[]), 10).run();

        assert_eq!(report.status, SessionStatus::CompletedNormally);
        assert_eq!(report.termination, Some(Termination::Stalemate));
    }
}
