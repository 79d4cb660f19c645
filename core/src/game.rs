//! A game in progress: the current position plus the history that led to it.
//!
//! `Game` is the only writer of position state during a session. Moves are
//! validated before anything is mutated, so a rejected move leaves the game
//! exactly as it was.

use crate::fen::FenError;
use crate::game_state::GameState;
use crate::move_gen::{generate_legal_moves, is_checkmate, is_legal, MoveList};
use crate::san::{movetext, parse_san, to_san, SanError};
use crate::types::{Color, Move, Piece, PieceType, Rank};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChessError {
    #[error(transparent)]
    Fen(#[from] FenError),
    #[error("invalid position: {0}")]
    InvalidPosition(String),
    #[error("illegal move {mv} in {fen}")]
    IllegalMove { mv: Move, fen: String },
    #[error("move {index}: {source}")]
    Notation {
        index: usize,
        #[source]
        source: SanError,
    },
}

/// Rule that ended the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Termination {
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    MoveRepetition,
    NoProgress,
}

impl Termination {
    pub fn as_str(self) -> &'static str {
        match self {
            Termination::Checkmate => "checkmate",
            Termination::Stalemate => "stalemate",
            Termination::InsufficientMaterial => "insufficient-material",
            Termination::MoveRepetition => "move-repetition",
            Termination::NoProgress => "no-progress",
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Thresholds for the draws that depend on game history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawRules {
    /// Occurrences of the same position that end the game.
    pub repetitions: usize,
    /// Plies without a capture or pawn move that end the game.
    pub no_progress_plies: u16,
}

impl DrawRules {
    /// Draws that end the game without a claim: fivefold repetition and the
    /// 75-move rule.
    pub const fn automatic() -> Self {
        Self {
            repetitions: 5,
            no_progress_plies: 150,
        }
    }

    /// Draws a player may claim: threefold repetition and the 50-move rule.
    pub const fn claimable() -> Self {
        Self {
            repetitions: 3,
            no_progress_plies: 100,
        }
    }
}

impl Default for DrawRules {
    fn default() -> Self {
        Self::automatic()
    }
}

/// One entry of the move history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayedMove {
    pub mv: Move,
    pub piece: Piece,
    pub captured: Option<Piece>,
}

#[derive(Debug, Clone)]
pub struct Game {
    initial: GameState,
    state: GameState,
    history: Vec<PlayedMove>,
    /// Position keys, one per position reached, starting with `initial`.
    keys: Vec<u64>,
    rules: DrawRules,
}

impl Game {
    /// Starts a game from the standard initial position.
    pub fn new() -> Self {
        let state = GameState::new();
        Self {
            keys: vec![state.position_key()],
            initial: state.clone(),
            state,
            history: Vec::new(),
            rules: DrawRules::default(),
        }
    }

    /// Starts a game from a FEN position.
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        Self::from_state(GameState::from_fen(fen)?)
    }

    /// Starts a game from an arbitrary position after checking it is playable:
    /// one king per side, no pawns on the back ranks and the side that just
    /// moved not left in check.
    pub fn from_state(state: GameState) -> Result<Self, ChessError> {
        for color in [Color::White, Color::Black] {
            let kings = state.board.array_board.king_count(color);
            if kings != 1 {
                return Err(ChessError::InvalidPosition(format!(
                    "{color} has {kings} kings"
                )));
            }
        }

        let pawns = state.board.bitboards.pieces_of_type(PieceType::Pawn);
        if pawns
            .iter()
            .any(|sq| sq.rank() == Rank::FIRST || sq.rank() == Rank::EIGHTH)
        {
            return Err(ChessError::InvalidPosition(
                "pawn on the first or eighth rank".to_string(),
            ));
        }

        if state.is_side_in_check(state.turn.opponent()) {
            return Err(ChessError::InvalidPosition(format!(
                "{} is in check but not to move",
                state.turn.opponent()
            )));
        }

        Ok(Self {
            keys: vec![state.position_key()],
            initial: state.clone(),
            state,
            history: Vec::new(),
            rules: DrawRules::default(),
        })
    }

    pub fn with_rules(mut self, rules: DrawRules) -> Self {
        self.rules = rules;
        self
    }

    /// Replays a SAN sequence from `initial`.
    pub fn replay<S: AsRef<str>>(initial: GameState, sans: &[S]) -> Result<Self, ChessError> {
        let mut game = Self::from_state(initial)?;
        for (index, san) in sans.iter().enumerate() {
            let mv = parse_san(&game.state, san.as_ref())
                .map_err(|source| ChessError::Notation { index, source })?;
            game.apply(mv)?;
        }
        Ok(game)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn initial(&self) -> &GameState {
        &self.initial
    }

    pub fn rules(&self) -> DrawRules {
        self.rules
    }

    pub fn history(&self) -> &[PlayedMove] {
        &self.history
    }

    pub fn side_to_move(&self) -> Color {
        self.state.turn
    }

    /// Plies applied since the game started.
    pub fn ply_count(&self) -> usize {
        self.history.len()
    }

    pub fn legal_moves(&self) -> MoveList {
        generate_legal_moves(&self.state)
    }

    pub fn is_legal(&self, mv: Move) -> bool {
        is_legal(&self.state, mv)
    }

    /// Plays `mv`. Illegal moves are refused and leave the game untouched.
    pub fn apply(&mut self, mv: Move) -> Result<&PlayedMove, ChessError> {
        let illegal = || ChessError::IllegalMove {
            mv,
            fen: self.state.to_fen(),
        };

        if !is_legal(&self.state, mv) {
            return Err(illegal());
        }
        let (Some(piece), Some(next)) = (
            self.state.board.piece_at(mv.from),
            self.state.apply_move(mv),
        ) else {
            return Err(illegal());
        };

        let captured = self.state.captured_by(mv);
        self.state = next;
        self.keys.push(self.state.position_key());
        self.history.push(PlayedMove {
            mv,
            piece,
            captured,
        });

        Ok(&self.history[self.history.len() - 1])
    }

    /// FEN of the current position.
    pub fn serialize_position(&self) -> String {
        self.state.to_fen()
    }

    /// The history in SAN, each move rendered in the position it was played.
    pub fn serialize_history(&self) -> Vec<String> {
        let mut state = self.initial.clone();
        let mut sans = Vec::with_capacity(self.history.len());

        for played in &self.history {
            sans.push(to_san(&state, played.mv));
            match state.apply_move(played.mv) {
                Some(next) => state = next,
                None => break,
            }
        }

        sans
    }

    /// Numbered movetext of the history, e.g. `1. e4 e5 2. Nf3`.
    pub fn history_text(&self) -> String {
        movetext(&self.initial, &self.serialize_history())
    }

    /// How many times the current position has occurred.
    pub fn repetition_count(&self) -> usize {
        let Some(current) = self.keys.last() else {
            return 0;
        };
        self.keys.iter().filter(|&key| key == current).count()
    }

    pub fn is_terminal(&self) -> Option<Termination> {
        if is_checkmate(&self.state) {
            return Some(Termination::Checkmate);
        }
        if self.state.is_insufficient_material() {
            return Some(Termination::InsufficientMaterial);
        }
        if generate_legal_moves(&self.state).is_empty() {
            return Some(Termination::Stalemate);
        }
        if self.state.is_no_progress(self.rules.no_progress_plies) {
            return Some(Termination::NoProgress);
        }
        if self.repetition_count() >= self.rules.repetitions {
            return Some(Termination::MoveRepetition);
        }
        None
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
