use crate::scheduler::{HaltReason, SessionStatus};
use chess_core::{material_balance, Advantage, Color, File, Game, GameState, PieceType, Rank, Square};
use serde::Serialize;
use std::fmt;

/// The side and response that ended a session early.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Offender {
    pub side: Color,
    pub raw_text: Option<String>,
    pub detail: String,
}

/// Final result of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameReport {
    pub status: SessionStatus,
    pub halt_reason: String,
    pub termination: Option<chess_core::Termination>,
    pub offender: Option<Offender>,
    pub moves: Vec<String>,
    pub movetext: String,
    pub plies: usize,
    pub initial_fen: String,
    pub final_fen: String,
    pub score: i32,
    pub advantage: Advantage,
}

impl GameReport {
    pub fn new(game: &Game, reason: &HaltReason) -> Self {
        let termination = match reason {
            HaltReason::GameOver(kind) => Some(*kind),
            _ => None,
        };
        let offender = match reason {
            HaltReason::InvalidMove {
                side,
                raw_text,
                rejection,
            } => Some(Offender {
                side: *side,
                raw_text: Some(raw_text.clone()),
                detail: rejection.to_string(),
            }),
            HaltReason::AgentFailure { side, error } => Some(Offender {
                side: *side,
                raw_text: None,
                detail: error.to_string(),
            }),
            _ => None,
        };
        let score = material_balance(game.state());

        GameReport {
            status: reason.status(),
            halt_reason: reason.to_string(),
            termination,
            offender,
            moves: game.serialize_history(),
            movetext: game.history_text(),
            plies: game.ply_count(),
            initial_fen: game.initial().to_fen(),
            final_fen: game.serialize_position(),
            score,
            advantage: Advantage::from_score(score),
        }
    }
}

/// Text diagram of the position, white at the bottom.
pub fn board_diagram(state: &GameState) -> String {
    let mut out = String::from("  a b c d e f g h\n");

    for rank_idx in (0..8).rev() {
        let Some(rank) = Rank::new(rank_idx) else {
            continue;
        };
        out.push(rank.to_char());
        out.push(' ');

        for file_idx in 0..8 {
            let Some(file) = File::new(file_idx) else {
                continue;
            };
            let symbol = match state.board.piece_at(Square::new(file, rank)) {
                Some(piece) => piece_symbol(piece.piece_type, piece.color),
                None => '.',
            };
            out.push(symbol);
            out.push(' ');
        }

        out.push(rank.to_char());
        out.push('\n');
    }

    out.push_str("  a b c d e f g h\n");
    out
}

fn piece_symbol(piece_type: PieceType, color: Color) -> char {
    match (piece_type, color) {
        (PieceType::King, Color::White) => '♔',
        (PieceType::Queen, Color::White) => '♕',
        (PieceType::Rook, Color::White) => '♖',
        (PieceType::Bishop, Color::White) => '♗',
        (PieceType::Knight, Color::White) => '♘',
        (PieceType::Pawn, Color::White) => '♙',
        (PieceType::King, Color::Black) => '♚',
        (PieceType::Queen, Color::Black) => '♛',
        (PieceType::Rook, Color::Black) => '♜',
        (PieceType::Bishop, Color::Black) => '♝',
        (PieceType::Knight, Color::Black) => '♞',
        (PieceType::Pawn, Color::Black) => '♟',
    }
}

impl fmt::Display for GameReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Status: {} ({})", self.status, self.halt_reason)?;
        if let Some(offender) = &self.offender {
            write!(f, "Offending side: {}", offender.side)?;
            if let Some(raw) = &offender.raw_text {
                write!(f, ", response {raw:?}")?;
            }
            writeln!(f, ": {}", offender.detail)?;
        }

        let moves = if self.movetext.is_empty() {
            "(none)"
        } else {
            self.movetext.as_str()
        };
        writeln!(f, "Moves ({} plies): {}", self.plies, moves)?;

        if let Ok(state) = GameState::from_fen(&self.final_fen) {
            writeln!(f)?;
            write!(f, "{}", board_diagram(&state))?;
            writeln!(f)?;
        }
        writeln!(f, "Final FEN: {}", self.final_fen)?;
        writeln!(f, "{}", self.advantage)?;
        write!(f, "Evaluation score: {}", self.score)
    }
}
