use crate::game_state::GameState;
use crate::types::*;
use serde::Serialize;
use std::fmt;

/// Material balance from White's point of view: for every piece type,
/// white count minus black count, weighted by `PieceType::value`.
/// Positive favors White, negative favors Black.
pub fn material_balance(state: &GameState) -> i32 {
    evaluate_material(state, Color::White) - evaluate_material(state, Color::Black)
}

/// Counts material value for a color.
fn evaluate_material(state: &GameState, color: Color) -> i32 {
    PieceType::ALL
        .iter()
        .map(|&kind| {
            let count = state.board.bitboards.pieces(kind, color).count() as i32;
            count * kind.value()
        })
        .sum()
}

/// Verdict derived from the sign of the material balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Advantage {
    White,
    Black,
    Even,
}

impl Advantage {
    pub fn from_score(score: i32) -> Self {
        match score.signum() {
            1 => Advantage::White,
            -1 => Advantage::Black,
            _ => Advantage::Even,
        }
    }
}

impl fmt::Display for Advantage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Advantage::White => "White advantage",
            Advantage::Black => "Black advantage",
            Advantage::Even => "Even position",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starting_position_is_balanced() {
        let state = GameState::new();
        assert_eq!(material_balance(&state), 0);
        assert_eq!(Advantage::from_score(0), Advantage::Even);
    }

    #[test]
    fn test_material_weights() {
        // White: queen + rook, black: two knights and a pawn.
        let state = GameState::from_fen("4k3/p7/2n1n3/8/8/8/8/Q3K2R w - - 0 1").unwrap();
        assert_eq!(material_balance(&state), 9 + 5 - (3 + 3 + 1));
        assert_eq!(Advantage::from_score(material_balance(&state)), Advantage::White);
    }

    #[test]
    fn test_black_advantage_is_negative() {
        let state = GameState::from_fen("3qk3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(material_balance(&state), -9);
        assert_eq!(Advantage::from_score(-9).to_string(), "Black advantage");
    }
}
