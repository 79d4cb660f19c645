use crate::game_state::GameState;
use crate::move_gen::legal_en_passant;
use crate::types::{CastlingRights, Color, Piece, Square};
use std::sync::LazyLock;

/// Zobrist keys for chess positions.
/// Pre-computed random numbers for each piece-square combination.
#[derive(Debug, Clone)]
pub struct ZobristKeys {
    /// Random values for each piece type, color, and square
    piece_square: [[[u64; 64]; 6]; 2],
    /// Random value for side to move (XOR when black to move)
    black_to_move: u64,
    /// Random values for castling rights
    castling: [u64; 16],
    /// Random values for en passant files
    en_passant: [u64; 8],
}

impl ZobristKeys {
    /// Creates the key set from a fixed xorshift seed, so keys are stable
    /// across runs.
    pub fn new() -> Self {
        let mut rng = 0x1234_5678_9ABC_DEF_u64;
        let mut next_random = || {
            rng ^= rng << 13;
            rng ^= rng >> 7;
            rng ^= rng << 17;
            rng
        };

        let mut piece_square = [[[0u64; 64]; 6]; 2];
        for color in piece_square.iter_mut() {
            for kind in color.iter_mut() {
                for key in kind.iter_mut() {
                    *key = next_random();
                }
            }
        }

        let black_to_move = next_random();
        let castling = std::array::from_fn(|_| next_random());
        let en_passant = std::array::from_fn(|_| next_random());

        Self {
            piece_square,
            black_to_move,
            castling,
            en_passant,
        }
    }

    pub fn piece_square_key(&self, piece: Piece, square: Square) -> u64 {
        self.piece_square[piece.color as usize][piece.piece_type as usize][square.index() as usize]
    }

    pub fn side_to_move_key(&self, color: Color) -> u64 {
        match color {
            Color::White => 0,
            Color::Black => self.black_to_move,
        }
    }

    pub fn castling_key(&self, rights: CastlingRights) -> u64 {
        let index = usize::from(rights.white.kingside)
            | usize::from(rights.white.queenside) << 1
            | usize::from(rights.black.kingside) << 2
            | usize::from(rights.black.queenside) << 3;
        self.castling[index]
    }

    pub fn en_passant_key(&self, square: Option<Square>) -> u64 {
        square.map_or(0, |sq| self.en_passant[sq.file().index() as usize])
    }
}

impl Default for ZobristKeys {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide key table; immutable after first use.
pub static ZOBRIST: LazyLock<ZobristKeys> = LazyLock::new(ZobristKeys::new);

impl GameState {
    /// Hash identifying the position for repetition purposes: placement, side
    /// to move, castling rights and a capturable en passant square. Clocks are
    /// deliberately excluded.
    pub fn position_key(&self) -> u64 {
        let keys = &*ZOBRIST;
        let placement = self
            .board
            .array_board
            .pieces()
            .fold(0, |hash, (square, piece)| {
                hash ^ keys.piece_square_key(piece, square)
            });

        placement
            ^ keys.side_to_move_key(self.turn)
            ^ keys.castling_key(self.castling)
            ^ keys.en_passant_key(legal_en_passant(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Move;

    fn play(state: &GameState, uci: &str) -> GameState {
        state
            .apply_move(Move::from_coordinates(uci).unwrap())
            .unwrap()
    }

    #[test]
    fn test_transposition_has_same_key() {
        let start = GameState::new();
        let a = play(&play(&play(&play(&start, "g1f3"), "g8f6"), "b1c3"), "b8c6");
        let b = play(&play(&play(&play(&start, "b1c3"), "b8c6"), "g1f3"), "g8f6");
        assert_eq!(a.position_key(), b.position_key());
    }

    #[test]
    fn test_knight_shuffle_returns_to_start_key() {
        let start = GameState::new();
        let back = play(&play(&play(&play(&start, "g1f3"), "g8f6"), "f3g1"), "f6g8");
        assert_eq!(back.position_key(), start.position_key());
        assert_ne!(play(&start, "g1f3").position_key(), start.position_key());
    }

    #[test]
    fn test_uncapturable_en_passant_ignored() {
        // After 1.e4 no black pawn can take on e3.
        let after_e4 = play(&GameState::new(), "e2e4");
        let mut without_ep = after_e4.clone();
        without_ep.en_passant = None;
        assert_eq!(after_e4.position_key(), without_ep.position_key());
    }
}
