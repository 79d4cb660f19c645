//! Perft: exhaustive legal-move counting, used to check the move generator
//! against published node counts.

use crate::game_state::GameState;
use crate::move_gen::generate_legal_moves;
use crate::types::Move;

/// Counts leaf nodes of the legal move tree to the given depth.
pub fn perft(state: &GameState, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = generate_legal_moves(state);
    if depth == 1 {
        return moves.len() as u64;
    }

    moves
        .iter()
        .filter_map(|&mv| state.apply_move(mv))
        .map(|next| perft(&next, depth - 1))
        .sum()
}

/// Node counts broken down by root move.
pub fn perft_divide(state: &GameState, depth: u8) -> Vec<(Move, u64)> {
    let depth = depth.max(1);
    generate_legal_moves(state)
        .iter()
        .filter_map(|&mv| state.apply_move(mv).map(|next| (mv, perft(&next, depth - 1))))
        .collect()
}

/// A position with its published perft counts, indexed from depth 1.
#[derive(Debug, Clone, Copy)]
pub struct PerftCase {
    pub name: &'static str,
    pub fen: &'static str,
    pub counts: &'static [u64],
}

impl PerftCase {
    /// Expected node count at `depth`, if published.
    pub fn expected(&self, depth: u8) -> Option<u64> {
        let idx = usize::from(depth).checked_sub(1)?;
        self.counts.get(idx).copied()
    }
}

/// Reference positions from the Chess Programming Wiki.
pub const REFERENCE_CASES: &[PerftCase] = &[
    PerftCase {
        name: "start",
        fen: crate::fen::positions::STARTING,
        counts: &[20, 400, 8902, 197_281, 4_865_609],
    },
    PerftCase {
        name: "kiwipete",
        fen: crate::fen::positions::KIWIPETE,
        counts: &[48, 2039, 97_862, 4_085_603],
    },
    PerftCase {
        name: "position-3",
        fen: "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        counts: &[14, 191, 2812, 43_238, 674_624],
    },
    PerftCase {
        name: "position-4",
        fen: "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        counts: &[6, 264, 9467, 422_333],
    },
    PerftCase {
        name: "position-5",
        fen: "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        counts: &[44, 1486, 62_379, 2_103_487],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    fn check(case: &PerftCase, max_depth: u8) {
        let state = GameState::from_fen(case.fen).unwrap();
        for depth in 1..=max_depth {
            let expected = case.expected(depth).unwrap();
            assert_eq!(
                perft(&state, depth),
                expected,
                "{} perft({})",
                case.name,
                depth
            );
        }
    }

    #[test]
    fn test_perft_starting_position() {
        check(&REFERENCE_CASES[0], 3);
    }

    #[test]
    fn test_perft_kiwipete() {
        check(&REFERENCE_CASES[1], 2);
    }

    #[test]
    fn test_perft_endgame_and_promotions() {
        check(&REFERENCE_CASES[2], 3);
        check(&REFERENCE_CASES[3], 2);
        check(&REFERENCE_CASES[4], 2);
    }

    #[test]
    fn test_perft_divide() {
        let state = GameState::new();
        let results = perft_divide(&state, 2);

        assert_eq!(results.len(), 20);
        assert_eq!(results.iter().map(|(_, n)| n).sum::<u64>(), 400);
    }

    #[test]
    fn test_expected_lookup() {
        assert_eq!(REFERENCE_CASES[0].expected(0), None);
        assert_eq!(REFERENCE_CASES[0].expected(2), Some(400));
        assert_eq!(REFERENCE_CASES[0].expected(9), None);
    }
}
