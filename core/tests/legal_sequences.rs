//! Random legal-move walks from the start position.

use chess_core::{generate_legal_moves, is_legal, Game, GameState};
use proptest::prelude::*;

/// Plays `choices` as indices into each position's legal move list, stopping
/// early when the game ends.
fn walk(choices: &[usize]) -> Game {
    let mut game = Game::new();
    for &choice in choices {
        if game.is_terminal().is_some() {
            break;
        }
        let moves = generate_legal_moves(game.state());
        let mv = moves.as_slice()[choice % moves.len()];
        game.apply(mv).unwrap();
    }
    game
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn every_recorded_move_was_legal(choices in prop::collection::vec(any::<usize>(), 0..60)) {
        let game = walk(&choices);

        let mut state = game.initial().clone();
        for played in game.history() {
            prop_assert!(is_legal(&state, played.mv));
            state = state.apply_move(played.mv).unwrap();
        }
        prop_assert_eq!(&state, game.state());
        prop_assert!(state.board.is_consistent());
    }

    #[test]
    fn history_replays_to_same_position(choices in prop::collection::vec(any::<usize>(), 0..60)) {
        let game = walk(&choices);
        let sans = game.serialize_history();

        let replayed = Game::replay(GameState::new(), &sans).unwrap();
        prop_assert_eq!(replayed.state(), game.state());
        prop_assert_eq!(replayed.serialize_history(), sans);
    }

    #[test]
    fn serialize_position_is_stable(choices in prop::collection::vec(any::<usize>(), 0..40)) {
        let game = walk(&choices);
        let fen = game.serialize_position();

        prop_assert_eq!(game.serialize_position(), fen.clone());
        let reparsed = Game::from_fen(&fen).unwrap();
        prop_assert_eq!(reparsed.serialize_position(), fen);
    }
}
