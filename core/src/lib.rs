pub mod board;
pub mod evaluation;
pub mod fen;
pub mod game;
pub mod game_state;
pub mod move_gen;
pub mod perft;
pub mod san;
pub mod types;
pub mod zobrist;

pub use board::*;
pub use evaluation::{material_balance, Advantage};
pub use fen::{positions, FenError};
pub use game::{ChessError, DrawRules, Game, PlayedMove, Termination};
pub use game_state::*;
pub use move_gen::*;
pub use perft::{perft, perft_divide, PerftCase, REFERENCE_CASES};
pub use san::{movetext, parse_san, to_san, SanError};
pub use types::*;
