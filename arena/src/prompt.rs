use chess_core::Game;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

pub use chess_agents::random::FEN_LINE_PREFIX;

/// Builds the text sent to an agent for one turn.
///
/// Every prompt carries a fresh request id drawn from the injected RNG so
/// that consecutive prompts for a repeated position still differ.
pub struct PromptBuilder<R = StdRng> {
    rng: R,
}

impl PromptBuilder<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: RngCore> PromptBuilder<R> {
    pub fn new(rng: R) -> Self {
        PromptBuilder { rng }
    }

    /// Sixteen lowercase hex digits.
    pub fn nonce(&mut self) -> String {
        format!("{:016x}", self.rng.next_u64())
    }

    pub fn build(&mut self, game: &Game) -> String {
        let history = game.history_text();
        let history = if history.is_empty() {
            "(none)"
        } else {
            history.as_str()
        };

        format!(
            "{FEN_LINE_PREFIX} {}\n\
             Moves so far: {}\n\
             You are playing {}.\n\
             Provide next move in algebraic notation only.\n\
             Request id: {}",
            game.serialize_position(),
            history,
            game.side_to_move(),
            self.nonce(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::parse_san;

    #[test]
    fn test_prompt_layout() {
        let mut builder = PromptBuilder::seeded(1);
        let prompt = builder.build(&Game::new());
        let lines: Vec<&str> = prompt.lines().collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(
            lines[0],
            "Current board in FEN: rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
        );
        assert_eq!(lines[1], "Moves so far: (none)");
        assert_eq!(lines[2], "You are playing white.");
        assert_eq!(lines[3], "Provide next move in algebraic notation only.");

        let nonce = lines[4].strip_prefix("Request id: ").unwrap();
        assert_eq!(nonce.len(), 16);
        assert!(nonce.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_prompt_includes_history() {
        let mut game = Game::new();
        for san in ["e4", "e5", "Nf3"] {
            let mv = parse_san(game.state(), san).unwrap();
            game.apply(mv).unwrap();
        }

        let prompt = PromptBuilder::seeded(3).build(&game);
        assert!(prompt.contains("Moves so far: 1. e4 e5 2. Nf3\n"));
        assert!(prompt.contains("You are playing black."));
    }

    #[test]
    fn test_seeded_nonces_repeat_and_vary() {
        let mut a = PromptBuilder::seeded(99);
        let mut b = PromptBuilder::seeded(99);
        let game = Game::new();

        let first = a.build(&game);
        assert_eq!(first, b.build(&game));
        assert_ne!(first, a.build(&game));
    }
}
