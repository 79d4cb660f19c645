use crate::{Gateway, GatewayError};
use chess_core::{generate_legal_moves, to_san, Game, GameState};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Prefix of the prompt line carrying the position.
pub const FEN_LINE_PREFIX: &str = "Current board in FEN:";

/// Offline opponent: reads the position from the prompt and answers a
/// uniformly random legal move in SAN.
pub struct RandomGateway {
    name: String,
    rng: StdRng,
}

impl RandomGateway {
    pub fn new() -> Self {
        RandomGateway {
            name: "random".to_string(),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        RandomGateway {
            name: format!("random:{seed}"),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomGateway {
    fn default() -> Self {
        Self::new()
    }
}

fn position_from_prompt(prompt: &str) -> Result<GameState, GatewayError> {
    let fen = prompt
        .lines()
        .find_map(|line| line.trim().strip_prefix(FEN_LINE_PREFIX))
        .ok_or_else(|| GatewayError::Prompt("no FEN line".to_string()))?;

    Game::from_fen(fen.trim())
        .map(|game| game.state().clone())
        .map_err(|e| GatewayError::Prompt(e.to_string()))
}

impl Gateway for RandomGateway {
    fn generate(&mut self, prompt: &str) -> Result<String, GatewayError> {
        let state = position_from_prompt(prompt)?;
        let moves = generate_legal_moves(&state);

        match moves.as_slice().choose(&mut self.rng) {
            Some(&mv) => Ok(to_san(&state, mv)),
            None => Err(GatewayError::Prompt("no legal moves".to_string())),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
