//! FEN (Forsyth-Edwards Notation) parsing and serialization.

use crate::board::BoardState;
use crate::game_state::GameState;
use crate::move_gen::legal_en_passant;
use crate::types::{
    CastlingRights, Color, File, Piece, PieceType, Rank, SideCastlingRights, Square,
};
use thiserror::Error;

/// FEN parsing error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("invalid FEN format: {0}")]
    InvalidFormat(String),
    #[error("invalid piece character: '{0}'")]
    InvalidPiece(char),
    #[error("invalid color: {0}")]
    InvalidColor(String),
    #[error("invalid castling rights: {0}")]
    InvalidCastling(String),
    #[error("invalid en passant square: {0}")]
    InvalidEnPassant(String),
    #[error("invalid number: {0}")]
    InvalidNumber(String),
}

impl GameState {
    /// Parses a FEN string into a game state.
    ///
    /// The clock fields may be omitted, in which case they default to `0 1`.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();

        if !(4..=6).contains(&parts.len()) {
            return Err(FenError::InvalidFormat(format!(
                "expected 4 to 6 fields, got {}",
                parts.len()
            )));
        }

        let board = parse_board(parts[0])?;

        let turn = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidColor(other.to_string())),
        };

        let castling = parse_castling(parts[2])?;
        let en_passant = parse_en_passant(parts[3])?;
        let halfmove_clock = parse_number(parts.get(4).copied().unwrap_or("0"))?;
        let fullmove_number = parse_number(parts.get(5).copied().unwrap_or("1"))?.max(1);

        Ok(GameState {
            board,
            turn,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        })
    }

    /// Converts the game state to a FEN string.
    ///
    /// The en passant field names a square only when a capture there is legal,
    /// so two identical positions always serialize identically.
    pub fn to_fen(&self) -> String {
        format!(
            "{} {} {} {} {} {}",
            board_to_fen(&self.board),
            if self.turn == Color::White { "w" } else { "b" },
            castling_to_fen(self.castling),
            legal_en_passant(self).map_or_else(|| "-".to_string(), |sq| sq.to_string()),
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}

fn parse_number(field: &str) -> Result<u16, FenError> {
    field
        .parse::<u16>()
        .map_err(|_| FenError::InvalidNumber(field.to_string()))
}

/// Parses the board portion of a FEN string, rank 8 first.
fn parse_board(board_str: &str) -> Result<BoardState, FenError> {
    let mut board = BoardState::empty();
    let ranks: Vec<&str> = board_str.split('/').collect();

    if ranks.len() != 8 {
        return Err(FenError::InvalidFormat(format!(
            "expected 8 ranks, got {}",
            ranks.len()
        )));
    }

    for (rank_idx, rank_str) in ranks.iter().enumerate() {
        let Some(rank) = Rank::new(7 - rank_idx as u8) else {
            continue;
        };
        let mut file_idx = 0u8;

        for ch in rank_str.chars() {
            if let Some(empty) = ch.to_digit(10) {
                if !(1..=8).contains(&empty) {
                    return Err(FenError::InvalidFormat(format!(
                        "bad empty-square count '{ch}' in rank {}",
                        8 - rank_idx
                    )));
                }
                file_idx += empty as u8;
            } else {
                let file = File::new(file_idx).ok_or_else(|| {
                    FenError::InvalidFormat(format!("too many squares in rank {}", 8 - rank_idx))
                })?;
                board.set_square(Square::new(file, rank), Some(piece_from_char(ch)?));
                file_idx += 1;
            }

            if file_idx > 8 {
                return Err(FenError::InvalidFormat(format!(
                    "too many squares in rank {}",
                    8 - rank_idx
                )));
            }
        }

        if file_idx != 8 {
            return Err(FenError::InvalidFormat(format!(
                "rank {} has {} squares, expected 8",
                8 - rank_idx,
                file_idx
            )));
        }
    }

    Ok(board)
}

fn board_to_fen(board: &BoardState) -> String {
    let mut fen = String::with_capacity(64);

    for rank_idx in (0..8).rev() {
        let mut empty_count = 0;

        for file_idx in 0..8 {
            let square = Square::from_index(rank_idx * 8 + file_idx);
            match square.and_then(|sq| board.piece_at(sq)) {
                Some(piece) => {
                    if empty_count > 0 {
                        fen.push_str(&empty_count.to_string());
                        empty_count = 0;
                    }
                    fen.push(piece_to_char(piece));
                }
                None => empty_count += 1,
            }
        }

        if empty_count > 0 {
            fen.push_str(&empty_count.to_string());
        }
        if rank_idx > 0 {
            fen.push('/');
        }
    }

    fen
}

fn piece_to_char(piece: Piece) -> char {
    let ch = piece.piece_type.to_char();
    match piece.color {
        Color::White => ch,
        Color::Black => ch.to_ascii_lowercase(),
    }
}

fn piece_from_char(ch: char) -> Result<Piece, FenError> {
    let piece_type = PieceType::from_char(ch).ok_or(FenError::InvalidPiece(ch))?;
    let color = if ch.is_ascii_uppercase() {
        Color::White
    } else {
        Color::Black
    };
    Ok(Piece { piece_type, color })
}

fn parse_castling(castling_str: &str) -> Result<CastlingRights, FenError> {
    let mut rights = CastlingRights::none();
    if castling_str == "-" {
        return Ok(rights);
    }

    for ch in castling_str.chars() {
        let side: &mut SideCastlingRights = match ch {
            'K' | 'Q' => &mut rights.white,
            'k' | 'q' => &mut rights.black,
            _ => return Err(FenError::InvalidCastling(castling_str.to_string())),
        };
        if ch.eq_ignore_ascii_case(&'k') {
            side.kingside = true;
        } else {
            side.queenside = true;
        }
    }

    Ok(rights)
}

fn castling_to_fen(castling: CastlingRights) -> String {
    let flags = [
        (castling.white.kingside, 'K'),
        (castling.white.queenside, 'Q'),
        (castling.black.kingside, 'k'),
        (castling.black.queenside, 'q'),
    ];
    let s: String = flags
        .iter()
        .filter(|(set, _)| *set)
        .map(|(_, ch)| ch)
        .collect();

    if s.is_empty() {
        "-".to_string()
    } else {
        s
    }
}

fn parse_en_passant(ep_str: &str) -> Result<Option<Square>, FenError> {
    if ep_str == "-" {
        return Ok(None);
    }

    let square =
        Square::parse(ep_str).ok_or_else(|| FenError::InvalidEnPassant(ep_str.to_string()))?;
    if square.rank() != Rank::THIRD && square.rank() != Rank::SIXTH {
        return Err(FenError::InvalidEnPassant(ep_str.to_string()));
    }
    Ok(Some(square))
}

/// Standard FEN positions for testing.
pub mod positions {
    /// Starting position.
    pub const STARTING: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    /// Kiwipete position - good for testing complex positions.
    pub const KIWIPETE: &str =
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

    /// Position after 1.e4 e5.
    pub const AFTER_E4_E5: &str = "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_starting_position() {
        let state = GameState::from_fen(positions::STARTING).unwrap();
        assert_eq!(state, GameState::new());
    }

    #[test]
    fn test_round_trip() {
        let state = GameState::from_fen(positions::KIWIPETE).unwrap();
        assert_eq!(state.to_fen(), positions::KIWIPETE);
    }

    #[test]
    fn test_parse_kiwipete() {
        let state = GameState::from_fen(positions::KIWIPETE).unwrap();
        assert_eq!(state.turn, Color::White);

        let piece = state.board.piece_at(Square::parse("e1").unwrap()).unwrap();
        assert_eq!(piece.piece_type, PieceType::King);
        assert_eq!(piece.color, Color::White);
    }

    #[test]
    fn test_en_passant_written_only_when_capturable() {
        // No white pawn can take on e6.
        let state = GameState::from_fen(positions::AFTER_E4_E5).unwrap();
        assert_eq!(state.en_passant, Square::parse("e6"));
        assert!(state.to_fen().contains(" KQkq - "));

        let fen = "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3";
        let state = GameState::from_fen(fen).unwrap();
        assert_eq!(state.to_fen(), fen);
    }

    #[test]
    fn test_clock_fields_optional() {
        let state = GameState::from_fen("4k3/8/8/8/8/8/8/4K3 b - -").unwrap();
        assert_eq!(state.turn, Color::Black);
        assert_eq!(state.halfmove_clock, 0);
        assert_eq!(state.fullmove_number, 1);
    }

    #[test]
    fn test_invalid_fen() {
        assert!(GameState::from_fen("invalid").is_err());
        assert!(GameState::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR").is_err());
        assert!(
            GameState::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1")
                .is_err()
        );
        assert_eq!(
            GameState::from_fen("rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            Err(FenError::InvalidFormat(
                "bad empty-square count '9' in rank 6".to_string()
            ))
        );
        assert_eq!(
            GameState::from_fen("rnbqkbnr/ppppxppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            Err(FenError::InvalidPiece('x'))
        );
    }
}
