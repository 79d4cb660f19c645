//! Standard algebraic notation (SAN).
//!
//! Rendering follows the usual conventions: minimal disambiguation computed
//! against the other legal moves, `x` for captures, `=Q` for promotions and a
//! `+`/`#` suffix. Parsing is position-relative, so a successful parse is
//! always a legal move.

use crate::game_state::GameState;
use crate::move_gen::{generate_legal_moves, is_checkmate};
use crate::types::{File, Move, PieceType, Rank, Square};
use thiserror::Error;

/// Why a SAN string did not resolve to a move.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanError {
    /// The text is not shaped like a SAN move at all.
    #[error("not algebraic notation: {0:?}")]
    Syntax(String),
    /// Well-formed, but no legal move matches.
    #[error("no legal move matches {0:?}")]
    Illegal(String),
    /// Well-formed, but more than one legal move matches.
    #[error("{0:?} is ambiguous")]
    Ambiguous(String),
}

impl SanError {
    /// True when the text was shaped like a move but did not match one.
    pub fn is_semantic(&self) -> bool {
        !matches!(self, SanError::Syntax(_))
    }
}

/// The pieces of a parsed SAN token, before matching against legal moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SanToken {
    Castle { kingside: bool },
    Normal {
        piece: Option<PieceType>,
        from_file: Option<File>,
        from_rank: Option<Rank>,
        to: Square,
        promotion: Option<PieceType>,
    },
}

/// Renders `mv` in SAN. `mv` must be legal in `state`.
pub fn to_san(state: &GameState, mv: Move) -> String {
    let mut san = san_without_suffix(state, mv);

    if let Some(next) = state.apply_move(mv) {
        if is_checkmate(&next) {
            san.push('#');
        } else if next.is_in_check() {
            san.push('+');
        }
    }

    san
}

fn san_without_suffix(state: &GameState, mv: Move) -> String {
    let Some(piece) = state.board.piece_at(mv.from) else {
        return mv.to_string();
    };

    if mv.is_castle(piece) {
        return if mv.to.file() > mv.from.file() {
            "O-O".to_string()
        } else {
            "O-O-O".to_string()
        };
    }

    let capture = state.captured_by(mv).is_some();
    let mut san = String::with_capacity(8);

    if piece.piece_type == PieceType::Pawn {
        if capture {
            san.push(mv.from.file().to_char());
        }
    } else {
        san.push(piece.piece_type.to_char());

        let rivals: Vec<Square> = generate_legal_moves(state)
            .iter()
            .filter(|other| {
                other.to == mv.to
                    && other.from != mv.from
                    && state
                        .board
                        .piece_at(other.from)
                        .is_some_and(|p| p.piece_type == piece.piece_type)
            })
            .map(|other| other.from)
            .collect();

        if !rivals.is_empty() {
            let shares_file = rivals.iter().any(|sq| sq.file() == mv.from.file());
            let shares_rank = rivals.iter().any(|sq| sq.rank() == mv.from.rank());

            if !shares_file || shares_rank {
                san.push(mv.from.file().to_char());
            }
            if shares_file {
                san.push(mv.from.rank().to_char());
            }
        }
    }

    if capture {
        san.push('x');
    }
    san.push_str(&mv.to.to_string());

    if let Some(promotion) = mv.promotion {
        san.push('=');
        san.push(promotion.to_char());
    }

    san
}

/// Parses SAN text against `state`, returning the unique legal move it names.
pub fn parse_san(state: &GameState, san: &str) -> Result<Move, SanError> {
    let token = tokenize(san).ok_or_else(|| SanError::Syntax(san.to_string()))?;
    let legal = generate_legal_moves(state);

    let mut candidates = legal.iter().copied().filter(|&mv| {
        let Some(piece) = state.board.piece_at(mv.from) else {
            return false;
        };

        match token {
            SanToken::Castle { kingside } => {
                mv.is_castle(piece) && (mv.to.file() > mv.from.file()) == kingside
            }
            SanToken::Normal {
                piece: wanted,
                from_file,
                from_rank,
                to,
                promotion,
            } => {
                let piece_matches = match wanted {
                    Some(kind) => piece.piece_type == kind,
                    // A full origin square may name any piece ("g1f3", "e1g1").
                    None if from_file.is_some() && from_rank.is_some() => true,
                    // Otherwise a pawn; captures must name the origin file.
                    None => {
                        piece.piece_type == PieceType::Pawn
                            && (from_file.is_some() || mv.from.file() == to.file())
                    }
                };

                piece_matches
                    && mv.to == to
                    && mv.promotion == promotion
                    && from_file.map_or(true, |f| mv.from.file() == f)
                    && from_rank.map_or(true, |r| mv.from.rank() == r)
            }
        }
    });

    match (candidates.next(), candidates.next()) {
        (Some(mv), None) => Ok(mv),
        (Some(_), Some(_)) => Err(SanError::Ambiguous(san.to_string())),
        (None, _) => Err(SanError::Illegal(san.to_string())),
    }
}

/// Splits a SAN string into its components without consulting the position.
///
/// Grammar: `[NBRQK]? [a-h]? [1-8]? [-x]? <square> (=?[NBRQKnbrqk])? [+#]?`
/// plus `O-O`, `O-O-O` and their zero-digit spellings.
fn tokenize(san: &str) -> Option<SanToken> {
    if !san.is_ascii() {
        return None;
    }

    let body = san
        .strip_suffix('+')
        .or_else(|| san.strip_suffix('#'))
        .unwrap_or(san);

    match body {
        "O-O" | "0-0" => return Some(SanToken::Castle { kingside: true }),
        "O-O-O" | "0-0-0" => return Some(SanToken::Castle { kingside: false }),
        _ => {}
    }

    let mut chars: Vec<char> = body.chars().collect();

    let promotion = match chars.as_slice() {
        [.., '=', p] | [.., '1'..='8', p] if p.is_ascii_alphabetic() => {
            Some(PieceType::from_char(*p)?)
        }
        _ => None,
    };
    if promotion.is_some() {
        chars.pop();
        if chars.last() == Some(&'=') {
            chars.pop();
        }
    }

    if chars.len() < 2 {
        return None;
    }
    let to_rank = Rank::from_char(chars.pop()?)?;
    let to_file = File::from_char(chars.pop()?)?;
    let to = Square::new(to_file, to_rank);

    let mut rest = chars.as_slice();
    let piece = match rest.first() {
        Some(&c) if matches!(c, 'N' | 'B' | 'R' | 'Q' | 'K') => {
            rest = &rest[1..];
            PieceType::from_char(c)
        }
        _ => None,
    };

    let mut from_file = None;
    if let Some(file) = rest.first().and_then(|&c| File::from_char(c)) {
        from_file = Some(file);
        rest = &rest[1..];
    }
    let mut from_rank = None;
    if let Some(rank) = rest.first().and_then(|&c| Rank::from_char(c)) {
        from_rank = Some(rank);
        rest = &rest[1..];
    }
    if let Some('-' | 'x') = rest.first() {
        rest = &rest[1..];
    }
    if !rest.is_empty() {
        return None;
    }

    Some(SanToken::Normal {
        piece,
        from_file,
        from_rank,
        to,
        promotion,
    })
}

/// Numbered movetext for a SAN sequence: "1. e4 e5 2. Nf3". A game that
/// starts with black to move opens with "1... e5".
pub fn movetext(start: &GameState, sans: &[String]) -> String {
    let mut text = String::new();
    let mut number = start.fullmove_number;
    let mut white_to_move = start.turn == crate::types::Color::White;

    for (idx, san) in sans.iter().enumerate() {
        if !text.is_empty() {
            text.push(' ');
        }
        if white_to_move {
            text.push_str(&format!("{number}. "));
        } else if idx == 0 {
            text.push_str(&format!("{number}... "));
        }
        text.push_str(san);

        if !white_to_move {
            number = number.saturating_add(1);
        }
        white_to_move = !white_to_move;
    }

    text
}
