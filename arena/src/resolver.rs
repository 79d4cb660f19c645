//! Turns one untrusted completion into a playable move or a rejection.
//!
//! Structured algebraic notation is tried first. Text that is not SAN but is
//! four or five characters long gets a second chance as coordinate notation
//! (`e2e4`, `e7e8q`). Nothing here mutates the position.

use chess_core::{is_legal, parse_san, GameState, Move, SanError};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectionKind {
    EmptyResponse,
    MalformedNotation,
    IllegalMove,
}

impl RejectionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RejectionKind::EmptyResponse => "empty-response",
            RejectionKind::MalformedNotation => "malformed-notation",
            RejectionKind::IllegalMove => "illegal-move",
        }
    }
}

impl fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{kind}: {detail}")]
pub struct Rejection {
    pub kind: RejectionKind,
    pub detail: String,
}

impl Rejection {
    fn new(kind: RejectionKind, detail: impl Into<String>) -> Self {
        Rejection {
            kind,
            detail: detail.into(),
        }
    }
}

/// First non-blank line of `text`, trimmed.
pub fn candidate_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|line| !line.is_empty())
}

pub fn resolve(state: &GameState, text: &str) -> Result<Move, Rejection> {
    let Some(candidate) = candidate_line(text) else {
        return Err(Rejection::new(RejectionKind::EmptyResponse, "no move text"));
    };

    let san_error = match parse_san(state, candidate) {
        Ok(mv) => return Ok(mv),
        Err(err) => err,
    };

    if matches!(candidate.chars().count(), 4 | 5) {
        if let Some(mv) = Move::from_coordinates(candidate) {
            return if is_legal(state, mv) {
                Ok(mv)
            } else {
                Err(Rejection::new(
                    RejectionKind::IllegalMove,
                    format!("{mv} is not a legal move"),
                ))
            };
        }
    }

    Err(match san_error {
        SanError::Syntax(_) => Rejection::new(RejectionKind::MalformedNotation, san_error.to_string()),
        SanError::Illegal(_) | SanError::Ambiguous(_) => {
            Rejection::new(RejectionKind::IllegalMove, san_error.to_string())
        }
    })
}
