//! Position state: placement, side to move, castling, en passant and clocks.
//! Everything FEN describes, and the attack queries move generation needs.

use crate::board::*;
use crate::types::*;

/// Complete state of a chess game, matching FEN components.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GameState {
    /// The current board position
    pub board: BoardState,
    /// Which side is to move
    pub turn: Color,
    /// Castling rights for both sides
    pub castling: CastlingRights,
    /// En passant target square (if a pawn just made a double move)
    pub en_passant: Option<Square>,
    /// Plies since the last capture or pawn move
    pub halfmove_clock: u16,
    /// Full move number (incremented after Black's move)
    pub fullmove_number: u16,
}

impl GameState {
    /// Creates a new game in the starting position.
    pub fn new() -> Self {
        Self {
            board: BoardState::starting_position(),
            turn: Color::White,
            castling: CastlingRights::all(),
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Creates an empty game state for testing.
    pub fn empty() -> Self {
        Self {
            board: BoardState::empty(),
            turn: Color::White,
            castling: CastlingRights::none(),
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Returns true once `limit` plies have passed without a capture or pawn move.
    pub fn is_no_progress(&self, limit: u16) -> bool {
        self.halfmove_clock >= limit
    }

    /// Returns true if neither side can possibly deliver mate.
    pub fn is_insufficient_material(&self) -> bool {
        self.has_insufficient_material(Color::White) && self.has_insufficient_material(Color::Black)
    }

    /// Returns true if `color` cannot mate by any sequence of legal moves.
    pub fn has_insufficient_material(&self, color: Color) -> bool {
        let bb = &self.board.bitboards;
        let own = bb.color_occupancy(color);

        let heavy = bb
            .pieces(PieceType::Pawn, color)
            .union(bb.pieces(PieceType::Rook, color))
            .union(bb.pieces(PieceType::Queen, color));
        if !heavy.is_empty() {
            return false;
        }

        if !bb.pieces(PieceType::Knight, color).is_empty() {
            // A lone knight mates only when the defender has blockers.
            let opponent = color.opponent();
            let defenders = bb
                .color_occupancy(opponent)
                .intersection(bb.pieces(PieceType::King, opponent).complement())
                .intersection(bb.pieces(PieceType::Queen, opponent).complement());
            return own.count() <= 2 && defenders.is_empty();
        }

        if !bb.pieces(PieceType::Bishop, color).is_empty() {
            let bishops = bb.pieces_of_type(PieceType::Bishop);
            let mut colors = bishops.iter().map(Square::color);
            let same_color = match colors.next() {
                Some(first) => colors.all(|c| c == first),
                None => true,
            };
            return same_color
                && bb.pieces_of_type(PieceType::Pawn).is_empty()
                && bb.pieces_of_type(PieceType::Knight).is_empty();
        }

        true
    }

    /// Applies a move to the game state, returning a new state.
    /// This does NOT check if the move is legal. Returns `None` when the
    /// source square is empty.
    pub fn apply_move(&self, mv: Move) -> Option<Self> {
        let mut new_state = self.clone();
        let piece = self.board.piece_at(mv.from)?;

        if mv.is_castle(piece) {
            new_state.apply_castle(mv);
        } else {
            let captured = new_state.board.move_piece(mv.from, mv.to);

            if piece.piece_type == PieceType::Pawn && Some(mv.to) == self.en_passant {
                let capture_square = Square::new(mv.to.file(), mv.from.rank());
                new_state.board.set_square(capture_square, None);
            }

            if let Some(promotion) = mv.promotion {
                new_state
                    .board
                    .set_square(mv.to, Some(Piece::new(promotion, piece.color)));
            }

            new_state.en_passant = None;
            if piece.piece_type == PieceType::Pawn && mv.from.distance(mv.to) == 2 {
                let middle = (mv.from.rank().index() + mv.to.rank().index()) / 2;
                new_state.en_passant = Rank::new(middle).map(|r| Square::new(mv.from.file(), r));
            }

            if piece.piece_type == PieceType::Pawn || captured.is_some() {
                new_state.halfmove_clock = 0;
            } else {
                new_state.halfmove_clock = new_state.halfmove_clock.saturating_add(1);
            }
        }

        new_state.castling = self.castling.update_after_move(mv.from, mv.to);

        if self.turn == Color::Black {
            new_state.fullmove_number = new_state.fullmove_number.saturating_add(1);
        }
        new_state.turn = self.turn.opponent();

        Some(new_state)
    }

    fn apply_castle(&mut self, mv: Move) {
        let rank = mv.from.rank();
        let (rook_from, rook_to) = if mv.to.file() > mv.from.file() {
            (Square::new(File::H, rank), Square::new(File::F, rank))
        } else {
            (Square::new(File::A, rank), Square::new(File::D, rank))
        };

        self.board.move_piece(mv.from, mv.to);
        self.board.move_piece(rook_from, rook_to);

        self.en_passant = None;
        self.halfmove_clock = self.halfmove_clock.saturating_add(1);
    }

    /// Returns the side to move.
    pub fn side_to_move(&self) -> Color {
        self.turn
    }

    /// Returns the piece a move would capture, including en passant.
    pub fn captured_by(&self, mv: Move) -> Option<Piece> {
        let mover = self.board.piece_at(mv.from)?;
        if let Some(target) = self.board.piece_at(mv.to) {
            return (target.color != mover.color).then_some(target);
        }
        if mover.piece_type == PieceType::Pawn
            && Some(mv.to) == self.en_passant
            && mv.from.file() != mv.to.file()
        {
            return self
                .board
                .piece_at(Square::new(mv.to.file(), mv.from.rank()));
        }
        None
    }

    /// Returns true if the given square is attacked by the given color.
    pub fn is_attacked_by(&self, square: Square, attacker: Color) -> bool {
        self.is_pawn_attacked(square, attacker)
            || self.is_stepper_attacked(square, attacker, PieceType::Knight, &KNIGHT_DELTAS)
            || self.is_slider_attacked(square, attacker)
            || self.is_stepper_attacked(square, attacker, PieceType::King, &KING_DELTAS)
    }

    fn is_pawn_attacked(&self, square: Square, attacker: Color) -> bool {
        // Attacking pawns sit one rank behind the target, from their point of view.
        let Some(rank) = square.rank().offset(-attacker.pawn_direction()) else {
            return false;
        };
        let enemy_pawns = self.board.bitboards.pieces(PieceType::Pawn, attacker);

        [-1, 1].iter().any(|&df| {
            square
                .file()
                .offset(df)
                .is_some_and(|file| enemy_pawns.contains(Square::new(file, rank)))
        })
    }

    fn is_stepper_attacked(
        &self,
        square: Square,
        attacker: Color,
        piece_type: PieceType,
        deltas: &[(i8, i8)],
    ) -> bool {
        let enemies = self.board.bitboards.pieces(piece_type, attacker);
        deltas.iter().any(|&(df, dr)| {
            match (square.file().offset(df), square.rank().offset(dr)) {
                (Some(file), Some(rank)) => enemies.contains(Square::new(file, rank)),
                _ => false,
            }
        })
    }

    fn is_slider_attacked(&self, square: Square, attacker: Color) -> bool {
        DIAGONAL_DIRS
            .iter()
            .any(|&(df, dr)| self.is_attacked_along_ray(square, df, dr, attacker, true))
            || STRAIGHT_DIRS
                .iter()
                .any(|&(df, dr)| self.is_attacked_along_ray(square, df, dr, attacker, false))
    }

    /// Walks a ray from `square` and reports whether the first piece hit is an
    /// enemy slider moving along that ray.
    fn is_attacked_along_ray(
        &self,
        square: Square,
        df: i8,
        dr: i8,
        attacker: Color,
        diagonal: bool,
    ) -> bool {
        let mut file = square.file();
        let mut rank = square.rank();

        loop {
            match (file.offset(df), rank.offset(dr)) {
                (Some(f), Some(r)) => {
                    file = f;
                    rank = r;
                }
                _ => return false,
            }

            if let Some(piece) = self.board.piece_at(Square::new(file, rank)) {
                let slides_here = match piece.piece_type {
                    PieceType::Queen => true,
                    PieceType::Bishop => diagonal,
                    PieceType::Rook => !diagonal,
                    _ => false,
                };
                return piece.color == attacker && slides_here;
            }
        }
    }

    /// Returns true if the current side to move is in check.
    pub fn is_in_check(&self) -> bool {
        self.is_side_in_check(self.turn)
    }

    /// Returns true if the given side is in check.
    pub fn is_side_in_check(&self, color: Color) -> bool {
        let king_square = self.board.array_board.king_square(color);
        self.is_attacked_by(king_square, color.opponent())
    }
}

pub(crate) const KNIGHT_DELTAS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

pub(crate) const KING_DELTAS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

pub(crate) const DIAGONAL_DIRS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
pub(crate) const STRAIGHT_DIRS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::parse(name).unwrap()
    }

    #[test]
    fn test_starting_position() {
        let state = GameState::new();
        assert_eq!(state.turn, Color::White);
        assert_eq!(state.castling, CastlingRights::all());
        assert!(state.en_passant.is_none());
        assert_eq!(state.halfmove_clock, 0);
        assert_eq!(state.fullmove_number, 1);
        assert!(!state.is_in_check());
    }

    #[test]
    fn test_apply_pawn_move() {
        let state = GameState::new();
        let new_state = state.apply_move(Move::new(sq("e2"), sq("e4"))).unwrap();

        assert_eq!(new_state.turn, Color::Black);
        assert_eq!(new_state.en_passant, Some(sq("e3")));
        assert_eq!(new_state.halfmove_clock, 0);
        assert_eq!(new_state.fullmove_number, 1);
    }

    #[test]
    fn test_apply_from_empty_square() {
        assert!(GameState::new().apply_move(Move::new(sq("e4"), sq("e5"))).is_none());
    }

    #[test]
    fn test_is_attacked() {
        let mut state = GameState::empty();
        state
            .board
            .set_square(sq("e4"), Some(Piece::new(PieceType::Rook, Color::White)));

        assert!(state.is_attacked_by(sq("e1"), Color::White));
        assert!(state.is_attacked_by(sq("e8"), Color::White));
        assert!(state.is_attacked_by(sq("a4"), Color::White));
        assert!(state.is_attacked_by(sq("h4"), Color::White));
        assert!(!state.is_attacked_by(sq("d5"), Color::White));
    }

    #[test]
    fn test_pawn_attacks_follow_direction() {
        let mut state = GameState::empty();
        state
            .board
            .set_square(sq("d4"), Some(Piece::new(PieceType::Pawn, Color::White)));
        state
            .board
            .set_square(sq("d5"), Some(Piece::new(PieceType::Pawn, Color::Black)));

        assert!(state.is_attacked_by(sq("e5"), Color::White));
        assert!(!state.is_attacked_by(sq("e3"), Color::White));
        assert!(state.is_attacked_by(sq("c4"), Color::Black));
        assert!(!state.is_attacked_by(sq("c6"), Color::Black));
    }

    #[test]
    fn test_captured_by_en_passant() {
        let state = GameState::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2").unwrap();
        assert_eq!(
            state.captured_by(Move::new(sq("e5"), sq("d6"))),
            Some(Piece::new(PieceType::Pawn, Color::Black))
        );
        assert_eq!(state.captured_by(Move::new(sq("e5"), sq("e6"))), None);
    }

    #[test]
    fn test_insufficient_material() {
        let cases = [
            ("8/8/8/4k3/8/8/8/4K3 w - - 0 1", true),
            ("8/8/8/4k3/8/8/8/4KN2 w - - 0 1", true),
            ("8/8/8/4k3/8/8/8/4KB2 w - - 0 1", true),
            // Bishops on the same square color.
            ("8/8/8/4kb2/8/8/8/4KB2 w - - 0 1", true),
            // Opposite-colored bishops can still mate.
            ("8/8/8/4k1b1/8/8/8/4KB2 w - - 0 1", false),
            ("8/8/8/4k3/8/8/8/3NKN2 w - - 0 1", false),
            ("8/8/8/4k3/8/8/4P3/4K3 w - - 0 1", false),
            ("8/8/8/4k3/8/8/8/4KR2 w - - 0 1", false),
            // Knight versus a blocker.
            ("8/8/8/4kp2/8/8/8/4KN2 w - - 0 1", false),
        ];

        for (fen, expected) in cases {
            let state = GameState::from_fen(fen).unwrap();
            assert_eq!(state.is_insufficient_material(), expected, "{fen}");
        }
    }
}
