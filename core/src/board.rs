/// Board representation using both array-based and bitboard approaches.
/// The array answers "what is on this square", the bitboards answer
/// "where are all pieces of this kind".
use crate::types::*;

/// Back-rank piece order from the a-file to the h-file.
const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

/// Array-based board representation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Board {
    /// 64 squares, indexed by Square::index()
    squares: [Option<Piece>; 64],
}

impl Board {
    /// Creates an empty board.
    pub const fn empty() -> Self {
        Self {
            squares: [None; 64],
        }
    }

    /// Creates the standard starting position.
    pub fn starting_position() -> Self {
        let mut board = Self::empty();

        for color in [Color::White, Color::Black] {
            for (file_idx, &piece_type) in BACK_RANK.iter().enumerate() {
                let Some(file) = File::new(file_idx as u8) else {
                    continue;
                };
                board.set_piece(
                    Square::new(file, color.back_rank()),
                    Some(Piece::new(piece_type, color)),
                );
                board.set_piece(
                    Square::new(file, color.pawn_rank()),
                    Some(Piece::new(PieceType::Pawn, color)),
                );
            }
        }

        board
    }

    /// Gets the piece at the given square.
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square.index() as usize]
    }

    /// Sets the piece at the given square.
    pub fn set_piece(&mut self, square: Square, piece: Option<Piece>) {
        self.squares[square.index() as usize] = piece;
    }

    /// Moves a piece from one square to another.
    /// Returns the captured piece, if any.
    pub fn move_piece(&mut self, from: Square, to: Square) -> Option<Piece> {
        let piece = self.squares[from.index() as usize].take();
        std::mem::replace(&mut self.squares[to.index() as usize], piece)
    }

    /// Returns true if the given square is empty.
    pub fn is_empty(&self, square: Square) -> bool {
        self.piece_at(square).is_none()
    }

    /// Returns true if the given square contains a piece of the given color.
    pub fn is_color(&self, square: Square, color: Color) -> bool {
        self.piece_at(square).is_some_and(|p| p.color == color)
    }

    /// Returns true if the given square contains an enemy piece.
    pub fn is_enemy(&self, square: Square, color: Color) -> bool {
        self.piece_at(square)
            .is_some_and(|p| p.color == color.opponent())
    }

    /// Iterates over occupied squares in index order (a1, b1, ... h8).
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.squares.iter().enumerate().filter_map(|(idx, piece)| {
            let square = Square::from_index(idx as u8)?;
            piece.map(|p| (square, p))
        })
    }

    /// Finds the king square for the given color.
    /// Panics if no king is found; positions are validated on construction.
    pub fn king_square(&self, color: Color) -> Square {
        self.pieces()
            .find(|(_, p)| p.piece_type == PieceType::King && p.color == color)
            .map(|(square, _)| square)
            .unwrap_or_else(|| panic!("No king found for color {:?}", color))
    }

    /// Counts the kings of the given color.
    pub fn king_count(&self, color: Color) -> usize {
        self.pieces()
            .filter(|(_, p)| p.piece_type == PieceType::King && p.color == color)
            .count()
    }
}

/// Bitboard-based board representation.
/// Efficient for move generation and attack detection.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BitBoardSet {
    /// Bitboards by piece type and color
    pieces: [[BitBoard; 6]; 2],
    /// Combined occupancy by color
    color_occupancy: [BitBoard; 2],
    /// Total occupancy
    all_occupancy: BitBoard,
}

impl BitBoardSet {
    /// Creates an empty bitboard set.
    pub const fn empty() -> Self {
        Self {
            pieces: [[BitBoard::EMPTY; 6]; 2],
            color_occupancy: [BitBoard::EMPTY; 2],
            all_occupancy: BitBoard::EMPTY,
        }
    }

    /// Creates bitboards from an array-based board.
    pub fn from_board(board: &Board) -> Self {
        let mut bitboards = Self::empty();
        for (square, piece) in board.pieces() {
            bitboards.set_piece(square, piece);
        }
        bitboards
    }

    /// Gets the bitboard for pieces of a specific type and color.
    pub fn pieces(&self, piece_type: PieceType, color: Color) -> BitBoard {
        self.pieces[color as usize][piece_type as usize]
    }

    /// Gets the bitboard for pieces of a specific type, both colors.
    pub fn pieces_of_type(&self, piece_type: PieceType) -> BitBoard {
        self.pieces(piece_type, Color::White)
            .union(self.pieces(piece_type, Color::Black))
    }

    /// Gets all pieces of a specific color.
    pub fn color_occupancy(&self, color: Color) -> BitBoard {
        self.color_occupancy[color as usize]
    }

    /// Gets all occupied squares.
    pub fn all_occupancy(&self) -> BitBoard {
        self.all_occupancy
    }

    /// Gets all empty squares.
    pub fn empty_squares(&self) -> BitBoard {
        self.all_occupancy.complement()
    }

    fn set_piece(&mut self, square: Square, piece: Piece) {
        let bb = BitBoard::from_square(square);
        let (color, kind) = (piece.color as usize, piece.piece_type as usize);
        self.pieces[color][kind] = self.pieces[color][kind].union(bb);
        self.color_occupancy[color] = self.color_occupancy[color].union(bb);
        self.all_occupancy = self.all_occupancy.union(bb);
    }

    fn clear_square(&mut self, square: Square) {
        let keep = BitBoard::from_square(square).complement();

        for color in 0..2 {
            for kind in &mut self.pieces[color] {
                *kind = kind.intersection(keep);
            }
            self.color_occupancy[color] = self.color_occupancy[color].intersection(keep);
        }
        self.all_occupancy = self.all_occupancy.intersection(keep);
    }

    /// Moves a piece from one square to another.
    pub fn move_piece(&mut self, from: Square, to: Square, piece: Piece) {
        self.clear_square(from);
        self.clear_square(to);
        self.set_piece(to, piece);
    }
}

/// Complete board state combining both representations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BoardState {
    /// Array-based representation for simple lookups
    pub array_board: Board,
    /// Bitboard representation for efficient operations
    pub bitboards: BitBoardSet,
}

impl BoardState {
    /// Creates an empty board state.
    pub fn empty() -> Self {
        Self {
            array_board: Board::empty(),
            bitboards: BitBoardSet::empty(),
        }
    }

    /// Creates the standard starting position.
    pub fn starting_position() -> Self {
        let array_board = Board::starting_position();
        let bitboards = BitBoardSet::from_board(&array_board);
        Self {
            array_board,
            bitboards,
        }
    }

    /// Gets the piece at the given square.
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.array_board.piece_at(square)
    }

    /// Places (or removes) a piece, keeping both representations in sync.
    pub fn set_square(&mut self, square: Square, piece: Option<Piece>) {
        self.array_board.set_piece(square, piece);
        self.bitboards.clear_square(square);
        if let Some(piece) = piece {
            self.bitboards.set_piece(square, piece);
        }
    }

    /// Moves a piece from one square to another.
    /// Returns the captured piece, if any. Moving from an empty square is a no-op.
    pub fn move_piece(&mut self, from: Square, to: Square) -> Option<Piece> {
        let piece = self.piece_at(from)?;
        let captured = self.array_board.move_piece(from, to);
        self.bitboards.move_piece(from, to, piece);
        captured
    }

    /// Returns true if the representations are consistent.
    pub fn is_consistent(&self) -> bool {
        self.bitboards == BitBoardSet::from_board(&self.array_board)
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
        let board = BoardState::starting_position();

        assert_eq!(
            board.piece_at(sq("a1")),
            Some(Piece::new(PieceType::Rook, Color::White))
        );
        assert_eq!(
            board.piece_at(sq("e1")),
            Some(Piece::new(PieceType::King, Color::White))
        );
        assert_eq!(
            board.piece_at(sq("d8")),
            Some(Piece::new(PieceType::Queen, Color::Black))
        );
        assert_eq!(
            board.piece_at(sq("h7")),
            Some(Piece::new(PieceType::Pawn, Color::Black))
        );
        assert!(board.piece_at(sq("d5")).is_none());

        assert!(board.is_consistent());
    }

    #[test]
    fn test_move_piece() {
        let mut board = BoardState::starting_position();

        let captured = board.move_piece(sq("e2"), sq("e4"));
        assert!(captured.is_none());
        assert!(board.piece_at(sq("e2")).is_none());
        assert_eq!(
            board.piece_at(sq("e4")),
            Some(Piece::new(PieceType::Pawn, Color::White))
        );

        let captured = board.move_piece(sq("d8"), sq("d2"));
        assert_eq!(captured, Some(Piece::new(PieceType::Pawn, Color::White)));

        assert!(board.is_consistent());
    }

    #[test]
    fn test_set_square_keeps_bitboards_in_sync() {
        let mut board = BoardState::empty();
        board.set_square(sq("c3"), Some(Piece::new(PieceType::Knight, Color::Black)));
        board.set_square(sq("c3"), Some(Piece::new(PieceType::Bishop, Color::White)));

        assert!(board
            .bitboards
            .pieces(PieceType::Knight, Color::Black)
            .is_empty());
        assert_eq!(board.bitboards.pieces(PieceType::Bishop, Color::White).count(), 1);

        board.set_square(sq("c3"), None);
        assert!(board.bitboards.all_occupancy().is_empty());
    }

    #[test]
    fn test_bitboard_occupancy() {
        let board = BoardState::starting_position();

        assert_eq!(board.bitboards.color_occupancy(Color::White).count(), 16);
        assert_eq!(board.bitboards.color_occupancy(Color::Black).count(), 16);
        assert_eq!(board.bitboards.all_occupancy().count(), 32);
        assert_eq!(board.bitboards.empty_squares().count(), 32);
        assert_eq!(board.array_board.king_count(Color::Black), 1);
    }
}
