//! Legal move generation: the oracle every other component defers to when it
//! needs to know whether a move may be played.

use crate::game_state::{GameState, DIAGONAL_DIRS, KING_DELTAS, KNIGHT_DELTAS, STRAIGHT_DIRS};
use crate::types::{Color, File, Move, Piece, PieceType, Rank, Square};

/// A list of moves with a fixed capacity to avoid allocations.
pub struct MoveList {
    moves: [Move; 256], // Max possible moves in any position
    count: usize,
}

impl MoveList {
    /// Creates an empty move list.
    pub const fn new() -> Self {
        let a1 = Square::new(File::A, Rank::FIRST);
        Self {
            moves: [Move::new(a1, a1); 256],
            count: 0,
        }
    }

    /// Adds a move to the list.
    pub fn push(&mut self, mv: Move) {
        debug_assert!(self.count < 256, "Move list overflow");
        self.moves[self.count] = mv;
        self.count += 1;
    }

    /// Returns the number of moves.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns an iterator over the moves.
    pub fn iter(&self) -> impl Iterator<Item = &Move> {
        self.moves[..self.count].iter()
    }

    /// Returns true if the list holds `mv`.
    pub fn contains(&self, mv: Move) -> bool {
        self.iter().any(|&m| m == mv)
    }

    /// Returns the moves as a slice.
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.count]
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

/// Generates all legal moves for the current position.
pub fn generate_legal_moves(state: &GameState) -> MoveList {
    let pseudo = generate_pseudo_legal_moves(state);
    let mut legal = MoveList::new();

    for &mv in pseudo.iter() {
        let keeps_king_safe = state
            .apply_move(mv)
            .is_some_and(|next| !next.is_side_in_check(state.turn));
        if keeps_king_safe {
            legal.push(mv);
        }
    }

    legal
}

/// Returns true if `mv` is a member of the legal move set.
pub fn is_legal(state: &GameState, mv: Move) -> bool {
    generate_legal_moves(state).contains(mv)
}

/// Returns the en passant square if some legal move captures there.
pub fn legal_en_passant(state: &GameState) -> Option<Square> {
    let ep = state.en_passant?;
    let pawns = state.board.bitboards.pieces(PieceType::Pawn, state.turn);
    let can_capture = generate_legal_moves(state)
        .iter()
        .any(|mv| mv.to == ep && pawns.contains(mv.from));
    can_capture.then_some(ep)
}

/// Generates all pseudo-legal moves (not checking for king safety).
fn generate_pseudo_legal_moves(state: &GameState) -> MoveList {
    let mut moves = MoveList::new();
    let color = state.turn;

    generate_pawn_moves(state, color, &mut moves);
    generate_stepper_moves(state, color, PieceType::Knight, &KNIGHT_DELTAS, &mut moves);
    generate_slider_moves(state, color, PieceType::Bishop, &DIAGONAL_DIRS, &mut moves);
    generate_slider_moves(state, color, PieceType::Rook, &STRAIGHT_DIRS, &mut moves);
    generate_slider_moves(state, color, PieceType::Queen, &DIAGONAL_DIRS, &mut moves);
    generate_slider_moves(state, color, PieceType::Queen, &STRAIGHT_DIRS, &mut moves);
    generate_stepper_moves(state, color, PieceType::King, &KING_DELTAS, &mut moves);
    generate_castling_moves(state, color, &mut moves);

    moves
}

/// Pushes a pawn move, expanding it into the four promotions on the last rank.
fn push_pawn_move(from: Square, to: Square, color: Color, moves: &mut MoveList) {
    if to.rank() == color.promotion_rank() {
        for promotion in PieceType::PROMOTIONS {
            moves.push(Move::new_promotion(from, to, promotion));
        }
    } else {
        moves.push(Move::new(from, to));
    }
}

fn generate_pawn_moves(state: &GameState, color: Color, moves: &mut MoveList) {
    let board = &state.board.array_board;
    let pawns = state.board.bitboards.pieces(PieceType::Pawn, color);
    let direction = color.pawn_direction();

    for from in pawns.iter() {
        let Some(to_rank) = from.rank().offset(direction) else {
            continue;
        };

        // Pushes
        let single = Square::new(from.file(), to_rank);
        if board.is_empty(single) {
            push_pawn_move(from, single, color, moves);

            if from.rank() == color.pawn_rank() {
                if let Some(double_rank) = to_rank.offset(direction) {
                    let double = Square::new(from.file(), double_rank);
                    if board.is_empty(double) {
                        moves.push(Move::new(from, double));
                    }
                }
            }
        }

        // Captures, including en passant
        for df in [-1, 1] {
            let Some(file) = from.file().offset(df) else {
                continue;
            };
            let target = Square::new(file, to_rank);
            if board.is_enemy(target, color) {
                push_pawn_move(from, target, color, moves);
            } else if state.en_passant == Some(target)
                && board.piece_at(Square::new(file, from.rank()))
                    == Some(Piece::new(PieceType::Pawn, color.opponent()))
            {
                moves.push(Move::new(from, target));
            }
        }
    }
}

/// Knights and kings: a fixed set of single steps.
fn generate_stepper_moves(
    state: &GameState,
    color: Color,
    piece_type: PieceType,
    deltas: &[(i8, i8)],
    moves: &mut MoveList,
) {
    let board = &state.board.array_board;

    for from in state.board.bitboards.pieces(piece_type, color).iter() {
        for &(df, dr) in deltas {
            if let (Some(file), Some(rank)) = (from.file().offset(df), from.rank().offset(dr)) {
                let to = Square::new(file, rank);
                if !board.is_color(to, color) {
                    moves.push(Move::new(from, to));
                }
            }
        }
    }
}

/// Bishops, rooks and queens: rays until blocked.
fn generate_slider_moves(
    state: &GameState,
    color: Color,
    piece_type: PieceType,
    directions: &[(i8, i8)],
    moves: &mut MoveList,
) {
    let board = &state.board.array_board;

    for from in state.board.bitboards.pieces(piece_type, color).iter() {
        for &(df, dr) in directions {
            let mut file = from.file();
            let mut rank = from.rank();

            while let (Some(f), Some(r)) = (file.offset(df), rank.offset(dr)) {
                file = f;
                rank = r;
                let to = Square::new(file, rank);

                if board.is_empty(to) {
                    moves.push(Move::new(from, to));
                    continue;
                }
                if board.is_enemy(to, color) {
                    moves.push(Move::new(from, to));
                }
                break;
            }
        }
    }
}

fn generate_castling_moves(state: &GameState, color: Color, moves: &mut MoveList) {
    let rights = state.castling.get(color);
    if !rights.any() {
        return;
    }

    let board = &state.board.array_board;
    let back_rank = color.back_rank();
    let king_square = Square::new(File::E, back_rank);
    if board.piece_at(king_square) != Some(Piece::new(PieceType::King, color)) {
        return;
    }

    let enemy = color.opponent();
    if state.is_attacked_by(king_square, enemy) {
        return;
    }

    let rook = Some(Piece::new(PieceType::Rook, color));
    let at = |file: File| Square::new(file, back_rank);

    if rights.kingside
        && board.piece_at(at(File::H)) == rook
        && board.is_empty(at(File::F))
        && board.is_empty(at(File::G))
        && !state.is_attacked_by(at(File::F), enemy)
        && !state.is_attacked_by(at(File::G), enemy)
    {
        moves.push(Move::new(king_square, at(File::G)));
    }

    if rights.queenside
        && board.piece_at(at(File::A)) == rook
        && board.is_empty(at(File::D))
        && board.is_empty(at(File::C))
        && board.is_empty(at(File::B))
        && !state.is_attacked_by(at(File::D), enemy)
        && !state.is_attacked_by(at(File::C), enemy)
    {
        moves.push(Move::new(king_square, at(File::C)));
    }
}

/// Checks if the current position is checkmate.
pub fn is_checkmate(state: &GameState) -> bool {
    state.is_in_check() && generate_legal_moves(state).is_empty()
}

/// Checks if the current position is stalemate.
pub fn is_stalemate(state: &GameState) -> bool {
    !state.is_in_check() && generate_legal_moves(state).is_empty()
}
