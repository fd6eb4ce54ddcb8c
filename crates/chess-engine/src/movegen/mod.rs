//! Move generation.
//!
//! Moves are produced in two layers: pseudo-legal generation by piece kind
//! on the mailbox grid, then a legality filter that plays each candidate,
//! asks whether the mover's king is attacked, and takes it back.

mod attacks;
pub mod perft;

use crate::board::{Board, Piece};
use crate::rules::{generate_castling, is_promotion_square};
use crate::Position;
use chess_core::{Color, Move, PieceId, PieceKind, Special, Square, EMPTY, OFF_BOARD};

pub use attacks::{for_each_attack, is_in_check, is_square_attacked};
pub(crate) use attacks::{offsets, pawn_capture_offsets};

/// A list of moves with a fixed maximum capacity.
///
/// Chess positions have at most 218 legal moves, so we use a fixed-size
/// array to avoid heap allocations during move generation.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; Self::MAX_MOVES],
    len: usize,
}

impl MoveList {
    /// Maximum number of moves held.
    pub const MAX_MOVES: usize = 256;

    /// Creates an empty move list.
    #[inline]
    pub const fn new() -> Self {
        MoveList {
            moves: [Move::NULL; Self::MAX_MOVES],
            len: 0,
        }
    }

    /// Adds a move to the list.
    #[inline]
    pub fn push(&mut self, m: Move) {
        debug_assert!(self.len < Self::MAX_MOVES);
        self.moves[self.len] = m;
        self.len += 1;
    }

    /// Returns the number of moves.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the list is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns a slice of the moves.
    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    /// Returns a mutable slice of the moves, for in-place ordering.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Move] {
        &mut self.moves[..self.len]
    }

    /// Clears the move list.
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Retains only moves for which the predicate returns true.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&Move) -> bool,
    {
        let mut write = 0;
        for read in 0..self.len {
            if f(&self.moves[read]) {
                self.moves[write] = self.moves[read];
                write += 1;
            }
        }
        self.len = write;
    }

    pub fn to_vec(&self) -> Vec<Move> {
        self.as_slice().to_vec()
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = Move;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        debug_assert!(index < self.len);
        &self.moves[index]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

/// Generates all legal moves for `color`.
///
/// Takes the position mutably to simulate each candidate; it is returned
/// unchanged.
pub fn legal_moves(position: &mut Position, color: Color) -> MoveList {
    let mut moves = pseudo_legal_moves(position, color);
    moves.retain(|m| leaves_king_safe(position, color, *m));
    moves
}

/// Generates the legal captures for `color`, en passant and capturing
/// promotions included.
pub fn legal_captures(position: &mut Position, color: Color) -> MoveList {
    let mut moves = pseudo_legal_moves(position, color);
    moves.retain(|m| m.is_capture() && leaves_king_safe(position, color, *m));
    moves
}

/// Returns true if `color` has at least one legal move.
pub fn has_legal_move(position: &mut Position, color: Color) -> bool {
    let moves = pseudo_legal_moves(position, color);
    moves
        .as_slice()
        .iter()
        .any(|m| leaves_king_safe(position, color, *m))
}

fn leaves_king_safe(position: &mut Position, color: Color, mv: Move) -> bool {
    let undo = position.make_move(mv);
    let safe = !is_in_check(position.board(), color);
    position.unmake_move(mv, undo);
    safe
}

/// Generates pseudo-legal moves for `color`, castling included.
///
/// En passant is only offered to the side to move, since the target square
/// belongs to the move that was just played.
pub fn pseudo_legal_moves(position: &Position, color: Color) -> MoveList {
    let board = position.board();
    let en_passant = if color == position.side_to_move {
        position.en_passant
    } else {
        None
    };

    let mut moves = MoveList::new();
    for piece in board.pieces_of(color) {
        match piece.kind {
            PieceKind::Pawn => generate_pawn_moves(board, piece, en_passant, &mut moves),
            kind if kind.is_slider() => generate_slider_moves(board, piece, &mut moves),
            _ => generate_step_moves(board, piece, &mut moves),
        }
    }
    generate_castling(board, position.castling, color, &mut moves);
    moves
}

#[inline]
fn is_enemy(cell: i8, color: Color) -> bool {
    cell != OFF_BOARD && cell * color.sign() < 0
}

fn target_id(board: &Board, square: Square) -> Option<PieceId> {
    board.piece_at(square).map(|p| p.id)
}

/// Generates pseudo-legal pawn moves.
fn generate_pawn_moves(
    board: &Board,
    pawn: &Piece,
    en_passant: Option<Square>,
    moves: &mut MoveList,
) {
    let push = pawn.color.pawn_push();
    let from = pawn.square;

    let one = from.offset(push);
    if board.cell(one) == EMPTY {
        push_pawn_move(pawn, one, None, moves);
        if from.rank() == Some(pawn.color.pawn_rank()) {
            let two = one.offset(push);
            if board.cell(two) == EMPTY {
                moves.push(Move::new(pawn.id, from, two, None, Special::DoublePawnPush));
            }
        }
    }

    for d in pawn_capture_offsets(pawn.color) {
        let target = from.offset(d);
        let cell = board.cell(target);
        if is_enemy(cell, pawn.color) {
            push_pawn_move(pawn, target, target_id(board, target), moves);
        } else if cell == EMPTY && en_passant == Some(target) {
            let captured_square = target.offset(-push);
            let victim = board
                .piece_at(captured_square)
                .filter(|p| p.kind == PieceKind::Pawn && p.color != pawn.color);
            if let Some(victim) = victim {
                moves.push(Move::new(
                    pawn.id,
                    from,
                    target,
                    Some(victim.id),
                    Special::EnPassant { captured_square },
                ));
            }
        }
    }
}

/// Pushes a pawn move, expanded into one move per promotion choice on the far rank.
fn push_pawn_move(pawn: &Piece, to: Square, captured: Option<PieceId>, moves: &mut MoveList) {
    if is_promotion_square(pawn.color, to) {
        for kind in PieceKind::PROMOTION_CHOICES {
            moves.push(Move::new(
                pawn.id,
                pawn.square,
                to,
                captured,
                Special::Promotion(kind),
            ));
        }
    } else {
        moves.push(Move::new(pawn.id, pawn.square, to, captured, Special::None));
    }
}

/// Generates knight and king steps: each offset is tried once.
fn generate_step_moves(board: &Board, piece: &Piece, moves: &mut MoveList) {
    for &d in offsets(piece.kind) {
        let to = piece.square.offset(d);
        let cell = board.cell(to);
        if cell == EMPTY {
            moves.push(Move::quiet(piece.id, piece.square, to));
        } else if is_enemy(cell, piece.color) {
            moves.push(Move::new(
                piece.id,
                piece.square,
                to,
                target_id(board, to),
                Special::None,
            ));
        }
    }
}

/// Generates bishop, rook and queen moves along each direction until blocked.
fn generate_slider_moves(board: &Board, piece: &Piece, moves: &mut MoveList) {
    for &d in offsets(piece.kind) {
        let mut to = piece.square.offset(d);
        loop {
            let cell = board.cell(to);
            if cell == EMPTY {
                moves.push(Move::quiet(piece.id, piece.square, to));
                to = to.offset(d);
                continue;
            }
            if is_enemy(cell, piece.color) {
                moves.push(Move::new(
                    piece.id,
                    piece.square,
                    to,
                    target_id(board, to),
                    Special::None,
                ));
            }
            break;
        }
    }
}
