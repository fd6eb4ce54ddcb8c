//! Special-move rules and game termination.
//!
//! Castling eligibility and rights live in [`castling`]. This module adds
//! terminal-state classification and the small promotion and en passant
//! helpers shared by move generation and the game facade.

mod castling;

pub use castling::{generate_castling, CastlingPath, CastlingRights};

use crate::movegen::{has_legal_move, is_in_check};
use crate::Position;
use chess_core::{Color, Move, PieceKind, Special, Square};

/// Where the game stands for the side to move.
///
/// Checkmate and stalemate are separate variants, so at most one of them
/// can ever hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameStatus {
    #[default]
    Ongoing,
    /// The side to move is in check and has no legal move.
    Checkmate,
    /// The side to move is not in check and has no legal move.
    Stalemate,
}

impl GameStatus {
    #[inline]
    pub const fn is_over(self) -> bool {
        !matches!(self, GameStatus::Ongoing)
    }
}

/// Result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    /// White wins by checkmate.
    WhiteWins,
    /// Black wins by checkmate.
    BlackWins,
    /// Drawn by stalemate.
    Draw,
}

impl GameResult {
    /// Derives the result from a status and the side that is to move in it.
    pub const fn from_status(status: GameStatus, side_to_move: Color) -> Option<Self> {
        match status {
            GameStatus::Ongoing => None,
            GameStatus::Stalemate => Some(GameResult::Draw),
            GameStatus::Checkmate => Some(match side_to_move {
                Color::White => GameResult::BlackWins,
                Color::Black => GameResult::WhiteWins,
            }),
        }
    }
}

/// Classifies the position for its side to move.
pub fn status(position: &mut Position) -> GameStatus {
    let color = position.side_to_move;
    if has_legal_move(position, color) {
        GameStatus::Ongoing
    } else if is_in_check(position.board(), color) {
        GameStatus::Checkmate
    } else {
        GameStatus::Stalemate
    }
}

/// Returns true if a `color` pawn arriving on `square` must promote.
#[inline]
pub fn is_promotion_square(color: Color, square: Square) -> bool {
    square.rank() == Some(color.promotion_rank())
}

/// Returns the en passant target a move creates, if any.
pub fn en_passant_target(mv: Move, color: Color) -> Option<Square> {
    match mv.special() {
        Special::DoublePawnPush => Some(mv.from().offset(color.pawn_push())),
        _ => None,
    }
}

/// Returns true if `kind` is a legal promotion choice.
#[inline]
pub fn is_promotion_choice(kind: PieceKind) -> bool {
    PieceKind::PROMOTION_CHOICES.contains(&kind)
}
