//! Stock early-game moves that skip the full search.

use crate::Board;
use chess_core::{Move, PieceKind, Square};

/// Number of plies, counted from the start of the game, the heuristic covers.
pub const OPENING_PLIES: usize = 8;

const CENTER: [Square; 4] = [Square::D4, Square::E4, Square::D5, Square::E5];
const KNIGHT_SQUARES: [Square; 4] = [Square::C3, Square::F3, Square::C6, Square::F6];

/// Picks a central pawn advance, or failing that a knight development,
/// from `moves` while fewer than [`OPENING_PLIES`] plies have been played.
pub fn opening_move(board: &Board, moves: &[Move], plies_played: usize) -> Option<Move> {
    if plies_played >= OPENING_PLIES {
        return None;
    }
    let first = |kind: PieceKind, targets: &[Square]| {
        moves
            .iter()
            .copied()
            .find(|m| board.piece(m.piece()).kind == kind && targets.contains(&m.to()))
    };
    first(PieceKind::Pawn, &CENTER).or_else(|| first(PieceKind::Knight, &KNIGHT_SQUARES))
}
