//! Cheap static move ordering.

use crate::eval::piece_value;
use crate::Board;
use chess_core::Move;
use std::cmp::Reverse;

const CAPTURE_BONUS: i32 = 10_000;
const PROMOTION_BONUS: i32 = 900;

/// Scores a move for ordering: captures by most valuable victim then least
/// valuable attacker, promotions by the promoted piece, quiet moves zero.
pub fn move_score(board: &Board, mv: Move) -> i32 {
    let mut score = 0;
    if let Some(victim) = mv.captured() {
        let attacker = board.piece(mv.piece()).kind;
        score += CAPTURE_BONUS + 10 * piece_value(board.piece(victim).kind) - piece_value(attacker);
    }
    if let Some(kind) = mv.promotion() {
        score += PROMOTION_BONUS + piece_value(kind);
    }
    score
}

/// Sorts moves best-first. Equal scores keep their generation order.
pub fn order_moves(board: &Board, moves: &mut [Move]) {
    moves.sort_by_key(|&mv| Reverse(move_score(board, mv)));
}
