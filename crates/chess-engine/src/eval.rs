//! Static position evaluation.
//!
//! Scores are in centipawns from White's perspective. Terms are summed in
//! tenths of a centipawn so the fractional weights stay exact until the
//! final division.

use crate::movegen::for_each_attack;
use crate::rules::GameStatus;
use crate::{Board, Position};
use chess_core::{Color, PieceKind, Square};
use serde::{Deserialize, Serialize};

/// Score of a checkmated position, before depth adjustment.
pub const MATE_SCORE: i32 = 1_000_000;

/// Which secondary evaluation terms are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalTerms {
    /// Piece-square tables.
    pub piece_squares: bool,
    /// Bonus for knights and bishops off their home rank.
    pub development: bool,
    /// Occupation and attack of d4, e4, d5 and e5.
    pub center_control: bool,
    /// Penalty for files holding more than one pawn of a color.
    pub doubled_pawns: bool,
}

impl Default for EvalTerms {
    fn default() -> Self {
        EvalTerms {
            piece_squares: true,
            development: true,
            center_control: true,
            doubled_pawns: true,
        }
    }
}

impl EvalTerms {
    /// Material only.
    pub const MATERIAL_ONLY: EvalTerms = EvalTerms {
        piece_squares: false,
        development: false,
        center_control: false,
        doubled_pawns: false,
    };
}

/// Returns the base value of a piece kind in centipawns.
#[inline]
pub const fn piece_value(kind: PieceKind) -> i32 {
    match kind {
        PieceKind::Pawn => 100,
        PieceKind::Knight => 320,
        PieceKind::Bishop => 330,
        PieceKind::Rook => 500,
        PieceKind::Queen => 900,
        PieceKind::King => 20_000,
    }
}

// Weights in tenths.
const MATERIAL_WEIGHT: i32 = 10;
const PIECE_SQUARE_WEIGHT: i32 = 1;
const DEVELOPMENT_WEIGHT: i32 = 20;
const CENTER_WEIGHT: i32 = 15;
const DOUBLED_PAWN_WEIGHT: i32 = 5;

const DEVELOPMENT_BONUS: i32 = 20;
const DOUBLED_PAWN_PENALTY: i32 = -20;

const CENTER: [Square; 4] = [Square::D4, Square::E4, Square::D5, Square::E5];

/// Bonus for standing on a centre square, indexed by kind.
const CENTER_OCCUPATION: [i32; 6] = [5, 16, 16, 25, 45, 0];

/// Bonus per attack on a centre square, indexed by kind.
const CENTER_ATTACK: [i32; 6] = [2, 6, 6, 10, 18, 0];

/// Piece-square tables, written as seen from White with rank 8 on top.
#[rustfmt::skip]
const PIECE_SQUARE_TABLES: [[i32; 64]; 6] = [
    // Pawn
    [
          0,   0,   0,   0,   0,   0,   0,   0,
         50,  50,  50,  50,  50,  50,  50,  50,
         10,  10,  20,  30,  30,  20,  10,  10,
          5,   5,  10,  25,  25,  10,   5,   5,
          0,   0,   0,  20,  20,   0,   0,   0,
          5,  -5, -10,   0,   0, -10,  -5,   5,
          5,  10,  10, -20, -20,  10,  10,   5,
          0,   0,   0,   0,   0,   0,   0,   0,
    ],
    // Knight
    [
        -50, -40, -30, -30, -30, -30, -40, -50,
        -40, -20,   0,   0,   0,   0, -20, -40,
        -30,   0,  10,  15,  15,  10,   0, -30,
        -30,   5,  15,  20,  20,  15,   5, -30,
        -30,   0,  15,  20,  20,  15,   0, -30,
        -30,   5,  10,  15,  15,  10,   5, -30,
        -40, -20,   0,   5,   5,   0, -20, -40,
        -50, -40, -30, -30, -30, -30, -40, -50,
    ],
    // Bishop
    [
        -20, -10, -10, -10, -10, -10, -10, -20,
        -10,   0,   0,   0,   0,   0,   0, -10,
        -10,   0,   5,  10,  10,   5,   0, -10,
        -10,   5,   5,  10,  10,   5,   5, -10,
        -10,   0,  10,  10,  10,  10,   0, -10,
        -10,  10,  10,  10,  10,  10,  10, -10,
        -10,   5,   0,   0,   0,   0,   5, -10,
        -20, -10, -10, -10, -10, -10, -10, -20,
    ],
    // Rook
    [
          0,   0,   0,   0,   0,   0,   0,   0,
          5,  10,  10,  10,  10,  10,  10,   5,
         -5,   0,   0,   0,   0,   0,   0,  -5,
         -5,   0,   0,   0,   0,   0,   0,  -5,
         -5,   0,   0,   0,   0,   0,   0,  -5,
         -5,   0,   0,   0,   0,   0,   0,  -5,
         -5,   0,   0,   0,   0,   0,   0,  -5,
          0,   0,   0,   5,   5,   0,   0,   0,
    ],
    // Queen
    [
        -20, -10, -10,  -5,  -5, -10, -10, -20,
        -10,   0,   0,   0,   0,   0,   0, -10,
        -10,   0,   5,   5,   5,   5,   0, -10,
         -5,   0,   5,   5,   5,   5,   0,  -5,
          0,   0,   5,   5,   5,   5,   0,  -5,
        -10,   5,   5,   5,   5,   5,   0, -10,
        -10,   0,   5,   0,   0,   0,   0, -10,
        -20, -10, -10,  -5,  -5, -10, -10, -20,
    ],
    // King
    [
        -30, -40, -40, -50, -50, -40, -40, -30,
        -30, -40, -40, -50, -50, -40, -40, -30,
        -30, -40, -40, -50, -50, -40, -40, -30,
        -30, -40, -40, -50, -50, -40, -40, -30,
        -20, -30, -30, -40, -40, -30, -30, -20,
        -10, -20, -20, -20, -20, -20, -20, -10,
         20,  20,   0,   0,   0,   0,  20,  20,
         20,  30,  10,   0,   0,  10,  30,  20,
    ],
];

/// Looks up the table entry for a piece, mirrored so that row 0 is always
/// the owner's far rank.
fn piece_square(kind: PieceKind, color: Color, square: Square) -> i32 {
    let Some(index) = square.board_index() else {
        return 0;
    };
    let (rank, file) = (index / 8, index % 8);
    let row = match color {
        Color::White => 7 - rank,
        Color::Black => rank,
    };
    PIECE_SQUARE_TABLES[kind.index()][row * 8 + file]
}

/// Evaluates a position, shortcutting terminal states.
///
/// Checkmate scores [`MATE_SCORE`] in favour of the side not to move;
/// stalemate scores zero.
pub fn evaluate_status(position: &Position, status: GameStatus, terms: &EvalTerms) -> i32 {
    match status {
        GameStatus::Checkmate => -i32::from(position.side_to_move.sign()) * MATE_SCORE,
        GameStatus::Stalemate => 0,
        GameStatus::Ongoing => evaluate(position.board(), terms),
    }
}

/// Static evaluation of a non-terminal board from White's perspective.
pub fn evaluate(board: &Board, terms: &EvalTerms) -> i32 {
    let mut material = 0;
    let mut piece_squares = 0;
    let mut development = 0;

    for piece in board.live_pieces() {
        let sign = i32::from(piece.color.sign());
        material += sign * piece_value(piece.kind);
        if terms.piece_squares {
            piece_squares += sign * piece_square(piece.kind, piece.color, piece.square);
        }
        if terms.development
            && matches!(piece.kind, PieceKind::Knight | PieceKind::Bishop)
            && piece.square.rank() != Some(piece.color.back_rank())
        {
            development += sign * DEVELOPMENT_BONUS;
        }
    }

    let center = if terms.center_control {
        center_control(board)
    } else {
        0
    };
    let doubled = if terms.doubled_pawns {
        doubled_pawns(board)
    } else {
        0
    };

    let tenths = MATERIAL_WEIGHT * material
        + PIECE_SQUARE_WEIGHT * piece_squares
        + DEVELOPMENT_WEIGHT * development
        + CENTER_WEIGHT * center
        + DOUBLED_PAWN_WEIGHT * doubled;
    tenths / 10
}

/// Evaluates from the point of view of the side to move.
#[inline]
pub fn evaluate_relative(position: &Position, terms: &EvalTerms) -> i32 {
    i32::from(position.side_to_move.sign()) * evaluate(position.board(), terms)
}

fn center_control(board: &Board) -> i32 {
    let mut score = 0;
    for piece in board.live_pieces() {
        let sign = i32::from(piece.color.sign());
        if CENTER.contains(&piece.square) {
            score += sign * CENTER_OCCUPATION[piece.kind.index()];
        }
        let per_attack = CENTER_ATTACK[piece.kind.index()];
        if per_attack == 0 {
            continue;
        }
        for_each_attack(board, piece, |target| {
            if CENTER.contains(&target) {
                score += sign * per_attack;
            }
        });
    }
    score
}

fn doubled_pawns(board: &Board) -> i32 {
    let mut counts = [[0u8; 8]; 2];
    for pawn in board
        .live_pieces()
        .filter(|p| p.kind == PieceKind::Pawn)
    {
        if let Some(file) = pawn.square.file() {
            counts[pawn.color.index()][file.index() as usize] += 1;
        }
    }
    let mut score = 0;
    for color in Color::ALL {
        let files = counts[color.index()].iter().filter(|&&n| n > 1).count() as i32;
        score += i32::from(color.sign()) * DOUBLED_PAWN_PENALTY * files;
    }
    score
}
