//! Piece arena and the sentinel-padded mailbox grid.
//!
//! The piece list is the source of truth. The grid is a cache of signed
//! piece values kept in step with it, so move generation can read any cell
//! in O(1) and treat the border as a wall.

use chess_core::{Color, File, PieceId, PieceKind, Rank, Square, EMPTY, OFF_BOARD};
use std::fmt;
use tracing::warn;

/// A piece in the arena. Its id is its index and never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub id: PieceId,
    pub kind: PieceKind,
    pub color: Color,
    pub square: Square,
    pub captured: bool,
    pub has_moved: bool,
}

impl Piece {
    /// Returns the grid encoding of this piece.
    #[inline]
    pub const fn signed_value(&self) -> i8 {
        self.kind.signed_value(self.color)
    }

    /// Returns the display glyph, derived from the current kind.
    #[inline]
    pub const fn symbol(&self) -> char {
        self.kind.symbol(self.color)
    }
}

/// Piece list plus the derived 120-cell grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pieces: Vec<Piece>,
    grid: [i8; Square::GRID_SIZE],
    occupant: [Option<PieceId>; Square::GRID_SIZE],
}

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

impl Board {
    /// Creates a board with no pieces.
    pub fn empty() -> Self {
        Board {
            pieces: Vec::with_capacity(32),
            grid: Self::blank_grid(),
            occupant: [None; Square::GRID_SIZE],
        }
    }

    /// Creates the standard 32-piece setup.
    ///
    /// Ids are assigned white back rank, white pawns, black pawns, black
    /// back rank, each from the a-file.
    pub fn standard() -> Self {
        let mut board = Board::empty();
        for (file, kind) in File::ALL.into_iter().zip(BACK_RANK) {
            board.add_piece(kind, Color::White, Square::new(file, Rank::R1));
        }
        for color in [Color::White, Color::Black] {
            for file in File::ALL {
                board.add_piece(
                    PieceKind::Pawn,
                    color,
                    Square::new(file, color.pawn_rank()),
                );
            }
        }
        for (file, kind) in File::ALL.into_iter().zip(BACK_RANK) {
            board.add_piece(kind, Color::Black, Square::new(file, Rank::R8));
        }
        board
    }

    fn blank_grid() -> [i8; Square::GRID_SIZE] {
        let mut grid = [OFF_BOARD; Square::GRID_SIZE];
        for sq in Square::playable() {
            grid[sq.index()] = EMPTY;
        }
        grid
    }

    /// Appends a piece to the arena and returns its id.
    ///
    /// The grid is patched only when the target cell is a free playable
    /// square; anything else is left for [`Board::synchronize`] to resolve.
    pub fn add_piece(&mut self, kind: PieceKind, color: Color, square: Square) -> PieceId {
        let id = PieceId(self.pieces.len() as u8);
        self.pieces.push(Piece {
            id,
            kind,
            color,
            square,
            captured: false,
            has_moved: false,
        });
        if square.is_on_board() && self.occupant[square.index()].is_none() {
            self.grid[square.index()] = kind.signed_value(color);
            self.occupant[square.index()] = Some(id);
        }
        id
    }

    /// Returns the raw grid cell: a signed piece value, [`EMPTY`] or [`OFF_BOARD`].
    #[inline]
    pub fn cell(&self, square: Square) -> i8 {
        self.grid[square.index()]
    }

    #[inline]
    pub fn is_empty(&self, square: Square) -> bool {
        self.cell(square) == EMPTY
    }

    /// Returns true iff the square lies inside the playable region.
    #[inline]
    pub fn is_on_board(&self, square: Square) -> bool {
        square.is_on_board()
    }

    /// Returns the live piece on `square`, if any.
    pub fn piece_at(&self, square: Square) -> Option<&Piece> {
        self.occupant[square.index()].map(|id| &self.pieces[id.index()])
    }

    /// Returns the piece with the given id, live or captured.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this board.
    #[inline]
    pub fn piece(&self, id: PieceId) -> &Piece {
        &self.pieces[id.index()]
    }

    /// Returns every piece ever placed, including captured ones.
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn live_pieces(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.iter().filter(|p| !p.captured)
    }

    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = &Piece> {
        self.live_pieces().filter(move |p| p.color == color)
    }

    /// Returns the live king of `color`.
    pub fn king(&self, color: Color) -> Option<&Piece> {
        self.pieces_of(color).find(|p| p.kind == PieceKind::King)
    }

    /// Rebuilds the grid from the piece list and returns the number of
    /// integrity faults repaired.
    ///
    /// A live piece on a border cell, or on a cell already claimed by an
    /// earlier live piece, is marked captured and reported with a warning.
    pub fn synchronize(&mut self) -> usize {
        let mut faults = 0;
        self.grid = Self::blank_grid();
        self.occupant = [None; Square::GRID_SIZE];

        for piece in self.pieces.iter_mut().filter(|p| !p.captured) {
            let index = piece.square.index();
            if !piece.square.is_on_board() || self.occupant[index].is_some() {
                warn!(
                    id = piece.id.0,
                    kind = %piece.kind,
                    color = %piece.color,
                    cell = index,
                    "piece on invalid square; marking captured"
                );
                piece.captured = true;
                faults += 1;
                continue;
            }
            self.grid[index] = piece.signed_value();
            self.occupant[index] = Some(piece.id);
        }

        faults
    }

    /// Returns true if the grid matches what [`Board::synchronize`] would build.
    pub fn is_synchronized(&self) -> bool {
        let mut rebuilt = self.clone();
        rebuilt.synchronize() == 0 && rebuilt.grid == self.grid && rebuilt.occupant == self.occupant
    }

    pub(crate) fn relocate(&mut self, id: PieceId, to: Square) {
        let from = self.pieces[id.index()].square;
        if self.occupant[from.index()] == Some(id) {
            self.grid[from.index()] = EMPTY;
            self.occupant[from.index()] = None;
        }
        let piece = &mut self.pieces[id.index()];
        piece.square = to;
        self.grid[to.index()] = piece.signed_value();
        self.occupant[to.index()] = Some(id);
    }

    pub(crate) fn capture(&mut self, id: PieceId) {
        let piece = &mut self.pieces[id.index()];
        piece.captured = true;
        let index = piece.square.index();
        if self.occupant[index] == Some(id) {
            self.grid[index] = EMPTY;
            self.occupant[index] = None;
        }
    }

    pub(crate) fn uncapture(&mut self, id: PieceId) {
        let piece = &mut self.pieces[id.index()];
        piece.captured = false;
        let index = piece.square.index();
        self.grid[index] = piece.signed_value();
        self.occupant[index] = Some(id);
    }

    pub(crate) fn set_kind(&mut self, id: PieceId, kind: PieceKind) {
        let piece = &mut self.pieces[id.index()];
        piece.kind = kind;
        if !piece.captured {
            self.grid[piece.square.index()] = piece.signed_value();
        }
    }

    pub(crate) fn set_moved(&mut self, id: PieceId, has_moved: bool) {
        self.pieces[id.index()].has_moved = has_moved;
    }

    /// Drops captured pieces and renumbers the rest in arena order.
    ///
    /// Invalidates every outstanding move and undo record.
    pub(crate) fn compact(&mut self) {
        let mut compacted = Board::empty();
        for piece in self.live_pieces() {
            let id = compacted.add_piece(piece.kind, piece.color, piece.square);
            compacted.set_moved(id, piece.has_moved);
        }
        *self = compacted;
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

/// Text diagram, rank 8 at the top, `.` for empty squares.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::ALL.iter().rev() {
            write!(f, "{} ", rank.to_char())?;
            for file in File::ALL {
                let glyph = self
                    .piece_at(Square::new(file, *rank))
                    .map_or('.', |p| p.kind.to_fen_char(p.color));
                write!(f, " {}", glyph)?;
            }
            writeln!(f)?;
        }
        write!(f, "  ")?;
        for file in File::ALL {
            write!(f, " {}", file.to_char())?;
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_setup() {
        let board = Board::standard();
        assert_eq!(board.pieces().len(), 32);
        assert_eq!(board.live_pieces().count(), 32);
        assert_eq!(board.cell(Square::E1), 6);
        assert_eq!(board.cell(Square::D8), -5);
        assert_eq!(board.cell(Square::E4), EMPTY);
        assert_eq!(board.cell(Square::BORDER), OFF_BOARD);
        assert_eq!(board.king(Color::Black).map(|k| k.square), Some(Square::E8));
        assert!(board.is_synchronized());
    }

    #[test]
    fn piece_at_lookup() {
        let board = Board::standard();
        let knight = board.piece_at(Square::G8).unwrap();
        assert_eq!(knight.kind, PieceKind::Knight);
        assert_eq!(knight.color, Color::Black);
        assert_eq!(knight.symbol(), '♞');
        assert!(board.piece_at(Square::E4).is_none());
        assert!(board.piece_at(Square::BORDER).is_none());
    }

    #[test]
    fn border_is_sentinel() {
        let board = Board::standard();
        let border = (0..120u8)
            .filter_map(Square::from_index)
            .filter(|sq| board.cell(*sq) == OFF_BOARD)
            .count();
        assert_eq!(border, 120 - 64);
        assert!(!board.is_on_board(Square::BORDER));
        assert!(board.is_on_board(Square::A1));
    }

    #[test]
    fn synchronize_is_idempotent() {
        let mut board = Board::standard();
        let before = board.clone();
        assert_eq!(board.synchronize(), 0);
        assert_eq!(board.synchronize(), 0);
        assert_eq!(board, before);
    }

    #[test]
    fn off_board_piece_is_captured() {
        let mut board = Board::empty();
        board.add_piece(PieceKind::King, Color::White, Square::E1);
        let stray = board.add_piece(
            PieceKind::Rook,
            Color::Black,
            Square::from_index(9).unwrap(),
        );
        assert_eq!(board.synchronize(), 1);
        assert!(board.piece(stray).captured);
        assert_eq!(board.live_pieces().count(), 1);
        assert!(board.is_synchronized());
    }

    #[test]
    fn compact_renumbers_live_pieces() {
        let mut board = Board::standard();
        let pawn = board.piece_at(Square::E2).unwrap().id;
        board.capture(pawn);
        board.compact();
        assert_eq!(board.pieces().len(), 31);
        assert!(board.pieces().iter().enumerate().all(|(i, p)| p.id.index() == i));
        assert!(board.is_synchronized());
        assert!(board.is_empty(Square::E2));
        assert_eq!(board.piece_at(Square::E1).map(|p| p.kind), Some(PieceKind::King));
    }

    #[test]
    fn doubled_square_is_captured() {
        let mut board = Board::empty();
        board.add_piece(PieceKind::Queen, Color::White, Square::D4);
        let second = board.add_piece(PieceKind::Knight, Color::Black, Square::D4);
        assert_eq!(board.synchronize(), 1);
        assert!(board.piece(second).captured);
        assert_eq!(board.cell(Square::D4), 5);
    }

    #[test]
    fn incremental_patches_keep_grid_in_step() {
        let mut board = Board::standard();
        let pawn = board.piece_at(Square::from_algebraic("e2").unwrap()).unwrap().id;
        board.relocate(pawn, Square::E4);
        assert_eq!(board.cell(Square::E4), 1);
        assert!(board.is_synchronized());

        let queen = board.piece_at(Square::D8).unwrap().id;
        board.capture(queen);
        assert!(board.is_empty(Square::D8));
        assert!(board.is_synchronized());

        board.uncapture(queen);
        assert_eq!(board.cell(Square::D8), -5);

        board.set_kind(pawn, PieceKind::Queen);
        assert_eq!(board.cell(Square::E4), 5);
        assert_eq!(board.piece(pawn).symbol(), '♕');
        assert!(board.is_synchronized());
    }

    #[test]
    fn diagram() {
        let text = Board::standard().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "8  r n b q k b n r");
        assert_eq!(lines[4], "4  . . . . . . . .");
        assert_eq!(lines[7], "1  R N B Q K B N R");
        assert_eq!(lines[8], "   a b c d e f g h");
    }
}
