//! Move representation.

use crate::{PieceKind, Square};
use std::fmt;

/// Stable identifier of a piece within a position's piece arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(pub u8);

impl PieceId {
    /// Returns the arena index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Side of the board a castling move happens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Wing {
    Kingside = 0,
    Queenside = 1,
}

impl Wing {
    /// Both wings, kingside first.
    pub const ALL: [Wing; 2] = [Wing::Kingside, Wing::Queenside];
}

/// What a move does beyond relocating one piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Special {
    /// Plain move or capture.
    None,
    /// Pawn double push from its starting rank; sets the en passant target.
    DoublePawnPush,
    /// Castling, carrying the paired rook move.
    Castling {
        wing: Wing,
        rook: PieceId,
        rook_from: Square,
        rook_to: Square,
    },
    /// En passant capture; the captured pawn stands beside the destination.
    EnPassant { captured_square: Square },
    /// Pawn promotion to the given kind. May also capture.
    Promotion(PieceKind),
}

/// A chess move.
///
/// Carries everything needed to replay or reverse it without consulting
/// the board: the moving piece, both squares, the captured piece (if any)
/// and the special effect.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    piece: PieceId,
    from: Square,
    to: Square,
    captured: Option<PieceId>,
    special: Special,
}

impl Move {
    /// Creates a new move.
    #[inline]
    pub const fn new(
        piece: PieceId,
        from: Square,
        to: Square,
        captured: Option<PieceId>,
        special: Special,
    ) -> Self {
        Move {
            piece,
            from,
            to,
            captured,
            special,
        }
    }

    /// Creates a quiet move with no special effect.
    #[inline]
    pub const fn quiet(piece: PieceId, from: Square, to: Square) -> Self {
        Self::new(piece, from, to, None, Special::None)
    }

    /// Returns the id of the moving piece.
    #[inline]
    pub const fn piece(self) -> PieceId {
        self.piece
    }

    /// Returns the source square.
    #[inline]
    pub const fn from(self) -> Square {
        self.from
    }

    /// Returns the destination square.
    #[inline]
    pub const fn to(self) -> Square {
        self.to
    }

    /// Returns the id of the captured piece, if any.
    #[inline]
    pub const fn captured(self) -> Option<PieceId> {
        self.captured
    }

    /// Returns the special effect.
    #[inline]
    pub const fn special(self) -> Special {
        self.special
    }

    #[inline]
    pub const fn is_capture(self) -> bool {
        self.captured.is_some()
    }

    /// Returns the promotion kind if this is a promotion.
    #[inline]
    pub const fn promotion(self) -> Option<PieceKind> {
        match self.special {
            Special::Promotion(kind) => Some(kind),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_castling(self) -> bool {
        matches!(self.special, Special::Castling { .. })
    }

    /// Returns the coordinate notation for this move (e.g., "e2e4", "e7e8q").
    pub fn to_uci(self) -> String {
        let promo = match self.promotion() {
            Some(PieceKind::Knight) => "n",
            Some(PieceKind::Bishop) => "b",
            Some(PieceKind::Rook) => "r",
            Some(PieceKind::Queen) => "q",
            _ => "",
        };
        format!("{}{}{}", self.from, self.to, promo)
    }

    /// A null move (used as placeholder, not a legal move).
    pub const NULL: Move = Move::quiet(PieceId(u8::MAX), Square::BORDER, Square::BORDER);
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({})", self.to_uci())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}

/// A move written in coordinate notation, not yet matched against a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl CoordinateMove {
    /// Parses "e2e4" or "e7e8q". The promotion suffix is case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        if !s.is_ascii() || s.len() < 4 || s.len() > 5 {
            return None;
        }
        let from = Square::from_algebraic(&s[0..2])?;
        let to = Square::from_algebraic(&s[2..4])?;
        let promotion = match s[4..].chars().next() {
            Some(c) => Some(PieceKind::from_promotion_char(c.to_ascii_lowercase())?),
            None => None,
        };
        Some(CoordinateMove {
            from,
            to,
            promotion,
        })
    }

    /// Returns true if `mv` is the move this notation describes.
    pub fn matches(&self, mv: Move) -> bool {
        mv.from() == self.from && mv.to() == self.to && mv.promotion() == self.promotion
    }
}
