//! Board square representation.

use std::fmt;

/// A file (column) on the chess board, from A to H.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum File {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    E = 4,
    F = 5,
    G = 6,
    H = 7,
}

impl File {
    /// All files in order.
    pub const ALL: [File; 8] = [
        File::A,
        File::B,
        File::C,
        File::D,
        File::E,
        File::F,
        File::G,
        File::H,
    ];

    /// Creates a file from index (0-7).
    #[inline]
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(File::A),
            1 => Some(File::B),
            2 => Some(File::C),
            3 => Some(File::D),
            4 => Some(File::E),
            5 => Some(File::F),
            6 => Some(File::G),
            7 => Some(File::H),
            _ => None,
        }
    }

    /// Creates a file from a character ('a'-'h' or 'A'-'H').
    #[inline]
    pub const fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'a' => Some(File::A),
            'b' => Some(File::B),
            'c' => Some(File::C),
            'd' => Some(File::D),
            'e' => Some(File::E),
            'f' => Some(File::F),
            'g' => Some(File::G),
            'h' => Some(File::H),
            _ => None,
        }
    }

    /// Returns the index (0-7).
    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Returns the character representation.
    #[inline]
    pub const fn to_char(self) -> char {
        (b'a' + self as u8) as char
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// A rank (row) on the chess board, from 1 to 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Rank {
    R1 = 0,
    R2 = 1,
    R3 = 2,
    R4 = 3,
    R5 = 4,
    R6 = 5,
    R7 = 6,
    R8 = 7,
}

impl Rank {
    /// All ranks in order.
    pub const ALL: [Rank; 8] = [
        Rank::R1,
        Rank::R2,
        Rank::R3,
        Rank::R4,
        Rank::R5,
        Rank::R6,
        Rank::R7,
        Rank::R8,
    ];

    /// Creates a rank from index (0-7).
    #[inline]
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Rank::R1),
            1 => Some(Rank::R2),
            2 => Some(Rank::R3),
            3 => Some(Rank::R4),
            4 => Some(Rank::R5),
            5 => Some(Rank::R6),
            6 => Some(Rank::R7),
            7 => Some(Rank::R8),
            _ => None,
        }
    }

    /// Creates a rank from a character ('1'-'8').
    #[inline]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '1' => Some(Rank::R1),
            '2' => Some(Rank::R2),
            '3' => Some(Rank::R3),
            '4' => Some(Rank::R4),
            '5' => Some(Rank::R5),
            '6' => Some(Rank::R6),
            '7' => Some(Rank::R7),
            '8' => Some(Rank::R8),
            _ => None,
        }
    }

    /// Returns the index (0-7).
    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Returns the character representation.
    #[inline]
    pub const fn to_char(self) -> char {
        (b'1' + self as u8) as char
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// A cell of the 10x12 mailbox grid, indexed 0-119.
///
/// The playable 8x8 board sits inside a two-cell border above and below
/// and a one-cell border left and right, so any piece offset applied to a
/// playable square stays within the grid:
/// - a1 = 21, b1 = 22, ..., h1 = 28
/// - a2 = 31, ..., h8 = 98
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    /// Number of cells in the padded grid.
    pub const GRID_SIZE: usize = 120;

    /// Creates a playable square from file and rank.
    #[inline]
    pub const fn new(file: File, rank: Rank) -> Self {
        Square((rank.index() + 2) * 10 + file.index() + 1)
    }

    /// Creates a square from a grid index (0-119). The result may lie on the border.
    #[inline]
    pub const fn from_index(index: u8) -> Option<Self> {
        if (index as usize) < Self::GRID_SIZE {
            Some(Square(index))
        } else {
            None
        }
    }

    /// Parses a square from algebraic notation (e.g., "e4").
    pub const fn from_algebraic(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let file = match File::from_char(bytes[0] as char) {
            Some(f) => f,
            None => return None,
        };
        let rank = match Rank::from_char(bytes[1] as char) {
            Some(r) => r,
            None => return None,
        };
        Some(Square::new(file, rank))
    }

    /// Returns the grid index (0-119).
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns true iff the square lies inside the playable 8x8 region.
    #[inline]
    pub const fn is_on_board(self) -> bool {
        let rank = self.0 / 10;
        let file = self.0 % 10;
        rank >= 2 && rank <= 9 && file >= 1 && file <= 8
    }

    /// Returns the file of this square, or `None` on the border.
    #[inline]
    pub const fn file(self) -> Option<File> {
        if !self.is_on_board() {
            return None;
        }
        File::from_index(self.0 % 10 - 1)
    }

    /// Returns the rank of this square, or `None` on the border.
    #[inline]
    pub const fn rank(self) -> Option<Rank> {
        if !self.is_on_board() {
            return None;
        }
        Rank::from_index(self.0 / 10 - 2)
    }

    /// Returns the square `delta` cells away.
    ///
    /// Offsets from a playable square never leave the grid; the wrap only
    /// keeps the function total for border origins.
    #[inline]
    pub const fn offset(self, delta: i8) -> Square {
        Square((self.0 as i16 + delta as i16).rem_euclid(Self::GRID_SIZE as i16) as u8)
    }

    /// Returns the 0-63 index (a1 = 0, h8 = 63) used by 8x8 tables.
    #[inline]
    pub const fn board_index(self) -> Option<usize> {
        match (self.file(), self.rank()) {
            (Some(file), Some(rank)) => Some(rank.index() as usize * 8 + file.index() as usize),
            _ => None,
        }
    }

    /// Returns the algebraic notation for this square, or "??" on the border.
    pub fn to_algebraic(self) -> String {
        match (self.file(), self.rank()) {
            (Some(file), Some(rank)) => format!("{}{}", file, rank),
            _ => "??".to_string(),
        }
    }

    /// Iterates over the 64 playable squares from a1 to h8.
    pub fn playable() -> impl Iterator<Item = Square> {
        Rank::ALL
            .into_iter()
            .flat_map(|rank| File::ALL.into_iter().map(move |file| Square::new(file, rank)))
    }

    /// Border cell used as a placeholder where no real square applies.
    pub const BORDER: Square = Square(0);

    // Common squares
    pub const A1: Square = Square(21);
    pub const B1: Square = Square(22);
    pub const C1: Square = Square(23);
    pub const D1: Square = Square(24);
    pub const E1: Square = Square(25);
    pub const F1: Square = Square(26);
    pub const G1: Square = Square(27);
    pub const H1: Square = Square(28);
    pub const E2: Square = Square(35);
    pub const C3: Square = Square(43);
    pub const F3: Square = Square(46);
    pub const D4: Square = Square(54);
    pub const E4: Square = Square(55);
    pub const D5: Square = Square(64);
    pub const E5: Square = Square(65);
    pub const C6: Square = Square(73);
    pub const F6: Square = Square(76);
    pub const E7: Square = Square(85);
    pub const A8: Square = Square(91);
    pub const B8: Square = Square(92);
    pub const C8: Square = Square(93);
    pub const D8: Square = Square(94);
    pub const E8: Square = Square(95);
    pub const F8: Square = Square(96);
    pub const G8: Square = Square(97);
    pub const H8: Square = Square(98);
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Square({})", self.to_algebraic())
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_algebraic())
    }
}
