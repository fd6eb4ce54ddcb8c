//! FEN (Forsyth-Edwards Notation) parsing and serialization.

use crate::{Color, File, PieceKind, Rank, Square, Wing};
use std::fmt;
use thiserror::Error;

/// Errors that can occur when parsing FEN strings.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FenError {
    #[error("invalid FEN: expected 4 or 6 parts, got {0}")]
    InvalidPartCount(usize),

    #[error("invalid piece placement: {0}")]
    InvalidPiecePlacement(String),

    #[error("invalid active color: expected 'w' or 'b', got '{0}'")]
    InvalidActiveColor(String),

    #[error("invalid castling rights: {0}")]
    InvalidCastlingRights(String),

    #[error("invalid en passant square: {0}")]
    InvalidEnPassantSquare(String),

    #[error("invalid halfmove clock: {0}")]
    InvalidHalfmoveClock(String),

    #[error("invalid fullmove number: {0}")]
    InvalidFullmoveNumber(String),

    #[error("{color} must have exactly one king, found {count}")]
    InvalidKingCount { color: Color, count: usize },
}

/// A decoded FEN record.
///
/// Placement is listed in FEN order, rank 8 down to rank 1 and a-file
/// first within a rank. The engine turns this into its own piece arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fen {
    pub placement: Vec<(Square, PieceKind, Color)>,
    pub side_to_move: Color,
    /// Castling availability in "KQkq" order.
    pub castling: Vec<(Color, Wing)>,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

impl Fen {
    /// The standard starting position FEN.
    pub const STARTPOS: &'static str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    /// Parses a FEN string. The two clock fields may be omitted.
    pub fn parse(fen: &str) -> Result<Self, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();

        if parts.len() != 4 && parts.len() != 6 {
            return Err(FenError::InvalidPartCount(parts.len()));
        }

        let placement = Self::parse_placement(parts[0])?;
        for color in Color::ALL {
            let count = placement
                .iter()
                .filter(|(_, kind, c)| *kind == PieceKind::King && *c == color)
                .count();
            if count != 1 {
                return Err(FenError::InvalidKingCount { color, count });
            }
        }

        let side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidActiveColor(other.to_string())),
        };

        let castling = Self::parse_castling(parts[2])?;
        let en_passant = Self::parse_en_passant(parts[3])?;

        let (halfmove_clock, fullmove_number) = if parts.len() == 6 {
            let halfmove = parts[4]
                .parse::<u32>()
                .map_err(|_| FenError::InvalidHalfmoveClock(parts[4].to_string()))?;
            let fullmove = parts[5]
                .parse::<u32>()
                .map_err(|_| FenError::InvalidFullmoveNumber(parts[5].to_string()))?;
            (halfmove, fullmove)
        } else {
            (0, 1)
        };

        Ok(Fen {
            placement,
            side_to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        })
    }

    fn parse_placement(placement: &str) -> Result<Vec<(Square, PieceKind, Color)>, FenError> {
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::InvalidPiecePlacement(format!(
                "expected 8 ranks, got {}",
                ranks.len()
            )));
        }

        let mut pieces = Vec::with_capacity(32);
        for (i, text) in ranks.iter().enumerate() {
            let rank_number = 8 - i;
            let rank = Rank::from_index(7 - i as u8).ok_or_else(|| {
                FenError::InvalidPiecePlacement(format!("rank {} out of range", rank_number))
            })?;
            let mut file_index: u32 = 0;
            for c in text.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file_index += skip;
                    continue;
                }
                let (kind, color) = PieceKind::from_fen_char(c).ok_or_else(|| {
                    FenError::InvalidPiecePlacement(format!(
                        "invalid character '{}' in rank {}",
                        c, rank_number
                    ))
                })?;
                let file = File::from_index(file_index as u8)
                    .filter(|_| file_index < 8)
                    .ok_or_else(|| {
                        FenError::InvalidPiecePlacement(format!(
                            "rank {} has more than 8 squares",
                            rank_number
                        ))
                    })?;
                pieces.push((Square::new(file, rank), kind, color));
                file_index += 1;
            }
            if file_index != 8 {
                return Err(FenError::InvalidPiecePlacement(format!(
                    "rank {} has {} squares, expected 8",
                    rank_number, file_index
                )));
            }
        }

        Ok(pieces)
    }

    fn parse_castling(castling: &str) -> Result<Vec<(Color, Wing)>, FenError> {
        if castling == "-" {
            return Ok(Vec::new());
        }

        let mut rights = Vec::with_capacity(4);
        for c in castling.chars() {
            let right = match c {
                'K' => (Color::White, Wing::Kingside),
                'Q' => (Color::White, Wing::Queenside),
                'k' => (Color::Black, Wing::Kingside),
                'q' => (Color::Black, Wing::Queenside),
                _ => {
                    return Err(FenError::InvalidCastlingRights(format!(
                        "invalid character '{}'",
                        c
                    )))
                }
            };
            if rights.contains(&right) {
                return Err(FenError::InvalidCastlingRights(format!(
                    "duplicate '{}'",
                    c
                )));
            }
            rights.push(right);
        }

        Ok(rights)
    }

    fn parse_en_passant(ep: &str) -> Result<Option<Square>, FenError> {
        if ep == "-" {
            return Ok(None);
        }

        match Square::from_algebraic(ep) {
            Some(sq) if matches!(sq.rank(), Some(Rank::R3) | Some(Rank::R6)) => Ok(Some(sq)),
            _ => Err(FenError::InvalidEnPassantSquare(ep.to_string())),
        }
    }

    fn placement_string(&self) -> String {
        let mut cells: [Option<char>; 64] = [None; 64];
        for &(square, kind, color) in &self.placement {
            if let Some(index) = square.board_index() {
                cells[index] = Some(kind.to_fen_char(color));
            }
        }

        let mut out = String::with_capacity(72);
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match cells[rank * 8 + file] {
                    Some(c) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        out.push(c);
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
            if rank > 0 {
                out.push('/');
            }
        }
        out
    }

    fn castling_string(&self) -> String {
        let order = [
            (Color::White, Wing::Kingside, 'K'),
            (Color::White, Wing::Queenside, 'Q'),
            (Color::Black, Wing::Kingside, 'k'),
            (Color::Black, Wing::Queenside, 'q'),
        ];
        let text: String = order
            .iter()
            .filter(|(color, wing, _)| self.castling.contains(&(*color, *wing)))
            .map(|(_, _, c)| *c)
            .collect();
        if text.is_empty() {
            "-".to_string()
        } else {
            text
        }
    }
}

impl fmt::Display for Fen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        };
        let ep = self
            .en_passant
            .map(|sq| sq.to_algebraic())
            .unwrap_or_else(|| "-".to_string());
        write!(
            f,
            "{} {} {} {} {} {}",
            self.placement_string(),
            side,
            self.castling_string(),
            ep,
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BARE_KINGS: &str = "4k3/8/8/8/8/8/8/4K3";

    #[test]
    fn parse_startpos() {
        let fen = Fen::parse(Fen::STARTPOS).unwrap();
        assert_eq!(fen.side_to_move, Color::White);
        assert_eq!(fen.placement.len(), 32);
        assert_eq!(fen.castling.len(), 4);
        assert_eq!(fen.en_passant, None);
        assert_eq!(fen.halfmove_clock, 0);
        assert_eq!(fen.fullmove_number, 1);
        assert_eq!(
            fen.placement[0],
            (Square::A8, PieceKind::Rook, Color::Black)
        );
        assert_eq!(
            fen.placement[31],
            (Square::H1, PieceKind::Rook, Color::White)
        );
    }

    #[test]
    fn parse_custom_position() {
        let fen = Fen::parse("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3")
            .unwrap();
        assert_eq!(fen.side_to_move, Color::White);
        assert_eq!(fen.halfmove_clock, 2);
        assert_eq!(fen.fullmove_number, 3);
        assert!(fen
            .placement
            .contains(&(Square::F3, PieceKind::Knight, Color::White)));
        assert!(fen
            .placement
            .contains(&(Square::C6, PieceKind::Knight, Color::Black)));
    }

    #[test]
    fn clocks_are_optional() {
        let fen = Fen::parse(&format!("{} b - -", BARE_KINGS)).unwrap();
        assert_eq!(fen.side_to_move, Color::Black);
        assert_eq!(fen.halfmove_clock, 0);
        assert_eq!(fen.fullmove_number, 1);
    }

    #[test]
    fn roundtrip() {
        for original in [
            Fen::STARTPOS,
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "4k3/8/8/8/8/8/8/4K3 w Kq - 12 40",
        ] {
            assert_eq!(Fen::parse(original).unwrap().to_string(), original);
        }
    }

    #[test]
    fn invalid_fen() {
        assert!(matches!(
            Fen::parse("invalid"),
            Err(FenError::InvalidPartCount(1))
        ));
        assert!(matches!(
            Fen::parse(&format!("{} x KQkq - 0 1", BARE_KINGS)),
            Err(FenError::InvalidActiveColor(_))
        ));
    }

    #[test]
    fn invalid_piece_placement() {
        // Too few ranks
        assert!(matches!(
            Fen::parse("8/8/8/8/8/8/8 w KQkq - 0 1"),
            Err(FenError::InvalidPiecePlacement(_))
        ));
        // Invalid character
        assert!(matches!(
            Fen::parse("rnbqkbnr/pppppppp/8/8/8/8/PPPPXPPP/RNBQKBNR w KQkq - 0 1"),
            Err(FenError::InvalidPiecePlacement(_))
        ));
        // Nine squares in a rank
        assert!(matches!(
            Fen::parse("rnbqkbnrr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            Err(FenError::InvalidPiecePlacement(_))
        ));
        assert!(matches!(
            Fen::parse("4k3/8/8/8/8/8/8/4K4 w - - 0 1"),
            Err(FenError::InvalidPiecePlacement(_))
        ));
    }

    #[test]
    fn king_count_enforced() {
        assert_eq!(
            Fen::parse("8/8/8/8/8/8/8/4K3 w - - 0 1"),
            Err(FenError::InvalidKingCount {
                color: Color::Black,
                count: 0
            })
        );
        assert_eq!(
            Fen::parse("4k3/8/8/8/8/8/8/3KK3 w - - 0 1"),
            Err(FenError::InvalidKingCount {
                color: Color::White,
                count: 2
            })
        );
    }

    #[test]
    fn castling_rights() {
        let fen = Fen::parse(&format!("{} w Kq - 0 1", BARE_KINGS)).unwrap();
        assert_eq!(
            fen.castling,
            vec![(Color::White, Wing::Kingside), (Color::Black, Wing::Queenside)]
        );
        assert!(matches!(
            Fen::parse(&format!("{} w XYZ - 0 1", BARE_KINGS)),
            Err(FenError::InvalidCastlingRights(_))
        ));
        assert!(matches!(
            Fen::parse(&format!("{} w KK - 0 1", BARE_KINGS)),
            Err(FenError::InvalidCastlingRights(_))
        ));
    }

    #[test]
    fn en_passant_square() {
        let fen = Fen::parse(&format!("{} b - d6 0 1", BARE_KINGS)).unwrap();
        assert_eq!(fen.en_passant, Square::from_algebraic("d6"));
        for bad in ["abc", "x3", "e4"] {
            assert!(matches!(
                Fen::parse(&format!("{} w - {} 0 1", BARE_KINGS, bad)),
                Err(FenError::InvalidEnPassantSquare(_))
            ));
        }
    }

    #[test]
    fn invalid_clocks() {
        assert!(matches!(
            Fen::parse(&format!("{} w - - abc 1", BARE_KINGS)),
            Err(FenError::InvalidHalfmoveClock(_))
        ));
        assert!(matches!(
            Fen::parse(&format!("{} w - - 0 xyz", BARE_KINGS)),
            Err(FenError::InvalidFullmoveNumber(_))
        ));
    }

    #[test]
    fn fen_error_display() {
        let err = FenError::InvalidPartCount(3);
        assert!(format!("{}", err).contains('3'));

        let err = FenError::InvalidKingCount {
            color: Color::Black,
            count: 0,
        };
        assert_eq!(err.to_string(), "Black must have exactly one king, found 0");
    }
}
