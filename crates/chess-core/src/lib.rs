//! Core types for chess.
//!
//! This crate provides the fundamental value types shared by the engine and
//! its front ends:
//! - [`PieceKind`] and [`Color`], which combine into the signed cell values
//!   stored in the 10x12 mailbox grid
//! - [`Square`], [`File`], and [`Rank`] for board coordinates
//! - [`Move`] and [`Special`] for self-describing, reversible moves
//! - FEN parsing and serialization

mod color;
mod fen;
mod mov;
mod piece;
mod square;

pub use color::Color;
pub use fen::{Fen, FenError};
pub use mov::{CoordinateMove, Move, PieceId, Special, Wing};
pub use piece::{PieceKind, EMPTY, OFF_BOARD};
pub use square::{File, Rank, Square};
