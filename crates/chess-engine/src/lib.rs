//! Mailbox chess engine.
//!
//! This crate provides:
//! - [`Board`] - piece arena plus a 10x12 mailbox grid
//! - [`Position`] - board, side to move, castling rights and clocks, with
//!   reversible move application
//! - [`movegen`] - pseudo-legal and legal move generation, perft
//! - [`rules`] - castling, promotion, en passant and game termination
//! - [`eval`] - static evaluation
//! - [`search`] - alpha-beta best-move search
//! - [`Game`] - validated play with undo, and [`EngineHandle`] for searching
//!   on a background thread
//!
//! # Architecture
//!
//! The board is a 120-cell grid with a two-cell sentinel border, so a piece
//! stepping off the edge lands on an off-board cell instead of wrapping.
//! Pieces live in an arena indexed by [`chess_core::PieceId`]; moves refer to
//! pieces by id and every applied move returns an undo record.
//!
//! # Example
//!
//! ```
//! use chess_engine::{Game, SearchConfig};
//! use chess_core::Color;
//!
//! let mut game = Game::new();
//! assert_eq!(game.legal_moves(Color::White).len(), 20);
//!
//! game.apply_uci("e2e4").unwrap();
//! game.apply_uci("e7e5").unwrap();
//! println!("Position after 1.e4 e5: {}", game.to_fen());
//!
//! let reply = game.compute_best_move(&SearchConfig::fixed_depth(2));
//! assert!(reply.is_some());
//! ```

mod board;
mod config;
pub mod eval;
mod game;
mod handle;
pub mod movegen;
mod position;
pub mod rules;
pub mod search;

pub use board::{Board, Piece};
pub use config::SearchConfig;
pub use eval::{EvalTerms, MATE_SCORE};
pub use game::{Game, GameError};
pub use handle::{EngineHandle, SearchTask};
pub use movegen::{legal_moves, MoveList};
pub use position::{Position, Undo};
pub use rules::{CastlingRights, GameResult, GameStatus};
pub use search::SearchOutcome;
