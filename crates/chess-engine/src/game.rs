//! Game facade: validated moves, undo history and search entry points.
//!
//! [`Game`] owns the current [`Position`] plus everything needed to take
//! moves back. Callers work in coordinate notation or with [`Move`] values
//! obtained from [`Game::legal_moves`].

use crate::config::SearchConfig;
use crate::eval::evaluate_status;
use crate::movegen::{is_in_check, legal_moves};
use crate::position::Undo;
use crate::rules::{self, is_promotion_choice, CastlingPath, GameResult, GameStatus};
use crate::search::{self, SearchOutcome};
use crate::Position;
use chess_core::{Color, CoordinateMove, FenError, Move, PieceKind, Square, Wing};
use thiserror::Error;
use tracing::{debug, error};

/// Error type for game operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// The move is not legal in the current position. The game is unchanged.
    #[error("illegal move: {0}")]
    IllegalMove(String),
    /// A pawn reaching the last rank needs a promotion piece.
    #[error("promotion piece required for {0}")]
    PromotionRequired(String),
    #[error("invalid move notation: {0:?}")]
    InvalidNotation(String),
    #[error("no move to undo")]
    NothingToUndo,
    /// An edit targeted a cell outside the playable board.
    #[error("grid cell {0} is not a playable square")]
    InvalidSquare(usize),
    #[error("no piece on {0}")]
    EmptySquare(String),
    #[error("game has already ended")]
    GameAlreadyOver,
    /// A background search holds the game.
    #[error("a search is in progress")]
    SearchInProgress,
    /// The background search thread died without a result.
    #[error("search failed")]
    SearchFailed,
    #[error(transparent)]
    Fen(#[from] FenError),
}

/// A played move with what it takes to reverse it.
#[derive(Debug, Clone, Copy)]
struct HistoryEntry {
    mv: Move,
    undo: Undo,
    status_before: GameStatus,
}

/// A chess game with history tracking.
#[derive(Debug, Clone)]
pub struct Game {
    position: Position,
    status: GameStatus,
    history: Vec<HistoryEntry>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Creates a new game with the standard starting position.
    pub fn new() -> Self {
        Self::from_position(Position::startpos())
    }

    /// Creates a game from a custom starting position.
    pub fn from_position(position: Position) -> Self {
        let mut game = Game {
            position,
            status: GameStatus::Ongoing,
            history: Vec::new(),
        };
        game.refresh_status();
        game
    }

    /// Creates a game from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, GameError> {
        Ok(Self::from_position(Position::from_fen(fen)?))
    }

    /// Returns to the standard starting position and clears the history.
    pub fn reset(&mut self) {
        *self = Self::new();
        debug!("game reset");
    }

    /// Returns a reference to the current position.
    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn side_to_move(&self) -> Color {
        self.position.side_to_move
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Returns the current position as a FEN string.
    pub fn to_fen(&self) -> String {
        self.position.to_fen()
    }

    /// Returns all legal moves for `color`.
    ///
    /// En passant is only available to the side to move.
    pub fn legal_moves(&self, color: Color) -> Vec<Move> {
        let mut scratch = self.position.clone();
        legal_moves(&mut scratch, color).to_vec()
    }

    /// Returns the legal moves of the piece on `square`, or nothing if the
    /// square is empty.
    pub fn legal_moves_from(&self, square: Square) -> Vec<Move> {
        let Some(piece) = self.position.board().piece_at(square) else {
            return Vec::new();
        };
        let color = piece.color;
        let mut moves = self.legal_moves(color);
        moves.retain(|m| m.from() == square);
        moves
    }

    /// Plays `mv` for the side to move.
    ///
    /// The move must be one of [`Game::legal_moves`] for the side to move.
    pub fn apply_move(&mut self, mv: Move) -> Result<(), GameError> {
        if self.status.is_over() {
            return Err(GameError::GameAlreadyOver);
        }
        if !self.legal_moves(self.side_to_move()).contains(&mv) {
            return Err(GameError::IllegalMove(mv.to_uci()));
        }

        let status_before = self.status;
        let undo = self.position.make_move(mv);
        self.history.push(HistoryEntry {
            mv,
            undo,
            status_before,
        });
        self.refresh_status();
        debug!(%mv, status = ?self.status, ply = self.history.len(), "move applied");
        Ok(())
    }

    /// Plays a move in coordinate notation, e.g. "e2e4" or "e7e8q".
    pub fn apply_uci(&mut self, notation: &str) -> Result<Move, GameError> {
        let coords = CoordinateMove::parse(notation.trim())
            .ok_or_else(|| GameError::InvalidNotation(notation.to_string()))?;
        let mv = self.find_move(coords.from, coords.to, coords.promotion)?;
        self.apply_move(mv)?;
        Ok(mv)
    }

    /// Looks up the legal move from `from` to `to` for the side to move.
    ///
    /// A promotion piece must be given exactly when the move promotes.
    pub fn find_move(
        &self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> Result<Move, GameError> {
        if self.status.is_over() {
            return Err(GameError::GameAlreadyOver);
        }
        let notation = || match promotion {
            Some(kind) => format!("{}{}{}", from, to, kind.to_fen_char(Color::Black)),
            None => format!("{}{}", from, to),
        };
        if let Some(kind) = promotion {
            if !is_promotion_choice(kind) {
                return Err(GameError::InvalidNotation(notation()));
            }
        }

        let candidates: Vec<Move> = self
            .legal_moves(self.side_to_move())
            .into_iter()
            .filter(|m| m.from() == from && m.to() == to)
            .collect();

        if let Some(mv) = candidates.iter().find(|m| m.promotion() == promotion) {
            return Ok(*mv);
        }
        if promotion.is_none() && candidates.iter().any(|m| m.promotion().is_some()) {
            return Err(GameError::PromotionRequired(notation()));
        }
        Err(GameError::IllegalMove(notation()))
    }

    /// Takes back the last move and returns it.
    pub fn undo_last_move(&mut self) -> Result<Move, GameError> {
        let entry = self.history.pop().ok_or(GameError::NothingToUndo)?;
        self.position.unmake_move(entry.mv, entry.undo);
        self.status = entry.status_before;
        debug!(mv = %entry.mv, ply = self.history.len(), "move undone");
        Ok(entry.mv)
    }

    /// Returns the moves played so far, oldest first.
    pub fn history(&self) -> impl Iterator<Item = Move> + '_ {
        self.history.iter().map(|entry| entry.mv)
    }

    /// Returns the number of half-moves (plies) played.
    pub fn ply_count(&self) -> usize {
        self.history.len()
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        is_in_check(self.position.board(), color)
    }

    pub fn is_game_over(&self) -> bool {
        self.status.is_over()
    }

    pub fn is_checkmate(&self) -> bool {
        self.status == GameStatus::Checkmate
    }

    pub fn is_stalemate(&self) -> bool {
        self.status == GameStatus::Stalemate
    }

    /// Returns the game result if the game is over.
    pub fn result(&self) -> Option<GameResult> {
        GameResult::from_status(self.status, self.side_to_move())
    }

    /// Static evaluation of the current position from White's point of view,
    /// with every heuristic enabled.
    pub fn current_evaluation(&self) -> i32 {
        self.evaluation_with(&SearchConfig::default())
    }

    /// Static evaluation using the evaluation terms of `config`.
    pub fn evaluation_with(&self, config: &SearchConfig) -> i32 {
        evaluate_status(&self.position, self.status, &config.eval_terms())
    }

    /// Searches the current position for the side to move.
    pub fn search(&self, config: &SearchConfig) -> SearchOutcome {
        let outcome = search::search(&self.position, config, self.ply_count());
        if outcome.best_move.is_none() && !self.is_game_over() {
            error!(
                fen = %self.to_fen(),
                "search found no move in a position that is not over"
            );
        }
        outcome
    }

    /// Returns the best move for the side to move, or `None` if the game
    /// is over.
    pub fn compute_best_move(&self, config: &SearchConfig) -> Option<Move> {
        self.search(config).best_move
    }

    /// Puts a piece on `square`, replacing any piece already there.
    ///
    /// Edits clear the move history and the en passant square, and drop
    /// castling rights whose king or rook is no longer on its home square.
    /// A piece aimed off the board is repaired away and the game is left
    /// as it was.
    pub fn place_piece(
        &mut self,
        kind: PieceKind,
        color: Color,
        square: Square,
    ) -> Result<(), GameError> {
        let board = self.position.board_mut();
        if let Some(existing) = board.piece_at(square).map(|p| p.id) {
            board.capture(existing);
        }
        board.add_piece(kind, color, square);
        if board.synchronize() > 0 {
            return Err(GameError::InvalidSquare(square.index()));
        }
        self.finish_edit();
        Ok(())
    }

    /// Takes the piece off `square` and returns what it was.
    pub fn remove_piece(&mut self, square: Square) -> Result<(PieceKind, Color), GameError> {
        let board = self.position.board_mut();
        let (id, kind, color) = board
            .piece_at(square)
            .map(|p| (p.id, p.kind, p.color))
            .ok_or_else(|| GameError::EmptySquare(square.to_string()))?;
        board.capture(id);
        board.synchronize();
        self.finish_edit();
        Ok((kind, color))
    }

    /// Removes every piece.
    pub fn clear_board(&mut self) {
        let board = self.position.board_mut();
        let live: Vec<_> = board.live_pieces().map(|p| p.id).collect();
        for id in live {
            board.capture(id);
        }
        board.synchronize();
        self.finish_edit();
    }

    fn finish_edit(&mut self) {
        self.history.clear();
        self.position.en_passant = None;
        self.position.board_mut().compact();

        let board = self.position.board();
        let mut lost = Vec::new();
        for color in Color::ALL {
            for wing in Wing::ALL {
                let path = CastlingPath::new(color, wing);
                let at_home = |square: Square, kind: PieceKind| {
                    board
                        .piece_at(square)
                        .is_some_and(|p| p.kind == kind && p.color == color)
                };
                if !(at_home(path.king_from, PieceKind::King)
                    && at_home(path.rook_from, PieceKind::Rook))
                {
                    lost.push((color, wing));
                }
            }
        }
        for (color, wing) in lost {
            self.position.castling.remove(color, wing);
        }

        self.refresh_status();
        debug!(fen = %self.to_fen(), status = ?self.status, "position edited");
    }

    fn refresh_status(&mut self) {
        self.status = rules::status(&mut self.position);
    }
}
