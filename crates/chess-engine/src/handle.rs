//! Shared game handle with a background search.
//!
//! [`EngineHandle`] lets a front end keep reading the game while a search
//! runs on another thread. Mutations are refused until the search is done.

use crate::config::SearchConfig;
use crate::game::{Game, GameError};
use crate::search::SearchOutcome;
use chess_core::{Color, Move, PieceKind, Square};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use tracing::debug;

/// Cloneable handle to a game shared between threads.
#[derive(Debug, Clone, Default)]
pub struct EngineHandle {
    game: Arc<Mutex<Game>>,
    searching: Arc<AtomicBool>,
}

/// Clears the in-progress flag when the search thread exits, panics included.
struct SearchGuard(Arc<AtomicBool>);

impl Drop for SearchGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// A running background search.
#[derive(Debug)]
pub struct SearchTask {
    handle: JoinHandle<SearchOutcome>,
}

impl SearchTask {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the search to finish.
    pub fn join(self) -> Result<SearchOutcome, GameError> {
        self.handle.join().map_err(|_| GameError::SearchFailed)
    }
}

impl EngineHandle {
    pub fn new(game: Game) -> Self {
        EngineHandle {
            game: Arc::new(Mutex::new(game)),
            searching: Arc::new(AtomicBool::new(false)),
        }
    }

    // Every mutation completes before the guard drops, so a poisoned game is
    // still consistent.
    fn lock(&self) -> MutexGuard<'_, Game> {
        self.game.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_searching(&self) -> bool {
        self.searching.load(Ordering::SeqCst)
    }

    /// Runs `f` with read access to the game.
    pub fn with_game<R>(&self, f: impl FnOnce(&Game) -> R) -> R {
        f(&self.lock())
    }

    /// Returns a copy of the current game.
    pub fn snapshot(&self) -> Game {
        self.lock().clone()
    }

    /// Runs a mutation unless a search is running. The flag is read under
    /// the game lock, the same lock `start_search` raises it under.
    fn with_game_mut<R>(
        &self,
        f: impl FnOnce(&mut Game) -> Result<R, GameError>,
    ) -> Result<R, GameError> {
        let mut game = self.lock();
        if self.is_searching() {
            return Err(GameError::SearchInProgress);
        }
        f(&mut game)
    }

    pub fn apply_move(&self, mv: Move) -> Result<(), GameError> {
        self.with_game_mut(|game| game.apply_move(mv))
    }

    pub fn apply_uci(&self, notation: &str) -> Result<Move, GameError> {
        self.with_game_mut(|game| game.apply_uci(notation))
    }

    pub fn undo_last_move(&self) -> Result<Move, GameError> {
        self.with_game_mut(Game::undo_last_move)
    }

    pub fn reset(&self) -> Result<(), GameError> {
        self.with_game_mut(|game| {
            game.reset();
            Ok(())
        })
    }

    /// Replaces the game, e.g. with one loaded from FEN.
    pub fn load(&self, game: Game) -> Result<(), GameError> {
        self.with_game_mut(|current| {
            *current = game;
            Ok(())
        })
    }

    pub fn place_piece(
        &self,
        kind: PieceKind,
        color: Color,
        square: Square,
    ) -> Result<(), GameError> {
        self.with_game_mut(|game| game.place_piece(kind, color, square))
    }

    pub fn remove_piece(&self, square: Square) -> Result<(PieceKind, Color), GameError> {
        self.with_game_mut(|game| game.remove_piece(square))
    }

    pub fn clear_board(&self) -> Result<(), GameError> {
        self.with_game_mut(|game| {
            game.clear_board();
            Ok(())
        })
    }

    /// Starts a search of the current position on a background thread.
    ///
    /// Fails with [`GameError::SearchInProgress`] if one is already running.
    pub fn start_search(&self, config: SearchConfig) -> Result<SearchTask, GameError> {
        let game = {
            let game = self.lock();
            if self
                .searching
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                return Err(GameError::SearchInProgress);
            }
            game.clone()
        };
        let guard = SearchGuard(Arc::clone(&self.searching));
        debug!(depth = config.depth, ply = game.ply_count(), "starting background search");

        let spawned = thread::Builder::new()
            .name("search".into())
            .spawn(move || {
                let _guard = guard;
                game.search(&config)
            });
        // A failed spawn drops the closure and with it the guard.
        let handle = spawned.map_err(|_| GameError::SearchFailed)?;
        Ok(SearchTask { handle })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Position;
    use chess_core::Rank;
    use std::time::Duration;

    #[test]
    fn background_search_returns_move() {
        let handle = EngineHandle::new(
            Game::from_fen("4k3/8/8/3q4/8/8/3R4/4K3 w - - 0 1").unwrap(),
        );
        let task = handle.start_search(SearchConfig::fixed_depth(2)).unwrap();
        let outcome = task.join().unwrap();
        assert_eq!(outcome.best_move.map(|m| m.to_uci()), Some("d2d5".into()));
        assert!(!handle.is_searching());
        handle.apply_uci("d2d5").unwrap();
    }

    #[test]
    fn mutations_refused_while_searching() {
        let handle = EngineHandle::default();
        let config = SearchConfig {
            depth: 6,
            time_budget_ms: 300,
            ..SearchConfig::default()
        };
        let task = handle.start_search(config.clone()).unwrap();

        if handle.is_searching() {
            assert_eq!(handle.apply_uci("e2e4"), Err(GameError::SearchInProgress));
            assert_eq!(handle.reset(), Err(GameError::SearchInProgress));
            assert!(matches!(
                handle.start_search(config),
                Err(GameError::SearchInProgress)
            ));
            assert_eq!(
                handle.with_game(|g| g.to_fen()),
                Position::startpos().to_fen()
            );
        }

        let outcome = task.join().unwrap();
        assert!(outcome.best_move.is_some());
        assert!(!handle.is_searching());
        handle.apply_uci("e2e4").unwrap();
        assert_eq!(handle.with_game(Game::ply_count), 1);
        assert_eq!(handle.undo_last_move().unwrap().to_uci(), "e2e4");
    }

    #[test]
    fn edits_refused_while_searching() {
        let handle = EngineHandle::default();
        let config = SearchConfig {
            depth: 6,
            time_budget_ms: 300,
            ..SearchConfig::default()
        };
        let task = handle.start_search(config).unwrap();
        if handle.is_searching() {
            assert_eq!(handle.clear_board(), Err(GameError::SearchInProgress));
            assert_eq!(
                handle.remove_piece(Square::E2),
                Err(GameError::SearchInProgress)
            );
            assert_eq!(
                handle.place_piece(PieceKind::Queen, Color::White, Square::E4),
                Err(GameError::SearchInProgress)
            );
            assert_eq!(handle.load(Game::new()), Err(GameError::SearchInProgress));
        }
        task.join().unwrap();

        handle.clear_board().unwrap();
        handle
            .place_piece(PieceKind::King, Color::White, Square::E1)
            .unwrap();
        assert_eq!(handle.with_game(|g| g.to_fen()), "8/8/8/8/8/8/8/4K3 w - - 0 1");
    }

    #[test]
    fn search_start_waits_for_game_lock() {
        let handle = EngineHandle::default();

        let reader = {
            let handle = handle.clone();
            thread::spawn(move || handle.with_game(|_| thread::sleep(Duration::from_millis(300))))
        };
        thread::sleep(Duration::from_millis(50));
        let writer = {
            let handle = handle.clone();
            thread::spawn(move || handle.apply_uci("e2e4"))
        };
        thread::sleep(Duration::from_millis(50));
        let starter = {
            let handle = handle.clone();
            thread::spawn(move || handle.start_search(SearchConfig::fixed_depth(3)))
        };
        thread::sleep(Duration::from_millis(50));

        // The flag cannot be raised while another caller holds the game.
        assert!(!handle.is_searching());

        reader.join().unwrap();
        let mutation = writer.join().unwrap();
        let outcome = starter.join().unwrap().unwrap().join().unwrap();
        let from_rank = outcome.best_move.unwrap().from().rank();

        match mutation {
            // The edit landed first, so the search saw Black to move.
            Ok(_) => assert!(matches!(from_rank, Some(Rank::R7 | Rank::R8))),
            Err(e) => {
                assert_eq!(e, GameError::SearchInProgress);
                assert!(matches!(from_rank, Some(Rank::R1 | Rank::R2)));
                assert_eq!(handle.with_game(Game::ply_count), 0);
            }
        }
    }
}
