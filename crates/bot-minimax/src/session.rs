//! Line-oriented play loop.
//!
//! Each input line is either a command or a move in coordinate notation.
//! When the engine owns the side to move it replies immediately.

use chess_core::{Color, PieceKind, Square};
use chess_engine::{EngineHandle, Game, GameError, SearchConfig};
use std::io::{self, BufRead, Write};
use tracing::{info, warn};

const HELP: &str = "\
commands:
  <move>       play a move, e.g. e2e4 or e7e8q
  go           let the engine move for the side to move
  undo         take back one move
  moves        list legal moves
  board        show the board
  eval         static evaluation (centipawns, White's view)
  fen [FEN]    show the FEN, or load one
  new          start a new game
  place Nf3    put a piece on a square (uppercase White, lowercase Black)
  remove f3    take the piece off a square
  clear        empty the board
  help         show this text
  quit         leave";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// A game shared with the background search through an [`EngineHandle`].
pub struct Session {
    engine: EngineHandle,
    config: SearchConfig,
    engine_side: Option<Color>,
}

impl Session {
    pub fn new(game: Game, config: SearchConfig, engine_side: Option<Color>) -> Self {
        Session {
            engine: EngineHandle::new(game),
            config,
            engine_side,
        }
    }

    /// Returns a copy of the current game.
    pub fn game(&self) -> Game {
        self.engine.snapshot()
    }

    /// Reads commands from `input` until it ends or "quit".
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> io::Result<()> {
        self.show_board(out)?;
        self.engine_turn(out)?;
        for line in input.lines() {
            if self.execute(&line?, out)? == Flow::Quit {
                break;
            }
        }
        Ok(())
    }

    /// Handles one input line. Game errors are reported, not returned.
    pub fn execute<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<Flow> {
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        match command {
            "" => {}
            "quit" | "exit" => return Ok(Flow::Quit),
            "help" => writeln!(out, "{}", HELP)?,
            "board" => self.show_board(out)?,
            "fen" if rest.is_empty() => {
                writeln!(out, "{}", self.engine.with_game(Game::to_fen))?
            }
            "fen" => match Game::from_fen(rest).and_then(|game| self.engine.load(game)) {
                Ok(()) => {
                    self.show_board(out)?;
                    self.engine_turn(out)?;
                }
                Err(e) => writeln!(out, "error: {}", e)?,
            },
            "new" => match self.engine.reset() {
                Ok(()) => {
                    self.show_board(out)?;
                    self.engine_turn(out)?;
                }
                Err(e) => writeln!(out, "error: {}", e)?,
            },
            "place" => match parse_placement(rest) {
                Some((kind, color, square)) => {
                    let placed = self.engine.place_piece(kind, color, square);
                    self.report_edit(placed, out)?
                }
                None => writeln!(out, "error: expected a piece and a square, e.g. \"place Nf3\"")?,
            },
            "remove" => match Square::from_algebraic(rest) {
                Some(square) => {
                    let removed = self.engine.remove_piece(square).map(|_| ());
                    self.report_edit(removed, out)?
                }
                None => writeln!(out, "error: expected a square, e.g. \"remove f3\"")?,
            },
            "clear" => {
                let cleared = self.engine.clear_board();
                self.report_edit(cleared, out)?
            }
            "moves" => {
                let moves: Vec<String> = self.engine.with_game(|game| {
                    game.legal_moves(game.side_to_move())
                        .iter()
                        .map(|m| m.to_string())
                        .collect()
                });
                writeln!(out, "{}", moves.join(" "))?;
            }
            "eval" => {
                let score = self.engine.with_game(|game| game.evaluation_with(&self.config));
                writeln!(out, "{}", score)?
            }
            "undo" => match self.engine.undo_last_move() {
                Ok(mv) => writeln!(out, "took back {}", mv)?,
                Err(e) => writeln!(out, "error: {}", e)?,
            },
            "go" => {
                self.engine_move(out)?;
            }
            notation => match self.engine.apply_uci(notation) {
                Ok(_) => {
                    self.report_status(out)?;
                    self.engine_turn(out)?;
                }
                Err(e @ GameError::InvalidNotation(_)) => {
                    writeln!(out, "error: {} (type \"help\" for commands)", e)?
                }
                Err(e) => writeln!(out, "error: {}", e)?,
            },
        }
        Ok(Flow::Continue)
    }

    fn show_board<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let board = self.engine.with_game(|game| game.position().board().to_string());
        write!(out, "{}", board)
    }

    fn report_edit<W: Write>(&self, result: Result<(), GameError>, out: &mut W) -> io::Result<()> {
        match result {
            Ok(()) => self.report_status(out),
            Err(e) => writeln!(out, "error: {}", e),
        }
    }

    fn engine_turn<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let engine_to_move = self.engine.with_game(|game| {
            self.engine_side == Some(game.side_to_move()) && !game.is_game_over()
        });
        if engine_to_move {
            self.engine_move(out)?;
        }
        Ok(())
    }

    /// Searches on the background thread and plays the engine's move.
    /// Returns false if none was played.
    pub fn engine_move<W: Write>(&mut self, out: &mut W) -> io::Result<bool> {
        let outcome = match self
            .engine
            .start_search(self.config.clone())
            .and_then(|task| task.join())
        {
            Ok(outcome) => outcome,
            Err(e) => {
                writeln!(out, "error: {}", e)?;
                return Ok(false);
            }
        };
        let Some(mv) = outcome.best_move else {
            self.report_status(out)?;
            return Ok(false);
        };
        if let Err(e) = self.engine.apply_move(mv) {
            warn!(%mv, error = %e, "engine produced a move the game rejected");
            writeln!(out, "error: {}", e)?;
            return Ok(false);
        }
        writeln!(
            out,
            "engine plays {} (score {}, depth {}, {} nodes{})",
            mv,
            outcome.score,
            outcome.depth,
            outcome.nodes,
            if outcome.timed_out { ", out of time" } else { "" }
        )?;
        self.report_status(out)?;
        Ok(true)
    }

    fn report_status<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let game = self.engine.snapshot();
        write!(out, "{}", game.position().board())?;
        if game.is_checkmate() {
            writeln!(out, "checkmate, {} wins", game.side_to_move().opposite())?;
            info!(fen = %game.to_fen(), "game over by checkmate");
        } else if game.is_stalemate() {
            writeln!(out, "stalemate")?;
            info!(fen = %game.to_fen(), "game over by stalemate");
        } else if game.is_in_check(game.side_to_move()) {
            writeln!(out, "check")?;
        }
        Ok(())
    }

    /// Lets the engine play both sides for up to `plies` moves.
    pub fn self_play<W: Write>(&mut self, plies: usize, out: &mut W) -> io::Result<()> {
        for _ in 0..plies {
            if self.engine.with_game(Game::is_game_over) || !self.engine_move(out)? {
                break;
            }
        }
        let (history, fen) = self.engine.with_game(|game| {
            let history: Vec<String> = game.history().map(|m| m.to_string()).collect();
            (history, game.to_fen())
        });
        writeln!(out, "moves: {}", history.join(" "))?;
        writeln!(out, "fen: {}", fen)
    }
}

/// Parses "Nf3" or "qd8": a FEN piece letter followed by a square.
fn parse_placement(s: &str) -> Option<(PieceKind, Color, Square)> {
    let mut chars = s.chars();
    let (kind, color) = PieceKind::from_fen_char(chars.next()?)?;
    let square = Square::from_algebraic(chars.as_str())?;
    Some((kind, color, square))
}
