//! Best-move search.
//!
//! Fail-hard negamax alpha-beta with MVV-LVA ordering, an optional capture
//! quiescence extension and iterative deepening. The time budget is checked
//! at every node; once it runs out the search unwinds and keeps the best
//! move of the last completed iteration.

mod opening;
mod ordering;

pub use opening::{opening_move, OPENING_PLIES};
pub use ordering::{move_score, order_moves};

use crate::config::SearchConfig;
use crate::eval::{evaluate_relative, EvalTerms, MATE_SCORE};
use crate::movegen::{is_in_check, legal_captures, legal_moves};
use crate::Position;
use chess_core::Move;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Bound wider than any reachable score.
const INFINITY: i32 = 2 * MATE_SCORE;

/// Result of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Chosen move, `None` only when the side to move has no legal move.
    pub best_move: Option<Move>,
    /// Score of the chosen move for the side to move.
    pub score: i32,
    /// Deepest completed iteration; zero for an opening-heuristic pick.
    pub depth: u8,
    /// Nodes visited, quiescence included.
    pub nodes: u64,
    pub elapsed: Duration,
    /// True if the time budget cut the search short.
    pub timed_out: bool,
}

/// Search state for a single invocation.
pub struct Searcher<'a> {
    config: &'a SearchConfig,
    terms: EvalTerms,
    nodes: u64,
    start_time: Instant,
    deadline: Option<Instant>,
    stopped: bool,
}

impl<'a> Searcher<'a> {
    pub fn new(config: &'a SearchConfig) -> Self {
        let start_time = Instant::now();
        Searcher {
            config,
            terms: config.eval_terms(),
            nodes: 0,
            start_time,
            deadline: config.time_budget().map(|budget| start_time + budget),
            stopped: false,
        }
    }

    fn check_time(&mut self) {
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                self.stopped = true;
            }
        }
    }

    /// Searches `position` for its side to move.
    ///
    /// `plies_played` is the number of moves made in the game so far and
    /// only gates the opening heuristic. The position is restored before
    /// returning.
    pub fn search(mut self, position: &mut Position, plies_played: usize) -> SearchOutcome {
        let color = position.side_to_move;
        let mut root_moves = legal_moves(position, color);

        if root_moves.is_empty() {
            return self.finish(None, 0, 0);
        }

        if self.config.opening_heuristic {
            if let Some(mv) = opening_move(position.board(), root_moves.as_slice(), plies_played) {
                debug!(%mv, "opening heuristic move");
                let score = evaluate_relative(position, &self.terms);
                return self.finish(Some(mv), score, 0);
            }
        }

        order_moves(position.board(), root_moves.as_mut_slice());

        let mut best: Option<(Move, i32, u8)> = None;

        for depth in 1..=self.config.effective_depth() {
            if let Some((previous, _, _)) = best {
                promote_to_front(root_moves.as_mut_slice(), previous);
            }

            let mut alpha = -INFINITY;
            let beta = INFINITY;
            let mut iteration_best: Option<(Move, i32)> = None;
            let mut in_flight: Option<Move> = None;

            for &mv in root_moves.as_slice() {
                let undo = position.make_move(mv);
                let score = -self.alpha_beta(position, depth - 1, -beta, -alpha);
                position.unmake_move(mv, undo);

                if self.stopped {
                    in_flight = Some(mv);
                    break;
                }

                if iteration_best.map_or(true, |(_, s)| score > s) {
                    iteration_best = Some((mv, score));
                }
                if score > alpha {
                    alpha = score;
                }
            }

            if self.stopped {
                // A partial iteration only counts when nothing else was found.
                if best.is_none() {
                    best = iteration_best.map(|(mv, score)| (mv, score, depth)).or_else(|| {
                        in_flight.map(|mv| (mv, evaluate_relative(position, &self.terms), 0))
                    });
                }
                break;
            }

            if let Some((mv, score)) = iteration_best {
                debug!(
                    depth,
                    %mv,
                    score,
                    nodes = self.nodes,
                    "iteration complete"
                );
                best = Some((mv, score, depth));
                if score.abs() >= MATE_SCORE {
                    break;
                }
            }
        }

        match best {
            Some((mv, score, depth)) => self.finish(Some(mv), score, depth),
            None => self.finish(None, 0, 0),
        }
    }

    fn finish(self, best_move: Option<Move>, score: i32, depth: u8) -> SearchOutcome {
        let outcome = SearchOutcome {
            best_move,
            score,
            depth,
            nodes: self.nodes,
            elapsed: self.start_time.elapsed(),
            timed_out: self.stopped,
        };
        info!(
            best_move = %outcome.best_move.map(|m| m.to_uci()).unwrap_or_else(|| "none".into()),
            score = outcome.score,
            depth = outcome.depth,
            nodes = outcome.nodes,
            ms = outcome.elapsed.as_millis() as u64,
            timed_out = outcome.timed_out,
            "search finished"
        );
        outcome
    }

    /// Fail-hard negamax. Returns 0 as a sentinel once stopped; callers must
    /// check `stopped` before trusting the value.
    fn alpha_beta(&mut self, position: &mut Position, depth: u8, mut alpha: i32, beta: i32) -> i32 {
        self.nodes += 1;
        self.check_time();
        if self.stopped {
            return 0;
        }

        let color = position.side_to_move;
        let mut moves = legal_moves(position, color);

        if moves.is_empty() {
            return if is_in_check(position.board(), color) {
                -(MATE_SCORE + i32::from(depth))
            } else {
                0
            };
        }

        if depth == 0 {
            return if self.config.quiescence {
                self.quiescence(position, alpha, beta, self.config.quiescence_depth)
            } else {
                evaluate_relative(position, &self.terms)
            };
        }

        order_moves(position.board(), moves.as_mut_slice());

        for &mv in moves.as_slice() {
            let undo = position.make_move(mv);
            let score = -self.alpha_beta(position, depth - 1, -beta, -alpha);
            position.unmake_move(mv, undo);

            if self.stopped {
                return 0;
            }
            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }

        alpha
    }

    /// Capture search with a stand-pat bound.
    ///
    /// A side in check may not stand pat: every evasion is searched, and
    /// having none is mate. Once the extra depth is used up a checked side
    /// gets its static score clamped to the window.
    fn quiescence(&mut self, position: &mut Position, mut alpha: i32, beta: i32, depth: u8) -> i32 {
        self.nodes += 1;
        self.check_time();
        if self.stopped {
            return 0;
        }

        let color = position.side_to_move;
        let in_check = is_in_check(position.board(), color);

        let mut moves = if in_check {
            let evasions = legal_moves(position, color);
            if evasions.is_empty() {
                return -MATE_SCORE;
            }
            if depth == 0 {
                return evaluate_relative(position, &self.terms).clamp(alpha, beta);
            }
            evasions
        } else {
            let stand_pat = evaluate_relative(position, &self.terms);
            if stand_pat >= beta {
                return beta;
            }
            if stand_pat > alpha {
                alpha = stand_pat;
            }
            if depth == 0 {
                return alpha;
            }
            legal_captures(position, color)
        };
        order_moves(position.board(), moves.as_mut_slice());

        for &mv in moves.as_slice() {
            let undo = position.make_move(mv);
            let score = -self.quiescence(position, -beta, -alpha, depth - 1);
            position.unmake_move(mv, undo);

            if self.stopped {
                return 0;
            }
            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }

        alpha
    }
}

fn promote_to_front(moves: &mut [Move], mv: Move) {
    if let Some(index) = moves.iter().position(|&m| m == mv) {
        moves[..=index].rotate_right(1);
    }
}

/// Convenience wrapper: searches a clone of `position`.
pub fn search(position: &Position, config: &SearchConfig, plies_played: usize) -> SearchOutcome {
    let mut scratch = position.clone();
    Searcher::new(config).search(&mut scratch, plies_played)
}
