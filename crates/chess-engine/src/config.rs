//! Search configuration.

use crate::eval::EvalTerms;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for one best-move search.
///
/// Every field has a default, so a partial TOML table deserializes cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Nominal search depth in plies. Values below 1 are treated as 1.
    pub depth: u8,
    /// Continue with captures past the nominal depth.
    pub quiescence: bool,
    /// Maximum extra plies of capture search.
    pub quiescence_depth: u8,
    /// Use piece-square tables in evaluation.
    pub extended_evaluation: bool,
    /// Individual evaluation terms. `piece_squares` is overridden by
    /// `extended_evaluation`.
    pub heuristics: EvalTerms,
    /// Time budget in milliseconds. Zero or negative disables the cutoff.
    pub time_budget_ms: i64,
    /// Play stock centre-pawn and knight moves in the first plies.
    pub opening_heuristic: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            depth: 3,
            quiescence: false,
            quiescence_depth: 2,
            extended_evaluation: true,
            heuristics: EvalTerms::default(),
            time_budget_ms: 5000,
            opening_heuristic: false,
        }
    }
}

impl SearchConfig {
    /// Returns a configuration searching `depth` plies with no time limit.
    pub fn fixed_depth(depth: u8) -> Self {
        SearchConfig {
            depth,
            time_budget_ms: 0,
            ..Self::default()
        }
    }

    /// Returns the time budget, or `None` when the cutoff is disabled.
    pub fn time_budget(&self) -> Option<Duration> {
        u64::try_from(self.time_budget_ms)
            .ok()
            .filter(|&ms| ms > 0)
            .map(Duration::from_millis)
    }

    /// Returns the evaluation terms with `extended_evaluation` applied.
    pub fn eval_terms(&self) -> EvalTerms {
        EvalTerms {
            piece_squares: self.extended_evaluation && self.heuristics.piece_squares,
            ..self.heuristics
        }
    }

    /// Returns the effective depth, at least one ply.
    #[inline]
    pub fn effective_depth(&self) -> u8 {
        self.depth.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.depth, 3);
        assert!(!config.quiescence);
        assert_eq!(config.quiescence_depth, 2);
        assert_eq!(config.time_budget(), Some(Duration::from_millis(5000)));
        assert!(config.eval_terms().piece_squares);
    }

    #[test]
    fn non_positive_budget_disables_cutoff() {
        let mut config = SearchConfig::default();
        config.time_budget_ms = 0;
        assert_eq!(config.time_budget(), None);
        config.time_budget_ms = -250;
        assert_eq!(config.time_budget(), None);
        assert_eq!(SearchConfig::fixed_depth(4).time_budget(), None);
    }

    #[test]
    fn extended_evaluation_gates_tables() {
        let config = SearchConfig {
            extended_evaluation: false,
            ..SearchConfig::default()
        };
        let terms = config.eval_terms();
        assert!(!terms.piece_squares);
        assert!(terms.development);
    }

    #[test]
    fn depth_is_at_least_one() {
        assert_eq!(SearchConfig::fixed_depth(0).effective_depth(), 1);
        assert_eq!(SearchConfig::fixed_depth(5).effective_depth(), 5);
    }

    #[test]
    fn partial_toml() {
        let config: SearchConfig = toml::from_str(
            r#"
            depth = 5
            quiescence = true

            [heuristics]
            doubled_pawns = false
            "#,
        )
        .unwrap();
        assert_eq!(config.depth, 5);
        assert!(config.quiescence);
        assert_eq!(config.quiescence_depth, 2);
        assert!(!config.heuristics.doubled_pawns);
        assert!(config.heuristics.center_control);
    }
}
