use serde::{Deserialize, Serialize};

use crate::{
    automaton::{lps::LinearPathScheme, vass::counter::Vector2},
    config::CandidateConfig,
    solver::lattice::{IntegerSystem, round_to_integer},
};

/// Controls how many lattice points around the rational solution are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LPSReachOptions {
    pub window: i64,
    pub max_combinations: usize,
}

impl Default for LPSReachOptions {
    fn default() -> Self {
        LPSReachOptions {
            window: 5,
            max_combinations: 100_000,
        }
    }
}

impl From<&CandidateConfig> for LPSReachOptions {
    fn from(config: &CandidateConfig) -> Self {
        LPSReachOptions {
            window: *config.get_window(),
            max_combinations: *config.get_max_combinations(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LPSReachResult {
    pub reachable: bool,
    /// Repetition count per loop of a run reaching the target.
    pub iterations: Option<Vec<u64>>,
    pub candidates_checked: usize,
}

impl LPSReachResult {
    fn unreachable(candidates_checked: usize) -> Self {
        LPSReachResult {
            reachable: false,
            iterations: None,
            candidates_checked,
        }
    }

    fn reachable(iterations: Vec<u64>, candidates_checked: usize) -> Self {
        LPSReachResult {
            reachable: true,
            iterations: Some(iterations),
            candidates_checked,
        }
    }

    pub fn is_success(&self) -> bool {
        self.reachable
    }
}

/// Decides whether `target` can be reached from `start` by running `scheme`
/// with some repetition counts for its loops.
///
/// The answer `true` is always backed by an exact simulation of the returned
/// counts. The answer `false` only means that no counts close to a
/// non-negative rational solution work, larger counts are never tried.
/// Schemes whose segments add up past the range of `i64` are unreachable.
pub fn is_reachable(
    start: Vector2,
    target: Vector2,
    scheme: &LinearPathScheme,
    options: &LPSReachOptions,
) -> LPSReachResult {
    if scheme.is_linear() {
        return if scheme.simulate(start, &[]) == Some(target) {
            LPSReachResult::reachable(vec![], 1)
        } else {
            LPSReachResult::unreachable(1)
        };
    }

    let mut candidates_checked = 0;
    let zero = vec![0; scheme.loop_count()];

    let Some(after_prefix) = start.apply_all(&scheme.prefix) else {
        tracing::debug!("Prefix drops below zero");
        return LPSReachResult::unreachable(candidates_checked);
    };

    let (Some(suffix_effect), Some(between_effect)) =
        (scheme.suffix_effect(), scheme.between_effect())
    else {
        tracing::debug!("Fixed segments overflow");
        return LPSReachResult::unreachable(candidates_checked);
    };
    let Some(fixed) = after_prefix.checked_add(&between_effect) else {
        return LPSReachResult::unreachable(candidates_checked);
    };

    if fixed.checked_add(&suffix_effect) == Some(target) {
        candidates_checked += 1;
        if scheme.simulate(start, &zero) == Some(target) {
            return LPSReachResult::reachable(zero, candidates_checked);
        }
    }

    if !fixed.is_non_negative() {
        tracing::debug!(position = %fixed, "Fixed part drops below zero");
        return LPSReachResult::unreachable(candidates_checked);
    }

    let [fixed_x, fixed_y] = fixed.to_i128();
    let [suffix_x, suffix_y] = suffix_effect.to_i128();
    let [target_x, target_y] = target.to_i128();
    let rhs = [target_x - fixed_x - suffix_x, target_y - fixed_y - suffix_y];

    let system = IntegerSystem::from_vectors(&scheme.loop_effects());

    let Some(rational) = system.solve_non_negative_rational(rhs) else {
        tracing::debug!(rhs = ?rhs, "No non-negative rational solution");
        return LPSReachResult::unreachable(candidates_checked);
    };

    let Some(lattice) = system.solve_integer(rhs) else {
        tracing::debug!(rhs = ?rhs, "No integer solution");
        return LPSReachResult::unreachable(candidates_checked);
    };

    let Some(hint) = rational
        .iter()
        .map(round_to_integer)
        .collect::<Option<Vec<_>>>()
    else {
        return LPSReachResult::unreachable(candidates_checked);
    };
    let centre = lattice.closest_to(&hint);

    tracing::debug!(
        hint = ?hint,
        centre = ?centre,
        kernel_dimension = %lattice.basis.len(),
        "Searching candidates"
    );

    for candidate in lattice.candidates(centre, options.window, options.max_combinations) {
        candidates_checked += 1;

        if scheme.simulate(start, &candidate) == Some(target) {
            tracing::debug!(iterations = ?candidate, "Found iterations");
            return LPSReachResult::reachable(candidate, candidates_checked);
        }
    }

    LPSReachResult::unreachable(candidates_checked)
}
