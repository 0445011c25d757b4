use hashbrown::HashMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::automaton::{
    StateId,
    cycle::{Loop, find_cycles},
    lps::LinearPathScheme,
    path::{SimplePath, find_simple_paths},
    vass::VASS2,
};

/// Limits for the scheme enumeration. Paths longer than `max_path_length`
/// transitions are not considered and every scheme has at most `max_cycles`
/// loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchBounds {
    pub max_path_length: usize,
    pub max_cycles: usize,
}

impl SearchBounds {
    pub fn new(max_path_length: usize, max_cycles: usize) -> Self {
        SearchBounds {
            max_path_length,
            max_cycles,
        }
    }

    /// Bounds large enough to see every simple path of the automaton and
    /// every cycle anchored on it.
    pub fn from_automaton(vass: &VASS2) -> Self {
        let states = vass.state_count().max(1);
        let transitions = vass.transition_count().max(1);

        SearchBounds {
            max_path_length: states,
            max_cycles: states.saturating_mul(transitions),
        }
    }
}

/// Builds one linear path scheme per simple path between two states.
///
/// The cycles of every state are computed once per builder and reused for
/// all paths running through that state.
#[derive(Debug)]
pub struct LPSBuilder<'a> {
    vass: &'a VASS2,
    bounds: SearchBounds,
    cycle_cache: HashMap<StateId, Vec<Loop>>,
}

impl<'a> LPSBuilder<'a> {
    pub fn new(vass: &'a VASS2, bounds: SearchBounds) -> Self {
        LPSBuilder {
            vass,
            bounds,
            cycle_cache: HashMap::new(),
        }
    }

    pub fn build(&mut self, start: StateId, end: StateId) -> Vec<LinearPathScheme> {
        find_simple_paths(self.vass, start, end, self.bounds.max_path_length)
            .into_iter()
            .map(|path| self.scheme_for_path(path))
            .collect()
    }

    /// Anchors the cycles of every state of `path` at its position and cuts
    /// the path into prefix, between segments and suffix accordingly.
    pub fn scheme_for_path(&mut self, path: SimplePath) -> LinearPathScheme {
        let mut anchored: Vec<(usize, Loop)> = vec![];
        for (position, &state) in path.states.iter().enumerate() {
            for l in self.cycles_at(state) {
                anchored.push((position, l.clone()));
            }
        }

        anchored.sort_by_key(|(position, _)| *position);
        anchored.truncate(self.bounds.max_cycles);

        let (Some((first, _)), Some((last, _))) = (anchored.first(), anchored.last()) else {
            tracing::debug!(path = %path.to_fancy_string(), "Scheme without loops");
            return LinearPathScheme::linear(path.updates.clone()).with_path(path);
        };

        let prefix = path.updates[..*first].to_vec();
        let suffix = path.updates[*last..].to_vec();
        let between = anchored
            .iter()
            .tuple_windows()
            .map(|((from, _), (to, _))| path.updates[*from..*to].to_vec())
            .collect();
        let loops = anchored.into_iter().map(|(_, l)| l).collect_vec();

        tracing::debug!(
            path = %path.to_fancy_string(),
            loops = %loops.len(),
            "Scheme"
        );

        LinearPathScheme::new(prefix, loops, between, suffix).with_path(path)
    }

    pub fn cycles_at(&mut self, state: StateId) -> &[Loop] {
        let vass = self.vass;
        self.cycle_cache
            .entry(state)
            .or_insert_with(|| find_cycles(vass, state))
    }
}

/// Convenience wrapper around [LPSBuilder].
pub fn build_schemes(
    vass: &VASS2,
    start: StateId,
    end: StateId,
    max_path_length: usize,
    max_cycles: usize,
) -> Vec<LinearPathScheme> {
    LPSBuilder::new(vass, SearchBounds::new(max_path_length, max_cycles)).build(start, end)
}
