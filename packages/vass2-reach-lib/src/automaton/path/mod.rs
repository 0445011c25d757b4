use hashbrown::HashSet;
use itertools::Itertools;

use crate::automaton::{
    StateId,
    vass::{
        VASS2,
        counter::{Vector2, sum_vectors},
    },
};

/// A path through the control graph that never visits a state twice.
///
/// `updates[i]` is the update of the transition taken from `states[i]` to
/// `states[i + 1]`, so there is always exactly one update less than there are
/// states. Parallel transitions yield different paths with the same states.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SimplePath {
    pub states: Vec<StateId>,
    pub updates: Vec<Vector2>,
}

impl SimplePath {
    pub fn new(start: StateId) -> Self {
        SimplePath {
            states: vec![start],
            updates: vec![],
        }
    }

    pub fn add(&mut self, update: Vector2, state: StateId) {
        self.updates.push(update);
        self.states.push(state);
    }

    /// Removes the last transition. The start state is never removed.
    pub fn pop(&mut self) -> Option<(Vector2, StateId)> {
        let update = self.updates.pop()?;
        let state = self.states.pop()?;
        Some((update, state))
    }

    pub fn start(&self) -> StateId {
        self.states[0]
    }

    pub fn end(&self) -> StateId {
        self.states[self.states.len() - 1]
    }

    /// Number of transitions on the path.
    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    pub fn contains_state(&self, state: StateId) -> bool {
        self.states.contains(&state)
    }

    /// Total update of the path, `None` on overflow.
    pub fn effect(&self) -> Option<Vector2> {
        sum_vectors(&self.updates)
    }

    pub fn has_repeated_state(&self) -> bool {
        !self.states.iter().all_unique()
    }

    pub fn to_fancy_string(&self) -> String {
        let mut result = self.start().to_string();
        for (update, state) in self.updates.iter().zip(self.states.iter().skip(1)) {
            result.push_str(&format!(" -{}-> {}", update, state));
        }
        result
    }
}

struct SimplePathSearch<'a> {
    vass: &'a VASS2,
    end: StateId,
    max_length: usize,
    visited: HashSet<StateId>,
    current: SimplePath,
    paths: Vec<SimplePath>,
}

impl SimplePathSearch<'_> {
    fn visit(&mut self) {
        if self.current.len() > self.max_length {
            return;
        }

        let state = self.current.end();
        if state == self.end {
            self.paths.push(self.current.clone());
            return;
        }

        let vass = self.vass;
        for transition in vass.get_transitions(state) {
            if transition.target == state || self.visited.contains(&transition.target) {
                continue;
            }

            self.visited.insert(transition.target);
            self.current.add(transition.update, transition.target);

            self.visit();

            self.current.pop();
            self.visited.remove(&transition.target);
        }
    }
}

/// Enumerates all simple paths from `start` to `end` with at most
/// `max_length` transitions, in depth first order.
///
/// Self-loops are never part of a simple path and the search stops at the
/// first arrival at `end`. For `start == end` the only result is the empty
/// path.
pub fn find_simple_paths(
    vass: &VASS2,
    start: StateId,
    end: StateId,
    max_length: usize,
) -> Vec<SimplePath> {
    let mut search = SimplePathSearch {
        vass,
        end,
        max_length,
        visited: HashSet::from([start]),
        current: SimplePath::new(start),
        paths: vec![],
    };

    search.visit();

    tracing::debug!(
        start = %start,
        end = %end,
        max_length = %max_length,
        paths = %search.paths.len(),
        "Simple paths"
    );

    search.paths
}
