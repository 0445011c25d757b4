use hashbrown::HashSet;
use itertools::Itertools;

use crate::automaton::{
    StateId,
    vass::{
        VASS2,
        counter::{Vector2, sum_vectors},
    },
};

/// A cycle of the control graph, reduced to what matters for repeating it.
///
/// `guard` is the smallest valuation from which one traversal of the cycle
/// keeps both counters non-negative, so it never has negative components.
/// `updates` holds the single transitions of the cycle in order. Summary loops
/// built with [Loop::new] have no updates and are traversed as one step.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Loop {
    pub effect: Vector2,
    pub guard: Vector2,
    pub updates: Vec<Vector2>,
}

impl Loop {
    pub fn new(effect: Vector2, guard: Vector2) -> Self {
        Loop {
            effect,
            guard,
            updates: vec![],
        }
    }

    /// Summarizes the transitions of a cycle. Returns `None` if a running
    /// sum leaves the range of `i64`, such a cycle can never be traversed.
    pub fn from_updates(updates: Vec<Vector2>) -> Option<Self> {
        Some(Loop {
            effect: sum_vectors(&updates)?,
            guard: compute_guard(&updates)?,
            updates,
        })
    }

    pub fn is_summary(&self) -> bool {
        self.updates.is_empty()
    }

    /// Whether one traversal can start at `valuation`.
    pub fn is_enabled(&self, valuation: &Vector2) -> bool {
        valuation.covers(&self.guard)
    }

    pub fn to_fancy_string(&self) -> String {
        format!("loop {} [guard {}]", self.effect, self.guard)
    }
}

/// Negated minimum of the running sums of `updates`, starting at zero.
///
/// ```
/// use vass2_reach_lib::automaton::{cycle::compute_guard, vass::counter::Vector2};
///
/// let guard = compute_guard(&[Vector2::new(3, -1), Vector2::new(-5, 2)]);
/// assert_eq!(guard, Some(Vector2::new(2, 1)));
/// ```
///
/// Returns `None` on overflow.
pub fn compute_guard(updates: &[Vector2]) -> Option<Vector2> {
    let mut current = Vector2::ZERO;
    let mut minimum = Vector2::ZERO;

    for update in updates {
        current = current.checked_add(update)?;
        minimum = minimum.component_min(&current);
    }

    minimum.checked_neg()
}

struct CycleSearch<'a> {
    vass: &'a VASS2,
    root: StateId,
    visited: HashSet<StateId>,
    updates: Vec<Vector2>,
    cycles: Vec<Loop>,
}

impl CycleSearch<'_> {
    fn visit(&mut self, state: StateId) {
        let vass = self.vass;

        for transition in vass.get_transitions(state) {
            if transition.target == self.root {
                // self-loops of the root are collected separately
                if state != self.root {
                    let mut updates = self.updates.clone();
                    updates.push(transition.update);
                    self.cycles.extend(Loop::from_updates(updates));
                }
            } else if !self.visited.contains(&transition.target) {
                self.visited.insert(transition.target);
                self.updates.push(transition.update);

                self.visit(transition.target);

                self.updates.pop();
                self.visited.remove(&transition.target);
            }
        }
    }
}

/// Finds the cycles starting and ending in `state` that visit no other state
/// twice. Self-loops come first, then the longer cycles in depth first order.
/// Cycles with the same effect and guard are only reported once, cycles whose
/// running sums overflow are left out.
pub fn find_cycles(vass: &VASS2, state: StateId) -> Vec<Loop> {
    let self_loops = vass
        .get_transitions(state)
        .iter()
        .filter(|t| t.target == state)
        .filter_map(|t| Loop::from_updates(vec![t.update]));

    let mut search = CycleSearch {
        vass,
        root: state,
        visited: HashSet::from([state]),
        updates: vec![],
        cycles: vec![],
    };
    search.visit(state);

    self_loops
        .chain(search.cycles)
        .unique_by(|l| (l.effect, l.guard))
        .collect()
}
