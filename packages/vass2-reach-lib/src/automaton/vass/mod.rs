use hashbrown::HashMap;
use initialized::InitializedVASS2;
use itertools::Itertools;
use petgraph::{
    algo::has_path_connecting,
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
};
use serde::{Deserialize, Serialize};

use crate::automaton::{StateId, vass::counter::Vector2};

pub mod counter;
pub mod initialized;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transition {
    pub target: StateId,
    pub update: Vector2,
}

impl Transition {
    pub fn new(target: StateId, update: Vector2) -> Self {
        Transition { target, update }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VASSState {
    pub id: StateId,
    /// Outgoing transitions in insertion order. The order only matters for
    /// the order in which paths and cycles are enumerated.
    pub transitions: Vec<Transition>,
}

impl VASSState {
    pub fn new(id: StateId) -> Self {
        VASSState {
            id,
            transitions: vec![],
        }
    }
}

/// A 2-dimensional VASS. Transitions may point to states that were never
/// added, such states are dead ends without outgoing transitions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VASS2 {
    states: HashMap<StateId, VASSState>,
}

impl VASS2 {
    pub fn new() -> Self {
        VASS2 {
            states: HashMap::new(),
        }
    }

    pub fn init(
        self,
        initial_valuation: Vector2,
        final_valuation: Vector2,
        initial_state: StateId,
        final_state: StateId,
    ) -> InitializedVASS2 {
        InitializedVASS2 {
            vass: self,
            initial_valuation,
            final_valuation,
            initial_state,
            final_state,
        }
    }

    /// Adds a state without transitions. Adding an existing state does
    /// nothing.
    pub fn add_state(&mut self, id: StateId) {
        self.states.entry(id).or_insert_with(|| VASSState::new(id));
    }

    /// Adds a transition, creating the source state if needed. The target is
    /// not created.
    pub fn add_transition(&mut self, from: StateId, to: StateId, update: Vector2) {
        self.states
            .entry(from)
            .or_insert_with(|| VASSState::new(from))
            .transitions
            .push(Transition::new(to, update));
    }

    /// Returns the outgoing transitions of a state. Unknown states are dead
    /// ends, so they yield an empty slice.
    pub fn get_transitions(&self, state: StateId) -> &[Transition] {
        self.states
            .get(&state)
            .map(|s| s.transitions.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains_state(&self, state: StateId) -> bool {
        self.states.contains_key(&state)
    }

    /// All known state ids in ascending order.
    pub fn state_ids(&self) -> Vec<StateId> {
        self.states.keys().copied().sorted().collect()
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn transition_count(&self) -> usize {
        self.states.values().map(|s| s.transitions.len()).sum()
    }

    /// Builds a petgraph representation. Dead end targets become nodes as
    /// well, so the returned map contains every state id that occurs anywhere.
    pub fn to_graph(&self) -> (DiGraph<StateId, Vector2>, HashMap<StateId, NodeIndex>) {
        let mut graph = DiGraph::new();
        let mut node_map = HashMap::new();

        let mut node_of = |graph: &mut DiGraph<StateId, Vector2>, id: StateId| {
            *node_map.entry(id).or_insert_with(|| graph.add_node(id))
        };

        for id in self.state_ids() {
            node_of(&mut graph, id);
        }

        for id in self.state_ids() {
            let source = node_of(&mut graph, id);
            for transition in self.get_transitions(id) {
                let target = node_of(&mut graph, transition.target);
                graph.add_edge(source, target, transition.update);
            }
        }

        (graph, node_map)
    }

    /// Checks whether `to` is reachable from `from` in the underlying graph,
    /// ignoring the counters entirely.
    pub fn can_reach(&self, from: StateId, to: StateId) -> bool {
        if from == to {
            return true;
        }

        let (graph, node_map) = self.to_graph();
        match (node_map.get(&from), node_map.get(&to)) {
            (Some(&a), Some(&b)) => has_path_connecting(&graph, a, b, None),
            _ => false,
        }
    }

    pub fn to_graphviz(&self, initial_state: Option<StateId>, final_state: Option<StateId>) -> String {
        let (graph, _) = self.to_graph();

        let mut dot = String::new();
        dot.push_str("digraph finite_state_machine {\n");
        dot.push_str("fontname=\"Helvetica,Arial,sans-serif\"\n");
        dot.push_str("node [fontname=\"Helvetica,Arial,sans-serif\"]\n");
        dot.push_str("edge [fontname=\"Helvetica,Arial,sans-serif\"]\n");
        dot.push_str("rankdir=LR;\n");

        if let Some(state) = final_state {
            dot.push_str(&format!("node [shape = doublecircle]; {};\n", state));
        }
        dot.push_str("node [shape = circle];\n");

        if let Some(state) = initial_state {
            dot.push_str("node [shape=point,label=\"\"]START\n");
            dot.push_str(&format!("START -> {};\n", state));
        }

        for node in graph.node_indices() {
            dot.push_str(&format!("{} [ label=\"{}\" ];\n", graph[node], graph[node]));
        }

        for edge in graph.edge_references() {
            dot.push_str(&format!(
                "{} -> {} [ label=\"{}\" ];\n",
                graph[edge.source()],
                graph[edge.target()],
                edge.weight()
            ));
        }

        dot.push_str("}\n");

        dot
    }

    pub fn to_fancy_string(&self) -> String {
        self.state_ids()
            .into_iter()
            .map(|id| {
                let transitions = self
                    .get_transitions(id)
                    .iter()
                    .map(|t| format!("-{}-> {}", t.update, t.target))
                    .join(", ");
                format!("{}: [{}]", id, transitions)
            })
            .join("\n")
    }
}
