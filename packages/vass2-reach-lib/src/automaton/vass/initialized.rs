use anyhow::Context;
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::automaton::{
    StateId,
    vass::{VASS2, counter::Vector2},
};

/// A 2-dimensional VASS together with the reachability query on it: an
/// initial configuration and a final configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitializedVASS2 {
    pub vass: VASS2,
    pub initial_valuation: Vector2,
    pub final_valuation: Vector2,
    pub initial_state: StateId,
    pub final_state: StateId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct TransitionSpec {
    from: StateId,
    to: StateId,
    vector: Vector2,
}

/// On-disk format of an [InitializedVASS2].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct InitializedVASS2Spec {
    states: Vec<StateId>,
    transitions: Vec<TransitionSpec>,
    initial_state: StateId,
    final_state: StateId,
    initial_vector: Vector2,
    final_vector: Vector2,
}

impl From<InitializedVASS2Spec> for InitializedVASS2 {
    fn from(spec: InitializedVASS2Spec) -> Self {
        let mut vass = VASS2::new();
        let listed: HashSet<StateId> = spec.states.iter().copied().collect();

        for state in &spec.states {
            vass.add_state(*state);
        }

        // transitions out of unlisted states can never be taken
        for transition in spec.transitions {
            if listed.contains(&transition.from) {
                vass.add_transition(transition.from, transition.to, transition.vector);
            }
        }

        vass.init(
            spec.initial_vector,
            spec.final_vector,
            spec.initial_state,
            spec.final_state,
        )
    }
}

impl From<&InitializedVASS2> for InitializedVASS2Spec {
    fn from(ivass: &InitializedVASS2) -> Self {
        let states = ivass.vass.state_ids();
        let transitions = states
            .iter()
            .flat_map(|&from| {
                ivass
                    .vass
                    .get_transitions(from)
                    .iter()
                    .map(move |t| TransitionSpec {
                        from,
                        to: t.target,
                        vector: t.update,
                    })
            })
            .collect();

        InitializedVASS2Spec {
            states,
            transitions,
            initial_state: ivass.initial_state,
            final_state: ivass.final_state,
            initial_vector: ivass.initial_valuation,
            final_vector: ivass.final_valuation,
        }
    }
}

impl InitializedVASS2 {
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(&InitializedVASS2Spec::from(self))?)
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let spec: InitializedVASS2Spec =
            serde_json::from_str(json).context("failed to parse VASS json")?;
        Ok(spec.into())
    }

    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let path = std::path::Path::new(path);
        match path.extension() {
            Some(ext) if ext == "json" => {
                let json_str = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                Self::from_json(&json_str)
            }
            _ => Err(anyhow::anyhow!(
                "Unsupported file extension: {:?}",
                path.extension()
            )),
        }
    }

    pub fn state_count(&self) -> usize {
        self.vass.state_count()
    }

    pub fn transition_count(&self) -> usize {
        self.vass.transition_count()
    }

    /// Checks that the final state is reachable from the initial state in the
    /// control graph, which is necessary for any run to exist.
    pub fn is_final_state_connected(&self) -> bool {
        self.vass.can_reach(self.initial_state, self.final_state)
    }
}
