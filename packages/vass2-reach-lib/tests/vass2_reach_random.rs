use std::time::Duration;

use rand::{Rng, SeedableRng, rngs::StdRng};
use vass2_reach_lib::{
    automaton::vass::{VASS2, counter::Vector2, initialized::InitializedVASS2},
    config::VASS2ReachConfig,
    solver::{SerializableSolverStatus, SolverStatus, vass2_reach::VASS2ReachSolver},
};

pub struct RandomOptions {
    pub seed: u64,
    pub count: usize,
    pub config: VASS2ReachConfig,
}

impl Default for RandomOptions {
    fn default() -> Self {
        RandomOptions {
            seed: 1,
            count: 20,
            config: VASS2ReachConfig::default()
                .with_timeout(Some(Duration::from_secs(10)))
                .with_max_cycles(Some(4)),
        }
    }
}

impl RandomOptions {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn with_config(mut self, config: VASS2ReachConfig) -> Self {
        self.config = config;
        self
    }
}

fn random_vass(
    r: &mut StdRng,
    state_count: u32,
    transition_count: usize,
    max_update: i64,
) -> InitializedVASS2 {
    let mut vass = VASS2::new();

    for state in 0..state_count {
        vass.add_state(state);
    }

    for _ in 0..transition_count {
        let from = r.gen_range(0..state_count);
        let to = r.gen_range(0..state_count);
        let update = Vector2::new(
            r.gen_range(-max_update..=max_update),
            r.gen_range(-max_update..=max_update),
        );

        vass.add_transition(from, to, update);
    }

    let initial = Vector2::new(r.gen_range(0..=max_update), r.gen_range(0..=max_update));
    let target = Vector2::new(r.gen_range(0..=max_update), r.gen_range(0..=max_update));

    vass.init(initial, target, 0, state_count - 1)
}

/// Solves random instances and checks every reported run by replaying it.
fn random_vass_test(
    options: RandomOptions,
    state_count: u32,
    transition_count: usize,
    max_update: i64,
) -> usize {
    let mut r = StdRng::seed_from_u64(options.seed);
    let mut solved = 0;

    println!();
    println!("Solving {} random 2-VASS", options.count);
    println!("states: {}", state_count);
    println!("transitions: {}", transition_count);
    println!("max update: {}", max_update);
    println!();

    for i in 0..options.count {
        let ivass = random_vass(&mut r, state_count, transition_count, max_update);
        let res = VASS2ReachSolver::new(&ivass, options.config.clone()).solve();

        println!("{}: {:?}", i, SerializableSolverStatus::from(&res.status));

        match &res.status {
            SolverStatus::True(witness) => {
                solved += 1;

                assert_eq!(witness.trace.first(), Some(&ivass.initial_valuation));
                assert_eq!(witness.trace.last(), Some(&ivass.final_valuation));
                assert!(
                    witness.trace.iter().all(|v| v.is_non_negative()),
                    "negative counter in {:?}",
                    witness.trace
                );
                assert_eq!(
                    witness.scheme.unfold(ivass.initial_valuation, &witness.iterations),
                    Some(witness.trace.clone())
                );
            }
            SolverStatus::False(_) => {
                assert_eq!(
                    res.statistics.schemes_checked,
                    res.statistics.scheme_count
                );
            }
            SolverStatus::Unknown(_) => {}
        }
    }

    println!("Reachable in {solved} of {}", options.count);

    solved
}

#[test]
fn test_random_small() {
    random_vass_test(RandomOptions::default(), 3, 5, 2);
}

#[test]
fn test_random_medium() {
    random_vass_test(RandomOptions::default().with_seed(7).with_count(10), 5, 9, 3);
}

#[test]
fn test_random_parallel_agrees() {
    let options = RandomOptions::default().with_seed(3).with_count(10);
    let parallel = RandomOptions::default()
        .with_seed(3)
        .with_count(10)
        .with_config(options.config.clone().with_parallel(true));

    assert_eq!(
        random_vass_test(options, 4, 7, 2),
        random_vass_test(parallel, 4, 7, 2)
    );
}

#[test]
fn test_random_trivial_target() {
    // the initial configuration is reachable with the empty run whenever the
    // initial state is final
    let mut r = StdRng::seed_from_u64(11);

    for _ in 0..10 {
        let mut ivass = random_vass(&mut r, 1, 3, 3);
        ivass.final_valuation = ivass.initial_valuation;

        let res = VASS2ReachSolver::new(&ivass, VASS2ReachConfig::default()).solve();
        assert!(res.is_success());
        assert!(res.unwrap_success().iterations.iter().all(|&c| c == 0));
    }
}
