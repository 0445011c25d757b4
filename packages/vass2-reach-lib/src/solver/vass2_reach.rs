use std::{
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
    time::{Duration, Instant},
};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    automaton::{
        StateId,
        lps::{
            LinearPathScheme,
            builder::{LPSBuilder, SearchBounds},
        },
        vass::{counter::Vector2, initialized::InitializedVASS2},
    },
    config::VASS2ReachConfig,
    solver::{
        SerializableSolverStatus, SolverResult, SolverStatus,
        lps_reach::{LPSReachOptions, is_reachable},
    },
};

/// The different reasons for the solver to give up.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VASS2ReachSolverError {
    /// We ran out of time.
    Timeout,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VASS2ReachSolverStatistics {
    pub path_count: usize,
    pub scheme_count: usize,
    pub schemes_checked: usize,
    pub candidates_checked: usize,
    pub bounds: Option<SearchBounds>,
    pub time: Duration,
}

/// A run from the initial to the final configuration, given by the scheme it
/// follows and the number of times each loop of the scheme is repeated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LPSWitness {
    /// Position of the scheme in generation order.
    pub scheme_index: usize,
    /// States of the simple path underlying the scheme.
    pub path: Vec<StateId>,
    pub iterations: Vec<u64>,
    /// Every counter valuation along the run.
    pub trace: Vec<Vector2>,
    #[serde(skip)]
    pub scheme: LinearPathScheme,
}

impl LPSWitness {
    fn new(
        scheme_index: usize,
        scheme: &LinearPathScheme,
        iterations: Vec<u64>,
        start: Vector2,
    ) -> Self {
        let trace = scheme.unfold(start, &iterations).unwrap_or_default();

        LPSWitness {
            scheme_index,
            path: scheme
                .path
                .as_ref()
                .map(|p| p.states.clone())
                .unwrap_or_default(),
            iterations,
            trace,
            scheme: scheme.clone(),
        }
    }
}

pub type VASS2ReachSolverStatus = SolverStatus<LPSWitness, (), VASS2ReachSolverError>;

pub type VASS2ReachSolverResult =
    SolverResult<LPSWitness, (), VASS2ReachSolverError, VASS2ReachSolverStatistics>;

/// Semi-decides reachability in a 2-dimensional VASS by trying the linear path
/// schemes along all simple paths from the initial to the final state.
#[derive(Debug)]
pub struct VASS2ReachSolver<'a> {
    ivass: &'a InitializedVASS2,
    config: VASS2ReachConfig,
    bounds: SearchBounds,
    options: LPSReachOptions,
    statistics: VASS2ReachSolverStatistics,
    solver_start_time: Option<Instant>,
}

impl<'a> VASS2ReachSolver<'a> {
    pub fn new(ivass: &'a InitializedVASS2, config: VASS2ReachConfig) -> Self {
        let bounds = config.search_bounds(ivass);
        let options = LPSReachOptions::from(config.get_candidates());

        VASS2ReachSolver {
            ivass,
            config,
            bounds,
            options,
            statistics: VASS2ReachSolverStatistics::default(),
            solver_start_time: None,
        }
    }

    pub fn solve(&mut self) -> VASS2ReachSolverResult {
        self.solver_start_time = Some(Instant::now());
        self.statistics = VASS2ReachSolverStatistics {
            bounds: Some(self.bounds),
            ..Default::default()
        };

        self.print_start_banner();

        // the search ends by returning its verdict as an error, running out of
        // schemes means no run was found
        let status = match self.solve_inner() {
            Ok(()) => SolverStatus::False(()),
            Err(status) => status,
        };
        self.statistics.time = self.get_solver_time().unwrap_or_default();

        let result = VASS2ReachSolverResult::new(status, self.statistics.clone());
        self.print_end_banner(&result);

        result
    }

    fn solve_inner(&mut self) -> Result<(), VASS2ReachSolverStatus> {
        if !self.ivass.is_final_state_connected() {
            tracing::info!("Final state is not reachable in the control graph");
            return Err(SolverStatus::False(()));
        }

        let schemes = LPSBuilder::new(&self.ivass.vass, self.bounds)
            .build(self.ivass.initial_state, self.ivass.final_state);

        self.statistics.path_count = schemes.iter().filter(|s| s.path.is_some()).count();
        self.statistics.scheme_count = schemes.len();

        tracing::info!(
            paths = %self.statistics.path_count,
            schemes = %self.statistics.scheme_count,
            "Schemes built"
        );

        self.max_time_reached()?;

        if *self.config.get_parallel() {
            self.check_schemes_parallel(&schemes)
        } else {
            self.check_schemes(&schemes)
        }
    }

    fn check_schemes(&mut self, schemes: &[LinearPathScheme]) -> Result<(), VASS2ReachSolverStatus> {
        for (index, scheme) in schemes.iter().enumerate() {
            self.max_time_reached()?;

            tracing::debug!(index = %index, scheme = %scheme.to_fancy_string(), "Checking scheme");

            let result = is_reachable(
                self.ivass.initial_valuation,
                self.ivass.final_valuation,
                scheme,
                &self.options,
            );

            self.statistics.schemes_checked += 1;
            self.statistics.candidates_checked += result.candidates_checked;

            if let Some(iterations) = result.iterations {
                tracing::info!(index = %index, iterations = ?iterations, "Found reaching scheme");

                return Err(SolverStatus::True(LPSWitness::new(
                    index,
                    scheme,
                    iterations,
                    self.ivass.initial_valuation,
                )));
            }
        }

        Ok(())
    }

    /// Checks all schemes on the rayon thread pool. If several schemes reach
    /// the target, the one generated first wins.
    fn check_schemes_parallel(
        &mut self,
        schemes: &[LinearPathScheme],
    ) -> Result<(), VASS2ReachSolverStatus> {
        let schemes_checked = AtomicUsize::new(0);
        let candidates_checked = AtomicUsize::new(0);
        let timed_out = AtomicBool::new(false);

        let start = self.ivass.initial_valuation;
        let target = self.ivass.final_valuation;
        let options = self.options;
        let solver: &Self = self;

        let found = schemes
            .par_iter()
            .enumerate()
            .find_map_first(|(index, scheme)| {
                if solver.max_time_reached().is_err() {
                    timed_out.store(true, Ordering::Relaxed);
                    return None;
                }

                let result = is_reachable(start, target, scheme, &options);

                schemes_checked.fetch_add(1, Ordering::Relaxed);
                candidates_checked.fetch_add(result.candidates_checked, Ordering::Relaxed);

                result.iterations.map(|iterations| (index, iterations))
            });

        self.statistics.schemes_checked += schemes_checked.into_inner();
        self.statistics.candidates_checked += candidates_checked.into_inner();

        match found {
            Some((index, iterations)) => {
                tracing::info!(index = %index, iterations = ?iterations, "Found reaching scheme");

                Err(SolverStatus::True(LPSWitness::new(
                    index,
                    &schemes[index],
                    iterations,
                    start,
                )))
            }
            None if timed_out.load(Ordering::Relaxed) => {
                Err(SolverStatus::Unknown(VASS2ReachSolverError::Timeout))
            }
            None => Ok(()),
        }
    }

    fn max_time_reached(&self) -> Result<(), VASS2ReachSolverStatus> {
        if let Some(t) = self.get_solver_time()
            && let Some(max_time) = self.config.get_timeout()
            && &t > max_time
        {
            return Err(SolverStatus::Unknown(VASS2ReachSolverError::Timeout));
        }

        Ok(())
    }

    pub fn get_bounds(&self) -> SearchBounds {
        self.bounds
    }

    fn get_solver_time(&self) -> Option<Duration> {
        self.solver_start_time.map(|x| x.elapsed())
    }

    fn print_start_banner(&self) {
        tracing::info!(
            states = %self.ivass.state_count(),
            transitions = %self.ivass.transition_count(),
            initial = %format!("{} {}", self.ivass.initial_state, self.ivass.initial_valuation),
            target = %format!("{} {}", self.ivass.final_state, self.ivass.final_valuation),
            max_path_length = %self.bounds.max_path_length,
            max_cycles = %self.bounds.max_cycles,
            parallel = %self.config.get_parallel(),
            "Solver Info"
        );
    }

    fn print_end_banner(&self, result: &VASS2ReachSolverResult) {
        tracing::info!(
            result = ?SerializableSolverStatus::from(&result.status),
            paths = %result.statistics.path_count,
            schemes = %result.statistics.scheme_count,
            schemes_checked = %result.statistics.schemes_checked,
            candidates_checked = %result.statistics.candidates_checked,
            time = ?result.statistics.time,
            "Result"
        );
    }
}
