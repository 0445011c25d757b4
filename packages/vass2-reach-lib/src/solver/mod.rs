use serde::{Deserialize, Serialize};

pub mod lattice;
pub mod lps_reach;
pub mod vass2_reach;

/// Outcome of a solver run. `True` carries a proof of reachability, `False`
/// a proof (or exhaustion) of the opposite, `Unknown` why the solver gave up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverStatus<T = (), F = (), U = ()> {
    True(T),
    False(F),
    Unknown(U),
}

impl<T, F, U> SolverStatus<T, F, U> {
    pub fn is_success(&self) -> bool {
        matches!(self, SolverStatus::True(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, SolverStatus::False(_))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, SolverStatus::Unknown(_))
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            SolverStatus::True(t) => Some(t),
            _ => None,
        }
    }

    pub fn unwrap_success(self) -> T {
        match self {
            SolverStatus::True(t) => t,
            _ => panic!("Called unwrap_success on a non-successful SolverStatus"),
        }
    }

    pub fn unwrap_failure(self) -> F {
        match self {
            SolverStatus::False(f) => f,
            _ => panic!("Called unwrap_failure on a non-failure SolverStatus"),
        }
    }

    pub fn unwrap_unknown(self) -> U {
        match self {
            SolverStatus::Unknown(u) => u,
            _ => panic!("Called unwrap_unknown on a non-unknown SolverStatus"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverResult<T = (), F = (), U = (), Statistics = ()> {
    pub status: SolverStatus<T, F, U>,
    pub statistics: Statistics,
}

impl<T, F, U, Statistics> SolverResult<T, F, U, Statistics> {
    pub fn new(status: SolverStatus<T, F, U>, statistics: Statistics) -> Self {
        Self { status, statistics }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn is_failure(&self) -> bool {
        self.status.is_failure()
    }

    pub fn is_unknown(&self) -> bool {
        self.status.is_unknown()
    }

    pub fn success(&self) -> Option<&T> {
        self.status.success()
    }

    pub fn unwrap_success(self) -> T {
        self.status.unwrap_success()
    }

    pub fn unwrap_failure(self) -> F {
        self.status.unwrap_failure()
    }

    pub fn unwrap_unknown(self) -> U {
        self.status.unwrap_unknown()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SerializableSolverStatus {
    True,
    False,
    Unknown,
}

impl<T, F, U> From<&SolverStatus<T, F, U>> for SerializableSolverStatus {
    fn from(status: &SolverStatus<T, F, U>) -> Self {
        match status {
            SolverStatus::True(_) => SerializableSolverStatus::True,
            SolverStatus::False(_) => SerializableSolverStatus::False,
            SolverStatus::Unknown(_) => SerializableSolverStatus::Unknown,
        }
    }
}

impl SerializableSolverStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, SerializableSolverStatus::True)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, SerializableSolverStatus::False)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, SerializableSolverStatus::Unknown)
    }
}

/// Report form of a [SolverResult]: the status without its payload, the
/// success payload (if any) and the statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableSolverResult<Witness = (), Statistics = ()> {
    pub status: SerializableSolverStatus,
    pub witness: Option<Witness>,
    pub statistics: Statistics,
}

impl<Witness, Statistics> SerializableSolverResult<Witness, Statistics> {
    pub fn new(
        status: SerializableSolverStatus,
        witness: Option<Witness>,
        statistics: Statistics,
    ) -> Self {
        Self {
            status,
            witness,
            statistics,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn is_failure(&self) -> bool {
        self.status.is_failure()
    }

    pub fn is_unknown(&self) -> bool {
        self.status.is_unknown()
    }
}

impl<T, F, U, Statistics> From<SolverResult<T, F, U, Statistics>>
    for SerializableSolverResult<T, Statistics>
{
    fn from(result: SolverResult<T, F, U, Statistics>) -> Self {
        let status = SerializableSolverStatus::from(&result.status);
        let witness = match result.status {
            SolverStatus::True(t) => Some(t),
            _ => None,
        };

        SerializableSolverResult::new(status, witness, result.statistics)
    }
}
