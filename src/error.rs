use thiserror::Error;

/// Which scheduling pass a placement failure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseGroup {
    Pool,
    Bracket,
}

impl std::fmt::Display for PhaseGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhaseGroup::Pool => write!(f, "Pool Play"),
            PhaseGroup::Bracket => write!(f, "bracket"),
        }
    }
}

/// Errors produced by the scheduling engine
///
/// Any of these means "no usable schedule". The messages are meant to be
/// shown to the organiser verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// Fewer slots than required matches, detected before placement
    #[error("Scheduling failed: need {need} games, but only have {have} time slots. Add courts or days, or widen the daily start/end times.")]
    Capacity { need: usize, have: usize },

    /// Greedy placement and eviction repair left matches unplaced
    #[error("Could not schedule all {phase} games due to time constraints. {remaining} games remaining.")]
    Placement { phase: PhaseGroup, remaining: usize },

    /// A bracket division points at a pool division that is unknown or never finished
    #[error("Could not schedule bracket division \"{division}\" because its dependent pool division \"{dependency}\" was not found or did not finish.")]
    Dependency { division: String, dependency: String },

    /// Malformed settings or divisions
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Final completeness check failed after both phases
    #[error("Scheduling failed. Only {placed} of {required} games could be placed. Try adding more time or courts.")]
    Shortfall { placed: usize, required: usize },

    /// Manual edit referenced a match that is not in the schedule
    #[error("Match {0} was not found in the schedule")]
    UnknownMatch(String),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
