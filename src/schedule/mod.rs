pub mod types;
pub mod slot_utils;
pub mod fixtures;
pub mod constraints;
pub mod move_chain;
pub mod generic;
pub mod pool;
pub mod bracket;
pub mod assemble;
pub mod validate;
pub mod swap;

pub use types::{
    DayWindow, Division, DivisionId, Phase, PhaseKind, ScheduleOutcome, ScheduledGame, TournamentSettings,
};
pub use slot_utils::build_slot_grid;
pub use fixtures::generate_fixtures;
pub use assemble::{generate_outcome, generate_schedule};
pub use validate::{detect_warnings, ScheduleWarning, WarningKind};
pub use swap::{apply_manual_swap, SlotRef};
