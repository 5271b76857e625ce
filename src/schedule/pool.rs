use crate::error::{PhaseGroup, ScheduleResult};
use super::constraints::PhaseRules;
use super::generic::{schedule_phase, DivisionPlan, PhasePlan, PhaseSchedule, Scoring};
use super::types::{Division, Slot, TournamentSettings};

/// Schedules every Pool Play division into the slot grid
///
/// Pool entrants are held to the daily cap and ranked by first appearance,
/// first game of the day and remaining games. Divisions of other phases and
/// divisions with fewer than two entrants are skipped.
pub fn schedule_pool_phase(
    divisions: &[Division],
    slots: &[Slot],
    settings: &TournamentSettings,
) -> ScheduleResult<PhaseSchedule> {
    let plan = PhasePlan {
        group: PhaseGroup::Pool,
        divisions: divisions
            .iter()
            .filter(|d| d.kind().is_pool() && d.is_schedulable())
            .map(|division| DivisionPlan {
                division,
                rules: PhaseRules {
                    daily_cap: division.daily_cap(settings),
                    not_before: 0,
                },
            })
            .collect(),
        scoring: Scoring::Priority,
    };
    schedule_phase(&plan, slots, settings)
}
