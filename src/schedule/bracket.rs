use std::collections::HashMap;

use log::debug;

use crate::error::{PhaseGroup, ScheduleError, ScheduleResult};
use super::constraints::PhaseRules;
use super::generic::{schedule_phase, DivisionPlan, PhasePlan, PhaseSchedule, Scoring};
use super::types::{Division, DivisionId, Slot, TournamentSettings};

/// Earliest minute a bracket division may start: the latest finish among
/// its pool dependencies plus the minimum break
pub fn earliest_start(
    division: &Division,
    finish_times: &HashMap<DivisionId, u32>,
    settings: &TournamentSettings,
) -> ScheduleResult<u32> {
    let mut latest = 0;
    for dependency in division.phase.dependencies() {
        let finish = finish_times.get(dependency).ok_or_else(|| ScheduleError::Dependency {
            division: division.name.clone(),
            dependency: dependency.to_string(),
        })?;
        latest = latest.max(*finish);
    }
    Ok(latest.saturating_add(settings.min_break))
}

/// Schedules Championship and Consolation divisions into the slots the pool phase left open
///
/// Each division is gated on its dependencies finishing. There is no daily
/// cap and candidates are taken in fixed (division, entrant) order.
pub fn schedule_bracket_phase(
    divisions: &[Division],
    open_slots: &[Slot],
    finish_times: &HashMap<DivisionId, u32>,
    settings: &TournamentSettings,
) -> ScheduleResult<PhaseSchedule> {
    let mut plans = Vec::new();
    for division in divisions
        .iter()
        .filter(|d| !d.kind().is_pool() && d.is_schedulable())
    {
        let not_before = earliest_start(division, finish_times, settings)?;
        debug!("bracket division {} may start at minute {}", division.id, not_before);
        plans.push(DivisionPlan {
            division,
            rules: PhaseRules {
                daily_cap: None,
                not_before,
            },
        });
    }

    let plan = PhasePlan {
        group: PhaseGroup::Bracket,
        divisions: plans,
        scoring: Scoring::Ordered,
    };
    schedule_phase(&plan, open_slots, settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::slot_utils::sorted_slot_grid;
    use crate::schedule::types::DayWindow;

    fn settings(min_break: u32) -> TournamentSettings {
        TournamentSettings {
            courts: 1,
            days: 1,
            day_times: vec![DayWindow {
                day: 1,
                start_time: "09:00".to_string(),
                end_time: "16:00".to_string(),
            }],
            game_duration: 60,
            min_break,
            max_break: None,
            daily_cap: 2,
        }
    }

    #[test]
    fn test_gate_is_latest_dependency_plus_break() {
        let s = settings(30);
        let finish: HashMap<DivisionId, u32> = [("a".into(), 600), ("b".into(), 720)].into_iter().collect();
        let division = Division::championship("c", "Finals", 2, &["a", "b"]);
        assert_eq!(earliest_start(&division, &finish, &s).unwrap(), 750);

        let no_deps = Division::consolation("d", "Plate", 2, &[]);
        assert_eq!(earliest_start(&no_deps, &finish, &s).unwrap(), 30);
    }

    #[test]
    fn test_unknown_dependency_is_named() {
        let s = settings(30);
        let division = Division::championship("c", "Finals", 2, &["ghost"]);
        assert_eq!(
            earliest_start(&division, &HashMap::new(), &s).unwrap_err(),
            ScheduleError::Dependency {
                division: "Finals".to_string(),
                dependency: "ghost".to_string()
            }
        );
    }

    #[test]
    fn test_no_bracket_game_before_gate() {
        let s = settings(30);
        let slots = sorted_slot_grid(&s);
        let finish: HashMap<DivisionId, u32> = [("a".into(), 600)].into_iter().collect();
        let divisions = vec![Division::championship("c", "Finals", 3, &["a"])];
        let schedule = schedule_bracket_phase(&divisions, &slots, &finish, &s).unwrap();
        assert_eq!(schedule.games.len(), 3);
        assert!(schedule.games.iter().all(|g| g.abs_time >= 630));
        // The gate is 10:30; the first hourly slot after it is 11:00
        assert_eq!(schedule.games[0].abs_time, 660);
    }

    #[test]
    fn test_bracket_has_no_daily_cap() {
        let s = settings(0);
        let slots = sorted_slot_grid(&s);
        let divisions = vec![Division::consolation("c", "Plate", 4, &[])];
        let schedule = schedule_bracket_phase(&divisions, &slots, &HashMap::new(), &s).unwrap();
        assert_eq!(schedule.games.len(), 6);
        let team0 = schedule
            .games
            .iter()
            .filter(|g| g.team1_index == 0 || g.team2_index == 0)
            .count();
        assert_eq!(team0, 3);
    }
}
