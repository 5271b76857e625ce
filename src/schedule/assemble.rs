use std::collections::HashMap;

use log::{info, warn};

use crate::error::{ScheduleError, ScheduleResult};
use super::bracket::schedule_bracket_phase;
use super::fixtures::required_matches;
use super::pool::schedule_pool_phase;
use super::slot_utils::sorted_slot_grid;
use super::types::{
    sort_games, Division, DivisionId, PhaseKind, ScheduleOutcome, ScheduledGame, TournamentSettings, MAX_ENTRANTS,
};

/// Checks division ids are unique and that bracket dependencies, when they
/// name a known division, name a Pool Play one
///
/// Dependencies on unknown ids are left for the bracket phase to report.
pub fn validate_divisions(divisions: &[Division]) -> ScheduleResult<()> {
    let mut kinds: HashMap<&DivisionId, PhaseKind> = HashMap::new();
    for division in divisions {
        if division.entrant_count() > MAX_ENTRANTS {
            return Err(ScheduleError::Configuration(format!(
                "division \"{}\" has {} teams; at most {} are supported",
                division.name,
                division.entrant_count(),
                MAX_ENTRANTS
            )));
        }
        if kinds.insert(&division.id, division.kind()).is_some() {
            return Err(ScheduleError::Configuration(format!(
                "division id {} is used more than once",
                division.id
            )));
        }
    }

    for division in divisions {
        for dependency in division.phase.dependencies() {
            match kinds.get(dependency) {
                Some(kind) if !kind.is_pool() => {
                    return Err(ScheduleError::Configuration(format!(
                        "division \"{}\" depends on \"{}\", which is a {} division, not Pool Play",
                        division.name, dependency, kind
                    )));
                }
                _ => {}
            }
        }
    }
    Ok(())
}

/// Total matches the tournament needs, over divisions with two or more entrants
pub fn total_required(divisions: &[Division]) -> usize {
    divisions.iter().map(required_matches).sum()
}

/// Builds the full tournament schedule
///
/// Pool Play goes first over the whole grid, then brackets over whatever is
/// left. On success every required game is placed and the list is ordered
/// by time then court, with ids `game-1`, `game-2`, ... in that order.
pub fn generate_schedule(
    settings: &TournamentSettings,
    divisions: &[Division],
) -> ScheduleResult<Vec<ScheduledGame>> {
    settings.validate()?;
    validate_divisions(divisions)?;

    let valid: Vec<Division> = divisions.iter().filter(|d| d.is_schedulable()).cloned().collect();
    let required = total_required(&valid);

    let slots = sorted_slot_grid(settings);
    if slots.len() < required {
        warn!("capacity check failed: need {} games, have {} slots", required, slots.len());
        return Err(ScheduleError::Capacity {
            need: required,
            have: slots.len(),
        });
    }

    // 1. Pool play over the whole grid
    let pool = schedule_pool_phase(&valid, &slots, settings)?;

    // 2. Brackets over the slots pool play left open
    let open_slots: Vec<_> = slots
        .iter()
        .enumerate()
        .filter(|(idx, _)| !pool.occupied.contains(idx))
        .map(|(_, slot)| slot.clone())
        .collect();
    let bracket = schedule_bracket_phase(&valid, &open_slots, &pool.finish_times, settings)?;

    let mut games = pool.games;
    games.extend(bracket.games);

    if games.len() < required {
        return Err(ScheduleError::Shortfall {
            placed: games.len(),
            required,
        });
    }

    sort_games(&mut games);
    for (i, game) in games.iter_mut().enumerate() {
        game.id = format!("game-{}", i + 1);
    }
    info!("schedule complete: {} games over {} slots", games.len(), slots.len());
    Ok(games)
}

/// [`generate_schedule`] in the `{ error, games }` shape
pub fn generate_outcome(settings: &TournamentSettings, divisions: &[Division]) -> ScheduleOutcome {
    generate_schedule(settings, divisions).into()
}
