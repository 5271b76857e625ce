use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{ScheduleError, ScheduleResult};
use super::slot_utils::{absolute_minutes, minutes_to_time_string, parse_time_to_minutes};
use super::types::{sort_games, ScheduledGame};

/// A (day, court, time) position picked by the organiser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRef {
    pub day: u32,
    pub court: u32,
    pub time: String,
}

/// Moves `match_id` to `target`, exchanging slots with whatever game is there
///
/// No constraint is enforced here; run the schedule through
/// [`detect_warnings`](super::validate::detect_warnings) afterwards.
pub fn apply_manual_swap(
    mut games: Vec<ScheduledGame>,
    match_id: &str,
    target: &SlotRef,
) -> ScheduleResult<Vec<ScheduledGame>> {
    let moved = games
        .iter()
        .position(|g| g.id == match_id)
        .ok_or_else(|| ScheduleError::UnknownMatch(match_id.to_string()))?;

    let bad_target = || {
        ScheduleError::Configuration(format!(
            "\"{}\" on day {} is not a valid target slot",
            target.time, target.day
        ))
    };
    let clock = parse_time_to_minutes(&target.time).ok_or_else(bad_target)?;
    let abs_time = absolute_minutes(target.day, &target.time).ok_or_else(bad_target)?;
    if target.court == 0 {
        return Err(bad_target());
    }

    // An edited schedule may hold more than one game in the target slot
    let occupant = games
        .iter()
        .enumerate()
        .find(|(i, g)| *i != moved && g.day == target.day && g.court == target.court && g.abs_time == abs_time)
        .map(|(i, _)| i);

    if let Some(other) = occupant {
        let (day, court, time, abs) = {
            let g = &games[moved];
            (g.day, g.court, g.time.clone(), g.abs_time)
        };
        let displaced = &mut games[other];
        debug!("swap: {} takes the slot of {}", displaced.id, match_id);
        displaced.day = day;
        displaced.court = court;
        displaced.time = time;
        displaced.abs_time = abs;
    }

    let game = &mut games[moved];
    game.day = target.day;
    game.court = target.court;
    game.time = minutes_to_time_string(clock);
    game.abs_time = abs_time;

    sort_games(&mut games);
    Ok(games)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::types::{Division, Slot};

    fn game(id: &str, teams: (usize, usize), day: u32, court: u32, time: &str) -> ScheduledGame {
        let division = Division::pool("a", "A", 4);
        let slot = Slot {
            day,
            court,
            time: time.to_string(),
            abs_time: absolute_minutes(day, time).unwrap(),
        };
        let mut g = ScheduledGame::new(&division, teams.0, teams.1, &slot);
        g.id = id.to_string();
        g
    }

    fn target(day: u32, court: u32, time: &str) -> SlotRef {
        SlotRef {
            day,
            court,
            time: time.to_string(),
        }
    }

    #[test]
    fn test_swap_exchanges_slots() {
        let games = vec![game("game-1", (0, 1), 1, 1, "09:00"), game("game-2", (2, 3), 2, 2, "14:00")];
        let swapped = apply_manual_swap(games, "game-1", &target(2, 2, "14:00")).unwrap();

        assert_eq!(swapped[0].id, "game-2");
        assert_eq!((swapped[0].day, swapped[0].court, swapped[0].time.as_str()), (1, 1, "09:00"));
        assert_eq!(swapped[0].abs_time, 540);
        assert_eq!(swapped[1].id, "game-1");
        assert_eq!((swapped[1].day, swapped[1].court, swapped[1].time.as_str()), (2, 2, "14:00"));
        assert_eq!(swapped[1].abs_time, 1440 + 840);
    }

    #[test]
    fn test_move_into_empty_slot() {
        let games = vec![game("game-1", (0, 1), 1, 1, "09:00"), game("game-2", (2, 3), 1, 2, "09:00")];
        let moved = apply_manual_swap(games, "game-2", &target(1, 1, "8:30")).unwrap();
        assert_eq!(moved[0].id, "game-2");
        assert_eq!(moved[0].time, "08:30");
        assert_eq!(moved[0].abs_time, 510);
        assert_eq!(moved[1].id, "game-1");
        assert_eq!(moved[1].abs_time, 540);
    }

    #[test]
    fn test_unknown_match_and_bad_target() {
        let games = vec![game("game-1", (0, 1), 1, 1, "09:00")];
        assert_eq!(
            apply_manual_swap(games.clone(), "game-9", &target(1, 1, "10:00")),
            Err(ScheduleError::UnknownMatch("game-9".to_string()))
        );
        assert!(matches!(
            apply_manual_swap(games.clone(), "game-1", &target(1, 1, "noon")),
            Err(ScheduleError::Configuration(_))
        ));
        assert!(matches!(
            apply_manual_swap(games, "game-1", &target(0, 1, "10:00")),
            Err(ScheduleError::Configuration(_))
        ));
    }

    #[test]
    fn test_swap_with_shared_target_slot() {
        let games = vec![
            game("game-1", (0, 1), 1, 1, "09:00"),
            game("game-2", (2, 3), 1, 1, "09:00"),
            game("game-3", (0, 2), 1, 2, "11:00"),
        ];

        // game-1 already sits there; game-2 trades with it and stays put
        let same = apply_manual_swap(games.clone(), "game-1", &target(1, 1, "09:00")).unwrap();
        assert_eq!(same, games);

        let swapped = apply_manual_swap(games, "game-3", &target(1, 1, "09:00")).unwrap();
        let slot_of = |id: &str| {
            let g = swapped.iter().find(|g| g.id == id).unwrap();
            (g.day, g.court, g.abs_time)
        };
        assert_eq!(slot_of("game-3"), (1, 1, 540));
        assert_eq!(slot_of("game-1"), (1, 2, 660));
        assert_eq!(slot_of("game-2"), (1, 1, 540));
    }

    #[test]
    fn test_swap_onto_itself_is_a_no_op() {
        let games = vec![game("game-1", (0, 1), 1, 1, "09:00")];
        let same = apply_manual_swap(games.clone(), "game-1", &target(1, 1, "09:00")).unwrap();
        assert_eq!(same, games);
    }
}
