use chrono::{NaiveTime, Timelike};

use super::types::{Slot, TournamentSettings, MINUTES_PER_DAY};

/// Parses a time string (HH:MM) to minutes since midnight
pub fn parse_time_to_minutes(time_str: &str) -> Option<u32> {
    let time = NaiveTime::parse_from_str(time_str.trim(), "%H:%M").ok()?;
    Some(time.hour() * 60 + time.minute())
}

/// Formats minutes since midnight to time string (HH:MM)
pub fn minutes_to_time_string(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    format!("{:02}:{:02}", hours % 24, mins)
}

/// Minutes since the start of day 1 for a clock time on a given day
pub fn absolute_minutes(day: u32, time_str: &str) -> Option<u32> {
    let day_offset = day.checked_sub(1)?.checked_mul(MINUTES_PER_DAY)?;
    day_offset.checked_add(parse_time_to_minutes(time_str)?)
}

/// Builds every bookable slot for the tournament
///
/// For each day window and each court, a slot starts every `game_duration`
/// minutes from the start time while the start is not after the end time.
/// Slots come out grouped by day then court; use [`sorted_slot_grid`] for
/// the (time, court) order the schedulers consume.
pub fn build_slot_grid(settings: &TournamentSettings) -> Vec<Slot> {
    let mut slots = Vec::new();
    if settings.game_duration == 0 {
        return slots;
    }

    for window in &settings.day_times {
        let (Some(start), Some(end), Some(day_offset)) = (
            parse_time_to_minutes(&window.start_time),
            parse_time_to_minutes(&window.end_time),
            window.day.saturating_sub(1).checked_mul(MINUTES_PER_DAY),
        ) else {
            continue;
        };

        for court in 1..=settings.courts {
            let mut current = start;
            while current <= end {
                let Some(abs_time) = day_offset.checked_add(current) else {
                    break;
                };
                slots.push(Slot {
                    day: window.day,
                    court,
                    time: minutes_to_time_string(current),
                    abs_time,
                });
                match current.checked_add(settings.game_duration) {
                    Some(next) => current = next,
                    None => break,
                }
            }
        }
    }

    slots
}

/// The slot grid ordered by absolute time, ties broken by court
pub fn sorted_slot_grid(settings: &TournamentSettings) -> Vec<Slot> {
    let mut slots = build_slot_grid(settings);
    slots.sort_by(|a, b| a.abs_time.cmp(&b.abs_time).then(a.court.cmp(&b.court)));
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::types::DayWindow;

    fn settings(courts: u32, windows: &[(u32, &str, &str)], duration: u32) -> TournamentSettings {
        TournamentSettings {
            courts,
            days: windows.len() as u32,
            day_times: windows
                .iter()
                .map(|&(day, start, end)| DayWindow {
                    day,
                    start_time: start.to_string(),
                    end_time: end.to_string(),
                })
                .collect(),
            game_duration: duration,
            min_break: 0,
            max_break: None,
            daily_cap: 2,
        }
    }

    #[test]
    fn test_parse_and_format_round_trip() {
        assert_eq!(parse_time_to_minutes("09:30"), Some(570));
        assert_eq!(parse_time_to_minutes("24:00"), None);
        assert_eq!(parse_time_to_minutes("nine"), None);
        assert_eq!(minutes_to_time_string(570), "09:30");
        assert_eq!(absolute_minutes(2, "08:00"), Some(1440 + 480));
        assert_eq!(absolute_minutes(0, "08:00"), None);
    }

    #[test]
    fn test_end_time_is_inclusive() {
        let s = settings(1, &[(1, "09:00", "10:00")], 60);
        let slots = build_slot_grid(&s);
        let times: Vec<&str> = slots.iter().map(|s| s.time.as_str()).collect();
        assert_eq!(times, vec!["09:00", "10:00"]);
    }

    #[test]
    fn test_grid_per_court_and_day() {
        let s = settings(2, &[(1, "09:00", "11:00"), (2, "10:00", "10:30")], 60);
        let slots = build_slot_grid(&s);
        // Day 1: 3 starts x 2 courts, day 2: 1 start x 2 courts
        assert_eq!(slots.len(), 8);
        assert_eq!(slots[0].court, 1);
        assert_eq!(slots[3].court, 2);
        let day2 = slots.iter().find(|s| s.day == 2).unwrap();
        assert_eq!(day2.abs_time, 1440 + 600);
    }

    #[test]
    fn test_start_after_end_yields_no_slots() {
        let s = settings(3, &[(1, "18:00", "09:00")], 60);
        assert!(build_slot_grid(&s).is_empty());
    }

    #[test]
    fn test_huge_values_do_not_overflow() {
        let s = settings(1, &[(1, "10:00", "10:00")], u32::MAX);
        let slots = build_slot_grid(&s);
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].abs_time, 600);

        let s = settings(1, &[(u32::MAX, "09:00", "10:00")], 60);
        assert!(build_slot_grid(&s).is_empty());
        assert_eq!(absolute_minutes(u32::MAX, "09:00"), None);
    }

    #[test]
    fn test_sorted_grid_is_stable() {
        let s = settings(3, &[(1, "09:00", "12:00"), (2, "09:00", "12:00")], 45);
        let first = sorted_slot_grid(&s);
        let second = sorted_slot_grid(&s);
        assert_eq!(first, second);
        assert!(first
            .windows(2)
            .all(|w| (w[0].abs_time, w[0].court) < (w[1].abs_time, w[1].court)));
    }
}
