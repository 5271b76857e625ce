use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::types::{Division, DivisionId, ScheduledGame, TournamentSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WarningKind {
    DailyCapExceeded,
    BreakTooShort,
    BreakTooLong,
    Overlap,
    BeforeDependencies,
}

/// A rule the schedule breaks. Advisory only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleWarning {
    pub kind: WarningKind,
    pub game_id: String,
    pub division_name: String,
    pub team: String,
    pub message: String,
}

#[derive(Default)]
struct Timeline {
    last_day: u32,
    last_end: u32,
    per_day: HashMap<u32, u32>,
}

/// Re-derives every entrant's timeline from a schedule and reports rule breaks
///
/// Works on generated and hand-edited schedules alike and never rejects
/// anything. Games of divisions missing from `divisions` are still checked
/// for breaks and overlaps, using the settings' daily cap if they are Pool Play.
pub fn detect_warnings(
    games: &[ScheduledGame],
    settings: &TournamentSettings,
    divisions: &[Division],
) -> Vec<ScheduleWarning> {
    let by_id: HashMap<&DivisionId, &Division> = divisions.iter().map(|d| (&d.id, d)).collect();

    let mut ordered: Vec<&ScheduledGame> = games.iter().collect();
    ordered.sort_by(|a, b| a.abs_time.cmp(&b.abs_time).then(a.court.cmp(&b.court)));

    let mut warnings = Vec::new();
    let mut timelines: HashMap<(&DivisionId, usize), Timeline> = HashMap::new();
    let duration = settings.game_duration;

    for &game in &ordered {
        let cap = if game.game_phase.is_pool() {
            Some(
                by_id
                    .get(&game.division_id)
                    .and_then(|d| d.daily_cap(settings))
                    .unwrap_or(settings.daily_cap),
            )
        } else {
            None
        };

        for (index, team) in [(game.team1_index, &game.team1), (game.team2_index, &game.team2)] {
            let timeline = timelines.entry((&game.division_id, index)).or_default();
            let warn = |kind, message: String| ScheduleWarning {
                kind,
                game_id: game.id.clone(),
                division_name: game.division_name.clone(),
                team: team.clone(),
                message,
            };

            let count = timeline.per_day.entry(game.day).or_insert(0);
            *count += 1;
            if let Some(cap) = cap {
                if *count > cap {
                    warnings.push(warn(
                        WarningKind::DailyCapExceeded,
                        format!("{} plays {} games on day {} (limit {})", team, count, game.day, cap),
                    ));
                }
            }

            if timeline.last_day != 0 {
                let gap = i64::from(game.abs_time) - i64::from(timeline.last_end);
                if gap < 0 {
                    warnings.push(warn(
                        WarningKind::Overlap,
                        format!("{} is still playing a previous game at {}", team, game.time),
                    ));
                } else if timeline.last_day == game.day {
                    if gap < i64::from(settings.min_break) {
                        warnings.push(warn(
                            WarningKind::BreakTooShort,
                            format!(
                                "{} only rests {} min before the {} game on day {} (minimum {})",
                                team, gap, game.time, game.day, settings.min_break
                            ),
                        ));
                    } else if let Some(max) = settings.max_break_limit() {
                        if gap > i64::from(max) {
                            warnings.push(warn(
                                WarningKind::BreakTooLong,
                                format!(
                                    "{} waits {} min before the {} game on day {} (maximum {})",
                                    team, gap, game.time, game.day, max
                                ),
                            ));
                        }
                    }
                }
            }

            let end = game.abs_time + duration;
            if timeline.last_day == 0 || end >= timeline.last_end {
                timeline.last_day = game.day;
                timeline.last_end = end;
            }
        }
    }

    warnings.extend(dependency_warnings(&ordered, settings, divisions));
    warnings
}

/// Bracket games that start before their pool dependencies (as scheduled) finish plus the minimum break
fn dependency_warnings(
    ordered: &[&ScheduledGame],
    settings: &TournamentSettings,
    divisions: &[Division],
) -> Vec<ScheduleWarning> {
    let mut finish: HashMap<&DivisionId, u32> = HashMap::new();
    for game in ordered.iter().filter(|g| g.game_phase.is_pool()) {
        let end = game.abs_time.saturating_add(settings.game_duration);
        let entry = finish.entry(&game.division_id).or_insert(0);
        *entry = (*entry).max(end);
    }

    let gates: HashMap<&DivisionId, u32> = divisions
        .iter()
        .filter(|d| !d.kind().is_pool())
        .filter_map(|d| {
            let deps = d.phase.dependencies();
            let latest = deps
                .iter()
                .map(|dep| finish.get(dep).copied())
                .collect::<Option<Vec<u32>>>()?
                .into_iter()
                .max()
                .unwrap_or(0);
            Some((&d.id, latest.saturating_add(settings.min_break)))
        })
        .collect();

    ordered
        .iter()
        .filter(|g| !g.game_phase.is_pool())
        .filter_map(|g| {
            let gate = *gates.get(&g.division_id)?;
            (g.abs_time < gate).then(|| ScheduleWarning {
                kind: WarningKind::BeforeDependencies,
                game_id: g.id.clone(),
                division_name: g.division_name.clone(),
                team: format!("{} vs {}", g.team1, g.team2),
                message: format!(
                    "{} game on day {} at {} starts before its pool games finish plus the {} min break",
                    g.game_phase, g.day, g.time, settings.min_break
                ),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::assemble::generate_schedule;
    use crate::schedule::slot_utils::absolute_minutes;
    use crate::schedule::types::{DayWindow, PhaseKind};

    fn settings() -> TournamentSettings {
        TournamentSettings {
            courts: 2,
            days: 2,
            day_times: vec![
                DayWindow {
                    day: 1,
                    start_time: "09:00".to_string(),
                    end_time: "16:00".to_string(),
                },
                DayWindow {
                    day: 2,
                    start_time: "09:00".to_string(),
                    end_time: "16:00".to_string(),
                },
            ],
            game_duration: 60,
            min_break: 30,
            max_break: Some(180),
            daily_cap: 2,
        }
    }

    fn game(id: &str, division: &Division, teams: (usize, usize), day: u32, time: &str) -> ScheduledGame {
        ScheduledGame {
            id: id.to_string(),
            day,
            court: 1,
            time: time.to_string(),
            abs_time: absolute_minutes(day, time).unwrap(),
            division_id: division.id.clone(),
            division_name: division.name.clone(),
            game_phase: division.kind(),
            team1_index: teams.0,
            team2_index: teams.1,
            team1: division.team_display_name(teams.0),
            team2: division.team_display_name(teams.1),
        }
    }

    #[test]
    fn test_generated_schedule_is_clean() {
        let divisions = vec![
            Division::pool("a", "A", 3),
            Division::championship("c", "Final", 2, &["a"]),
        ];
        let s = settings();
        let games = generate_schedule(&s, &divisions).unwrap();
        assert!(detect_warnings(&games, &s, &divisions).is_empty());
    }

    #[test]
    fn test_flags_cap_and_breaks() {
        let pool = Division::pool("a", "A", 4);
        let games = vec![
            game("g1", &pool, (0, 1), 1, "09:00"),
            game("g2", &pool, (0, 2), 1, "10:00"),
            game("g3", &pool, (0, 3), 1, "15:00"),
        ];
        let warnings = detect_warnings(&games, &settings(), std::slice::from_ref(&pool));
        let kinds: Vec<WarningKind> = warnings.iter().map(|w| w.kind).collect();
        assert_eq!(
            kinds,
            vec![
                WarningKind::BreakTooShort,
                WarningKind::DailyCapExceeded,
                WarningKind::BreakTooLong
            ]
        );
        assert!(warnings.iter().all(|w| w.team == "A Team 1"));
        assert_eq!(warnings[1].game_id, "g3");
    }

    #[test]
    fn test_flags_overlap() {
        let pool = Division::pool("a", "A", 3);
        let mut second = game("g2", &pool, (0, 2), 1, "09:00");
        second.court = 2;
        let games = vec![game("g1", &pool, (0, 1), 1, "09:00"), second];
        let warnings = detect_warnings(&games, &settings(), &[pool]);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::Overlap);
    }

    #[test]
    fn test_flags_bracket_before_gate() {
        let pool = Division::pool("a", "A", 2);
        let final_ = Division::championship("c", "Final", 2, &["a"]);
        let games = vec![
            game("g1", &pool, (0, 1), 1, "09:00"),
            game("g2", &final_, (0, 1), 1, "10:00"),
        ];
        let warnings = detect_warnings(&games, &settings(), &[pool, final_]);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::BeforeDependencies);
        assert_eq!(warnings[0].game_id, "g2");
        assert_eq!(games[1].game_phase, PhaseKind::Championship);
    }

    #[test]
    fn test_breaks_do_not_cross_days() {
        let pool = Division::pool("a", "A", 2).with_team_names(&["Hawks", "Owls"]);
        let games = vec![
            game("g1", &pool, (0, 1), 1, "16:00"),
            game("g2", &pool, (0, 1), 2, "09:00"),
        ];
        assert!(detect_warnings(&games, &settings(), &[pool]).is_empty());
    }
}
