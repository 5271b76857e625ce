use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::{ScheduleError, ScheduleResult};
use super::slot_utils::parse_time_to_minutes;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Pool Play entrants may play at most this many games per day unless configured otherwise
pub const DEFAULT_DAILY_CAP: u32 = 2;

pub const MAX_DAYS: u32 = 366;
pub const MAX_COURTS: u32 = 500;
pub const MAX_ENTRANTS: usize = 1000;

fn default_daily_cap() -> u32 {
    DEFAULT_DAILY_CAP
}

/// Start and end of play for one tournament day
///
/// `end_time` is the latest start time, not the time play must be over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayWindow {
    pub day: u32,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentSettings {
    pub courts: u32,
    pub days: u32,
    #[serde(default)]
    pub day_times: Vec<DayWindow>,
    pub game_duration: u32,
    #[serde(default)]
    pub min_break: u32,
    /// `None` or `Some(0)` means no upper bound
    #[serde(default)]
    pub max_break: Option<u32>,
    #[serde(default = "default_daily_cap")]
    pub daily_cap: u32,
}

impl TournamentSettings {
    /// The effective maximum break, `None` when unbounded
    pub fn max_break_limit(&self) -> Option<u32> {
        self.max_break.filter(|&m| m > 0)
    }

    /// Rejects settings that can never produce a meaningful grid
    pub fn validate(&self) -> ScheduleResult<()> {
        if self.courts == 0 {
            return Err(config_error("at least one court is required"));
        }
        if self.days == 0 {
            return Err(config_error("at least one day is required"));
        }
        if self.game_duration == 0 {
            return Err(config_error("game duration must be greater than zero"));
        }
        if self.days > MAX_DAYS {
            return Err(config_error(format!("at most {} days are supported", MAX_DAYS)));
        }
        if self.courts > MAX_COURTS {
            return Err(config_error(format!("at most {} courts are supported", MAX_COURTS)));
        }
        if self.game_duration > MINUTES_PER_DAY {
            return Err(config_error(format!(
                "game duration ({} min) is longer than a day",
                self.game_duration
            )));
        }
        if self.min_break > MINUTES_PER_DAY {
            return Err(config_error(format!(
                "minimum break ({} min) is longer than a day",
                self.min_break
            )));
        }
        if self.daily_cap == 0 {
            return Err(config_error("daily game cap must be at least 1"));
        }
        if let Some(max) = self.max_break_limit() {
            if self.min_break > max {
                return Err(config_error(format!(
                    "minimum break ({} min) is larger than maximum break ({} min)",
                    self.min_break, max
                )));
            }
        }

        let mut seen_days = HashSet::new();
        for window in &self.day_times {
            if window.day == 0 || window.day > self.days {
                return Err(config_error(format!(
                    "day {} is outside the tournament's {} day(s)",
                    window.day, self.days
                )));
            }
            if !seen_days.insert(window.day) {
                return Err(config_error(format!("day {} has more than one time window", window.day)));
            }
            for time in [&window.start_time, &window.end_time] {
                if parse_time_to_minutes(time).is_none() {
                    return Err(config_error(format!("\"{}\" on day {} is not a HH:MM time", time, window.day)));
                }
            }
        }
        Ok(())
    }
}

fn config_error(message: impl Into<String>) -> ScheduleError {
    ScheduleError::Configuration(message.into())
}

/// Stable division identifier. Accepts JSON strings or integers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DivisionId(pub String);

impl<'de> Deserialize<'de> for DivisionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => DivisionId(s),
            Raw::Signed(n) => DivisionId(n.to_string()),
            Raw::Unsigned(n) => DivisionId(n.to_string()),
        })
    }
}

impl From<&str> for DivisionId {
    fn from(value: &str) -> Self {
        DivisionId(value.to_string())
    }
}

impl fmt::Display for DivisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Phase label carried by fixtures and scheduled games
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseKind {
    #[serde(rename = "Pool Play")]
    PoolPlay,
    Championship,
    Consolation,
}

impl PhaseKind {
    pub fn label(&self) -> &'static str {
        match self {
            PhaseKind::PoolPlay => "Pool Play",
            PhaseKind::Championship => "Championship",
            PhaseKind::Consolation => "Consolation",
        }
    }

    pub fn is_pool(&self) -> bool {
        matches!(self, PhaseKind::PoolPlay)
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a division is scheduled. Each variant only carries what its phase needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "gameType")]
pub enum Phase {
    #[serde(rename = "Pool Play")]
    PoolPlay {
        #[serde(default, rename = "dailyCap", skip_serializing_if = "Option::is_none")]
        daily_cap: Option<u32>,
    },
    Championship {
        #[serde(default, rename = "poolPlayDependencies")]
        depends_on: Vec<DivisionId>,
    },
    Consolation {
        #[serde(default, rename = "poolPlayDependencies")]
        depends_on: Vec<DivisionId>,
    },
}

impl Phase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            Phase::PoolPlay { .. } => PhaseKind::PoolPlay,
            Phase::Championship { .. } => PhaseKind::Championship,
            Phase::Consolation { .. } => PhaseKind::Consolation,
        }
    }

    /// Pool divisions this phase waits for; empty for Pool Play
    pub fn dependencies(&self) -> &[DivisionId] {
        match self {
            Phase::PoolPlay { .. } => &[],
            Phase::Championship { depends_on } | Phase::Consolation { depends_on } => depends_on,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Division {
    pub id: DivisionId,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub phase: Phase,
    #[serde(default)]
    pub team_names: Vec<String>,
    /// When present, overrides the length of `team_names`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_teams: Option<usize>,
}

impl Division {
    pub fn pool(id: &str, name: &str, teams: usize) -> Self {
        Division {
            id: id.into(),
            name: name.to_string(),
            phase: Phase::PoolPlay { daily_cap: None },
            team_names: vec![String::new(); teams],
            num_teams: None,
        }
    }

    pub fn championship(id: &str, name: &str, teams: usize, depends_on: &[&str]) -> Self {
        Division {
            id: id.into(),
            name: name.to_string(),
            phase: Phase::Championship {
                depends_on: depends_on.iter().map(|&d| d.into()).collect(),
            },
            team_names: vec![String::new(); teams],
            num_teams: None,
        }
    }

    pub fn consolation(id: &str, name: &str, teams: usize, depends_on: &[&str]) -> Self {
        Division {
            id: id.into(),
            name: name.to_string(),
            phase: Phase::Consolation {
                depends_on: depends_on.iter().map(|&d| d.into()).collect(),
            },
            team_names: vec![String::new(); teams],
            num_teams: None,
        }
    }

    pub fn with_team_names(mut self, names: &[&str]) -> Self {
        self.team_names = names.iter().map(|n| n.to_string()).collect();
        self.num_teams = None;
        self
    }

    pub fn kind(&self) -> PhaseKind {
        self.phase.kind()
    }

    pub fn entrant_count(&self) -> usize {
        self.num_teams.unwrap_or(self.team_names.len())
    }

    /// A division needs two entrants to generate any fixtures
    pub fn is_schedulable(&self) -> bool {
        self.entrant_count() >= 2
    }

    /// Daily cap for this division's entrants, `None` for bracket phases
    pub fn daily_cap(&self, settings: &TournamentSettings) -> Option<u32> {
        match self.phase {
            Phase::PoolPlay { daily_cap } => Some(daily_cap.unwrap_or(settings.daily_cap)),
            _ => None,
        }
    }

    /// Team name for display, falling back to "<division> Team <n>" when blank
    pub fn team_display_name(&self, index: usize) -> String {
        match self.team_names.get(index).map(|n| n.trim()) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                let division = self.name.trim();
                if division.is_empty() {
                    format!("Team {}", index + 1)
                } else {
                    format!("{} Team {}", division, index + 1)
                }
            }
        }
    }
}

/// An unscheduled required match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    pub division_id: DivisionId,
    pub phase: PhaseKind,
    pub home: usize,
    pub away: usize,
}

/// A single bookable (day, court, start time) unit
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub day: u32,
    pub court: u32,
    pub time: String,
    /// Minutes since the start of day 1
    pub abs_time: u32,
}

impl Slot {
    pub fn end(&self, duration: u32) -> u32 {
        self.abs_time.saturating_add(duration)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledGame {
    pub id: String,
    pub day: u32,
    pub court: u32,
    pub time: String,
    pub abs_time: u32,
    pub division_id: DivisionId,
    pub division_name: String,
    pub game_phase: PhaseKind,
    pub team1_index: usize,
    pub team2_index: usize,
    pub team1: String,
    pub team2: String,
}

impl ScheduledGame {
    pub(crate) fn new(division: &Division, home: usize, away: usize, slot: &Slot) -> Self {
        ScheduledGame {
            id: String::new(),
            day: slot.day,
            court: slot.court,
            time: slot.time.clone(),
            abs_time: slot.abs_time,
            division_id: division.id.clone(),
            division_name: division.name.clone(),
            game_phase: division.kind(),
            team1_index: home,
            team2_index: away,
            team1: division.team_display_name(home),
            team2: division.team_display_name(away),
        }
    }
}

/// Sorts games by start time, then court
pub fn sort_games(games: &mut [ScheduledGame]) {
    games.sort_by(|a, b| a.abs_time.cmp(&b.abs_time).then(a.court.cmp(&b.court)));
}

/// The `{ error, games }` shape handed to callers and persisted with a tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleOutcome {
    pub error: Option<String>,
    #[serde(default)]
    pub games: Vec<ScheduledGame>,
}

impl ScheduleOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

impl From<ScheduleResult<Vec<ScheduledGame>>> for ScheduleOutcome {
    fn from(result: ScheduleResult<Vec<ScheduledGame>>) -> Self {
        match result {
            Ok(games) => ScheduleOutcome { error: None, games },
            Err(e) => ScheduleOutcome {
                error: Some(e.to_string()),
                games: Vec::new(),
            },
        }
    }
}
