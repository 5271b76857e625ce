use super::types::{Slot, TournamentSettings};

/// Per-entrant timeline built up during one scheduling pass
///
/// Holds the (day, start) of every match placed so far, ordered by start,
/// plus the earliest minute the entrant may play at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntrantState {
    played: Vec<(u32, u32)>,
    not_before: u32,
}

impl EntrantState {
    /// An entrant that may not start before `not_before` (bracket gate)
    pub fn gated(not_before: u32) -> Self {
        EntrantState {
            played: Vec::new(),
            not_before,
        }
    }

    pub fn record(&mut self, slot: &Slot) {
        let pos = self.played.partition_point(|&(_, start)| start <= slot.abs_time);
        self.played.insert(pos, (slot.day, slot.abs_time));
    }

    pub fn forget(&mut self, slot: &Slot) {
        if let Some(pos) = self
            .played
            .iter()
            .position(|&(day, start)| day == slot.day && start == slot.abs_time)
        {
            self.played.remove(pos);
        }
    }

    pub fn total(&self) -> usize {
        self.played.len()
    }

    pub fn matches_on(&self, day: u32) -> u32 {
        self.played.iter().filter(|&&(d, _)| d == day).count() as u32
    }

    fn previous_on(&self, day: u32, start: u32) -> Option<u32> {
        self.played
            .iter()
            .rev()
            .find(|&&(d, s)| d == day && s < start)
            .map(|&(_, s)| s)
    }

    fn next_on(&self, day: u32, start: u32) -> Option<u32> {
        self.played
            .iter()
            .find(|&&(d, s)| d == day && s > start)
            .map(|&(_, s)| s)
    }
}

/// Which entrant of a fixture broke a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Home,
    Away,
}

/// The rule a candidate placement breaks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    DailyCap { side: Side, cap: u32 },
    Overlap { side: Side },
    BreakTooShort { side: Side, gap: u32 },
    BreakTooLong { side: Side, gap: u32 },
    BeforeGate { earliest: u32 },
}

/// Per-division rules applied on top of the settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PhaseRules {
    /// Pool Play only
    pub daily_cap: Option<u32>,
    /// Bracket only: earliest absolute start for any match of the division
    pub not_before: u32,
}

/// Decides whether a fixture between `home` and `away` may take `slot`
pub fn check_fixture(
    home: &EntrantState,
    away: &EntrantState,
    slot: &Slot,
    rules: &PhaseRules,
    settings: &TournamentSettings,
) -> Result<(), Violation> {
    if slot.abs_time < rules.not_before {
        return Err(Violation::BeforeGate {
            earliest: rules.not_before,
        });
    }
    check_entrant(home, Side::Home, slot, rules, settings)?;
    check_entrant(away, Side::Away, slot, rules, settings)
}

fn check_entrant(
    state: &EntrantState,
    side: Side,
    slot: &Slot,
    rules: &PhaseRules,
    settings: &TournamentSettings,
) -> Result<(), Violation> {
    if slot.abs_time < state.not_before {
        return Err(Violation::BeforeGate {
            earliest: state.not_before,
        });
    }

    if let Some(cap) = rules.daily_cap {
        if state.matches_on(slot.day) >= cap {
            return Err(Violation::DailyCap { side, cap });
        }
    }

    let duration = settings.game_duration;
    let start = slot.abs_time;
    let end = slot.end(duration);
    if state
        .played
        .iter()
        .any(|&(_, other)| other < end && start < other + duration)
    {
        return Err(Violation::Overlap { side });
    }

    if let Some(previous) = state.previous_on(slot.day, start) {
        check_gap(start - (previous + duration), side, settings)?;
    }
    if let Some(next) = state.next_on(slot.day, start) {
        check_gap(next - end, side, settings)?;
    }
    Ok(())
}

fn check_gap(gap: u32, side: Side, settings: &TournamentSettings) -> Result<(), Violation> {
    if gap < settings.min_break {
        return Err(Violation::BreakTooShort { side, gap });
    }
    if let Some(max) = settings.max_break_limit() {
        if gap > max {
            return Err(Violation::BreakTooLong { side, gap });
        }
    }
    Ok(())
}

/// Checks that taking the match at `removed` out of `state` keeps its
/// remaining same-day neighbours within the maximum break
///
/// `state` must already have the match forgotten.
pub fn check_removal(
    state: &EntrantState,
    side: Side,
    removed: &Slot,
    settings: &TournamentSettings,
) -> Result<(), Violation> {
    let (Some(previous), Some(next)) = (
        state.previous_on(removed.day, removed.abs_time),
        state.next_on(removed.day, removed.abs_time),
    ) else {
        return Ok(());
    };
    match settings.max_break_limit() {
        Some(max) => {
            let gap = next.saturating_sub(previous.saturating_add(settings.game_duration));
            if gap > max {
                Err(Violation::BreakTooLong { side, gap })
            } else {
                Ok(())
            }
        }
        None => Ok(()),
    }
}
