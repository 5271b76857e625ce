use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use log::{debug, info, warn};

use crate::error::{PhaseGroup, ScheduleError, ScheduleResult};
use super::constraints::{check_fixture, check_removal, EntrantState, PhaseRules, Side, Violation};
use super::fixtures::generate_fixtures;
use super::move_chain::{apply_move_chain, find_move_chain};
use super::types::{Division, DivisionId, ScheduledGame, Slot, TournamentSettings};

/// Bonus for each entrant that has not played at all yet
pub const FIRST_APPEARANCE_BONUS: u32 = 10_000;
/// Bonus for each entrant that has not played on the slot's day yet
pub const FRESH_DAY_BONUS: u32 = 1_000;

/// How candidates for one slot are ranked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scoring {
    /// First appearance, then first game of the day, then remaining games
    Priority,
    /// Fixed order only
    Ordered,
}

/// One division taking part in a phase, with the rules its fixtures obey
#[derive(Debug, Clone)]
pub struct DivisionPlan<'a> {
    pub division: &'a Division,
    pub rules: PhaseRules,
}

/// Everything the placement loop needs to schedule one phase
#[derive(Debug, Clone)]
pub struct PhasePlan<'a> {
    pub group: PhaseGroup,
    pub divisions: Vec<DivisionPlan<'a>>,
    pub scoring: Scoring,
}

/// Games placed by one phase plus what later phases need to know
#[derive(Debug, Clone, Default)]
pub struct PhaseSchedule {
    pub games: Vec<ScheduledGame>,
    /// Indices into the slot list the phase was given
    pub occupied: HashSet<usize>,
    /// Latest game end per division
    pub finish_times: HashMap<DivisionId, u32>,
}

/// A fixture still waiting for a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingFixture {
    pub division: usize,
    pub home: usize,
    pub away: usize,
    /// Generation order, the final tie-breaker
    pub order: usize,
}

/// Mutable state of one phase: entrant timelines, slot occupancy and
/// how many games each entrant still has to play
pub struct Ledger<'p, 'a> {
    plan: &'p PhasePlan<'a>,
    slots: &'p [Slot],
    settings: &'p TournamentSettings,
    states: Vec<Vec<EntrantState>>,
    remaining: Vec<Vec<u32>>,
    occupied: BTreeMap<usize, PendingFixture>,
}

impl<'p, 'a> Ledger<'p, 'a> {
    pub(super) fn new(plan: &'p PhasePlan<'a>, slots: &'p [Slot], settings: &'p TournamentSettings) -> Self {
        let states = plan
            .divisions
            .iter()
            .map(|dp| vec![EntrantState::gated(dp.rules.not_before); dp.division.entrant_count()])
            .collect();
        let remaining = plan
            .divisions
            .iter()
            .map(|dp| {
                let n = dp.division.entrant_count();
                vec![n.saturating_sub(1) as u32; n]
            })
            .collect();
        Ledger {
            plan,
            slots,
            settings,
            states,
            remaining,
            occupied: BTreeMap::new(),
        }
    }

    pub fn slots(&self) -> &[Slot] {
        self.slots
    }

    pub fn is_open(&self, slot_idx: usize) -> bool {
        !self.occupied.contains_key(&slot_idx)
    }

    pub fn occupant(&self, slot_idx: usize) -> Option<PendingFixture> {
        self.occupied.get(&slot_idx).copied()
    }

    /// Occupied slot indices in time order
    pub fn occupied_slots(&self) -> Vec<usize> {
        self.occupied.keys().copied().collect()
    }

    pub fn check(&self, fixture: &PendingFixture, slot_idx: usize) -> Result<(), Violation> {
        let states = &self.states[fixture.division];
        check_fixture(
            &states[fixture.home],
            &states[fixture.away],
            &self.slots[slot_idx],
            &self.plan.divisions[fixture.division].rules,
            self.settings,
        )
    }

    pub fn place(&mut self, fixture: PendingFixture, slot_idx: usize) {
        let slot = &self.slots[slot_idx];
        let states = &mut self.states[fixture.division];
        states[fixture.home].record(slot);
        states[fixture.away].record(slot);
        let remaining = &mut self.remaining[fixture.division];
        remaining[fixture.home] = remaining[fixture.home].saturating_sub(1);
        remaining[fixture.away] = remaining[fixture.away].saturating_sub(1);
        self.occupied.insert(slot_idx, fixture);
    }

    pub fn unplace(&mut self, slot_idx: usize) -> Option<PendingFixture> {
        let fixture = self.occupied.remove(&slot_idx)?;
        let slot = &self.slots[slot_idx];
        let states = &mut self.states[fixture.division];
        states[fixture.home].forget(slot);
        states[fixture.away].forget(slot);
        let remaining = &mut self.remaining[fixture.division];
        remaining[fixture.home] += 1;
        remaining[fixture.away] += 1;
        Some(fixture)
    }

    /// Whether `fixture`, already taken out of `slot_idx`, leaves its
    /// entrants' remaining games within the break window
    pub fn check_removed(&self, fixture: &PendingFixture, slot_idx: usize) -> Result<(), Violation> {
        let states = &self.states[fixture.division];
        let slot = &self.slots[slot_idx];
        check_removal(&states[fixture.home], Side::Home, slot, self.settings)?;
        check_removal(&states[fixture.away], Side::Away, slot, self.settings)
    }

    fn score(&self, fixture: &PendingFixture, slot_idx: usize) -> u32 {
        match self.plan.scoring {
            Scoring::Ordered => 0,
            Scoring::Priority => {
                let day = self.slots[slot_idx].day;
                let states = &self.states[fixture.division];
                let remaining = &self.remaining[fixture.division];
                [fixture.home, fixture.away]
                    .iter()
                    .map(|&entrant| {
                        let state = &states[entrant];
                        let mut score = remaining[entrant];
                        if state.total() == 0 {
                            score += FIRST_APPEARANCE_BONUS;
                        }
                        if state.matches_on(day) == 0 {
                            score += FRESH_DAY_BONUS;
                        }
                        score
                    })
                    .sum()
            }
        }
    }

    fn division_id(&self, fixture: &PendingFixture) -> &'a DivisionId {
        let division: &'a Division = self.plan.divisions[fixture.division].division;
        &division.id
    }
}

/// Generic phase scheduler: greedy slot-by-slot placement, then eviction repair
///
/// Slots must already be in (time, court) order. Fails with a placement
/// error naming how many fixtures are still unplaced.
pub fn schedule_phase(
    plan: &PhasePlan<'_>,
    slots: &[Slot],
    settings: &TournamentSettings,
) -> ScheduleResult<PhaseSchedule> {
    let mut pending: Vec<PendingFixture> = Vec::new();
    for (division, dp) in plan.divisions.iter().enumerate() {
        for fixture in generate_fixtures(dp.division) {
            let order = pending.len();
            pending.push(PendingFixture {
                division,
                home: fixture.home,
                away: fixture.away,
                order,
            });
        }
    }
    if pending.is_empty() {
        return Ok(PhaseSchedule::default());
    }
    let total = pending.len();

    let mut ledger = Ledger::new(plan, slots, settings);

    for slot_idx in 0..slots.len() {
        if pending.is_empty() {
            break;
        }
        let best = pending
            .iter()
            .enumerate()
            .filter(|(_, f)| ledger.check(f, slot_idx).is_ok())
            .min_by_key(|(_, f)| {
                (
                    Reverse(ledger.score(f, slot_idx)),
                    ledger.division_id(f),
                    f.home,
                    f.away,
                    f.order,
                )
            })
            .map(|(i, _)| i);

        if let Some(i) = best {
            let fixture = pending.remove(i);
            ledger.place(fixture, slot_idx);
        }
    }

    if !pending.is_empty() {
        debug!(
            "{} phase: greedy pass left {} of {} games unplaced, starting eviction repair",
            plan.group,
            pending.len(),
            total
        );
        let mut queue: VecDeque<PendingFixture> = pending.into();
        repair(&mut ledger, &mut queue);
        if !queue.is_empty() {
            warn!("{} phase: {} games could not be placed", plan.group, queue.len());
            return Err(ScheduleError::Placement {
                phase: plan.group,
                remaining: queue.len(),
            });
        }
    }

    let mut schedule = PhaseSchedule::default();
    for (&slot_idx, fixture) in &ledger.occupied {
        let slot = &slots[slot_idx];
        let division = plan.divisions[fixture.division].division;
        schedule
            .games
            .push(ScheduledGame::new(division, fixture.home, fixture.away, slot));
        schedule.occupied.insert(slot_idx);
        let end = slot.end(settings.game_duration);
        let finish = schedule.finish_times.entry(division.id.clone()).or_insert(0);
        *finish = (*finish).max(end);
    }
    info!("{} phase: placed {} games", plan.group, schedule.games.len());
    Ok(schedule)
}

/// Upper bound on eviction attempts in one repair pass
pub const MAX_REPAIR_ATTEMPTS: u32 = 500;

/// Places leftover fixtures by evicting already placed games
///
/// Takes the oldest unplaced fixture each round. A fixture that cannot be
/// placed goes to the back of the queue; the pass ends once every queued
/// fixture has failed in a row or the attempt budget is spent.
fn repair(ledger: &mut Ledger<'_, '_>, queue: &mut VecDeque<PendingFixture>) {
    let mut attempts = 0;
    let mut stalled = 0;

    while let Some(fixture) = queue.pop_front() {
        if attempts >= MAX_REPAIR_ATTEMPTS {
            queue.push_front(fixture);
            break;
        }

        match find_move_chain(ledger, fixture, &mut attempts) {
            Some(moves) => {
                debug!(
                    "repair: placed fixture {}v{} with {} move(s)",
                    fixture.home,
                    fixture.away,
                    moves.len()
                );
                apply_move_chain(&moves, ledger);
                stalled = 0;
            }
            None => {
                queue.push_back(fixture);
                stalled += 1;
                if stalled >= queue.len() {
                    break;
                }
            }
        }
    }
}
