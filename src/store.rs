use std::sync::Mutex;

use chrono::{DateTime, Utc};
use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schedule::{Division, ScheduleOutcome, ScheduledGame, TournamentSettings};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Tournament not found")]
    NotFound(String),

    #[error("Tournament store is unavailable")]
    Poisoned,
}

/// A saved tournament: its inputs and the accepted schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: String,
    pub name: String,
    pub settings: TournamentSettings,
    pub divisions: Vec<Division>,
    pub schedule: Vec<ScheduledGame>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of a create request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTournament {
    #[serde(default)]
    pub name: String,
    pub settings: TournamentSettings,
    #[serde(default)]
    pub divisions: Vec<Division>,
    pub schedule: ScheduleOutcome,
}

/// Fields to replace on update; absent fields are kept
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentPatch {
    pub name: Option<String>,
    pub settings: Option<TournamentSettings>,
    pub divisions: Option<Vec<Division>>,
    pub schedule: Option<Vec<ScheduledGame>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentSummary {
    pub id: String,
    pub name: String,
    pub division_count: usize,
    pub game_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The division setup most recently saved from the setup page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DivisionSetup {
    pub divisions: Vec<Division>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// In-memory tournament storage shared by all request handlers
#[derive(Default)]
pub struct TournamentStore {
    tournaments: Mutex<Vec<Tournament>>,
    latest_setup: Mutex<Option<DivisionSetup>>,
}

/// 24 hex characters
fn new_id() -> String {
    let mut rng = rand::thread_rng();
    (0..12).map(|_| format!("{:02x}", rng.gen::<u8>())).collect()
}

impl TournamentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, new: NewTournament) -> Result<Tournament, StoreError> {
        let mut tournaments = self.tournaments.lock().map_err(|_| StoreError::Poisoned)?;
        let mut id = new_id();
        while tournaments.iter().any(|t| t.id == id) {
            id = new_id();
        }
        let now = Utc::now();
        let tournament = Tournament {
            id,
            name: new.name,
            settings: new.settings,
            divisions: new.divisions,
            schedule: new.schedule.games,
            created_at: now,
            updated_at: now,
        };
        info!("Saved tournament {} ({} games)", tournament.id, tournament.schedule.len());
        tournaments.push(tournament.clone());
        Ok(tournament)
    }

    pub fn get(&self, id: &str) -> Result<Tournament, StoreError> {
        let tournaments = self.tournaments.lock().map_err(|_| StoreError::Poisoned)?;
        tournaments
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Summaries, newest first
    pub fn list(&self) -> Result<Vec<TournamentSummary>, StoreError> {
        let tournaments = self.tournaments.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(tournaments
            .iter()
            .rev()
            .map(|t| TournamentSummary {
                id: t.id.clone(),
                name: t.name.clone(),
                division_count: t.divisions.len(),
                game_count: t.schedule.len(),
                created_at: t.created_at,
                updated_at: t.updated_at,
            })
            .collect())
    }

    pub fn update(&self, id: &str, patch: TournamentPatch) -> Result<Tournament, StoreError> {
        let mut tournaments = self.tournaments.lock().map_err(|_| StoreError::Poisoned)?;
        let tournament = tournaments
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if let Some(name) = patch.name {
            tournament.name = name;
        }
        if let Some(settings) = patch.settings {
            tournament.settings = settings;
        }
        if let Some(divisions) = patch.divisions {
            tournament.divisions = divisions;
        }
        if let Some(schedule) = patch.schedule {
            tournament.schedule = schedule;
        }
        tournament.updated_at = Utc::now();
        Ok(tournament.clone())
    }

    /// Returns whether a tournament was removed
    pub fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut tournaments = self.tournaments.lock().map_err(|_| StoreError::Poisoned)?;
        let before = tournaments.len();
        tournaments.retain(|t| t.id != id);
        Ok(tournaments.len() < before)
    }

    pub fn latest_setup(&self) -> Result<Option<DivisionSetup>, StoreError> {
        let setup = self.latest_setup.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(setup.clone())
    }

    pub fn save_latest_setup(&self, divisions: Vec<Division>) -> Result<DivisionSetup, StoreError> {
        let mut setup = self.latest_setup.lock().map_err(|_| StoreError::Poisoned)?;
        let saved = DivisionSetup {
            divisions,
            updated_at: Some(Utc::now()),
        };
        *setup = Some(saved.clone());
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::DayWindow;

    fn new_tournament(name: &str) -> NewTournament {
        NewTournament {
            name: name.to_string(),
            settings: TournamentSettings {
                courts: 1,
                days: 1,
                day_times: vec![DayWindow {
                    day: 1,
                    start_time: "09:00".to_string(),
                    end_time: "12:00".to_string(),
                }],
                game_duration: 60,
                min_break: 0,
                max_break: None,
                daily_cap: 2,
            },
            divisions: vec![Division::pool("a", "A", 2)],
            schedule: ScheduleOutcome {
                error: None,
                games: Vec::new(),
            },
        }
    }

    #[test]
    fn test_create_get_and_list() {
        let store = TournamentStore::new();
        let first = store.create(new_tournament("Spring")).unwrap();
        let second = store.create(new_tournament("Summer")).unwrap();

        assert_eq!(first.id.len(), 24);
        assert!(first.id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(first.id, second.id);
        assert_eq!(store.get(&first.id).unwrap().name, "Spring");

        let names: Vec<String> = store.list().unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Summer", "Spring"]);
    }

    #[test]
    fn test_update_keeps_absent_fields() {
        let store = TournamentStore::new();
        let created = store.create(new_tournament("Spring")).unwrap();
        let updated = store
            .update(
                &created.id,
                TournamentPatch {
                    name: Some("Spring Cup".to_string()),
                    ..TournamentPatch::default()
                },
            )
            .unwrap();
        assert_eq!(updated.name, "Spring Cup");
        assert_eq!(updated.divisions, created.divisions);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[test]
    fn test_missing_ids() {
        let store = TournamentStore::new();
        assert_eq!(store.get("nope"), Err(StoreError::NotFound("nope".to_string())));
        assert!(store.update("nope", TournamentPatch::default()).is_err());
        assert_eq!(store.delete("nope"), Ok(false));
    }

    #[test]
    fn test_delete_and_latest_setup() {
        let store = TournamentStore::new();
        let created = store.create(new_tournament("Spring")).unwrap();
        assert_eq!(store.delete(&created.id), Ok(true));
        assert!(store.list().unwrap().is_empty());

        assert_eq!(store.latest_setup(), Ok(None));
        store.save_latest_setup(vec![Division::pool("x", "X", 3)]).unwrap();
        let setup = store.latest_setup().unwrap().unwrap();
        assert_eq!(setup.divisions.len(), 1);
        assert!(setup.updated_at.is_some());
    }
}
