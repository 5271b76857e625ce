use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schedule::{Division, DivisionId, Phase, TournamentSettings};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("could not read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid tournament JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid roster CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: unknown game type \"{value}\" (expected Pool Play, Championship or Consolation)")]
    UnknownGameType { row: usize, value: String },

    #[error("row {row}: division id is empty")]
    MissingDivisionId { row: usize },
}

/// Settings plus divisions, the input of one scheduling run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentInput {
    pub settings: TournamentSettings,
    #[serde(default)]
    pub divisions: Vec<Division>,
}

/// Loads a tournament description from a JSON file
pub fn load_tournament<P: AsRef<Path>>(path: P) -> Result<TournamentInput, ParseError> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    division_id: String,
    #[serde(default)]
    division_name: String,
    #[serde(default)]
    game_type: String,
    #[serde(default)]
    team_name: String,
    #[serde(default)]
    depends_on: String,
}

/// Maps the game type column to a phase; blank means Pool Play
fn parse_game_type(value: &str, row: usize) -> Result<Phase, ParseError> {
    let normalized = value.trim().to_lowercase();
    match normalized.as_str() {
        "" | "pool" | "pool play" | "poolplay" => Ok(Phase::PoolPlay { daily_cap: None }),
        "championship" => Ok(Phase::Championship { depends_on: Vec::new() }),
        "consolation" => Ok(Phase::Consolation { depends_on: Vec::new() }),
        _ => Err(ParseError::UnknownGameType {
            row,
            value: value.trim().to_string(),
        }),
    }
}

fn add_dependencies(phase: &mut Phase, raw: &str) {
    if let Phase::Championship { depends_on } | Phase::Consolation { depends_on } = phase {
        for id in raw.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            let id = DivisionId::from(id);
            if !depends_on.contains(&id) {
                depends_on.push(id);
            }
        }
    }
}

/// Parses a team roster
///
/// One row per team: `division_id,division_name,game_type,team_name,depends_on`.
/// Rows are grouped by division id in first-seen order. The name and game type
/// come from a division's first row; `depends_on` (ids separated by `;`) is
/// merged over all its rows. Blank team names are kept and get a default
/// display name later.
pub fn parse_divisions_csv<R: Read>(input: R) -> Result<Vec<Division>, ParseError> {
    let mut reader = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input);

    let mut divisions: Vec<Division> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (i, result) in reader.deserialize::<RosterRow>().enumerate() {
        let row = result?;
        // Header is line 1
        let line = i + 2;
        if row.division_id.is_empty() {
            return Err(ParseError::MissingDivisionId { row: line });
        }

        let position = match index.get(&row.division_id) {
            Some(&position) => position,
            None => {
                divisions.push(Division {
                    id: DivisionId(row.division_id.clone()),
                    name: row.division_name.clone(),
                    phase: parse_game_type(&row.game_type, line)?,
                    team_names: Vec::new(),
                    num_teams: None,
                });
                index.insert(row.division_id.clone(), divisions.len() - 1);
                divisions.len() - 1
            }
        };

        let division = &mut divisions[position];
        add_dependencies(&mut division.phase, &row.depends_on);
        division.team_names.push(row.team_name);
    }

    Ok(divisions)
}

pub fn load_divisions_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Division>, ParseError> {
    let file = fs::File::open(path)?;
    parse_divisions_csv(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::PhaseKind;

    const ROSTER: &str = "\
division_id,division_name,game_type,team_name,depends_on
a,Men A,Pool Play,Hawks,
a,Men A,Pool Play,,
b,Men B,pool,Owls,
b,Men B,pool,Crows,
final,Men Final,Championship,,a
final,Men Final,Championship,,b;a
";

    #[test]
    fn test_roster_groups_rows_in_order() {
        let divisions = parse_divisions_csv(ROSTER.as_bytes()).unwrap();
        let ids: Vec<&str> = divisions.iter().map(|d| d.id.0.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "final"]);
        assert_eq!(divisions[0].entrant_count(), 2);
        assert_eq!(divisions[0].team_display_name(1), "Men A Team 2");
        assert_eq!(divisions[2].kind(), PhaseKind::Championship);
        assert_eq!(
            divisions[2].phase.dependencies(),
            &[DivisionId::from("a"), DivisionId::from("b")]
        );
    }

    #[test]
    fn test_roster_rejects_unknown_game_type() {
        let csv = "division_id,division_name,game_type,team_name,depends_on\nx,X,Knockout,T1,\n";
        match parse_divisions_csv(csv.as_bytes()) {
            Err(ParseError::UnknownGameType { row, value }) => {
                assert_eq!(row, 2);
                assert_eq!(value, "Knockout");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_roster_optional_columns() {
        let csv = "division_id,team_name\nkids,Tigers\nkids,Lions\n";
        let divisions = parse_divisions_csv(csv.as_bytes()).unwrap();
        assert_eq!(divisions.len(), 1);
        assert_eq!(divisions[0].kind(), PhaseKind::PoolPlay);
        assert_eq!(divisions[0].team_names, vec!["Tigers", "Lions"]);
    }

    #[test]
    fn test_tournament_json() {
        let json = r#"{
            "settings": {"courts": 2, "days": 1, "gameDuration": 60, "minBreak": 30, "maxBreak": 180,
                "dayTimes": [{"day": 1, "startTime": "09:00", "endTime": "17:00"}]},
            "divisions": [{"id": 1, "name": "A", "gameType": "Pool Play", "teamNames": ["", "", ""]}]
        }"#;
        let input: TournamentInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.settings.max_break, Some(180));
        assert_eq!(input.divisions[0].id, DivisionId::from("1"));
        assert_eq!(input.divisions[0].entrant_count(), 3);
    }
}
