use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;
use serde::Serialize;

use crate::schedule::ScheduledGame;

#[derive(Serialize)]
struct ExportRow<'a> {
    day: u32,
    time: &'a str,
    court: u32,
    division: &'a str,
    phase: &'a str,
    team1: &'a str,
    team2: &'a str,
}

/// Writes the schedule as CSV with a `day,time,court,division,phase,team1,team2` header
pub fn write_schedule_csv<W: Write>(writer: W, games: &[ScheduledGame]) -> Result<(), csv::Error> {
    let mut wtr = WriterBuilder::new().has_headers(true).from_writer(writer);
    for game in games {
        wtr.serialize(ExportRow {
            day: game.day,
            time: &game.time,
            court: game.court,
            division: &game.division_name,
            phase: game.game_phase.label(),
            team1: &game.team1,
            team2: &game.team2,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_schedule_to_csv(games: &[ScheduledGame], csv_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let file = std::fs::File::create(csv_path)?;
    write_schedule_csv(file, games)?;
    Ok(())
}

/// The schedule as a CSV string, for download responses
pub fn schedule_csv_string(games: &[ScheduledGame]) -> Result<String, Box<dyn std::error::Error>> {
    let mut buffer = Vec::new();
    write_schedule_csv(&mut buffer, games)?;
    Ok(String::from_utf8(buffer)?)
}
