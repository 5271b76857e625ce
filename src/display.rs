use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Write};

use crate::schedule::{ScheduleWarning, ScheduledGame};

/// Formats one game line: HH:MM Court N  [division / phase] team1 vs team2
pub fn format_game_line(game: &ScheduledGame) -> String {
    format!(
        "{} Court {}  [{} / {}] {} vs {}",
        game.time, game.court, game.division_name, game.game_phase, game.team1, game.team2
    )
}

fn by_day(games: &[ScheduledGame]) -> BTreeMap<u32, Vec<&ScheduledGame>> {
    let mut days: BTreeMap<u32, Vec<&ScheduledGame>> = BTreeMap::new();
    for game in games {
        days.entry(game.day).or_default().push(game);
    }
    days
}

/// Writes the day-by-day listing to any writer
pub fn write_schedule<W: Write>(out: &mut W, games: &[ScheduledGame]) -> io::Result<()> {
    for (day, day_games) in by_day(games) {
        writeln!(out, "** Day {} **", day)?;
        for game in day_games {
            writeln!(out, "{}", format_game_line(game))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Writes the schedule to a file in the text listing format
pub fn write_schedule_to_file(games: &[ScheduledGame], filename: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = File::create(filename)?;
    write_schedule(&mut file, games)?;
    Ok(())
}

/// Prints the schedule and its warnings in a readable format
pub fn print_schedule(games: &[ScheduledGame], warnings: &[ScheduleWarning]) {
    println!("\n=== Tournament Schedule ===");
    println!("Total games scheduled: {}", games.len());

    for (day, day_games) in by_day(games) {
        println!("\nDay {} ({} games):", day, day_games.len());
        for game in day_games {
            println!("  {} -> {}", game.id, format_game_line(game));
        }
    }

    if !warnings.is_empty() {
        println!("\n⚠️  Warnings ({}):", warnings.len());
        for warning in warnings {
            println!("  - {} [{}]: {}", warning.game_id, warning.division_name, warning.message);
        }
    }
}
