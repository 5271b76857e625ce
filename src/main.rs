use std::path::Path;

use log::info;

use tourney_scheduler::config::AppConfig;
use tourney_scheduler::display::{print_schedule, write_schedule_to_file};
use tourney_scheduler::export::export_schedule_to_csv;
use tourney_scheduler::parser::{load_divisions_csv, load_tournament};
use tourney_scheduler::schedule::{detect_warnings, generate_schedule};
use tourney_scheduler::web;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Check if we should run in web mode
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "web" {
        let port = args.get(2).and_then(|p| p.parse::<u16>().ok());
        let config = AppConfig::from_env(port)?;

        println!("Starting web server on port {}...", config.port);
        println!("Access the site at http://localhost:{}", config.port);

        web::start_server(config).await?;
        return Ok(());
    }

    // CLI mode
    let Some(tournament_path) = args.get(1) else {
        eprintln!("Usage:");
        eprintln!("  {} web [port]", args[0]);
        eprintln!("  {} <tournament.json> [divisions.csv]", args[0]);
        std::process::exit(2);
    };

    println!("Loading tournament from {}...", tournament_path);
    let mut input = load_tournament(tournament_path)?;
    if let Some(csv_path) = args.get(2) {
        input.divisions = load_divisions_csv(csv_path)?;
        println!("Loaded {} divisions from {}", input.divisions.len(), csv_path);
    }

    println!("\n\n=== Running Scheduler ===");
    let games = generate_schedule(&input.settings, &input.divisions)?;
    let warnings = detect_warnings(&games, &input.settings, &input.divisions);
    print_schedule(&games, &warnings);

    // Write schedules to files
    println!("\n=== Writing Schedule to Files ===");
    write_schedule_to_file(&games, "schedule.txt")?;
    export_schedule_to_csv(&games, Path::new("schedule.csv"))?;
    info!("Wrote {} games", games.len());
    println!("Schedule saved to:");
    println!("  - schedule.txt");
    println!("  - schedule.csv");

    Ok(())
}
