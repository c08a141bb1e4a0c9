use std::path::PathBuf;
use std::process::ExitCode;

use quantdb::config::{default_config_path, load_config};
use quantdb::{DatabaseClient, Row};
use tracing::{error, info};

/// Connects, inserts one quote, reads it back, and prints every match as JSON.
fn run(config_path: PathBuf) -> quantdb::Result<()> {
    let config = load_config(&config_path)?;
    info!("Loaded configuration from {}", config_path.display());

    let mut client = DatabaseClient::new(config.database);
    let mut db = client.connect_scoped()?;

    db.insert_data(
        "stocks",
        &Row::new()
            .with("code", "AAPL")
            .with("price", 150.0)
            .with("date", "2024-04-11"),
    )?;

    let rows = db.execute_query("SELECT * FROM stocks WHERE code=?", ["AAPL"])?;
    for record in &rows {
        println!("{}", serde_json::to_string(record)?);
    }

    Ok(())
}

fn main() -> ExitCode {
    // Initialize the logging system using tracing subscriber
    tracing_subscriber::fmt::init();

    info!("Starting quantdb demo...");

    let config_path = match std::env::args().nth(1) {
        Some(path) => PathBuf::from(path),
        None => match default_config_path() {
            Some(path) => path,
            None => {
                eprintln!("No configuration file given and no config directory available.");
                eprintln!("Usage: quantdb-demo <config.toml>");
                return ExitCode::FAILURE;
            }
        },
    };

    match run(config_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Demo failed: {}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
