use anyhow::Result;
use orientdb_core::Config;
use orientdb_rs::DatabaseClient;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

mod console;
mod telemetry;

use console::{parse_command, Console, ConsoleCommand};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.json".to_string());

    let (config, load_error) = match Config::load(&config_path) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    let _guard = telemetry::init_telemetry(&config.logging)?;
    if let Some(e) = load_error {
        tracing::warn!(error = %e, "Failed to load {}, using defaults", config_path);
    }

    tracing::info!("orientdb-console starting");
    tracing::info!("  Database: {}", config.database_path);
    tracing::info!("  Structured responses: {}", config.structured_responses);
    tracing::info!("  Timeout: {:?}", config.timeout());

    let client = DatabaseClient::from_config(&config)?;
    let mut console = Console::new(client, &config.console);

    println!("OrientDB console for {}", config.database_path);
    println!("Type 'help' for commands.");

    if let Some((user, password)) = config.credentials() {
        let connect = ConsoleCommand::Connect {
            credentials: Some((user.to_string(), password.to_string())),
        };
        println!("{}", console.execute(connect).await);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("orientdb> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_command(&line) {
            Ok(Some(ConsoleCommand::Quit)) => break,
            Ok(Some(command)) => println!("{}", console.execute(command).await),
            Ok(None) => {}
            Err(e) => println!("!! {}", e),
        }
    }

    if console.client().is_open() {
        println!("{}", console.execute(ConsoleCommand::Disconnect).await);
    }

    tracing::info!("orientdb-console stopped");
    telemetry::shutdown_telemetry();
    drop(_guard);

    Ok(())
}
