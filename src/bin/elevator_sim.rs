use clap::{App, Arg, ArgMatches};
use colored::*;
use elevator_sim::input::{InputCommand, HELP};
use elevator_sim::{ElevatorSystem, SimulationConfig};
use std::str::FromStr;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, Level};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = App::new("elevator-sim")
        .version("0.1.0")
        .about("🛗 Single cabin elevator simulator with directional dispatch")
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("FILE")
                .help("JSON file with simulation parameters")
                .takes_value(true),
        )
        .arg(number_arg::<u32>("floors", "Number of floors"))
        .arg(number_arg::<f64>("floor-height", "Floor height in meters"))
        .arg(number_arg::<f64>("velocity", "Cabin velocity in m/s"))
        .arg(number_arg::<f64>("doors-timeout", "Open doors timeout in seconds"))
        .arg(number_arg::<i32>("initial-floor", "Floor the cabin starts at"))
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Log dispatch decisions"),
        )
        .get_matches();

    let level = if matches.is_present("verbose") {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    let config = load_config(&matches)?;
    let system = ElevatorSystem::start(&config).await?;

    println!("{}", HELP.bright_cyan());
    if let Err(e) = run_console(&system).await {
        error!("Console error: {}", e);
    }

    system.shutdown();
    Ok(())
}

fn number_arg<'a, T: FromStr + 'static>(name: &'a str, help: &'a str) -> Arg<'a, 'a> {
    Arg::with_name(name)
        .long(name)
        .value_name("N")
        .help(help)
        .takes_value(true)
        .validator(|v| match v.parse::<T>() {
            Ok(_) => Ok(()),
            Err(_) => Err(format!("'{}' is not a valid number", v)),
        })
}

fn load_config(matches: &ArgMatches) -> Result<SimulationConfig, Box<dyn std::error::Error>> {
    let mut config = match matches.value_of("config") {
        Some(path) => SimulationConfig::from_file(path)?,
        None => SimulationConfig::default(),
    };

    // Command line flags override file values; validators already checked them.
    if let Some(floors) = parsed(matches, "floors") {
        config.floors = floors;
    }
    if let Some(height) = parsed(matches, "floor-height") {
        config.floor_height_m = height;
    }
    if let Some(velocity) = parsed(matches, "velocity") {
        config.velocity_mps = velocity;
    }
    if let Some(timeout) = parsed(matches, "doors-timeout") {
        config.open_doors_timeout_s = timeout;
    }
    if let Some(floor) = parsed(matches, "initial-floor") {
        config.initial_floor = floor;
    }

    config.validate()?;
    Ok(config)
}

fn parsed<T: FromStr>(matches: &ArgMatches, name: &str) -> Option<T> {
    matches.value_of(name).and_then(|v| v.parse().ok())
}

async fn run_console(system: &ElevatorSystem) -> Result<(), Box<dyn std::error::Error>> {
    let dispatch = system.dispatch();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => break,
        };
        let Some(line) = line else {
            break;
        };

        let command = match InputCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{}", e.to_string().red());
                continue;
            }
        };

        if let Some(floor) = command.floor() {
            if !dispatch.valid_floor(floor) {
                println!(
                    "{}",
                    format!("Invalid floor number. Valid range: {:?}", dispatch.floors_range()).red()
                );
                continue;
            }
        }

        match command {
            InputCommand::External(floor) => dispatch.external_request(floor).await?,
            InputCommand::Internal(floor) => dispatch.internal_request(floor).await?,
            InputCommand::Status => {
                let cabin = system.cabin().state().await?;
                let pending = dispatch.pending().await?;
                let status = serde_json::json!({
                    "cabin": cabin,
                    "direction": cabin.direction(),
                    "pending": pending,
                });
                println!("{}", serde_json::to_string_pretty(&status)?.green());
            }
            InputCommand::Quit => break,
        }
    }
    Ok(())
}
