use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use weatherwise::report::{self, ReportService};
use weatherwise::{Coordinate, WeatherClient, WeatherWiseConfig, WeatherWiseError, dataset, logging};

#[derive(Parser, Debug)]
#[command(name = "weatherwise", version)]
#[command(about = "Current weather, forecasts and spaced-out nearby-city temperatures for a city", long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Full weather report for a city
    Report {
        #[arg(long)]
        city: String,
    },
    /// Spaced-out nearby cities with live temperatures around a coordinate
    Nearby {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Search radius in km
        #[arg(long)]
        radius: Option<f64>,
        /// Maximum number of cities
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<WeatherWiseError>() {
                Some(err) => eprintln!("{}", err.user_message()),
                None => eprintln!("Error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = WeatherWiseConfig::load_from_path(cli.config.clone())
        .context("Failed to load configuration")?;
    logging::init(&config.logging, cli.verbose)?;

    match cli.command {
        Command::Report { city } => {
            let service = ReportService::new(&config)?;
            let report = service.build(&city).await?;
            print!("{report}");
        }
        Command::Nearby {
            lat,
            lon,
            radius,
            limit,
        } => {
            let query = Coordinate::new(lat, lon)?;
            let client = WeatherClient::new(&config.weather)?;
            let selector =
                report::selector_for(&config, dataset::shared(&config.dataset), client)?;

            let mut params = *selector.params();
            if let Some(radius) = radius {
                params.radius_km = radius;
            }
            if let Some(limit) = limit {
                params.max_results = limit;
            }
            params.validate()?;

            let nearby = selector.select_nearby_with(query, &params).await;
            let mut out = String::new();
            report::write_nearby(&mut out, &nearby)?;
            println!("Nearby cities around {}", query.format_coordinates());
            print!("{out}");
        }
    }
    Ok(())
}
