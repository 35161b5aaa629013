mod api;
mod catalog;
mod config;
mod frame;
mod params;
mod planner;
mod stream;

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::api::ApiClient;
use crate::catalog::visible_hours;
use crate::config::Config;
use crate::frame::fov_degrees;
use crate::planner::Planner;
use crate::stream::{DownloadMode, HttpConnector, SessionStatus};

#[derive(Parser)]
#[command(name = "skyframe")]
#[command(about = "Deep-sky imaging target planner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the angular field of view of a telescope/camera pair
    Fov {
        #[arg(long)]
        focal_length: f64,
        #[arg(long)]
        sensor_width: f64,
        #[arg(long)]
        sensor_height: f64,
    },
    /// Validate a client configuration file
    CheckConfig { config: String },
    /// Stream the catalog once and print the filtered, sorted view
    Plan {
        config: String,
        /// Override the configured image download mode
        #[arg(long)]
        mode: Option<DownloadMode>,
        /// Search text; overrides every other filter
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 25)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Fov { focal_length, sensor_width, sensor_height } => {
            fov(focal_length, sensor_width, sensor_height)
        }
        Commands::CheckConfig { config } => check_config(&config),
        Commands::Plan { config, mode, search, limit } => {
            plan(&config, mode, search.as_deref().unwrap_or(""), limit).await
        }
    }
}

fn fov(focal_length: f64, sensor_width: f64, sensor_height: f64) -> ExitCode {
    if focal_length <= 0.0 || sensor_width <= 0.0 || sensor_height <= 0.0 {
        eprintln!("focal length and sensor dimensions must be positive");
        return ExitCode::FAILURE;
    }
    let w = fov_degrees(sensor_width, focal_length);
    let h = fov_degrees(sensor_height, focal_length);
    println!("field of view: {:.4}° x {:.4}°", w, h);
    println!("               {:.1}' x {:.1}'", w * 60.0, h * 60.0);
    ExitCode::SUCCESS
}

fn check_config(path: &str) -> ExitCode {
    match Config::from_file(path) {
        Ok(config) => {
            println!("Config is valid (server: {})", config.server.base_url);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Config error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn plan(path: &str, mode: Option<DownloadMode>, search: &str, limit: usize) -> ExitCode {
    let config = match Config::from_file(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let debounce = match config.stream.debounce() {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let client = Arc::new(ApiClient::new(&config.server.base_url));
    let settings = match config.settings {
        Some(settings) => settings,
        None => match client.settings().await {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("Failed to fetch settings from backend: {}", e);
                return ExitCode::FAILURE;
            }
        },
    };

    let connector = Arc::new(HttpConnector::new(&config.server.base_url));
    let mode = mode.unwrap_or(config.stream.download_mode);
    let mut planner = Planner::new(connector, client, settings, debounce, mode);

    planner.run_session().await;
    if planner.status() == SessionStatus::Error {
        eprintln!("Stream failed: {}", planner.status_text());
        return ExitCode::FAILURE;
    }

    let view = planner.view(search);
    let shared = planner.state();
    let state = shared.lock().unwrap();
    println!("{} of {} objects in view", view.len(), state.store.len());
    println!(
        "{:<12} {:<12} {:>6} {:>7} {:>7} {:>6}  {}",
        "NAME", "TYPE", "MAG", "SIZE'", "PEAK°", "HOURS", "IMAGE"
    );
    for name in view.iter().take(limit) {
        let Some(record) = state.store.get(name) else {
            continue;
        };
        let hours = visible_hours(
            &record.altitude_graph,
            planner.settings().min_altitude,
            state.night_times.night(),
        );
        println!(
            "{:<12} {:<12} {:>6} {:>7} {:>7} {:>6.1}  {}",
            record.name,
            record.object_type.as_deref().unwrap_or("-"),
            record.mag.map_or_else(|| "-".to_string(), |m| format!("{:.1}", m)),
            record.maj_ax.map_or_else(|| "-".to_string(), |s| format!("{:.1}", s)),
            record
                .peak_altitude()
                .map_or_else(|| "-".to_string(), |a| format!("{:.1}", a)),
            hours,
            record.image_url.as_deref().unwrap_or(""),
        );
    }
    ExitCode::SUCCESS
}
