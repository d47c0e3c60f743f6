use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use roadbite::api::AppState;
use roadbite::search::{PolicyPreset, RouteRestaurantFinder, SearchRequest};
use roadbite::telemetry::init_tracing;
use roadbite::{GoogleMapsClient, MapsServices, RoadbiteConfig, RoadbiteError, render, web};

/// Find well-rated restaurants along a driving route
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Configuration file (defaults to <config dir>/roadbite/config.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search restaurants along the route between two places
    Search {
        /// Starting point
        #[arg(long, default_value = "")]
        from: String,

        /// Destination
        #[arg(long, default_value = "")]
        to: String,

        /// Selection policy: along-route, top-per-interval or stride
        #[arg(long)]
        policy: Option<PolicyPreset>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Serve the HTTP API
    Serve {
        /// Port to listen on (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

fn maps_services(config: &RoadbiteConfig) -> Result<MapsServices> {
    let client = GoogleMapsClient::new(&config.google, config.google_api_key()?)?;
    Ok(MapsServices::from_client(client))
}

async fn run(args: Args) -> Result<()> {
    let config = RoadbiteConfig::load_from_path(args.config)?;
    let telemetry = init_tracing(&config.logging, args.verbose)?;

    let result = match args.command {
        Command::Search {
            from,
            to,
            policy,
            json,
        } => search(&config, SearchRequest::new(from, to), policy, json).await,
        Command::Serve { port } => serve(config, port).await,
    };

    telemetry.shutdown();
    result
}

async fn search(
    config: &RoadbiteConfig,
    request: SearchRequest,
    preset: Option<PolicyPreset>,
    json: bool,
) -> Result<()> {
    // Reject empty input before anything talks to the network
    let request = request.validated()?;
    let finder = RouteRestaurantFinder::new(maps_services(config)?);
    let policy = config.search_policy(preset);

    let report = finder.search(&request, &policy).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", render::report_text(&report));
    }
    Ok(())
}

async fn serve(config: RoadbiteConfig, port: Option<u16>) -> Result<()> {
    let port = port.unwrap_or(config.server.port);
    let services = maps_services(&config)?;
    info!("Default search policy: {}", config.search.policy);

    let state = Arc::new(AppState::new(services, config));
    web::run(port, state).await
}

/// Text shown to the user for a failed command
fn describe(err: &anyhow::Error) -> String {
    match err.downcast_ref::<RoadbiteError>() {
        Some(RoadbiteError::Config { message }) => format!("Configuration error: {message}"),
        Some(e) => e.user_message(),
        None => format!("Error: {err:#}"),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", describe(&e));
            ExitCode::FAILURE
        }
    }
}
