use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use location_services::config::Config;
use location_services::location::{
    Address, GoogleMapsProvider, LatLng, LocationError, LocationService, TravelMode,
};

/// Location services: geocoding, reverse geocoding, routes, distances and
/// geofence checks over the Google Maps API.
///
/// Examples:
///   locsvc geocode "Drottninggatan 12" --city Stockholm --country Sweden
///   locsvc reverse --lat 59.3326 --lng 18.0649
///   locsvc route --from 59.33,18.06 --to 59.85,17.64 --mode walking
///   locsvc inside --point 5,5 --polygon fence.json
///   locsvc serve --port 8080
#[derive(Parser)]
#[command(name = "locsvc", version, about, long_about = None)]
struct Cli {
    /// Config file (TOML). Defaults to <config dir>/location-services/config.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Google Maps API key. Overrides GOOGLE_MAPS_API_KEY and the config file.
    #[arg(long, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Address to coordinates. Prints {"lat","lng"}; (0,0) means no match.
    Geocode {
        /// Street name and number, e.g. "Drottninggatan 12".
        street: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        country: Option<String>,
    },
    /// Coordinates to street address.
    Reverse {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
    },
    /// Route waypoints between two points ("lat,lng").
    Route {
        #[arg(long, allow_hyphen_values = true)]
        from: LatLng,
        #[arg(long, allow_hyphen_values = true)]
        to: LatLng,
        /// driving, walking, bicycling or transit.
        #[arg(long)]
        mode: Option<TravelMode>,
    },
    /// Travel distance in meters between two points ("lat,lng").
    Distance {
        #[arg(long, allow_hyphen_values = true)]
        from: LatLng,
        #[arg(long, allow_hyphen_values = true)]
        to: LatLng,
        #[arg(long)]
        mode: Option<TravelMode>,
    },
    /// Check whether a point lies inside a polygon (JSON array of {"lat","lng"}).
    Inside {
        #[arg(long, allow_hyphen_values = true)]
        point: LatLng,
        #[arg(long)]
        polygon: PathBuf,
    },
    /// Serve the JSON HTTP API.
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "location_services=info,locsvc=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(key) = cli.api_key {
        config.google.api_key = key;
    }
    debug!(server = ?config.server, travel_mode = %config.google.travel_mode, "configuration loaded");

    match cli.command {
        Command::Geocode { street, city, country } => {
            let address = Address {
                street_name: street.unwrap_or_default(),
                city: city.unwrap_or_default(),
                country: country.unwrap_or_default(),
                ..Default::default()
            };
            if address.is_empty() {
                bail!("No address given. Pass a street and/or --city/--country");
            }
            let point = service(&config, None)?.geocode(&address)?;
            if point == LatLng::default() {
                warn!(%address, "no match, returning (0, 0)");
            }
            print_json(&point)
        }
        Command::Reverse { lat, lng } => {
            let point = LatLng::new(lat, lng).validated()?;
            match service(&config, None)?.reverse_geocode(point)? {
                Some(address) => print_json(&address),
                None => bail!("No address found at {}", point),
            }
        }
        Command::Route { from, to, mode } => {
            let (from, to) = (from.validated()?, to.validated()?);
            let route = service(&config, mode)?.route(from, to)?;
            print_json(&route)
        }
        Command::Distance { from, to, mode } => {
            let (from, to) = (from.validated()?, to.validated()?);
            let meters = service(&config, mode)?.distance_meters(from, to)?;
            print_json(&serde_json::json!({ "meters": meters }))
        }
        Command::Inside { point, polygon } => {
            let point = point.validated()?;
            let fence = read_fence(&polygon)?;
            let inside = location_services::location::is_inside(point, &fence);
            print_json(&serde_json::json!({ "inside": inside }))
        }
        Command::Serve { host, port } => {
            let host = host.unwrap_or(config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let service = match service(&config, None) {
                Ok(s) => Some(s),
                Err(e) if matches!(e.downcast_ref::<LocationError>(), Some(LocationError::MissingApiKey)) => None,
                Err(e) => return Err(e),
            };
            let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
            runtime.block_on(location_services::server::start(&host, port, service))
        }
    }
}

fn service(config: &Config, mode: Option<TravelMode>) -> Result<LocationService> {
    let mut provider = GoogleMapsProvider::new(config.google.clone())?;
    if let Some(mode) = mode {
        provider = provider.with_mode(mode);
    }
    Ok(LocationService::new(provider))
}

/// Polygon file: a JSON array of `{"lat","lng"}`, every vertex in range.
fn read_fence(path: &Path) -> Result<Vec<LatLng>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read polygon file {}", path.display()))?;
    let fence: Vec<LatLng> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse polygon file {}", path.display()))?;
    location_services::location::check_fence(&fence)
        .with_context(|| format!("Bad vertex in polygon file {}", path.display()))?;
    Ok(fence)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
