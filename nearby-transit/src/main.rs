use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use futures::future::join_all;
use tracing_subscriber::EnvFilter;

use nearby_transit::favorites::FavoritesStore;
use nearby_transit::preferences::PreferencesStore;
use nearby_transit::stations::{DepartureMode, StationsStore, SyncConfig};
use nearby_transit::storage::{FileStore, KeyValueStore};
use nearby_transit::vbb::{TransitApi, VbbClient, VbbConfig};

/// S+U Alexanderplatz.
const DEFAULT_POSITION: (f64, f64) = (52.521508, 13.411267);

const DEFAULT_DATA_DIR: &str = ".nearby-transit";

/// Show nearby stops and their next departures.
#[derive(Parser, Debug)]
#[command(name = "nearby-transit", version, about)]
struct Args {
    /// Latitude to search around (defaults to Alexanderplatz)
    #[arg(allow_negative_numbers = true, requires = "longitude")]
    latitude: Option<f64>,

    /// Longitude to search around
    #[arg(allow_negative_numbers = true)]
    longitude: Option<f64>,

    /// Keep refreshing departures at the configured interval
    #[arg(long)]
    watch: bool,
}

impl Args {
    fn position(&self) -> (f64, f64) {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => DEFAULT_POSITION,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let (latitude, longitude) = args.position();

    let mut vbb_config = VbbConfig::new();
    if let Ok(url) = std::env::var("VBB_BASE_URL") {
        vbb_config = vbb_config.with_base_url(url);
    }
    let client = match VbbClient::new(vbb_config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Failed to create VBB client: {e}");
            std::process::exit(1);
        }
    };

    let data_dir = std::env::var("NEARBY_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR));
    let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(data_dir));
    let preferences = Arc::new(PreferencesStore::load(storage.clone()));
    let favorites = Arc::new(FavoritesStore::load(storage, preferences.clone()));

    let store = StationsStore::new(
        client,
        preferences.clone(),
        favorites.clone(),
        SyncConfig::default(),
    );

    store.fetch_nearby_stations(latitude, longitude).await;
    if let Some(error) = store.error() {
        eprintln!("{error}");
        std::process::exit(1);
    }

    refresh_departures(&store, &favorites, DepartureMode::Cached).await;

    if !args.watch {
        return;
    }

    let mut interval = tokio::time::interval(preferences.preferences().refresh_interval());
    interval.tick().await; // First tick is immediate, skip it
    loop {
        interval.tick().await;
        refresh_departures(&store, &favorites, DepartureMode::Force).await;
    }
}

/// Fetch departures for every ranked station concurrently, then print them.
async fn refresh_departures<A: TransitApi>(
    store: &StationsStore<A>,
    favorites: &FavoritesStore,
    mode: DepartureMode,
) {
    let stations = store.sorted_stations();
    join_all(
        stations
            .iter()
            .map(|station| store.fetch_departures(&station.id, mode)),
    )
    .await;

    for station in &stations {
        let star = if favorites.is_favorite(&station.id) {
            "*"
        } else {
            " "
        };
        let distance = station
            .distance
            .map(|d| format!("{d:.0} m"))
            .unwrap_or_default();
        println!("{star} {} ({}) {distance}", station.name, station.transit_type());

        for trip in store.departures(&station.id).unwrap_or_default() {
            let status = if trip.cancelled {
                "cancelled".to_string()
            } else if trip.is_delayed() {
                format!("+{}", trip.delay)
            } else {
                String::new()
            };
            println!(
                "    {} {:<6} {:<30} {:>3} {}",
                trip.when.with_timezone(&chrono::Local).format("%H:%M"),
                trip.line.name,
                trip.direction,
                trip.platform,
                status
            );
        }
    }

    if let Some(error) = store.error() {
        eprintln!("{error}");
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_alexanderplatz() {
        let args = Args::try_parse_from(["nearby-transit"]).unwrap();
        assert_eq!(args.position(), DEFAULT_POSITION);
        assert!(!args.watch);
    }

    #[test]
    fn accepts_negative_coordinates() {
        let args = Args::try_parse_from(["nearby-transit", "-33.87", "-151.2", "--watch"]).unwrap();
        assert_eq!(args.position(), (-33.87, -151.2));
        assert!(args.watch);
    }

    #[test]
    fn latitude_requires_longitude() {
        assert!(Args::try_parse_from(["nearby-transit", "52.5"]).is_err());
        assert!(Args::try_parse_from(["nearby-transit", "north", "east"]).is_err());
    }
}
