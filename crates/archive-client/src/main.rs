//! ArcHive client binary entry point.
//!
//! Composes the storage capability, the HTTP client, the auth store,
//! the daily refresh service, and the server event listener, then runs
//! until interrupted.

mod logging;

use archive_api::ApiClient;
use archive_auth::AuthStore;
use archive_refresh::{DailyRefreshService, RefreshEvents, ServerEventListener};
use archive_routes::{Navigator, Route};
use archive_storage::{JsonFileStore, KeyValueStore, MemoryStore};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Headless ArcHive client: session lifecycle and daily refresh.
#[derive(Parser, Debug)]
#[command(name = "archive-client")]
#[command(about = "Headless ArcHive client: session lifecycle and daily refresh")]
struct Args {
    /// Backend origin including the API prefix.
    #[arg(long, env = "ARCHIVE_API_URL", default_value = "http://127.0.0.1:8080/api")]
    api_url: String,

    /// Directory for persisted client state.
    /// Defaults to ~/.archive.
    #[arg(long, env = "ARCHIVE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Keep all state in memory (nothing persisted).
    #[arg(long)]
    ephemeral: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Also write structured JSONL logs to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// Headless stand-in for browser navigation: forced redirects are
/// logged for whatever shell embeds the engine.
struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn navigate(&self, route: Route) {
        warn!(path = route.path(), "Forced navigation");
    }
}

/// The server event stream lives at the backend origin, not under the
/// API prefix.
fn events_url(api_url: &str) -> String {
    let origin = api_url.trim_end_matches('/').trim_end_matches("/api");
    format!("{}/events", origin)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    logging::init(&args.log_level, args.log_file.as_deref())?;
    info!(api_url = %args.api_url, "ArcHive client starting");

    let storage: Arc<dyn KeyValueStore> = if args.ephemeral {
        Arc::new(MemoryStore::new())
    } else {
        let data_dir = args.data_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".archive")
        });
        Arc::new(JsonFileStore::open(data_dir.join("client.json"))?)
    };

    let api = ApiClient::new(
        args.api_url.clone(),
        storage.clone(),
        Arc::new(TracingNavigator),
    );
    let auth = AuthStore::new(api.clone(), storage.clone());
    auth.restore_from_storage()?;
    info!(authenticated = auth.is_authenticated(), "Session restored");

    let events = RefreshEvents::new();
    let refresh = DailyRefreshService::new(api, auth, storage, events.clone());
    refresh.start();

    let listener = ServerEventListener::new(events_url(&args.api_url), events.clone());
    tokio::spawn(async move { listener.run().await });

    // Surface bus traffic in the logs; a UI shell would subscribe here.
    let mut bus = events.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = bus.recv().await {
            info!(?event, "Refresh event");
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("Received shutdown signal, exiting...");
    refresh.stop();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_url_strips_api_prefix() {
        assert_eq!(
            events_url("http://127.0.0.1:8080/api"),
            "http://127.0.0.1:8080/events"
        );
        assert_eq!(
            events_url("https://archive.app/api/"),
            "https://archive.app/events"
        );
        assert_eq!(
            events_url("http://localhost:9000"),
            "http://localhost:9000/events"
        );
    }

    #[test]
    fn args_defaults() {
        let args = Args::parse_from(["archive-client"]);
        assert_eq!(args.api_url, "http://127.0.0.1:8080/api");
        assert!(!args.ephemeral);
        assert_eq!(args.log_level, "info");
    }
}
