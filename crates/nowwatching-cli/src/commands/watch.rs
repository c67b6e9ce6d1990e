use crate::output::Output;
use color_eyre::Result;
use nowwatching_config::{Config, CredentialStore, PathManager};
use nowwatching_core::{IntervalPolicy, MediaPlayerView, PollerHandle, WatchingCoordinator, WatchingSnapshot};
use nowwatching_sources::{TmdbClient, TraktClient};
use std::sync::Arc;
use tracing::{error, info, warn};

pub async fn run_watch(once: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();
    if !config_file.exists() {
        return Err(color_eyre::eyre::eyre!(
            "Configuration file not found at {}. Run 'nowwatching config trakt' first.",
            config_file.display()
        ));
    }

    let config = Config::load_from_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
    config
        .validate()
        .map_err(|e| color_eyre::eyre::eyre!("Configuration validation failed: {}", e))?;

    let credentials_file = path_manager.credentials_file();
    let mut cred_store = CredentialStore::new(credentials_file.clone());
    cred_store
        .load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;

    let timeout = config.polling.request_timeout();
    let trakt = Arc::new(TraktClient::from_credentials(&config.trakt, &cred_store, timeout));
    if !trakt.has_credentials().await {
        return Err(color_eyre::eyre::eyre!(
            "No Trakt tokens found. Run 'nowwatching config trakt' to authenticate."
        ));
    }

    let username = match &config.trakt.username {
        Some(username) => username.clone(),
        None => {
            let profile = trakt
                .user_profile()
                .await
                .map_err(|e| color_eyre::eyre::eyre!("Failed to look up Trakt profile: {}", e))?;
            output.info(format!("Signed in to Trakt as {}", profile.display_name()));
            profile.username
        }
    };

    let mut coordinator = WatchingCoordinator::new(trakt, IntervalPolicy::from_config(&config.polling));
    match config.tmdb_api_key() {
        Some(api_key) => {
            coordinator = coordinator.with_image_catalog(Arc::new(TmdbClient::new(api_key.to_string(), timeout)));
        }
        None => info!(operation = "watch_setup", "No [tmdb] section configured, artwork lookups disabled"),
    }

    if once {
        let status = coordinator
            .refresh()
            .await
            .map_err(|e| color_eyre::eyre::eyre!("Failed to fetch watching status: {}", e))?;
        output.player(&MediaPlayerView::from_status(&status, &username, chrono::Utc::now()));
        return Ok(());
    }

    info!(
        operation = "watch_started",
        username = %username,
        fast_secs = config.polling.fast_interval_secs,
        slow_secs = config.polling.slow_interval_secs,
        "Watching Trakt activity"
    );

    let handle = PollerHandle::spawn(coordinator);
    let mut rx = handle.subscribe();

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    error!(operation = "watch_signal", error = %e, "Failed to listen for shutdown signal");
                }
                info!(operation = "watch_shutdown", "Shutdown requested");
                break;
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    warn!(operation = "watch_stopped", "Poller stopped publishing");
                    break;
                }
                let snapshot = rx.borrow_and_update().clone();
                if let Some(snapshot) = snapshot {
                    print_snapshot(&snapshot, &username, output);
                }
            }
        }
    }

    handle.shutdown().await;
    Ok(())
}

fn print_snapshot(snapshot: &WatchingSnapshot, username: &str, output: &Output) {
    output.player(&MediaPlayerView::from_status(&snapshot.status, username, snapshot.updated_at));
}
