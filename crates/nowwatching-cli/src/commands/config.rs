use super::prompts;
use crate::output::{Output, OutputFormat};
use crate::ConfigCommands;
use color_eyre::Result;
use comfy_table::{Attribute, Cell, Color, Table};
use nowwatching_config::{Config, CredentialStore, PathManager, TmdbConfig};
use nowwatching_sources::trakt::{auth, API_URL};
use owo_colors::OwoColorize;
use serde_json::json;
use std::time::Duration;

pub async fn run_config(cmd: ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show { full } => show_config(full, output),
        ConfigCommands::Trakt {
            client_id,
            client_secret,
            username,
        } => configure_trakt(client_id, client_secret, username, output).await,
        ConfigCommands::Tmdb { api_key } => configure_tmdb(api_key, output),
        ConfigCommands::Polling { fast, slow, timeout } => configure_polling(fast, slow, timeout, output),
    }
}

fn load_config(path_manager: &PathManager) -> Result<Option<Config>> {
    let config_file = path_manager.config_file();
    if !config_file.exists() {
        return Ok(None);
    }
    Config::load_from_file(&config_file)
        .map(Some)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))
}

fn save_config(config: &Config, path_manager: &PathManager) -> Result<()> {
    let config_file = path_manager.config_file();
    config
        .save_to_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save config to {}: {}", config_file.display(), e))
}

/// Config sections other than `[trakt]` need the Trakt app to exist first.
fn require_config(path_manager: &PathManager) -> Result<Config> {
    load_config(path_manager)?.ok_or_else(|| {
        color_eyre::eyre::eyre!(
            "Configuration file not found at {}. Run 'nowwatching config trakt' first.",
            path_manager.config_file().display()
        )
    })
}

fn show_config(full: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();

    let Some(config) = load_config(&path_manager)? else {
        output.warn(format!("Configuration file not found at: {}", config_file.display()));
        output.info("Configuration will be created when you run 'nowwatching config trakt'.");
        return Ok(());
    };

    let secret = |s: &str| if full { s.to_string() } else { mask_string(s) };

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }

            println!();
            println!("{} {}", "Config File:".bold(), config_file.display());
            println!();

            let mut trakt_table = section_table("Trakt Configuration");
            trakt_table.add_row(vec![Cell::new("Client ID"), Cell::new(secret(&config.trakt.client_id))]);
            trakt_table.add_row(vec![
                Cell::new("Client Secret"),
                Cell::new(secret(&config.trakt.client_secret)),
            ]);
            trakt_table.add_row(vec![
                Cell::new("Username"),
                Cell::new(config.trakt.username.as_deref().unwrap_or("<from profile>")),
            ]);
            println!("{}", trakt_table);
            println!();

            match &config.tmdb {
                Some(tmdb) => {
                    let mut tmdb_table = section_table("TMDB Configuration");
                    tmdb_table.add_row(vec![Cell::new("API Key"), Cell::new(secret(&tmdb.api_key))]);
                    println!("{}", tmdb_table);
                }
                None => println!("{}", "TMDB: Not configured (artwork disabled)".bright_black()),
            }
            println!();

            let mut polling_table = section_table("Polling");
            polling_table.add_row(vec![
                Cell::new("Fast Interval"),
                Cell::new(format!("{} seconds", config.polling.fast_interval_secs)),
            ]);
            polling_table.add_row(vec![
                Cell::new("Slow Interval"),
                Cell::new(format!("{} seconds", config.polling.slow_interval_secs)),
            ]);
            polling_table.add_row(vec![
                Cell::new("Request Timeout"),
                Cell::new(format!("{} seconds", config.polling.request_timeout_secs)),
            ]);
            println!("{}", polling_table);
            println!();
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "config_file": config_file.display().to_string(),
                "trakt": {
                    "client_id": secret(&config.trakt.client_id),
                    "client_secret": secret(&config.trakt.client_secret),
                    "username": config.trakt.username,
                },
                "tmdb": config.tmdb.as_ref().map(|t| json!({ "api_key": secret(&t.api_key) })),
                "polling": {
                    "fast_interval_secs": config.polling.fast_interval_secs,
                    "slow_interval_secs": config.polling.slow_interval_secs,
                    "request_timeout_secs": config.polling.request_timeout_secs,
                },
            }));
        }
    }

    Ok(())
}

fn section_table(title: &str) -> Table {
    let mut table = Table::new();
    table.set_header(vec![Cell::new(title).fg(Color::Cyan).add_attribute(Attribute::Bold)]);
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

async fn configure_trakt(
    client_id_arg: Option<String>,
    client_secret_arg: Option<String>,
    username_arg: Option<String>,
    output: &Output,
) -> Result<()> {
    let path_manager = PathManager::default();
    path_manager
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create configuration directories: {}", e))?;

    let existing = load_config(&path_manager)?;

    output.println("");
    output.println("Follow the instructions to set up your Trakt API application:");
    output.println("  1. Log in to Trakt and open https://trakt.tv/oauth/applications");
    output.println("  2. Create a new API application named 'nowwatching'");
    output.println("  3. Use 'urn:ietf:wg:oauth:2.0:oob' as the Redirect URI");
    output.println("");

    let current_id = existing.as_ref().map(|c| c.trakt.client_id.clone()).filter(|s| !s.is_empty());
    let client_id = match client_id_arg {
        Some(id) => checked_client_id(id)?,
        None => loop {
            let input = prompts::prompt_string("Trakt Client ID", current_id.as_deref())?;
            match validate_client_id(&input) {
                Ok(()) => break input,
                Err(e) => output.error(format!("Validation error: {}", e)),
            }
        },
    };

    let client_secret = match client_secret_arg {
        Some(secret) => secret,
        None => prompts::prompt_secret("Trakt Client Secret", current_id.is_none())?,
    };

    if client_id.trim().is_empty() || client_secret.trim().is_empty() {
        return Err(color_eyre::eyre::eyre!("Client ID and Client Secret are required"));
    }

    let mut config = match existing {
        Some(mut config) => {
            config.trakt.client_id = client_id.clone();
            config.trakt.client_secret = client_secret.clone();
            config
        }
        None => Config::new(client_id.clone(), client_secret.clone()),
    };
    if username_arg.is_some() {
        config.trakt.username = username_arg;
    }
    save_config(&config, &path_manager)?;

    let credentials_file = path_manager.credentials_file();
    let mut cred_store = CredentialStore::new(credentials_file.clone());
    cred_store
        .load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;

    let http = auth::create_http_client(Duration::from_secs(30));
    let mut tokens = None;
    if let Some(stored) = cred_store.trakt_tokens() {
        output.info("Refreshing Trakt token...");
        match auth::refresh_access_token(&http, API_URL, &client_id, &client_secret, &stored.refresh_token).await {
            Ok(fresh) => tokens = Some(fresh),
            Err(e) => output.warn(format!("Token refresh failed ({}), starting new authorization", e)),
        }
    }

    let tokens = match tokens {
        Some(tokens) => tokens,
        None => {
            output.println("");
            output.println("Visit the following URL to authorize nowwatching:");
            output.println(format!("  {}", auth::authorization_url(&client_id).bright_cyan()));
            output.println("");
            let code = prompts::prompt_string("Authorization code", None)?;
            auth::exchange_code(&http, API_URL, &client_id, &client_secret, &code)
                .await
                .map_err(|e| color_eyre::eyre::eyre!("Trakt OAuth authentication failed: {}", e))?
        }
    };
    let expires_at = tokens.expires_at;

    cred_store.set_trakt_tokens(tokens);
    cred_store
        .save()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save credentials to {}: {}", credentials_file.display(), e))?;

    output.success("Trakt authentication successful!");
    output.println(format!("  Access token expires at: {}", expires_at.bright_green()));
    Ok(())
}

fn configure_tmdb(api_key_arg: Option<String>, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let mut config = require_config(&path_manager)?;

    let api_key = match api_key_arg {
        Some(key) => key,
        None => prompts::prompt_secret("TMDB API Key (leave empty to disable artwork)", false)?,
    };

    if api_key.trim().is_empty() {
        config.tmdb = None;
        save_config(&config, &path_manager)?;
        output.success("TMDB artwork disabled");
    } else {
        config.tmdb = Some(TmdbConfig { api_key });
        save_config(&config, &path_manager)?;
        output.success("TMDB artwork enabled");
    }
    Ok(())
}

fn configure_polling(fast: Option<u64>, slow: Option<u64>, timeout: Option<u64>, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let mut config = require_config(&path_manager)?;

    if fast.is_none() && slow.is_none() && timeout.is_none() {
        output.warn("No polling option specified. Use --fast, --slow or --timeout");
        return Ok(());
    }

    if let Some(fast) = fast {
        config.polling.fast_interval_secs = fast;
    }
    if let Some(slow) = slow {
        config.polling.slow_interval_secs = slow;
    }
    if let Some(timeout) = timeout {
        config.polling.request_timeout_secs = timeout;
    }

    config
        .validate()
        .map_err(|e| color_eyre::eyre::eyre!("Invalid polling settings: {}", e))?;
    save_config(&config, &path_manager)?;

    output.success(format!(
        "Polling every {}s while playing, every {}s when idle (timeout {}s)",
        config.polling.fast_interval_secs, config.polling.slow_interval_secs, config.polling.request_timeout_secs
    ));
    Ok(())
}

fn mask_string(s: &str) -> String {
    if s.is_empty() {
        return "<not set>".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    format!(
        "{}***{}",
        chars[..2].iter().collect::<String>(),
        chars[chars.len() - 2..].iter().collect::<String>()
    )
}

fn checked_client_id(input: String) -> Result<String> {
    validate_client_id(&input).map_err(|e| color_eyre::eyre::eyre!("Invalid --client-id: {}", e))?;
    Ok(input)
}

fn validate_client_id(input: &str) -> Result<(), &'static str> {
    if input.trim().is_empty() {
        return Err("Client ID cannot be empty");
    }
    if input.chars().any(char::is_whitespace) {
        return Err("Client ID cannot contain whitespace");
    }
    Ok(())
}
