pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{Config, ConfigError, PollingConfig, TmdbConfig, TraktConfig};
pub use credentials::{CredentialStore, TraktTokens};
pub use paths::{PathManager, container_base_path};
