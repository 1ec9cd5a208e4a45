use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub backend: BackendSettings,
    #[serde(default)]
    pub tiers: TierSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8095
}

/// Where the platform API lives and how to talk to it
#[derive(Debug, Clone, Deserialize)]
pub struct BackendSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_sites_path")]
    pub sites_path: String,
    #[serde(default)]
    pub api_token: Option<String>,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            sites_path: default_sites_path(),
            api_token: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8094".to_string()
}
fn default_sites_path() -> String {
    "/api/sites".to_string()
}

/// Radius tier boundaries, in km, strictly increasing
#[derive(Debug, Clone, Deserialize)]
pub struct TierSettings {
    #[serde(default = "default_boundaries_km")]
    pub boundaries_km: Vec<f64>,
}

impl Default for TierSettings {
    fn default() -> Self {
        Self {
            boundaries_km: default_boundaries_km(),
        }
    }
}

fn default_boundaries_km() -> Vec<f64> {
    vec![5.0, 10.0]
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
    #[serde(default = "default_cache_entries")]
    pub max_entries: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl(),
            max_entries: default_cache_entries(),
        }
    }
}

fn default_cache_ttl() -> u64 {
    300
}
fn default_cache_entries() -> u64 {
    64
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml, then config/local.toml)
    /// 3. Environment variables (prefixed with GRIDGUARD_)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            // Local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // e.g., GRIDGUARD_SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("GRIDGUARD")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("GRIDGUARD")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Apply the short-form environment overrides used in deployment:
/// PLATFORM_API_URL and PLATFORM_API_TOKEN beat the prefixed form.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let base_url = env::var("PLATFORM_API_URL")
        .or_else(|_| env::var("GRIDGUARD_BACKEND__BASE_URL"))
        .ok();
    let api_token = env::var("PLATFORM_API_TOKEN")
        .or_else(|_| env::var("GRIDGUARD_BACKEND__API_TOKEN"))
        .ok();

    let mut builder = Config::builder().add_source(settings);

    if let Some(base_url) = base_url {
        builder = builder.set_override("backend.base_url", base_url)?;
    }
    if let Some(api_token) = api_token {
        builder = builder.set_override("backend.api_token", api_token)?;
    }

    builder.build()
}
