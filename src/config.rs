use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::core::MatcherConfig;
use crate::models::ScoringWeights;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
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

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSettings {
    /// Shared L2 cache; nearby results are only cached in-process without it
    pub redis_url: Option<String>,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_radius_km")]
    pub default_radius_km: f64,
    #[serde(default = "default_page_size")]
    pub default_page_size: i64,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: i64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_radius_km: default_radius_km(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

fn default_radius_km() -> f64 { 50.0 }
fn default_page_size() -> i64 { 10 }
fn default_max_page_size() -> i64 { 100 }

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringSettings {
    #[serde(default = "default_proximity_weight")]
    pub proximity_weight: f64,
    #[serde(default = "default_rating_weight")]
    pub rating_weight: f64,
    #[serde(default = "default_max_distance_km")]
    pub max_distance_km: f64,
    #[serde(default = "default_max_assignment_attempts")]
    pub max_assignment_attempts: u32,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            proximity_weight: default_proximity_weight(),
            rating_weight: default_rating_weight(),
            max_distance_km: default_max_distance_km(),
            max_assignment_attempts: default_max_assignment_attempts(),
        }
    }
}

fn default_proximity_weight() -> f64 { 0.7 }
fn default_rating_weight() -> f64 { 0.3 }
fn default_max_distance_km() -> f64 { 10.0 }
fn default_max_assignment_attempts() -> u32 { 3 }

impl ScoringSettings {
    pub fn weights(&self) -> ScoringWeights {
        ScoringWeights {
            proximity_weight: self.proximity_weight,
            rating_weight: self.rating_weight,
            max_distance_km: self.max_distance_km,
        }
    }
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

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with FEASTO__)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., FEASTO__SCORING__PROXIMITY_WEIGHT -> scoring.proximity_weight
            .add_source(feasto_environment())
            .build()?;

        let settings = apply_database_url(settings)?;

        let settings: Settings = settings.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the engine cannot score with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scoring = &self.scoring;
        for (name, value) in [
            ("scoring.proximity_weight", scoring.proximity_weight),
            ("scoring.rating_weight", scoring.rating_weight),
            ("scoring.max_distance_km", scoring.max_distance_km),
            ("search.default_radius_km", self.search.default_radius_km),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::Message(format!("{} must be a finite number", name)));
            }
        }

        if self.search.max_page_size < 1 {
            return Err(ConfigError::Message("search.max_page_size must be at least 1".to_string()));
        }

        if scoring.max_assignment_attempts == 0 {
            return Err(ConfigError::Message(
                "scoring.max_assignment_attempts must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Warn when the scoring weights do not sum to 1.0; returns whether it warned.
    ///
    /// Call once logging is initialised, the weights are used as given either way.
    pub fn warn_on_unnormalised_weights(&self) -> bool {
        let weight_sum = self.scoring.proximity_weight + self.scoring.rating_weight;
        if (weight_sum - 1.0).abs() <= 1e-9 {
            return false;
        }

        tracing::warn!(
            "Scoring weights sum to {} instead of 1.0; scores will not be normalised",
            weight_sum
        );
        true
    }

    pub fn matcher_config(&self) -> MatcherConfig {
        MatcherConfig {
            weights: self.scoring.weights(),
            default_radius_km: self.search.default_radius_km,
            default_page_size: self.search.default_page_size,
        }
    }
}

fn feasto_environment() -> Environment {
    Environment::with_prefix("FEASTO")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// `DATABASE_URL` wins over anything set in files
fn apply_database_url(settings: Config) -> Result<Config, ConfigError> {
    match std::env::var("DATABASE_URL") {
        Ok(url) => Config::builder()
            .add_source(settings)
            .set_override("database.url", url)?
            .build(),
        Err(_) => Ok(settings),
    }
}
