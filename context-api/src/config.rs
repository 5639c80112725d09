use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use context_engine::{CacheConfig, CorpusConfig, EngineConfig};
use serde::Deserialize;
use serde_with::serde_as;
use strum::{Display, EnumString};

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub corpus: CorpusSettings,
    pub context: ContextSettings,
}

#[serde_as]
#[derive(Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub port: u16,
    pub host: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct CorpusSettings {
    /// JSON lines file; the server starts with an empty index without one
    #[serde(default)]
    pub path: Option<PathBuf>,
    pub default_field: String,
    pub window: usize,
}

#[serde_as]
#[derive(Deserialize, Clone, Debug)]
pub struct ContextSettings {
    pub memo_capacity: u64,
    pub blacklist_capacity: u64,
    pub slow_scan_threshold_ms: u64,
    pub max_contexts: usize,
    pub max_words: usize,
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub max_concurrent_requests: usize,
}

impl CorpusSettings {
    pub fn corpus_config(&self) -> CorpusConfig {
        CorpusConfig {
            default_field: self.default_field.clone(),
            window: self.window,
        }
    }
}

impl ContextSettings {
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            memo_capacity: self.memo_capacity,
            blacklist_capacity: self.blacklist_capacity,
            slow_scan_threshold: Duration::from_millis(self.slow_scan_threshold_ms),
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            max_contexts: self.max_contexts,
            max_words: self.max_words,
            ..EngineConfig::default()
        }
    }
}

pub fn read_config() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");
    let config_directory = base_path.join("config");

    let environment = Environment::from_str(
        std::env::var("APP_ENVIRONMENT")
            .unwrap_or_else(|_| "local".into())
            .as_str(),
    )
    .expect("Failed to parse APP_ENVIRONMENT");
    let environment_filename = format!("{}.yaml", environment);

    let settings = config::Config::builder()
        .add_source(config::File::from(config_directory.join("base.yaml")))
        .add_source(config::File::from(
            config_directory.join(environment_filename),
        ))
        .add_source(
            config::Environment::with_prefix("CONTEXT")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

#[derive(Display, Debug, EnumString)]
pub enum Environment {
    #[strum(ascii_case_insensitive, serialize = "local")]
    Local,
    #[strum(ascii_case_insensitive, serialize = "production")]
    Production,
}
