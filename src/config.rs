use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::services::{RecommenderSettings, SignalWeights};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Directory holding `data.json` and per-user `<username>.json` files
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// GitHub REST API base URL
    #[serde(default = "default_github_api_url")]
    pub github_api_url: String,

    /// Personal access token sent as a bearer token, if set
    #[serde(default)]
    pub github_token: Option<String>,

    /// TF-IDF vocabulary cap
    #[serde(default = "default_max_features")]
    pub max_features: usize,

    /// Words shorter than this are dropped from READMEs
    #[serde(default = "default_min_token_length")]
    pub min_token_length: usize,

    /// Space-separated part-of-speech tags to keep
    #[serde(default = "default_pos_whitelist")]
    pub pos_whitelist: String,

    /// Optional `word<TAB>TAG` lexicon for the part-of-speech tagger
    #[serde(default)]
    pub pos_lexicon_path: Option<String>,

    #[serde(default = "default_weight")]
    pub weight_language: f64,

    #[serde(default = "default_weight")]
    pub weight_topic: f64,

    #[serde(default = "default_weight")]
    pub weight_readme: f64,

    /// Number of recommendations returned when the client sets no limit
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_data_dir() -> String {
    "./output".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_github_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_max_features() -> usize {
    3000
}

fn default_min_token_length() -> usize {
    3
}

fn default_pos_whitelist() -> String {
    "NN".to_string()
}

fn default_weight() -> f64 {
    1.0 / 3.0
}

fn default_top_n() -> usize {
    10
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Validates the numeric surface and builds the recommender settings
    pub fn recommender_settings(&self) -> AppResult<RecommenderSettings> {
        if self.max_features == 0 {
            return Err(AppError::InvalidInput(
                "max_features must be greater than zero".to_string(),
            ));
        }
        if self.top_n == 0 {
            return Err(AppError::InvalidInput(
                "top_n must be greater than zero".to_string(),
            ));
        }
        if self.pos_whitelist.split_whitespace().next().is_none() {
            return Err(AppError::InvalidInput(
                "pos_whitelist must name at least one tag".to_string(),
            ));
        }

        let weights = SignalWeights::new(self.weight_language, self.weight_topic, self.weight_readme)?;

        Ok(RecommenderSettings {
            max_features: self.max_features,
            min_token_length: self.min_token_length,
            pos_whitelist: self.pos_whitelist.clone(),
            weights,
            top_n: self.top_n,
        })
    }
}
