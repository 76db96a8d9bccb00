use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod feature;
pub mod repository;

pub use feature::{AlignedFeatures, FeatureKey, FeatureKind, FeatureTable, FeatureVector};
pub use repository::{License, Readme, RepositoryRecord};

/// Query parameters for the recommendations endpoint
#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub limit: Option<usize>,
}

/// One ranked repository returned to the client
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationEntry {
    pub repository: String,
    pub score: f64,
    pub language: f64,
    pub topic: f64,
    pub readme: f64,
}

/// Response with the top-ranked repositories for a user
#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub username: String,
    /// Number of candidate repositories that were scored
    pub total: usize,
    pub generated_at: DateTime<Utc>,
    pub recommendations: Vec<RecommendationEntry>,
}

/// Query parameters for the dataset extraction endpoint
#[derive(Debug, Deserialize)]
pub struct DatasetQuery {
    /// Number of search results to process
    pub limit: Option<usize>,
}

/// Response of a user data extraction
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExtractionSummary {
    pub username: String,
    pub repositories: usize,
    pub skipped: usize,
}

/// Response of a candidate dataset extraction
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DatasetSummary {
    pub limit: usize,
    pub repositories: usize,
    pub skipped: usize,
}
