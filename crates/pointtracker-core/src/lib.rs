pub mod app_config;
pub mod cards;
pub mod catalog;
pub mod config;

pub use app_config::{AppConfig, Environment, MAX_SCRAPER_CONCURRENCY};
pub use cards::{
    slug_from_url, Bank, BonusLevel, CardListingCandidate, CardNetwork, CatalogRefreshMarker,
    ExtractedCardRecord, PointsType, StoredCard,
};
pub use catalog::{CatalogStats, CatalogStore};
pub use config::{build_app_config, load_app_config, load_app_config_from_env};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },
}
