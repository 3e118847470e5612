pub mod app_config;
pub mod campaign;
pub mod config;
pub mod model;
pub mod store;

pub use app_config::{AppConfig, Environment};
pub use campaign::{load_campaign, parse_campaign, CampaignConfig, CommentSort};
pub use config::{load_app_config, load_app_config_from_env};
pub use model::{
    Campaign, CampaignRequest, CampaignStatus, CommentRecord, CommunicationStyle,
    DiscoveredProfile, Interaction, InteractionKind, MessageStyle, NewCampaign, OpeningMessage,
    ParseEnumError, Persona, Phase, PhaseCounter, ProfileAttributes, ProfilePatch, ProfileScore,
    ProgressState, ProgressStatus, ResumeHint, ScoreBreakdown, SourceKey, SourceType,
};
pub use store::{ProspectStore, StoreError};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read campaign file {path}: {source}")]
    CampaignFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse campaign file: {0}")]
    CampaignFileParse(#[from] serde_yaml::Error),

    #[error("campaign validation failed: {0}")]
    Validation(String),
}
