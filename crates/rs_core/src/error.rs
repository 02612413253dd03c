use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("reward set has no components")]
    EmptyRewardSet,

    #[error("non-finite weight {weight} for component '{kind}'")]
    InvalidWeight { kind: String, weight: f32 },

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
