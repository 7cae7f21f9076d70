use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Failed to read config: {0}")]
    ConfigRead(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(#[from] validator::ValidationErrors),

    #[error("Unknown admin command: {0:?}")]
    UnknownCommand(String),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
