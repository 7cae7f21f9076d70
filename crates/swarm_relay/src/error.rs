use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse relay config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("Invalid relay config: {0}")]
    InvalidConfig(#[from] validator::ValidationErrors),

    #[error("Detection source error: {0}")]
    Source(String),
}

impl RelayError {
    /// Whether the failure is confined to one frame or one connection
    pub fn is_recoverable(&self) -> bool {
        match self {
            RelayError::Json(_) | RelayError::Source(_) => true,
            RelayError::Io(_) | RelayError::ConfigParse(_) | RelayError::InvalidConfig(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverability() {
        assert!(RelayError::Source("camera hiccup".into()).is_recoverable());
        assert!(RelayError::from(serde_json::from_str::<u8>("x").unwrap_err()).is_recoverable());
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(!RelayError::from(io).is_recoverable());
    }
}
