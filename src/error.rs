use rigctl_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StateError {
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Service location index out of range: {index}, known locations: {len}")]
    LocationOutOfRange { index: usize, len: usize },

    #[error("Unknown algorithm: {name}")]
    UnknownAlgorithm { name: String },

    #[error("System error: {0}")]
    System(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Parse error: {error}")]
    ParseError { error: String },

    #[error("Validation error: {field}, reason: {reason}")]
    ValidationError { field: String, reason: String },

    #[error("Invalid value: {field}, value: {value}, reason: {reason}")]
    InvalidValue { field: String, value: String, reason: String },
}

impl ConfigError {
    pub fn validation<F: Into<String>, R: Into<String>>(field: F, reason: R) -> Self {
        ConfigError::ValidationError {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_error_message() {
        let err = StateError::LocationOutOfRange { index: 7, len: 3 };
        assert_eq!(
            err.to_string(),
            "Service location index out of range: 7, known locations: 3"
        );
    }

    #[test]
    fn test_config_error_conversion() {
        let err: StateError = ConfigError::validation("session.stats_poll_secs", "must be > 0").into();
        assert!(matches!(err, StateError::Config(ConfigError::ValidationError { .. })));
    }
}
