use thiserror::Error;

/// Errors raised while loading or validating Quiver configuration.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration: {0}")]
    ConfigLoad(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
