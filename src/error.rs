use miette::Diagnostic;
use thiserror::Error;

/// Main error type for the roster service
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(weekly_roster::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(weekly_roster::config))]
    Config(String),

    #[error("Settings error: {0}")]
    #[diagnostic(
        code(weekly_roster::settings),
        help("Error loading settings file. Please check the file format.")
    )]
    Settings(String),

    #[error("Export error: {0}")]
    #[diagnostic(code(weekly_roster::export))]
    Export(String),

    #[error(transparent)]
    #[diagnostic(code(weekly_roster::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(weekly_roster::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(weekly_roster::other))]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Export(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type RosterResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Invalid environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create settings errors
pub fn settings_error(message: &str) -> Error {
    Error::Settings(message.to_string())
}

/// Helper to create export errors
pub fn export_error(message: &str) -> Error {
    Error::Export(message.to_string())
}
