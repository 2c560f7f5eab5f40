use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("DISCORD_TOKEN environment variable not set")]
    MissingToken,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to read file at {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("JSON serialization error: {0}")]
    JsonSerialize(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown week group: {0}")]
    UnknownWeek(String),

    #[error("channel {0} is not an accessible text channel in the configured guild")]
    ChannelUnavailable(u64),
}

pub type Result<T> = std::result::Result<T, AppError>;
