use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("missing column `{column}` for platform {platform}")]
    MissingColumn { platform: String, column: String },

    #[error("unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("sentiment adapter error: {0}")]
    Sentiment(String),

    #[error("task failed: {0}")]
    Task(String),

    #[error("no platform batch completed")]
    NoPlatformCompleted,

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialize(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Serialize(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(format!("failed to parse config: {}", err))
    }
}
