// Crate-wide error type

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("docker api error: {0}")]
    Docker(#[from] bollard::errors::Error),
    #[error("no stats returned for container {0}")]
    StatsUnavailable(String),
    #[error("unknown container state {0:?}")]
    UnknownContainerState(String),
    #[error("invalid store name {0:?}")]
    InvalidStoreName(String),
    #[error("record must serialize to an object, got {0}")]
    InvalidRecord(&'static str),
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("sqlite error: {0}")]
    Sqlite(#[from] sqlx::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("host metrics error: {0}")]
    Host(String),
    #[error("sampler task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, Error>;
