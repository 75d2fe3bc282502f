use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid date (use YYYY-MM-DD): {0}")]
    InvalidDate(String),
    #[error("invalid time (use HH:MM): {0}")]
    InvalidTime(String),
    #[error("block must end after it starts: {start}-{end}")]
    InvalidRange { start: String, end: String },
    #[error("recurrence interval must be at least 1")]
    InvalidInterval,
    #[error("weekday index out of range (0=Sunday..6=Saturday): {0}")]
    InvalidWeekday(u8),
    #[error("unknown category: {0}")]
    UnknownCategory(String),
    #[error("time block not found: {0}")]
    BlockNotFound(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_yaml::Error),
    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
