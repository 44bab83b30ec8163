use thiserror::Error;

pub type KpiResult<T> = Result<T, KpiError>;

#[derive(Debug, Error)]
pub enum KpiError {
    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("missing required {0} formatter")]
    MissingFormatter(&'static str),
}
