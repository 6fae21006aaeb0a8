use stagewise_core::ConfigurationError;
use thiserror::Error;

pub(crate) type StagewiseResult<T> = Result<T, StagewiseError>;

#[derive(Error, Debug)]
pub(crate) enum StagewiseError {
    #[error("IO error, more details: {0}")]
    IOError(#[from] std::io::Error),
    #[error("The pipeline could not be assembled, more details: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("The task is invalid: {0}")]
    InvalidTask(String),
}
