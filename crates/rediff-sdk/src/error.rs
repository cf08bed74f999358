use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("config error: {0}")]
    Config(String),
}

pub type SdkResult<T> = Result<T, SdkError>;
