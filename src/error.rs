use thiserror::Error;

#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unknown distribution family: {0}")]
    UnknownFamily(String),
}

pub type Result<T> = std::result::Result<T, MirrorError>;
