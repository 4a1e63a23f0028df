use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("latitude must be between -90 and 90, got {0}")]
    Latitude(f64),
    #[error("longitude must be between -180 and 180, got {0}")]
    Longitude(f64),
    #[error("renderer failed: {0}")]
    Render(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
