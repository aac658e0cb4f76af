use thiserror::Error;

#[derive(Error, Debug)]
pub enum FigureError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid image: {width}x{height} has no pixels")]
    InvalidImage { width: u32, height: u32 },

    #[error("Invalid region ({x1}, {y1})-({x2}, {y2}): width and height must be positive")]
    InvalidRegion { x1: i32, y1: i32, x2: i32, y2: i32 },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FigureError>;
