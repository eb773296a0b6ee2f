pub type FramecardResult<T> = Result<T, FramecardError>;

#[derive(thiserror::Error, Debug)]
pub enum FramecardError {
    /// A fit or layout computation was handed non-positive source dimensions.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// A background or source image could not be decoded.
    #[error("asset load failure: {0}")]
    AssetLoad(String),

    /// Image drawing was requested while no source image is loaded.
    #[error("no source image loaded")]
    NoSourceImage,

    #[error("validation error: {0}")]
    Validation(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FramecardError {
    pub fn invalid_dimensions(msg: impl Into<String>) -> Self {
        Self::InvalidDimensions(msg.into())
    }

    pub fn asset_load(msg: impl Into<String>) -> Self {
        Self::AssetLoad(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Whether re-running the whole pass may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::AssetLoad(_) | Self::Other(_))
    }
}

impl From<serde_json::Error> for FramecardError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}
