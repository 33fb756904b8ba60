use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("metadata error: {0}")]
    Exif(#[from] exif::Error),

    #[error("document error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported format: {mime}")]
    UnsupportedFormat { mime: String },

    #[error("{tool} failed: {detail}")]
    Engine { tool: &'static str, detail: String },

    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    #[error("dictionary could not be read: {}", .0.display())]
    Dictionary(PathBuf),
}

impl Error {
    /// Build an engine failure from a tool name and whatever detail the
    /// tool left behind (stderr, exit status, parse error).
    pub fn engine(tool: &'static str, detail: impl Into<String>) -> Self {
        Error::Engine {
            tool,
            detail: detail.into(),
        }
    }
}
