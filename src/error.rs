use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures at the edges of the crate: reading input, decoding JSON,
/// loading config and compiling Typst. Rendering itself cannot fail.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON content: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Typst compilation failed: {0}")]
    Typst(String),

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("Binary output needs a file; pass --output")]
    MissingOutput,
}
