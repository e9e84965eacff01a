use std::path::PathBuf;

use thiserror::Error;

use horae_engine::render::TextureError;

use crate::text::FontKey;

/// Failure to produce a font or image from its source.
///
/// Always recoverable: the change that requested the asset is abandoned and
/// the previous visuals stay in place.
#[derive(Debug, Error)]
pub enum AssetLoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("failed to parse font: {0}")]
    Font(String),
    #[error("no font file registered for {0}")]
    UnknownFont(FontKey),
    #[error("failed to start asset worker: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("asset worker has shut down")]
    WorkerGone,
}

#[derive(Debug, Error, PartialEq)]
pub enum TextMeshError {
    #[error("font face could not be parsed: {0}")]
    FaceParse(String),
    #[error("cap tessellation failed: {0}")]
    Tessellation(String),
}

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("texture rejected by the device: {0}")]
    Texture(#[from] TextureError),
    #[error("texture rejected: {0}")]
    Rejected(String),
}
