//! Error types for the loading overlay.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while preparing overlay resources.
///
/// None of these are fatal to the overlay: the caller logs them and keeps
/// drawing without the affected resource.
#[derive(Error, Debug)]
pub enum OverlayError {
    /// The image file could not be opened or decoded.
    #[error("failed to decode '{}': {}", .path.display(), .source)]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The image decoded to zero pixels.
    #[error("image '{}' has zero dimensions", .path.display())]
    EmptyImage { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, OverlayError>;
