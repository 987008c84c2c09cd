// Error types for the mural. Every variant states *where* things went wrong.
use thiserror::Error;

/// Top-level error for the window front-end and anything that touches the
/// outside world (window, image codecs, the artwork store).
#[derive(Debug, Error)]
pub enum Error {
    #[error("Window init error: {0}")]
    WindowInit(String),
    #[error("Window update error: {0}")]
    WindowUpdate(String),
    #[error("Image codec error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Artwork store error: {0}")]
    Store(#[from] StoreError),
    #[error("Invalid color: {0}")]
    Color(#[from] ColorParseError),
    #[error("Invalid image payload: {0}")]
    Payload(String),
}

/// Failures of the key-value store and the artwork collection kept in it.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// The stored collection could not be parsed. Gallery operations abort,
    /// the drawing surface is unaffected.
    #[error("stored artwork collection is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),
    #[error("failed to serialize artwork collection: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("failed to encode surface: {0}")]
    Encode(#[from] image::ImageError),
}

/// Why a brush refused to render.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BrushError {
    #[error("the photo brush needs an uploaded image first")]
    MissingPhotoAsset,
}

/// Why an uploaded file cannot become the photo-brush image.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("the file is not an image")]
    NotAnImage,
    /// Recognised format, broken contents. Holds the codec's message.
    #[error("could not decode {format} image: {message}")]
    Decode { format: String, message: String },
    #[error("the image is empty")]
    Empty,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("expected a leading '#' in {0:?}")]
    MissingHash(String),
    #[error("expected 3, 6 or 8 hex digits in {0:?}")]
    BadLength(String),
    #[error("non-hex digit in {0:?}")]
    BadDigit(String),
}
