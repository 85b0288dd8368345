use thiserror::Error;

/// Failures reading or writing a capture file.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("capture I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("capture format error ({context}): {message}")]
    Format {
        context: &'static str,
        message: String,
    },
    #[error("cannot build frame: {0}")]
    Frame(String),
}
