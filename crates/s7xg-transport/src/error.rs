use std::path::PathBuf;

/// Errors that can occur on the byte link to the module.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the device at the specified path.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An I/O error occurred on the link.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The serial port driver reported an error.
    #[cfg(feature = "serial")]
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// The link reached end of stream.
    #[error("link closed")]
    Closed,

    /// A scripted mock link saw traffic it was not told to expect.
    #[cfg(feature = "mock")]
    #[error("mock link: {0}")]
    Mock(String),
}

pub type Result<T> = std::result::Result<T, TransportError>;
