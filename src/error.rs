use std::fmt;
use std::path::PathBuf;

/// Error type covering every failure mode of the consolidation pipeline.
///
/// Recoverable per-item conditions (unreadable mask, missing paired image,
/// degenerate geometry) are normally logged and skipped at the call site;
/// they only surface as values of this type when a whole stage cannot
/// proceed.
#[derive(Debug)]
pub enum Error {
    /// An I/O error occurred during a file or directory operation.
    Io(std::io::Error),
    /// CSV parsing or serialization error.
    Csv(csv::Error),
    /// An image or mask could not be decoded.
    Decode(String),
    /// A required input directory or file is absent.
    MissingInput(PathBuf),
    /// A label file without its paired image, or vice versa.
    MissingPair(String),
    /// Image dimensions are zero, so coordinates cannot be normalized.
    InvalidGeometry { width: u32, height: u32 },
    /// Two source entries map to the same consolidated base name.
    NameCollision(String),
    /// Split ratios do not sum to 1.0.
    InvalidRatios(f64),
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Csv(e) => write!(f, "CSV error: {}", e),
            Error::Decode(msg) => write!(f, "failed to decode image: {}", msg),
            Error::MissingInput(path) => {
                write!(f, "required input not found: {}", path.display())
            }
            Error::MissingPair(name) => {
                write!(f, "no paired file for: {}", name)
            }
            Error::InvalidGeometry { width, height } => {
                write!(f, "invalid image dimensions: {}x{}", width, height)
            }
            Error::NameCollision(name) => {
                write!(f, "two source entries map to the same output name: {}", name)
            }
            Error::InvalidRatios(sum) => {
                write!(f, "split ratios must sum to 1.0, got {}", sum)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Csv(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::Csv(e)
    }
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::Decode(e.to_string())
    }
}

impl From<imagesize::ImageError> for Error {
    fn from(e: imagesize::ImageError) -> Self {
        Error::Decode(e.to_string())
    }
}
