// ------------------------------------------------------------
// Error taxonomy for loading, drawing and encoding
// ------------------------------------------------------------

use std::fmt;
use std::path::PathBuf;

use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;

use crate::export::ExportState;

// Whether rod 0 hangs from a moving cart or from the fixed origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseMode {
    Cart,
    Fixed,
}

impl fmt::Display for BaseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaseMode::Cart => f.write_str("cart-based"),
            BaseMode::Fixed => f.write_str("fixed-base"),
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("column count mismatch at line {line}: expected {expected}, got {actual}, {mode} mode")]
    ColumnCount {
        line: u64,
        expected: usize,
        actual: usize,
        mode: BaseMode,
    },

    #[error("invalid number {value:?} at line {line}, column {column}")]
    Parse {
        line: u64,
        column: usize,
        value: String,
    },

    #[error("trajectory has no data rows")]
    EmptyTrajectory,

    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("frame {frame} out of range for a trajectory of {len} frames")]
    FrameOutOfRange { frame: usize, len: usize },

    #[error("drawing failed: {0}")]
    Draw(String),

    #[error("video encoder `{program}` could not be started: {source}")]
    EncoderUnavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("video encoder failed: {0}")]
    Encoder(String),

    #[error("export is {0}; rendering is not resumable")]
    NotResumable(ExportState),
}

impl<E> From<DrawingAreaErrorKind<E>> for RenderError
where
    E: std::error::Error + Send + Sync,
{
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        RenderError::Draw(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;
