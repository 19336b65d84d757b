//! Error types for rf-reels

use thiserror::Error;

/// Why a spin request (or a cancel request) was turned down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// A spin is already in flight
    AlreadySpinning,
    /// No reels have been configured on the controller
    ReelsNotConfigured,
    /// Directed targets do not match the number of reels
    TargetCountMismatch { expected: usize, actual: usize },
    /// A directed target is NaN or infinite
    NonFiniteTarget { reel_index: usize },
    /// Spins always run to completion
    CancelWhileSpinning,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadySpinning => write!(f, "a spin is already in flight"),
            Self::ReelsNotConfigured => write!(f, "reels are not configured"),
            Self::TargetCountMismatch { expected, actual } => {
                write!(f, "expected {expected} target positions, got {actual}")
            }
            Self::NonFiniteTarget { reel_index } => {
                write!(f, "target position of reel {} is not finite", reel_index + 1)
            }
            Self::CancelWhileSpinning => write!(f, "a running spin cannot be cancelled"),
        }
    }
}

/// Core error type
#[derive(Error, Debug)]
pub enum SlotError {
    #[error("Invalid band id {0}: band ids start at 1")]
    InvalidBandId(u32),

    #[error("Missing asset binding for symbol '{symbol}' on reel {band_id}")]
    MissingAssetBinding { band_id: u32, symbol: String },

    #[error("Strip of reel {band_id} has {len} symbols, needs at least {required}")]
    StripTooShort {
        band_id: u32,
        len: usize,
        required: usize,
    },

    #[error("Invalid grid shape: expected {expected_rows}x{expected_cols}, got {rows}x{cols}")]
    InvalidGridShape {
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Spin rejected: {0}")]
    SpinRejected(RejectReason),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type SlotResult<T> = Result<T, SlotError>;
