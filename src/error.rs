//! Error types for the driver
//!
//! This module defines error types for configuration building ([`BuilderError`])
//! and display operations ([`Error`]).
//!
//! ## Error Types
//!
//! - [`BuilderError`] - Errors during configuration construction
//! - [`Error`] - Runtime errors during display operations
//! - [`InterfaceError`](crate::interface::InterfaceError) - Low-level hardware communication errors
//!
//! A [`Error::BusyTimeout`] is a hardware fault: the controller is in an
//! unknown protocol state and only a fresh reset recovers it.
//!
//! ## Example
//!
//! ```
//! use eink_dashboard::{Builder, Dimensions, BuilderError};
//!
//! // Missing dimensions
//! let result = Builder::new().build();
//! assert!(matches!(result, Err(BuilderError::MissingDimensions)));
//!
//! // Invalid dimensions
//! let result = Dimensions::new(1000, 500); // Too large
//! assert!(result.is_err());
//! ```

use crate::display::DisplayState;
use crate::interface::DisplayInterface;

/// Gate outputs (rows) wired on the 2.7" panel
pub const MAX_GATE_OUTPUTS: u16 = 264;

/// Source outputs (columns) wired on the 2.7" panel
pub const MAX_SOURCE_OUTPUTS: u16 = 176;

/// Errors that can occur when interacting with the display
///
/// Generic over the interface type to preserve the specific error type.
/// This allows error handling code to match on the underlying hardware error.
pub enum Error<I: DisplayInterface> {
    /// Interface error (SPI/GPIO)
    ///
    /// Wraps the underlying hardware error from the [`DisplayInterface`] implementation.
    Interface(I::Error),
    /// The busy line did not report idle within the configured ceiling
    BusyTimeout {
        /// Time waited in milliseconds
        waited_ms: u32,
    },
    /// Operation requires an initialized, awake controller
    NotActive {
        /// State the driver was in
        state: DisplayState,
    },
    /// A bitplane does not match the panel's native size
    PlaneSizeMismatch {
        /// Expected (width, height)
        expected: (u32, u32),
        /// Provided (width, height)
        provided: (u32, u32),
    },
}

impl<I: DisplayInterface> core::fmt::Debug for Error<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Interface(e) => f.debug_tuple("Interface").field(e).finish(),
            Self::BusyTimeout { waited_ms } => f
                .debug_struct("BusyTimeout")
                .field("waited_ms", waited_ms)
                .finish(),
            Self::NotActive { state } => {
                f.debug_struct("NotActive").field("state", state).finish()
            }
            Self::PlaneSizeMismatch { expected, provided } => f
                .debug_struct("PlaneSizeMismatch")
                .field("expected", expected)
                .field("provided", provided)
                .finish(),
        }
    }
}

impl<I: DisplayInterface> core::fmt::Display for Error<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Interface(e) => write!(f, "Interface error: {e:?}"),
            Self::BusyTimeout { waited_ms } => {
                write!(f, "Display stayed busy for {waited_ms} ms")
            }
            Self::NotActive { state } => {
                write!(f, "Display is {state:?}, initialize it first")
            }
            Self::PlaneSizeMismatch { expected, provided } => write!(
                f,
                "Bitplane is {}x{}, panel needs {}x{}",
                provided.0, provided.1, expected.0, expected.1
            ),
        }
    }
}

impl<I: DisplayInterface> core::error::Error for Error<I> {}

/// Errors that can occur when building configuration
///
/// These errors occur during the builder pattern before the display is created.
#[derive(Debug)]
pub enum BuilderError {
    /// Dimensions were not specified
    ///
    /// [`Builder::dimensions()`](crate::config::Builder::dimensions) must be called before building.
    MissingDimensions,
    /// Invalid dimensions provided
    ///
    /// See [`Dimensions::new()`](crate::config::Dimensions::new) for constraints.
    InvalidDimensions {
        /// Number of rows (height) requested
        rows: u16,
        /// Number of columns (width) requested
        cols: u16,
    },
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingDimensions => write!(f, "Dimensions must be specified"),
            Self::InvalidDimensions { rows, cols } => write!(
                f,
                "Invalid dimensions {rows}x{cols} (max {MAX_GATE_OUTPUTS}x{MAX_SOURCE_OUTPUTS}, cols must be multiple of 8)"
            ),
        }
    }
}

impl core::error::Error for BuilderError {}
