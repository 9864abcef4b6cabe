use crate::frame::FrameError;
use crate::types::{Operation, SensorState};

/// SPS30 errors.
///
/// `E` is the error type of the I2C bus.
#[derive(Debug, PartialEq)]
#[cfg_attr(feature = "thiserror", derive(thiserror::Error))]
pub enum Error<E> {
    /// I2C bus error
    #[cfg_attr(feature = "thiserror", error("I2C bus error: {0:?}"))]
    Transport(E),
    /// CRC of a response word group did not match
    #[cfg_attr(
        feature = "thiserror",
        error("checksum mismatch in group {group}: expected {expected:#04x}, got {actual:#04x}")
    )]
    ChecksumMismatch { group: usize, expected: u8, actual: u8 },
    /// Response length did not match the command
    #[cfg_attr(
        feature = "thiserror",
        error("malformed response: expected {expected} bytes, got {actual}")
    )]
    MalformedResponse { expected: usize, actual: usize },
    /// Operation not allowed in the current state. No bus access was made.
    #[cfg_attr(feature = "thiserror", error("{attempted:?} not allowed while {current:?}"))]
    InvalidState {
        current: SensorState,
        attempted: Operation,
    },
}

impl<E> Error<E> {
    /// Whether the call may succeed when retried later.
    ///
    /// `InvalidState` is a bug in the caller and never recovers on its own.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::InvalidState { .. })
    }
}

impl<E> From<FrameError> for Error<E> {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::ChecksumMismatch {
                group,
                expected,
                actual,
            } => Error::ChecksumMismatch {
                group,
                expected,
                actual,
            },
            FrameError::MalformedResponse { expected, actual } => {
                Error::MalformedResponse { expected, actual }
            }
        }
    }
}
