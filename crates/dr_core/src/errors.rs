//! Minimal error set for core-domain validation & parsing.

use core::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CoreError {
    InvalidRatio,
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::InvalidRatio => write!(f, "invalid ratio"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CoreError {}
