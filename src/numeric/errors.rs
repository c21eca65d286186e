// ============================================================================
// Numeric Errors
// Error types for fixed-point construction, checked arithmetic and configuration
// ============================================================================

use std::fmt;

/// Errors that can occur in fixed-point operations.
///
/// Ordinary operators never produce these: overflow is resolved by the
/// [`OverflowPolicy`](super::OverflowPolicy). They are returned by the
/// `checked_*` family, the storage selector and configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericError {
    /// Result exceeded the maximum value of the target shape
    Overflow,
    /// Result below the minimum value of the target shape
    Underflow,
    /// Attempted division by zero
    DivisionByZero,
    /// Input value is not a number
    InvalidInput,
    /// Requested total bit width has no native backing integer
    InvalidWidth {
        /// The rejected total width (whole + fractional bits)
        bits: u32,
    },
    /// The process-wide overflow policy was already installed or read
    PolicyAlreadySet,
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericError::Overflow => {
                write!(f, "arithmetic overflow: result exceeded maximum value")
            },
            NumericError::Underflow => {
                write!(f, "arithmetic underflow: result below minimum value")
            },
            NumericError::DivisionByZero => write!(f, "division by zero"),
            NumericError::InvalidInput => write!(f, "invalid input: value is not a number"),
            NumericError::InvalidWidth { bits } => write!(
                f,
                "invalid width: {} total bits (supported range is 1..=64)",
                bits
            ),
            NumericError::PolicyAlreadySet => {
                write!(f, "overflow policy already fixed for this process")
            },
        }
    }
}

impl std::error::Error for NumericError {}

/// Result type alias for numeric operations
pub type NumericResult<T> = Result<T, NumericError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            NumericError::Overflow.to_string(),
            "arithmetic overflow: result exceeded maximum value"
        );
        assert_eq!(NumericError::DivisionByZero.to_string(), "division by zero");
        assert_eq!(
            NumericError::InvalidWidth { bits: 65 }.to_string(),
            "invalid width: 65 total bits (supported range is 1..=64)"
        );
    }

    #[test]
    fn test_error_equality() {
        assert_eq!(NumericError::Overflow, NumericError::Overflow);
        assert_ne!(NumericError::Overflow, NumericError::Underflow);
        assert_ne!(
            NumericError::InvalidWidth { bits: 0 },
            NumericError::InvalidWidth { bits: 65 }
        );
    }
}
