// ============================================================================
// Arithmetic Configuration
// Overflow policy and the write-once process-wide setting
// ============================================================================

use super::errors::{NumericError, NumericResult};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Overflow Policy
// ============================================================================

/// How out-of-range results are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OverflowPolicy {
    /// Clamp to the representable maximum (or minimum)
    #[default]
    Saturate,
    /// Keep the low `W+F` bits (native modulo behaviour)
    Wrap,
}

impl OverflowPolicy {
    #[inline]
    pub const fn is_saturating(self) -> bool {
        matches!(self, OverflowPolicy::Saturate)
    }
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverflowPolicy::Saturate => write!(f, "saturate"),
            OverflowPolicy::Wrap => write!(f, "wrap"),
        }
    }
}

impl FromStr for OverflowPolicy {
    type Err = NumericError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "saturate" | "sat" => Ok(OverflowPolicy::Saturate),
            "wrap" => Ok(OverflowPolicy::Wrap),
            _ => Err(NumericError::InvalidInput),
        }
    }
}

// ============================================================================
// Process-Wide Policy
// ============================================================================

static PROCESS_POLICY: OnceLock<OverflowPolicy> = OnceLock::new();

/// Install the overflow policy used by the arithmetic operators.
///
/// The slot is write-once: it can be set only before any operator or
/// constructor has read it. The first read fixes the default
/// ([`OverflowPolicy::Saturate`]).
///
/// # Errors
/// Returns `PolicyAlreadySet` if a policy was installed or read before.
pub fn install_policy(policy: OverflowPolicy) -> NumericResult<()> {
    PROCESS_POLICY
        .set(policy)
        .map_err(|_| NumericError::PolicyAlreadySet)?;
    tracing::info!(%policy, "installed process overflow policy");
    Ok(())
}

/// The process-wide overflow policy.
#[inline]
pub fn global_policy() -> OverflowPolicy {
    *PROCESS_POLICY.get_or_init(OverflowPolicy::default)
}

// ============================================================================
// Arithmetic Configuration
// ============================================================================

/// Startup configuration for fixed-point arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ArithmeticConfig {
    /// Overflow policy applied by constructors and operators
    pub policy: OverflowPolicy,
}

impl ArithmeticConfig {
    pub const fn new(policy: OverflowPolicy) -> Self {
        Self { policy }
    }

    /// Builder method: Set overflow policy
    pub fn with_policy(mut self, policy: OverflowPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Saturating arithmetic (the default)
    pub const fn saturating() -> Self {
        Self::new(OverflowPolicy::Saturate)
    }

    /// Wrapping arithmetic
    pub const fn wrapping() -> Self {
        Self::new(OverflowPolicy::Wrap)
    }

    /// Make this configuration the process-wide one.
    ///
    /// # Errors
    /// Returns `PolicyAlreadySet` if arithmetic already ran or another
    /// configuration was installed.
    pub fn install(&self) -> NumericResult<()> {
        install_policy(self.policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_parse() {
        assert_eq!("saturate".parse::<OverflowPolicy>(), Ok(OverflowPolicy::Saturate));
        assert_eq!(" Wrap ".parse::<OverflowPolicy>(), Ok(OverflowPolicy::Wrap));
        assert_eq!(
            "clamp".parse::<OverflowPolicy>(),
            Err(NumericError::InvalidInput)
        );
    }

    #[test]
    fn test_policy_display() {
        assert_eq!(OverflowPolicy::Saturate.to_string(), "saturate");
        assert_eq!(OverflowPolicy::Wrap.to_string(), "wrap");
        assert!(OverflowPolicy::default().is_saturating());
    }

    #[test]
    fn test_builder_pattern() {
        let config = ArithmeticConfig::saturating().with_policy(OverflowPolicy::Wrap);
        assert_eq!(config, ArithmeticConfig::wrapping());
        assert_eq!(ArithmeticConfig::default().policy, OverflowPolicy::Saturate);
    }

    #[test]
    fn test_policy_is_write_once() {
        // Unit tests share a process and never install; reading freezes the default.
        assert_eq!(global_policy(), OverflowPolicy::Saturate);
        assert_eq!(
            install_policy(OverflowPolicy::Wrap),
            Err(NumericError::PolicyAlreadySet)
        );
        assert_eq!(
            ArithmeticConfig::saturating().install(),
            Err(NumericError::PolicyAlreadySet)
        );
        assert_eq!(global_policy(), OverflowPolicy::Saturate);
    }
}
