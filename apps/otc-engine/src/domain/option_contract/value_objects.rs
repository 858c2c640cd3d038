//! Value objects for the option lifecycle context.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of an OTC option.
///
/// Transitions are monotonic: VALID → USED or VALID → EXPIRED, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptionStatus {
    /// Exercisable until the settlement date.
    Valid,
    /// Exercised; holdings transferred. Terminal.
    Used,
    /// Settlement date passed unexercised. Terminal.
    Expired,
}

impl OptionStatus {
    /// Whether the option can still be exercised or expired.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Used | Self::Expired)
    }
}

impl fmt::Display for OptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Valid => "VALID",
            Self::Used => "USED",
            Self::Expired => "EXPIRED",
        };
        write!(f, "{s}")
    }
}

/// Filter for listing a user's options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionFilter {
    /// Only VALID options.
    Valid,
    /// Only USED or EXPIRED options.
    Invalid,
    /// Everything.
    All,
}

impl OptionFilter {
    /// Whether an option with the given status passes the filter.
    #[must_use]
    pub const fn matches(&self, status: OptionStatus) -> bool {
        match self {
            Self::Valid => matches!(status, OptionStatus::Valid),
            Self::Invalid => status.is_terminal(),
            Self::All => true,
        }
    }
}
