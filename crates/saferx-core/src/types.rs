//! Shared value types.

use serde::{Deserialize, Serialize};

/// Structural risk of a pattern, derived once per distinct source string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RiskProfile {
    /// Deepest nesting of unbounded quantifiers.
    pub star_height: u32,

    /// Worst-case product of quantifier upper bounds along any path, with
    /// unbounded quantifiers charged [`crate::UNBOUNDED_REPETITION`].
    pub repetition_cost: u64,

    /// The same product over finite upper bounds only. Unbounded
    /// quantifiers are left to the star height limit.
    pub finite_repetition_cost: u64,

    /// Whether the pattern contains a backreference.
    pub has_backreference: bool,
}

/// Limits a pattern must stay within to be considered safe to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyLimits {
    /// Maximum allowed star height
    #[serde(default = "default_max_star_height")]
    pub max_star_height: u32,

    /// Maximum allowed repetition cost
    #[serde(default = "default_max_repetitions")]
    pub max_repetitions: u64,

    /// Accept patterns containing backreferences
    #[serde(default)]
    pub allow_backreferences: bool,
}

impl Default for SafetyLimits {
    fn default() -> Self {
        Self {
            max_star_height: default_max_star_height(),
            max_repetitions: default_max_repetitions(),
            allow_backreferences: false,
        }
    }
}

fn default_max_star_height() -> u32 {
    1
}

fn default_max_repetitions() -> u64 {
    1000
}
