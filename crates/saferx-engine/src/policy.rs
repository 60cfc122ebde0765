//! Safety policy: risk profile plus limits gives accept or reject.

use saferx_core::{RiskProfile, SafetyLimits, UnsafePattern, UnsafeReason};

/// Check `risk` against `limits`.
///
/// Limits are checked in a fixed order (star height, repetitions,
/// backreferences) and the first one exceeded is reported. The repetition
/// limit applies to finite bounds only: unbounded nesting is what the star
/// height limit is for, and charging it twice would reject patterns whose
/// star height the caller explicitly allowed.
pub fn check(
    pattern: &str,
    risk: RiskProfile,
    limits: &SafetyLimits,
) -> Result<RiskProfile, UnsafePattern> {
    let reason = if risk.star_height > limits.max_star_height {
        Some(UnsafeReason::StarHeightExceeded {
            value: risk.star_height,
            limit: limits.max_star_height,
        })
    } else if risk.finite_repetition_cost > limits.max_repetitions {
        Some(UnsafeReason::RepetitionExceeded {
            value: risk.finite_repetition_cost,
            limit: limits.max_repetitions,
        })
    } else if risk.has_backreference && !limits.allow_backreferences {
        Some(UnsafeReason::BackreferencePresent)
    } else {
        None
    };

    match reason {
        Some(reason) => Err(UnsafePattern {
            pattern: pattern.to_string(),
            reason,
        }),
        None => Ok(risk),
    }
}
