//! saferx engine - memoized regex safety checks
//!
//! This crate turns the pure analysis in `saferx-core` into something cheap
//! to call once per item: every answer is cached per input, so a pattern read
//! from configuration is parsed and measured once and then looked up.
//!
//! # Architecture
//!
//! - **Compiled patterns**: parse, measure and host-compile once per source
//! - **Safety policy**: risk profile plus caller limits gives accept/reject
//! - **Replacement templates**: group references checked against the pattern
//! - **Globs**: address wildcards translated to regex source, also cached
//! - **Addresses**: two wildcard addresses compared in both directions
//!
//! The free functions below all go through one process-wide [`Analyzer`].
//! Build your own with [`Analyzer::with_settings`] to isolate its caches.
//!
//! # Example
//!
//! ```
//! use saferx_engine::{assert_safe, is_safe, match_address};
//!
//! assert!(is_safe("^[a-z]+\\.example$", 1, 1000, false));
//! assert!(!is_safe("(a+)+$", 1, 1000, false));
//! assert!(assert_safe("(a)\\1", 5, 5, true)?.has_backreference);
//! assert!(match_address("dock.north", "dock.*"));
//! # Ok::<(), saferx_engine::Error>(())
//! ```

pub mod address;
pub mod analyzer;
pub mod cache;
pub mod compiled;
pub mod constants;
pub mod glob;
pub mod policy;
pub mod replacement;

// Re-export core types
pub use analyzer::{global, Analyzer, AnalyzerStats};
pub use cache::{CacheSettings, CacheStats, TtlCache};
pub use compiled::{CompiledEntry, CompiledPattern};
pub use constants::*;
pub use glob::glob_to_regex;
pub use saferx_core::{
    Error, GlobError, PatternError, Result, RiskProfile, SafetyLimits, TemplateError,
    TemplateErrorKind, UnsafePattern, UnsafeReason, MAX_NESTING, REPETITION_CEILING,
    UNBOUNDED_REPETITION,
};

/// [`Analyzer::assert_safe`] on the global analyzer.
pub fn assert_safe(
    pattern: &str,
    star_height_limit: u32,
    repetition_limit: u64,
    allow_backreference: bool,
) -> Result<RiskProfile> {
    global().assert_safe(
        pattern,
        star_height_limit,
        repetition_limit,
        allow_backreference,
    )
}

/// [`Analyzer::is_safe`] on the global analyzer.
pub fn is_safe(
    pattern: &str,
    star_height_limit: u32,
    repetition_limit: u64,
    allow_backreference: bool,
) -> bool {
    global().is_safe(
        pattern,
        star_height_limit,
        repetition_limit,
        allow_backreference,
    )
}

/// [`Analyzer::assert_safe_with`] on the global analyzer.
pub fn assert_safe_with(pattern: &str, limits: &SafetyLimits) -> Result<RiskProfile> {
    global().assert_safe_with(pattern, limits)
}

/// [`Analyzer::is_safe_with`] on the global analyzer.
pub fn is_safe_with(pattern: &str, limits: &SafetyLimits) -> bool {
    global().is_safe_with(pattern, limits)
}

/// [`Analyzer::assert_replacement_safe`] on the global analyzer.
pub fn assert_replacement_safe(pattern: &str, template: &str) -> Result<()> {
    global().assert_replacement_safe(pattern, template)
}

/// [`Analyzer::match_address`] on the global analyzer.
pub fn match_address(a: &str, b: &str) -> bool {
    global().match_address(a, b)
}

/// [`Analyzer::translate_glob`] on the global analyzer.
pub fn translate_glob(glob: &str) -> std::result::Result<String, GlobError> {
    global().translate_glob(glob)
}

/// [`Analyzer::compile`] on the global analyzer.
pub fn compile(pattern: &str) -> CompiledEntry {
    global().compile(pattern)
}
