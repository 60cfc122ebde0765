//! The analyzer: caches plus the public safety operations
//!
//! An [`Analyzer`] owns three caches (compiled patterns, replacement
//! validations, glob translations) and answers every question through them.
//! Most callers use the process-wide instance behind [`global`].

use crate::cache::{CacheSettings, CacheStats, TtlCache};
use crate::compiled::{CompiledEntry, CompiledPattern};
use crate::{glob, policy, replacement};
use saferx_core::{GlobError, Result, RiskProfile, SafetyLimits};
use serde::Serialize;
use std::sync::{Arc, LazyLock};

static GLOBAL: LazyLock<Analyzer> = LazyLock::new(Analyzer::new);

/// The process-wide analyzer with default cache settings.
pub fn global() -> &'static Analyzer {
    &GLOBAL
}

/// Usage counters for each of an analyzer's caches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AnalyzerStats {
    pub patterns: CacheStats,
    pub replacements: CacheStats,
    pub globs: CacheStats,
}

/// Regex safety analyzer with memoized results.
///
/// Every answer is a pure function of the arguments, so two analyzers always
/// agree; they only differ in what they have cached.
pub struct Analyzer {
    patterns: TtlCache<String, CompiledEntry>,
    replacements: TtlCache<(String, String), Result<()>>,
    globs: TtlCache<String, std::result::Result<String, GlobError>>,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer {
    /// Analyzer with the default capacity (1000) and expiry (30 minutes).
    pub fn new() -> Self {
        Self::with_settings(CacheSettings::default())
    }

    /// Analyzer whose three caches each use `settings`.
    pub fn with_settings(settings: CacheSettings) -> Self {
        Self {
            patterns: TtlCache::new(settings),
            replacements: TtlCache::new(settings),
            globs: TtlCache::new(settings),
        }
    }

    /// Parse, measure and compile `pattern`, or return the cached outcome.
    ///
    /// Invalid patterns are cached too, so a known-bad pattern is never
    /// parsed twice while its entry lives.
    pub fn compile(&self, pattern: &str) -> CompiledEntry {
        self.patterns.get_or_insert_with(pattern, || {
            tracing::debug!(pattern, "compiling pattern");
            let entry = CompiledPattern::compile(pattern);
            if let Err(e) = &entry {
                tracing::debug!(pattern, error = %e, "pattern rejected by parser or host engine");
            }
            entry
        })
    }

    /// Assert that `pattern` is valid and within the given limits.
    ///
    /// # Errors
    ///
    /// [`Error::Pattern`](saferx_core::Error::Pattern) if the pattern does not
    /// compile, [`Error::Unsafe`](saferx_core::Error::Unsafe) if it exceeds a
    /// limit or uses a disallowed backreference.
    pub fn assert_safe(
        &self,
        pattern: &str,
        star_height_limit: u32,
        repetition_limit: u64,
        allow_backreference: bool,
    ) -> Result<RiskProfile> {
        self.assert_safe_with(
            pattern,
            &SafetyLimits {
                max_star_height: star_height_limit,
                max_repetitions: repetition_limit,
                allow_backreferences: allow_backreference,
            },
        )
    }

    /// [`Analyzer::assert_safe`] with the limits bundled in one value.
    pub fn assert_safe_with(&self, pattern: &str, limits: &SafetyLimits) -> Result<RiskProfile> {
        let compiled = self.compile(pattern)?;
        Ok(policy::check(pattern, compiled.risk(), limits)?)
    }

    /// `true` iff [`Analyzer::assert_safe`] succeeds.
    pub fn is_safe(
        &self,
        pattern: &str,
        star_height_limit: u32,
        repetition_limit: u64,
        allow_backreference: bool,
    ) -> bool {
        self.is_safe_with(
            pattern,
            &SafetyLimits {
                max_star_height: star_height_limit,
                max_repetitions: repetition_limit,
                allow_backreferences: allow_backreference,
            },
        )
    }

    /// `true` iff [`Analyzer::assert_safe_with`] succeeds.
    pub fn is_safe_with(&self, pattern: &str, limits: &SafetyLimits) -> bool {
        match self.assert_safe_with(pattern, limits) {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(pattern, error = %e, "pattern is not safe");
                false
            }
        }
    }

    /// Assert that `template` only references groups `pattern` defines.
    ///
    /// # Errors
    ///
    /// The pattern's own [`Error::Pattern`](saferx_core::Error::Pattern) if it
    /// does not compile, otherwise [`Error::Template`](saferx_core::Error::Template)
    /// describing the first defect in the template.
    pub fn assert_replacement_safe(&self, pattern: &str, template: &str) -> Result<()> {
        let key = (pattern.to_string(), template.to_string());
        self.replacements.get_or_insert_with(&key, || {
            let compiled = self.compile(pattern)?;
            replacement::validate(&compiled, template)?;
            Ok(())
        })
    }

    /// Translate a glob into regex source, or return the cached outcome.
    pub fn translate_glob(&self, glob: &str) -> std::result::Result<String, GlobError> {
        self.globs.get_or_insert_with(glob, || glob::glob_to_regex(glob))
    }

    /// Compile the regex a glob translates to.
    pub fn compile_glob(&self, glob: &str) -> Result<Arc<CompiledPattern>> {
        let regex = self.translate_glob(glob)?;
        Ok(self.compile(&regex)?)
    }

    /// Drop every cached entry. Counters are kept.
    pub fn clear_caches(&self) {
        self.patterns.clear();
        self.replacements.clear();
        self.globs.clear();
    }

    pub fn cache_stats(&self) -> AnalyzerStats {
        AnalyzerStats {
            patterns: self.patterns.stats(),
            replacements: self.replacements.stats(),
            globs: self.globs.stats(),
        }
    }
}
