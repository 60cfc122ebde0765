//! Wildcard address matching
//!
//! Two addresses match when either one, read as a glob, matches the whole
//! of the other. Neither side is assumed to be "the pattern".

use crate::analyzer::Analyzer;

/// Matches every address.
const WILDCARD: &str = "*";

impl Analyzer {
    /// Whether addresses `a` and `b` match each other.
    ///
    /// A blank `b` only matches a blank `a`. A bare `*` on either side
    /// matches anything. Otherwise `b` is tried as a glob against `a`, then
    /// `a` against `b`. A side whose glob does not translate or compile
    /// simply contributes no match.
    pub fn match_address(&self, a: &str, b: &str) -> bool {
        if b.trim().is_empty() {
            return a.trim().is_empty();
        }
        if a == WILDCARD || b == WILDCARD {
            return true;
        }
        self.glob_matches(b, a) || self.glob_matches(a, b)
    }

    fn glob_matches(&self, glob: &str, text: &str) -> bool {
        match self.compile_glob(glob) {
            Ok(compiled) => compiled.matches_fully(text),
            Err(e) => {
                tracing::debug!(glob, error = %e, "address is not a usable glob");
                false
            }
        }
    }
}
