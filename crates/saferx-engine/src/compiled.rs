//! Compiled patterns and their structural risk
//!
//! A pattern is only handed to the host engine once the structural parser
//! accepts it. Both must succeed: the parser knows nothing about what the
//! host supports, and the host knows nothing about risk.

use crate::constants::BACKTRACK_LIMIT;
use fancy_regex::{Regex, RegexBuilder};
use saferx_core::{evaluate, parse, PatternError, RiskProfile};
use std::collections::BTreeSet;
use std::sync::{Arc, OnceLock};

/// Result of compiling one pattern source string, as stored in the cache.
pub type CompiledEntry = Result<Arc<CompiledPattern>, PatternError>;

/// A pattern accepted by both the structural parser and the host engine.
#[derive(Debug)]
pub struct CompiledPattern {
    source: String,
    regex: Regex,
    /// `\A(?:source)\z`, built on first full-match request
    anchored: OnceLock<Option<Regex>>,
    group_count: usize,
    named_groups: BTreeSet<String>,
    risk: RiskProfile,
}

impl CompiledPattern {
    /// Parse, measure and compile `source`.
    pub fn compile(source: &str) -> CompiledEntry {
        // Only the metrics outlive this call, never the tree
        let risk = evaluate(&parse(source)?);

        let regex = build(source).map_err(|e| PatternError::new(e.to_string(), source, 0))?;
        let group_count = regex.captures_len().saturating_sub(1);
        let named_groups = regex
            .capture_names()
            .flatten()
            .map(str::to_string)
            .collect();

        Ok(Arc::new(Self {
            source: source.to_string(),
            regex,
            anchored: OnceLock::new(),
            group_count,
            named_groups,
            risk,
        }))
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The underlying host regex.
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Number of capturing groups, not counting the implicit whole match.
    pub fn group_count(&self) -> usize {
        self.group_count
    }

    pub fn named_groups(&self) -> &BTreeSet<String> {
        &self.named_groups
    }

    pub fn has_named_group(&self, name: &str) -> bool {
        self.named_groups.contains(name)
    }

    pub fn risk(&self) -> RiskProfile {
        self.risk
    }

    /// Whether the pattern matches anywhere in `text`.
    ///
    /// A host runtime error (backtrack limit) counts as no match.
    pub fn is_match(&self, text: &str) -> bool {
        run(&self.regex, &self.source, text)
    }

    /// Whether the pattern matches the whole of `text`.
    pub fn matches_fully(&self, text: &str) -> bool {
        let anchored = self.anchored.get_or_init(|| {
            build(&format!(r"\A(?:{})\z", self.source))
                .map_err(|e| tracing::warn!(pattern = %self.source, error = %e, "anchored compile failed"))
                .ok()
        });
        match anchored {
            Some(regex) => run(regex, &self.source, text),
            None => false,
        }
    }
}

fn build(source: &str) -> Result<Regex, fancy_regex::Error> {
    RegexBuilder::new(source)
        .backtrack_limit(BACKTRACK_LIMIT)
        .build()
}

fn run(regex: &Regex, source: &str, text: &str) -> bool {
    match regex.is_match(text) {
        Ok(matched) => matched,
        Err(e) => {
            tracing::warn!(pattern = %source, error = %e, "regex execution failed, treating as no match");
            false
        }
    }
}
