//! Error types for saferx.
//!
//! Every error here is a plain value: cloneable, comparable and cheap to keep
//! in a cache next to the successful results.

use thiserror::Error;

/// Result type for saferx operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Any failure reported by the analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The pattern is not valid regex syntax.
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// The pattern is valid but exceeds the configured risk limits.
    #[error(transparent)]
    Unsafe(#[from] UnsafePattern),

    /// A replacement template is malformed or references a missing group.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// A glob could not be translated into a regex.
    #[error(transparent)]
    Glob(#[from] GlobError),
}

/// Malformed regex syntax.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} near index {position} in pattern `{pattern}`")]
pub struct PatternError {
    /// Description of the problem.
    pub message: String,
    /// The full pattern that failed.
    pub pattern: String,
    /// Character offset of the offending position.
    pub position: usize,
}

impl PatternError {
    pub fn new(message: impl Into<String>, pattern: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            pattern: pattern.into(),
            position,
        }
    }
}

/// A structurally valid pattern rejected by the safety policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsafe regex `{pattern}`: {reason}")]
pub struct UnsafePattern {
    /// The rejected pattern.
    pub pattern: String,
    /// Which limit was exceeded.
    pub reason: UnsafeReason,
}

/// Why the safety policy rejected a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UnsafeReason {
    /// Nesting of unbounded quantifiers is deeper than allowed.
    #[error("star height ({value}) exceeds limit ({limit})")]
    StarHeightExceeded { value: u32, limit: u32 },
    /// Worst-case multiplicative repetition is larger than allowed.
    #[error("potential repetitions ({value}) exceed limit ({limit})")]
    RepetitionExceeded { value: u64, limit: u64 },
    /// The pattern uses a backreference and backreferences are not allowed.
    #[error("usage of backreference")]
    BackreferencePresent,
}

/// A replacement template that cannot be applied to its pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason} at index {position} in replacement `{template}`")]
pub struct TemplateError {
    /// The rejected template.
    pub template: String,
    /// Character offset where the scanner detected the defect.
    pub position: usize,
    /// What is wrong.
    pub reason: TemplateErrorKind,
}

/// The first defect found in a replacement template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateErrorKind {
    /// `\` at the end of the template.
    #[error("character to be escaped is missing")]
    DanglingEscape,
    /// `$` at the end of the template.
    #[error("illegal group reference: group index is missing")]
    DanglingGroupReference,
    /// `${}`.
    #[error("named capturing group has 0 length name")]
    EmptyGroupName,
    /// `${name` without the closing brace.
    #[error("named capturing group is missing trailing '}}'")]
    UnterminatedGroupName,
    /// `${name}` where the pattern has no group called `name`.
    #[error("group with name {{{0}}} does not exist")]
    UnknownGroupName(String),
    /// `$n` where the pattern has fewer than `n` groups.
    #[error("group '{0}' does not exist")]
    UnknownGroupNumber(u32),
    /// `$` followed by something that is neither a digit nor `{`.
    #[error("illegal group reference '${0}'")]
    IllegalGroupReference(char),
}

/// Malformed glob syntax.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} near index {position} in glob `{glob}`")]
pub struct GlobError {
    /// Description of the problem.
    pub message: String,
    /// The glob that failed to translate.
    pub glob: String,
    /// Character offset of the offending position.
    pub position: usize,
}

impl GlobError {
    pub fn new(message: impl Into<String>, glob: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            glob: glob.into(),
            position,
        }
    }
}
