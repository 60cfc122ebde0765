//! saferx core - pattern syntax and structural risk analysis.
//!
//! This crate holds the pure half of saferx. Nothing in here keeps state or
//! touches I/O, so every function is safe to call from any thread.
//!
//! - [`parse`]: regex source string to a [`Node`] tree
//! - [`evaluate`]: [`Node`] tree to a [`RiskProfile`]
//! - [`any_node`]: generic structural query over a tree
//! - [`Error`] and friends: the error taxonomy shared by all saferx crates
//!
//! # Example
//!
//! ```
//! use saferx_core::{evaluate, parse};
//!
//! let profile = evaluate(&parse("(a+)+b")?);
//! assert_eq!(profile.star_height, 2);
//! assert!(!profile.has_backreference);
//! # Ok::<(), saferx_core::PatternError>(())
//! ```

pub mod ast;
pub mod error;
pub mod metrics;
pub mod parser;
pub mod types;

// Re-export core types for convenience
pub use ast::{AnchorKind, BackrefTarget, Class, ClassItem, LookKind, Node, Shorthand};
pub use error::{
    Error, GlobError, PatternError, Result, TemplateError, TemplateErrorKind, UnsafePattern,
    UnsafeReason,
};
pub use metrics::{
    any_node, evaluate, finite_repetition_cost, repetition_cost, star_height, REPETITION_CEILING,
    UNBOUNDED_REPETITION,
};
pub use parser::{parse, MAX_NESTING};
pub use types::{RiskProfile, SafetyLimits};
