//! Cache sizing and host engine constants
//!
//! These bound how much memory the memoization layer can hold and how much
//! work the backtracking host engine may spend on a single match.

use std::time::Duration;

/// Maximum number of distinct keys held by each cache (1000)
///
/// Rationale: patterns come from configuration, so the working set is small.
/// A hostile config that cycles through many patterns only costs
/// recomputation, never unbounded memory.
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Time after the last access at which a cached entry expires (30 minutes)
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30 * 60);

/// Backtracking step limit handed to the host regex engine
///
/// Rationale: the structural checks catch the common pathological shapes
/// before execution; this is the last line for whatever slips through.
/// A match that hits the limit is reported as "no match".
pub const BACKTRACK_LIMIT: usize = 1_000_000;
