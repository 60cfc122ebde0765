//! Security tests for saferx-engine
//!
//! These tests verify protection against:
//! - ReDoS (Regular Expression Denial of Service) via nested quantifiers
//! - Repetition blowup via nested bounded quantifiers
//! - Backreferences slipping past the policy
//! - Replacement templates naming groups that do not exist
//! - Hostile input to the parser (deep nesting, count overflow)
//! - Cross-thread cache corruption

use saferx_engine::{
    assert_replacement_safe, assert_safe, is_safe, match_address, Analyzer, CacheSettings, Error,
    SafetyLimits, TemplateErrorKind, UnsafeReason, MAX_NESTING,
};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn unsafe_reason<T: std::fmt::Debug>(result: saferx_engine::Result<T>) -> UnsafeReason {
    match result {
        Err(Error::Unsafe(e)) => e.reason,
        other => panic!("expected UnsafePattern, got {other:?}"),
    }
}

fn template_reason(result: saferx_engine::Result<()>) -> TemplateErrorKind {
    match result {
        Err(Error::Template(e)) => e.reason,
        other => panic!("expected TemplateError, got {other:?}"),
    }
}

// ============================================================================
// 1. ReDoS Pattern Rejection
// ============================================================================

#[test]
fn test_redos_catastrophic_backtracking_nested_quantifiers() {
    // Pattern: (a+)+b - the textbook catastrophic case
    assert_eq!(
        unsafe_reason(assert_safe("(a+)+b", 1, 1000, false)),
        UnsafeReason::StarHeightExceeded { value: 2, limit: 1 }
    );
}

#[test]
fn test_redos_nested_star_quantifiers() {
    for pattern in ["(x*)*y", "(?:x*)*y", "((x+)?)+y", "(x+x+)+y", "(\\w+\\s?)*$"] {
        assert!(
            !is_safe(pattern, 1, 1000, false),
            "{pattern} should be rejected"
        );
    }
}

#[test]
fn test_redos_hidden_in_lookaround() {
    assert!(!is_safe("(?=(a+)+)b", 1, 1000, false));
    assert!(!is_safe("(?<!(a*)*)b", 1, 1000, false));
}

#[test]
fn test_redos_compilation_time_bounded() {
    // Rejection must not depend on running the pattern
    let start = Instant::now();
    for n in 1..200 {
        let pattern = format!("({}a+)+b", "a".repeat(n));
        assert!(!is_safe(&pattern, 1, 1000, false));
    }
    let duration = start.elapsed();
    assert!(
        duration < Duration::from_secs(2),
        "Analysis took too long: {:?}",
        duration
    );
}

#[test]
fn test_common_patterns_accepted() {
    let limits = SafetyLimits::default();
    for pattern in [
        "^[a-z0-9._%+-]+@[a-z0-9.-]+\\.[a-z]{2,}$",
        "^\\d{4}-\\d{2}-\\d{2}$",
        "(?i)^dock\\.(north|south)\\.\\w+$",
        "^(?<zone>[A-Z]{2})-(?<bay>\\d{1,3})$",
        "",
    ] {
        assert!(
            saferx_engine::is_safe_with(pattern, &limits),
            "{pattern} should be accepted"
        );
    }
}

// ============================================================================
// 2. Repetition Limits
// ============================================================================

#[test]
fn test_nested_bounded_repetition_rejected() {
    assert_eq!(
        unsafe_reason(assert_safe("((a{10}){10}){11}", 0, 1000, false)),
        UnsafeReason::RepetitionExceeded {
            value: 1100,
            limit: 1000
        }
    );
}

#[test]
fn test_repetition_cost_uses_worst_branch() {
    // Sequential bounds do not multiply, nested ones do
    assert!(is_safe("a{999}b{999}", 0, 1000, false));
    assert!(!is_safe("(a{2}|(b{40}){30})", 0, 1000, false));
}

#[test]
fn test_repetition_count_overflow() {
    // Beyond u32 is a syntax error, not a silent wrap
    assert!(matches!(
        assert_safe("a{4294967296}", 0, u64::MAX, false),
        Err(Error::Pattern(_))
    ));
}

#[test]
fn test_open_minimum_repetition_multiplies() {
    // The host runs `{,n}` as `{0,n}`, so nesting multiplies
    let profile = assert_safe("(a{,30}){,30}", 0, 1000, false).unwrap();
    assert_eq!(profile.finite_repetition_cost, 900);
    assert_eq!(
        unsafe_reason(assert_safe("(a{,40}){,30}", 0, 1000, false)),
        UnsafeReason::RepetitionExceeded {
            value: 1200,
            limit: 1000
        }
    );
    assert!(saferx_engine::compile("(a{,30}){,30}")
        .unwrap()
        .matches_fully(&"a".repeat(60)));
}

#[test]
fn test_extended_mode_cannot_hide_nesting() {
    // Under (?x) the host reads `(?:a+#)(\n)+` as `(?:a+)+`
    let pattern = "(?x)(?:a+#)(\n)+";
    assert!(!is_safe(pattern, 1, 1000, false));
    assert!(matches!(
        assert_safe(pattern, 5, 1000, true),
        Err(Error::Pattern(ref e)) if e.position == 2
    ));
    assert!(!is_safe("(?i)a(?x: b+ )+", 5, 1000, false));
}

// ============================================================================
// 3. Backreferences
// ============================================================================

#[test]
fn test_backreference_rejected_unless_allowed() {
    for pattern in ["(a)\\1", "(?<w>a)\\k<w>", "(a)(b)(c)\\3"] {
        assert_eq!(
            unsafe_reason(assert_safe(pattern, 5, 5, false)),
            UnsafeReason::BackreferencePresent
        );
        assert!(assert_safe(pattern, 5, 5, true).is_ok(), "{pattern}");
    }
}

#[test]
fn test_star_height_reported_before_backreference() {
    assert_eq!(
        unsafe_reason(assert_safe("(a+)+\\1", 1, 1000, false)),
        UnsafeReason::StarHeightExceeded { value: 2, limit: 1 }
    );
}

// ============================================================================
// 4. Replacement Templates
// ============================================================================

#[test]
fn test_replacement_templates() {
    assert!(assert_replacement_safe("(?<x>a)(b)", "$1-${x}").is_ok());
    assert_eq!(
        template_reason(assert_replacement_safe("(a)", "$2")),
        TemplateErrorKind::UnknownGroupNumber(2)
    );
    assert_eq!(
        template_reason(assert_replacement_safe("(a)", "${y}")),
        TemplateErrorKind::UnknownGroupName("y".to_string())
    );
    assert_eq!(
        template_reason(assert_replacement_safe("(a)", "end\\")),
        TemplateErrorKind::DanglingEscape
    );
}

#[test]
fn test_replacement_error_position() {
    match assert_replacement_safe("(a)(b)", "ok $1 then ${nope}") {
        Err(Error::Template(e)) => {
            assert_eq!(e.template, "ok $1 then ${nope}");
            assert!(e.position >= 11, "position {} before the reference", e.position);
        }
        other => panic!("expected TemplateError, got {other:?}"),
    }
}

// ============================================================================
// 5. Hostile Parser Input
// ============================================================================

#[test]
fn test_deep_nesting_rejected_without_overflow() {
    let depth = MAX_NESTING * 40;
    let pattern = format!("{}a{}", "(".repeat(depth), ")".repeat(depth));
    assert!(matches!(
        assert_safe(&pattern, 10, 1000, false),
        Err(Error::Pattern(_))
    ));
}

#[test]
fn test_invalid_syntax_rejected() {
    for pattern in ["(ab", "ab)", "[a-", "a**", "*a", "a{2}{3}", "(?<>a)", "\\q"] {
        assert!(
            matches!(assert_safe(pattern, 5, 1000, true), Err(Error::Pattern(_))),
            "{pattern} should be a syntax error"
        );
    }
}

#[test]
fn test_long_pattern_analysis_is_linear() {
    let pattern = "[a-z]".repeat(5_000);
    let start = Instant::now();
    assert!(is_safe(&pattern, 0, 1, false));
    assert!(
        start.elapsed() < Duration::from_secs(5),
        "Analysis took too long: {:?}",
        start.elapsed()
    );
}

// ============================================================================
// 6. Concurrency and Cache Isolation
// ============================================================================

#[test]
fn test_concurrent_checks_agree() {
    let analyzer = Arc::new(Analyzer::with_settings(CacheSettings {
        capacity: NonZeroUsize::new(8).unwrap(),
        ttl: Duration::from_secs(60),
    }));

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let analyzer = Arc::clone(&analyzer);
            thread::spawn(move || {
                for i in 0..200 {
                    let pattern = format!("(a{{{}}})+", (i + t) % 16 + 1);
                    assert!(!analyzer.is_safe(&pattern, 0, 1000, false));
                    assert!(analyzer.is_safe(&pattern, 1, 1000, false));
                    assert!(analyzer.is_safe("^ok$", 0, 1, false));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert!(analyzer.cache_stats().patterns.entries <= 8);
}

#[test]
fn test_cache_isolation() {
    let analyzer = Analyzer::new();
    let before = analyzer.assert_safe("a{3}", 0, 10, false);
    assert!(analyzer.assert_safe("(a+)+", 1, 1000, false).is_err());
    assert!(analyzer.assert_replacement_safe("(a)", "$9").is_err());
    assert_eq!(analyzer.assert_safe("a{3}", 0, 10, false), before);
    assert_eq!(analyzer.assert_safe("a{3}", 0, 10, false), before);
}

#[test]
fn test_same_pattern_different_limits() {
    // Limits are applied after the cache, so one entry serves every caller
    let analyzer = Analyzer::new();
    assert!(!analyzer.is_safe("(a+)+", 1, 1000, false));
    assert!(analyzer.is_safe("(a+)+", 2, 1000, false));
    assert_eq!(analyzer.cache_stats().patterns.entries, 1);
}

#[test]
fn test_match_address_through_global() {
    assert!(match_address("", ""));
    assert!(match_address("anything", "*"));
    assert!(match_address("foo.bar", "foo.*"));
    assert!(!match_address("foo.bar", "bar.*"));
}
