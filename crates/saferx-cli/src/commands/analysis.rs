use super::{load_config, Output};
use anyhow::{Context, Result};
use colored::*;
use saferx_engine::{Analyzer, Error, RiskProfile, SafetyLimits};
use serde::Serialize;
use std::path::Path;

/// Limits given on the command line, each overriding the config file
#[derive(Debug, Clone, Copy, Default)]
pub struct LimitOverrides {
    pub max_star_height: Option<u32>,
    pub max_repetitions: Option<u64>,
    pub allow_backreferences: bool,
}

impl LimitOverrides {
    fn apply(self, mut limits: SafetyLimits) -> SafetyLimits {
        if let Some(n) = self.max_star_height {
            limits.max_star_height = n;
        }
        if let Some(n) = self.max_repetitions {
            limits.max_repetitions = n;
        }
        if self.allow_backreferences {
            limits.allow_backreferences = true;
        }
        limits
    }
}

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub pattern: String,
    pub accepted: bool,
    pub limits: SafetyLimits,
    /// Absent when the pattern does not compile
    pub profile: Option<RiskProfile>,
    pub error: Option<String>,
    /// Character offset of a syntax error
    pub position: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct TemplateReport {
    pub pattern: String,
    pub template: String,
    pub accepted: bool,
    pub error: Option<String>,
    /// Character offset into the pattern or the template, whichever failed
    pub position: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct GlobReport {
    pub glob: String,
    pub regex: Option<String>,
    pub error: Option<String>,
    pub position: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct MatchReport {
    pub a: String,
    pub b: String,
    pub matched: bool,
}

fn analyzer(config_path: Option<&Path>) -> Result<(Analyzer, SafetyLimits)> {
    let config = load_config(config_path)?;
    let settings = config
        .cache_settings()
        .context("Invalid cache settings in config")?;
    Ok((Analyzer::with_settings(settings), config.limits))
}

pub fn check_pattern(analyzer: &Analyzer, pattern: &str, limits: SafetyLimits) -> CheckReport {
    let mut report = CheckReport {
        pattern: pattern.to_string(),
        accepted: false,
        limits,
        profile: None,
        error: None,
        position: None,
    };
    match analyzer.assert_safe_with(pattern, &limits) {
        Ok(profile) => {
            report.accepted = true;
            report.profile = Some(profile);
        }
        Err(Error::Pattern(e)) => {
            report.position = Some(e.position);
            report.error = Some(e.message);
        }
        Err(e) => {
            // Rejected by policy, so the pattern compiled and has a profile
            report.profile = analyzer.compile(pattern).ok().map(|c| c.risk());
            report.error = Some(e.to_string());
        }
    }
    report
}

pub fn check_template(analyzer: &Analyzer, pattern: &str, template: &str) -> TemplateReport {
    let (error, position) = match analyzer.assert_replacement_safe(pattern, template) {
        Ok(()) => (None, None),
        Err(Error::Pattern(e)) => (Some(e.to_string()), Some(e.position)),
        Err(Error::Template(e)) => (Some(e.to_string()), Some(e.position)),
        Err(e) => (Some(e.to_string()), None),
    };
    TemplateReport {
        pattern: pattern.to_string(),
        template: template.to_string(),
        accepted: error.is_none(),
        error,
        position,
    }
}

pub fn translate(analyzer: &Analyzer, glob: &str) -> GlobReport {
    let (regex, error, position) = match analyzer.translate_glob(glob) {
        Ok(regex) => (Some(regex), None, None),
        Err(e) => (None, Some(e.message.clone()), Some(e.position)),
    };
    GlobReport {
        glob: glob.to_string(),
        regex,
        error,
        position,
    }
}

pub fn run_check(
    config_path: Option<&Path>,
    pattern: &str,
    overrides: LimitOverrides,
    output: Output,
) -> Result<bool> {
    let (analyzer, limits) = analyzer(config_path)?;
    let report = check_pattern(&analyzer, pattern, overrides.apply(limits));

    output.emit(&report, |r| {
        if r.accepted {
            println!("{} {}", "✓".green(), r.pattern);
        } else {
            println!("{} {}", "✗".red(), r.pattern);
            if let Some(position) = r.position {
                println!("  {}", caret(position));
            }
            if let Some(error) = &r.error {
                println!("  {}", error.red());
            }
        }
        if let Some(profile) = &r.profile {
            println!(
                "  star height: {} (limit {})",
                profile.star_height, r.limits.max_star_height
            );
            println!(
                "  repetitions: {} (limit {})",
                profile.finite_repetition_cost, r.limits.max_repetitions
            );
            println!(
                "  backreferences: {}{}",
                if profile.has_backreference { "yes" } else { "no" },
                if r.limits.allow_backreferences { " (allowed)" } else { "" }
            );
        }
    })?;
    Ok(report.accepted)
}

pub fn run_template(
    config_path: Option<&Path>,
    pattern: &str,
    template: &str,
    output: Output,
) -> Result<bool> {
    let (analyzer, _) = analyzer(config_path)?;
    let report = check_template(&analyzer, pattern, template);

    output.emit(&report, |r| {
        if r.accepted {
            println!("{} {}", "✓".green(), r.template);
        } else if let Some(error) = &r.error {
            println!("{} {}", "✗".red(), error.red());
        }
    })?;
    Ok(report.accepted)
}

pub fn run_glob(config_path: Option<&Path>, glob: &str, output: Output) -> Result<bool> {
    let (analyzer, _) = analyzer(config_path)?;
    let report = translate(&analyzer, glob);

    output.emit(&report, |r| match (&r.regex, &r.error) {
        (Some(regex), _) => println!("{regex}"),
        (None, Some(error)) => {
            println!("{} {}", "✗".red(), r.glob);
            if let Some(position) = r.position {
                println!("  {}", caret(position));
            }
            println!("  {}", error.red());
        }
        (None, None) => {}
    })?;
    Ok(report.regex.is_some())
}

pub fn run_match(config_path: Option<&Path>, a: &str, b: &str, output: Output) -> Result<bool> {
    let (analyzer, _) = analyzer(config_path)?;
    let report = MatchReport {
        a: a.to_string(),
        b: b.to_string(),
        matched: analyzer.match_address(a, b),
    };

    output.emit(&report, |r| {
        if r.matched {
            println!("{} {:?} matches {:?}", "✓".green(), r.a, r.b);
        } else {
            println!("{} {:?} does not match {:?}", "✗".red(), r.a, r.b);
        }
    })?;
    Ok(report.matched)
}

/// A `^` under the character at `position`, for printing below the input.
fn caret(position: usize) -> String {
    format!("{}{}", " ".repeat(position), "^".yellow())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply() {
        let limits = LimitOverrides {
            max_star_height: Some(3),
            max_repetitions: None,
            allow_backreferences: true,
        }
        .apply(SafetyLimits::default());
        assert_eq!(limits.max_star_height, 3);
        assert_eq!(limits.max_repetitions, 1000);
        assert!(limits.allow_backreferences);

        let unchanged = LimitOverrides::default().apply(SafetyLimits::default());
        assert_eq!(unchanged, SafetyLimits::default());
    }

    #[test]
    fn test_check_report_accepted() {
        let report = check_pattern(&Analyzer::new(), "a{3}", SafetyLimits::default());
        assert!(report.accepted);
        assert_eq!(report.profile.unwrap().repetition_cost, 3);
        assert!(report.error.is_none());
    }

    #[test]
    fn test_check_report_rejected_keeps_profile() {
        let report = check_pattern(&Analyzer::new(), "(a+)+", SafetyLimits::default());
        assert!(!report.accepted);
        assert_eq!(report.profile.unwrap().star_height, 2);
        assert!(report.error.unwrap().contains("star height"));
        assert_eq!(report.position, None);
    }

    #[test]
    fn test_check_report_syntax_error() {
        let report = check_pattern(&Analyzer::new(), "ab)", SafetyLimits::default());
        assert!(!report.accepted);
        assert!(report.profile.is_none());
        assert_eq!(report.position, Some(2));
    }

    #[test]
    fn test_template_report() {
        let analyzer = Analyzer::new();
        assert!(check_template(&analyzer, "(a)", "$1").accepted);

        let report = check_template(&analyzer, "(a)", "x$2");
        assert!(!report.accepted);
        assert!(report.position.is_some());
    }

    #[test]
    fn test_glob_report() {
        let analyzer = Analyzer::new();
        let report = translate(&analyzer, "dock.*");
        assert_eq!(report.regex.as_deref(), Some(r"dock\..*"));

        let report = translate(&analyzer, "dock\\");
        assert!(report.regex.is_none());
        assert_eq!(report.position, Some(4));
    }

    #[test]
    fn test_reports_serialize() {
        let report = check_pattern(&Analyzer::new(), "a", SafetyLimits::default());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["accepted"], true);
        assert_eq!(json["profile"]["star_height"], 0);
        assert_eq!(json["limits"]["max_repetitions"], 1000);
    }
}
