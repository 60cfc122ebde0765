//! Replacement template validation
//!
//! Templates use `$n` for numbered groups, `${name}` for named groups and
//! `\c` to escape a character. Validation stops at the first defect.

use crate::compiled::CompiledPattern;
use saferx_core::{TemplateError, TemplateErrorKind};

/// Check that every group `template` references exists in `pattern`.
///
/// Only the first digit of a numbered reference is checked: `$12` passes if
/// group 1 exists. Extra digits cannot make the substitution unsafe, they
/// only change which text gets inserted.
pub fn validate(pattern: &CompiledPattern, template: &str) -> Result<(), TemplateError> {
    let chars: Vec<char> = template.chars().collect();
    let fail = |position: usize, reason: TemplateErrorKind| {
        Err(TemplateError {
            template: template.to_string(),
            position,
            reason,
        })
    };

    let mut pos = 0;
    while pos < chars.len() {
        match chars[pos] {
            '\\' => {
                pos += 1;
                if pos == chars.len() {
                    return fail(pos, TemplateErrorKind::DanglingEscape);
                }
                pos += 1;
            }
            '$' => {
                pos += 1;
                let Some(&next) = chars.get(pos) else {
                    return fail(pos, TemplateErrorKind::DanglingGroupReference);
                };

                if next == '{' {
                    pos += 1;
                    let begin = pos;
                    while pos < chars.len() && chars[pos].is_ascii_alphanumeric() {
                        pos += 1;
                    }
                    if begin == pos {
                        return fail(pos, TemplateErrorKind::EmptyGroupName);
                    }
                    if chars.get(pos) != Some(&'}') {
                        return fail(pos, TemplateErrorKind::UnterminatedGroupName);
                    }
                    let name: String = chars[begin..pos].iter().collect();
                    if !pattern.has_named_group(&name) {
                        return fail(pos, TemplateErrorKind::UnknownGroupName(name));
                    }
                    pos += 1;
                } else if let Some(digit) = next.to_digit(10) {
                    if digit as usize > pattern.group_count() {
                        return fail(pos, TemplateErrorKind::UnknownGroupNumber(digit));
                    }
                    pos += 1;
                } else {
                    return fail(pos, TemplateErrorKind::IllegalGroupReference(next));
                }
            }
            _ => pos += 1,
        }
    }

    Ok(())
}
