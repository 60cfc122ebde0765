//! Address wildcard to regex translation
//!
//! | glob      | regex     |
//! |-----------|-----------|
//! | `*`       | `.*`      |
//! | `?`       | `.`       |
//! | `[ab]`    | `[ab]`    |
//! | `[!ab]`   | `[^ab]`   |
//! | `{a,b}`   | `(?:a\|b)` |
//! | `\c`      | literal c |
//!
//! Everything else is matched literally.

use saferx_core::GlobError;

/// Translate a glob into regex source.
pub fn glob_to_regex(glob: &str) -> Result<String, GlobError> {
    let chars: Vec<char> = glob.chars().collect();
    let mut out = String::with_capacity(glob.len() * 2);
    let mut open_braces = Vec::new();

    let mut pos = 0;
    while pos < chars.len() {
        match chars[pos] {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '\\' => match chars.get(pos + 1) {
                Some(&c) => {
                    push_literal(&mut out, c);
                    pos += 1;
                }
                None => return Err(GlobError::new("dangling escape", glob, pos)),
            },
            '[' => {
                pos = translate_class(glob, &chars, pos, &mut out)?;
                continue;
            }
            '{' => {
                open_braces.push(pos);
                out.push_str("(?:");
            }
            '}' => {
                if open_braces.pop().is_none() {
                    return Err(GlobError::new("unmatched '}'", glob, pos));
                }
                out.push(')');
            }
            ',' if !open_braces.is_empty() => out.push('|'),
            c => push_literal(&mut out, c),
        }
        pos += 1;
    }

    if let Some(&open) = open_braces.last() {
        return Err(GlobError::new("unclosed '{'", glob, open));
    }
    Ok(out)
}

/// Translate the bracket class opening at `start`, returning the position
/// just past its closing `]`.
fn translate_class(
    glob: &str,
    chars: &[char],
    start: usize,
    out: &mut String,
) -> Result<usize, GlobError> {
    let mut pos = start + 1;
    out.push('[');
    if matches!(chars.get(pos), Some('!' | '^')) {
        out.push('^');
        pos += 1;
    }

    let first = pos;
    loop {
        match chars.get(pos) {
            None => return Err(GlobError::new("unterminated character class", glob, start)),
            Some(']') if pos > first => {
                out.push(']');
                return Ok(pos + 1);
            }
            Some('\\') => match chars.get(pos + 1) {
                Some(&c) => {
                    push_literal(out, c);
                    pos += 2;
                }
                None => return Err(GlobError::new("dangling escape", glob, pos)),
            },
            Some('-') => {
                out.push('-');
                pos += 1;
            }
            Some(&c) => {
                push_literal(out, c);
                pos += 1;
            }
        }
    }
}

fn push_literal(out: &mut String, c: char) {
    let mut buf = [0u8; 4];
    out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcards() {
        assert_eq!(glob_to_regex("foo.*").unwrap(), r"foo\..*");
        assert_eq!(glob_to_regex("a?c").unwrap(), "a.c");
        assert_eq!(glob_to_regex("").unwrap(), "");
    }

    #[test]
    fn test_literals_are_escaped() {
        assert_eq!(glob_to_regex("a+b(c)").unwrap(), r"a\+b\(c\)");
        assert_eq!(glob_to_regex(r"\*").unwrap(), r"\*");
        assert_eq!(glob_to_regex("a,b").unwrap(), "a,b");
    }

    #[test]
    fn test_alternatives() {
        assert_eq!(glob_to_regex("{red,blue}.box").unwrap(), r"(?:red|blue)\.box");
        assert_eq!(glob_to_regex("{a,{b,c}}").unwrap(), "(?:a|(?:b|c))");
    }

    #[test]
    fn test_classes() {
        assert_eq!(glob_to_regex("[ab]x").unwrap(), "[ab]x");
        assert_eq!(glob_to_regex("[!0-9]").unwrap(), "[^0-9]");
        assert_eq!(glob_to_regex("[]a]").unwrap(), r"[\]a]");
        assert_eq!(glob_to_regex("[a[]").unwrap(), r"[a\[]");
    }

    #[test]
    fn test_errors() {
        let cases: &[(&str, usize)] = &[
            ("abc\\", 3),
            ("x[ab", 1),
            ("{a,b", 0),
            ("a}", 1),
            ("[a\\", 2),
        ];
        for (glob, position) in cases {
            let err = glob_to_regex(glob).unwrap_err();
            assert_eq!(err.position, *position, "glob {glob}: {err}");
            assert_eq!(err.glob, *glob);
        }
    }

    #[test]
    fn test_translations_parse() {
        for glob in ["*", "foo.*", "{a,b}[!x-z]?", r"\{literal\}", "[]]", "é*"] {
            let regex = glob_to_regex(glob).unwrap();
            assert!(saferx_core::parse(&regex).is_ok(), "{glob} -> {regex}");
        }
    }
}
