//! Recursive descent parser turning a pattern string into a [`Node`] tree.
//!
//! Positions in errors are character offsets, not byte offsets, so they line
//! up with what a person counting characters in a config file sees.

use crate::ast::{AnchorKind, BackrefTarget, Class, ClassItem, LookKind, Node, Shorthand};
use crate::error::PatternError;
use std::collections::HashSet;

/// Deepest group nesting accepted before giving up.
pub const MAX_NESTING: usize = 250;

/// Parse `pattern` into a syntax tree.
pub fn parse(pattern: &str) -> Result<Node, PatternError> {
    Parser::new(pattern).parse()
}

/// Escape sequence after the backslash has been consumed.
enum Escape {
    Char(char),
    Shorthand(Shorthand),
    Property { name: String, negated: bool },
    Anchor(AnchorKind),
    Backref(BackrefTarget),
}

struct Parser<'p> {
    pattern: &'p str,
    chars: Vec<char>,
    pos: usize,
    depth: usize,
    names: HashSet<String>,
}

impl<'p> Parser<'p> {
    fn new(pattern: &'p str) -> Self {
        Self {
            pattern,
            chars: pattern.chars().collect(),
            pos: 0,
            depth: 0,
            names: HashSet::new(),
        }
    }

    fn parse(mut self) -> Result<Node, PatternError> {
        let node = self.parse_alternation()?;
        match self.peek() {
            None => Ok(node),
            Some(')') => Err(self.error("unmatched closing parenthesis", self.pos)),
            Some(c) => Err(self.error(format!("unexpected character '{c}'"), self.pos)),
        }
    }

    fn error(&self, message: impl Into<String>, position: usize) -> PatternError {
        PatternError::new(message, self.pattern, position)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_alternation(&mut self) -> Result<Node, PatternError> {
        let mut branches = vec![self.parse_concat()?];
        while self.eat('|') {
            branches.push(self.parse_concat()?);
        }
        Ok(Node::alternation(branches))
    }

    fn parse_concat(&mut self) -> Result<Node, PatternError> {
        let mut nodes = Vec::new();
        while let Some(c) = self.peek() {
            if c == '|' || c == ')' {
                break;
            }
            nodes.push(self.parse_repeat()?);
        }
        Ok(Node::concat(nodes))
    }

    /// An atom and at most one quantifier after it.
    fn parse_repeat(&mut self) -> Result<Node, PatternError> {
        let atom = self.parse_atom()?;

        let (min, max) = match self.peek() {
            Some('*') => {
                self.pos += 1;
                (0, None)
            }
            Some('+') => {
                self.pos += 1;
                (1, None)
            }
            Some('?') => {
                self.pos += 1;
                (0, Some(1))
            }
            Some('{') => match self.try_counted()? {
                Some(bounds) => bounds,
                None => return Ok(atom),
            },
            _ => return Ok(atom),
        };
        let greedy = !self.eat('?');

        if self.at_quantifier()? {
            return Err(self.error("nested quantifier", self.pos));
        }

        Ok(Node::Repeat {
            body: Box::new(atom),
            min,
            max,
            greedy,
        })
    }

    fn at_quantifier(&mut self) -> Result<bool, PatternError> {
        Ok(match self.peek() {
            Some('*' | '+' | '?') => true,
            Some('{') => {
                let save = self.pos;
                let counted = self.try_counted()?.is_some();
                self.pos = save;
                counted
            }
            _ => false,
        })
    }

    /// Parse `{n}`, `{n,}`, `{n,m}` or `{,m}` at the current `{`.
    ///
    /// Returns `None`, without consuming anything, when the brace does not
    /// start a counted repetition; it is then an ordinary literal. A missing
    /// minimum is 0, as the host engine reads it, but `{,}` stays literal.
    fn try_counted(&mut self) -> Result<Option<(u32, Option<u32>)>, PatternError> {
        let start = self.pos;
        self.pos += 1;

        let min = self.parse_count()?;
        let max = if self.eat(',') {
            match self.parse_count()? {
                Some(max) => Some(max),
                None if min.is_some() && self.peek() == Some('}') => None,
                None => {
                    self.pos = start;
                    return Ok(None);
                }
            }
        } else {
            match min {
                Some(min) => Some(min),
                None => {
                    self.pos = start;
                    return Ok(None);
                }
            }
        };
        let min = min.unwrap_or(0);
        if !self.eat('}') {
            self.pos = start;
            return Ok(None);
        }

        if let Some(max) = max {
            if min > max {
                return Err(self.error("invalid repetition range, min exceeds max", start));
            }
        }
        Ok(Some((min, max)))
    }

    fn parse_count(&mut self) -> Result<Option<u32>, PatternError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.pos == start {
            return Ok(None);
        }
        let digits: String = self.chars[start..self.pos].iter().collect();
        digits
            .parse::<u32>()
            .map(Some)
            .map_err(|_| self.error("repetition count too large", start))
    }

    fn parse_atom(&mut self) -> Result<Node, PatternError> {
        let start = self.pos;
        match self.peek() {
            None => Err(self.error("unexpected end of pattern", start)),
            Some('(') => self.parse_group(),
            Some('[') => self.parse_class().map(Node::Class),
            Some('\\') => {
                let escape = self.parse_escape()?;
                Ok(match escape {
                    Escape::Char(c) => Node::Literal(c),
                    Escape::Shorthand(kind) => Node::Class(Class::shorthand(kind)),
                    Escape::Property { name, negated } => Node::Class(Class {
                        negated: false,
                        items: vec![ClassItem::Property { name, negated }],
                    }),
                    Escape::Anchor(kind) => Node::Anchor(kind),
                    Escape::Backref(target) => Node::Backreference(target),
                })
            }
            Some('*' | '+' | '?') => Err(self.error("quantifier without operand", start)),
            Some('{') => {
                if self.try_counted()?.is_some() {
                    return Err(self.error("quantifier without operand", start));
                }
                self.pos += 1;
                Ok(Node::Literal('{'))
            }
            Some(c) => {
                self.pos += 1;
                Ok(match c {
                    '.' => Node::Class(Class::any()),
                    '^' => Node::Anchor(AnchorKind::LineStart),
                    '$' => Node::Anchor(AnchorKind::LineEnd),
                    c => Node::Literal(c),
                })
            }
        }
    }

    fn parse_group(&mut self) -> Result<Node, PatternError> {
        let open = self.pos;
        self.pos += 1;

        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(self.error("pattern nests groups too deeply", open));
        }
        let node = self.parse_group_inner(open);
        self.depth -= 1;
        node
    }

    fn parse_group_inner(&mut self, open: usize) -> Result<Node, PatternError> {
        enum Kind {
            Capture(Option<String>),
            NonCapture,
            Look(LookKind),
        }

        let kind = if self.eat('?') {
            let at = self.pos;
            match self.advance() {
                Some(':') => Kind::NonCapture,
                Some('=') => Kind::Look(LookKind::Ahead),
                Some('!') => Kind::Look(LookKind::NegativeAhead),
                Some('>') => Kind::Look(LookKind::Atomic),
                Some('<') if self.eat('=') => Kind::Look(LookKind::Behind),
                Some('<') if self.eat('!') => Kind::Look(LookKind::NegativeBehind),
                Some('<') => Kind::Capture(Some(self.parse_group_name()?)),
                Some('P') => {
                    if !self.eat('<') {
                        return Err(self.error("expected '<' after (?P", self.pos));
                    }
                    Kind::Capture(Some(self.parse_group_name()?))
                }
                Some('x') => return Err(self.extended_mode(at)),
                Some(c) if is_flag(c) => {
                    self.pos = at;
                    let flags = self.parse_flags()?;
                    if self.eat(')') {
                        return Ok(Node::Flags(flags));
                    }
                    self.pos += 1; // ':'
                    Kind::NonCapture
                }
                Some(c) => return Err(self.error(format!("unknown group flag '{c}'"), at)),
                None => return Err(self.error("unclosed group", open)),
            }
        } else {
            Kind::Capture(None)
        };

        let body = Box::new(self.parse_alternation()?);
        if !self.eat(')') {
            return Err(self.error("unclosed group", open));
        }

        Ok(match kind {
            Kind::Capture(name) => Node::Group {
                body,
                capturing: true,
                name,
            },
            Kind::NonCapture => Node::Group {
                body,
                capturing: false,
                name: None,
            },
            Kind::Look(kind) => Node::Lookaround { body, kind },
        })
    }

    /// Flags up to, not including, the terminating `)` or `:`.
    fn parse_flags(&mut self) -> Result<String, PatternError> {
        let start = self.pos;
        let mut negated = false;
        loop {
            match self.peek() {
                Some(')') | Some(':') => break,
                Some('-') if !negated => {
                    negated = true;
                    self.pos += 1;
                }
                // Turning extended mode off is harmless, it is never on
                Some('x') if negated => self.pos += 1,
                Some('x') => return Err(self.extended_mode(self.pos)),
                Some(c) if is_flag(c) && c != '-' => self.pos += 1,
                Some(c) => return Err(self.error(format!("unknown flag '{c}'"), self.pos)),
                None => return Err(self.error("unclosed group", start.saturating_sub(2))),
            }
        }
        if self.chars[self.pos - 1] == '-' {
            return Err(self.error("expected flag after '-'", self.pos));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    /// Extended mode changes what whitespace and `#` mean, so the tree built
    /// here would no longer be the one the host compiles.
    fn extended_mode(&self, position: usize) -> PatternError {
        self.error("extended mode flag 'x' is not supported", position)
    }

    /// Name of a named group, consuming the closing `>`.
    fn parse_group_name(&mut self) -> Result<String, PatternError> {
        let start = self.pos;
        let name = self.parse_name('>')?;
        if !self.names.insert(name.clone()) {
            return Err(self.error(format!("duplicate group name '{name}'"), start));
        }
        Ok(name)
    }

    fn parse_name(&mut self, close: char) -> Result<String, PatternError> {
        let start = self.pos;
        loop {
            match self.peek() {
                Some(c) if c == close => break,
                Some(c) if c == '_' || c.is_ascii_alphabetic() => self.pos += 1,
                Some(c) if c.is_ascii_digit() && self.pos > start => self.pos += 1,
                Some(c) => {
                    return Err(self.error(format!("invalid character '{c}' in group name"), self.pos))
                }
                None => return Err(self.error("unterminated group name", start)),
            }
        }
        if self.pos == start {
            return Err(self.error("empty group name", start));
        }
        let name = self.chars[start..self.pos].iter().collect();
        self.pos += 1;
        Ok(name)
    }

    fn parse_class(&mut self) -> Result<Class, PatternError> {
        let open = self.pos;
        self.pos += 1;

        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(self.error("pattern nests classes too deeply", open));
        }

        let negated = self.eat('^');
        let mut items = Vec::new();
        let mut first = true;
        loop {
            let at = self.pos;
            let item = match self.peek() {
                None => return Err(self.error("unterminated character class", open)),
                Some(']') if !first => {
                    self.pos += 1;
                    break;
                }
                Some('[') if self.peek_at(1) == Some(':') => self.parse_posix_class()?,
                Some('[') => ClassItem::Nested(self.parse_class()?),
                Some('\\') => match self.parse_escape()? {
                    Escape::Char(c) => self.parse_range_tail(c, at)?,
                    Escape::Shorthand(kind) => ClassItem::Shorthand(kind),
                    Escape::Property { name, negated } => ClassItem::Property { name, negated },
                    Escape::Anchor(_) | Escape::Backref(_) => {
                        return Err(self.error("escape sequence not allowed in character class", at))
                    }
                },
                Some(c) => {
                    self.pos += 1;
                    self.parse_range_tail(c, at)?
                }
            };
            items.push(item);
            first = false;
        }

        self.depth -= 1;
        Ok(Class { negated, items })
    }

    /// Having read `lo`, read an optional `-hi`.
    fn parse_range_tail(&mut self, lo: char, at: usize) -> Result<ClassItem, PatternError> {
        if self.peek() != Some('-') || matches!(self.peek_at(1), None | Some(']')) {
            return Ok(ClassItem::Char(lo));
        }
        self.pos += 1;

        let hi_at = self.pos;
        let hi = match self.peek() {
            Some('\\') => match self.parse_escape()? {
                Escape::Char(c) => c,
                _ => return Err(self.error("invalid range end in character class", hi_at)),
            },
            Some('[') => return Err(self.error("invalid range end in character class", hi_at)),
            Some(c) => {
                self.pos += 1;
                c
            }
            None => return Err(self.error("unterminated character class", at)),
        };
        if lo > hi {
            return Err(self.error(format!("invalid range '{lo}-{hi}'"), at));
        }
        Ok(ClassItem::Range(lo, hi))
    }

    /// `[:alpha:]` or `[:^alpha:]` inside a bracket class.
    fn parse_posix_class(&mut self) -> Result<ClassItem, PatternError> {
        let start = self.pos;
        self.pos += 2;
        let negated = self.eat('^');
        let name_start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        let name: String = self.chars[name_start..self.pos].iter().collect();
        if name.is_empty() || !self.eat(':') || !self.eat(']') {
            return Err(self.error("invalid POSIX character class", start));
        }
        Ok(ClassItem::Property { name, negated })
    }

    /// Parse an escape starting at the current `\`.
    fn parse_escape(&mut self) -> Result<Escape, PatternError> {
        let start = self.pos;
        self.pos += 1;
        let Some(c) = self.advance() else {
            return Err(self.error("dangling escape at end of pattern", start));
        };

        Ok(match c {
            'd' => Escape::Shorthand(Shorthand::Digit),
            'D' => Escape::Shorthand(Shorthand::NotDigit),
            'w' => Escape::Shorthand(Shorthand::Word),
            'W' => Escape::Shorthand(Shorthand::NotWord),
            's' => Escape::Shorthand(Shorthand::Space),
            'S' => Escape::Shorthand(Shorthand::NotSpace),
            'b' => Escape::Anchor(AnchorKind::WordBoundary),
            'B' => Escape::Anchor(AnchorKind::NotWordBoundary),
            'A' => Escape::Anchor(AnchorKind::TextStart),
            'z' | 'Z' => Escape::Anchor(AnchorKind::TextEnd),
            '1'..='9' => {
                let digits_start = self.pos - 1;
                while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                    self.pos += 1;
                }
                let digits: String = self.chars[digits_start..self.pos].iter().collect();
                let n = digits
                    .parse::<u32>()
                    .map_err(|_| self.error("backreference number too large", start))?;
                Escape::Backref(BackrefTarget::Number(n))
            }
            'k' => {
                if !self.eat('<') {
                    return Err(self.error("expected '<' after \\k", self.pos));
                }
                Escape::Backref(BackrefTarget::Name(self.parse_name('>')?))
            }
            'p' | 'P' => {
                let name = if self.eat('{') {
                    let name_start = self.pos;
                    while matches!(self.peek(), Some(c) if c != '}') {
                        self.pos += 1;
                    }
                    if self.pos == name_start || !self.eat('}') {
                        return Err(self.error("invalid Unicode property", start));
                    }
                    self.chars[name_start..self.pos - 1].iter().collect()
                } else {
                    match self.advance() {
                        Some(c) if c.is_ascii_alphabetic() => c.to_string(),
                        _ => return Err(self.error("invalid Unicode property", start)),
                    }
                };
                Escape::Property {
                    name,
                    negated: c == 'P',
                }
            }
            'n' => Escape::Char('\n'),
            't' => Escape::Char('\t'),
            'r' => Escape::Char('\r'),
            'f' => Escape::Char('\x0C'),
            'v' => Escape::Char('\x0B'),
            'e' => Escape::Char('\x1B'),
            'a' => Escape::Char('\x07'),
            '0' => Escape::Char('\0'),
            'x' => {
                let digits = if self.eat('{') {
                    let hex_start = self.pos;
                    while matches!(self.peek(), Some(c) if c.is_ascii_hexdigit()) {
                        self.pos += 1;
                    }
                    let end = self.pos;
                    if end == hex_start || !self.eat('}') {
                        return Err(self.error("invalid hexadecimal escape", start));
                    }
                    self.chars[hex_start..end].iter().collect::<String>()
                } else {
                    self.take_hex(2, start)?
                };
                Escape::Char(self.hex_char(&digits, start)?)
            }
            'u' => {
                let digits = self.take_hex(4, start)?;
                Escape::Char(self.hex_char(&digits, start)?)
            }
            c if c.is_ascii_punctuation() || c == ' ' => Escape::Char(c),
            c => return Err(self.error(format!("unknown escape sequence '\\{c}'"), start)),
        })
    }

    fn take_hex(&mut self, count: usize, start: usize) -> Result<String, PatternError> {
        let mut digits = String::with_capacity(count);
        for _ in 0..count {
            match self.advance() {
                Some(c) if c.is_ascii_hexdigit() => digits.push(c),
                _ => return Err(self.error("invalid hexadecimal escape", start)),
            }
        }
        Ok(digits)
    }

    fn hex_char(&self, digits: &str, start: usize) -> Result<char, PatternError> {
        u32::from_str_radix(digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| self.error("hexadecimal escape is not a valid code point", start))
    }
}

fn is_flag(c: char) -> bool {
    matches!(c, 'i' | 'm' | 's' | 'u' | 'U' | '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(c: char) -> Node {
        Node::Literal(c)
    }

    #[test]
    fn test_literal_sequence() {
        assert_eq!(parse("ab").unwrap(), Node::Concat(vec![lit('a'), lit('b')]));
        assert_eq!(parse("a").unwrap(), lit('a'));
        assert_eq!(parse("").unwrap(), Node::Concat(vec![]));
    }

    #[test]
    fn test_quantifiers() {
        let node = parse("a{2,5}?").unwrap();
        assert_eq!(
            node,
            Node::Repeat {
                body: Box::new(lit('a')),
                min: 2,
                max: Some(5),
                greedy: false,
            }
        );

        match parse("b{3,}").unwrap() {
            Node::Repeat { min, max, .. } => {
                assert_eq!(min, 3);
                assert_eq!(max, None);
            }
            other => panic!("unexpected node {other:?}"),
        }
    }

    #[test]
    fn test_brace_without_count_is_literal() {
        assert_eq!(
            parse("a{x}").unwrap(),
            Node::Concat(vec![lit('a'), lit('{'), lit('x'), lit('}')])
        );
    }

    #[test]
    fn test_missing_minimum_counts_from_zero() {
        assert_eq!(
            parse("a{,3}").unwrap(),
            Node::Repeat {
                body: Box::new(lit('a')),
                min: 0,
                max: Some(3),
                greedy: true,
            }
        );
        assert_eq!(
            parse("a{,}").unwrap(),
            Node::Concat(vec![lit('a'), lit('{'), lit(','), lit('}')])
        );
        assert_eq!(parse("a{,3}{2}").unwrap_err().position, 5);
        assert_eq!(parse("{,3}").unwrap_err().position, 0);
    }

    #[test]
    fn test_extended_mode_rejected() {
        for (pattern, position) in [("(?x)a", 2), ("(?ix:a)", 3), ("a(?s-i)(?x)", 9)] {
            let err = parse(pattern).unwrap_err();
            assert_eq!(err.position, position, "pattern {pattern}: {err}");
            assert!(err.message.contains("extended"));
        }
        assert!(parse("(?-x)a b").is_ok());
    }

    #[test]
    fn test_groups() {
        match parse("(?<year>\\d{4})").unwrap() {
            Node::Group {
                capturing, name, ..
            } => {
                assert!(capturing);
                assert_eq!(name.as_deref(), Some("year"));
            }
            other => panic!("unexpected node {other:?}"),
        }

        match parse("(?:ab)").unwrap() {
            Node::Group {
                capturing, name, ..
            } => {
                assert!(!capturing);
                assert!(name.is_none());
            }
            other => panic!("unexpected node {other:?}"),
        }
    }

    #[test]
    fn test_inline_flags() {
        assert_eq!(
            parse("(?i)a").unwrap(),
            Node::Concat(vec![Node::Flags("i".to_string()), lit('a')])
        );
        assert!(matches!(
            parse("(?s-i:a)").unwrap(),
            Node::Group {
                capturing: false,
                ..
            }
        ));
    }

    #[test]
    fn test_lookaround() {
        assert!(matches!(
            parse("(?<!x)y").unwrap(),
            Node::Concat(ref nodes) if matches!(nodes[0], Node::Lookaround { kind: LookKind::NegativeBehind, .. })
        ));
    }

    #[test]
    fn test_backreferences() {
        assert_eq!(
            parse("\\k<word>").unwrap(),
            Node::Backreference(BackrefTarget::Name("word".to_string()))
        );
        assert_eq!(
            parse("\\12").unwrap(),
            Node::Backreference(BackrefTarget::Number(12))
        );
    }

    #[test]
    fn test_class() {
        let node = parse("[^a-z_\\d]").unwrap();
        assert_eq!(
            node,
            Node::Class(Class {
                negated: true,
                items: vec![
                    ClassItem::Range('a', 'z'),
                    ClassItem::Char('_'),
                    ClassItem::Shorthand(Shorthand::Digit),
                ],
            })
        );
    }

    #[test]
    fn test_class_edge_literals() {
        let node = parse("[]a-]").unwrap();
        assert_eq!(
            node,
            Node::Class(Class {
                negated: false,
                items: vec![ClassItem::Char(']'), ClassItem::Char('a'), ClassItem::Char('-')],
            })
        );
    }

    #[test]
    fn test_escapes() {
        assert_eq!(parse("\\x41").unwrap(), lit('A'));
        assert_eq!(parse("\\x{1F600}").unwrap(), lit('😀'));
        assert_eq!(parse("\\u00e9").unwrap(), lit('é'));
        assert_eq!(parse("\\.").unwrap(), lit('.'));
    }

    #[test]
    fn test_error_positions() {
        let cases: &[(&str, usize)] = &[
            ("(ab", 0),
            ("ab)", 2),
            ("x[abc", 1),
            ("*a", 0),
            ("a**", 2),
            ("a{2}{3}", 4),
            ("ab\\", 2),
            ("a\\q", 1),
            ("a{5,2}", 1),
            ("[z-a]", 1),
            ("(?<>a)", 3),
            ("(?<1x>a)", 3),
            ("(?y)", 2),
        ];
        for (pattern, position) in cases {
            let err = parse(pattern).unwrap_err();
            assert_eq!(err.position, *position, "pattern {pattern}: {err}");
            assert_eq!(err.pattern, *pattern);
        }
    }

    #[test]
    fn test_error_position_counts_characters() {
        // 'é' is two bytes but one character
        let err = parse("é(").unwrap_err();
        assert_eq!(err.position, 1);
    }

    #[test]
    fn test_duplicate_group_name() {
        let err = parse("(?<a>x)(?<a>y)").unwrap_err();
        assert!(err.message.contains("duplicate"));
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}a{}", "(".repeat(MAX_NESTING + 1), ")".repeat(MAX_NESTING + 1));
        let err = parse(&deep).unwrap_err();
        assert_eq!(err.position, MAX_NESTING);

        let ok = format!("{}a{}", "(".repeat(MAX_NESTING), ")".repeat(MAX_NESTING));
        assert!(parse(&ok).is_ok());
    }
}
