//! Syntax tree for parsed patterns.
//!
//! The tree is built once by [`crate::parser::parse`] and only read
//! afterwards. It carries just enough structure to measure risk; it is not a
//! compilation target.

/// A node in a parsed pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A single literal character.
    Literal(char),
    /// A character class, including `.` and shorthands like `\d`.
    Class(Class),
    /// Sequence of nodes matched one after another.
    Concat(Vec<Node>),
    /// `a|b|c`
    Alternation(Vec<Node>),
    /// `(...)`, `(?:...)`, `(?<name>...)` and `(?flags:...)`.
    Group {
        body: Box<Node>,
        capturing: bool,
        name: Option<String>,
    },
    /// A quantified sub-expression. `max == None` means unbounded.
    Repeat {
        body: Box<Node>,
        min: u32,
        max: Option<u32>,
        greedy: bool,
    },
    /// `\1`, `\k<name>`
    Backreference(BackrefTarget),
    /// Zero-width assertion without content.
    Anchor(AnchorKind),
    /// Lookahead, lookbehind or atomic group.
    Lookaround { body: Box<Node>, kind: LookKind },
    /// Bare inline flags, e.g. `(?i)`.
    Flags(String),
}

/// Target of a backreference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackrefTarget {
    Number(u32),
    Name(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorKind {
    /// `^`
    LineStart,
    /// `$`
    LineEnd,
    /// `\A`
    TextStart,
    /// `\z` and `\Z`
    TextEnd,
    /// `\b`
    WordBoundary,
    /// `\B`
    NotWordBoundary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookKind {
    /// `(?=...)`
    Ahead,
    /// `(?!...)`
    NegativeAhead,
    /// `(?<=...)`
    Behind,
    /// `(?<!...)`
    NegativeBehind,
    /// `(?>...)`
    Atomic,
}

/// A set of characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Class {
    pub negated: bool,
    pub items: Vec<ClassItem>,
}

impl Class {
    /// The class `.` stands for.
    pub fn any() -> Self {
        Self {
            negated: false,
            items: vec![ClassItem::Any],
        }
    }

    /// A single shorthand such as `\w` outside of brackets.
    pub fn shorthand(kind: Shorthand) -> Self {
        Self {
            negated: false,
            items: vec![ClassItem::Shorthand(kind)],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassItem {
    /// Any character (`.`).
    Any,
    Char(char),
    /// Inclusive range `a-z`.
    Range(char, char),
    Shorthand(Shorthand),
    /// `\p{Name}`, `\P{Name}` or a POSIX class such as `[:alpha:]`.
    Property { name: String, negated: bool },
    /// A bracket class inside a bracket class.
    Nested(Class),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shorthand {
    Digit,
    NotDigit,
    Word,
    NotWord,
    Space,
    NotSpace,
}

impl Node {
    /// Concatenation that collapses to its only element.
    pub fn concat(mut nodes: Vec<Node>) -> Node {
        if nodes.len() == 1 {
            nodes.remove(0)
        } else {
            Node::Concat(nodes)
        }
    }

    /// Alternation that collapses to its only branch.
    pub fn alternation(mut branches: Vec<Node>) -> Node {
        if branches.len() == 1 {
            branches.remove(0)
        } else {
            Node::Alternation(branches)
        }
    }

    /// Direct children of this node, in source order.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Concat(nodes) | Node::Alternation(nodes) => nodes,
            Node::Group { body, .. } | Node::Repeat { body, .. } | Node::Lookaround { body, .. } => {
                std::slice::from_ref(body.as_ref())
            }
            Node::Literal(_)
            | Node::Class(_)
            | Node::Backreference(_)
            | Node::Anchor(_)
            | Node::Flags(_) => &[],
        }
    }

    pub fn is_backreference(&self) -> bool {
        matches!(self, Node::Backreference(_))
    }
}
