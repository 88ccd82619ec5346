// Copyright 2026 the Reflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Selector grammar: tokenizer and the parsed [`QueryData`] form.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use smallvec::SmallVec;

/// How a segment binds to the segment on its left.
///
/// The first segment of a chain carries [`Combinator::Descendant`]; it has
/// nothing to its left, so the value is never consulted there.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combinator {
    /// Whitespace: any ancestor.
    Descendant,
    /// `>`: the immediate parent.
    Child,
    /// `+`: the immediately preceding element sibling.
    Adjacent,
    /// `~`: any preceding element sibling.
    Sibling,
}

/// Attribute comparison operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttrOp {
    /// `[attr]`
    Exists,
    /// `[attr=v]`
    Eq,
    /// `[attr~=v]`: whitespace-separated token list contains `v`.
    Includes,
    /// `[attr^=v]`
    Prefix,
    /// `[attr$=v]`
    Suffix,
    /// `[attr*=v]`
    Substring,
    /// `[attr|=v]`: equal to `v` or prefixed by `v-`.
    DashMatch,
}

/// One `[attr(op)value]` clause.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttrPredicate {
    pub name: String,
    pub op: AttrOp,
    pub value: String,
    /// `[attr=v i]` flag.
    pub case_insensitive: bool,
}

/// An `an+b` pattern over 1-based sibling indices.
///
/// `even` is `(2, 0)`, `odd` is `(2, 1)`, a bare `b` is `(0, b)`, a bare
/// `an` is `(a, 0)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nth {
    pub a: i32,
    pub b: i32,
}

impl Nth {
    /// Whether the 1-based index `index` is generated by this pattern.
    #[must_use]
    pub fn matches(self, index: i32) -> bool {
        let d = index - self.b;
        if self.a == 0 {
            d == 0
        } else {
            d % self.a == 0 && d / self.a >= 0
        }
    }
}

/// Structural pseudo-classes in the supported subset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PseudoClass {
    FirstChild,
    LastChild,
    OnlyChild,
    Empty,
    FirstOfType,
    LastOfType,
    NthChild(Nth),
    NthLastChild(Nth),
    NthOfType(Nth),
    /// Negation of a compound selector (no combinators inside).
    Not(Box<QueryData>),
}

/// One parsed selector segment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryData {
    /// Binding to the previous (left) segment.
    pub combinator: Combinator,
    /// `None` matches any tag (`*` or omitted).
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: SmallVec<[String; 2]>,
    pub attrs: SmallVec<[AttrPredicate; 1]>,
    pub pseudos: SmallVec<[PseudoClass; 1]>,
}

impl QueryData {
    fn empty(combinator: Combinator) -> Self {
        Self {
            combinator,
            tag: None,
            id: None,
            classes: SmallVec::new(),
            attrs: SmallVec::new(),
            pseudos: SmallVec::new(),
        }
    }

    fn is_vacant(&self) -> bool {
        self.tag.is_none()
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attrs.is_empty()
            && self.pseudos.is_empty()
    }
}

/// Parse a full selector into its comma-alternatives.
///
/// Each alternative is a left-to-right chain of segments. An alternative
/// with a syntax error (dangling combinator, stray `::`, unbalanced bracket
/// or parenthesis, unknown pseudo-class) is dropped rather than reported;
/// the caller sees it as "matches nothing".
#[must_use]
pub fn parse_selector(input: &str) -> Vec<Vec<QueryData>> {
    split_alternatives(input)
        .into_iter()
        .filter_map(|alt| parse_chain(alt))
        .collect()
}

/// Split on top-level commas, honoring brackets, parens, and quotes.
fn split_alternatives(input: &str) -> Vec<&str> {
    let bytes = input.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0;
    let mut depth = 0_i32;
    let mut quote: Option<u8> = None;
    for (i, &b) in bytes.iter().enumerate() {
        match quote {
            Some(q) => {
                if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'\'' | b'"' => quote = Some(b),
                b'[' | b'(' => depth += 1,
                b']' | b')' => depth -= 1,
                b',' if depth == 0 => {
                    parts.push(&input[start..i]);
                    start = i + 1;
                }
                _ => {}
            },
        }
    }
    parts.push(&input[start..]);
    parts
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
        self.pos > start
    }

    /// Read an identifier (`[-_a-zA-Z0-9]+`, not starting the scan eagerly).
    fn read_ident(&mut self) -> Option<&'a str> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            self.pos += 1;
        }
        if self.pos == start {
            return None;
        }
        // Identifier bytes are ASCII, so the slice is valid UTF-8.
        core::str::from_utf8(&self.bytes[start..self.pos]).ok()
    }

    /// Read up to the matching close byte, honoring nesting of the open byte.
    fn read_balanced(&mut self, open: u8, close: u8) -> Option<&'a str> {
        let start = self.pos;
        let mut depth = 1;
        while let Some(b) = self.bump() {
            if b == open {
                depth += 1;
            } else if b == close {
                depth -= 1;
                if depth == 0 {
                    return core::str::from_utf8(&self.bytes[start..self.pos - 1]).ok();
                }
            }
        }
        None
    }
}

/// Parse one alternative; `None` on any syntax error.
fn parse_chain(input: &str) -> Option<Vec<QueryData>> {
    let mut cursor = Cursor::new(input.trim());
    if cursor.bytes.is_empty() {
        return None;
    }
    let mut chain: Vec<QueryData> = Vec::new();
    loop {
        let saw_space = cursor.skip_whitespace();
        let Some(next) = cursor.peek() else {
            break;
        };
        let combinator = match next {
            b'>' | b'+' | b'~' => {
                // Explicit combinators need a left-hand segment.
                if chain.is_empty() {
                    return None;
                }
                cursor.pos += 1;
                cursor.skip_whitespace();
                match next {
                    b'>' => Combinator::Child,
                    b'+' => Combinator::Adjacent,
                    _ => Combinator::Sibling,
                }
            }
            _ if saw_space && !chain.is_empty() => Combinator::Descendant,
            _ => Combinator::Descendant,
        };
        let segment = parse_compound(&mut cursor, combinator)?;
        chain.push(segment);
    }
    if chain.is_empty() { None } else { Some(chain) }
}

/// Parse one compound segment at the cursor. Stops before whitespace,
/// explicit combinators, and end of input.
fn parse_compound(cursor: &mut Cursor<'_>, combinator: Combinator) -> Option<QueryData> {
    let mut seg = QueryData::empty(combinator);
    let mut consumed = false;
    loop {
        match cursor.peek() {
            None => break,
            Some(b) if b.is_ascii_whitespace() => break,
            Some(b'>') | Some(b'+') | Some(b'~') => break,
            Some(b'*') => {
                cursor.pos += 1;
                // Universal: leave `tag` as None.
            }
            Some(b'#') => {
                cursor.pos += 1;
                seg.id = Some(String::from(cursor.read_ident()?));
            }
            Some(b'.') => {
                cursor.pos += 1;
                seg.classes.push(String::from(cursor.read_ident()?));
            }
            Some(b'[') => {
                cursor.pos += 1;
                let inner = cursor.read_balanced(b'[', b']')?;
                seg.attrs.push(parse_attr(inner)?);
            }
            Some(b':') => {
                cursor.pos += 1;
                // Pseudo-elements (`::`) are outside the subset.
                if cursor.peek() == Some(b':') {
                    return None;
                }
                let name = cursor.read_ident()?;
                let arg = if cursor.peek() == Some(b'(') {
                    cursor.pos += 1;
                    Some(cursor.read_balanced(b'(', b')')?)
                } else {
                    None
                };
                seg.pseudos.push(parse_pseudo(name, arg)?);
            }
            Some(_) => {
                let tag = cursor.read_ident()?;
                seg.tag = Some(tag.to_ascii_lowercase());
            }
        }
        consumed = true;
    }
    // A combinator with nothing after it lands here without consuming.
    if consumed { Some(seg) } else { None }
}

fn parse_attr(inner: &str) -> Option<AttrPredicate> {
    let mut text = inner.trim();
    let mut case_insensitive = false;
    if let Some(stripped) = text
        .strip_suffix('i')
        .or_else(|| text.strip_suffix('I'))
        && stripped.ends_with(char::is_whitespace)
    {
        case_insensitive = true;
        text = stripped.trim_end();
    }
    let ops: [(&str, AttrOp); 6] = [
        ("~=", AttrOp::Includes),
        ("^=", AttrOp::Prefix),
        ("$=", AttrOp::Suffix),
        ("*=", AttrOp::Substring),
        ("|=", AttrOp::DashMatch),
        ("=", AttrOp::Eq),
    ];
    for (token, op) in ops {
        if let Some(at) = text.find(token) {
            let name = text[..at].trim();
            let raw = text[at + token.len()..].trim();
            let value = unquote(raw);
            if name.is_empty() {
                return None;
            }
            return Some(AttrPredicate {
                name: String::from(name),
                op,
                value: String::from(value),
                case_insensitive,
            });
        }
    }
    if text.is_empty() {
        return None;
    }
    Some(AttrPredicate {
        name: String::from(text),
        op: AttrOp::Exists,
        value: String::new(),
        case_insensitive,
    })
}

fn unquote(raw: &str) -> &str {
    let bytes = raw.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        if (first == b'\'' || first == b'"') && bytes[bytes.len() - 1] == first {
            return &raw[1..raw.len() - 1];
        }
    }
    raw
}

fn parse_pseudo(name: &str, arg: Option<&str>) -> Option<PseudoClass> {
    match (name, arg) {
        ("first-child", None) => Some(PseudoClass::FirstChild),
        ("last-child", None) => Some(PseudoClass::LastChild),
        ("only-child", None) => Some(PseudoClass::OnlyChild),
        ("empty", None) => Some(PseudoClass::Empty),
        ("first-of-type", None) => Some(PseudoClass::FirstOfType),
        ("last-of-type", None) => Some(PseudoClass::LastOfType),
        ("nth-child", Some(a)) => parse_nth(a).map(PseudoClass::NthChild),
        ("nth-last-child", Some(a)) => parse_nth(a).map(PseudoClass::NthLastChild),
        ("nth-of-type", Some(a)) => parse_nth(a).map(PseudoClass::NthOfType),
        ("not", Some(inner)) => {
            let mut cursor = Cursor::new(inner.trim());
            let seg = parse_compound(&mut cursor, Combinator::Descendant)?;
            // Combinators inside :not() are outside the subset.
            if cursor.peek().is_some() || seg.is_vacant() {
                return None;
            }
            Some(PseudoClass::Not(Box::new(seg)))
        }
        _ => None,
    }
}

/// Parse `an+b` forms: `even`, `odd`, `3`, `2n`, `2n+1`, `-n+3`, `+2n-1`, `n`.
fn parse_nth(input: &str) -> Option<Nth> {
    let text: String = input
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    match text.as_str() {
        "even" => return Some(Nth { a: 2, b: 0 }),
        "odd" => return Some(Nth { a: 2, b: 1 }),
        _ => {}
    }
    let Some(n_at) = text.find('n') else {
        // Pure offset: `b`.
        return text.parse::<i32>().ok().map(|b| Nth { a: 0, b });
    };
    let coeff = &text[..n_at];
    let a = match coeff {
        "" | "+" => 1,
        "-" => -1,
        _ => coeff.parse::<i32>().ok()?,
    };
    let rest = &text[n_at + 1..];
    let b = if rest.is_empty() {
        0
    } else {
        // Signed offset; `parse` accepts the leading `+`/`-`.
        rest.parse::<i32>().ok()?
    };
    Some(Nth { a, b })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one(selector: &str) -> Vec<QueryData> {
        let mut alts = parse_selector(selector);
        assert_eq!(alts.len(), 1, "expected one alternative for {selector}");
        alts.remove(0)
    }

    #[test]
    fn compound_parts() {
        let chain = one("div#main.card.flat[data-kind~='hot' i]");
        assert_eq!(chain.len(), 1);
        let seg = &chain[0];
        assert_eq!(seg.tag.as_deref(), Some("div"));
        assert_eq!(seg.id.as_deref(), Some("main"));
        assert_eq!(seg.classes.as_slice(), ["card", "flat"]);
        assert_eq!(
            seg.attrs.as_slice(),
            [AttrPredicate {
                name: String::from("data-kind"),
                op: AttrOp::Includes,
                value: String::from("hot"),
                case_insensitive: true,
            }]
        );
    }

    #[test]
    fn combinators_and_alternatives() {
        let alts = parse_selector("ul > li + li, p ~ span, a b");
        assert_eq!(alts.len(), 3);
        assert_eq!(alts[0][1].combinator, Combinator::Child);
        assert_eq!(alts[0][2].combinator, Combinator::Adjacent);
        assert_eq!(alts[1][1].combinator, Combinator::Sibling);
        assert_eq!(alts[2][1].combinator, Combinator::Descendant);
    }

    #[test]
    fn nth_forms() {
        assert_eq!(parse_nth("even"), Some(Nth { a: 2, b: 0 }));
        assert_eq!(parse_nth("odd"), Some(Nth { a: 2, b: 1 }));
        assert_eq!(parse_nth("3"), Some(Nth { a: 0, b: 3 }));
        assert_eq!(parse_nth("2n"), Some(Nth { a: 2, b: 0 }));
        assert_eq!(parse_nth(" 2n + 1 "), Some(Nth { a: 2, b: 1 }));
        assert_eq!(parse_nth("-n+3"), Some(Nth { a: -1, b: 3 }));
        assert_eq!(parse_nth("+2n-1"), Some(Nth { a: 2, b: -1 }));
        assert_eq!(parse_nth("n"), Some(Nth { a: 1, b: 0 }));
        assert_eq!(parse_nth("garbage"), None);
    }

    #[test]
    fn nth_match_arithmetic() {
        let odd = Nth { a: 2, b: 1 };
        assert!(odd.matches(1) && odd.matches(3));
        assert!(!odd.matches(2));
        let first_three = Nth { a: -1, b: 3 };
        assert!(first_three.matches(1) && first_three.matches(3));
        assert!(!first_three.matches(4));
        let third = Nth { a: 0, b: 3 };
        assert!(third.matches(3) && !third.matches(6));
    }

    #[test]
    fn not_is_recursive_compound() {
        let chain = one("li:not(.active)");
        let PseudoClass::Not(inner) = &chain[0].pseudos[0] else {
            panic!("expected :not");
        };
        assert_eq!(inner.classes.as_slice(), ["active"]);
    }

    #[test]
    fn invalid_alternatives_are_dropped() {
        assert!(parse_selector("> div").is_empty());
        assert!(parse_selector("div::after").is_empty());
        assert!(parse_selector("div[unclosed").is_empty());
        assert!(parse_selector(":nth-child(nonsense)").is_empty());
        assert!(parse_selector(":hovered-maybe").is_empty());
        // One broken alternative does not poison its siblings.
        let alts = parse_selector("div, > span");
        assert_eq!(alts.len(), 1);
        assert_eq!(alts[0][0].tag.as_deref(), Some("div"));
    }
}
