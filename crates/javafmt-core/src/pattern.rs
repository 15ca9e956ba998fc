//! Naming patterns
//!
//! Conventions are expressed in a restricted regex dialect: character classes
//! (`[a-z]`, `[^0-9]`, `\w`, `\d`, `\s`, literals) followed by an optional
//! quantifier (`*`, `+`, `?`, `{m}`, `{m,n}`, `{m,}`). A pattern decomposes
//! into a sequence of components, and rewriting an identifier walks those
//! components left to right, changing letter case where that makes the next
//! character acceptable. The rewriter never inserts, deletes, or reorders
//! characters, so a name like `max_size` can become `MAX_SIZE` under
//! `[A-Z_]+` but can never become `MaxSize` under `[A-Z][a-z]+`.

use std::fmt;

use crate::error::JavafmtError;
use crate::result::Result;

/// Built-in convention names and their pattern spellings
const NAMED_CONVENTIONS: &[(&str, &str)] = &[
    ("pascalcase", "[A-Z][a-zA-Z0-9]*"),
    ("PascalCase", "[A-Z][a-zA-Z0-9]*"),
    ("camelcase", "[a-z][a-zA-Z0-9]*"),
    ("camelCase", "[a-z][a-zA-Z0-9]*"),
    ("uppercase", "[A-Z][A-Z0-9_]*"),
    ("UPPER_SNAKE_CASE", "[A-Z][A-Z0-9_]*"),
];

/// Map a convention specifier to its pattern: named conventions expand to
/// their built-in spelling, anything else is taken as a literal pattern.
pub fn resolve_convention(spec: &str) -> &str {
    NAMED_CONVENTIONS
        .iter()
        .find(|(name, _)| *name == spec)
        .map(|(_, pattern)| *pattern)
        .unwrap_or(spec)
}

/// Set of characters one pattern component accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharSet {
    /// Single characters listed explicitly
    chars: Vec<char>,
    /// Inclusive character ranges
    ranges: Vec<(char, char)>,
    /// When set, the component accepts everything NOT matched above
    negated: bool,
}

impl CharSet {
    fn empty() -> Self {
        Self {
            chars: Vec::new(),
            ranges: Vec::new(),
            negated: false,
        }
    }

    fn single(c: char) -> Self {
        let mut set = Self::empty();
        set.chars.push(c);
        set
    }

    fn positive(&self, c: char) -> bool {
        self.chars.contains(&c) || self.ranges.iter().any(|&(lo, hi)| lo <= c && c <= hi)
    }

    /// True when the set accepts the character
    pub fn accepts(&self, c: char) -> bool {
        self.positive(c) != self.negated
    }
}

/// One decomposed pattern component: a character set with repetition bounds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub set: CharSet,
    pub min_repeat: usize,
    /// `None` means unbounded
    pub max_repeat: Option<usize>,
}

/// A compiled naming pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    components: Vec<Component>,
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Pattern {
    /// Compile a pattern from the restricted dialect.
    pub fn compile(pattern: &str) -> Result<Self> {
        let components = decompose(pattern)?;
        Ok(Self {
            source: pattern.to_string(),
            components,
        })
    }

    /// Compile a convention specifier, expanding named conventions first.
    pub fn from_convention(spec: &str) -> Result<Self> {
        Self::compile(resolve_convention(spec))
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Rewrite an identifier so it matches this pattern, changing only the
    /// case of individual characters. Fails with `ImpossiblePattern` when no
    /// case change can make the input fit.
    pub fn rewrite(&self, input: &str) -> Result<String> {
        let chars: Vec<char> = input.chars().collect();
        let mut out = String::with_capacity(input.len());
        let mut pos = 0usize;

        for (ci, component) in self.components.iter().enumerate() {
            let mut taken = 0usize;
            loop {
                if component.max_repeat.is_some_and(|max| taken >= max) {
                    break;
                }
                let Some(&c) = chars.get(pos) else { break };
                // Once the minimum is met, let a later component claim the
                // character if this one would need a case change for it
                let must_take = taken < component.min_repeat;
                match fold_into(&component.set, c) {
                    Some(folded) => {
                        if !must_take
                            && folded != c
                            && remaining_accepts(&self.components[ci + 1..], c)
                        {
                            break;
                        }
                        out.push(folded);
                        pos += 1;
                        taken += 1;
                    }
                    None => break,
                }
            }
            if taken < component.min_repeat {
                return Err(JavafmtError::impossible_pattern(
                    input,
                    format!(
                        "component {} of '{}' requires {} more character(s)",
                        ci + 1,
                        self.source,
                        component.min_repeat - taken
                    ),
                ));
            }
        }

        if pos < chars.len() {
            return Err(JavafmtError::impossible_pattern(
                input,
                format!(
                    "character '{}' at position {} cannot be made to match '{}'",
                    chars[pos], pos, self.source
                ),
            ));
        }
        Ok(out)
    }

    /// True when the identifier already satisfies the pattern.
    pub fn matches(&self, input: &str) -> bool {
        self.rewrite(input).is_ok_and(|r| r == input)
    }
}

/// Accept `c` as-is, or with its case flipped, or not at all.
fn fold_into(set: &CharSet, c: char) -> Option<char> {
    if set.accepts(c) {
        return Some(c);
    }
    if c.is_lowercase() {
        let upper = c.to_uppercase().next().unwrap_or(c);
        if set.accepts(upper) {
            return Some(upper);
        }
    } else if c.is_uppercase() {
        let lower = c.to_lowercase().next().unwrap_or(c);
        if set.accepts(lower) {
            return Some(lower);
        }
    }
    None
}

/// True when some later component could accept `c` without a case change.
fn remaining_accepts(rest: &[Component], c: char) -> bool {
    for component in rest {
        if component.set.accepts(c) {
            return true;
        }
        // A component that may match zero times can be skipped over
        if component.min_repeat > 0 {
            return false;
        }
    }
    false
}

/// Decompose a pattern into its component sequence.
pub fn decompose(pattern: &str) -> Result<Vec<Component>> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut components = Vec::new();
    let mut i = 0usize;

    while i < chars.len() {
        let set = match chars[i] {
            '[' => {
                let (set, next) = parse_class(pattern, &chars, i)?;
                i = next;
                set
            }
            '\\' => {
                let Some(&esc) = chars.get(i + 1) else {
                    return Err(JavafmtError::pattern_syntax(
                        pattern,
                        "trailing backslash",
                    ));
                };
                i += 2;
                escape_class(pattern, esc)?
            }
            c @ ('*' | '+' | '?' | '{' | '}' | ']') => {
                return Err(JavafmtError::pattern_syntax(
                    pattern,
                    format!("unexpected '{c}'"),
                ));
            }
            c => {
                i += 1;
                CharSet::single(c)
            }
        };

        let (min_repeat, max_repeat, next) = parse_quantifier(pattern, &chars, i)?;
        i = next;
        components.push(Component {
            set,
            min_repeat,
            max_repeat,
        });
    }

    if components.is_empty() {
        return Err(JavafmtError::pattern_syntax(pattern, "empty pattern"));
    }
    Ok(components)
}

fn escape_class(pattern: &str, esc: char) -> Result<CharSet> {
    let mut set = CharSet::empty();
    match esc {
        'w' => {
            set.ranges = vec![('a', 'z'), ('A', 'Z'), ('0', '9')];
            set.chars = vec!['_'];
        }
        'd' => {
            set.ranges = vec![('0', '9')];
        }
        's' => {
            set.chars = vec![' ', '\t', '\n', '\r'];
        }
        c @ ('\\' | '[' | ']' | '{' | '}' | '*' | '+' | '?' | '-' | '^' | '.') => {
            set.chars = vec![c];
        }
        other => {
            return Err(JavafmtError::pattern_syntax(
                pattern,
                format!("unsupported escape '\\{other}'"),
            ));
        }
    }
    Ok(set)
}

/// Parse a `[...]` class starting at `open`. Returns the set and the index
/// just past the closing bracket.
fn parse_class(pattern: &str, chars: &[char], open: usize) -> Result<(CharSet, usize)> {
    let mut set = CharSet::empty();
    let mut i = open + 1;
    if chars.get(i) == Some(&'^') {
        set.negated = true;
        i += 1;
    }
    let mut closed = false;
    while i < chars.len() {
        match chars[i] {
            ']' => {
                closed = true;
                i += 1;
                break;
            }
            '\\' => {
                let Some(&esc) = chars.get(i + 1) else {
                    return Err(JavafmtError::pattern_syntax(pattern, "trailing backslash"));
                };
                let inner = escape_class(pattern, esc)?;
                set.chars.extend(inner.chars);
                set.ranges.extend(inner.ranges);
                i += 2;
            }
            lo => {
                // `a-z` range unless the dash is last in the class
                if chars.get(i + 1) == Some(&'-') && chars.get(i + 2).is_some_and(|&c| c != ']') {
                    let hi = chars[i + 2];
                    if hi < lo {
                        return Err(JavafmtError::pattern_syntax(
                            pattern,
                            format!("inverted range '{lo}-{hi}'"),
                        ));
                    }
                    set.ranges.push((lo, hi));
                    i += 3;
                } else {
                    set.chars.push(lo);
                    i += 1;
                }
            }
        }
    }
    if !closed {
        return Err(JavafmtError::pattern_syntax(
            pattern,
            "unterminated character class",
        ));
    }
    if set.chars.is_empty() && set.ranges.is_empty() {
        return Err(JavafmtError::pattern_syntax(pattern, "empty character class"));
    }
    Ok((set, i))
}

/// Parse an optional quantifier at `i`. Returns `(min, max, next_index)`.
fn parse_quantifier(
    pattern: &str,
    chars: &[char],
    i: usize,
) -> Result<(usize, Option<usize>, usize)> {
    match chars.get(i) {
        Some('*') => Ok((0, None, i + 1)),
        Some('+') => Ok((1, None, i + 1)),
        Some('?') => Ok((0, Some(1), i + 1)),
        Some('{') => {
            let close = chars[i..]
                .iter()
                .position(|&c| c == '}')
                .map(|off| i + off)
                .ok_or_else(|| JavafmtError::pattern_syntax(pattern, "unterminated '{'"))?;
            let body: String = chars[i + 1..close].iter().collect();
            let parse_bound = |s: &str| -> Result<usize> {
                s.trim().parse().map_err(|_| {
                    JavafmtError::pattern_syntax(pattern, format!("invalid bound '{s}'"))
                })
            };
            let (min, max) = match body.split_once(',') {
                None => {
                    let n = parse_bound(&body)?;
                    (n, Some(n))
                }
                Some((lo, "")) => (parse_bound(lo)?, None),
                Some((lo, hi)) => {
                    let min = parse_bound(lo)?;
                    let max = parse_bound(hi)?;
                    if max < min {
                        return Err(JavafmtError::pattern_syntax(
                            pattern,
                            format!("inverted bounds '{{{body}}}'"),
                        ));
                    }
                    (min, Some(max))
                }
            };
            Ok((min, max, close + 1))
        }
        _ => Ok((1, Some(1), i)),
    }
}
