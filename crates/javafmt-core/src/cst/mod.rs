//! Concrete syntax tree for the Java subset the formatter understands
//!
//! The design follows a lossless token model: the lexer emits every byte of
//! the input as a token (including whitespace and comments), and the parser
//! builds an immutable node tree on top of the token sequence. Nodes never own
//! text; they reference the tokens they cover through an inclusive index span
//! into the original sequence. All passes express their edits in terms of
//! those original token indices.

mod lexer;
mod parser;

pub use lexer::lex;
pub use parser::parse_tokens;

/// Lexical token classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Keyword,
    Number,
    Str,
    Char,
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Semi,
    Comma,
    Dot,
    Colon,
    At,
    Op,
    Whitespace,
    LineComment,
    BlockComment,
}

/// Immutable lexical unit with position data and a stable sequence index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// 1-based source line
    pub line: u32,
    /// 0-based column of the first character
    pub column: u32,
    /// Position in the original token sequence
    pub index: usize,
}

impl Token {
    /// Whitespace and comments carry no syntactic weight
    pub fn is_trivia(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Whitespace | TokenKind::LineComment | TokenKind::BlockComment
        )
    }
}

/// Inclusive range of original token indices covered by a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index <= self.end
    }
}

/// Syntactic classification of tree nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    CompilationUnit,
    PackageDecl,
    Import,
    Class,
    Modifiers,
    Name,
    TypeRef,
    ClassBody,
    Field,
    Declarator,
    Method,
    ParamList,
    Param,
    Block,
    LocalVar,
    ExprStmt,
    Return,
    If,
    While,
    DoWhile,
    For,
    Try,
    Switch,
    SwitchBody,
    SwitchGroup,
    SwitchLabel,
    ParenExpr,
    Expr,
    Call,
    ArgList,
    Arg,
    Empty,
    Error,
}

/// Immutable tree node spanning a range of the original token sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    pub children: Vec<SyntaxNode>,
    pub span: Span,
}

impl SyntaxNode {
    pub fn new(kind: NodeKind, children: Vec<SyntaxNode>, span: Span) -> Self {
        Self {
            kind,
            children,
            span,
        }
    }

    /// Leaf node covering a single token
    pub fn leaf(kind: NodeKind, index: usize) -> Self {
        Self::new(kind, Vec::new(), Span::new(index, index))
    }

    /// First direct child of the given kind
    pub fn child(&self, kind: NodeKind) -> Option<&SyntaxNode> {
        self.children.iter().find(|c| c.kind == kind)
    }

    /// All direct children of the given kind
    pub fn children_of(&self, kind: NodeKind) -> impl Iterator<Item = &SyntaxNode> {
        self.children.iter().filter(move |c| c.kind == kind)
    }

    /// Pre-order traversal of this node and all descendants
    pub fn descendants(&self) -> Vec<&SyntaxNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            for child in node.children.iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// Non-trivia token indices inside this node's span
    pub fn token_indices<'t>(&self, tokens: &'t [Token]) -> impl Iterator<Item = usize> + 't {
        let span = self.span;
        (span.start..=span.end.min(tokens.len().saturating_sub(1)))
            .filter(move |&i| !tokens[i].is_trivia())
    }

    /// Text of the single token this node covers (used for `Name` leaves)
    pub fn token_text<'t>(&self, tokens: &'t [Token]) -> Option<&'t str> {
        self.token_indices(tokens)
            .next()
            .map(|i| tokens[i].text.as_str())
    }
}

/// Join the non-trivia token texts of a span, inserting a space only where
/// two word-like tokens would otherwise run together.
pub fn render_tokens(tokens: &[Token], span: Span) -> String {
    let mut out = String::new();
    for i in span.start..=span.end.min(tokens.len().saturating_sub(1)) {
        let token = &tokens[i];
        if token.is_trivia() {
            continue;
        }
        let needs_space = out
            .chars()
            .last()
            .is_some_and(|prev| is_word_char(prev))
            && token.text.chars().next().is_some_and(is_word_char);
        if needs_space {
            out.push(' ');
        }
        out.push_str(&token.text);
    }
    out
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Result of lexing and parsing one source file
#[derive(Debug)]
pub struct Parse {
    pub tokens: Vec<Token>,
    pub tree: SyntaxNode,
}

/// Lex and parse source text into a token sequence and node tree.
///
/// The parser is tolerant: regions it cannot interpret become `Error` nodes
/// and parsing continues with the next declaration or statement.
pub fn parse_source(source: &str) -> Parse {
    let tokens = lex(source);
    let tree = parse_tokens(&tokens);
    Parse { tokens, tree }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_tokens_separates_words_but_not_punctuation() {
        let parse = parse_source("a instanceof B");
        let span = Span::new(0, parse.tokens.len() - 1);
        assert_eq!(render_tokens(&parse.tokens, span), "a instanceof B");

        let parse = parse_source("(x + 1)");
        let span = Span::new(0, parse.tokens.len() - 1);
        assert_eq!(render_tokens(&parse.tokens, span), "(x+1)");
    }

    #[test]
    fn span_contains_is_inclusive() {
        let span = Span::new(2, 5);
        assert!(span.contains(2));
        assert!(span.contains(5));
        assert!(!span.contains(6));
    }
}
