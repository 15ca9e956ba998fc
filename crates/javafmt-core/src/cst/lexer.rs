//! Trivia-preserving Java lexer
//!
//! Unlike a compiler front end, the formatter needs every byte of the input:
//! whitespace and comments become ordinary tokens so that the token-edit
//! buffer can reproduce the file exactly where no edit applies. Concatenating
//! the `text` of every token yields the original source.

use super::{Token, TokenKind};

const KEYWORDS: &[&str] = &[
    "abstract",
    "assert",
    "boolean",
    "break",
    "byte",
    "case",
    "catch",
    "char",
    "class",
    "const",
    "continue",
    "default",
    "do",
    "double",
    "else",
    "enum",
    "extends",
    "false",
    "final",
    "finally",
    "float",
    "for",
    "goto",
    "if",
    "implements",
    "import",
    "instanceof",
    "int",
    "interface",
    "long",
    "native",
    "new",
    "null",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "short",
    "static",
    "strictfp",
    "super",
    "switch",
    "synchronized",
    "this",
    "throw",
    "throws",
    "transient",
    "true",
    "try",
    "void",
    "volatile",
    "while",
];

/// Two- and three-character operators lexed as one token.
///
/// Sequences starting with `<` or `>` are deliberately left out so that
/// generic type arguments can be parsed by counting single angle brackets,
/// the same trick real Java parsers use.
const MULTI_OPS: &[&str] = &[
    "==", "!=", "&&", "||", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "->", "::",
];

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Lex source text into a token sequence that preserves all trivia.
pub fn lex(source: &str) -> Vec<Token> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0usize;
    let mut line: u32 = 1;
    let mut column: u32 = 0;

    let mut push = |tokens: &mut Vec<Token>, kind, text: String, line, column| {
        let index = tokens.len();
        tokens.push(Token {
            kind,
            text,
            line,
            column,
            index,
        });
    };

    while i < chars.len() {
        let c = chars[i];
        let start_line = line;
        let start_column = column;

        // Whitespace runs, newlines included, collapse into one token
        if c.is_whitespace() {
            let mut text = String::new();
            while i < chars.len() && chars[i].is_whitespace() {
                if chars[i] == '\n' {
                    line += 1;
                    column = 0;
                } else {
                    column += 1;
                }
                text.push(chars[i]);
                i += 1;
            }
            push(
                &mut tokens,
                TokenKind::Whitespace,
                text,
                start_line,
                start_column,
            );
            continue;
        }

        // Comments
        if c == '/' && i + 1 < chars.len() && chars[i + 1] == '/' {
            let mut text = String::new();
            while i < chars.len() && chars[i] != '\n' {
                text.push(chars[i]);
                i += 1;
                column += 1;
            }
            push(
                &mut tokens,
                TokenKind::LineComment,
                text,
                start_line,
                start_column,
            );
            continue;
        }
        if c == '/' && i + 1 < chars.len() && chars[i + 1] == '*' {
            let mut text = String::from("/*");
            i += 2;
            column += 2;
            while i < chars.len() {
                let ch = chars[i];
                text.push(ch);
                if ch == '\n' {
                    line += 1;
                    column = 0;
                } else {
                    column += 1;
                }
                i += 1;
                if ch == '/' && text.len() >= 4 && text.ends_with("*/") {
                    break;
                }
            }
            push(
                &mut tokens,
                TokenKind::BlockComment,
                text,
                start_line,
                start_column,
            );
            continue;
        }

        // String and char literals; an unterminated literal ends at the line
        if c == '"' || c == '\'' {
            let quote = c;
            let mut text = String::new();
            text.push(chars[i]);
            i += 1;
            column += 1;
            let mut escaped = false;
            while i < chars.len() {
                let ch = chars[i];
                if ch == '\n' {
                    break;
                }
                text.push(ch);
                i += 1;
                column += 1;
                if escaped {
                    escaped = false;
                } else if ch == '\\' {
                    escaped = true;
                } else if ch == quote {
                    break;
                }
            }
            let kind = if quote == '"' {
                TokenKind::Str
            } else {
                TokenKind::Char
            };
            push(&mut tokens, kind, text, start_line, start_column);
            continue;
        }

        // Numbers (integer and floating forms, loosely)
        if c.is_ascii_digit() {
            let mut text = String::new();
            while i < chars.len()
                && (chars[i].is_ascii_alphanumeric() || chars[i] == '.' || chars[i] == '_')
            {
                // Stop a trailing dot that belongs to a member access, e.g. `1.toString()`
                if chars[i] == '.' && i + 1 < chars.len() && !chars[i + 1].is_ascii_digit() {
                    break;
                }
                text.push(chars[i]);
                i += 1;
                column += 1;
            }
            push(
                &mut tokens,
                TokenKind::Number,
                text,
                start_line,
                start_column,
            );
            continue;
        }

        // Identifiers and keywords
        if is_ident_start(c) {
            let mut text = String::new();
            while i < chars.len() && is_ident_continue(chars[i]) {
                text.push(chars[i]);
                i += 1;
                column += 1;
            }
            let kind = if KEYWORDS.contains(&text.as_str()) {
                TokenKind::Keyword
            } else {
                TokenKind::Ident
            };
            push(&mut tokens, kind, text, start_line, start_column);
            continue;
        }

        // Punctuation
        let kind = match c {
            '{' => Some(TokenKind::LBrace),
            '}' => Some(TokenKind::RBrace),
            '(' => Some(TokenKind::LParen),
            ')' => Some(TokenKind::RParen),
            '[' => Some(TokenKind::LBracket),
            ']' => Some(TokenKind::RBracket),
            ';' => Some(TokenKind::Semi),
            ',' => Some(TokenKind::Comma),
            '.' => Some(TokenKind::Dot),
            ':' => Some(TokenKind::Colon),
            '@' => Some(TokenKind::At),
            _ => None,
        };
        if let Some(kind) = kind {
            i += 1;
            column += 1;
            push(&mut tokens, kind, c.to_string(), start_line, start_column);
            continue;
        }

        // Operators with maximal munch over the fixed table
        let mut matched = None;
        for op in MULTI_OPS {
            let len = op.chars().count();
            if i + len <= chars.len() && chars[i..i + len].iter().collect::<String>() == **op {
                matched = Some(op.to_string());
                break;
            }
        }
        let text = matched.unwrap_or_else(|| c.to_string());
        let advance = text.chars().count();
        i += advance;
        column += advance as u32;
        push(&mut tokens, TokenKind::Op, text, start_line, start_column);
    }

    tokens
}
