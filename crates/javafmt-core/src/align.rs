//! Bracket alignment and line wrapping
//!
//! The alignment pass runs on freshly formatted text, so token line/column
//! positions are trusted to describe the current layout. It breaks argument
//! and parameter lists according to the configured policy. Line wrapping is
//! a plain text transformation that runs last.

use tracing::debug;

use crate::config::{BracketAlignment, FormatConfig};
use crate::cst::{NodeKind, Parse, SyntaxNode, Token, TokenKind};
use crate::edit::TokenEditBuffer;

/// Run the alignment pass over a parsed file and return the new text.
pub fn run(parse: &Parse, config: &FormatConfig) -> String {
    let policy = config.aligns.after_open_bracket;
    if policy == BracketAlignment::Disabled {
        return parse.tokens.iter().map(|t| t.text.as_str()).collect();
    }
    let mut pass = AlignmentPass {
        tokens: &parse.tokens,
        config,
        buf: TokenEditBuffer::new(),
    };
    for node in parse.tree.descendants() {
        match node.kind {
            NodeKind::ParamList | NodeKind::ArgList => pass.align_list(node),
            _ => {}
        }
    }
    debug!(?policy, "alignment pass complete");
    pass.buf.materialize(&parse.tokens)
}

struct AlignmentPass<'a> {
    tokens: &'a [Token],
    config: &'a FormatConfig,
    buf: TokenEditBuffer,
}

impl AlignmentPass<'_> {
    fn align_list(&mut self, list: &SyntaxNode) {
        let elements: Vec<usize> = list
            .children
            .iter()
            .filter(|c| matches!(c.kind, NodeKind::Param | NodeKind::Arg))
            .map(|c| c.span.start)
            .collect();
        // Every policy applies only to lists with at least two elements
        if elements.len() < 2 {
            return;
        }
        let open = list.span.start;
        let close = list.span.end;
        let batch = self.config.aligns.parameters_before_align;

        match self.config.aligns.after_open_bracket {
            BracketAlignment::Disabled => {}
            BracketAlignment::Align => {
                if elements.len() > batch && batch > 0 {
                    let prefix = " ".repeat(self.tokens[open].column as usize + 1);
                    for (i, &start) in elements.iter().enumerate() {
                        if i > 0 && i % batch == 0 {
                            self.break_before(start, &prefix);
                        }
                    }
                }
            }
            BracketAlignment::DontAlign => {
                if elements.len() > batch && batch > 0 {
                    let prefix = self.continuation_indent(open);
                    for (i, &start) in elements.iter().enumerate() {
                        if i > 0 && i % batch == 0 {
                            self.break_before(start, &prefix);
                        }
                    }
                }
            }
            BracketAlignment::AlwaysBreak => {
                let prefix = self.continuation_indent(open);
                self.break_before(elements[0], &prefix);
            }
            BracketAlignment::BlockIndent => {
                let prefix = self.continuation_indent(open);
                self.break_before(elements[0], &prefix);
                self.break_before(close, &self.line_indent(open));
            }
            BracketAlignment::AllParametersOnNewLine => {
                let prefix = " ".repeat(self.tokens[open].column as usize + 1);
                for &start in elements.iter().skip(1) {
                    self.break_before(start, &prefix);
                }
            }
        }
    }

    /// Put a line break carrying `prefix` before the token at `index`,
    /// replacing whatever horizontal space was there. Re-running the pass on
    /// its own output records the identical edit, keeping the pass idempotent.
    fn break_before(&mut self, index: usize, prefix: &str) {
        let text = format!("\n{prefix}");
        if index > 0 && self.tokens[index - 1].kind == TokenKind::Whitespace {
            if self.tokens[index - 1].text != text {
                self.buf.replace(index - 1, text);
            }
        } else {
            self.buf.insert_before(index, text);
        }
    }

    /// Leading whitespace of the line holding the token at `index`
    fn line_indent(&self, index: usize) -> String {
        for i in (0..index).rev() {
            let token = &self.tokens[i];
            if token.kind == TokenKind::Whitespace && token.text.contains('\n') {
                let after = token.text.rsplit('\n').next().unwrap_or("");
                return after.to_string();
            }
        }
        String::new()
    }

    /// Line indent plus one extra level
    fn continuation_indent(&self, index: usize) -> String {
        format!("{}{}", self.line_indent(index), self.config.indents.text_at(1))
    }
}

/// Wrap lines longer than `max_line_length`, preferring to split string
/// literals with a `+` continuation and otherwise breaking at the last
/// space that keeps the head within the limit. A negative limit disables
/// wrapping entirely.
pub fn wrap_lines(text: &str, config: &FormatConfig) -> String {
    if !config.wrapping_enabled() {
        return text.to_string();
    }
    let max = config.max_line_length as usize;
    let unit = config.indents.text_at(1);
    let mut out = Vec::new();
    for line in text.split('\n') {
        wrap_line(line, max, &unit, &mut out);
    }
    out.join("\n")
}

fn wrap_line(line: &str, max: usize, unit: &str, out: &mut Vec<String>) {
    let chars: Vec<char> = line.chars().collect();
    if chars.len() <= max {
        out.push(line.to_string());
        return;
    }

    let indent: String = chars.iter().take_while(|c| c.is_whitespace()).collect();
    let continuation = format!("{indent}{unit}");

    // Character positions that sit inside a string literal
    let mut in_string = vec![false; chars.len()];
    {
        let mut inside = false;
        let mut escaped = false;
        for (i, &c) in chars.iter().enumerate() {
            if inside {
                in_string[i] = true;
            }
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                if inside {
                    in_string[i] = true;
                }
                inside = !inside;
            }
        }
    }

    // Splitting inside a literal: close it, continue with `+ "` on the next line
    if max > 0 && max < chars.len() && in_string[max] {
        let hard_cut = max.saturating_sub(1).max(indent.chars().count() + 1);
        // Prefer a word boundary inside the literal; fall back to a hard cut
        let cut = (1..=hard_cut)
            .rev()
            .find(|&i| chars[i - 1] == ' ' && in_string[i - 1] && in_string.get(i) == Some(&true))
            .unwrap_or(hard_cut);
        // Only worthwhile when the head keeps some literal content
        let head_ok = cut > 0 && in_string.get(cut - 1) == Some(&true) && chars[cut - 1] != '"';
        if head_ok && !chars[cut..].is_empty() {
            let head: String = chars[..cut].iter().collect();
            let tail: String = chars[cut..].iter().collect();
            out.push(format!("{head}\""));
            let rest = format!("{continuation}+ \"{tail}");
            if rest.chars().count() < chars.len() {
                wrap_line(&rest, max, unit, out);
            } else {
                out.push(rest);
            }
            return;
        }
    }

    // Word wrap: last space outside any literal that keeps the head in bounds
    let break_at = (0..=max.min(chars.len() - 1))
        .rev()
        .find(|&i| chars[i] == ' ' && !in_string[i] && i > indent.chars().count());
    match break_at {
        Some(space) => {
            let head: String = chars[..space].iter().collect();
            let tail: String = chars[space + 1..].iter().collect();
            out.push(head.trim_end().to_string());
            let rest = format!("{continuation}{tail}");
            if rest.chars().count() < chars.len() {
                wrap_line(&rest, max, unit, out);
            } else {
                out.push(rest);
            }
        }
        None => out.push(line.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::parse_source;

    fn align_with(source: &str, policy: BracketAlignment, batch: usize) -> String {
        let mut config = FormatConfig::default();
        config.aligns.after_open_bracket = policy;
        config.aligns.parameters_before_align = batch;
        run(&parse_source(source), &config)
    }

    const CALL: &str = "class A {\n    void m() {\n        helper(one, two, three);\n    }\n}\n";

    #[test]
    fn disabled_policy_leaves_text_unchanged() {
        assert_eq!(align_with(CALL, BracketAlignment::Disabled, 2), CALL);
    }

    #[test]
    fn all_parameters_on_new_line_aligns_to_open_bracket() {
        let out = align_with(CALL, BracketAlignment::AllParametersOnNewLine, 2);
        // `(` sits at column 14, so continuations start at column 15
        assert!(
            out.contains("helper(one,\n               two,\n               three);"),
            "got:\n{out}"
        );
    }

    #[test]
    fn always_break_puts_arguments_on_the_next_line() {
        let out = align_with(CALL, BracketAlignment::AlwaysBreak, 2);
        assert!(
            out.contains("helper(\n            one, two, three);"),
            "got:\n{out}"
        );
    }

    #[test]
    fn block_indent_also_breaks_the_closing_bracket() {
        let out = align_with(CALL, BracketAlignment::BlockIndent, 2);
        assert!(
            out.contains("helper(\n            one, two, three\n        );"),
            "got:\n{out}"
        );
    }

    #[test]
    fn single_argument_calls_are_never_broken() {
        let source = "class A {\n    void m() {\n        helper(x);\n    }\n}\n";
        assert_eq!(align_with(source, BracketAlignment::AlwaysBreak, 2), source);
        assert_eq!(align_with(source, BracketAlignment::BlockIndent, 2), source);
        assert_eq!(
            align_with(source, BracketAlignment::AllParametersOnNewLine, 2),
            source
        );
    }

    #[test]
    fn single_parameter_declarations_are_never_broken() {
        let source = "class A {\n    void m(int only) {\n    }\n}\n";
        assert_eq!(align_with(source, BracketAlignment::AlwaysBreak, 2), source);
        assert_eq!(align_with(source, BracketAlignment::BlockIndent, 2), source);
    }

    #[test]
    fn align_batches_after_the_threshold() {
        let source = "class A {\n    void m() {\n        helper(a, b, c, d, e);\n    }\n}\n";
        let out = align_with(source, BracketAlignment::Align, 2);
        assert!(
            out.contains("helper(a, b,\n               c, d,\n               e);"),
            "got:\n{out}"
        );
    }

    #[test]
    fn align_respects_the_threshold() {
        // Two arguments with a threshold of two: nothing to do
        let source = "class A {\n    void m() {\n        helper(a, b);\n    }\n}\n";
        let out = align_with(source, BracketAlignment::Align, 2);
        assert_eq!(out, source);
    }

    #[test]
    fn dont_align_uses_plain_indentation() {
        let source = "class A {\n    void m() {\n        helper(a, b, c);\n    }\n}\n";
        let out = align_with(source, BracketAlignment::DontAlign, 2);
        assert!(
            out.contains("helper(a, b,\n            c);"),
            "got:\n{out}"
        );
    }

    #[test]
    fn method_parameter_lists_are_aligned_too() {
        let source = "class A {\n    void m(int a, int b, int c) {\n    }\n}\n";
        let out = align_with(source, BracketAlignment::AlwaysBreak, 2);
        assert!(out.contains("void m(\n        int a, int b, int c)"), "got:\n{out}");
    }

    #[test]
    fn alignment_is_idempotent() {
        let once = align_with(CALL, BracketAlignment::AllParametersOnNewLine, 2);
        let twice = align_with(&once, BracketAlignment::AllParametersOnNewLine, 2);
        assert_eq!(once, twice);
    }

    fn wrap_config(max: i64) -> FormatConfig {
        FormatConfig {
            max_line_length: max,
            ..FormatConfig::default()
        }
    }

    #[test]
    fn negative_limit_disables_wrapping() {
        let line = "x".repeat(300);
        assert_eq!(wrap_lines(&line, &wrap_config(-1)), line);
    }

    #[test]
    fn short_lines_pass_through() {
        let text = "class A {\n}";
        assert_eq!(wrap_lines(text, &wrap_config(100)), text);
    }

    #[test]
    fn long_lines_break_at_spaces() {
        let text = "        int total = alpha + beta + gamma + delta + epsilon;";
        let out = wrap_lines(text, &wrap_config(40));
        for line in out.split('\n') {
            assert!(line.chars().count() <= 40, "line too long: {line:?}");
        }
        assert!(out.starts_with("        int total = alpha + beta +"));
        assert!(out.contains("\n            "));
    }

    #[test]
    fn string_literals_split_with_a_concatenation() {
        let text = format!("        say(\"{}\");", "word ".repeat(12));
        let out = wrap_lines(&text, &wrap_config(40));
        let lines: Vec<&str> = out.split('\n').collect();
        assert!(lines.len() > 1, "got:\n{out}");
        assert!(lines[0].ends_with('"'), "got:\n{out}");
        assert!(lines[1].trim_start().starts_with("+ \""), "got:\n{out}");
    }

    #[test]
    fn unbreakable_lines_are_left_alone() {
        let text = "abcdefghijklmnopqrstuvwxyz0123456789abcdefghijklmnop";
        assert_eq!(wrap_lines(text, &wrap_config(20)), text);
    }
}
