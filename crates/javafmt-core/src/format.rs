//! Formatting pass
//!
//! Rewrites declaration headers (modifier order, internal spacing), places
//! braces according to the configured style, and re-indents statements. All
//! changes are expressed as token edits; code the pass does not understand
//! (expression interiors, annotation arguments, heritage clauses) passes
//! through verbatim.

use tracing::debug;

use crate::config::{BraceStyle, FormatConfig, ImportOrder, SwitchCaseLabels};
use crate::cst::{NodeKind, Parse, Span, SyntaxNode, Token, TokenKind};
use crate::edit::TokenEditBuffer;
use crate::indent::IndentTracker;

/// Run the formatting pass over a parsed file and return the new text.
pub fn run(parse: &Parse, config: &FormatConfig) -> String {
    FormattingPass::new(parse, config).run()
}

/// Adjacent operator tokens that spell one shift or comparison operator
const COMPOUND_OPERATORS: &[&str] = &["<=", ">=", "<<", ">>", ">>>", "<<=", ">>=", ">>>="];

fn mark(exempt: &mut [bool], from: usize, to: usize) {
    for slot in exempt.iter_mut().take(to + 1).skip(from) {
        *slot = true;
    }
}

struct FormattingPass<'a> {
    tokens: &'a [Token],
    tree: &'a SyntaxNode,
    config: &'a FormatConfig,
    indent: IndentTracker,
    buf: TokenEditBuffer,
    /// Index of the first non-whitespace token, if any
    first_content: Option<usize>,
}

impl<'a> FormattingPass<'a> {
    fn new(parse: &'a Parse, config: &'a FormatConfig) -> Self {
        let first_content = parse
            .tokens
            .iter()
            .position(|t| t.kind != TokenKind::Whitespace);
        Self {
            tokens: &parse.tokens,
            tree: &parse.tree,
            config,
            indent: IndentTracker::new(config.indents.clone()),
            buf: TokenEditBuffer::new(),
            first_content,
        }
    }

    fn run(mut self) -> String {
        self.compilation_unit();
        if self.config.space_around_operator {
            self.space_operators();
        }
        debug!(edits = !self.buf.is_empty(), "formatting pass complete");
        self.buf.materialize(self.tokens)
    }

    fn level(&self) -> usize {
        self.indent.level()
    }

    fn indented<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.indent.enter();
        let out = f(self);
        self.indent.exit();
        out
    }

    // ---- placement helpers -------------------------------------------------

    /// Put the token at `index` at the start of its own line at the given
    /// indentation level. Blank lines in the preceding whitespace survive;
    /// the indentation itself is normalized.
    fn place_at(&mut self, index: usize, level: usize) {
        let ws_before = index > 0 && self.tokens[index - 1].kind == TokenKind::Whitespace;
        if self.first_content.is_none_or(|f| f >= index) {
            // Start of file: no newline, just drop any leading whitespace
            if ws_before {
                self.buf.replace(index - 1, "");
            }
            return;
        }
        let indent = self.indent.text_at(level);
        if ws_before {
            let newlines = self.tokens[index - 1].text.matches('\n').count().max(1);
            self.buf
                .replace(index - 1, format!("{}{}", "\n".repeat(newlines), indent));
        } else {
            self.buf.insert_before(index, format!("\n{indent}"));
        }
    }

    fn place_on_own_line(&mut self, index: usize) {
        self.place_at(index, self.level());
    }

    /// Keep the token at `index` on the current line, separated by one space.
    fn attach(&mut self, index: usize) {
        if index > 0 && self.tokens[index - 1].kind == TokenKind::Whitespace {
            self.buf.replace(index - 1, " ");
        } else {
            self.buf.insert_before(index, " ");
        }
    }

    /// Opening brace placement per the configured style
    fn open_brace(&mut self, index: usize) {
        match self.config.brace_style {
            BraceStyle::Attach => self.attach(index),
            BraceStyle::Break => self.place_on_own_line(index),
        }
    }

    /// Exact original text of a span, trivia included
    fn verbatim(&self, span: Span) -> String {
        self.tokens[span.start..=span.end.min(self.tokens.len() - 1)]
            .iter()
            .map(|t| t.text.as_str())
            .collect()
    }

    fn sorted_modifiers(&self, mods: &SyntaxNode, order: &[String]) -> Vec<String> {
        let mut texts: Vec<String> = mods
            .token_indices(self.tokens)
            .map(|i| self.tokens[i].text.clone())
            .collect();
        // Stable sort: modifiers missing from the order keep their relative
        // position after the configured ones
        texts.sort_by_key(|t| order.iter().position(|o| o == t).unwrap_or(order.len()));
        texts
    }

    // ---- tree walk ---------------------------------------------------------

    fn compilation_unit(&mut self) {
        self.rebuild_imports();
        let children: Vec<&SyntaxNode> = self.tree.children.iter().collect();
        for child in children {
            match child.kind {
                NodeKind::PackageDecl => self.place_at(child.span.start, 0),
                // Placement edits inside a rebuilt import region are
                // discarded by the edit buffer, so this is safe either way
                NodeKind::Import => self.place_at(child.span.start, 0),
                NodeKind::Class => self.class(child),
                _ => {}
            }
        }
    }

    fn class(&mut self, node: &SyntaxNode) {
        self.place_on_own_line(node.span.start);
        self.rebuild_class_header(node);
        if let Some(body) = node.child(NodeKind::ClassBody) {
            self.open_brace(body.span.start);
            self.indented(|p| {
                for member in &body.children {
                    p.member(member);
                }
            });
            self.place_on_own_line(body.span.end);
        }
    }

    fn rebuild_class_header(&mut self, node: &SyntaxNode) {
        let Some(name) = node.child(NodeKind::Name) else {
            return;
        };
        let keyword = (node.span.start..=node.span.end).find(|&i| {
            self.tokens[i].kind == TokenKind::Keyword
                && matches!(self.tokens[i].text.as_str(), "class" | "interface" | "enum")
        });
        let Some(keyword) = keyword else { return };

        let mods = node.child(NodeKind::Modifiers);
        let start = mods.map(|m| m.span.start).unwrap_or(keyword);
        let mut header = String::new();
        if let Some(mods) = mods {
            for text in self.sorted_modifiers(mods, &self.config.class_modifier_order) {
                header.push_str(&text);
                header.push(' ');
            }
        }
        header.push_str(&self.tokens[keyword].text);
        header.push(' ');
        header.push_str(&self.tokens[name.span.start].text);
        self.buf.replace_range(start, name.span.end, header);
    }

    fn member(&mut self, node: &SyntaxNode) {
        match node.kind {
            NodeKind::Class => self.class(node),
            NodeKind::Method => self.method(node),
            NodeKind::Field => self.place_on_own_line(node.span.start),
            NodeKind::Block => {
                // Initializer block
                self.place_on_own_line(node.span.start);
                self.block_contents(node);
            }
            _ => self.place_on_own_line(node.span.start),
        }
    }

    fn method(&mut self, node: &SyntaxNode) {
        self.place_on_own_line(node.span.start);
        self.rebuild_method_header(node);
        if let Some(body) = node.child(NodeKind::Block) {
            self.open_brace(body.span.start);
            self.block_contents(body);
        }
    }

    fn rebuild_method_header(&mut self, node: &SyntaxNode) {
        let Some(name) = node.child(NodeKind::Name) else {
            return;
        };
        let mods = node.child(NodeKind::Modifiers);
        let type_ref = node.child(NodeKind::TypeRef);
        let start = mods
            .map(|m| m.span.start)
            .or(type_ref.map(|t| t.span.start))
            .unwrap_or(name.span.start);

        let mut header = String::new();
        if let Some(mods) = mods {
            for text in self.sorted_modifiers(mods, &self.config.method_modifier_order) {
                header.push_str(&text);
                header.push(' ');
            }
        }
        if let Some(type_ref) = type_ref {
            header.push_str(&self.verbatim(type_ref.span));
            header.push(' ');
        }
        header.push_str(&self.tokens[name.span.start].text);
        self.buf.replace_range(start, name.span.end, header);
    }

    /// Statements of an already-placed block, plus its closing brace
    fn block_contents(&mut self, block: &SyntaxNode) {
        self.indented(|p| {
            for stmt in &block.children {
                p.statement(stmt, true);
            }
        });
        self.place_on_own_line(block.span.end);
    }

    /// Format one statement. `place` controls whether its first token moves
    /// to its own line (false for an `if` that trails an `else`).
    fn statement(&mut self, node: &SyntaxNode, place: bool) {
        if place {
            self.place_on_own_line(node.span.start);
        }
        match node.kind {
            NodeKind::Block => self.block_contents(node),
            NodeKind::If => self.if_statement(node),
            NodeKind::While | NodeKind::For => {
                let body = node.children.iter().find(|c| c.kind != NodeKind::ParenExpr);
                if let Some(body) = body {
                    self.nested_body(body);
                }
            }
            NodeKind::DoWhile => self.do_while(node),
            NodeKind::Try => self.try_statement(node),
            NodeKind::Switch => self.switch(node),
            _ => {}
        }
    }

    /// Body of a control-flow statement: a braced block follows the brace
    /// style, a bare statement indents one level.
    fn nested_body(&mut self, body: &SyntaxNode) {
        if body.kind == NodeKind::Block {
            self.open_brace(body.span.start);
            self.block_contents(body);
        } else {
            self.indented(|p| p.statement(body, true));
        }
    }

    fn if_statement(&mut self, node: &SyntaxNode) {
        let mut parts = node.children.iter().filter(|c| c.kind != NodeKind::ParenExpr);
        let Some(then) = parts.next() else { return };
        self.nested_body(then);

        let Some(alt) = parts.next() else { return };
        let else_kw = (then.span.end..alt.span.start)
            .find(|&i| self.tokens[i].kind == TokenKind::Keyword && self.tokens[i].text == "else");
        if let Some(else_kw) = else_kw {
            if then.kind == NodeKind::Block && self.config.brace_style == BraceStyle::Attach {
                self.attach(else_kw);
            } else {
                self.place_on_own_line(else_kw);
            }
            match alt.kind {
                NodeKind::If => {
                    // `else if` chain stays on the else's line
                    self.attach(alt.span.start);
                    self.statement(alt, false);
                }
                NodeKind::Block => {
                    self.open_brace(alt.span.start);
                    self.block_contents(alt);
                }
                _ => self.indented(|p| p.statement(alt, true)),
            }
        }
    }

    fn do_while(&mut self, node: &SyntaxNode) {
        let body = node.children.iter().find(|c| c.kind != NodeKind::ParenExpr);
        let Some(body) = body else { return };
        self.nested_body(body);
        let while_kw = (body.span.end..=node.span.end)
            .find(|&i| self.tokens[i].kind == TokenKind::Keyword && self.tokens[i].text == "while");
        if let Some(while_kw) = while_kw {
            if body.kind == NodeKind::Block && self.config.brace_style == BraceStyle::Attach {
                self.attach(while_kw);
            } else {
                self.place_on_own_line(while_kw);
            }
        }
    }

    fn try_statement(&mut self, node: &SyntaxNode) {
        for child in &node.children {
            if child.kind == NodeKind::Block {
                self.open_brace(child.span.start);
                self.block_contents(child);
            }
        }
        // `catch` and `finally` keywords live between the block children
        let keywords: Vec<usize> = (node.span.start..=node.span.end)
            .filter(|&i| {
                self.tokens[i].kind == TokenKind::Keyword
                    && matches!(self.tokens[i].text.as_str(), "catch" | "finally")
                    && !node.children.iter().any(|c| c.span.contains(i))
            })
            .collect();
        for keyword in keywords {
            match self.config.brace_style {
                BraceStyle::Attach => self.attach(keyword),
                BraceStyle::Break => self.place_on_own_line(keyword),
            }
        }
    }

    fn switch(&mut self, node: &SyntaxNode) {
        let Some(body) = node.child(NodeKind::SwitchBody) else {
            return;
        };
        self.open_brace(body.span.start);

        let label_extra = match self.config.indents.switch_case_labels {
            SwitchCaseLabels::Indent => 1,
            SwitchCaseLabels::NoIndent => 0,
        };
        let label_level = self.level() + label_extra;

        let groups: Vec<&SyntaxNode> = body.children_of(NodeKind::SwitchGroup).collect();
        for group in groups {
            for child in &group.children {
                if child.kind == NodeKind::SwitchLabel {
                    self.place_at(child.span.start, label_level);
                } else {
                    self.with_level(label_level + 1, |p| p.statement(child, true));
                }
            }
        }
        self.place_on_own_line(body.span.end);
    }

    /// Run `f` at an absolute indentation level.
    fn with_level<T>(&mut self, level: usize, f: impl FnOnce(&mut Self) -> T) -> T {
        let current = self.level();
        for _ in current..level {
            self.indent.enter();
        }
        let out = f(self);
        for _ in current..level {
            self.indent.exit();
        }
        out
    }

    // ---- operator spacing --------------------------------------------------

    /// Surround binary operators with single spaces. Unary operators,
    /// increments, and operator characters that are really type syntax are
    /// left alone, as is any operator already placed at a line break.
    fn space_operators(&mut self) {
        let exempt = self.operator_exempt();
        let mut i = 0;
        while i < self.tokens.len() {
            if self.tokens[i].kind != TokenKind::Op || exempt[i] {
                i += 1;
                continue;
            }
            // Directly adjacent operator tokens form one compound when they
            // spell a shift or comparison (`<=`, `>>`); otherwise only the
            // first token is the operator and the rest are unary
            let start = i;
            let mut run_end = i;
            while run_end + 1 < self.tokens.len()
                && self.tokens[run_end + 1].kind == TokenKind::Op
                && !exempt[run_end + 1]
            {
                run_end += 1;
            }
            let combined: String = self.tokens[start..=run_end]
                .iter()
                .map(|t| t.text.as_str())
                .collect();
            let end = if COMPOUND_OPERATORS.contains(&combined.as_str()) {
                run_end
            } else {
                start
            };
            i = end + 1;

            let text: &str = if end > start {
                &combined
            } else {
                &self.tokens[start].text
            };
            if matches!(text, "++" | "--" | "!" | "~" | "?") {
                continue;
            }
            if !self.binary_position(start) {
                continue;
            }
            self.pad_before(start);
            self.pad_after(end);
        }
    }

    /// Whether the operator token at `index` sits after an operand, i.e. is
    /// binary rather than prefix.
    fn binary_position(&self, index: usize) -> bool {
        let prev = (0..index)
            .rev()
            .map(|i| &self.tokens[i])
            .find(|t| !t.is_trivia());
        let Some(prev) = prev else { return false };
        match prev.kind {
            TokenKind::Op
            | TokenKind::LParen
            | TokenKind::LBracket
            | TokenKind::LBrace
            | TokenKind::Comma
            | TokenKind::Semi
            | TokenKind::Colon
            | TokenKind::At => false,
            TokenKind::Keyword => !matches!(prev.text.as_str(), "return" | "case"),
            _ => true,
        }
    }

    /// Normalize the gap before the token at `index` to one space. Line
    /// breaks and comments in the gap are left untouched.
    fn pad_before(&mut self, index: usize) {
        if index == 0 {
            return;
        }
        let prev = &self.tokens[index - 1];
        match prev.kind {
            TokenKind::Whitespace => {
                if !prev.text.contains('\n') && prev.text != " " {
                    self.buf.replace(index - 1, " ");
                }
            }
            TokenKind::LineComment | TokenKind::BlockComment => {}
            _ => self.buf.insert_before(index, " "),
        }
    }

    /// Normalize the gap after the token at `index` to one space.
    fn pad_after(&mut self, index: usize) {
        let Some(next) = self.tokens.get(index + 1) else {
            return;
        };
        match next.kind {
            TokenKind::Whitespace => {
                if !next.text.contains('\n') && next.text != " " {
                    self.buf.replace(index + 1, " ");
                }
            }
            TokenKind::LineComment | TokenKind::BlockComment => {}
            _ => self.buf.insert_before(index + 1, " "),
        }
    }

    /// Token ranges where `<`, `>`, `*`, and `&` are type or declaration
    /// syntax rather than operators: type references, parameter lists,
    /// imports, package names, heritage clauses, `throws` lists, and the
    /// type arguments of a constructor call.
    fn operator_exempt(&self) -> Vec<bool> {
        let mut exempt = vec![false; self.tokens.len()];
        for node in self.tree.descendants() {
            match node.kind {
                NodeKind::TypeRef
                | NodeKind::ParamList
                | NodeKind::Import
                | NodeKind::PackageDecl => {
                    mark(&mut exempt, node.span.start, node.span.end);
                }
                NodeKind::Class => {
                    if let (Some(name), Some(body)) =
                        (node.child(NodeKind::Name), node.child(NodeKind::ClassBody))
                    {
                        if name.span.end + 1 < body.span.start {
                            mark(&mut exempt, name.span.end + 1, body.span.start - 1);
                        }
                    }
                }
                NodeKind::Method => {
                    if let (Some(params), Some(body)) =
                        (node.child(NodeKind::ParamList), node.child(NodeKind::Block))
                    {
                        if params.span.end + 1 < body.span.start {
                            mark(&mut exempt, params.span.end + 1, body.span.start - 1);
                        }
                    }
                }
                _ => {}
            }
        }

        // `new HashMap<>()` and friends: the angle region after the type name
        let mut i = 0;
        while i < self.tokens.len() {
            let token = &self.tokens[i];
            if token.kind == TokenKind::Keyword && token.text == "new" {
                let mut j = i + 1;
                while self.tokens.get(j).is_some_and(|t| {
                    t.is_trivia() || matches!(t.kind, TokenKind::Ident | TokenKind::Dot)
                }) {
                    j += 1;
                }
                if self.tokens.get(j).is_some_and(|t| t.text == "<") {
                    if let Some(close) = self.type_argument_end(j) {
                        mark(&mut exempt, j, close);
                        i = close + 1;
                        continue;
                    }
                }
                i = j;
                continue;
            }
            i += 1;
        }
        exempt
    }

    /// Matching `>` of a balanced angle region at `open`, provided only
    /// tokens legal in type arguments occur inside.
    fn type_argument_end(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        for (i, token) in self.tokens.iter().enumerate().skip(open) {
            let ok = token.is_trivia()
                || matches!(
                    token.kind,
                    TokenKind::Ident
                        | TokenKind::Keyword
                        | TokenKind::Comma
                        | TokenKind::Dot
                        | TokenKind::LBracket
                        | TokenKind::RBracket
                )
                || (token.kind == TokenKind::Op
                    && matches!(token.text.as_str(), "<" | ">" | "?" | "&"));
            if !ok {
                return None;
            }
            if token.text == "<" {
                depth += 1;
            } else if token.text == ">" {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
        }
        None
    }

    // ---- imports -----------------------------------------------------------

    fn rebuild_imports(&mut self) {
        let sort = self.config.imports.order == ImportOrder::Sort;
        let merge = self.config.imports.merge;
        if !sort && !merge {
            return;
        }
        let imports: Vec<&SyntaxNode> = self
            .tree
            .children_of(NodeKind::Import)
            .collect();
        if imports.len() < 2 {
            return;
        }
        // Only a region with nothing but whitespace between the imports can
        // be rebuilt; a comment in between pins the originals in place.
        let first = imports[0].span.start;
        let last = imports[imports.len() - 1].span.end;
        let contiguous = (first..=last).all(|i| {
            imports.iter().any(|n| n.span.contains(i))
                || self.tokens[i].kind == TokenKind::Whitespace
        });
        if !contiguous {
            debug!("import region interrupted by other content, leaving as is");
            return;
        }

        let mut entries: Vec<ImportEntry> = imports
            .iter()
            .filter_map(|n| self.import_entry(n))
            .collect();
        if entries.len() != imports.len() {
            return;
        }

        if merge {
            entries = merge_imports(entries);
        }
        if sort {
            entries.sort_by(|a, b| a.is_static.cmp(&b.is_static).then(a.path.cmp(&b.path)));
        }

        let text = entries
            .iter()
            .map(ImportEntry::render)
            .collect::<Vec<_>>()
            .join("\n");
        self.buf.replace_range(first, last, text);
    }

    fn import_entry(&self, node: &SyntaxNode) -> Option<ImportEntry> {
        let mut indices = node.token_indices(self.tokens);
        let kw = indices.next()?;
        if self.tokens[kw].text != "import" {
            return None;
        }
        let mut is_static = false;
        let mut path = String::new();
        for i in indices {
            let token = &self.tokens[i];
            match token.kind {
                TokenKind::Semi => break,
                TokenKind::Keyword if token.text == "static" && path.is_empty() => {
                    is_static = true;
                }
                _ => path.push_str(&token.text),
            }
        }
        if path.is_empty() {
            return None;
        }
        Some(ImportEntry { is_static, path })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ImportEntry {
    is_static: bool,
    path: String,
}

impl ImportEntry {
    fn render(&self) -> String {
        if self.is_static {
            format!("import static {};", self.path)
        } else {
            format!("import {};", self.path)
        }
    }

    /// Package prefix, i.e. everything before the last segment
    fn package(&self) -> Option<&str> {
        self.path.rsplit_once('.').map(|(pkg, _)| pkg)
    }

    fn is_wildcard(&self) -> bool {
        self.path.ends_with(".*")
    }
}

/// Collapse duplicate imports and merge several imports from one package
/// into a wildcard. First-occurrence order is preserved.
fn merge_imports(entries: Vec<ImportEntry>) -> Vec<ImportEntry> {
    let mut out: Vec<ImportEntry> = Vec::new();
    for entry in entries {
        if out.contains(&entry) {
            continue;
        }
        let covered = entry.package().is_some_and(|pkg| {
            out.iter().any(|e| {
                e.is_static == entry.is_static && e.is_wildcard() && e.package() == Some(pkg)
            })
        });
        if covered {
            continue;
        }
        let same_package = out.iter().position(|e| {
            e.is_static == entry.is_static
                && !e.is_wildcard()
                && e.package().is_some()
                && e.package() == entry.package()
        });
        if let Some(i) = same_package {
            let pkg = out[i].package().unwrap_or_default().to_string();
            out[i].path = format!("{pkg}.*");
            continue;
        }
        out.push(entry);
    }
    out
}
