//! Tolerant recursive-descent parser for the Java subset the passes consume
//!
//! The tree this parser produces is intentionally shallow: expressions are
//! scanned rather than fully parsed, keeping only the structure the passes
//! need (call argument lists, nested blocks, declarator names). Anything the
//! parser cannot interpret is wrapped in an `Error` node and skipped, so one
//! malformed declaration never aborts the rest of the file.

use super::{NodeKind, Span, SyntaxNode, Token, TokenKind};

const MODIFIERS: &[&str] = &[
    "public",
    "protected",
    "private",
    "static",
    "final",
    "abstract",
    "synchronized",
    "native",
    "transient",
    "volatile",
    "strictfp",
    "default",
];

const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "char", "short", "int", "long", "float", "double", "void",
];

/// Parse a lexed token sequence into a compilation unit tree.
pub fn parse_tokens(tokens: &[Token]) -> SyntaxNode {
    Parser::new(tokens).parse_compilation_unit()
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    /// Index of the last token consumed through `bump`
    last: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            last: 0,
        }
    }

    fn skip_trivia(&mut self) {
        while self
            .tokens
            .get(self.pos)
            .is_some_and(|t| t.is_trivia())
        {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<&'a Token> {
        self.skip_trivia();
        self.tokens.get(self.pos)
    }

    /// Second non-trivia token ahead of the cursor
    fn peek2(&mut self) -> Option<&'a Token> {
        self.skip_trivia();
        let mut i = self.pos + 1;
        while self.tokens.get(i).is_some_and(|t| t.is_trivia()) {
            i += 1;
        }
        self.tokens.get(i)
    }

    fn at(&mut self, kind: TokenKind) -> bool {
        self.peek().is_some_and(|t| t.kind == kind)
    }

    fn at_text(&mut self, text: &str) -> bool {
        self.peek().is_some_and(|t| t.text == text)
    }

    fn at_eof(&mut self) -> bool {
        self.peek().is_none()
    }

    fn bump(&mut self) -> usize {
        self.skip_trivia();
        let index = self.pos.min(self.tokens.len().saturating_sub(1));
        self.pos += 1;
        self.last = index;
        index
    }

    fn eat(&mut self, kind: TokenKind) -> Option<usize> {
        if self.at(kind) { Some(self.bump()) } else { None }
    }

    fn save(&self) -> usize {
        self.pos
    }

    fn restore(&mut self, pos: usize) {
        self.pos = pos;
    }

    fn parse_compilation_unit(&mut self) -> SyntaxNode {
        let mut children = Vec::new();
        while let Some(token) = self.peek() {
            let node = match token.text.as_str() {
                "package" => self.parse_to_semi(NodeKind::PackageDecl),
                "import" => self.parse_to_semi(NodeKind::Import),
                _ => match self.parse_type_declaration() {
                    Some(node) => node,
                    None => SyntaxNode::leaf(NodeKind::Error, self.bump()),
                },
            };
            children.push(node);
        }
        let span = if self.tokens.is_empty() {
            Span::new(0, 0)
        } else {
            Span::new(0, self.tokens.len() - 1)
        };
        SyntaxNode::new(NodeKind::CompilationUnit, children, span)
    }

    /// `package a.b.c;` or `import a.b.*;` — everything through the semicolon
    fn parse_to_semi(&mut self, kind: NodeKind) -> SyntaxNode {
        let start = self.bump();
        let mut end = start;
        while let Some(token) = self.peek() {
            let is_semi = token.kind == TokenKind::Semi;
            end = self.bump();
            if is_semi {
                break;
            }
        }
        SyntaxNode::new(kind, Vec::new(), Span::new(start, end))
    }

    fn skip_annotations(&mut self) {
        while self.at(TokenKind::At) {
            self.bump();
            if self.at(TokenKind::Ident) || self.at(TokenKind::Keyword) {
                self.bump();
            }
            while self.at(TokenKind::Dot) {
                self.bump();
                if self.at(TokenKind::Ident) {
                    self.bump();
                }
            }
            if self.at(TokenKind::LParen) {
                self.skip_balanced(TokenKind::LParen, TokenKind::RParen);
            }
        }
    }

    fn skip_balanced(&mut self, open: TokenKind, close: TokenKind) {
        if !self.at(open) {
            return;
        }
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            if token.kind == open {
                depth += 1;
            } else if token.kind == close {
                depth -= 1;
                self.bump();
                if depth == 0 {
                    return;
                }
                continue;
            }
            self.bump();
        }
    }

    fn parse_modifiers(&mut self) -> Option<SyntaxNode> {
        let mut start = None;
        let mut end = 0;
        while self
            .peek()
            .is_some_and(|t| t.kind == TokenKind::Keyword && MODIFIERS.contains(&t.text.as_str()))
        {
            let index = self.bump();
            start.get_or_insert(index);
            end = index;
        }
        start.map(|s| SyntaxNode::new(NodeKind::Modifiers, Vec::new(), Span::new(s, end)))
    }

    fn parse_type_declaration(&mut self) -> Option<SyntaxNode> {
        let checkpoint = self.save();
        self.skip_annotations();
        let modifiers = self.parse_modifiers();
        if self.at_text("class") || self.at_text("interface") || self.at_text("enum") {
            Some(self.parse_class(checkpoint, modifiers))
        } else {
            self.restore(checkpoint);
            None
        }
    }

    /// Class/interface/enum declaration; the `class` keyword is the next token.
    fn parse_class(&mut self, checkpoint: usize, modifiers: Option<SyntaxNode>) -> SyntaxNode {
        let start = modifiers
            .as_ref()
            .map(|m| m.span.start)
            .unwrap_or_else(|| {
                // First significant token at or after the checkpoint
                let mut i = checkpoint;
                while self.tokens.get(i).is_some_and(|t| t.is_trivia()) {
                    i += 1;
                }
                i
            });
        self.bump(); // class keyword
        let mut children: Vec<SyntaxNode> = modifiers.into_iter().collect();

        if self.at(TokenKind::Ident) {
            children.push(SyntaxNode::leaf(NodeKind::Name, self.bump()));
        }

        // Type parameters and extends/implements clauses stay as raw tokens
        while let Some(token) = self.peek() {
            if token.kind == TokenKind::LBrace || token.kind == TokenKind::Semi {
                break;
            }
            self.bump();
        }

        let mut end = self.last;
        if self.at(TokenKind::LBrace) {
            let body = self.parse_class_body();
            end = body.span.end;
            children.push(body);
        } else {
            self.eat(TokenKind::Semi);
            end = end.max(self.last);
        }
        SyntaxNode::new(NodeKind::Class, children, Span::new(start, end))
    }

    fn parse_class_body(&mut self) -> SyntaxNode {
        let open = self.bump(); // {
        let mut members = Vec::new();
        let mut close = open;
        loop {
            match self.peek() {
                None => break,
                Some(t) if t.kind == TokenKind::RBrace => {
                    close = self.bump();
                    break;
                }
                _ => {
                    let before = self.save();
                    let member = self.parse_member();
                    if self.save() == before {
                        // No progress: consume one token as an error leaf
                        members.push(SyntaxNode::leaf(NodeKind::Error, self.bump()));
                    } else {
                        members.push(member);
                    }
                }
            }
        }
        SyntaxNode::new(NodeKind::ClassBody, members, Span::new(open, close))
    }

    fn parse_member(&mut self) -> SyntaxNode {
        let checkpoint = self.save();
        self.skip_annotations();
        let modifiers = self.parse_modifiers();

        if self.at_text("class") || self.at_text("interface") || self.at_text("enum") {
            return self.parse_class(checkpoint, modifiers);
        }
        if self.at(TokenKind::Semi) {
            return SyntaxNode::leaf(NodeKind::Empty, self.bump());
        }
        if self.at(TokenKind::LBrace) {
            // Static or instance initializer block
            return self.parse_block();
        }

        let start = modifiers
            .as_ref()
            .map(|m| m.span.start)
            .unwrap_or(self.pos);
        let mut children: Vec<SyntaxNode> = modifiers.into_iter().collect();

        // Constructor: identifier directly followed by a parameter list
        let is_ctor = self.at(TokenKind::Ident)
            && self.peek2().is_some_and(|t| t.kind == TokenKind::LParen);

        let type_node = if is_ctor { None } else { self.parse_type() };
        if !is_ctor && type_node.is_none() {
            return self.recover_statementish(start);
        }
        let start = children
            .first()
            .map(|m| m.span.start)
            .or(type_node.as_ref().map(|t| t.span.start))
            .unwrap_or(start);
        if let Some(ty) = type_node {
            children.push(ty);
        }

        if !self.at(TokenKind::Ident) {
            return self.recover_statementish(start);
        }
        let name_index = self.bump();
        children.push(SyntaxNode::leaf(NodeKind::Name, name_index));

        if self.at(TokenKind::LParen) {
            // Method or constructor
            children.push(self.parse_param_list());
            // throws clause stays as raw tokens
            while let Some(token) = self.peek() {
                if matches!(
                    token.kind,
                    TokenKind::LBrace | TokenKind::Semi | TokenKind::RBrace
                ) {
                    break;
                }
                self.bump();
            }
            if self.at(TokenKind::LBrace) {
                children.push(self.parse_block());
            } else {
                self.eat(TokenKind::Semi);
            }
            let end = self.last;
            return SyntaxNode::new(NodeKind::Method, children, Span::new(start, end));
        }

        // Field declaration: one or more declarators
        let first = self.parse_declarator_tail(name_index);
        children.push(first);
        while self.eat(TokenKind::Comma).is_some() {
            if self.at(TokenKind::Ident) {
                let name = self.bump();
                children.push(self.parse_declarator_tail(name));
            } else {
                break;
            }
        }
        self.eat(TokenKind::Semi);
        let end = self.last;
        SyntaxNode::new(NodeKind::Field, children, Span::new(start, end))
    }

    /// Declarator whose name token was already consumed: `name [] = init`
    fn parse_declarator_tail(&mut self, name_index: usize) -> SyntaxNode {
        let mut children = vec![SyntaxNode::leaf(NodeKind::Name, name_index)];
        let mut end = name_index;
        while self.at(TokenKind::LBracket) {
            self.bump();
            if self.eat(TokenKind::RBracket).is_none() {
                break;
            }
            end = self.last;
        }
        if self.at_text("=") {
            self.bump();
            let init = self.scan_expr(true);
            end = init.span.end.max(self.last);
            children.push(init);
        }
        SyntaxNode::new(NodeKind::Declarator, children, Span::new(name_index, end))
    }

    /// Best-effort type reference: qualified name or primitive, generics,
    /// array suffixes. Returns `None` without consuming when the cursor is
    /// not at a plausible type.
    fn parse_type(&mut self) -> Option<SyntaxNode> {
        let checkpoint = self.save();
        let first = self.peek()?;
        let plausible = first.kind == TokenKind::Ident
            || (first.kind == TokenKind::Keyword && PRIMITIVES.contains(&first.text.as_str()));
        if !plausible {
            return None;
        }
        let start = self.bump();
        let mut end = start;

        while self.at(TokenKind::Dot) && self.peek2().is_some_and(|t| t.kind == TokenKind::Ident) {
            self.bump();
            end = self.bump();
        }

        if self.at_text("<") {
            if !self.skip_type_arguments() {
                self.restore(checkpoint);
                return None;
            }
            end = self.last;
        }

        while self.at(TokenKind::LBracket)
            && self.peek2().is_some_and(|t| t.kind == TokenKind::RBracket)
        {
            self.bump();
            end = self.bump();
        }

        Some(SyntaxNode::new(
            NodeKind::TypeRef,
            Vec::new(),
            Span::new(start, end),
        ))
    }

    /// Skip a balanced `<...>` region containing only tokens that can occur in
    /// type arguments. Anything else (e.g. `&&` in a comparison) rejects the
    /// region so the caller can fall back to expression parsing.
    fn skip_type_arguments(&mut self) -> bool {
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            let ok = match token.kind {
                TokenKind::Ident | TokenKind::Keyword | TokenKind::Comma | TokenKind::Dot => true,
                TokenKind::LBracket | TokenKind::RBracket => true,
                TokenKind::Op => matches!(token.text.as_str(), "<" | ">" | "?" | "&"),
                _ => false,
            };
            if !ok {
                return false;
            }
            if token.text == "<" {
                depth += 1;
            } else if token.text == ">" {
                depth -= 1;
                self.bump();
                if depth == 0 {
                    return true;
                }
                continue;
            }
            self.bump();
        }
        false
    }

    fn parse_param_list(&mut self) -> SyntaxNode {
        let open = self.bump(); // (
        let mut params = Vec::new();
        let mut close = open;
        loop {
            match self.peek() {
                None => break,
                Some(t) if t.kind == TokenKind::RParen => {
                    close = self.bump();
                    break;
                }
                _ => {
                    if let Some(param) = self.parse_param() {
                        params.push(param);
                    }
                    if self.eat(TokenKind::Comma).is_none() && !self.at(TokenKind::RParen) {
                        // Malformed parameter region; consume one token to advance
                        if self.at_eof() {
                            break;
                        }
                        self.bump();
                    }
                }
            }
        }
        SyntaxNode::new(NodeKind::ParamList, params, Span::new(open, close))
    }

    /// One formal parameter. Tracks angle-bracket depth so generic types with
    /// commas do not split the parameter.
    fn parse_param(&mut self) -> Option<SyntaxNode> {
        let mut start = None;
        let mut end = 0;
        let mut name = None;
        let mut angle = 0usize;
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::RParen => break,
                TokenKind::Comma if angle == 0 => break,
                _ => {}
            }
            if token.text == "<" {
                angle += 1;
            } else if token.text == ">" {
                angle = angle.saturating_sub(1);
            }
            let is_ident = token.kind == TokenKind::Ident;
            let index = self.bump();
            if is_ident {
                name = Some(index);
            }
            start.get_or_insert(index);
            end = index;
        }
        let start = start?;
        let children = name
            .map(|n| vec![SyntaxNode::leaf(NodeKind::Name, n)])
            .unwrap_or_default();
        Some(SyntaxNode::new(
            NodeKind::Param,
            children,
            Span::new(start, end),
        ))
    }

    fn parse_block(&mut self) -> SyntaxNode {
        let open = self.bump(); // {
        let mut statements = Vec::new();
        let mut close = open;
        loop {
            match self.peek() {
                None => break,
                Some(t) if t.kind == TokenKind::RBrace => {
                    close = self.bump();
                    break;
                }
                _ => {
                    let before = self.save();
                    match self.parse_statement() {
                        Some(stmt) if self.save() > before => statements.push(stmt),
                        _ => statements.push(SyntaxNode::leaf(NodeKind::Error, self.bump())),
                    }
                }
            }
        }
        SyntaxNode::new(NodeKind::Block, statements, Span::new(open, close))
    }

    fn parse_statement(&mut self) -> Option<SyntaxNode> {
        let token = self.peek()?;
        match token.kind {
            TokenKind::LBrace => return Some(self.parse_block()),
            TokenKind::Semi => return Some(SyntaxNode::leaf(NodeKind::Empty, self.bump())),
            _ => {}
        }
        match token.text.as_str() {
            "if" => {
                let start = self.bump();
                let mut children = Vec::new();
                if let Some(cond) = self.parse_paren_expr() {
                    children.push(cond);
                }
                if let Some(then) = self.parse_statement() {
                    children.push(then);
                }
                if self.at_text("else") {
                    self.bump();
                    if let Some(alt) = self.parse_statement() {
                        children.push(alt);
                    }
                }
                let end = children.last().map(|c| c.span.end).unwrap_or(self.last);
                Some(SyntaxNode::new(NodeKind::If, children, Span::new(start, end)))
            }
            "while" => {
                let start = self.bump();
                let mut children = Vec::new();
                if let Some(cond) = self.parse_paren_expr() {
                    children.push(cond);
                }
                if self.at(TokenKind::Semi) {
                    self.bump();
                } else if let Some(body) = self.parse_statement() {
                    children.push(body);
                }
                let end = self.last;
                Some(SyntaxNode::new(
                    NodeKind::While,
                    children,
                    Span::new(start, end),
                ))
            }
            "do" => {
                let start = self.bump();
                let mut children = Vec::new();
                if let Some(body) = self.parse_statement() {
                    children.push(body);
                }
                if self.at_text("while") {
                    self.bump();
                    if let Some(cond) = self.parse_paren_expr() {
                        children.push(cond);
                    }
                }
                self.eat(TokenKind::Semi);
                let end = self.last;
                Some(SyntaxNode::new(
                    NodeKind::DoWhile,
                    children,
                    Span::new(start, end),
                ))
            }
            "for" => {
                let start = self.bump();
                let mut children = Vec::new();
                if let Some(header) = self.parse_paren_expr() {
                    children.push(header);
                }
                if let Some(body) = self.parse_statement() {
                    children.push(body);
                }
                let end = self.last;
                Some(SyntaxNode::new(NodeKind::For, children, Span::new(start, end)))
            }
            "switch" => Some(self.parse_switch()),
            "try" => {
                let start = self.bump();
                let mut children = Vec::new();
                if self.at(TokenKind::LParen) {
                    // try-with-resources header
                    if let Some(resources) = self.parse_paren_expr() {
                        children.push(resources);
                    }
                }
                if self.at(TokenKind::LBrace) {
                    children.push(self.parse_block());
                }
                while self.at_text("catch") {
                    self.bump();
                    if let Some(clause) = self.parse_paren_expr() {
                        children.push(clause);
                    }
                    if self.at(TokenKind::LBrace) {
                        children.push(self.parse_block());
                    }
                }
                if self.at_text("finally") {
                    self.bump();
                    if self.at(TokenKind::LBrace) {
                        children.push(self.parse_block());
                    }
                }
                let end = self.last;
                Some(SyntaxNode::new(NodeKind::Try, children, Span::new(start, end)))
            }
            "return" | "throw" => {
                let start = self.bump();
                let mut children = Vec::new();
                if !self.at(TokenKind::Semi) && !self.at(TokenKind::RBrace) && !self.at_eof() {
                    children.push(self.scan_expr(false));
                }
                self.eat(TokenKind::Semi);
                let end = self.last;
                Some(SyntaxNode::new(
                    NodeKind::Return,
                    children,
                    Span::new(start, end),
                ))
            }
            "break" | "continue" => {
                let start = self.bump();
                self.eat(TokenKind::Ident);
                self.eat(TokenKind::Semi);
                let end = self.last;
                Some(SyntaxNode::new(
                    NodeKind::ExprStmt,
                    Vec::new(),
                    Span::new(start, end),
                ))
            }
            _ => self
                .try_parse_local_var()
                .or_else(|| self.parse_expr_statement()),
        }
    }

    /// Speculative local-variable declaration: `final? Type name (= init)? (, name)* ;`
    fn try_parse_local_var(&mut self) -> Option<SyntaxNode> {
        let checkpoint = self.save();
        let modifiers = self.parse_modifiers();
        let ty = match self.parse_type() {
            Some(ty) => ty,
            None => {
                self.restore(checkpoint);
                return None;
            }
        };
        if !self.at(TokenKind::Ident) {
            self.restore(checkpoint);
            return None;
        }
        let followup = self.peek2();
        let declares = followup.is_some_and(|t| {
            matches!(t.kind, TokenKind::Semi | TokenKind::Comma | TokenKind::LBracket)
                || t.text == "="
        });
        if !declares {
            self.restore(checkpoint);
            return None;
        }

        let start = modifiers
            .as_ref()
            .map(|m| m.span.start)
            .unwrap_or(ty.span.start);
        let mut children: Vec<SyntaxNode> = modifiers.into_iter().collect();
        children.push(ty);
        let name = self.bump();
        children.push(self.parse_declarator_tail(name));
        while self.eat(TokenKind::Comma).is_some() {
            if self.at(TokenKind::Ident) {
                let name = self.bump();
                children.push(self.parse_declarator_tail(name));
            } else {
                break;
            }
        }
        self.eat(TokenKind::Semi);
        let end = self.last;
        Some(SyntaxNode::new(
            NodeKind::LocalVar,
            children,
            Span::new(start, end),
        ))
    }

    fn parse_expr_statement(&mut self) -> Option<SyntaxNode> {
        let start = self.peek()?.index;
        let expr = self.scan_expr(false);
        if expr.span.end < expr.span.start {
            return None;
        }
        self.eat(TokenKind::Semi);
        let end = self.last.max(expr.span.end);
        Some(SyntaxNode::new(
            NodeKind::ExprStmt,
            vec![expr],
            Span::new(start, end),
        ))
    }

    fn parse_switch(&mut self) -> SyntaxNode {
        let start = self.bump(); // switch keyword
        let mut children = Vec::new();
        if let Some(scrutinee) = self.parse_paren_expr() {
            children.push(scrutinee);
        }
        if self.at(TokenKind::LBrace) {
            children.push(self.parse_switch_body());
        }
        let end = self.last;
        SyntaxNode::new(NodeKind::Switch, children, Span::new(start, end))
    }

    fn parse_switch_body(&mut self) -> SyntaxNode {
        let open = self.bump(); // {
        let mut groups = Vec::new();
        let mut close = open;
        loop {
            match self.peek() {
                None => break,
                Some(t) if t.kind == TokenKind::RBrace => {
                    close = self.bump();
                    break;
                }
                Some(t) if t.text == "case" || t.text == "default" => {
                    groups.push(self.parse_switch_group());
                }
                _ => groups.push(SyntaxNode::leaf(NodeKind::Error, self.bump())),
            }
        }
        SyntaxNode::new(NodeKind::SwitchBody, groups, Span::new(open, close))
    }

    fn parse_switch_group(&mut self) -> SyntaxNode {
        let mut children = Vec::new();
        let mut start = None;
        while self.at_text("case") || self.at_text("default") {
            let label_start = self.bump();
            start.get_or_insert(label_start);
            let mut label_end = label_start;
            while let Some(token) = self.peek() {
                match token.kind {
                    TokenKind::Colon => {
                        label_end = self.bump();
                        break;
                    }
                    TokenKind::Semi | TokenKind::LBrace | TokenKind::RBrace => break,
                    _ => {
                        label_end = self.bump();
                    }
                }
            }
            children.push(SyntaxNode::new(
                NodeKind::SwitchLabel,
                Vec::new(),
                Span::new(label_start, label_end),
            ));
        }
        loop {
            match self.peek() {
                None => break,
                Some(t)
                    if t.kind == TokenKind::RBrace || t.text == "case" || t.text == "default" =>
                {
                    break;
                }
                _ => {
                    let before = self.save();
                    match self.parse_statement() {
                        Some(stmt) if self.save() > before => children.push(stmt),
                        _ => children.push(SyntaxNode::leaf(NodeKind::Error, self.bump())),
                    }
                }
            }
        }
        let start = start.unwrap_or(self.last);
        let end = children.last().map(|c| c.span.end).unwrap_or(start);
        SyntaxNode::new(NodeKind::SwitchGroup, children, Span::new(start, end))
    }

    /// Balanced parenthesized region; nested calls inside it become children.
    fn parse_paren_expr(&mut self) -> Option<SyntaxNode> {
        let open = self.eat(TokenKind::LParen)?;
        let children = self.scan_region(false, false);
        let close = self.eat(TokenKind::RParen).unwrap_or(self.last);
        Some(SyntaxNode::new(
            NodeKind::ParenExpr,
            children,
            Span::new(open, close),
        ))
    }

    /// Shallow expression scan producing an `Expr` node whose children are
    /// the call expressions found at any nesting depth.
    fn scan_expr(&mut self, stop_at_comma: bool) -> SyntaxNode {
        let start = self
            .peek()
            .map(|t| t.index)
            .unwrap_or(self.last);
        let children = self.scan_region(true, stop_at_comma);
        let end = self.last.max(start);
        let span = if self.last < start {
            // Nothing consumed
            Span::new(start, start)
        } else {
            Span::new(start, end)
        };
        SyntaxNode::new(NodeKind::Expr, children, span)
    }

    /// Consume tokens until an unbalanced closer, a statement boundary
    /// (`;` when `stop_semi`), or a top-level comma (`stop_comma`). Returns
    /// the call nodes discovered along the way.
    fn scan_region(&mut self, stop_semi: bool, stop_comma: bool) -> Vec<SyntaxNode> {
        let mut children = Vec::new();
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::RParen | TokenKind::RBrace | TokenKind::RBracket => break,
                TokenKind::Semi if stop_semi => break,
                TokenKind::Comma if stop_comma => break,
                TokenKind::Semi => {
                    self.bump();
                }
                TokenKind::Ident if self.peek2().is_some_and(|t| t.kind == TokenKind::LParen) => {
                    children.push(self.parse_call());
                }
                TokenKind::LParen => {
                    self.bump();
                    children.extend(self.scan_region(false, false));
                    self.eat(TokenKind::RParen);
                }
                TokenKind::LBracket => {
                    self.bump();
                    children.extend(self.scan_region(false, false));
                    self.eat(TokenKind::RBracket);
                }
                TokenKind::LBrace => {
                    // Array initializer or lambda body
                    self.bump();
                    children.extend(self.scan_region(false, false));
                    self.eat(TokenKind::RBrace);
                }
                _ => {
                    self.bump();
                }
            }
        }
        children
    }

    /// `name(args...)` — the cursor is at the name identifier.
    fn parse_call(&mut self) -> SyntaxNode {
        let name_index = self.bump();
        let mut children = vec![SyntaxNode::leaf(NodeKind::Name, name_index)];
        let open = self.bump(); // (
        let mut args = Vec::new();
        let mut close = open;
        loop {
            match self.peek() {
                None => break,
                Some(t) if t.kind == TokenKind::RParen => {
                    close = self.bump();
                    break;
                }
                _ => {
                    let first = self.peek().map(|t| t.index).unwrap_or(self.last);
                    let kids = self.scan_region(true, true);
                    if self.last >= first {
                        args.push(SyntaxNode::new(
                            NodeKind::Arg,
                            kids,
                            Span::new(first, self.last),
                        ));
                    }
                    if self.eat(TokenKind::Comma).is_none() && !self.at(TokenKind::RParen) {
                        if self.at_eof() {
                            break;
                        }
                        // Statement boundary inside an unclosed call
                        if self.at(TokenKind::Semi) || self.at(TokenKind::RBrace) {
                            break;
                        }
                        self.bump();
                    }
                }
            }
        }
        children.push(SyntaxNode::new(
            NodeKind::ArgList,
            args,
            Span::new(open, close),
        ));
        let end = self.last;
        SyntaxNode::new(NodeKind::Call, children, Span::new(name_index, end))
    }

    /// Consume a malformed member-ish region through the next `;` (inclusive)
    /// or up to the closing brace, producing an `Error` node.
    fn recover_statementish(&mut self, start: usize) -> SyntaxNode {
        let mut depth = 0usize;
        let mut end = start;
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Semi if depth == 0 => {
                    end = self.bump();
                    break;
                }
                TokenKind::RBrace if depth == 0 => break,
                TokenKind::LBrace => {
                    depth += 1;
                    end = self.bump();
                }
                TokenKind::RBrace => {
                    depth -= 1;
                    end = self.bump();
                }
                _ => {
                    end = self.bump();
                }
            }
        }
        SyntaxNode::new(NodeKind::Error, Vec::new(), Span::new(start, end.max(start)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::parse_source;

    fn find<'a>(node: &'a SyntaxNode, kind: NodeKind) -> Option<&'a SyntaxNode> {
        node.descendants().into_iter().find(|n| n.kind == kind)
    }

    fn find_all<'a>(node: &'a SyntaxNode, kind: NodeKind) -> Vec<&'a SyntaxNode> {
        node.descendants()
            .into_iter()
            .filter(|n| n.kind == kind)
            .collect()
    }

    #[test]
    fn parses_class_with_method_and_field() {
        let parse = parse_source(
            "public class Account {\n    private int balance;\n    public int get() {\n        return balance;\n    }\n}\n",
        );
        let class = find(&parse.tree, NodeKind::Class).unwrap();
        let name = class.child(NodeKind::Name).unwrap();
        assert_eq!(name.token_text(&parse.tokens), Some("Account"));

        let field = find(&parse.tree, NodeKind::Field).unwrap();
        let declarator = field.child(NodeKind::Declarator).unwrap();
        assert_eq!(
            declarator.child(NodeKind::Name).unwrap().token_text(&parse.tokens),
            Some("balance")
        );

        let method = find(&parse.tree, NodeKind::Method).unwrap();
        assert_eq!(
            method.child(NodeKind::Name).unwrap().token_text(&parse.tokens),
            Some("get")
        );
        assert!(method.child(NodeKind::Block).is_some());
    }

    #[test]
    fn class_body_span_covers_braces() {
        let parse = parse_source("class A { }");
        let body = find(&parse.tree, NodeKind::ClassBody).unwrap();
        assert_eq!(parse.tokens[body.span.start].kind, TokenKind::LBrace);
        assert_eq!(parse.tokens[body.span.end].kind, TokenKind::RBrace);
    }

    #[test]
    fn parses_parameters_with_generics() {
        let parse = parse_source("class A { void m(Map<String, Integer> counts, int limit) {} }");
        let params = find_all(&parse.tree, NodeKind::Param);
        assert_eq!(params.len(), 2);
        assert_eq!(
            params[0].child(NodeKind::Name).unwrap().token_text(&parse.tokens),
            Some("counts")
        );
        assert_eq!(
            params[1].child(NodeKind::Name).unwrap().token_text(&parse.tokens),
            Some("limit")
        );
    }

    #[test]
    fn parses_local_variable_and_expression_statements() {
        let parse = parse_source("class A { void m() { int x = 1; x = x + 1; helper(x); } }");
        assert_eq!(find_all(&parse.tree, NodeKind::LocalVar).len(), 1);
        let calls = find_all(&parse.tree, NodeKind::Call);
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].child(NodeKind::Name).unwrap().token_text(&parse.tokens),
            Some("helper")
        );
    }

    #[test]
    fn call_arguments_are_split_at_top_level_commas() {
        let parse = parse_source("class A { void m() { combine(a, f(b, c), d); } }");
        let calls = find_all(&parse.tree, NodeKind::Call);
        let outer = calls
            .iter()
            .find(|c| {
                c.child(NodeKind::Name).unwrap().token_text(&parse.tokens) == Some("combine")
            })
            .unwrap();
        let args = outer.child(NodeKind::ArgList).unwrap();
        assert_eq!(args.children_of(NodeKind::Arg).count(), 3);
    }

    #[test]
    fn parses_switch_groups_and_labels() {
        let parse = parse_source(
            "class A { void m(int x) { switch (x) { case 1: a(); break; default: b(); } } }",
        );
        let switch = find(&parse.tree, NodeKind::Switch).unwrap();
        let body = switch.child(NodeKind::SwitchBody).unwrap();
        let groups: Vec<_> = body.children_of(NodeKind::SwitchGroup).collect();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].children_of(NodeKind::SwitchLabel).count(), 1);
    }

    #[test]
    fn malformed_member_becomes_error_and_parsing_continues() {
        let parse = parse_source("class A { ??? broken ; void ok() {} }");
        assert!(find(&parse.tree, NodeKind::Error).is_some());
        let method = find(&parse.tree, NodeKind::Method).unwrap();
        assert_eq!(
            method.child(NodeKind::Name).unwrap().token_text(&parse.tokens),
            Some("ok")
        );
    }

    #[test]
    fn comparison_is_not_mistaken_for_generic_type() {
        let parse = parse_source("class A { void m() { r = x < y && z > w; } }");
        assert!(find_all(&parse.tree, NodeKind::LocalVar).is_empty());
    }

    #[test]
    fn constructor_is_parsed_as_method_without_type() {
        let parse = parse_source("class A { A(int seed) {} }");
        let method = find(&parse.tree, NodeKind::Method).unwrap();
        assert!(method.child(NodeKind::TypeRef).is_none());
        assert_eq!(
            method.child(NodeKind::Name).unwrap().token_text(&parse.tokens),
            Some("A")
        );
    }

    #[test]
    fn imports_and_package_are_top_level_nodes() {
        let parse = parse_source("package a.b;\nimport java.util.List;\nimport java.io.File;\nclass A {}\n");
        assert!(find(&parse.tree, NodeKind::PackageDecl).is_some());
        assert_eq!(find_all(&parse.tree, NodeKind::Import).len(), 2);
    }
}
