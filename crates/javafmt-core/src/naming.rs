//! Naming pass
//!
//! Rewrites declared names to match the configured conventions and
//! propagates each rename to the identifier's uses. Class, method, and field
//! renames apply file-wide; parameter and local-variable renames stay inside
//! the declaring method body. Renaming is textual: every identifier token
//! with the old spelling inside the scope is replaced.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::config::NamingConventions;
use crate::cst::{NodeKind, Parse, Span, SyntaxNode, Token, TokenKind};
use crate::edit::TokenEditBuffer;
use crate::error::JavafmtError;
use crate::pattern::Pattern;
use crate::result::Result;

/// Old name to new name, for reporting what the pass changed
pub type RenameMap = BTreeMap<String, String>;

/// Text produced by the naming pass plus the renames it performed
#[derive(Debug)]
pub struct NamingOutcome {
    pub text: String,
    pub renames: RenameMap,
}

/// What kind of declaration a name belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Class,
    Method,
    Field,
    Constant,
    Parameter,
    Local,
}

impl DeclKind {
    /// Human-readable label used in audit messages
    pub fn label(self) -> &'static str {
        match self {
            DeclKind::Class => "Class",
            DeclKind::Method => "Method",
            DeclKind::Field | DeclKind::Constant => "Field",
            DeclKind::Parameter => "Parameter",
            DeclKind::Local => "Local variable",
        }
    }
}

/// One declared name found in the tree
#[derive(Debug, Clone)]
pub struct Declaration {
    pub kind: DeclKind,
    /// Token index of the declared name
    pub name_token: usize,
    /// Rename propagation scope; `None` means the whole file
    pub scope: Option<Span>,
}

/// Collect every named declaration the conventions apply to.
pub fn collect_declarations(parse: &Parse) -> Vec<Declaration> {
    let mut out = Vec::new();
    collect_into(&parse.tree, &parse.tokens, &mut out);
    out
}

fn collect_into(node: &SyntaxNode, tokens: &[Token], out: &mut Vec<Declaration>) {
    match node.kind {
        NodeKind::Class => {
            if let Some(name) = node.child(NodeKind::Name) {
                out.push(Declaration {
                    kind: DeclKind::Class,
                    name_token: name.span.start,
                    scope: None,
                });
            }
        }
        NodeKind::Method => {
            // A method without a return type is a constructor; its name is
            // covered by the class rename.
            let is_ctor = node.child(NodeKind::TypeRef).is_none();
            if !is_ctor {
                if let Some(name) = node.child(NodeKind::Name) {
                    out.push(Declaration {
                        kind: DeclKind::Method,
                        name_token: name.span.start,
                        scope: None,
                    });
                }
            }
            let body = node.child(NodeKind::Block).map(|b| b.span);
            if let Some(params) = node.child(NodeKind::ParamList) {
                for param in params.children_of(NodeKind::Param) {
                    if let Some(name) = param.child(NodeKind::Name) {
                        out.push(Declaration {
                            kind: DeclKind::Parameter,
                            name_token: name.span.start,
                            scope: Some(body.unwrap_or(param.span)),
                        });
                    }
                }
            }
            if let Some(body) = body {
                if let Some(block) = node.child(NodeKind::Block) {
                    for inner in block.descendants() {
                        if inner.kind == NodeKind::LocalVar {
                            for decl in inner.children_of(NodeKind::Declarator) {
                                if let Some(name) = decl.child(NodeKind::Name) {
                                    out.push(Declaration {
                                        kind: DeclKind::Local,
                                        name_token: name.span.start,
                                        scope: Some(body),
                                    });
                                }
                            }
                        }
                    }
                }
            }
            // Nested statements were handled above; nothing else to recurse into
            return;
        }
        NodeKind::Field => {
            let kind = if is_constant(node, tokens) {
                DeclKind::Constant
            } else {
                DeclKind::Field
            };
            for decl in node.children_of(NodeKind::Declarator) {
                if let Some(name) = decl.child(NodeKind::Name) {
                    out.push(Declaration {
                        kind,
                        name_token: name.span.start,
                        scope: None,
                    });
                }
            }
            return;
        }
        _ => {}
    }
    for child in &node.children {
        collect_into(child, tokens, out);
    }
}

/// A field with both `static` and `final` modifiers is a constant.
fn is_constant(field: &SyntaxNode, tokens: &[Token]) -> bool {
    let Some(mods) = field.child(NodeKind::Modifiers) else {
        return false;
    };
    let texts: Vec<&str> = mods
        .token_indices(tokens)
        .map(|i| tokens[i].text.as_str())
        .collect();
    texts.contains(&"static") && texts.contains(&"final")
}

/// Compiled per-kind patterns
pub struct ConventionSet {
    class: Pattern,
    method: Pattern,
    variable: Pattern,
    parameter: Pattern,
    constant: Pattern,
    specs: NamingConventions,
}

impl ConventionSet {
    /// Compile all convention patterns; an invalid pattern is fatal.
    pub fn compile(conventions: &NamingConventions) -> Result<Self> {
        Ok(Self {
            class: Pattern::from_convention(&conventions.class)?,
            method: Pattern::from_convention(&conventions.method)?,
            variable: Pattern::from_convention(&conventions.variable)?,
            parameter: Pattern::from_convention(&conventions.parameter)?,
            constant: Pattern::from_convention(&conventions.constant)?,
            specs: conventions.clone(),
        })
    }

    pub fn pattern_for(&self, kind: DeclKind) -> &Pattern {
        match kind {
            DeclKind::Class => &self.class,
            DeclKind::Method => &self.method,
            DeclKind::Field | DeclKind::Local => &self.variable,
            DeclKind::Parameter => &self.parameter,
            DeclKind::Constant => &self.constant,
        }
    }

    /// The configured spelling of the convention for a declaration kind
    pub fn spec_for(&self, kind: DeclKind) -> &str {
        match kind {
            DeclKind::Class => &self.specs.class,
            DeclKind::Method => &self.specs.method,
            DeclKind::Field | DeclKind::Local => &self.specs.variable,
            DeclKind::Parameter => &self.specs.parameter,
            DeclKind::Constant => &self.specs.constant,
        }
    }
}

/// Run the naming pass over a parsed file.
pub fn run(parse: &Parse, conventions: &NamingConventions) -> Result<NamingOutcome> {
    let set = ConventionSet::compile(conventions)?;
    let declarations = collect_declarations(parse);
    let mut buf = TokenEditBuffer::new();
    let mut renames = RenameMap::new();

    for decl in &declarations {
        let old = parse.tokens[decl.name_token].text.clone();
        let pattern = set.pattern_for(decl.kind);
        let new = match pattern.rewrite(&old) {
            Ok(new) => new,
            Err(err @ JavafmtError::ImpossiblePattern { .. }) => {
                // Leave the name as it is; the audit surfaces the mismatch
                warn!(name = %old, %err, "name cannot be adjusted to its convention");
                continue;
            }
            Err(err) => return Err(err),
        };
        if new == old {
            continue;
        }
        debug!(kind = ?decl.kind, %old, %new, "renaming");
        renames.insert(old.clone(), new.clone());

        match decl.scope {
            None => {
                for (i, token) in parse.tokens.iter().enumerate() {
                    if token.kind == TokenKind::Ident && token.text == old {
                        buf.replace(i, new.clone());
                    }
                }
            }
            Some(scope) => {
                buf.replace(decl.name_token, new.clone());
                for i in scope.start..=scope.end.min(parse.tokens.len() - 1) {
                    let token = &parse.tokens[i];
                    if token.kind == TokenKind::Ident && token.text == old {
                        buf.replace(i, new.clone());
                    }
                }
            }
        }
    }

    Ok(NamingOutcome {
        text: buf.materialize(&parse.tokens),
        renames,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::parse_source;
    use crate::error::ErrorKind;

    fn rename(source: &str) -> NamingOutcome {
        run(&parse_source(source), &NamingConventions::default()).unwrap()
    }

    #[test]
    fn class_rename_propagates_to_constructor_and_uses() {
        let out = rename("class account { account() {} account make() { return new account(); } }");
        assert!(out.text.contains("class Account"));
        assert!(out.text.contains("Account()"));
        assert!(out.text.contains("new Account()"));
        assert_eq!(out.renames.get("account").map(String::as_str), Some("Account"));
    }

    #[test]
    fn method_rename_is_file_wide() {
        let out = rename("class A { void GetValue() {} void other() { GetValue(); } }");
        assert!(out.text.contains("void getValue()"));
        assert!(out.text.contains("getValue();"));
    }

    #[test]
    fn constant_field_uses_the_constant_convention() {
        let out = rename("class A { static final int max_size = 10; int limit = max_size; }");
        assert!(out.text.contains("static final int MAX_SIZE = 10;"), "got:\n{}", out.text);
        assert!(out.text.contains("int limit = MAX_SIZE;"));
    }

    #[test]
    fn plain_field_is_not_a_constant() {
        let out = rename("class A { static int Counter; }");
        assert!(out.text.contains("static int counter;"));
    }

    #[test]
    fn parameter_rename_stays_inside_its_method() {
        let out = rename(
            "class A { void m(int Width) { use(Width); } void n() { int x = Width; } }",
        );
        assert!(out.text.contains("void m(int width)"), "got:\n{}", out.text);
        assert!(out.text.contains("use(width);"));
        // The other method's reference to an unrelated `Width` is untouched
        assert!(out.text.contains("int x = Width;"));
    }

    #[test]
    fn local_rename_stays_inside_its_method() {
        let out = rename(
            "class A { void m() { int Total = 0; use(Total); } void n() { use(Total); } }",
        );
        assert!(out.text.contains("int total = 0;"));
        assert!(out.text.contains("use(total);"));
        assert!(out.text.contains("void n() { use(Total); }"), "got:\n{}", out.text);
    }

    #[test]
    fn impossible_rename_is_skipped_not_fatal() {
        // `max_size` cannot become camelcase by case folding alone
        let out = rename("class A { void m() { int max_size = 1; } }");
        assert!(out.text.contains("int max_size = 1;"));
        assert!(out.renames.is_empty());
    }

    #[test]
    fn invalid_convention_pattern_is_fatal() {
        let conventions = NamingConventions {
            variable: "[".to_string(),
            ..NamingConventions::default()
        };
        let err = run(&parse_source("class A {}"), &conventions).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PatternSyntax);
    }

    #[test]
    fn conforming_names_are_left_alone() {
        let source = "class Account { int balance; void deposit(int amount) { balance = amount; } }";
        let out = rename(source);
        assert_eq!(out.text, source);
        assert!(out.renames.is_empty());
    }
}
