//! Convention auditor
//!
//! Read-only counterpart to the naming pass: reports every declared name
//! that does not satisfy its convention, without touching the source.

use crate::config::NamingConventions;
use crate::cst::Parse;
use crate::naming::{ConventionSet, collect_declarations};
use crate::result::Result;

/// Check every declaration against the configured conventions and return one
/// message per violation, in declaration order.
pub fn run(parse: &Parse, conventions: &NamingConventions) -> Result<Vec<String>> {
    let set = ConventionSet::compile(conventions)?;
    let mut findings = Vec::new();
    for decl in collect_declarations(parse) {
        let name = &parse.tokens[decl.name_token].text;
        if !set.pattern_for(decl.kind).matches(name) {
            findings.push(format!(
                "{} name '{}' does not match the naming convention '{}'",
                decl.kind.label(),
                name,
                set.spec_for(decl.kind)
            ));
        }
    }
    Ok(findings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::parse_source;

    fn audit(source: &str) -> Vec<String> {
        run(&parse_source(source), &NamingConventions::default()).unwrap()
    }

    #[test]
    fn clean_file_reports_nothing() {
        let findings = audit(
            "class Account { static final int MAX = 1; int balance; void deposit(int amount) { int total = 0; } }",
        );
        assert!(findings.is_empty(), "unexpected findings: {findings:?}");
    }

    #[test]
    fn violations_use_the_exact_message_format() {
        let findings = audit("class account {}");
        assert_eq!(
            findings,
            ["Class name 'account' does not match the naming convention 'pascalcase'"]
        );
    }

    #[test]
    fn each_declaration_kind_gets_its_own_label() {
        let findings = audit(
            "class A { int Bad_field; void Bad_method(int Bad_param) { int Bad_local = 0; } }",
        );
        let labels: Vec<&str> = findings
            .iter()
            .map(|f| f.split(" name ").next().unwrap())
            .collect();
        assert_eq!(labels, ["Field", "Method", "Parameter", "Local variable"]);
    }

    #[test]
    fn constants_are_checked_against_the_constant_convention() {
        let findings = audit("class A { static final int maxSize = 1; }");
        assert_eq!(
            findings,
            ["Field name 'maxSize' does not match the naming convention 'uppercase'"]
        );
    }

    #[test]
    fn auditing_never_modifies_anything() {
        // The audit only reads the parse; nothing to assert beyond it
        // producing findings for an unchanged input twice in a row.
        let source = "class account {}";
        assert_eq!(audit(source), audit(source));
    }

    #[test]
    fn literal_patterns_appear_verbatim_in_messages() {
        let conventions = NamingConventions {
            class: "[a-z]+".to_string(),
            ..NamingConventions::default()
        };
        let findings = run(&parse_source("class Account {}"), &conventions).unwrap();
        assert_eq!(
            findings,
            ["Class name 'Account' does not match the naming convention '[a-z]+'"]
        );
    }
}
