//! Indentation depth tracking for the formatting pass

use crate::config::IndentConfig;

/// Tracks the current indentation depth while a pass walks nested blocks.
///
/// Depth changes are scoped: `indented` runs a closure one level deeper and
/// restores the previous depth afterwards, so a pass can never leak an
/// unbalanced push.
#[derive(Debug, Clone)]
pub struct IndentTracker {
    config: IndentConfig,
    depth: usize,
}

impl IndentTracker {
    pub fn new(config: IndentConfig) -> Self {
        Self { config, depth: 0 }
    }

    /// Current depth in levels
    pub fn level(&self) -> usize {
        self.depth
    }

    /// Indentation text for the current depth
    pub fn text(&self) -> String {
        self.config.text_at(self.depth)
    }

    /// Indentation text for an arbitrary depth
    pub fn text_at(&self, level: usize) -> String {
        self.config.text_at(level)
    }

    /// Run `f` with the depth increased by one level.
    pub fn indented<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.enter();
        let out = f(self);
        self.exit();
        out
    }

    pub(crate) fn enter(&mut self) {
        self.depth += 1;
    }

    pub(crate) fn exit(&mut self) {
        self.depth -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{IndentType, SwitchCaseLabels};

    #[test]
    fn scoped_indentation_restores_depth() {
        let mut tracker = IndentTracker::new(IndentConfig::default());
        assert_eq!(tracker.level(), 0);
        tracker.indented(|t| {
            assert_eq!(t.level(), 1);
            assert_eq!(t.text(), "    ");
            t.indented(|t| {
                assert_eq!(t.text(), "        ");
            });
            assert_eq!(t.level(), 1);
        });
        assert_eq!(tracker.level(), 0);
        assert_eq!(tracker.text(), "");
    }

    #[test]
    fn tab_indentation() {
        let config = IndentConfig {
            kind: IndentType::Tabs,
            size: 4,
            switch_case_labels: SwitchCaseLabels::Indent,
        };
        let mut tracker = IndentTracker::new(config);
        tracker.indented(|t| {
            assert_eq!(t.text(), "\t");
        });
    }
}
