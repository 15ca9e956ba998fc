//! Formatting pipeline
//!
//! Runs the passes in their fixed order, re-parsing between passes so each
//! one sees accurate token positions for the text it receives: naming,
//! formatting, alignment, then line wrapping.

use tracing::debug;

use crate::align;
use crate::audit;
use crate::config::{BracketAlignment, FormatConfig};
use crate::cst::parse_source;
use crate::format;
use crate::naming::{self, RenameMap};
use crate::result::Result;

/// Result of running the full pipeline over one source file
#[derive(Debug)]
pub struct FormatOutcome {
    pub text: String,
    /// Names the naming pass changed, old to new
    pub renames: RenameMap,
}

impl FormatOutcome {
    /// True when the output differs from the given input
    pub fn changed_from(&self, source: &str) -> bool {
        self.text != source
    }
}

/// Drives the pass sequence with one immutable configuration.
pub struct Pipeline {
    config: FormatConfig,
}

impl Pipeline {
    pub fn new(config: FormatConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FormatConfig {
        &self.config
    }

    /// Format one source file: naming, formatting, alignment, wrapping.
    pub fn format(&self, source: &str) -> Result<FormatOutcome> {
        let parse = parse_source(source);
        let named = naming::run(&parse, &self.config.naming_conventions)?;
        debug!(renames = named.renames.len(), "naming pass done");

        let parse = parse_source(&named.text);
        let formatted = format::run(&parse, &self.config);

        let aligned = if self.config.aligns.after_open_bracket == BracketAlignment::Disabled {
            formatted
        } else {
            align::run(&parse_source(&formatted), &self.config)
        };

        let text = align::wrap_lines(&aligned, &self.config);
        Ok(FormatOutcome {
            text,
            renames: named.renames,
        })
    }

    /// Report naming convention violations without changing anything.
    pub fn audit(&self, source: &str) -> Result<Vec<String>> {
        audit::run(&parse_source(source), &self.config.naming_conventions)
    }
}
