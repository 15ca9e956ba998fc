//! javafmt-core: configurable Java source reformatter and naming auditor
//!
//! The crate parses Java source into a trivia-preserving token sequence with
//! a tolerant syntax tree on top, then runs a fixed sequence of passes over
//! it: naming conventions, structural formatting (braces, modifiers,
//! indentation, imports), bracket alignment, and line wrapping. Every pass
//! records token-level edits against the original sequence, so untouched
//! code survives byte for byte.
//!
//! Typical use goes through [`Pipeline`]:
//!
//! ```
//! use javafmt_core::{FormatConfig, Pipeline};
//!
//! let pipeline = Pipeline::new(FormatConfig::default());
//! let out = pipeline.format("class account {}").unwrap();
//! assert!(out.text.starts_with("class Account"));
//! ```

pub mod align;
pub mod audit;
pub mod config;
pub mod cst;
pub mod edit;
pub mod error;
pub mod format;
pub mod indent;
pub mod naming;
pub mod pattern;
pub mod persist;
pub mod pipeline;
pub mod result;

pub use config::{
    AlignConfig, BraceStyle, BracketAlignment, FormatConfig, ImportOrder, ImportsConfig,
    IndentConfig, IndentType, NamingConventions, SwitchCaseLabels,
};
pub use error::{ErrorKind, JavafmtError};
pub use naming::{NamingOutcome, RenameMap};
pub use pipeline::{FormatOutcome, Pipeline};
pub use result::Result;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initialize tracing for CLI usage.
///
/// Honors `RUST_LOG` when set; otherwise applies the given filter
/// directives (e.g. `"javafmt=info,javafmt_core=info"`).
pub fn init_tracing(default_directives: &str) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
