//! Formatter configuration
//!
//! Configuration is loaded once per run from a JSON file (conventionally
//! `java-format.json`) and is immutable afterwards. Every closed option set is
//! an enum; unspecified options fall back to the built-in defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::JavafmtError;
use crate::result::Result;

/// Where a block's opening brace goes relative to its header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BraceStyle {
    /// Same line as the declaration, separated by a single space
    Attach,
    /// Own line at the current indentation
    Break,
}

/// Indentation character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndentType {
    Spaces,
    Tabs,
}

/// Whether `case`/`default` labels add an indentation level inside a switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchCaseLabels {
    Indent,
    NoIndent,
}

/// Import declaration ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportOrder {
    Preserve,
    Sort,
}

/// Argument/parameter list layout after the opening bracket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketAlignment {
    /// No alignment pass at all (spelled `false` in the config file)
    Disabled,
    /// Break after every batch, aligned to the column after the open bracket
    Align,
    /// Break after every batch to the current indentation depth
    DontAlign,
    /// Single break right after the opening bracket, one level deeper
    AlwaysBreak,
    /// Like `always_break` plus a matching break before the closing bracket
    BlockIndent,
    /// Every parameter after the first starts a new aligned line
    AllParametersOnNewLine,
}

/// `false` in JSON disables alignment; any other value must be a policy name.
fn bracket_alignment<'de, D>(deserializer: D) -> std::result::Result<BracketAlignment, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Flag(bool),
        Name(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Flag(false) => Ok(BracketAlignment::Disabled),
        Raw::Flag(true) => Err(serde::de::Error::custom(
            "after_open_bracket must be false or an alignment policy name",
        )),
        Raw::Name(name) => match name.as_str() {
            "disabled" => Ok(BracketAlignment::Disabled),
            "align" => Ok(BracketAlignment::Align),
            "dont_align" => Ok(BracketAlignment::DontAlign),
            "always_break" => Ok(BracketAlignment::AlwaysBreak),
            "block_indent" => Ok(BracketAlignment::BlockIndent),
            "all_parameters_on_new_line" => Ok(BracketAlignment::AllParametersOnNewLine),
            other => Err(serde::de::Error::custom(format!(
                "unknown alignment policy '{other}'"
            ))),
        },
    }
}

/// Naming convention specifiers per declaration kind
///
/// Each value is either a named convention (`pascalcase`, `camelcase`,
/// `uppercase`) or a literal pattern in the restricted regex dialect.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConventions {
    pub class: String,
    pub method: String,
    pub variable: String,
    pub parameter: String,
    pub constant: String,
}

impl Default for NamingConventions {
    fn default() -> Self {
        Self {
            class: "pascalcase".to_string(),
            method: "camelcase".to_string(),
            variable: "camelcase".to_string(),
            parameter: "camelcase".to_string(),
            constant: "uppercase".to_string(),
        }
    }
}

/// Import handling options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportsConfig {
    pub order: ImportOrder,
    pub merge: bool,
}

impl Default for ImportsConfig {
    fn default() -> Self {
        Self {
            order: ImportOrder::Preserve,
            merge: false,
        }
    }
}

/// Indentation options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndentConfig {
    #[serde(rename = "type")]
    pub kind: IndentType,
    pub size: usize,
    pub switch_case_labels: SwitchCaseLabels,
}

impl Default for IndentConfig {
    fn default() -> Self {
        Self {
            kind: IndentType::Spaces,
            size: 4,
            switch_case_labels: SwitchCaseLabels::Indent,
        }
    }
}

impl IndentConfig {
    /// The indentation text for one whole level at the given depth
    pub fn text_at(&self, level: usize) -> String {
        match self.kind {
            IndentType::Spaces => " ".repeat(level * self.size),
            IndentType::Tabs => "\t".repeat(level),
        }
    }
}

/// Bracket alignment options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignConfig {
    #[serde(deserialize_with = "bracket_alignment")]
    pub after_open_bracket: BracketAlignment,
    pub parameters_before_align: usize,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            after_open_bracket: BracketAlignment::Disabled,
            parameters_before_align: 2,
        }
    }
}

/// Complete formatter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    pub brace_style: BraceStyle,
    /// Maximum output line length; `-1` disables wrapping
    pub max_line_length: i64,
    /// Surround binary operators with single spaces
    pub space_around_operator: bool,
    pub class_modifier_order: Vec<String>,
    pub method_modifier_order: Vec<String>,
    pub naming_conventions: NamingConventions,
    pub imports: ImportsConfig,
    pub indents: IndentConfig,
    pub aligns: AlignConfig,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            brace_style: BraceStyle::Break,
            max_line_length: 100,
            space_around_operator: true,
            class_modifier_order: vec![
                "public".to_string(),
                "abstract".to_string(),
                "final".to_string(),
            ],
            method_modifier_order: vec![
                "public".to_string(),
                "static".to_string(),
                "final".to_string(),
            ],
            naming_conventions: NamingConventions::default(),
            imports: ImportsConfig::default(),
            indents: IndentConfig::default(),
            aligns: AlignConfig::default(),
        }
    }
}

impl FormatConfig {
    /// Load a configuration file, failing on unreadable or invalid JSON
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| JavafmtError::io(path, e))?;
        serde_json::from_str(&raw).map_err(|e| {
            JavafmtError::config(format!("invalid config file '{}': {e}", path.display()))
        })
    }

    /// Load a configuration file if one was given, otherwise use the defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// True when line wrapping is enabled
    pub fn wrapping_enabled(&self) -> bool {
        self.max_line_length >= 0
    }
}
