//! Output mode control.
//!
//! [`OutputMode`] is the value of the global `--output` flag and of the
//! `[output] mode` config key. It decides how a projected result is turned
//! into text by [`render_value`](crate::render_value).

use serde::{Deserialize, Serialize};

/// How results are written.
///
/// - `Auto` - `Text` on a terminal, `Json` when piped
/// - `Text` - strings bare, everything else as YAML
/// - `Json`, `Yaml`, `Xml`, `Csv` - serialized with serde
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    Auto,
    Text,
    Json,
    Yaml,
    Xml,
    Csv,
}

impl OutputMode {
    /// Returns true for the serde-backed formats.
    pub fn is_structured(&self) -> bool {
        matches!(
            self,
            OutputMode::Json | OutputMode::Yaml | OutputMode::Xml | OutputMode::Csv
        )
    }

    /// Resolves `Auto` by checking whether stdout is a terminal.
    pub fn resolve_auto(&self) -> OutputMode {
        self.resolve_for(atty::is(atty::Stream::Stdout))
    }

    /// Resolves `Auto` for a known terminal state.
    pub fn resolve_for(&self, stdout_is_terminal: bool) -> OutputMode {
        match self {
            OutputMode::Auto if stdout_is_terminal => OutputMode::Text,
            OutputMode::Auto => OutputMode::Json,
            other => *other,
        }
    }

    /// Parses a mode name, ignoring case.
    pub fn parse(name: &str) -> Option<OutputMode> {
        <OutputMode as clap::ValueEnum>::from_str(name.trim(), true).ok()
    }
}
