//! Canonical names of the installed commands
//!
//! The primary binary and its alias are defined here once; config defaults,
//! console messages and detection all read from these constants.

/// File name of the installed binary and the release asset prefix
pub const TOOL_NAME: &str = "migraine";

/// Short alias linked next to the binary
pub const ALIAS_NAME: &str = "mig";

/// Human-facing product name used in console output
pub const DISPLAY_NAME: &str = "Migraine CLI";

/// The two invocable command names an install publishes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandNames {
    pub primary: String,
    pub alias: String,
}

impl Default for CommandNames {
    fn default() -> Self {
        Self {
            primary: TOOL_NAME.to_string(),
            alias: ALIAS_NAME.to_string(),
        }
    }
}
