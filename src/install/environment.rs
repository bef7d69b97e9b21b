//! Terminal detection for console output
//!
//! Package managers usually run lifecycle hooks with stdout piped, so colour
//! and progress bars are only used when a terminal is attached.

use std::io::IsTerminal;

use termcolor::ColorChoice;

/// Check if stdout is an interactive terminal
pub fn is_interactive() -> bool {
    std::io::stdout().is_terminal()
}

/// Colour policy for termcolor streams
///
/// `NO_COLOR` (any value) disables colour; otherwise colour is used only
/// on a terminal.
pub fn color_choice() -> ColorChoice {
    if std::env::var_os("NO_COLOR").is_some() {
        return ColorChoice::Never;
    }
    if is_interactive() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}
