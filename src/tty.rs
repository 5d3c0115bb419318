use is_terminal::IsTerminal;
use std::io;

/// Colour output only when stdout is a terminal and `NO_COLOR` is unset.
pub fn should_use_colors() -> bool {
    if std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
        return false;
    }
    io::stdout().is_terminal()
}
