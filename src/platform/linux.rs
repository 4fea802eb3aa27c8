// RedBlue platform paths for Linux
// Data: ~/.local/share/redblue

use std::env;
use std::path::PathBuf;

/// Returns the data directory for RedBlue on Linux.
/// Uses `$XDG_DATA_HOME/redblue` if set, otherwise `~/.local/share/redblue`.
pub fn get_data_dir() -> PathBuf {
    match env::var("XDG_DATA_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("redblue"),
        _ => {
            let home = env::var("HOME").unwrap_or_else(|_| String::from("/tmp"));
            PathBuf::from(home).join(".local").join("share").join("redblue")
        }
    }
}
