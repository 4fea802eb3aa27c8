// RedBlue platform abstraction
// Provides platform-specific data paths for Windows, macOS, and Linux.
//
// Uses `cfg(target_os)` for conditional compilation to select the correct
// platform-specific implementation at compile time.

use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Returns the platform-specific data directory for RedBlue.
///
/// - **Linux**: `~/.local/share/redblue` (or `$XDG_DATA_HOME/redblue`)
/// - **macOS**: `~/Library/Application Support/RedBlue`
/// - **Windows**: `%APPDATA%/RedBlue`
pub fn get_data_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_data_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_data_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_data_dir()
    }
}
