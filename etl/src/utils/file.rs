//! Path helpers for config-supplied file locations

use std::path::PathBuf;

/// Expand `~` and make relative paths absolute against the working directory.
///
/// Config files are often written by hand (`~/exports/sales.xlsx`,
/// `./data/sales.xlsx`); every path read from config goes through here so that
/// log lines and error messages always show the absolute location.
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();

    if path.is_empty() {
        return std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    }

    let expanded = if path == "~" {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from(path))
    } else if let Some(rest) = path.strip_prefix("~/") {
        match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => PathBuf::from(path),
        }
    } else {
        PathBuf::from(path)
    };

    if expanded.is_relative() {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    } else {
        expanded
    }
}
