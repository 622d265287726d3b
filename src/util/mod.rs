//! Path resolution following the XDG base directory layout.

use std::env;
use std::path::PathBuf;

/// Resolve an XDG base directory from environment or default to `$HOME` +
/// segments.
fn xdg_base_dir(var: &str, home_default: &[&str]) -> PathBuf {
    if let Ok(p) = env::var(var)
        && !p.trim().is_empty()
    {
        return PathBuf::from(p);
    }
    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let mut base = PathBuf::from(home);
    for seg in home_default {
        base = base.join(seg);
    }
    base
}

/// Configuration directory (`~/.config/factstash`), created on first use.
#[must_use]
pub fn config_dir() -> PathBuf {
    let dir = xdg_base_dir("XDG_CONFIG_HOME", &[".config"]).join("factstash");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

/// State directory (`~/.local/state/factstash`) holding history, categories,
/// and the cache blob.
#[must_use]
pub fn state_dir() -> PathBuf {
    xdg_base_dir("XDG_STATE_HOME", &[".local", "state"]).join("factstash")
}

/// Log directory under the configuration directory, created on first use.
#[must_use]
pub fn logs_dir() -> PathBuf {
    let dir = config_dir().join("logs");
    let _ = std::fs::create_dir_all(&dir);
    dir
}
