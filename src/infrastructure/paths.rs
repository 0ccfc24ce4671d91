//! Path resolution for data files.
//!
//! Everything shikimore writes lives under one data directory:
//!
//! - `store.json`: the key-value store (last search, search history)
//! - `shikimore-trace.jsonl`: exported trace spans, when tracing is on
//!
//! The directory follows the XDG base directory convention.

use std::env;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "shikimore";
const STORE_FILE: &str = "store.json";
const TRACE_FILE: &str = "shikimore-trace.jsonl";

/// Returns the default data directory.
///
/// Resolution order:
/// 1. `$XDG_DATA_HOME/shikimore`
/// 2. `$HOME/.local/share/shikimore`
/// 3. `./.shikimore` when neither variable is set
///
/// # Examples
///
/// ```
/// use shikimore::infrastructure::get_data_dir;
///
/// let data_dir = get_data_dir();
/// assert!(data_dir.ends_with("shikimore") || data_dir.ends_with(".shikimore"));
/// ```
#[must_use]
pub fn get_data_dir() -> PathBuf {
    resolve_data_dir(
        env::var_os("XDG_DATA_HOME").map(PathBuf::from),
        env::var_os("HOME").map(PathBuf::from),
    )
}

fn resolve_data_dir(xdg_data_home: Option<PathBuf>, home: Option<PathBuf>) -> PathBuf {
    match (xdg_data_home, home) {
        (Some(xdg), _) if xdg.is_absolute() => xdg.join(APP_DIR),
        (_, Some(home)) => home.join(".local").join("share").join(APP_DIR),
        _ => PathBuf::from(".").join(format!(".{APP_DIR}")),
    }
}

/// Path of the key-value store inside `data_dir`.
#[must_use]
pub fn store_path(data_dir: &Path) -> PathBuf {
    data_dir.join(STORE_FILE)
}

/// Path of the trace export file inside `data_dir`.
#[must_use]
pub fn trace_path(data_dir: &Path) -> PathBuf {
    data_dir.join(TRACE_FILE)
}

/// Expands a leading `~` to the user's home directory.
///
/// Paths without a leading tilde, and every path when `$HOME` is unset, are
/// returned unchanged.
///
/// # Examples
///
/// ```
/// use shikimore::infrastructure::expand_tilde;
///
/// assert_eq!(expand_tilde("/absolute/path"), "/absolute/path");
/// assert_eq!(expand_tilde("relative/~"), "relative/~");
/// ```
#[must_use]
pub fn expand_tilde(path: &str) -> String {
    match env::var("HOME") {
        Ok(home) => expand_with_home(path, &home),
        Err(_) => path.to_string(),
    }
}

fn expand_with_home(path: &str, home: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        format!("{}/{rest}", home.trim_end_matches('/'))
    } else if path == "~" {
        home.to_string()
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xdg_wins_over_home() {
        let dir = resolve_data_dir(Some("/xdg".into()), Some("/home/u".into()));
        assert_eq!(dir, PathBuf::from("/xdg/shikimore"));
    }

    #[test]
    fn relative_xdg_is_ignored() {
        let dir = resolve_data_dir(Some("xdg".into()), Some("/home/u".into()));
        assert_eq!(dir, PathBuf::from("/home/u/.local/share/shikimore"));
    }

    #[test]
    fn falls_back_to_working_directory() {
        assert_eq!(resolve_data_dir(None, None), PathBuf::from("./.shikimore"));
    }

    #[test]
    fn tilde_expansion() {
        assert_eq!(expand_with_home("~/data", "/home/u/"), "/home/u/data");
        assert_eq!(expand_with_home("~", "/home/u"), "/home/u");
        assert_eq!(expand_with_home("/etc/x", "/home/u"), "/etc/x");
    }

    #[test]
    fn file_names() {
        let dir = Path::new("/data");
        assert_eq!(store_path(dir), PathBuf::from("/data/store.json"));
        assert_eq!(trace_path(dir), PathBuf::from("/data/shikimore-trace.jsonl"));
    }
}
