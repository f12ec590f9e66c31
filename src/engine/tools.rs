//! Path and filter utilities

use anyhow::{Context, Result, bail};
use std::collections::HashSet;
use std::path::Path;

/// OS bookkeeping files that never belong in a walk.
pub fn is_os_junk_file(name: &str) -> bool {
    matches!(
        name,
        ".DS_Store" | ".AppleDouble" | ".LSOverride" | "Thumbs.db" | "ehthumbs.db" | "Desktop.ini"
    ) || name.starts_with("._")
}

/// Returns true if an entry named `name` should be visited (not junk, not excluded).
pub fn should_visit(name: &str, exclude_patterns: &[String]) -> bool {
    if is_os_junk_file(name) {
        return false;
    }
    !exclude_patterns.iter().any(|p| glob_match(p, name))
}

/// Simple glob pattern matching (supports `*` and `?`).
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    glob_match_chars(&pattern, &text)
}

fn glob_match_chars(pattern: &[char], text: &[char]) -> bool {
    match pattern.split_first() {
        None => text.is_empty(),
        Some(('*', rest)) => (0..=text.len()).any(|skip| glob_match_chars(rest, &text[skip..])),
        Some(('?', rest)) => !text.is_empty() && glob_match_chars(rest, &text[1..]),
        Some((c, rest)) => text.first() == Some(c) && glob_match_chars(rest, &text[1..]),
    }
}

/// `".rs"` and `"rs"` both become `"rs"`.
pub fn normalize_extension(ext: &str) -> &str {
    ext.strip_prefix('.').unwrap_or(ext)
}

/// Build a lookup set from extensions written with or without the leading dot.
pub fn extension_set<S: AsRef<str>>(extensions: &[S]) -> HashSet<String> {
    extensions
        .iter()
        .map(|e| normalize_extension(e.as_ref()).to_string())
        .filter(|e| !e.is_empty())
        .collect()
}

/// Text after the last `.` of the file name. Unlike [`Path::extension`], a dotfile such as
/// `.json` has extension `json`.
pub fn file_extension(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    name.rsplit_once('.').map(|(_, ext)| ext)
}

/// True if `path` has an extension in `allowed` (case-sensitive, no leading dot).
pub fn has_extension(path: &Path, allowed: &HashSet<String>) -> bool {
    file_extension(path).is_some_and(|e| allowed.contains(e))
}

/// Walk root must exist and be a directory.
pub fn check_walk_root(root: &Path) -> Result<()> {
    let meta = std::fs::metadata(root).with_context(|| format!("read {}", root.display()))?;
    if !meta.is_dir() {
        bail!("walk root is not a directory: {}", root.display());
    }
    Ok(())
}
