//! Source tree discovery

use std::path::{Path, PathBuf};

use glob::{Pattern, PatternError};
use walkdir::WalkDir;

pub const STYLESHEET_PATTERN: &str = "*.css";
pub const MARKDOWN_PATTERN: &str = "*.md";

/// Recursively collects files under `root` whose file name matches `pattern`.
///
/// Searching from a filesystem root is refused and yields nothing, as does a
/// root that does not exist. The result is sorted and free of duplicates.
pub fn find_files(pattern: &str, root: &Path) -> Result<Vec<PathBuf>, PatternError> {
    let pattern = Pattern::new(pattern)?;
    if is_filesystem_root(root) {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .file_name()
            .to_str()
            .is_some_and(|name| pattern.matches(name));
        if matches {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// Stylesheets and markdown files under `root`, merged and sorted.
pub fn source_files(root: &Path) -> Result<Vec<PathBuf>, PatternError> {
    let mut files = find_files(STYLESHEET_PATTERN, root)?;
    files.extend(find_files(MARKDOWN_PATTERN, root)?);
    files.sort();
    files.dedup();
    Ok(files)
}

fn is_filesystem_root(path: &Path) -> bool {
    let raw = path.as_os_str();
    raw == "/" || raw == "\\" || (path.has_root() && path.parent().is_none())
}
