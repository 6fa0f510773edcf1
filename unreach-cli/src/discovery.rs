//! File discovery: walks a project root collecting source files, skipping
//! configured directory names at any depth.

use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::{instrument, trace};

/// Recursively collects every `.swift` file under `root`, skipping any
/// directory whose name matches one of `exclude_patterns` (plain names or
/// glob patterns, e.g. `.build`, `*.xcodeproj`).
#[instrument(skip(exclude_patterns))]
pub fn discover_source_files(root: &Path, exclude_patterns: &[String]) -> std::io::Result<Vec<PathBuf>> {
    let patterns: Vec<Pattern> = exclude_patterns
        .iter()
        .filter_map(|p| Pattern::new(p).ok())
        .collect();

    let mut files = Vec::new();
    walk(root, &patterns, &mut files)?;
    files.sort();
    Ok(files)
}

fn walk(dir: &Path, patterns: &[Pattern], files: &mut Vec<PathBuf>) -> std::io::Result<()> {
    let mut entries: Vec<_> = std::fs::read_dir(dir)?.filter_map(Result::ok).collect();
    entries.sort_by_key(std::fs::DirEntry::path);

    for entry in entries {
        let path = entry.path();
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if patterns.iter().any(|p| p.matches(&name)) {
                trace!(dir = %path.display(), "skipping excluded directory");
                continue;
            }
            walk(&path, patterns, files)?;
        } else if file_type.is_file() && path.extension().is_some_and(|ext| ext == "swift") {
            files.push(path);
        }
    }

    Ok(())
}
