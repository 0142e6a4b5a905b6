use std::path::Path;

use regex::Regex;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::core::errors::{Result, SyncError};
use crate::core::models::file_descriptor::FileDescriptor;
use crate::core::models::run_settings::FileSelection;
use crate::core::traits::file_lister::FileLister;

/// Filesystem lister matching glob patterns against paths relative to
/// the sync root.
///
/// Supported syntax: `*` and `?` (never crossing `/`), `**` (any depth),
/// `[abc]` / `[!abc]` classes and `{a,b}` alternatives. Only patterns
/// with a `/` or `**` make the walk descend into subdirectories.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobLister;

impl FileLister for GlobLister {
    fn list(&self, root: &Path, selection: &FileSelection) -> Result<Vec<FileDescriptor>> {
        if !root.is_dir() {
            return Err(SyncError::ListingFailed {
                path: root.to_path_buf(),
                reason: "not a directory".into(),
            });
        }

        let filters = compile_patterns(&selection.filter)?;
        let excludes = compile_patterns(&selection.exclude)?;
        let recursive = selection
            .filter
            .iter()
            .any(|p| p.contains('/') || p.contains("**"));

        let mut walker = WalkDir::new(root)
            .min_depth(1)
            .follow_links(selection.follow_symlinks)
            .sort_by_file_name();
        if !recursive {
            walker = walker.max_depth(1);
        }

        let entries = walker.into_iter().filter_entry(|entry| {
            if entry.depth() == 0 {
                return true;
            }
            if !selection.dot_files && is_hidden(entry) {
                return false;
            }
            match relative_key(root, entry.path()) {
                Some(key) => !excludes.iter().any(|re| re.is_match(&key)),
                None => true,
            }
        });

        let mut files = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if is_skippable(&e) => {
                    warn!("Skipping unreadable link: {e}");
                    continue;
                }
                Err(e) => {
                    return Err(SyncError::ListingFailed {
                        path: root.to_path_buf(),
                        reason: e.to_string(),
                    });
                }
            };

            if entry.file_type().is_dir() {
                continue;
            }
            // With links not followed, no link is listed, whatever it points at.
            if !selection.follow_symlinks && entry.path_is_symlink() {
                debug!("Skipping symbolic link {}", entry.path().display());
                continue;
            }

            let Some(key) = relative_key(root, entry.path()) else {
                warn!("Skipping non UTF-8 path {}", entry.path().display());
                continue;
            };
            if !filters.iter().any(|re| re.is_match(&key)) {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            let directory = entry.path().parent().unwrap_or(root).to_path_buf();
            files.push(FileDescriptor {
                directory,
                name,
                key,
            });
        }

        Ok(files)
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

/// Broken symlinks and link loops are skipped, not fatal.
fn is_skippable(err: &walkdir::Error) -> bool {
    err.loop_ancestor().is_some()
        || err
            .io_error()
            .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
}

/// `path` relative to `root`, joined with `/`.
fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            glob_to_regex(p).map_err(|e| SyncError::InvalidArgument {
                detail: format!("invalid glob pattern '{p}': {e}"),
            })
        })
        .collect()
}

/// Translate a glob pattern into an anchored regular expression.
fn glob_to_regex(pattern: &str) -> std::result::Result<Regex, regex::Error> {
    let pattern = pattern.strip_prefix("./").unwrap_or(pattern);
    let chars: Vec<char> = pattern.chars().collect();
    let mut re = String::from("^");
    let mut brace_depth = 0usize;
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' if chars.get(i + 1) == Some(&'*') => {
                if chars.get(i + 2) == Some(&'/') {
                    // "**/" also matches zero directories
                    re.push_str("(?:.*/)?");
                    i += 3;
                } else {
                    re.push_str(".*");
                    i += 2;
                }
                continue;
            }
            '*' => re.push_str("[^/]*"),
            '?' => re.push_str("[^/]"),
            '[' => {
                if let Some(len) = chars[i + 1..].iter().position(|&c| c == ']') {
                    let class = &chars[i + 1..i + 1 + len];
                    re.push('[');
                    for (pos, &c) in class.iter().enumerate() {
                        match c {
                            '!' | '^' if pos == 0 => re.push('^'),
                            '-' => re.push('-'),
                            c => re.push_str(&regex::escape(&c.to_string())),
                        }
                    }
                    re.push(']');
                    i += len + 2;
                    continue;
                }
                re.push_str(r"\[");
            }
            '{' => {
                brace_depth += 1;
                re.push_str("(?:");
            }
            '}' if brace_depth > 0 => {
                brace_depth -= 1;
                re.push(')');
            }
            ',' if brace_depth > 0 => re.push('|'),
            '\\' if i + 1 < chars.len() => {
                re.push_str(&regex::escape(&chars[i + 1].to_string()));
                i += 2;
                continue;
            }
            c => re.push_str(&regex::escape(&c.to_string())),
        }
        i += 1;
    }

    re.push('$');
    Regex::new(&re)
}
