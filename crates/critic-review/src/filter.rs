//! Selection of the changed files worth sending to the LLM.
//!
//! Files are kept when their path matches at least one configured glob, in
//! the order the hosting API listed them, and the result is capped after
//! filtering.

use std::path::Path;

use critic_core::ChangedFile;
use glob::{MatchOptions, Pattern};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Glob-based file selector.
///
/// A pattern without a `/` is matched against the file name, so `*.js`
/// selects `src/app.js`. A pattern with a `/` is matched against the whole
/// repository-relative path. `*` never crosses a path separator; use `**`
/// for that. Wildcards do not match a leading dot, so `*.js` skips
/// `.eslintrc.js`.
///
/// # Examples
///
/// ```
/// use critic_review::filter::FileSelector;
///
/// let selector = FileSelector::new(&["*.js", "docs/*.md"]);
/// assert!(selector.matches("src/app.js"));
/// assert!(selector.matches("docs/intro.md"));
/// assert!(!selector.matches("docs/guide/intro.md"));
/// assert!(!selector.matches("main.py"));
/// ```
#[derive(Debug, Clone)]
pub struct FileSelector {
    patterns: Vec<Pattern>,
}

impl FileSelector {
    /// Compile a selector from glob strings.
    ///
    /// Invalid globs are logged and ignored.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        let mut compiled = Vec::new();
        for raw in patterns {
            let raw = raw.as_ref();
            match Pattern::new(raw) {
                Ok(p) => compiled.push(p),
                Err(e) => tracing::warn!(pattern = raw, error = %e, "ignoring invalid file pattern"),
            }
        }
        Self { patterns: compiled }
    }

    /// `true` if `path` matches at least one pattern.
    pub fn matches(&self, path: &str) -> bool {
        let file_name = Path::new(path)
            .file_name()
            .map(|f| f.to_string_lossy())
            .unwrap_or_default();

        self.patterns.iter().any(|pat| {
            if pat.as_str().contains('/') {
                pat.matches_with(path, MATCH_OPTIONS)
            } else {
                pat.matches_with(&file_name, MATCH_OPTIONS)
            }
        })
    }

    /// Keep matching files in their original order, then cap at `max_count`.
    ///
    /// # Examples
    ///
    /// ```
    /// use critic_core::{ChangedFile, FileStatus};
    /// use critic_review::filter::FileSelector;
    ///
    /// let files = vec![
    ///     ChangedFile::new("a.js", FileStatus::Modified),
    ///     ChangedFile::new("a.py", FileStatus::Modified),
    ///     ChangedFile::new("a.ts", FileStatus::Added),
    /// ];
    /// let selected = FileSelector::new(&["*.js", "*.ts"]).select(&files, 10);
    /// let paths: Vec<_> = selected.iter().map(|f| f.path.as_str()).collect();
    /// assert_eq!(paths, vec!["a.js", "a.ts"]);
    /// ```
    pub fn select(&self, files: &[ChangedFile], max_count: usize) -> Vec<ChangedFile> {
        files
            .iter()
            .filter(|f| self.matches(&f.path))
            .take(max_count)
            .cloned()
            .collect()
    }
}

/// Select files from `all_files` matching any of `patterns`, capped at `max_count`.
pub fn select_files<S: AsRef<str>>(
    all_files: &[ChangedFile],
    patterns: &[S],
    max_count: usize,
) -> Vec<ChangedFile> {
    FileSelector::new(patterns).select(all_files, max_count)
}
