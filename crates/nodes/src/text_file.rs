//! Text files under the input directory, and the two plain file nodes
//! (`RandomLineFromDropdown`, `LoadTxtFile`) that sit directly on top of them.
//!
//! All reads are relative to an [`InputDir`]; a [`FileName`] that would escape
//! it (absolute, or containing `..`) is refused before touching the disk.

use std::io;
use std::path::{Component, Path, PathBuf};

use pipeline::{FileName, Seed};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

/// Errors raised while reading a text file for a node.
///
/// Nodes never propagate these; they render them with [`error_text`] into the
/// string output slot.
#[derive(Debug, Error)]
pub enum TextFileError {
    /// The file name points outside the input directory.
    #[error("'{file}' is outside the input directory")]
    OutsideInputDir { file: String },

    /// The file could not be opened or was not valid UTF-8.
    #[error("Could not read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file holds no non-blank line.
    #[error("File is empty")]
    Empty,
}

/// Renders a recovered error the way every node reports it in a string output.
pub fn error_text(err: &dyn std::fmt::Display) -> String {
    format!("[Error: {err}]")
}

/// Splits `content` into its non-blank lines, stripping line terminators only.
pub fn non_empty_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// The base directory all node file inputs are resolved against.
#[derive(Debug, Clone)]
pub struct InputDir {
    root: PathBuf,
}

impl InputDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Joins `file` onto the input directory, refusing paths that escape it.
    pub fn resolve(&self, file: &FileName) -> Result<PathBuf, TextFileError> {
        let rel = Path::new(file.as_str());
        let escapes = rel.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if escapes {
            return Err(TextFileError::OutsideInputDir {
                file: file.to_string(),
            });
        }
        Ok(self.root.join(rel))
    }

    /// Reads the whole file as UTF-8.
    pub fn read_to_string(&self, file: &FileName) -> Result<String, TextFileError> {
        let path = self.resolve(file)?;
        std::fs::read_to_string(&path).map_err(|source| TextFileError::Read { path, source })
    }

    /// Reads the non-blank lines of `file`; an all-blank file is an error.
    pub fn read_lines(&self, file: &FileName) -> Result<Vec<String>, TextFileError> {
        let lines = non_empty_lines(&self.read_to_string(file)?);
        if lines.is_empty() {
            return Err(TextFileError::Empty);
        }
        Ok(lines)
    }

    /// Lists every `.txt` file below the input directory (extension matched
    /// case-insensitively) as sorted, `/`-separated relative paths.
    pub fn list_text_files(&self) -> io::Result<Vec<String>> {
        let mut found = Vec::new();
        let mut pending = vec![self.root.clone()];
        while let Some(dir) = pending.pop() {
            for entry in std::fs::read_dir(&dir)? {
                let entry = entry?;
                let path = entry.path();
                if entry.file_type()?.is_dir() {
                    pending.push(path);
                    continue;
                }
                let is_txt = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("txt"));
                if !is_txt {
                    continue;
                }
                if let Ok(rel) = path.strip_prefix(&self.root) {
                    let parts: Vec<_> = rel
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy().into_owned())
                        .collect();
                    found.push(parts.join("/"));
                }
            }
        }
        found.sort();
        Ok(found)
    }
}

// ---------------------------------------------------------------------------
// RandomLineFromDropdown
// ---------------------------------------------------------------------------

/// Picks one trimmed, non-blank line of `file` with a generator seeded from `seed`.
pub fn random_line(input: &InputDir, file: &FileName, seed: Seed) -> String {
    let lines = match input.read_lines(file) {
        Ok(lines) => lines,
        Err(err) => {
            warn!(file = %file, error = %err, "random line unavailable");
            return error_text(&err);
        }
    };
    let mut rng = StdRng::seed_from_u64(seed.as_u64());
    let line = &lines[rng.gen_range(0..lines.len())];
    line.trim().to_string()
}

// ---------------------------------------------------------------------------
// LoadTxtFile
// ---------------------------------------------------------------------------

/// Output of the text file loader node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadedText {
    pub file_content: String,
    pub line_count: usize,
}

/// Loads the full content of `file` and counts its non-blank lines.
///
/// A disabled node yields empty content; read failures yield an error string
/// with a zero count. An empty file is not an error here.
pub fn load_text_file(input: &InputDir, enabled: bool, file: &FileName) -> LoadedText {
    if !enabled {
        return LoadedText {
            file_content: String::new(),
            line_count: 0,
        };
    }
    match input.read_to_string(file) {
        Ok(content) => {
            let line_count = non_empty_lines(&content).len();
            LoadedText {
                file_content: content,
                line_count,
            }
        }
        Err(err) => {
            warn!(file = %file, error = %err, "text file load failed");
            LoadedText {
                file_content: error_text(&err),
                line_count: 0,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture(files: &[(&str, &str)]) -> (TempDir, InputDir) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        for (name, content) in files {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(path, content).unwrap();
        }
        let input = InputDir::new(dir.path());
        (dir, input)
    }

    fn name(s: &str) -> FileName {
        FileName::new(s).unwrap()
    }

    #[test]
    fn blank_lines_are_dropped() {
        assert_eq!(
            non_empty_lines("a\n\n   \nb\r\n c \n"),
            vec!["a".to_string(), "b".to_string(), " c ".to_string()]
        );
    }

    #[test]
    fn resolve_refuses_escaping_paths() {
        let input = InputDir::new("/srv/input");
        assert!(input.resolve(&name("../secret.txt")).is_err());
        assert!(input.resolve(&name("/etc/passwd")).is_err());
        assert_eq!(
            input.resolve(&name("sub/a.txt")).unwrap(),
            PathBuf::from("/srv/input/sub/a.txt")
        );
    }

    #[test]
    fn list_text_files_is_recursive_and_sorted() {
        let (_dir, input) = fixture(&[
            ("b.txt", "x"),
            ("nested/a.TXT", "x"),
            ("notes.md", "x"),
            ("a.txt", "x"),
        ]);
        assert_eq!(
            input.list_text_files().unwrap(),
            vec!["a.txt", "b.txt", "nested/a.TXT"]
        );
    }

    #[test]
    fn empty_file_is_reported() {
        let (_dir, input) = fixture(&[("blank.txt", "\n  \n")]);
        assert!(matches!(
            input.read_lines(&name("blank.txt")),
            Err(TextFileError::Empty)
        ));
    }

    #[test]
    fn random_line_is_reproducible() {
        let content: String = (1..=10).map(|i| format!("Line {i}\n")).collect();
        let (_dir, input) = fixture(&[("lines.txt", &content)]);
        let first = random_line(&input, &name("lines.txt"), Seed::new(12345));
        let second = random_line(&input, &name("lines.txt"), Seed::new(12345));
        assert_eq!(first, second);
        assert!(first.starts_with("Line "));
    }

    #[test]
    fn random_line_varies_with_seed() {
        let content: String = (1..=10).map(|i| format!("Line {i}\n")).collect();
        let (_dir, input) = fixture(&[("lines.txt", &content)]);
        let distinct: std::collections::HashSet<_> = (0..100)
            .map(|s| random_line(&input, &name("lines.txt"), Seed::new(s)))
            .collect();
        assert!(distinct.len() > 1);
    }

    #[test]
    fn random_line_single_line_file() {
        let (_dir, input) = fixture(&[("one.txt", "  Only one line  ")]);
        for seed in [0, 42, 999] {
            assert_eq!(
                random_line(&input, &name("one.txt"), Seed::new(seed)),
                "Only one line"
            );
        }
    }

    #[test]
    fn random_line_reports_missing_file() {
        let (_dir, input) = fixture(&[]);
        let out = random_line(&input, &name("missing.txt"), Seed::new(1));
        assert!(out.starts_with("[Error: Could not read"));
    }

    #[test]
    fn load_text_file_counts_non_blank_lines() {
        let (_dir, input) = fixture(&[("doc.txt", "one\n\ntwo\n   \nthree")]);
        let loaded = load_text_file(&input, true, &name("doc.txt"));
        assert_eq!(loaded.line_count, 3);
        assert_eq!(loaded.file_content, "one\n\ntwo\n   \nthree");
    }

    #[test]
    fn load_text_file_disabled_and_missing() {
        let (_dir, input) = fixture(&[]);
        let disabled = load_text_file(&input, false, &name("doc.txt"));
        assert_eq!(disabled.file_content, "");
        assert_eq!(disabled.line_count, 0);

        let missing = load_text_file(&input, true, &name("doc.txt"));
        assert!(missing.file_content.starts_with("[Error: "));
        assert_eq!(missing.line_count, 0);
    }
}
