//! File selection driven by manifest directives.

use log::{debug, info, warn};
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::manifest::parser::Directive;
use crate::manifest::ManifestError;

fn push_class_char(out: &mut String, ch: char) {
    if matches!(ch, '\\' | '[' | ']' | '^' | '-' | '&' | '~') {
        out.push('\\');
    }
    out.push(ch);
}

/// Translate the body of a `[...]` glob class
///
/// Only `!` (leading) and `-` (between two characters) are special, as in
/// fnmatch. Everything else is a literal, including `^`, `[` and the
/// class-set operators of the regex syntax. Reversed ranges match nothing.
fn class_to_regex(body: &[char]) -> String {
    let (negated, body) = match body.split_first() {
        Some(('!', rest)) => (true, rest),
        _ => (false, body),
    };

    let mut items = String::new();
    let mut i = 0;
    while i < body.len() {
        if i + 2 < body.len() && body[i + 1] == '-' {
            let (low, high) = (body[i], body[i + 2]);
            if low <= high {
                push_class_char(&mut items, low);
                items.push('-');
                push_class_char(&mut items, high);
            }
            i += 3;
        } else {
            push_class_char(&mut items, body[i]);
            i += 1;
        }
    }

    match (negated, items.is_empty()) {
        (false, true) => r"[^\x00-\x{10FFFF}]".to_string(),
        (true, true) => "[^/]".to_string(),
        (false, false) => format!("[{}]", items),
        (true, false) => format!("[^{}]", items),
    }
}

/// Translate a shell glob into a regex fragment
///
/// `*` and `?` never match `/`. `[...]` classes follow fnmatch, with a
/// leading `!` as the negation.
pub fn glob_to_regex(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::new();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            '[' => {
                let mut j = i + 1;
                if j < chars.len() && chars[j] == '!' {
                    j += 1;
                }
                if j < chars.len() && chars[j] == ']' {
                    j += 1;
                }
                while j < chars.len() && chars[j] != ']' {
                    j += 1;
                }
                if j >= chars.len() {
                    out.push_str(r"\[");
                } else {
                    out.push_str(&class_to_regex(&chars[i + 1..j]));
                    i = j;
                }
            }
            ch => out.push_str(&regex::escape(&ch.to_string())),
        }
        i += 1;
    }
    out
}

fn dir_prefix(dir: &str) -> String {
    let dir = dir.trim_matches('/');
    if dir.is_empty() || dir == "." {
        String::new()
    } else {
        format!("{}/", glob_to_regex(dir))
    }
}

fn compile(expression: &str) -> Result<Regex, ManifestError> {
    Regex::new(expression).map_err(|e| ManifestError::Pattern {
        pattern: expression.to_string(),
        message: e.to_string(),
    })
}

/// Regex for a pattern anchored at the root (`include`, `exclude`)
fn anchored(pattern: &str) -> Result<Regex, ManifestError> {
    compile(&format!("^{}$", glob_to_regex(pattern)))
}

/// Regex for a pattern matching at any depth (`global-*`)
fn unanchored(pattern: &str) -> Result<Regex, ManifestError> {
    compile(&format!("(^|/){}$", glob_to_regex(pattern)))
}

/// Regex for a pattern matching anywhere below `dir` (`recursive-*`)
fn under(dir: &str, pattern: &str) -> Result<Regex, ManifestError> {
    compile(&format!("^{}(.*/)?{}$", dir_prefix(dir), glob_to_regex(pattern)))
}

/// Regex for every file below `dir` (`graft`, `prune`)
fn subtree(dir: &str) -> Result<Regex, ManifestError> {
    compile(&format!("^{}", dir_prefix(dir)))
}

/// Candidate files of a source tree and the current selection
#[derive(Debug, Clone, Default)]
pub struct FileList {
    all_files: Vec<String>,
    selected: BTreeSet<String>,
}

impl FileList {
    /// Build from explicit `/`-separated relative paths
    pub fn new(all_files: impl IntoIterator<Item = String>) -> Self {
        let mut all_files: Vec<String> = all_files.into_iter().collect();
        all_files.sort();
        all_files.dedup();
        Self {
            all_files,
            selected: BTreeSet::new(),
        }
    }

    /// Walk `root` and collect every file below it
    pub fn from_dir(root: &Path) -> Result<Self, ManifestError> {
        let mut files = Vec::new();
        walk(root, root, &mut files)?;
        info!("Found {} candidate files under {:?}", files.len(), root);
        Ok(Self::new(files))
    }

    pub fn all_files(&self) -> &[String] {
        &self.all_files
    }

    /// Selected files in sorted order
    pub fn files(&self) -> Vec<&str> {
        self.selected.iter().map(String::as_str).collect()
    }

    fn include_matching(&mut self, regex: &Regex) -> bool {
        let mut found = false;
        for file in &self.all_files {
            if regex.is_match(file) {
                debug!("adding {}", file);
                self.selected.insert(file.clone());
                found = true;
            }
        }
        found
    }

    fn exclude_matching(&mut self, regex: &Regex) -> bool {
        let before = self.selected.len();
        self.selected.retain(|file| {
            let keep = !regex.is_match(file);
            if !keep {
                debug!("removing {}", file);
            }
            keep
        });
        self.selected.len() != before
    }

    /// Apply one directive to the selection
    ///
    /// A pattern that matches nothing is reported as a warning, not an error.
    pub fn apply(&mut self, directive: &Directive) -> Result<(), ManifestError> {
        match directive {
            Directive::Include(patterns) => {
                for pattern in patterns {
                    if !self.include_matching(&anchored(pattern)?) {
                        warn!("no files found matching '{}'", pattern);
                    }
                }
            }
            Directive::Exclude(patterns) => {
                for pattern in patterns {
                    if !self.exclude_matching(&anchored(pattern)?) {
                        warn!("no previously-included files found matching '{}'", pattern);
                    }
                }
            }
            Directive::GlobalInclude(patterns) => {
                for pattern in patterns {
                    if !self.include_matching(&unanchored(pattern)?) {
                        warn!("no files found matching '{}' anywhere in distribution", pattern);
                    }
                }
            }
            Directive::GlobalExclude(patterns) => {
                for pattern in patterns {
                    if !self.exclude_matching(&unanchored(pattern)?) {
                        warn!(
                            "no previously-included files matching '{}' found anywhere in distribution",
                            pattern
                        );
                    }
                }
            }
            Directive::RecursiveInclude { dir, patterns } => {
                for pattern in patterns {
                    if !self.include_matching(&under(dir, pattern)?) {
                        warn!("no files found matching '{}' under directory '{}'", pattern, dir);
                    }
                }
            }
            Directive::RecursiveExclude { dir, patterns } => {
                for pattern in patterns {
                    if !self.exclude_matching(&under(dir, pattern)?) {
                        warn!(
                            "no previously-included files matching '{}' found under directory '{}'",
                            pattern, dir
                        );
                    }
                }
            }
            Directive::Graft(dir) => {
                if !self.include_matching(&subtree(dir)?) {
                    warn!("no directories found matching '{}'", dir);
                }
            }
            Directive::Prune(dir) => {
                if !self.exclude_matching(&subtree(dir)?) {
                    warn!("no previously-included directories found matching '{}'", dir);
                }
            }
        }
        Ok(())
    }

    /// Apply directives in order
    pub fn apply_all(&mut self, directives: &[Directive]) -> Result<(), ManifestError> {
        for directive in directives {
            self.apply(directive)?;
        }
        Ok(())
    }
}

fn walk(root: &Path, dir: &Path, files: &mut Vec<String>) -> Result<(), ManifestError> {
    let io_error = |path: &Path| {
        let path = path.display().to_string();
        move |source| ManifestError::Io { path, source }
    };

    for entry in fs::read_dir(dir).map_err(io_error(dir))? {
        let entry = entry.map_err(io_error(dir))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(io_error(&path))?;

        if file_type.is_dir() {
            walk(root, &path, files)?;
        } else if file_type.is_file() || (file_type.is_symlink() && path.is_file()) {
            if let Ok(relative) = path.strip_prefix(root) {
                let relative: Vec<String> = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                files.push(relative.join("/"));
            }
        }
    }
    Ok(())
}
