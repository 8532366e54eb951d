//! Manifest directive parsing.

use log::debug;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::manifest::ManifestError;

/// One include/exclude rule of a manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Include(Vec<String>),
    Exclude(Vec<String>),
    GlobalInclude(Vec<String>),
    GlobalExclude(Vec<String>),
    RecursiveInclude { dir: String, patterns: Vec<String> },
    RecursiveExclude { dir: String, patterns: Vec<String> },
    Graft(String),
    Prune(String),
}

impl Directive {
    /// Keyword as written in the manifest
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Include(_) => "include",
            Self::Exclude(_) => "exclude",
            Self::GlobalInclude(_) => "global-include",
            Self::GlobalExclude(_) => "global-exclude",
            Self::RecursiveInclude { .. } => "recursive-include",
            Self::RecursiveExclude { .. } => "recursive-exclude",
            Self::Graft(_) => "graft",
            Self::Prune(_) => "prune",
        }
    }

    /// Parse a single non-blank, non-comment line
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut words = line.split_whitespace();
        let keyword = words.next().ok_or_else(|| "empty directive".to_string())?;
        let args: Vec<String> = words.map(str::to_string).collect();

        let patterns = |args: Vec<String>| {
            if args.is_empty() {
                Err(format!("'{}' expects <pattern1> <pattern2> ...", keyword))
            } else {
                Ok(args)
            }
        };
        let dir_and_patterns = |mut args: Vec<String>| {
            if args.len() < 2 {
                Err(format!("'{}' expects <dir> <pattern1> <pattern2> ...", keyword))
            } else {
                let dir = args.remove(0);
                Ok((dir, args))
            }
        };
        let single_dir = |mut args: Vec<String>| {
            if args.len() != 1 {
                Err(format!("'{}' expects a single <dir_pattern>", keyword))
            } else {
                Ok(args.remove(0))
            }
        };

        match keyword {
            "include" => patterns(args).map(Self::Include),
            "exclude" => patterns(args).map(Self::Exclude),
            "global-include" => patterns(args).map(Self::GlobalInclude),
            "global-exclude" => patterns(args).map(Self::GlobalExclude),
            "recursive-include" => {
                dir_and_patterns(args).map(|(dir, patterns)| Self::RecursiveInclude { dir, patterns })
            }
            "recursive-exclude" => {
                dir_and_patterns(args).map(|(dir, patterns)| Self::RecursiveExclude { dir, patterns })
            }
            "graft" => single_dir(args).map(Self::Graft),
            "prune" => single_dir(args).map(Self::Prune),
            other => Err(format!("invalid action '{}'", other)),
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Include(p) | Self::Exclude(p) | Self::GlobalInclude(p) | Self::GlobalExclude(p) => {
                write!(f, "{} {}", self.keyword(), p.join(" "))
            }
            Self::RecursiveInclude { dir, patterns } | Self::RecursiveExclude { dir, patterns } => {
                write!(f, "{} {} {}", self.keyword(), dir, patterns.join(" "))
            }
            Self::Graft(dir) | Self::Prune(dir) => write!(f, "{} {}", self.keyword(), dir),
        }
    }
}

/// Parse manifest text into its directives
///
/// Blank lines and lines starting with `#` are ignored.
pub fn parse_manifest(content: &str) -> Result<Vec<Directive>, ManifestError> {
    let mut directives = Vec::new();
    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let directive = Directive::parse(line).map_err(|message| ManifestError::Syntax {
            line: index + 1,
            message,
        })?;
        debug!("Manifest line {}: {}", index + 1, directive);
        directives.push(directive);
    }
    Ok(directives)
}

/// Read and parse a manifest file
pub fn load_manifest(path: &Path) -> Result<Vec<Directive>, ManifestError> {
    let content = fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_manifest(&content)
}
