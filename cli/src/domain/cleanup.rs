//! Stale configuration patterns.
//!
//! A pattern is an absolute path whose file-name component may contain `*`
//! wildcards (`/etc/apt/sources.list.d/nginx*.list`). Expansion works on a
//! directory listing handed in by the caller, so this module stays pure.

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::domain::error::ConfigError;

#[derive(Debug, Clone)]
pub struct StalePattern {
    directory: PathBuf,
    file_name: String,
    matcher: Option<Regex>,
}

impl StalePattern {
    /// Parse a pattern; wildcards are only allowed in the last component.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidPattern` if the path has no file name,
    /// no parent directory, or a wildcard in a directory component.
    pub fn parse(pattern: &Path) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidPattern {
            pattern: pattern.display().to_string(),
            reason: reason.to_owned(),
        };
        let file_name = pattern
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| invalid("missing file name"))?
            .to_owned();
        let directory = pattern
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| invalid("missing directory"))?
            .to_path_buf();
        if directory.to_string_lossy().contains('*') {
            return Err(invalid("wildcards are only supported in the file name"));
        }

        let matcher = if file_name.contains('*') {
            let body = file_name
                .split('*')
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(".*");
            Some(Regex::new(&format!("^{body}$")).map_err(|e| invalid(&e.to_string()))?)
        } else {
            None
        };

        Ok(Self {
            directory,
            file_name,
            matcher,
        })
    }

    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.matcher.is_some()
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Concrete removal targets.
    ///
    /// Literal patterns always yield their own path (absence is handled by
    /// the cleanup step itself); wildcard patterns yield the matching
    /// entries of `listing`, sorted.
    #[must_use]
    pub fn targets(&self, listing: &[String]) -> Vec<PathBuf> {
        let Some(matcher) = &self.matcher else {
            return vec![self.directory.join(&self.file_name)];
        };
        let mut names: Vec<&String> = listing.iter().filter(|n| matcher.is_match(n)).collect();
        names.sort();
        names.into_iter().map(|n| self.directory.join(n)).collect()
    }
}
