use std::path::Path;

use regex::Regex;
use tracing::debug;

use crate::config::{NormalizeConfig, Replacement};
use crate::error::{DocdiffError, Result};
use super::pretty::format_html;

/// Strips generator noise from HTML and lays it out canonically
pub struct Normalizer {
    strip_patterns: Vec<Regex>,
    replacements: Vec<Replacement>,
    indent: usize,
}

impl Normalizer {
    pub fn new(config: &NormalizeConfig) -> Result<Self> {
        let strip_patterns = config
            .strip_patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| {
                    DocdiffError::Config(format!("invalid strip pattern '{}': {}", pattern, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            strip_patterns,
            replacements: config.replacements.clone(),
            indent: config.indent,
        })
    }

    /// Read a file and normalize its content
    pub async fn normalize_file(&self, path: &Path) -> Result<String> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| DocdiffError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("Read {} bytes from {}", content.len(), path.display());
        Ok(self.normalize_str(&content))
    }

    pub fn normalize_str(&self, content: &str) -> String {
        let mut content = content.to_string();
        for pattern in &self.strip_patterns {
            content = strip_matches(pattern, &content);
        }
        for replacement in &self.replacements {
            if !replacement.from.is_empty() {
                content = content.replace(&replacement.from, &replacement.to);
            }
        }
        format_html(&content, self.indent)
    }
}

/// Remove every match of `pattern` in place. A match ending in `>` keeps
/// the `>` so the surrounding tag stays closed.
fn strip_matches(pattern: &Regex, content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut last = 0;

    for found in pattern.find_iter(content) {
        let end = if found.as_str().ends_with('>') {
            found.end() - 1
        } else {
            found.end()
        };
        out.push_str(&content[last..found.start()]);
        last = end;
    }
    out.push_str(&content[last..]);
    out
}
