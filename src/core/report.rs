use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DocdiffError, Result};

/// Outcome of comparing one pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PairStatus {
    Identical,
    Different,
    /// One side could not be read, usually a missing counterpart
    Unreadable { error: String },
    /// The diff tool ran but exited abnormally
    ToolFailed { error: String },
}

impl PairStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PairStatus::Identical => "identical",
            PairStatus::Different => "different",
            PairStatus::Unreadable { .. } => "unreadable",
            PairStatus::ToolFailed { .. } => "tool failed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairReport {
    pub relative: PathBuf,
    pub label: String,
    #[serde(flatten)]
    pub status: PairStatus,
}

/// Everything a run compared, in processing order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub counterpart: String,
    pub pairs: Vec<PairReport>,
}

impl RunSummary {
    pub fn new(source: &str, counterpart: &str) -> Self {
        Self {
            generated_at: Utc::now(),
            source: source.to_string(),
            counterpart: counterpart.to_string(),
            pairs: Vec::new(),
        }
    }

    pub fn record(&mut self, relative: &Path, label: &str, status: PairStatus) {
        self.pairs.push(PairReport {
            relative: relative.to_path_buf(),
            label: label.to_string(),
            status,
        });
    }

    fn count(&self, wanted: fn(&PairStatus) -> bool) -> usize {
        self.pairs.iter().filter(|pair| wanted(&pair.status)).count()
    }

    pub fn identical(&self) -> usize {
        self.count(|s| matches!(s, PairStatus::Identical))
    }

    pub fn different(&self) -> usize {
        self.count(|s| matches!(s, PairStatus::Different))
    }

    pub fn unreadable(&self) -> usize {
        self.count(|s| matches!(s, PairStatus::Unreadable { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, PairStatus::ToolFailed { .. }))
    }

    /// One-line tally for the log
    pub fn headline(&self) -> String {
        format!(
            "{} pairs: {} identical, {} different, {} unreadable, {} failed",
            self.pairs.len(),
            self.identical(),
            self.different(),
            self.unreadable(),
            self.failed()
        )
    }

    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        md.push_str(&format!(
            "# Documentation comparison: {} vs {}\n\n",
            self.source, self.counterpart
        ));
        md.push_str(&format!("Generated: {}\n\n", self.generated_at.to_rfc3339()));
        md.push_str(&format!("{}\n\n", self.headline()));

        if self.pairs.is_empty() {
            md.push_str("No files matched.\n");
            return md;
        }

        md.push_str("| File | Status | Detail |\n");
        md.push_str("|------|--------|--------|\n");
        for pair in &self.pairs {
            let detail = match &pair.status {
                PairStatus::Unreadable { error } | PairStatus::ToolFailed { error } => {
                    error.replace('|', "\\|")
                }
                _ => String::new(),
            };
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                pair.relative.display(),
                pair.status.as_str(),
                detail
            ));
        }
        md
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Render in `format` ("markdown" or "json") and write to `path`
    pub async fn write(&self, path: &Path, format: &str) -> Result<()> {
        let rendered = match format {
            "markdown" => self.to_markdown(),
            "json" => self.to_json()?,
            other => {
                return Err(DocdiffError::Config(format!("Unsupported report format: {}", other)))
            }
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, rendered).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RunSummary {
        let mut summary = RunSummary::new("dgeni", "master");
        summary.record(Path::new("a.html"), "a.html", PairStatus::Identical);
        summary.record(Path::new("api/b.html"), "b.html", PairStatus::Different);
        summary.record(
            Path::new("c.html"),
            "c.html",
            PairStatus::Unreadable { error: "Failed to read master/c.html".to_string() },
        );
        summary
    }

    #[test]
    fn test_counts() {
        let summary = sample();
        assert_eq!(summary.identical(), 1);
        assert_eq!(summary.different(), 1);
        assert_eq!(summary.unreadable(), 1);
        assert_eq!(summary.failed(), 0);
        assert_eq!(
            summary.headline(),
            "3 pairs: 1 identical, 1 different, 1 unreadable, 0 failed"
        );
    }

    #[test]
    fn test_markdown_lists_every_pair() {
        let md = sample().to_markdown();
        assert!(md.starts_with("# Documentation comparison: dgeni vs master"));
        assert!(md.contains("| api/b.html | different |  |"));
        assert!(md.contains("| c.html | unreadable | Failed to read master/c.html |"));
    }

    #[test]
    fn test_markdown_layout() {
        let md = sample().to_markdown();
        let lines: Vec<_> = md.lines().collect();
        assert_eq!(lines[0], "# Documentation comparison: dgeni vs master");
        assert_eq!(lines[1], "");
        assert!(lines[2].starts_with("Generated: "));
        assert_eq!(lines[4], "3 pairs: 1 identical, 1 different, 1 unreadable, 0 failed");
        assert_eq!(lines[6], "| File | Status | Detail |");
        assert_eq!(lines.len(), 11);
        assert!(md.ends_with("|\n"));
    }

    #[test]
    fn test_empty_markdown() {
        let md = RunSummary::new("dgeni", "master").to_markdown();
        assert!(md.contains("0 pairs"));
        assert!(md.contains("No files matched."));
    }

    #[test]
    fn test_json_status_tags() {
        let json = sample().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let pairs = value["pairs"].as_array().unwrap();
        assert_eq!(pairs[0]["status"], "identical");
        assert_eq!(pairs[2]["status"], "unreadable");
        assert_eq!(pairs[2]["error"], "Failed to read master/c.html");
        assert_eq!(pairs[1]["relative"], "api/b.html");
    }

    #[tokio::test]
    async fn test_write_creates_parent_dirs() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("reports/run.json");
        sample().write(&path, "json").await.unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("\"identical\""));

        let bad = sample().write(&temp.path().join("x"), "yaml").await;
        assert!(bad.is_err());
    }
}
