use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::{DiffConfig, VariantConfig};
use crate::error::{DocdiffError, Result};
use super::report::PairStatus;

/// Captured result of one diff tool invocation
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Exit code, `None` when killed by a signal
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: String,
}

/// Something that can compare two files on disk
#[async_trait]
pub trait DiffTool: Send + Sync {
    fn name(&self) -> &str;

    /// Compare `left` against `right`. Only a failure to run the tool at all
    /// is an error; a non-zero exit is reported through `ToolOutput::code`.
    async fn compare(&self, left: &Path, right: &Path) -> Result<ToolOutput>;
}

/// Runs an external program such as `git diff --no-index --color-words`
pub struct ExternalDiffTool {
    program: String,
    args: Vec<String>,
}

impl ExternalDiffTool {
    pub fn new(config: &DiffConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
        }
    }
}

#[async_trait]
impl DiffTool for ExternalDiffTool {
    fn name(&self) -> &str {
        &self.program
    }

    async fn compare(&self, left: &Path, right: &Path) -> Result<ToolOutput> {
        debug!("Running {} {:?} {} {}", self.program, self.args, left.display(), right.display());

        // output() waits for both pipes to close, so nothing is still in flight afterwards
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(left)
            .arg(right)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| DocdiffError::DiffUnavailable {
                program: self.program.clone(),
                source,
            })?;

        Ok(ToolOutput {
            code: output.status.code(),
            stdout: output.stdout,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// The two files staged for the diff tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchFiles {
    pub left: PathBuf,
    pub right: PathBuf,
}

impl ScratchFiles {
    /// Paths for one pair. Shared names unless `unique` is set.
    pub fn for_pair(dir: &Path, variants: &VariantConfig, relative: &Path, unique: bool) -> Self {
        let suffix = if unique {
            let mut hasher = Sha256::new();
            hasher.update(relative.to_string_lossy().as_bytes());
            let hash = format!("{:x}", hasher.finalize());
            format!("-{}", &hash[..8])
        } else {
            String::new()
        };

        Self {
            left: dir.join(format!("{}-output{}", variants.source, suffix)),
            right: dir.join(format!("{}-output{}", variants.counterpart, suffix)),
        }
    }

    /// Write both sides; returns only once both writes completed.
    pub async fn write(&self, left: &str, right: &str) -> Result<()> {
        tokio::fs::write(&self.left, left).await?;
        tokio::fs::write(&self.right, right).await?;
        Ok(())
    }
}

/// Stages normalized content and runs the diff tool over it
pub struct Differ {
    tool: Box<dyn DiffTool>,
    variants: VariantConfig,
    scratch_dir: PathBuf,
    unique_scratch: bool,
    pause: Duration,
}

impl Differ {
    pub fn with_tool(tool: Box<dyn DiffTool>, config: &DiffConfig, variants: &VariantConfig) -> Self {
        Self {
            tool,
            variants: variants.clone(),
            scratch_dir: config.scratch_dir.clone(),
            unique_scratch: config.unique_scratch,
            pause: Duration::from_millis(config.pause_ms),
        }
    }

    pub fn scratch_for(&self, relative: &Path) -> ScratchFiles {
        ScratchFiles::for_pair(&self.scratch_dir, &self.variants, relative, self.unique_scratch)
    }

    /// Diff one pair of normalized documents, relaying tool output to `out`.
    pub async fn compare<W: Write>(
        &self,
        label: &str,
        relative: &Path,
        left: &str,
        right: &str,
        out: &mut W,
    ) -> Result<PairStatus> {
        let scratch = self.scratch_for(relative);
        scratch.write(left, right).await?;

        writeln!(out, "=== DIFF {}", label)?;
        let output = self.tool.compare(&scratch.left, &scratch.right).await?;
        out.write_all(&output.stdout)?;
        out.flush()?;

        let status = match output.code {
            Some(0) => PairStatus::Identical,
            Some(1) => PairStatus::Different,
            code => {
                let error = DocdiffError::DiffFailed {
                    program: self.tool.name().to_string(),
                    code,
                    stderr: output.stderr.trim().to_string(),
                };
                warn!("{}: {}", label, error);
                PairStatus::ToolFailed {
                    error: error.to_string(),
                }
            }
        };

        if !self.pause.is_zero() {
            tokio::time::sleep(self.pause).await;
        }

        Ok(status)
    }
}
