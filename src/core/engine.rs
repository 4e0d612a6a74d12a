// src/core/engine.rs
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::config::{Config, NormalizeConfig, CONFIG_CANDIDATES};
use crate::error::DocdiffError;
use super::{
    DiffTool, Differ, ExternalDiffTool, Locator, Normalizer, PairStatus, PathPair, RunSummary,
};

/// Runs the locate, normalize, diff pipeline one pair at a time
pub struct Engine {
    config: Config,
    locator: Locator,
    normalizer: Normalizer,
    differ: Differ,
}

impl Engine {
    pub fn new(config: Config) -> Result<Self> {
        let tool = ExternalDiffTool::new(&config.diff);
        Self::with_tool(config, Box::new(tool))
    }

    /// Build an engine around a specific diff tool
    pub fn with_tool(config: Config, tool: Box<dyn DiffTool>) -> Result<Self> {
        config.validate()?;
        debug!("Loaded configuration: {:?}", config);

        let differ = Differ::with_tool(tool, &config.diff, &config.variants);
        let locator = Locator::new(&config.variants, &config.locate)?;
        let normalizer = Normalizer::new(&config.normalize)?;

        Ok(Self {
            config,
            locator,
            normalizer,
            differ,
        })
    }

    /// Compare every located pair, writing diffs to `out`.
    ///
    /// Pairs run strictly in order because they may share scratch files.
    /// An unreadable side is reported and skipped; a diff tool that cannot
    /// be started ends the run.
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<RunSummary> {
        let variants = &self.config.variants;
        info!(
            "Comparing {} against {} under {}",
            variants.source,
            variants.counterpart,
            variants.root.display()
        );

        let pairs = self.locator.locate()?;
        info!("Found {} files matching {}", pairs.len(), self.config.locate.pattern);

        let mut summary = RunSummary::new(&variants.source, &variants.counterpart);
        for pair in &pairs {
            let label = pair.label();
            let status = match self.normalize_pair(pair).await {
                Ok((left, right)) => {
                    self.differ
                        .compare(&label, &pair.relative, &left, &right, out)
                        .await?
                }
                Err(e @ DocdiffError::Read { .. }) => {
                    warn!("Skipping {}: {}", pair.relative.display(), e);
                    writeln!(out, "=== UNREADABLE {}: {}", label, e)?;
                    PairStatus::Unreadable {
                        error: e.to_string(),
                    }
                }
                Err(e) => return Err(e.into()),
            };
            summary.record(&pair.relative, &label, status);
        }

        info!("{}", summary.headline());

        if let Some(path) = &self.config.report.path {
            summary.write(path, &self.config.report.format).await?;
            info!("Report written to {}", path.display());
        }

        Ok(summary)
    }

    async fn normalize_pair(&self, pair: &PathPair) -> crate::error::Result<(String, String)> {
        let left = self.normalizer.normalize_file(&pair.source).await?;
        let right = self.normalizer.normalize_file(&pair.counterpart).await?;
        Ok((left, right))
    }

    /// Print the located pairs without diffing them
    pub fn list<W: Write>(&self, out: &mut W) -> Result<usize> {
        let pairs = self.locator.locate()?;
        for pair in &pairs {
            let state = if pair.counterpart_exists() { "ok" } else { "missing" };
            writeln!(
                out,
                "{}\t{}\t{}",
                pair.relative.display(),
                pair.counterpart.display(),
                state
            )?;
        }
        info!("{} files under {}", pairs.len(), self.locator.root().display());
        Ok(pairs.len())
    }

    /// Print the normalized form of a single file. Needs only the
    /// normalization settings, not a usable variant layout.
    pub async fn normalize<W: Write>(config: &NormalizeConfig, path: &Path, out: &mut W) -> Result<()> {
        let normalizer = Normalizer::new(config)?;
        let normalized = normalizer.normalize_file(path).await?;
        out.write_all(normalized.as_bytes())?;
        Ok(())
    }

    /// Write the default configuration into `dir`
    pub fn init(path: Option<PathBuf>, force: bool) -> Result<PathBuf> {
        let target_dir = match path {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };
        let config_path = target_dir.join(CONFIG_CANDIDATES[0]);

        if config_path.exists() && !force {
            return Err(DocdiffError::Config(format!(
                "{} already exists (use --force to overwrite)",
                config_path.display()
            ))
            .into());
        }

        std::fs::create_dir_all(&target_dir)?;
        Config::default().save(&config_path)?;
        info!("Wrote default configuration to {}", config_path.display());
        Ok(config_path)
    }
}
