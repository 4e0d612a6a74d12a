use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use anyhow::Result;
use tracing::info;

use crate::config::Config;
use crate::core::Engine;

#[derive(Parser)]
#[command(name = "docdiff")]
#[command(about = "Compare generated HTML documentation between two build variants")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Diff every file in the source variant against its counterpart
    Run {
        /// Directory containing both variant trees
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Glob for files under the source variant
        #[arg(short, long)]
        pattern: Option<String>,

        /// Write a summary report to this path
        #[arg(long)]
        report: Option<PathBuf>,

        /// Report format
        #[arg(long, value_enum)]
        format: Option<ReportFormat>,
    },

    /// Show the file pairs that would be compared
    List {
        /// Directory containing both variant trees
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Glob for files under the source variant
        #[arg(short, long)]
        pattern: Option<String>,
    },

    /// Print the normalized form of one file
    Normalize {
        /// HTML file to normalize
        file: PathBuf,
    },

    /// Write a default configuration file
    Init {
        /// Target directory (defaults to current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ReportFormat {
    Markdown,
    Json,
}

impl ReportFormat {
    fn as_str(self) -> &'static str {
        match self {
            ReportFormat::Markdown => "markdown",
            ReportFormat::Json => "json",
        }
    }
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let config_path = self.config;
        let mut stdout = std::io::stdout();

        match self.command {
            Commands::Run { root, pattern, report, format } => {
                let mut config = Config::load_or_default(config_path.as_deref())?;
                apply_locate_overrides(&mut config, root, pattern);
                if let Some(report) = report {
                    config.report.path = Some(report);
                }
                if let Some(format) = format {
                    config.report.format = format.as_str().to_string();
                }

                let engine = Engine::new(config)?;
                engine.run(&mut stdout).await?;
                Ok(())
            }
            Commands::List { root, pattern } => {
                let mut config = Config::load_or_default(config_path.as_deref())?;
                apply_locate_overrides(&mut config, root, pattern);
                let engine = Engine::new(config)?;
                engine.list(&mut stdout)?;
                Ok(())
            }
            Commands::Normalize { file } => {
                let config = Config::load_or_default(config_path.as_deref())?;
                info!("Normalizing {}", file.display());
                Engine::normalize(&config.normalize, &file, &mut stdout).await
            }
            Commands::Init { path, force } => {
                Engine::init(path, force)?;
                Ok(())
            }
        }
    }
}

fn apply_locate_overrides(config: &mut Config, root: Option<PathBuf>, pattern: Option<String>) {
    if let Some(root) = root {
        config.variants.root = root;
    }
    if let Some(pattern) = pattern {
        config.locate.pattern = pattern;
    }
}
