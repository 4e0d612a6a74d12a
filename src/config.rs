use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{DocdiffError, Result};

/// Config file names searched in the working directory, in order
pub const CONFIG_CANDIDATES: [&str; 3] = ["docdiff.toml", "Docdiff.toml", ".docdiff.toml"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Variant trees being compared
    pub variants: VariantConfig,

    /// File discovery settings
    pub locate: LocateConfig,

    /// Noise stripping and formatting
    pub normalize: NormalizeConfig,

    /// External diff tool settings
    pub diff: DiffConfig,

    /// Optional run report
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantConfig {
    /// Directory containing both variant trees
    pub root: PathBuf,

    /// Token naming the variant that is walked (e.g. "dgeni")
    pub source: String,

    /// Token substituted to find the counterpart (e.g. "master")
    pub counterpart: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocateConfig {
    /// Glob matched against paths relative to `<root>/<source>`
    pub pattern: String,

    /// Sort matches so output order is stable across runs
    pub sort: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Replacement {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizeConfig {
    /// Regexes whose matches are removed before comparison
    pub strip_patterns: Vec<String>,

    /// Literal substitutions applied after stripping
    pub replacements: Vec<Replacement>,

    /// Spaces per nesting level in formatted output
    pub indent: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffConfig {
    /// Diff executable
    pub program: String,

    /// Arguments placed before the two scratch file paths
    pub args: Vec<String>,

    /// Directory holding the scratch files
    pub scratch_dir: PathBuf,

    /// Suffix scratch file names with a hash of the pair
    pub unique_scratch: bool,

    /// Extra pause after each comparison, in milliseconds
    pub pause_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Where to write the run report, if anywhere
    pub path: Option<PathBuf>,

    /// "markdown" or "json"
    #[serde(default = "default_report_format")]
    pub format: String,
}

fn default_report_format() -> String {
    "markdown".to_string()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            path: None,
            format: default_report_format(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            variants: VariantConfig {
                root: PathBuf::from("."),
                source: "dgeni".to_string(),
                counterpart: "master".to_string(),
            },
            locate: LocateConfig {
                pattern: "**/*.html".to_string(),
                sort: true,
            },
            normalize: NormalizeConfig {
                strip_patterns: vec![r"app(.*?)[\.,>]".to_string()],
                replacements: vec![Replacement {
                    from: "target='_blank'".to_string(),
                    to: "target=\"_blank\"".to_string(),
                }],
                indent: 2,
            },
            diff: DiffConfig {
                program: "git".to_string(),
                args: vec![
                    "diff".to_string(),
                    "--no-index".to_string(),
                    "--color-words".to_string(),
                ],
                scratch_dir: PathBuf::from("."),
                unique_scratch: false,
                pause_ms: 0,
            },
            report: ReportConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| DocdiffError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| DocdiffError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => {
                if p.as_ref().exists() {
                    Self::load(p)
                } else {
                    Err(DocdiffError::Config(format!(
                        "config file not found: {}",
                        p.as_ref().display()
                    )))
                }
            }
            None => {
                for candidate in &CONFIG_CANDIDATES {
                    if Path::new(candidate).exists() {
                        return Self::load(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        let variants = &self.variants;
        if variants.source.is_empty() || variants.counterpart.is_empty() {
            return Err(DocdiffError::Config("variant tokens must not be empty".to_string()));
        }
        if variants.source == variants.counterpart {
            return Err(DocdiffError::Config(format!(
                "source and counterpart variants are both '{}'",
                variants.source
            )));
        }
        if self.diff.program.trim().is_empty() {
            return Err(DocdiffError::Config("diff program must not be empty".to_string()));
        }
        match self.report.format.as_str() {
            "markdown" | "json" => Ok(()),
            other => Err(DocdiffError::Config(format!("Unsupported report format: {}", other))),
        }
    }
}
