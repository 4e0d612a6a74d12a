use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use tracing::debug;
use walkdir::WalkDir;

use crate::config::{LocateConfig, VariantConfig};
use crate::error::{DocdiffError, Result};

/// The same logical document in both variant trees
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPair {
    /// File found under the source variant
    pub source: PathBuf,

    /// Derived path under the counterpart variant; may not exist
    pub counterpart: PathBuf,

    /// Path relative to the source variant root
    pub relative: PathBuf,
}

impl PathPair {
    /// Base name used in headers
    pub fn label(&self) -> String {
        self.source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source.display().to_string())
    }

    pub fn counterpart_exists(&self) -> bool {
        self.counterpart.is_file()
    }
}

/// Finds files in the source variant tree and pairs them with counterparts
pub struct Locator {
    root: PathBuf,
    counterpart_root: PathBuf,
    matcher: GlobMatcher,
    sort: bool,
}

impl Locator {
    pub fn new(variants: &VariantConfig, locate: &LocateConfig) -> Result<Self> {
        let glob = GlobBuilder::new(&locate.pattern)
            .literal_separator(true)
            .build()?;

        Ok(Self {
            root: variants.root.join(&variants.source),
            counterpart_root: variants.root.join(&variants.counterpart),
            matcher: glob.compile_matcher(),
            sort: locate.sort,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Same relative path under the counterpart variant. Only the variant
    /// directory changes, even when the root itself contains the token.
    pub fn counterpart_for(&self, relative: &Path) -> PathBuf {
        self.counterpart_root.join(relative)
    }

    /// Enumerate every matching file and derive its counterpart.
    pub fn locate(&self) -> Result<Vec<PathPair>> {
        if !self.root.is_dir() {
            return Err(DocdiffError::Locate(format!(
                "source tree {} is not a directory",
                self.root.display()
            )));
        }

        let mut pairs = Vec::new();
        for entry in WalkDir::new(&self.root) {
            let entry = entry.map_err(|e| DocdiffError::Locate(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let relative = match path.strip_prefix(&self.root) {
                Ok(relative) => relative.to_path_buf(),
                Err(_) => continue,
            };
            if !self.matcher.is_match(&relative) {
                continue;
            }

            let counterpart = self.counterpart_for(&relative);
            debug!("Paired {} -> {}", path.display(), counterpart.display());
            pairs.push(PathPair {
                source: path.to_path_buf(),
                counterpart,
                relative,
            });
        }

        if self.sort {
            pairs.sort_by(|a, b| a.relative.cmp(&b.relative));
        }

        Ok(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use assert_fs::prelude::*;

    fn locator_for(root: &Path, pattern: &str) -> Locator {
        let mut config = Config::default();
        config.variants.root = root.to_path_buf();
        config.locate.pattern = pattern.to_string();
        Locator::new(&config.variants, &config.locate).unwrap()
    }

    #[test]
    fn test_counterpart_swaps_only_the_variant_directory() {
        let locator = locator_for(Path::new("/work/dgeni-check"), "**/*.html");
        let derived = locator.counterpart_for(Path::new("api/dgeni.html"));
        assert_eq!(derived, PathBuf::from("/work/dgeni-check/master/api/dgeni.html"));
    }

    #[test]
    fn test_counterpart_differs_only_at_token() {
        let path = "/srv/out/dgeni/guide/intro.html";
        let locator = locator_for(Path::new("/srv/out"), "**/*.html");
        let derived = locator.counterpart_for(Path::new("guide/intro.html"));
        let derived = derived.to_string_lossy();
        let at = path.find("dgeni").unwrap();
        assert_eq!(&derived[..at], &path[..at]);
        assert_eq!(&derived[at..at + "master".len()], "master");
        assert_eq!(&derived[at + "master".len()..], &path[at + "dgeni".len()..]);
    }

    #[test]
    fn test_locate_under_root_named_like_a_variant() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("dgeni-check/dgeni/index.html").write_str("<p>a</p>").unwrap();
        temp.child("dgeni-check/master/index.html").write_str("<p>a</p>").unwrap();

        let root = temp.path().join("dgeni-check");
        let pairs = locator_for(&root, "**/*.html").locate().unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].counterpart, root.join("master/index.html"));
        assert!(pairs[0].counterpart_exists());
    }

    #[test]
    fn test_locate_finds_nested_html_sorted() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("dgeni/zeta.html").write_str("<p>z</p>").unwrap();
        temp.child("dgeni/api/alpha.html").write_str("<p>a</p>").unwrap();
        temp.child("dgeni/api/notes.txt").write_str("skip").unwrap();
        temp.child("master/api/alpha.html").write_str("<p>a</p>").unwrap();

        let pairs = locator_for(temp.path(), "**/*.html").locate().unwrap();
        let relatives: Vec<_> = pairs.iter().map(|p| p.relative.clone()).collect();
        assert_eq!(
            relatives,
            vec![PathBuf::from("api/alpha.html"), PathBuf::from("zeta.html")]
        );

        assert_eq!(pairs[0].label(), "alpha.html");
        assert!(pairs[0].counterpart_exists());
        assert_eq!(pairs[0].counterpart, temp.path().join("master/api/alpha.html"));
        assert!(!pairs[1].counterpart_exists());
    }

    #[test]
    fn test_locate_with_no_matches_is_empty() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("dgeni/readme.md").write_str("# hi").unwrap();

        let pairs = locator_for(temp.path(), "**/*.html").locate().unwrap();
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_missing_source_root_is_locate_error() {
        let temp = assert_fs::TempDir::new().unwrap();
        let result = locator_for(temp.path(), "**/*.html").locate();
        assert!(matches!(result, Err(DocdiffError::Locate(_))));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let mut config = Config::default();
        config.locate.pattern = "**/[*.html".to_string();
        let result = Locator::new(&config.variants, &config.locate);
        assert!(matches!(result, Err(DocdiffError::Glob(_))));
    }
}
