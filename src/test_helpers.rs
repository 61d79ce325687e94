//! Shared test utilities for the comic-site test suite.
//!
//! [`SiteFixture`] lays out an isolated project in a temp directory with a
//! config already pointing at it:
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let site = SiteFixture::new();
//! site.dates("2024-01-01: visit\n");
//! site.comic("visit", "# Visit\n![door](01.png)\nKnock.", &["01.png"]);
//!
//! let report = build_site(&site.config).unwrap();
//! assert!(site.read_output("2024-01-01.html").contains("Knock."));
//! ```

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::config::SiteConfig;

/// A throwaway project: `comics/`, `comics/dates.yaml` and `built/` under
/// one temp directory.
pub struct SiteFixture {
    tmp: TempDir,
    pub config: SiteConfig,
}

impl SiteFixture {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let comics_dir = tmp.path().join("comics");
        fs::create_dir_all(&comics_dir).unwrap();
        let config = SiteConfig {
            dates_file: comics_dir.join("dates.yaml"),
            comics_dir,
            output_dir: tmp.path().join("built"),
            ..SiteConfig::default()
        };
        Self { tmp, config }
    }

    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    /// Write the date index.
    pub fn dates(&self, yaml: &str) {
        fs::write(&self.config.dates_file, yaml).unwrap();
    }

    /// Create a comic folder with its markdown and the given image files.
    /// Image contents are the file's own relative path, which is enough to
    /// check copies.
    pub fn comic(&self, name: &str, markdown: &str, images: &[&str]) {
        let folder = self.config.comics_dir.join(name);
        fs::create_dir_all(&folder).unwrap();
        fs::write(folder.join(&self.config.comic_file), markdown).unwrap();
        for image in images {
            let path = folder.join(image);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, image.as_bytes()).unwrap();
        }
    }

    /// Read a generated file, panicking with the path on failure.
    pub fn read_output(&self, relative: &str) -> String {
        let path = self.config.output_dir.join(relative);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("cannot read output {}: {e}", path.display()))
    }
}
