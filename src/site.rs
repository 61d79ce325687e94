//! Build orchestration.
//!
//! The build runs in two stages over the date index:
//!
//! ```text
//! 1. Scan      dates.yaml + comics/*/comic.md  →  Manifest   (parse, no writes)
//! 2. Generate  Manifest                         →  built/     (pages, assets, index)
//! ```
//!
//! Navigation, the archive and the index redirect only ever point at pages
//! that were actually written. A comic that fails to load (or a date that is
//! not a plain page name) never enters the date list. A page that fails to
//! write is dropped from the list and the other pages are rendered again.
//!
//! Failures are contained per comic. Only an unreadable date index or an
//! unwritable output directory aborts the build.

use crate::comic::{self, Comic};
use crate::config::SiteConfig;
use crate::dates::{self, DateIndex, DateIndexError};
use crate::generate::{self, ComicPage, Neighbors};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    DateIndex(#[from] DateIndexError),
    #[error("IO error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

/// Extensions copied from comic folders into the output.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "svg", "avif"];

// ============================================================================
// Stage 1: Scan
// ============================================================================

/// Everything parsed from the sources, in date order.
#[derive(Debug, Serialize)]
pub struct Manifest {
    pub comics: Vec<ManifestEntry>,
}

/// One row of the date index after loading its comic.
#[derive(Debug, Serialize)]
pub struct ManifestEntry {
    pub date: String,
    /// Comic folder name from the date index.
    pub name: String,
    /// Markdown source path.
    pub source: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comic: Option<Comic>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Manifest {
    /// Entries whose comic loaded, in date order.
    pub fn published(&self) -> impl Iterator<Item = (&ManifestEntry, &Comic)> {
        self.comics
            .iter()
            .filter_map(|entry| entry.comic.as_ref().map(|comic| (entry, comic)))
    }
}

/// Load the date index and parse every comic it names.
pub fn scan(config: &SiteConfig) -> Result<Manifest, BuildError> {
    let index = DateIndex::load(&config.dates_file)?;
    tracing::debug!(entries = index.len(), "loaded date index");
    if index.is_empty() {
        tracing::warn!(path = %config.dates_file.display(), "date index is empty");
    }
    Ok(scan_index(config, &index))
}

/// Parse every comic in `index`. Never fails as a whole.
pub fn scan_index(config: &SiteConfig, index: &DateIndex) -> Manifest {
    let comics = index
        .iter()
        .map(|(date, name)| scan_entry(config, date, name))
        .collect();
    Manifest { comics }
}

fn scan_entry(config: &SiteConfig, date: &str, name: &str) -> ManifestEntry {
    let folder = config.comics_dir.join(name);
    let source = folder.join(&config.comic_file);
    let mut entry = ManifestEntry {
        date: date.to_string(),
        name: name.to_string(),
        source,
        comic: None,
        warnings: Vec::new(),
        error: None,
    };

    if let Err(e) = dates::validate_date(date) {
        tracing::error!(date, comic = name, "skipping comic: {e}");
        entry.error = Some(e.to_string());
        return entry;
    }

    match comic::load_comic(&config.comics_dir, name, &config.comic_file) {
        Ok((comic, parse_warnings)) => {
            entry.warnings = parse_warnings.iter().map(ToString::to_string).collect();
            entry.warnings.extend(missing_image_files(&folder, &comic));
            for warning in &entry.warnings {
                tracing::warn!(date, comic = name, "{warning}");
            }
            entry.comic = Some(comic);
        }
        Err(e) => {
            tracing::error!(date, comic = name, "skipping comic: {e}");
            entry.error = Some(e.to_string());
        }
    }
    entry
}

/// Local image references with no file behind them.
fn missing_image_files(folder: &Path, comic: &Comic) -> Vec<String> {
    comic
        .panels
        .iter()
        .enumerate()
        .filter_map(|(idx, panel)| {
            let path = panel.image_path.as_deref()?;
            (!comic::is_external_ref(path) && !folder.join(path).is_file())
                .then(|| format!("panel {}: image file {path:?} not found", idx + 1))
        })
        .collect()
}

// ============================================================================
// Stage 2: Generate
// ============================================================================

/// What happened to each date during a build.
#[derive(Debug)]
pub struct BuildReport {
    pub entries: Vec<EntryReport>,
    pub index: IndexPage,
    pub assets_copied: usize,
}

#[derive(Debug)]
pub struct EntryReport {
    pub date: String,
    pub name: String,
    pub source: PathBuf,
    pub outcome: Outcome,
}

#[derive(Debug, PartialEq)]
pub enum Outcome {
    Published {
        title: String,
        panels: usize,
        page: String,
        warnings: Vec<String>,
    },
    Failed {
        error: String,
    },
}

/// What `index.html` ended up as.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexPage {
    /// Redirect to this date's page.
    Redirect(String),
    Placeholder,
}

impl BuildReport {
    pub fn published_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, Outcome::Published { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.entries.len() - self.published_count()
    }
}

/// Run the full pipeline: scan → generate.
pub fn build_site(config: &SiteConfig) -> Result<BuildReport, BuildError> {
    let manifest = scan(config)?;
    generate_site(config, &manifest)
}

/// Write the site for an already scanned manifest.
pub fn generate_site(config: &SiteConfig, manifest: &Manifest) -> Result<BuildReport, BuildError> {
    let output_dir = &config.output_dir;
    create_dir(output_dir)?;
    create_dir(&config.assets_dir())?;
    write_stylesheet(config)?;

    // Pages link to each other, so a page that cannot be written drops out
    // of the chain and the remaining pages are rendered again without it.
    let mut failures: BTreeMap<&str, String> = BTreeMap::new();
    let (dates, written) = loop {
        let pending: Vec<(&ManifestEntry, &Comic)> = manifest
            .published()
            .filter(|(entry, _)| !failures.contains_key(entry.date.as_str()))
            .collect();
        let dates: Vec<&str> = pending.iter().map(|(entry, _)| entry.date.as_str()).collect();

        let mut written: BTreeMap<&str, (String, usize)> = BTreeMap::new();
        let mut newly_failed = false;
        for (position, (entry, comic)) in pending.into_iter().enumerate() {
            let page = ComicPage {
                date: &entry.date,
                comic_name: &entry.name,
                comic,
                neighbors: Neighbors::at(&dates, position),
                archive: &dates,
            };
            match publish(config, entry, &page) {
                Ok((page_file, copied)) => {
                    tracing::debug!(date = %entry.date, page = %page_file, copied, "published");
                    written.insert(entry.date.as_str(), (page_file, copied));
                }
                Err(e) => {
                    tracing::error!(date = %entry.date, comic = %entry.name, "publishing failed: {e}");
                    failures.insert(entry.date.as_str(), e.to_string());
                    newly_failed = true;
                }
            }
        }
        if !newly_failed {
            break (dates, written);
        }
        tracing::debug!(failed = failures.len(), "re-rendering pages without unwritable dates");
    };

    let entries: Vec<EntryReport> = manifest
        .comics
        .iter()
        .map(|entry| {
            let date = entry.date.as_str();
            let outcome = match (&entry.comic, written.get(date)) {
                (Some(comic), Some((page_file, _))) => Outcome::Published {
                    title: comic.title.clone(),
                    panels: comic.panels.len(),
                    page: page_file.clone(),
                    warnings: entry.warnings.clone(),
                },
                (Some(_), None) => Outcome::Failed {
                    error: failures.get(date).cloned().unwrap_or_default(),
                },
                (None, _) => Outcome::Failed {
                    error: entry.error.clone().unwrap_or_default(),
                },
            };
            EntryReport {
                date: entry.date.clone(),
                name: entry.name.clone(),
                source: entry.source.clone(),
                outcome,
            }
        })
        .collect();
    let assets_copied: usize = written.values().map(|(_, copied)| copied).sum();

    let index = write_index(config, dates.last().copied())?;
    tracing::info!(
        published = dates.len(),
        output = %output_dir.display(),
        "site generated"
    );

    Ok(BuildReport {
        entries,
        index,
        assets_copied,
    })
}

/// Write one comic page and copy its images. Returns the page file name and
/// the number of files copied.
fn publish(
    config: &SiteConfig,
    entry: &ManifestEntry,
    page: &ComicPage<'_>,
) -> Result<(String, usize), BuildError> {
    let html = generate::render_comic_page(page, &config.site_title);
    let page_file = generate::page_file_name(&entry.date);
    write_file(&config.output_dir.join(&page_file), html.into_string().as_bytes())?;

    let src = config.comics_dir.join(&entry.name);
    let dst = config.assets_dir().join(&entry.name);
    let copied = copy_comic_assets(&src, &dst).map_err(|source| BuildError::Io {
        path: src.clone(),
        source,
    })?;
    Ok((page_file, copied))
}

fn write_index(config: &SiteConfig, latest: Option<&str>) -> Result<IndexPage, BuildError> {
    let (html, index) = match latest {
        Some(date) => (
            generate::render_index_redirect(date, &config.site_title),
            IndexPage::Redirect(date.to_string()),
        ),
        None => (
            generate::render_placeholder_index(&config.site_title),
            IndexPage::Placeholder,
        ),
    };
    write_file(
        &config.output_dir.join("index.html"),
        html.into_string().as_bytes(),
    )?;
    Ok(index)
}

/// The configured stylesheet verbatim, or the built-in one with color
/// variables.
fn write_stylesheet(config: &SiteConfig) -> Result<(), BuildError> {
    let target = config.output_dir.join(generate::STYLESHEET_FILE);
    match &config.stylesheet {
        Some(custom) => {
            fs::copy(custom, &target).map_err(|source| BuildError::Io {
                path: custom.clone(),
                source,
            })?;
        }
        None => {
            let css = format!(
                "{}\n\n{}",
                crate::config::generate_color_css(&config.colors),
                generate::STYLE_CSS
            );
            write_file(&target, css.as_bytes())?;
        }
    }
    Ok(())
}

/// Copy image files from a comic folder, keeping sub-directories. Walks in
/// file-name order so repeated builds touch files identically.
pub fn copy_comic_assets(src: &Path, dst: &Path) -> io::Result<usize> {
    let mut copied = 0;
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_image(entry.path()) {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(entry.path(), &target)?;
        copied += 1;
    }
    Ok(copied)
}

fn is_image(path: &Path) -> bool {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}

fn create_dir(path: &Path) -> Result<(), BuildError> {
    fs::create_dir_all(path).map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), BuildError> {
    fs::write(path, contents).map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })
}
