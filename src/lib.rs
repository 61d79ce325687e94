//! # Comic Site
//!
//! A static site generator for a daily comic. A YAML date index maps
//! publication dates to comic folders; each folder holds a short markdown
//! file of alternating image and caption lines plus the images themselves.
//! The output is one HTML page per date, chained by previous/next links,
//! with an archive list on every page and an index that redirects to the
//! latest comic.
//!
//! # Architecture: Two-Stage Pipeline
//!
//! ```text
//! 1. Scan      dates.yaml + comics/<name>/comic.md  →  Manifest   (no writes)
//! 2. Generate  Manifest                              →  built/     (HTML site)
//! ```
//!
//! The manifest is serializable: `comic-site scan` prints it as JSON, which
//! is the quickest way to see how a comic file was understood.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`dates`] | Date index loading (`YYYY-MM-DD: folder` YAML map) |
//! | [`comic`] | Comic markdown parsing into a title and panels |
//! | [`site`] | Both pipeline stages: scan into a manifest, generate the output tree |
//! | [`generate`] | Maud templates for comic pages, archive, navigation and index |
//! | [`config`] | `config.toml` loading, validation and color CSS generation |
//! | [`output`] | CLI output formatting for `build` and `check` |
//! | [`watch`] | Rebuild-on-change for `comic-site watch` |
//!
//! # Design Decisions
//!
//! ## Published Dates Only
//!
//! Navigation and the archive are computed over the dates whose comic
//! actually loaded. A missing folder drops one date from the chain instead of
//! leaving broken links on its neighbors.
//!
//! ## Deterministic Output
//!
//! Rebuilding unchanged sources produces byte-identical files: dates come
//! from a sorted map, asset copies walk directories in name order, and
//! nothing time-dependent is rendered.

pub mod comic;
pub mod config;
pub mod dates;
pub mod generate;
pub mod output;
pub mod site;
pub mod watch;

#[cfg(test)]
pub(crate) mod test_helpers;
