//! HTML page generation.
//!
//! Every page is rendered with [maud](https://maud.lambda.xyz/), so all
//! interpolated text (titles, captions, dates) is escaped.
//!
//! ## Generated Pages
//!
//! - **Comic pages** (`/{date}.html`): the panels, prev/next navigation above
//!   and below, and the archive of every published date.
//! - **Index** (`/index.html`): redirects to the most recent comic, or a
//!   placeholder when nothing is published yet.
//!
//! ## Asset Paths
//!
//! Pages sit at the output root and images are copied to
//! `comics/{comic}/`, so a panel's `![alt](01.png)` in `comics/visit/comic.md`
//! becomes `<img src="comics/visit/01.png">`.

use crate::comic::{self, Comic, Panel};
use crate::config::ASSETS_DIR;
use maud::{DOCTYPE, Markup, html};

/// The default stylesheet, prefixed with color variables at build time.
pub const STYLE_CSS: &str = include_str!("../static/style.css");

/// File name of the shared stylesheet in the output directory.
pub const STYLESHEET_FILE: &str = "style.css";

/// The dates on either side of the current one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Neighbors<'a> {
    pub prev: Option<&'a str>,
    pub next: Option<&'a str>,
}

impl<'a> Neighbors<'a> {
    /// Neighbors of `dates[idx]` in an ascending date list.
    pub fn at(dates: &[&'a str], idx: usize) -> Self {
        Self {
            prev: idx.checked_sub(1).and_then(|i| dates.get(i)).copied(),
            next: dates.get(idx + 1).copied(),
        }
    }
}

/// Everything a comic page needs.
#[derive(Debug, Clone, Copy)]
pub struct ComicPage<'a> {
    pub date: &'a str,
    /// Source folder name; images live under `comics/{comic_name}/`.
    pub comic_name: &'a str,
    pub comic: &'a Comic,
    pub neighbors: Neighbors<'a>,
    /// Every published date, ascending.
    pub archive: &'a [&'a str],
}

/// Output file name for a date's page.
pub fn page_file_name(date: &str) -> String {
    format!("{date}.html")
}

/// Where a panel's image is served from, relative to the page.
pub fn image_src(comic_name: &str, image_path: &str) -> String {
    if comic::is_external_ref(image_path) {
        return image_path.to_string();
    }
    let relative = image_path.trim_start_matches("./");
    format!("{ASSETS_DIR}/{comic_name}/{relative}")
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, head_extra: Markup, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                link rel="stylesheet" href=(STYLESHEET_FILE);
                (head_extra)
            }
            body {
                (content)
            }
        }
    }
}

/// Prev/next links; a missing side is a disabled placeholder so the layout
/// does not shift between pages.
pub fn render_navigation(neighbors: Neighbors<'_>) -> Markup {
    html! {
        nav.comic-nav aria-label="Comic navigation" {
            @if let Some(prev) = neighbors.prev {
                a.nav-link.prev href=(page_file_name(prev)) rel="prev" { "← Previous" }
            } @else {
                span.nav-link.prev.disabled aria-disabled="true" { "← Previous" }
            }
            @if let Some(next) = neighbors.next {
                a.nav-link.next href=(page_file_name(next)) rel="next" { "Next →" }
            } @else {
                span.nav-link.next.disabled aria-disabled="true" { "Next →" }
            }
        }
    }
}

/// One link per published date.
pub fn render_archive(dates: &[&str], current: Option<&str>) -> Markup {
    html! {
        section.archive {
            h2 { "Archive" }
            ol.archive-list {
                @for date in dates {
                    li {
                        @if Some(*date) == current {
                            a href=(page_file_name(date)) aria-current="page" { (date) }
                        } @else {
                            a href=(page_file_name(date)) { (date) }
                        }
                    }
                }
            }
        }
    }
}

fn render_panel(comic_name: &str, panel: &Panel) -> Markup {
    let kind = panel.caption_kind.as_str();
    let alt = if panel.alt_text.is_empty() {
        panel.caption.as_str()
    } else {
        panel.alt_text.as_str()
    };
    html! {
        figure.panel {
            @if let Some(path) = &panel.image_path {
                img src=(image_src(comic_name, path)) alt=(alt);
            } @else {
                div.image-missing { "Image missing" }
            }
            figcaption {
                p.caption.(kind) data-kind=(kind) { (panel.caption) }
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders a full comic page.
pub fn render_comic_page(page: &ComicPage<'_>, site_title: &str) -> Markup {
    let comic = page.comic;
    let title = if comic.title.is_empty() {
        format!("{} · {}", page.date, site_title)
    } else {
        format!("{} · {} · {}", comic.title, page.date, site_title)
    };

    let content = html! {
        header.site-header {
            a.site-title href="index.html" { (site_title) }
        }
        main.comic-page {
            header.comic-header {
                @if !comic.title.is_empty() {
                    h1.comic-title { (comic.title) }
                }
                time.comic-date datetime=(page.date) { (page.date) }
            }
            (render_navigation(page.neighbors))
            div.panels {
                @for panel in &comic.panels {
                    (render_panel(page.comic_name, panel))
                }
            }
            (render_navigation(page.neighbors))
        }
        (render_archive(page.archive, Some(page.date)))
    };

    base_document(&title, html! {}, content)
}

/// Renders `index.html` as a redirect to the latest comic.
pub fn render_index_redirect(latest_date: &str, site_title: &str) -> Markup {
    let target = page_file_name(latest_date);
    let refresh = format!("0; url={target}");
    let content = html! {
        main.index-page {
            p {
                "Redirecting to the latest comic: "
                a href=(target) { (latest_date) }
            }
        }
    };
    base_document(
        site_title,
        html! {
            meta http-equiv="refresh" content=(refresh);
            link rel="canonical" href=(target);
        },
        content,
    )
}

/// Renders `index.html` when nothing has been published.
pub fn render_placeholder_index(site_title: &str) -> Markup {
    let content = html! {
        header.site-header {
            span.site-title { (site_title) }
        }
        main.index-page {
            p.placeholder { "No comics have been published yet." }
        }
    };
    base_document(site_title, html! {}, content)
}

// ============================================================================
// Tests
// ============================================================================
