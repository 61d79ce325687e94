//! Comic markdown parsing.
//!
//! A comic is a small markdown file: a title line followed by alternating
//! image and caption lines.
//!
//! ```markdown
//! # The Visit
//!
//! ![door](01-door.png)
//! "Anyone home?"
//!
//! ![hall](02-hall.png)
//! Nobody answered.
//! ```
//!
//! Blank lines are ignored, so pairs may be separated or packed together.
//! The parser never fails: anything odd about the document is reported as a
//! [`ParseWarning`] next to the best-effort [`Comic`].

use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComicError {
    #[error("comic folder name {0:?} is not a plain directory name")]
    InvalidName(String),
    #[error("comic folder not found: {0}")]
    MissingFolder(PathBuf),
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// One dated installment.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Comic {
    /// Empty when the document was empty.
    pub title: String,
    pub panels: Vec<Panel>,
}

/// A single image + caption unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub caption: String,
    pub caption_kind: CaptionKind,
    /// `None` when the image line had no usable `![alt](path)`.
    pub image_path: Option<String>,
    pub alt_text: String,
}

/// Image references that point outside the comic folder: root-relative
/// paths and anything with a URI scheme (`https:`, `data:`, ...).
pub fn is_external_ref(path: &str) -> bool {
    if path.starts_with('/') {
        return true;
    }
    let Some((scheme, _)) = path.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// How a caption reads: spoken (`"..."`) or narration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionKind {
    Quote,
    Narration,
}

impl CaptionKind {
    /// Classify a caption. Quotes are wrapped in straight double quotes.
    pub fn of(caption: &str) -> Self {
        if caption.len() >= 2 && caption.starts_with('"') && caption.ends_with('"') {
            CaptionKind::Quote
        } else {
            CaptionKind::Narration
        }
    }

    /// CSS class / attribute value.
    pub fn as_str(self) -> &'static str {
        match self {
            CaptionKind::Quote => "quote",
            CaptionKind::Narration => "narration",
        }
    }
}

/// Non-fatal problems found while parsing. Line numbers are 1-based and
/// refer to the source document.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseWarning {
    EmptyDocument,
    MissingImage { line: usize, text: String },
    UnpairedLine { line: usize, text: String },
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseWarning::EmptyDocument => write!(f, "document is empty"),
            ParseWarning::MissingImage { line, text } => {
                write!(f, "line {line}: no image reference in {text:?}")
            }
            ParseWarning::UnpairedLine { line, text } => {
                write!(f, "line {line}: trailing line {text:?} has no partner, dropped")
            }
        }
    }
}

/// Parse a comic document. Always produces a comic; problems come back as
/// warnings.
pub fn parse_comic(input: &str) -> (Comic, Vec<ParseWarning>) {
    let mut warnings = Vec::new();
    let mut lines = input
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let Some((_, first)) = lines.next() else {
        warnings.push(ParseWarning::EmptyDocument);
        return (Comic::default(), warnings);
    };
    let title = match first.strip_prefix('#') {
        Some(rest) => rest.trim_start_matches('#').trim().to_string(),
        None => first.to_string(),
    };

    let body: Vec<(usize, &str)> = lines.collect();
    let pairs = body.chunks_exact(2);
    let leftover = pairs.remainder();

    let mut panels = Vec::with_capacity(body.len() / 2);
    for pair in pairs {
        let [(image_line, image_text), (_, caption)] = *pair else {
            continue;
        };
        let image = extract_image(image_text);
        if image.is_none() {
            warnings.push(ParseWarning::MissingImage {
                line: image_line,
                text: image_text.to_string(),
            });
        }
        let (image_path, alt_text) = image.unzip();
        panels.push(Panel {
            caption: caption.to_string(),
            caption_kind: CaptionKind::of(caption),
            image_path,
            alt_text: alt_text.unwrap_or_default(),
        });
    }
    if let [(line, text)] = *leftover {
        warnings.push(ParseWarning::UnpairedLine {
            line,
            text: text.to_string(),
        });
    }

    (Comic { title, panels }, warnings)
}

/// Pull `(path, alt)` out of the first inline image on a line. Empty paths
/// count as no image.
fn extract_image(line: &str) -> Option<(String, String)> {
    let mut events = Parser::new(line);
    let dest = events.by_ref().find_map(|event| match event {
        Event::Start(Tag::Image { dest_url, .. }) => Some(dest_url.into_string()),
        _ => None,
    })?;

    let mut alt = String::new();
    for event in events {
        match event {
            Event::End(TagEnd::Image) => break,
            Event::Text(text) | Event::Code(text) => alt.push_str(&text),
            _ => {}
        }
    }

    if dest.trim().is_empty() {
        None
    } else {
        Some((dest, alt))
    }
}

/// Read and parse `{comics_dir}/{name}/{file}`.
pub fn load_comic(
    comics_dir: &Path,
    name: &str,
    file: &str,
) -> Result<(Comic, Vec<ParseWarning>), ComicError> {
    let folder = comic_folder(comics_dir, name)?;
    let path = folder.join(file);
    let content = fs::read_to_string(&path).map_err(|source| ComicError::Io { path, source })?;
    Ok(parse_comic(&content))
}

/// Resolve a comic's source folder, refusing names that would escape
/// `comics_dir`.
pub fn comic_folder(comics_dir: &Path, name: &str) -> Result<PathBuf, ComicError> {
    if name.trim().is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
    {
        return Err(ComicError::InvalidName(name.to_string()));
    }
    let folder = comics_dir.join(name);
    if !folder.is_dir() {
        return Err(ComicError::MissingFolder(folder));
    }
    Ok(folder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn lines(input: &[&str]) -> String {
        input.join("\n")
    }

    #[test]
    fn parses_title_and_panels() {
        let input = lines(&["# Title", "![x](a.png)", "\"Hello\"", "![x](b.png)", "Bye."]);
        let (comic, warnings) = parse_comic(&input);

        assert!(warnings.is_empty());
        assert_eq!(comic.title, "Title");
        assert_eq!(
            comic.panels,
            vec![
                Panel {
                    caption: "\"Hello\"".to_string(),
                    caption_kind: CaptionKind::Quote,
                    image_path: Some("a.png".to_string()),
                    alt_text: "x".to_string(),
                },
                Panel {
                    caption: "Bye.".to_string(),
                    caption_kind: CaptionKind::Narration,
                    image_path: Some("b.png".to_string()),
                    alt_text: "x".to_string(),
                },
            ]
        );
    }

    #[test]
    fn title_without_heading_marker_is_whole_line() {
        let (comic, _) = parse_comic("A Quiet Day\n![x](a.png)\nSun.");
        assert_eq!(comic.title, "A Quiet Day");
    }

    #[test]
    fn deeper_heading_markers_are_stripped() {
        let (comic, _) = parse_comic("###   Deep  \n");
        assert_eq!(comic.title, "Deep");
    }

    #[test]
    fn blank_lines_and_indentation_are_ignored() {
        let input = "\n\n  # Spaced  \n\n   ![one](1.png)   \n\n  Caption one  \n\n";
        let (comic, warnings) = parse_comic(input);
        assert!(warnings.is_empty());
        assert_eq!(comic.title, "Spaced");
        assert_eq!(comic.panels.len(), 1);
        assert_eq!(comic.panels[0].image_path.as_deref(), Some("1.png"));
        assert_eq!(comic.panels[0].caption, "Caption one");
    }

    #[test]
    fn panel_count_matches_pairs_in_order() {
        let mut input = vec!["# Many".to_string()];
        for i in 0..7 {
            input.push(format!("![p{i}](p{i}.png)"));
            input.push(format!("caption {i}"));
        }
        let (comic, warnings) = parse_comic(&input.join("\n"));

        assert!(warnings.is_empty());
        assert_eq!(comic.panels.len(), 7);
        for (i, panel) in comic.panels.iter().enumerate() {
            assert_eq!(panel.caption, format!("caption {i}"));
            assert_eq!(panel.image_path, Some(format!("p{i}.png")));
        }
    }

    #[test]
    fn unmatched_image_line_keeps_the_caption() {
        let input = lines(&["# T", "just words", "First.", "![b](b.png)", "Second."]);
        let (comic, warnings) = parse_comic(&input);

        assert_eq!(comic.panels.len(), 2);
        assert_eq!(comic.panels[0].image_path, None);
        assert_eq!(comic.panels[0].caption, "First.");
        assert_eq!(comic.panels[1].image_path.as_deref(), Some("b.png"));
        assert_eq!(
            warnings,
            vec![ParseWarning::MissingImage {
                line: 2,
                text: "just words".to_string()
            }]
        );
    }

    #[test]
    fn plain_link_is_not_an_image() {
        let (comic, warnings) = parse_comic("# T\n[x](a.png)\nCaption");
        assert_eq!(comic.panels[0].image_path, None);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn empty_image_path_is_missing() {
        let (comic, warnings) = parse_comic("# T\n![x]()\nCaption");
        assert_eq!(comic.panels[0].image_path, None);
        assert!(matches!(warnings[0], ParseWarning::MissingImage { .. }));
    }

    #[test]
    fn image_inside_surrounding_text_is_found() {
        let (comic, warnings) = parse_comic("# T\nPanel: ![the *door*](img/door.png) (wide)\nKnock.");
        assert!(warnings.is_empty());
        assert_eq!(comic.panels[0].image_path.as_deref(), Some("img/door.png"));
        assert_eq!(comic.panels[0].alt_text, "the door");
    }

    #[test]
    fn external_refs_have_a_scheme_or_leading_slash() {
        assert!(is_external_ref("https://cdn.test/a.png"));
        assert!(is_external_ref("data:image/png;base64,iVBORw0KGgo="));
        assert!(is_external_ref("/shared/logo.svg"));
        assert!(is_external_ref("//cdn.test/a.png"));
        assert!(!is_external_ref("01.png"));
        assert!(!is_external_ref("./panels/01.png"));
        assert!(!is_external_ref("panels/at 10:30.png"));
        assert!(!is_external_ref("1x:odd.png"));
        assert!(!is_external_ref(":weird.png"));
    }

    #[test]
    fn trailing_unpaired_line_is_dropped() {
        let input = lines(&["# T", "![a](a.png)", "One.", "![b](b.png)"]);
        let (comic, warnings) = parse_comic(&input);

        assert_eq!(comic.panels.len(), 1);
        assert_eq!(
            warnings,
            vec![ParseWarning::UnpairedLine {
                line: 4,
                text: "![b](b.png)".to_string()
            }]
        );
    }

    #[test]
    fn empty_input_yields_empty_comic() {
        let (comic, warnings) = parse_comic("  \n\n\t\n");
        assert_eq!(comic, Comic::default());
        assert_eq!(warnings, vec![ParseWarning::EmptyDocument]);
    }

    #[test]
    fn title_only_has_no_panels_and_no_warnings() {
        let (comic, warnings) = parse_comic("# Just a title\n");
        assert_eq!(comic.title, "Just a title");
        assert!(comic.panels.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn caption_kind_classification() {
        assert_eq!(CaptionKind::of("\"Hello\""), CaptionKind::Quote);
        assert_eq!(CaptionKind::of("\"\""), CaptionKind::Quote);
        assert_eq!(CaptionKind::of("\""), CaptionKind::Narration);
        assert_eq!(CaptionKind::of("\"Hello"), CaptionKind::Narration);
        assert_eq!(CaptionKind::of("He said \"hi\""), CaptionKind::Narration);
        assert_eq!(CaptionKind::of("'single'"), CaptionKind::Narration);
        assert_eq!(CaptionKind::of(""), CaptionKind::Narration);
    }

    #[test]
    fn warnings_render_line_numbers() {
        let warning = ParseWarning::MissingImage {
            line: 3,
            text: "oops".to_string(),
        };
        assert_eq!(warning.to_string(), r#"line 3: no image reference in "oops""#);
    }

    #[test]
    fn comic_serializes_caption_kind_lowercase() {
        let (comic, _) = parse_comic("# T\n![a](a.png)\n\"Hi\"");
        let json = serde_json::to_string(&comic).unwrap();
        assert!(json.contains(r#""caption_kind":"quote""#));
        assert!(json.contains(r#""image_path":"a.png""#));
    }

    #[test]
    fn load_comic_reads_folder() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("visit")).unwrap();
        fs::write(tmp.path().join("visit/comic.md"), "# Visit\n![a](a.png)\nHi.").unwrap();

        let (comic, warnings) = load_comic(tmp.path(), "visit", "comic.md").unwrap();
        assert_eq!(comic.title, "Visit");
        assert_eq!(comic.panels.len(), 1);
        assert!(warnings.is_empty());
    }

    #[test]
    fn load_comic_missing_folder() {
        let tmp = TempDir::new().unwrap();
        let result = load_comic(tmp.path(), "nope", "comic.md");
        assert!(matches!(result, Err(ComicError::MissingFolder(_))));
    }

    #[test]
    fn load_comic_missing_markdown() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("visit")).unwrap();
        let result = load_comic(tmp.path(), "visit", "comic.md");
        assert!(matches!(result, Err(ComicError::Io { .. })));
    }

    #[test]
    fn comic_folder_rejects_escaping_names() {
        let tmp = TempDir::new().unwrap();
        for name in ["", "  ", ".", "..", "../etc", "a/b", "a\\b"] {
            assert!(
                matches!(comic_folder(tmp.path(), name), Err(ComicError::InvalidName(_))),
                "{name:?} should be rejected"
            );
        }
    }
}
