//! Operation boundary.
//!
//! Free functions called by the embedding UI layer, one per user-visible
//! operation. Each opens its own [`Document`], runs a complete
//! load-transform-save cycle, and closes the handle on every exit path.
//! Page numbers here are zero-indexed and validated before any decode work;
//! results are serde-serializable for marshalling across the UI bridge.

use crate::document::Document;
use crate::error::{Error, Result};
use crate::extract;
use crate::fonts::FontStyle;
use crate::locate;
use crate::overlay::{self, OverlayConfig};
use crate::resolve::{self, CoordRegime};
use crate::rewrite;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One extracted text element, as shown to the UI.
#[derive(Debug, Clone, Serialize)]
pub struct TextElementInfo {
    /// Stable per-page id
    pub id: usize,
    /// Decoded text
    pub content: String,
    /// Left anchor, PDF points
    pub x: f32,
    /// Baseline, bottom-up PDF points
    pub y: f32,
    /// Advance width
    pub width: f32,
    /// Nominal height
    pub height: f32,
    /// Effective font size
    pub font_size: f32,
}

/// Text elements of one page.
#[derive(Debug, Clone, Serialize)]
pub struct PageText {
    /// Zero-indexed page number
    pub number: u32,
    /// Page width in points
    pub width: f32,
    /// Page height in points
    pub height: f32,
    /// Elements in content-stream order
    pub elements: Vec<TextElementInfo>,
}

/// Text elements of a whole document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentText {
    /// Number of pages
    pub page_count: usize,
    /// Per-page elements
    pub pages: Vec<PageText>,
}

/// What a search string looks like on the page, without modifying anything.
#[derive(Debug, Clone, Serialize)]
pub struct InspectResult {
    /// Whether any run matched
    pub found: bool,
    /// Effective font size of the match
    pub font_size: f32,
    /// Bold flag recovered from the font name
    pub bold: bool,
    /// Italic flag recovered from the font name
    pub italic: bool,
    /// Left anchor of the match
    pub x: f32,
    /// Baseline of the match
    pub y: f32,
    /// Advance width of the matched run
    pub width: f32,
    /// Page rotation in degrees
    pub rotation: i32,
}

/// Optional overrides for [`replace_text_advanced`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplaceOptions {
    /// Override the resolved font size
    pub font_size: Option<f32>,
    /// Override the recovered bold flag
    pub bold: Option<bool>,
    /// Override the recovered italic flag
    pub italic: Option<bool>,
    /// Horizontal shift, or absolute x when `absolute` is set
    pub x_offset: f32,
    /// Vertical shift, or absolute baseline when `absolute` is set
    pub y_offset: f32,
    /// Treat the offsets as an absolute (x, baseline) position
    pub absolute: bool,
}

/// Extract every text element of the document.
pub fn extract_text_elements<P: AsRef<Path>>(path: P) -> Result<DocumentText> {
    let doc = Document::open(path)?;
    let page_count = doc.page_count();

    let mut pages = Vec::with_capacity(page_count);
    for page in 1..=page_count as u32 {
        let (width, height) = doc.page_size(page)?;
        let elements = extract::extract_runs(&doc, page)?
            .into_iter()
            .map(|run| TextElementInfo {
                id: run.id,
                content: run.text,
                x: run.x,
                y: run.y,
                width: run.width,
                height: run.height,
                font_size: run.font_size,
            })
            .collect();
        pages.push(PageText {
            number: page - 1,
            width,
            height,
            elements,
        });
    }

    Ok(DocumentText { page_count, pages })
}

/// Report the geometry and style of a search string on a page.
///
/// A miss is not an error here: the UI probes before offering an edit, so
/// the result carries a `found` flag instead.
pub fn inspect_text<P: AsRef<Path>>(path: P, search: &str, page: u32) -> Result<InspectResult> {
    let doc = Document::open(path)?;
    let page_number = checked_page(&doc, page)?;
    let runs = extract::extract_runs(&doc, page_number)?;

    match locate::locate(&runs, search) {
        Some(found) => {
            let span = found.matched_run();
            Ok(InspectResult {
                found: true,
                font_size: span.font_size,
                bold: span.bold,
                italic: span.italic,
                x: span.x,
                y: span.y,
                width: span.width,
                rotation: span.rotation,
            })
        },
        None => Ok(InspectResult {
            found: false,
            font_size: 0.0,
            bold: false,
            italic: false,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            rotation: 0,
        }),
    }
}

/// Replace `search` with `new_text` using the overlay strategy.
///
/// On success a new scratch file is written and its path returned; the input
/// file is never modified.
pub fn replace_text<P: AsRef<Path>>(
    path: P,
    search: &str,
    new_text: &str,
    page: u32,
) -> Result<PathBuf> {
    replace_text_advanced(path, search, new_text, page, &ReplaceOptions::default())
}

/// [`replace_text`] with style and position overrides.
pub fn replace_text_advanced<P: AsRef<Path>>(
    path: P,
    search: &str,
    new_text: &str,
    page: u32,
    options: &ReplaceOptions,
) -> Result<PathBuf> {
    let mut doc = Document::open(path)?;
    let page_number = checked_page(&doc, page)?;

    let runs = extract::extract_runs(&doc, page_number)?;
    let found = locate::locate(&runs, search).ok_or_else(|| Error::NotFound {
        search: search.to_string(),
        page,
    })?;

    // Narrow a mid-run match to the matched span so the cover leaves the
    // rest of the line alone
    let target = found.matched_run();
    let (page_width, page_height) = doc.page_size(page_number)?;
    let mut placement = resolve::resolve(&target, CoordRegime::PdfNative, page_width, page_height)?;
    if let Some(size) = options.font_size {
        placement.font_size = size;
    }
    if options.absolute {
        placement.x = options.x_offset;
        placement.baseline = options.y_offset;
    } else {
        placement.x += options.x_offset;
        placement.baseline += options.y_offset;
    }

    let mut style = FontStyle::from_font_name(&target.font_name);
    if let Some(bold) = options.bold {
        style.bold = bold;
    }
    if let Some(italic) = options.italic {
        style.italic = italic;
    }

    overlay::compose(
        &mut doc,
        page_number,
        &placement,
        &style,
        new_text,
        &OverlayConfig::default(),
    )?;
    save_scratch(&mut doc)
}

/// Replace `search` with `new_text` by rewriting the content stream's string
/// operands in place.
pub fn replace_text_exact<P: AsRef<Path>>(
    path: P,
    search: &str,
    new_text: &str,
    page: u32,
) -> Result<PathBuf> {
    let mut doc = Document::open(path)?;
    let page_number = checked_page(&doc, page)?;

    if !rewrite::rewrite_page(&mut doc, page_number, search, new_text)? {
        return Err(Error::NotFound {
            search: search.to_string(),
            page,
        });
    }
    save_scratch(&mut doc)
}

/// Copy the current document bytes to `output`.
///
/// A plain byte copy staged through a scratch file, so a failing write never
/// leaves a partial file at the destination.
pub fn save_document<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<()> {
    let output = output.as_ref();
    let dir = output.parent().unwrap_or_else(|| Path::new("."));
    let scratch = dir.join(format!(".{}.pdf.tmp", uuid::Uuid::new_v4()));

    std::fs::copy(input, &scratch)?;
    match std::fs::rename(&scratch, output) {
        Ok(()) => Ok(()),
        Err(e) => {
            let _ = std::fs::remove_file(&scratch);
            Err(e.into())
        },
    }
}

/// Validate a zero-indexed page number, returning the 1-based one the
/// document layer uses.
fn checked_page(doc: &Document, page: u32) -> Result<u32> {
    let count = doc.page_count();
    if (page as usize) < count {
        Ok(page + 1)
    } else {
        Err(Error::InvalidPage { page, count })
    }
}

/// Write the document to a uuid-named scratch file in the temp dir.
fn save_scratch(doc: &mut Document) -> Result<PathBuf> {
    let path = std::env::temp_dir().join(format!("{}.pdf", uuid::Uuid::new_v4()));
    doc.save(&path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_text_serializes_for_the_bridge() {
        let text = DocumentText {
            page_count: 1,
            pages: vec![PageText {
                number: 0,
                width: 612.0,
                height: 792.0,
                elements: vec![TextElementInfo {
                    id: 0,
                    content: "Total: $100".to_string(),
                    x: 72.0,
                    y: 700.0,
                    width: 58.7,
                    height: 12.0,
                    font_size: 12.0,
                }],
            }],
        };
        let json = serde_json::to_value(&text).unwrap();
        assert_eq!(json["page_count"], 1);
        assert_eq!(json["pages"][0]["number"], 0);
        assert_eq!(json["pages"][0]["elements"][0]["content"], "Total: $100");
    }

    #[test]
    fn test_replace_options_round_trip() {
        let options = ReplaceOptions {
            font_size: Some(14.0),
            bold: Some(true),
            italic: None,
            x_offset: 3.0,
            y_offset: -1.5,
            absolute: false,
        };
        let json = serde_json::to_string(&options).unwrap();
        let back: ReplaceOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back.font_size, Some(14.0));
        assert_eq!(back.bold, Some(true));
        assert_eq!(back.x_offset, 3.0);
        assert!(!back.absolute);
    }

    #[test]
    fn test_replace_options_default_is_neutral() {
        let options = ReplaceOptions::default();
        assert!(options.font_size.is_none());
        assert_eq!(options.x_offset, 0.0);
        assert!(!options.absolute);
    }
}
