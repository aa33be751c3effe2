//! Glyph-run extraction.
//!
//! Replays a page's content-stream operators through a text state machine
//! and produces one [`GlyphRun`] per visual line: consecutive show-text
//! operations that stay on the same baseline and horizontally contiguous
//! merge into a single run; a baseline jump, a horizontal gap, or an ET
//! flushes the buffer.

use crate::content::{decode_text, parse_content_stream, Operator, TextElement};
use crate::document::Document;
use crate::error::Result;
use crate::fonts::{self, FontStyle};
use log::debug;
use std::collections::HashMap;

/// Horizontal slack, in multiples of the font size, between the open line's
/// right edge and the next show before the show starts a new run.
const MAX_SHOW_GAP_FACTOR: f32 = 1.0;

/// One extracted line of text with its recovered geometry.
///
/// Coordinates are PDF-native (bottom-up, points): `x` is the left anchor of
/// the first glyph, `y` the baseline. Runs are created fresh per extraction
/// pass and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphRun {
    /// Sequential per-page id, stable for a given document revision
    pub id: usize,
    /// Decoded text, trimmed
    pub text: String,
    /// Left anchor of the first glyph
    pub x: f32,
    /// Baseline
    pub y: f32,
    /// Advance width of the whole run
    pub width: f32,
    /// Nominal height (effective font size)
    pub height: f32,
    /// /BaseFont of the font active when the run started
    pub font_name: String,
    /// Effective font size (Tf size scaled by the text matrix)
    pub font_size: f32,
    /// Bold flag recovered from the font name
    pub bold: bool,
    /// Italic flag recovered from the font name
    pub italic: bool,
    /// 1-based page number
    pub page: u32,
    /// Page rotation in degrees
    pub rotation: i32,
}

/// Extract the glyph runs of a page, in content-stream order.
pub fn extract_runs(doc: &Document, page: u32) -> Result<Vec<GlyphRun>> {
    let fonts = doc.page_fonts(page)?;
    let rotation = doc.page_rotation(page)?;
    let content = doc.content_bytes(page)?;
    let ops = parse_content_stream(&content)?;
    let runs = runs_from_operators(&ops, &fonts, page, rotation);
    debug!("page {}: {} glyph runs", page, runs.len());
    Ok(runs)
}

/// 2D affine transform in PDF row-vector convention, `[a b c d e f]`.
#[derive(Debug, Clone, Copy)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn translation(tx: f32, ty: f32) -> Matrix {
        Matrix {
            e: tx,
            f: ty,
            ..Matrix::IDENTITY
        }
    }

    /// self × other, applied left to right as points transform.
    fn then(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn horizontal_scale(&self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }

    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

/// Graphics text state carried across operators.
struct TextState {
    text_matrix: Matrix,
    line_matrix: Matrix,
    font_resource: String,
    font_size: f32,
    char_space: f32,
    word_space: f32,
    /// Tz value, 100 = unscaled
    hscale: f32,
    leading: f32,
}

impl TextState {
    fn new() -> TextState {
        TextState {
            text_matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            font_resource: String::new(),
            font_size: 0.0,
            char_space: 0.0,
            word_space: 0.0,
            hscale: 100.0,
            leading: 0.0,
        }
    }

    fn next_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = Matrix::translation(tx, ty).then(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn effective_size(&self) -> f32 {
        let scale = self.text_matrix.vertical_scale();
        if scale > 0.0 {
            self.font_size * scale
        } else {
            self.font_size
        }
    }
}

/// Line buffer being assembled into the next run.
struct LineBuffer {
    text: String,
    x: f32,
    y: f32,
    width: f32,
    font_name: String,
    font_size: f32,
}

fn runs_from_operators(
    ops: &[Operator],
    fonts: &HashMap<String, String>,
    page: u32,
    rotation: i32,
) -> Vec<GlyphRun> {
    let mut runs: Vec<GlyphRun> = Vec::new();
    let mut state = TextState::new();
    let mut buffer: Option<LineBuffer> = None;

    let mut flush = |buffer: &mut Option<LineBuffer>, runs: &mut Vec<GlyphRun>| {
        if let Some(line) = buffer.take() {
            let text = line.text.trim();
            if !text.is_empty() {
                let style = FontStyle::from_font_name(&line.font_name);
                runs.push(GlyphRun {
                    id: runs.len(),
                    text: text.to_string(),
                    x: line.x,
                    y: line.y,
                    width: line.width,
                    height: line.font_size,
                    font_name: line.font_name,
                    font_size: line.font_size,
                    bold: style.bold,
                    italic: style.italic,
                    page,
                    rotation,
                });
            }
        }
    };

    for op in ops {
        match op {
            Operator::BeginText => {
                state.text_matrix = Matrix::IDENTITY;
                state.line_matrix = Matrix::IDENTITY;
            },
            Operator::EndText => flush(&mut buffer, &mut runs),
            Operator::Td { tx, ty } => state.next_line(*tx, *ty),
            Operator::TD { tx, ty } => {
                state.leading = -ty;
                state.next_line(*tx, *ty);
            },
            Operator::Tm { a, b, c, d, e, f } => {
                state.line_matrix = Matrix {
                    a: *a,
                    b: *b,
                    c: *c,
                    d: *d,
                    e: *e,
                    f: *f,
                };
                state.text_matrix = state.line_matrix;
            },
            Operator::TStar => {
                let leading = state.leading;
                state.next_line(0.0, -leading);
            },
            Operator::TL { leading } => state.leading = *leading,
            Operator::Tf { font, size } => {
                state.font_resource = font.clone();
                state.font_size = *size;
            },
            Operator::Tc { char_space } => state.char_space = *char_space,
            Operator::Tw { word_space } => state.word_space = *word_space,
            Operator::Tz { scale } => state.hscale = *scale,
            Operator::Tj { text } => {
                show_text(text, &mut state, fonts, &mut buffer, &mut runs, &mut flush);
            },
            Operator::Quote { text } => {
                let leading = state.leading;
                state.next_line(0.0, -leading);
                show_text(text, &mut state, fonts, &mut buffer, &mut runs, &mut flush);
            },
            Operator::DoubleQuote {
                word_space,
                char_space,
                text,
            } => {
                state.word_space = *word_space;
                state.char_space = *char_space;
                let leading = state.leading;
                state.next_line(0.0, -leading);
                show_text(text, &mut state, fonts, &mut buffer, &mut runs, &mut flush);
            },
            Operator::TJ { array } => {
                for element in array {
                    match element {
                        TextElement::String(bytes) => {
                            show_text(
                                bytes, &mut state, fonts, &mut buffer, &mut runs, &mut flush,
                            );
                        },
                        TextElement::Offset(offset) => {
                            // Thousandths of text space, positive moves left
                            let tx = -offset / 1000.0 * state.font_size * state.hscale / 100.0;
                            advance(&mut state, &mut buffer, tx);
                        },
                    }
                }
            },
            Operator::Other { .. } => {},
        }
    }
    flush(&mut buffer, &mut runs);

    runs
}

/// Shift the text matrix by a text-space advance, growing the open line.
fn advance(state: &mut TextState, buffer: &mut Option<LineBuffer>, tx: f32) {
    let device = tx * state.text_matrix.horizontal_scale();
    state.text_matrix = Matrix::translation(tx, 0.0).then(&state.text_matrix);
    if let Some(line) = buffer {
        line.width += device;
    }
}

fn show_text(
    bytes: &[u8],
    state: &mut TextState,
    fonts: &HashMap<String, String>,
    buffer: &mut Option<LineBuffer>,
    runs: &mut Vec<GlyphRun>,
    flush: &mut impl FnMut(&mut Option<LineBuffer>, &mut Vec<GlyphRun>),
) {
    let text = decode_text(bytes);
    if text.is_empty() {
        return;
    }

    let base_font = fonts
        .get(&state.font_resource)
        .cloned()
        .unwrap_or_else(|| "Helvetica".to_string());
    let metrics_font = FontStyle::from_font_name(&base_font).base14_name();
    let size = state.effective_size();
    let x = state.text_matrix.e;
    let y = state.text_matrix.f;

    // Baseline jump beyond half the line height starts a new run
    if let Some(line) = buffer.as_ref() {
        let threshold = 0.5 * line.font_size.max(size).max(1.0);
        if (y - line.y).abs() > threshold {
            flush(buffer, runs);
        }
    }

    // Same baseline is not enough: a show that lands away from the open
    // line's right edge (tab stop, second column, repositioning Td) is a
    // separate region
    if let Some(line) = buffer.as_ref() {
        let gap = x - (line.x + line.width);
        if gap.abs() > MAX_SHOW_GAP_FACTOR * line.font_size.max(size).max(1.0) {
            flush(buffer, runs);
        }
    }

    let glyph_width = fonts::text_width(&text, metrics_font, state.font_size);
    let spaces = text.chars().filter(|&c| c == ' ').count() as f32;
    let tx = (glyph_width + state.char_space * text.chars().count() as f32
        + state.word_space * spaces)
        * state.hscale
        / 100.0;

    match buffer.as_mut() {
        Some(line) => {
            // In-tolerance word gaps still move the pen; stretch the width
            // so the line's box reaches the new anchor
            if x > line.x + line.width {
                line.width = x - line.x;
            }
            line.text.push_str(&text);
        },
        None => {
            *buffer = Some(LineBuffer {
                text,
                x,
                y,
                width: 0.0,
                font_name: base_font,
                font_size: size,
            });
        },
    }

    advance(state, buffer, tx);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn helvetica_fonts() -> HashMap<String, String> {
        let mut fonts = HashMap::new();
        fonts.insert("F1".to_string(), "Helvetica".to_string());
        fonts
    }

    fn runs_of(stream: &[u8]) -> Vec<GlyphRun> {
        let ops = parse_content_stream(stream).unwrap();
        runs_from_operators(&ops, &helvetica_fonts(), 1, 0)
    }

    #[test]
    fn test_single_run() {
        let runs = runs_of(b"BT /F1 12 Tf 72 700 Td (Invoice Number: 12345) Tj ET");
        assert_eq!(runs.len(), 1);
        let run = &runs[0];
        assert_eq!(run.text, "Invoice Number: 12345");
        assert_eq!(run.x, 72.0);
        assert_eq!(run.y, 700.0);
        assert_eq!(run.font_size, 12.0);
        assert_eq!(run.font_name, "Helvetica");
        assert!(run.width > 0.0);
        assert_eq!(run.id, 0);
    }

    #[test]
    fn test_same_baseline_shows_merge() {
        let runs = runs_of(b"BT /F1 12 Tf 72 700 Td (Hello ) Tj (World) Tj ET");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "Hello World");
    }

    #[test]
    fn test_baseline_jump_splits_runs() {
        let runs = runs_of(b"BT /F1 12 Tf 72 700 Td (First) Tj 0 -20 Td (Second) Tj ET");
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].text, "First");
        assert_eq!(runs[1].text, "Second");
        assert_eq!(runs[1].y, 680.0);
        assert_eq!(runs[1].id, 1);
    }

    #[test]
    fn test_small_baseline_wobble_stays_one_run() {
        // 2 pt of rise at 12 pt is within the half-line-height threshold;
        // the Td carries the pen to the end of the previous show
        let runs = runs_of(b"BT /F1 12 Tf 72 700 Td (ab) Tj 14 2 Td (cd) Tj ET");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "abcd");
    }

    #[test]
    fn test_horizontal_jump_splits_runs() {
        // A mid-line Td to a distant tab stop is a second region even though
        // the baseline never moves
        let runs = runs_of(b"BT /F1 12 Tf 72 700 Td (Name:) Tj 300 0 Td (Date:) Tj ET");
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].text, "Name:");
        assert_eq!(runs[0].x, 72.0);
        assert_eq!(runs[1].text, "Date:");
        assert_eq!(runs[1].x, 372.0);
        assert_eq!(runs[1].y, 700.0);
    }

    #[test]
    fn test_small_word_gap_extends_width() {
        // width("ab") at 12 pt is about 14, so a 20 pt Td opens a ~6 pt gap,
        // inside the one-em slack; the line absorbs it and its width spans
        // both shows
        let runs = runs_of(b"BT /F1 12 Tf 72 700 Td (ab) Tj 20 0 Td (cd) Tj ET");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "abcd");
        let expected = 20.0 + fonts::text_width("cd", "Helvetica", 12.0);
        assert!((runs[0].width - expected).abs() < 1e-3);
    }

    #[test]
    fn test_tj_array_merges_into_one_run() {
        let runs = runs_of(b"BT /F1 12 Tf 72 700 Td [(In) -20 (voice)] TJ ET");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "Invoice");
    }

    #[test]
    fn test_tm_scales_effective_size() {
        let runs = runs_of(b"BT /F1 1 Tf 12 0 0 12 72 700 Tm (Scaled) Tj ET");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].font_size, 12.0);
        assert_eq!(runs[0].x, 72.0);
        assert_eq!(runs[0].y, 700.0);
    }

    #[test]
    fn test_quote_advances_line() {
        let runs = runs_of(b"BT /F1 12 Tf 14 TL 72 700 Td (one) Tj (two) ' ET");
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[1].text, "two");
        assert_eq!(runs[1].y, 686.0);
    }

    #[test]
    fn test_tstar_uses_leading() {
        let runs = runs_of(b"BT /F1 12 Tf 20 TL 72 700 Td (a) Tj T* (b) Tj ET");
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[1].y, 680.0);
    }

    #[test]
    fn test_width_matches_metrics() {
        let runs = runs_of(b"BT /F1 12 Tf 72 700 Td (Hi) Tj ET");
        let expected = fonts::text_width("Hi", "Helvetica", 12.0);
        assert!((runs[0].width - expected).abs() < 1e-4);
    }

    #[test]
    fn test_unknown_font_falls_back_to_helvetica() {
        let ops = parse_content_stream(b"BT /F9 12 Tf 72 700 Td (x) Tj ET").unwrap();
        let runs = runs_from_operators(&ops, &HashMap::new(), 1, 0);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].font_name, "Helvetica");
    }

    #[test]
    fn test_whitespace_only_run_dropped() {
        let runs = runs_of(b"BT /F1 12 Tf 72 700 Td (   ) Tj ET");
        assert!(runs.is_empty());
    }

    #[test]
    fn test_extraction_deterministic() {
        let stream = b"BT /F1 12 Tf 72 700 Td (Stable) Tj 0 -30 Td (Lines) Tj ET";
        assert_eq!(runs_of(stream), runs_of(stream));
    }
}
