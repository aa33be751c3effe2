//! Overlay composition.
//!
//! Erase-and-redraw replacement: paints an opaque white rectangle over the
//! matched text, then draws the replacement at the original baseline in a
//! substituted standard-14 font. The instructions go into one new content
//! stream appended after the page's existing ones, so nothing already on the
//! page is altered and sequential edits compose additively.

use crate::content::{encode_text, serialize_literal_string};
use crate::document::Document;
use crate::error::Result;
use crate::fonts::{self, FontStyle};
use crate::geometry::Rect;
use crate::resolve::ResolvedPlacement;
use log::debug;
use std::fmt::Write as _;

/// Cover-rectangle paddings, in points. Each tuned on real documents; all
/// must stay at 2 pt or above or glyph antialiasing fringes survive the
/// cover.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayConfig {
    /// How far the cover extends left of the text anchor
    pub cover_left_inset: f32,
    /// Extra width beyond the wider of the matched and replacement text
    pub cover_width_pad: f32,
    /// How far the cover extends below the baseline, for descenders
    pub cover_baseline_drop: f32,
    /// Extra height beyond the font size
    pub cover_height_pad: f32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        OverlayConfig {
            cover_left_inset: 2.0,
            cover_width_pad: 6.0,
            cover_baseline_drop: 3.0,
            cover_height_pad: 6.0,
        }
    }
}

/// Compute the cover rectangle for a placement and a measured replacement
/// width.
pub fn cover_rect(
    placement: &ResolvedPlacement,
    measured_width: f32,
    config: &OverlayConfig,
) -> Rect {
    Rect::new(
        placement.x - config.cover_left_inset,
        placement.baseline - config.cover_baseline_drop,
        placement.width.max(measured_width) + config.cover_width_pad,
        placement.font_size + config.cover_height_pad,
    )
}

/// Append a cover-and-redraw overlay for `new_text` at the placement.
pub fn compose(
    doc: &mut Document,
    page: u32,
    placement: &ResolvedPlacement,
    style: &FontStyle,
    new_text: &str,
    config: &OverlayConfig,
) -> Result<()> {
    let base_font = style.base14_name();
    let measured = fonts::text_width(new_text, base_font, placement.font_size);
    let cover = cover_rect(placement, measured, config);
    let resource = doc.ensure_base14_font(page, style)?;

    let mut stream = String::new();
    // Cover rectangle in white
    let _ = writeln!(stream, "q");
    let _ = writeln!(stream, "1 1 1 rg");
    let _ = writeln!(
        stream,
        "{:.2} {:.2} {:.2} {:.2} re",
        cover.x, cover.y, cover.width, cover.height
    );
    let _ = writeln!(stream, "f");
    let _ = writeln!(stream, "Q");
    // Replacement text at the original baseline
    let _ = writeln!(stream, "BT");
    let _ = writeln!(stream, "0 0 0 rg");
    let _ = writeln!(stream, "/{} {:.2} Tf", resource, placement.font_size);
    let _ = writeln!(stream, "{:.2} {:.2} Td", placement.x, placement.baseline);

    let mut bytes = stream.into_bytes();
    bytes.extend_from_slice(&serialize_literal_string(&encode_text(new_text)));
    bytes.extend_from_slice(b" Tj\nET\n");

    debug!(
        "overlay on page {}: cover ({:.1}, {:.1}) {}x{}, text {:?} as /{} at {:.1} pt",
        page, cover.x, cover.y, cover.width, cover.height, new_text, resource, placement.font_size
    );
    doc.append_content(page, bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placement() -> ResolvedPlacement {
        ResolvedPlacement {
            x: 72.0,
            baseline: 700.0,
            width: 50.0,
            height: 12.0,
            font_size: 12.0,
        }
    }

    #[test]
    fn test_cover_contains_match_rect() {
        let p = placement();
        let cover = cover_rect(&p, 30.0, &OverlayConfig::default());
        let matched = Rect::new(p.x, p.baseline, p.width, p.font_size);
        assert!(cover.contains(&matched));
    }

    #[test]
    fn test_cover_contains_wider_replacement() {
        let p = placement();
        let measured = 80.0;
        let cover = cover_rect(&p, measured, &OverlayConfig::default());
        let replacement = Rect::new(p.x, p.baseline, measured, p.font_size);
        assert!(cover.contains(&replacement));
        assert!(cover.width >= measured + 6.0);
    }

    #[test]
    fn test_cover_extends_below_baseline() {
        let cover = cover_rect(&placement(), 0.0, &OverlayConfig::default());
        assert_eq!(cover.y, 697.0);
        assert_eq!(cover.x, 70.0);
        assert_eq!(cover.height, 18.0);
    }

    #[test]
    fn test_default_paddings_at_least_two_points() {
        let config = OverlayConfig::default();
        assert!(config.cover_left_inset >= 2.0);
        assert!(config.cover_width_pad >= 2.0);
        assert!(config.cover_baseline_drop >= 2.0);
        assert!(config.cover_height_pad >= 2.0);
    }
}
