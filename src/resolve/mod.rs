//! Geometry resolution.
//!
//! Normalizes a located run's geometry into the page-space placement the
//! compositor draws at. The extraction backend declares its coordinate
//! regime once; it is never inferred per call.

use crate::error::{Error, Result};
use crate::extract::GlyphRun;
use crate::geometry::{rotate_point, rotated_extent, Point};
use log::debug;

/// Font sizes below this are treated as a scale-recovery failure.
pub const MIN_PLAUSIBLE_FONT_SIZE: f32 = 6.0;

/// Size substituted when the recovered size is implausible.
pub const FALLBACK_FONT_SIZE: f32 = 10.0;

/// Fraction of the glyph height above the baseline reserved as ascent when
/// deriving a baseline from a top-down bounding box.
pub const BASELINE_RISE_FACTOR: f32 = 0.15;

/// Coordinate regime of the extraction backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordRegime {
    /// Bottom-up, y is the baseline (the content-stream extractor)
    PdfNative,
    /// Top-down, y is the top edge of the glyph box
    TopDown,
}

/// Page-space placement for the compositor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedPlacement {
    /// Left anchor
    pub x: f32,
    /// Baseline, bottom-up
    pub baseline: f32,
    /// Advance width of the matched run
    pub width: f32,
    /// Nominal glyph height
    pub height: f32,
    /// Effective font size after the plausibility floor
    pub font_size: f32,
}

/// Resolve a run's geometry into page space.
///
/// Applies the regime's baseline convention and the font-size plausibility
/// floor. PdfNative coordinates come straight out of the content stream and
/// already live in the stored frame the compositor draws into, so /Rotate
/// never touches them. TopDown coordinates describe the page as displayed;
/// on a rotated page they are mapped back into the stored frame.
pub fn resolve(
    run: &GlyphRun,
    regime: CoordRegime,
    page_width: f32,
    page_height: f32,
) -> Result<ResolvedPlacement> {
    let font_size = if run.font_size < MIN_PLAUSIBLE_FONT_SIZE {
        debug!(
            "font size {} below plausibility floor, using {}",
            run.font_size, FALLBACK_FONT_SIZE
        );
        FALLBACK_FONT_SIZE
    } else {
        run.font_size
    };
    let height = if run.height < MIN_PLAUSIBLE_FONT_SIZE {
        font_size
    } else {
        run.height
    };

    let anchor = match regime {
        CoordRegime::PdfNative => Point::new(run.x, run.y),
        CoordRegime::TopDown => {
            // The displayed frame swaps dimensions at 90/270. Flip the top
            // edge to a bottom-up baseline there, then undo the display
            // rotation to land in the stored frame.
            let (display_width, display_height) =
                rotated_extent(run.rotation, page_width, page_height);
            let flipped = Point::new(
                run.x,
                display_height - (run.y + height * (1.0 - BASELINE_RISE_FACTOR)),
            );
            rotate_point(flipped, -run.rotation, display_width, display_height)
        }
    };

    if !anchor.x.is_finite() || !anchor.y.is_finite() {
        return Err(Error::Decode(format!(
            "non-finite placement for run {} on page {}",
            run.id, run.page
        )));
    }

    let placement = ResolvedPlacement {
        x: anchor.x,
        baseline: anchor.y,
        width: run.width.max(0.0),
        height,
        font_size,
    };
    debug!(
        "resolved run {} to ({:.2}, {:.2}) size {:.1}",
        run.id, placement.x, placement.baseline, placement.font_size
    );
    Ok(placement)
}
