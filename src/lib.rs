// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::too_many_arguments)]
#![allow(clippy::match_like_matches_macro)]
#![cfg_attr(test, allow(dead_code))]

//! # pdf_retext
//!
//! In-place PDF text replacement: locate a string on a page with glyph
//! precision, recover its geometry and font, then either cover-and-redraw it
//! or rewrite the content stream's string operands exactly.
//!
//! ## Pipeline
//!
//! - **Extraction**: replay the page's content-stream operators through a
//!   text state machine and group show operations into baseline-stable
//!   glyph runs
//! - **Location**: four matching tiers, from exact containment down to
//!   character-overlap scoring, first success wins
//! - **Resolution**: normalize the match into page space (coordinate
//!   regime, font-size plausibility floor, /Rotate remapping)
//! - **Composition**: append one overlay stream painting a white cover
//!   rectangle and the replacement text at the original baseline
//! - **Rewriting**: the exact-edit alternative, splicing only the matched
//!   string tokens and preserving every other stream byte
//!
//! ## Quick Start
//!
//! ```ignore
//! use pdf_retext::session::EditSession;
//!
//! # fn main() -> pdf_retext::Result<()> {
//! let mut session = EditSession::open("invoice.pdf");
//! session.replace("Invoice Number: 12345", "Invoice Number: 99999-A", 0)?;
//! session.save("invoice-fixed.pdf")?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod content;
pub mod document;
pub mod error;
pub mod extract;
pub mod fonts;
pub mod geometry;
pub mod locate;
pub mod overlay;
pub mod resolve;
pub mod rewrite;
pub mod session;

pub use api::{
    extract_text_elements, inspect_text, replace_text, replace_text_advanced, replace_text_exact,
    save_document, DocumentText, InspectResult, PageText, ReplaceOptions, TextElementInfo,
};
pub use document::Document;
pub use error::{Error, Result};
pub use extract::GlyphRun;
pub use fonts::{FontFamily, FontStyle};
pub use geometry::{Point, Rect};
pub use locate::{MatchTier, TextMatch};
pub use overlay::OverlayConfig;
pub use resolve::{CoordRegime, ResolvedPlacement};
pub use session::{EditRecord, EditSession};
