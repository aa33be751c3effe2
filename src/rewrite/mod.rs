//! In-place content-stream rewriting.
//!
//! The exact-edit strategy: instead of covering and redrawing, replace the
//! search string inside the encoded string operands that feed the show-text
//! operators. Only the affected string tokens are respliced; every other
//! byte of the stream is preserved exactly, so spacing, kerning and graphics
//! state around the edit are untouched.
//!
//! A match split across show operators is a documented miss here; the
//! overlay strategy is the fallback for those.

use crate::content::{
    decode_text, encode_text, scan_show_text_strings, serialize_hex_string,
    serialize_literal_string,
};
use crate::document::Document;
use crate::error::Result;
use log::debug;

/// Rewrite every show-text string on the page whose decoded value contains
/// `search`, substituting `replacement`.
///
/// Returns true and installs the new stream if at least one substitution was
/// made; returns false and leaves the page untouched otherwise.
pub fn rewrite_page(
    doc: &mut Document,
    page: u32,
    search: &str,
    replacement: &str,
) -> Result<bool> {
    let content = doc.content_bytes(page)?;
    match rewrite_stream(&content, search, replacement) {
        Some(rewritten) => {
            doc.set_content(page, rewritten)?;
            Ok(true)
        },
        None => Ok(false),
    }
}

/// Pure rewrite of one stream's bytes. Returns None when nothing matched.
pub fn rewrite_stream(content: &[u8], search: &str, replacement: &str) -> Option<Vec<u8>> {
    if search.is_empty() {
        return None;
    }

    let mut edits: Vec<(usize, usize, Vec<u8>)> = Vec::new();
    for token in scan_show_text_strings(content) {
        let text = decode_text(&token.bytes);
        if !text.contains(search) {
            continue;
        }
        let new_bytes = encode_text(&text.replace(search, replacement));
        let serialized = if token.hex {
            serialize_hex_string(&new_bytes)
        } else {
            serialize_literal_string(&new_bytes)
        };
        edits.push((token.start, token.end, serialized));
    }

    if edits.is_empty() {
        return None;
    }
    debug!(
        "rewriting {} string token(s) for {:?} -> {:?}",
        edits.len(),
        search,
        replacement
    );

    // Splice back to front so earlier spans stay valid
    let mut out = content.to_vec();
    for (start, end, serialized) in edits.into_iter().rev() {
        out.splice(start..end, serialized);
    }
    Some(out)
}
