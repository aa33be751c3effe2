//! Content-stream operator model and tokenizer.
//!
//! Content streams use postfix notation: operands come before their
//! operator. The typed [`Operator`] sequence feeds the glyph-run
//! extractor; the span-tracking scanner in [`parser`] feeds the
//! content-stream rewriter, which must know exactly which bytes each
//! string operand occupies.

pub mod operators;
pub mod parser;

pub use operators::{Operand, Operator, TextElement};
pub use parser::{
    parse_content_stream, scan_show_text_strings, serialize_hex_string, serialize_literal_string,
    StringToken,
};

/// Decode content-stream string bytes to text.
///
/// Simple fonts with standard encodings are effectively Latin-1 over the
/// printable range; composite-font bytes decode lossily. Embedded-font
/// fidelity is out of scope, so this is deliberately not CMap-aware.
pub fn decode_text(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Encode text back to content-stream string bytes (inverse of
/// [`decode_text`]). Characters outside the single-byte range degrade to
/// `?` rather than silently corrupting the operand length.
pub fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| if (c as u32) <= 0xFF { c as u8 } else { b'?' })
        .collect()
}
