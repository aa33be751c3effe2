//! Content stream parser.
//!
//! Content streams use postfix notation where operands come before the
//! operator:
//!
//! ```text
//! BT
//!   /F1 12 Tf
//!   100 700 Td
//!   (Hello, World!) Tj
//! ET
//! ```
//!
//! Two entry points are provided. [`parse_content_stream`] tokenizes a whole
//! stream into typed [`Operator`]s for the extractor. [`scan_show_text_strings`]
//! walks the same bytes but only records the byte spans of string tokens that
//! feed show-text operators, which is what the in-place rewriter splices.

use crate::content::operators::{Operand, Operator};
use crate::error::Result;
use nom::IResult;
use nom::bytes::complete::take_while1;
use nom::character::complete::multispace0;

/// Parse a content stream into a sequence of operators.
///
/// Malformed regions are skipped a byte at a time rather than failing the
/// whole stream, so a damaged operator costs only itself.
///
/// # Examples
///
/// ```
/// use pdf_retext::content::parse_content_stream;
///
/// let stream = b"BT /F1 12 Tf 100 700 Td (Hello) Tj ET";
/// let operators = parse_content_stream(stream).unwrap();
/// assert_eq!(operators.len(), 5);
/// ```
pub fn parse_content_stream(data: &[u8]) -> Result<Vec<Operator>> {
    let mut operators = Vec::new();
    let mut input = data;

    while !input.is_empty() {
        if let Ok((rest, _)) = skip_ws_and_comments(input) {
            input = rest;
        }
        if input.is_empty() {
            break;
        }

        match parse_operator_with_operands(input) {
            Ok((rest, op)) => {
                operators.push(op);
                input = rest;
            },
            Err(_) => {
                // Skip the problematic byte and keep going
                if input.len() > 1 {
                    input = &input[1..];
                } else {
                    break;
                }
            },
        }
    }

    Ok(operators)
}

/// Parse a single operator with its operands.
fn parse_operator_with_operands(input: &[u8]) -> IResult<&[u8], Operator> {
    let mut operands = Vec::new();
    let mut remaining = input;

    loop {
        let (inp, _) = skip_ws_and_comments(remaining)?;
        remaining = inp;

        if remaining.is_empty() {
            return Err(nom::Err::Error(nom::error::Error::new(
                remaining,
                nom::error::ErrorKind::Eof,
            )));
        }

        // Operator names are short keywords; anything else is an operand
        if is_operator_start(remaining[0]) {
            let (rest, op_name) = parse_operator_name(remaining)?;

            // Inline images carry raw binary between ID and EI
            if op_name == "BI" {
                let rest = skip_inline_image(rest);
                return Ok((
                    rest,
                    Operator::Other {
                        name: "BI".to_string(),
                        operands,
                    },
                ));
            }

            return Ok((rest, Operator::from_raw(op_name, operands)));
        }

        let (inp, operand) = parse_operand(remaining)?;
        operands.push(operand);
        remaining = inp;
    }
}

/// Check if a byte could start an operator name.
fn is_operator_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'\'' || byte == b'"'
}

/// Parse an operator name (1-3 letter keyword, plus ', ", and T*/b*/W* forms).
fn parse_operator_name(input: &[u8]) -> IResult<&[u8], &str> {
    let (input, name_bytes) =
        take_while1(|c: u8| c.is_ascii_alphanumeric() || c == b'\'' || c == b'"' || c == b'*')(
            input,
        )?;

    let name = std::str::from_utf8(name_bytes)
        .map_err(|_| nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Char)))?;

    Ok((input, name))
}

/// Parse one operand.
fn parse_operand(input: &[u8]) -> IResult<&[u8], Operand> {
    match input.first() {
        Some(b'/') => parse_name(input),
        Some(b'(') => parse_literal_string(input),
        Some(b'<') if input.get(1) == Some(&b'<') => parse_dict(input),
        Some(b'<') => parse_hex_string(input),
        Some(b'[') => parse_array(input),
        Some(c) if c.is_ascii_digit() || *c == b'+' || *c == b'-' || *c == b'.' => {
            parse_number(input)
        },
        _ => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        ))),
    }
}

fn parse_number(input: &[u8]) -> IResult<&[u8], Operand> {
    let (rest, bytes) =
        take_while1(|c: u8| c.is_ascii_digit() || c == b'+' || c == b'-' || c == b'.')(input)?;
    let text = std::str::from_utf8(bytes)
        .map_err(|_| nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Digit)))?;

    if let Ok(i) = text.parse::<i64>() {
        return Ok((rest, Operand::Integer(i)));
    }
    match text.parse::<f32>() {
        Ok(r) => Ok((rest, Operand::Real(r))),
        Err(_) => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Float,
        ))),
    }
}

fn parse_name(input: &[u8]) -> IResult<&[u8], Operand> {
    debug_assert_eq!(input.first(), Some(&b'/'));
    let input = &input[1..];

    let mut name = String::new();
    let mut i = 0;
    while i < input.len() {
        let b = input[i];
        if is_delimiter(b) || b.is_ascii_whitespace() {
            break;
        }
        // #xx hex escape in name objects
        if b == b'#' && i + 2 < input.len() {
            let hi = (input[i + 1] as char).to_digit(16);
            let lo = (input[i + 2] as char).to_digit(16);
            if let (Some(hi), Some(lo)) = (hi, lo) {
                name.push(((hi * 16 + lo) as u8) as char);
                i += 3;
                continue;
            }
        }
        name.push(b as char);
        i += 1;
    }

    Ok((&input[i..], Operand::Name(name)))
}

fn parse_literal_string(input: &[u8]) -> IResult<&[u8], Operand> {
    match decode_literal(input) {
        Some((bytes, consumed)) => Ok((&input[consumed..], Operand::String(bytes))),
        None => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Tag,
        ))),
    }
}

fn parse_hex_string(input: &[u8]) -> IResult<&[u8], Operand> {
    match decode_hex(input) {
        Some((bytes, consumed)) => Ok((&input[consumed..], Operand::String(bytes))),
        None => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Tag,
        ))),
    }
}

fn parse_array(input: &[u8]) -> IResult<&[u8], Operand> {
    let mut remaining = &input[1..];
    let mut items = Vec::new();

    loop {
        let (inp, _) = skip_ws_and_comments(remaining)?;
        remaining = inp;

        match remaining.first() {
            None => {
                return Err(nom::Err::Error(nom::error::Error::new(
                    remaining,
                    nom::error::ErrorKind::Eof,
                )));
            },
            Some(b']') => return Ok((&remaining[1..], Operand::Array(items))),
            _ => {
                let (inp, item) = parse_value(remaining)?;
                items.push(item);
                remaining = inp;
            },
        }
    }
}

fn parse_dict(input: &[u8]) -> IResult<&[u8], Operand> {
    let mut remaining = &input[2..];
    let mut entries = Vec::new();

    loop {
        let (inp, _) = skip_ws_and_comments(remaining)?;
        remaining = inp;

        if remaining.starts_with(b">>") {
            return Ok((&remaining[2..], Operand::Dict(entries)));
        }
        if remaining.first() != Some(&b'/') {
            return Err(nom::Err::Error(nom::error::Error::new(
                remaining,
                nom::error::ErrorKind::Tag,
            )));
        }

        let (inp, key) = parse_name(remaining)?;
        let (inp, _) = skip_ws_and_comments(inp)?;
        let (inp, value) = parse_value(inp)?;
        if let Operand::Name(key) = key {
            entries.push((key, value));
        }
        remaining = inp;
    }
}

/// Parse a value inside an array or dictionary, where the keywords
/// true/false/null are values rather than operators.
fn parse_value(input: &[u8]) -> IResult<&[u8], Operand> {
    if input.starts_with(b"true") {
        return Ok((&input[4..], Operand::Boolean(true)));
    }
    if input.starts_with(b"false") {
        return Ok((&input[5..], Operand::Boolean(false)));
    }
    if input.starts_with(b"null") {
        return Ok((&input[4..], Operand::Null));
    }
    parse_operand(input)
}

fn skip_ws_and_comments(input: &[u8]) -> IResult<&[u8], ()> {
    let mut remaining = input;
    loop {
        let (inp, _) = multispace0::<&[u8], nom::error::Error<&[u8]>>(remaining)?;
        remaining = inp;
        if remaining.first() == Some(&b'%') {
            let eol = remaining
                .iter()
                .position(|&b| b == b'\n' || b == b'\r')
                .unwrap_or(remaining.len());
            remaining = &remaining[eol..];
        } else {
            return Ok((remaining, ()));
        }
    }
}

fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

/// Skip past an inline image's binary payload, up to and including EI.
fn skip_inline_image(input: &[u8]) -> &[u8] {
    let mut i = 0;
    while i + 1 < input.len() {
        if input[i] == b'E'
            && input[i + 1] == b'I'
            && (i == 0 || input[i - 1].is_ascii_whitespace())
            && input
                .get(i + 2)
                .map_or(true, |b| b.is_ascii_whitespace() || is_delimiter(*b))
        {
            return &input[i + 2..];
        }
        i += 1;
    }
    &[]
}

// ---------------------------------------------------------------------------
// String token scanning
// ---------------------------------------------------------------------------

/// A string token that feeds a show-text operator, with its byte span in the
/// original stream.
///
/// `start..end` covers the token including its delimiters, so replacing that
/// range with a newly serialized string leaves every other byte of the stream
/// untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct StringToken {
    /// Offset of the opening `(` or `<`
    pub start: usize,
    /// Offset one past the closing `)` or `>`
    pub end: usize,
    /// True if the token was written in hexadecimal form
    pub hex: bool,
    /// Escape-processed string bytes
    pub bytes: Vec<u8>,
}

/// Scan a content stream and return the string tokens consumed by the
/// show-text operators Tj, TJ, ' and ".
///
/// Strings that appear as operands to anything else (dictionary values,
/// property lists) are not reported. The scan is span-preserving: it never
/// reinterprets bytes it does not report.
pub fn scan_show_text_strings(data: &[u8]) -> Vec<StringToken> {
    let mut tokens = Vec::new();
    let mut pending: Vec<StringToken> = Vec::new();
    let mut i = 0;

    while i < data.len() {
        let b = data[i];
        match b {
            b'%' => {
                while i < data.len() && data[i] != b'\n' && data[i] != b'\r' {
                    i += 1;
                }
            },
            b'(' => match decode_literal(&data[i..]) {
                Some((bytes, consumed)) => {
                    pending.push(StringToken {
                        start: i,
                        end: i + consumed,
                        hex: false,
                        bytes,
                    });
                    i += consumed;
                },
                None => break,
            },
            b'<' if data.get(i + 1) == Some(&b'<') => i += 2,
            b'<' => match decode_hex(&data[i..]) {
                Some((bytes, consumed)) => {
                    pending.push(StringToken {
                        start: i,
                        end: i + consumed,
                        hex: true,
                        bytes,
                    });
                    i += consumed;
                },
                None => break,
            },
            b'/' => {
                i += 1;
                while i < data.len() && !data[i].is_ascii_whitespace() && !is_delimiter(data[i]) {
                    i += 1;
                }
            },
            _ if b.is_ascii_alphabetic() || b == b'\'' || b == b'"' => {
                let start = i;
                while i < data.len()
                    && (data[i].is_ascii_alphanumeric()
                        || data[i] == b'\''
                        || data[i] == b'"'
                        || data[i] == b'*')
                {
                    i += 1;
                }
                match &data[start..i] {
                    b"Tj" | b"'" | b"\"" => {
                        if let Some(token) = pending.pop() {
                            tokens.push(token);
                        }
                        pending.clear();
                    },
                    b"TJ" => {
                        tokens.append(&mut pending);
                    },
                    b"BI" => {
                        let rest = skip_inline_image(&data[i..]);
                        i = data.len() - rest.len();
                        pending.clear();
                    },
                    _ => pending.clear(),
                }
            },
            _ => i += 1,
        }
    }

    tokens
}

// ---------------------------------------------------------------------------
// String encoding and decoding
// ---------------------------------------------------------------------------

/// Decode a literal string starting at `(`, returning the decoded bytes and
/// the number of bytes consumed including both delimiters.
fn decode_literal(data: &[u8]) -> Option<(Vec<u8>, usize)> {
    debug_assert_eq!(data.first(), Some(&b'('));
    let mut out = Vec::new();
    let mut depth = 1usize;
    let mut i = 1;

    while i < data.len() {
        match data[i] {
            b'\\' => {
                let esc = *data.get(i + 1)?;
                i += 2;
                match esc {
                    b'n' => out.push(b'\n'),
                    b'r' => out.push(b'\r'),
                    b't' => out.push(b'\t'),
                    b'b' => out.push(0x08),
                    b'f' => out.push(0x0C),
                    b'(' => out.push(b'('),
                    b')' => out.push(b')'),
                    b'\\' => out.push(b'\\'),
                    // Backslash-newline is a line continuation
                    b'\r' => {
                        if data.get(i) == Some(&b'\n') {
                            i += 1;
                        }
                    },
                    b'\n' => {},
                    b'0'..=b'7' => {
                        let mut value = (esc - b'0') as u16;
                        for _ in 0..2 {
                            match data.get(i) {
                                Some(d @ b'0'..=b'7') => {
                                    value = value * 8 + (d - b'0') as u16;
                                    i += 1;
                                },
                                _ => break,
                            }
                        }
                        out.push(value as u8);
                    },
                    other => out.push(other),
                }
            },
            b'(' => {
                depth += 1;
                out.push(b'(');
                i += 1;
            },
            b')' => {
                depth -= 1;
                i += 1;
                if depth == 0 {
                    return Some((out, i));
                }
                out.push(b')');
            },
            // An unescaped end-of-line reads as a single newline
            b'\r' => {
                out.push(b'\n');
                i += 1;
                if data.get(i) == Some(&b'\n') {
                    i += 1;
                }
            },
            other => {
                out.push(other);
                i += 1;
            },
        }
    }

    None
}

/// Decode a hex string starting at `<`, returning the decoded bytes and the
/// number of bytes consumed including both delimiters.
fn decode_hex(data: &[u8]) -> Option<(Vec<u8>, usize)> {
    debug_assert_eq!(data.first(), Some(&b'<'));
    let mut out = Vec::new();
    let mut nibble: Option<u8> = None;
    let mut i = 1;

    while i < data.len() {
        let b = data[i];
        i += 1;
        match b {
            b'>' => {
                // Odd digit count implies a trailing zero
                if let Some(hi) = nibble {
                    out.push(hi << 4);
                }
                return Some((out, i));
            },
            _ if b.is_ascii_whitespace() => {},
            _ => {
                let digit = (b as char).to_digit(16)? as u8;
                match nibble.take() {
                    Some(hi) => out.push((hi << 4) | digit),
                    None => nibble = Some(digit),
                }
            },
        }
    }

    None
}

/// Serialize string bytes as a literal string token, `(…)` with escapes.
pub fn serialize_literal_string(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() + 2);
    out.push(b'(');
    for &b in bytes {
        match b {
            b'(' => out.extend_from_slice(b"\\("),
            b')' => out.extend_from_slice(b"\\)"),
            b'\\' => out.extend_from_slice(b"\\\\"),
            b'\n' => out.extend_from_slice(b"\\n"),
            b'\r' => out.extend_from_slice(b"\\r"),
            b'\t' => out.extend_from_slice(b"\\t"),
            0x20..=0x7E => out.push(b),
            other => {
                out.push(b'\\');
                out.extend_from_slice(format!("{:03o}", other).as_bytes());
            },
        }
    }
    out.push(b')');
    out
}

/// Serialize string bytes as a hex string token, `<…>`.
pub fn serialize_hex_string(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() * 2 + 2);
    out.push(b'<');
    for &b in bytes {
        out.extend_from_slice(format!("{:02X}", b).as_bytes());
    }
    out.push(b'>');
    out
}
