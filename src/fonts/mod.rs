//! Base-14 font metrics and family substitution.
//!
//! Replacement text is drawn with a standard font substituted for the
//! original embedded font; the same metrics that size the covering
//! rectangle also measure the drawn string, so the two never disagree.
//! Widths are standard PostScript metrics in 1/1000 em.

/// Standard family a source font name maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum FontFamily {
    /// Sans-serif (Helvetica). Default for unrecognized names.
    Sans,
    /// Serif (Times)
    Serif,
    /// Monospace (Courier)
    Mono,
    /// Symbol / ZapfDingbats
    Symbol,
}

/// Recovered style of a located run: substituted family plus the original
/// weight and slant flags.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontStyle {
    /// Substituted standard family
    pub family: FontFamily,
    /// Bold flag recovered from the original font name
    pub bold: bool,
    /// Italic/oblique flag recovered from the original font name
    pub italic: bool,
}

impl FontStyle {
    /// Derive the full style from an original font name
    /// (e.g. "ABCDEF+Times-BoldItalic").
    pub fn from_font_name(name: &str) -> Self {
        let (bold, italic) = style_flags(name);
        Self {
            family: classify_family(name),
            bold,
            italic,
        }
    }

    /// The Base-14 PostScript name that renders this style.
    pub fn base14_name(&self) -> &'static str {
        select_base14(self.family, self.bold, self.italic)
    }
}

/// Map an original font name onto a standard family by substring.
///
/// Serif markers win over the sans default; symbol fonts are matched first
/// because names like "Symbol" carry no other family hint. Comparison is
/// case-insensitive and ignores any subset prefix ("ABCDEF+").
pub fn classify_family(font_name: &str) -> FontFamily {
    let name = font_name.to_ascii_lowercase();
    if name.contains("symbol") || name.contains("zapf") || name.contains("dingbat") {
        FontFamily::Symbol
    } else if name.contains("courier") || name.contains("mono") {
        FontFamily::Mono
    } else if name.contains("times") || name.contains("serif") || name.contains("georgia") {
        FontFamily::Serif
    } else {
        FontFamily::Sans
    }
}

/// Recover (bold, italic) flags from an original font name.
pub fn style_flags(font_name: &str) -> (bool, bool) {
    let name = font_name.to_ascii_lowercase();
    let bold = name.contains("bold") || name.contains("black") || name.contains("heavy");
    let italic = name.contains("italic") || name.contains("oblique");
    (bold, italic)
}

/// Select the Base-14 PostScript font name for a family/weight/slant.
pub fn select_base14(family: FontFamily, bold: bool, italic: bool) -> &'static str {
    match (family, bold, italic) {
        (FontFamily::Sans, false, false) => "Helvetica",
        (FontFamily::Sans, true, false) => "Helvetica-Bold",
        (FontFamily::Sans, false, true) => "Helvetica-Oblique",
        (FontFamily::Sans, true, true) => "Helvetica-BoldOblique",
        (FontFamily::Serif, false, false) => "Times-Roman",
        (FontFamily::Serif, true, false) => "Times-Bold",
        (FontFamily::Serif, false, true) => "Times-Italic",
        (FontFamily::Serif, true, true) => "Times-BoldItalic",
        (FontFamily::Mono, false, false) => "Courier",
        (FontFamily::Mono, true, false) => "Courier-Bold",
        (FontFamily::Mono, false, true) => "Courier-Oblique",
        (FontFamily::Mono, true, true) => "Courier-BoldOblique",
        (FontFamily::Symbol, _, _) => "Symbol",
    }
}

/// Measure a string in points at the given size for a Base-14 font.
pub fn text_width(text: &str, base14: &str, size: f32) -> f32 {
    let units: f32 = text.chars().map(|c| char_width_units(base14, c)).sum();
    units * size / 1000.0
}

/// Width of one character in 1/1000 em for a Base-14 font.
///
/// Unknown characters fall back to 500 units; this keeps cover rectangles
/// from collapsing when the replacement contains glyphs outside the
/// tables.
pub fn char_width_units(base14: &str, ch: char) -> f32 {
    match base14 {
        "Courier" | "Courier-Bold" | "Courier-Oblique" | "Courier-BoldOblique" => 600.0,
        "Symbol" | "ZapfDingbats" => 500.0,
        "Times-Roman" | "Times-Italic" => times_width(ch, false),
        "Times-Bold" | "Times-BoldItalic" => times_width(ch, true),
        "Helvetica-Bold" | "Helvetica-BoldOblique" => helvetica_width(ch, true),
        _ => helvetica_width(ch, false),
    }
}

/// Baseline-to-top ascent of a Base-14 font in 1/1000 em.
pub fn ascender_units(base14: &str) -> f32 {
    match base14 {
        "Helvetica" | "Helvetica-Oblique" | "Helvetica-Bold" | "Helvetica-BoldOblique" => 718.0,
        "Times-Roman" | "Times-Italic" => 683.0,
        "Times-Bold" | "Times-BoldItalic" => 676.0,
        "Courier" | "Courier-Oblique" => 629.0,
        "Courier-Bold" | "Courier-BoldOblique" => 626.0,
        _ => 750.0,
    }
}

fn helvetica_width(ch: char, bold: bool) -> f32 {
    match ch {
        'A' | 'B' | 'C' | 'D' | 'H' | 'K' | 'N' | 'R' | 'U' => 722.0,
        'E' => 667.0,
        'F' => 611.0,
        'G' | 'O' | 'Q' => 778.0,
        'I' => 278.0,
        'J' => 556.0,
        'L' | 'T' | 'Z' => 611.0,
        'M' => 833.0,
        'P' | 'S' | 'V' | 'X' | 'Y' => 667.0,
        'W' => 944.0,
        'a' | 'c' | 'e' | 'k' | 's' | 'v' | 'x' | 'y' => 556.0,
        'b' | 'd' | 'g' | 'h' | 'n' | 'o' | 'p' | 'q' | 'u' => 611.0,
        'f' => {
            if bold {
                333.0
            } else {
                278.0
            }
        }
        'i' | 'j' | 'l' => {
            if bold {
                278.0
            } else {
                222.0
            }
        }
        'm' => {
            if bold {
                889.0
            } else {
                833.0
            }
        }
        'r' => 389.0,
        't' => 333.0,
        'w' => 778.0,
        'z' => 500.0,
        '0'..='9' | '#' | '$' | '_' => 556.0,
        ' ' | '.' | ',' | '/' | '\\' | ';' => 278.0,
        ':' => {
            if bold {
                333.0
            } else {
                278.0
            }
        }
        '-' | '!' | '(' | ')' | '[' | ']' | '{' | '}' | '`' => 333.0,
        '?' | '^' => 500.0,
        '\'' => 222.0,
        '"' => 400.0,
        '@' => 800.0,
        '%' => 889.0,
        '&' => 722.0,
        '*' => 389.0,
        '+' | '=' | '<' | '>' | '~' => 584.0,
        '|' => 280.0,
        _ => 500.0,
    }
}

fn times_width(ch: char, bold: bool) -> f32 {
    match ch {
        'A' | 'N' | 'U' => 722.0,
        'B' => 667.0,
        'C' => {
            if bold {
                722.0
            } else {
                667.0
            }
        }
        'D' => 722.0,
        'E' => {
            if bold {
                667.0
            } else {
                611.0
            }
        }
        'F' => {
            if bold {
                611.0
            } else {
                556.0
            }
        }
        'G' | 'O' | 'Q' => {
            if bold {
                778.0
            } else {
                722.0
            }
        }
        'H' | 'K' => {
            if bold {
                778.0
            } else {
                722.0
            }
        }
        'I' => {
            if bold {
                389.0
            } else {
                333.0
            }
        }
        'J' => {
            if bold {
                500.0
            } else {
                389.0
            }
        }
        'L' => {
            if bold {
                667.0
            } else {
                611.0
            }
        }
        'M' => {
            if bold {
                944.0
            } else {
                889.0
            }
        }
        'P' => {
            if bold {
                611.0
            } else {
                556.0
            }
        }
        'R' => {
            if bold {
                722.0
            } else {
                667.0
            }
        }
        'S' => 556.0,
        'T' | 'Z' => {
            if bold {
                667.0
            } else {
                611.0
            }
        }
        'V' | 'X' | 'Y' => 722.0,
        'W' => {
            if bold {
                1000.0
            } else {
                944.0
            }
        }
        'a' => {
            if bold {
                500.0
            } else {
                444.0
            }
        }
        'b' | 'd' | 'h' | 'n' | 'p' | 'q' | 'u' => {
            if bold {
                556.0
            } else {
                500.0
            }
        }
        'c' | 'e' => 444.0,
        'f' => 333.0,
        't' => {
            if bold {
                333.0
            } else {
                278.0
            }
        }
        'g' | 'k' | 'o' | 'v' | 'x' | 'y' => 500.0,
        'i' => 278.0,
        'j' => {
            if bold {
                333.0
            } else {
                278.0
            }
        }
        'l' => 278.0,
        'm' => {
            if bold {
                833.0
            } else {
                778.0
            }
        }
        'r' => {
            if bold {
                444.0
            } else {
                333.0
            }
        }
        's' => 389.0,
        'w' => 722.0,
        'z' => 444.0,
        '0'..='9' | '#' | '$' | '_' => 500.0,
        ' ' | '.' | ',' | '/' | '\\' => 250.0,
        ';' => 278.0,
        ':' => {
            if bold {
                333.0
            } else {
                278.0
            }
        }
        '-' | '!' | '(' | ')' | '[' | ']' | '{' | '}' | '`' => 333.0,
        '?' => 500.0,
        '\'' => 222.0,
        '"' => 400.0,
        '@' => 800.0,
        '%' => 889.0,
        '&' => 722.0,
        '*' => 389.0,
        '+' | '=' | '<' | '>' | '~' => 584.0,
        '|' => 280.0,
        _ => 500.0,
    }
}
