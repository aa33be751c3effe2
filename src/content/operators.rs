//! Typed content-stream operators.
//!
//! Only the operators the glyph-run extractor interprets are given typed
//! variants; everything else is carried as [`Operator::Other`] so the
//! operator count of a stream survives tokenization.

/// A parsed content-stream operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Integer number
    Integer(i64),
    /// Real number
    Real(f32),
    /// Name object (`/Foo`)
    Name(String),
    /// String (literal or hex), escape-processed bytes
    String(Vec<u8>),
    /// Array of operands
    Array(Vec<Operand>),
    /// Dictionary (`<< … >>`), keys paired with values
    Dict(Vec<(String, Operand)>),
    /// Boolean
    Boolean(bool),
    /// Null
    Null,
}

impl Operand {
    /// Numeric value of an Integer or Real operand.
    pub fn as_number(&self) -> Option<f32> {
        match self {
            Operand::Integer(i) => Some(*i as f32),
            Operand::Real(r) => Some(*r),
            _ => None,
        }
    }
}

/// Element in a TJ array (show text with individual glyph positioning).
#[derive(Debug, Clone, PartialEq)]
pub enum TextElement {
    /// Text string to show
    String(Vec<u8>),
    /// Positioning adjustment in thousandths of text space
    Offset(f32),
}

/// A content stream operator with its operands.
#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    /// Move text position (Td)
    Td {
        /// Horizontal offset
        tx: f32,
        /// Vertical offset
        ty: f32,
    },
    /// Move text position and set leading (TD)
    TD {
        /// Horizontal offset
        tx: f32,
        /// Vertical offset
        ty: f32,
    },
    /// Set text matrix (Tm)
    Tm {
        /// Matrix element a
        a: f32,
        /// Matrix element b
        b: f32,
        /// Matrix element c
        c: f32,
        /// Matrix element d
        d: f32,
        /// Matrix element e (x translation)
        e: f32,
        /// Matrix element f (y translation)
        f: f32,
    },
    /// Move to start of next line (T*)
    TStar,

    /// Show text string (Tj)
    Tj {
        /// Escape-processed string bytes
        text: Vec<u8>,
    },
    /// Show text with individual glyph positioning (TJ)
    TJ {
        /// Strings and positioning adjustments
        array: Vec<TextElement>,
    },
    /// Move to next line and show text (')
    Quote {
        /// Escape-processed string bytes
        text: Vec<u8>,
    },
    /// Set word/char spacing, move to next line, and show text (")
    DoubleQuote {
        /// Word spacing
        word_space: f32,
        /// Character spacing
        char_space: f32,
        /// Escape-processed string bytes
        text: Vec<u8>,
    },

    /// Set character spacing (Tc)
    Tc {
        /// Character spacing
        char_space: f32,
    },
    /// Set word spacing (Tw)
    Tw {
        /// Word spacing
        word_space: f32,
    },
    /// Set horizontal scaling (Tz)
    Tz {
        /// Scaling percentage (100 = unscaled)
        scale: f32,
    },
    /// Set text leading (TL)
    TL {
        /// Text leading
        leading: f32,
    },
    /// Set font and size (Tf)
    Tf {
        /// Font resource name
        font: String,
        /// Font size
        size: f32,
    },

    /// Begin text object (BT)
    BeginText,
    /// End text object (ET)
    EndText,

    /// Any operator the extractor does not interpret.
    Other {
        /// Operator name as it appeared in the stream
        name: String,
        /// Operands preceding it
        operands: Vec<Operand>,
    },
}

impl Operator {
    /// Build a typed operator from a raw name and its operands.
    pub fn from_raw(name: &str, operands: Vec<Operand>) -> Operator {
        match name {
            "Td" => Operator::Td {
                tx: number(&operands, 0),
                ty: number(&operands, 1),
            },
            "TD" => Operator::TD {
                tx: number(&operands, 0),
                ty: number(&operands, 1),
            },
            "Tm" => Operator::Tm {
                a: number_or(&operands, 0, 1.0),
                b: number(&operands, 1),
                c: number(&operands, 2),
                d: number_or(&operands, 3, 1.0),
                e: number(&operands, 4),
                f: number(&operands, 5),
            },
            "T*" => Operator::TStar,
            "Tj" => Operator::Tj {
                text: string(&operands, 0),
            },
            "TJ" => {
                let array = match operands.into_iter().next() {
                    Some(Operand::Array(items)) => items
                        .into_iter()
                        .filter_map(|item| match item {
                            Operand::String(s) => Some(TextElement::String(s)),
                            Operand::Integer(i) => Some(TextElement::Offset(i as f32)),
                            Operand::Real(r) => Some(TextElement::Offset(r)),
                            _ => None,
                        })
                        .collect(),
                    _ => Vec::new(),
                };
                Operator::TJ { array }
            }
            "'" => Operator::Quote {
                text: string(&operands, 0),
            },
            "\"" => Operator::DoubleQuote {
                word_space: number(&operands, 0),
                char_space: number(&operands, 1),
                text: string(&operands, 2),
            },
            "Tc" => Operator::Tc {
                char_space: number(&operands, 0),
            },
            "Tw" => Operator::Tw {
                word_space: number(&operands, 0),
            },
            "Tz" => Operator::Tz {
                scale: number_or(&operands, 0, 100.0),
            },
            "TL" => Operator::TL {
                leading: number(&operands, 0),
            },
            "Tf" => Operator::Tf {
                font: match operands.first() {
                    Some(Operand::Name(n)) => n.clone(),
                    _ => String::new(),
                },
                size: number_or(&operands, 1, 12.0),
            },
            "BT" => Operator::BeginText,
            "ET" => Operator::EndText,
            _ => Operator::Other {
                name: name.to_string(),
                operands,
            },
        }
    }
}

fn number(operands: &[Operand], idx: usize) -> f32 {
    number_or(operands, idx, 0.0)
}

fn number_or(operands: &[Operand], idx: usize, default: f32) -> f32 {
    operands
        .get(idx)
        .and_then(Operand::as_number)
        .unwrap_or(default)
}

fn string(operands: &[Operand], idx: usize) -> Vec<u8> {
    match operands.get(idx) {
        Some(Operand::String(s)) => s.clone(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_td() {
        let op = Operator::from_raw("Td", vec![Operand::Integer(72), Operand::Real(700.0)]);
        assert_eq!(op, Operator::Td { tx: 72.0, ty: 700.0 });
    }

    #[test]
    fn test_build_tf() {
        let op = Operator::from_raw(
            "Tf",
            vec![Operand::Name("F1".to_string()), Operand::Integer(12)],
        );
        assert_eq!(
            op,
            Operator::Tf {
                font: "F1".to_string(),
                size: 12.0
            }
        );
    }

    #[test]
    fn test_build_tj_array() {
        let op = Operator::from_raw(
            "TJ",
            vec![Operand::Array(vec![
                Operand::String(b"Inv".to_vec()),
                Operand::Integer(-120),
                Operand::String(b"oice".to_vec()),
            ])],
        );
        match op {
            Operator::TJ { array } => {
                assert_eq!(array.len(), 3);
                assert_eq!(array[0], TextElement::String(b"Inv".to_vec()));
                assert_eq!(array[1], TextElement::Offset(-120.0));
            }
            other => panic!("expected TJ, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_operator_is_preserved() {
        let op = Operator::from_raw("re", vec![Operand::Integer(0); 4]);
        assert!(matches!(op, Operator::Other { ref name, ref operands }
            if name == "re" && operands.len() == 4));
    }
}
