//! End-to-end overlay replacement.

mod common;

use pdf_retext::{extract_text_elements, replace_text, replace_text_advanced, ReplaceOptions};

#[test]
fn test_overlay_draws_replacement_at_original_baseline() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_invoice(&dir);

    let out = replace_text(&path, "Invoice Number: 12345", "99999-A", 0).unwrap();
    assert_ne!(out, path);

    let text = extract_text_elements(&out).unwrap();
    assert_eq!(text.page_count, 1);

    let elements = &text.pages[0].elements;
    let replacement = elements
        .iter()
        .find(|e| e.content == "99999-A")
        .expect("replacement text not drawn");
    assert!((replacement.y - 700.0).abs() <= 1.0);
    assert!((replacement.x - 72.0).abs() <= 1.0);
    assert_eq!(replacement.font_size, 12.0);

    // Other page content survives untouched
    assert!(elements.iter().any(|e| e.content == "Total: $100"));
}

#[test]
fn test_overlay_stays_aligned_on_rotated_page() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_rotated_pdf(
        &dir,
        "rotated.pdf",
        b"BT /F1 12 Tf 100 200 Td (Invoice Number: 12345) Tj ET",
        90,
    );

    let out = replace_text(&path, "Invoice Number: 12345", "99999-A", 0).unwrap();

    // Extraction reports content-stream coordinates, so the replacement must
    // land exactly where the original glyphs sit regardless of /Rotate
    let text = extract_text_elements(&out).unwrap();
    let elements = &text.pages[0].elements;
    let original = elements
        .iter()
        .find(|e| e.content == "Invoice Number: 12345")
        .unwrap();
    let replacement = elements
        .iter()
        .find(|e| e.content == "99999-A")
        .expect("replacement text not drawn");
    assert!((replacement.x - original.x).abs() <= 1.0);
    assert!((replacement.y - original.y).abs() <= 1.0);
    assert!((original.x - 100.0).abs() <= 0.01);
    assert!((original.y - 200.0).abs() <= 0.01);
}

#[test]
fn test_mid_run_match_covers_only_the_matched_span() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_invoice(&dir);

    let out = replace_text(&path, "12345", "99999-A", 0).unwrap();

    let text = extract_text_elements(&out).unwrap();
    let elements = &text.pages[0].elements;
    // The line's prefix is not part of the edit and must stay visible
    assert!(elements.iter().any(|e| e.content == "Invoice Number: 12345"));
    // The replacement starts where the matched digits start, not at the
    // line's left edge
    let prefix_width = pdf_retext::fonts::text_width("Invoice Number: ", "Helvetica", 12.0);
    let replacement = elements
        .iter()
        .find(|e| e.content == "99999-A")
        .expect("replacement text not drawn");
    assert!((replacement.x - (72.0 + prefix_width)).abs() <= 0.01);
    assert!((replacement.y - 700.0).abs() <= 1.0);
}

#[test]
fn test_input_file_never_modified() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_invoice(&dir);
    let before = std::fs::read(&path).unwrap();

    replace_text(&path, "Total: $100", "Total: $200", 0).unwrap();

    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[test]
fn test_sequential_edits_compose() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_invoice(&dir);

    let first = replace_text(&path, "12345", "99999-A", 0).unwrap();
    let second = replace_text(&first, "$100", "$250", 0).unwrap();

    let text = extract_text_elements(&second).unwrap();
    let elements = &text.pages[0].elements;
    assert!(elements.iter().any(|e| e.content == "99999-A"));
    assert!(elements.iter().any(|e| e.content == "$250"));
}

#[test]
fn test_advanced_absolute_positioning() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_invoice(&dir);

    let options = ReplaceOptions {
        font_size: Some(18.0),
        x_offset: 200.0,
        y_offset: 400.0,
        absolute: true,
        ..ReplaceOptions::default()
    };
    let out = replace_text_advanced(&path, "Total: $100", "MOVED", 0, &options).unwrap();

    let text = extract_text_elements(&out).unwrap();
    let moved = text.pages[0]
        .elements
        .iter()
        .find(|e| e.content == "MOVED")
        .expect("replacement text not drawn");
    assert!((moved.x - 200.0).abs() <= 0.01);
    assert!((moved.y - 400.0).abs() <= 0.01);
    assert!((moved.font_size - 18.0).abs() <= 0.01);
}

#[test]
fn test_advanced_relative_offsets() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_invoice(&dir);

    let options = ReplaceOptions {
        x_offset: 10.0,
        y_offset: -5.0,
        ..ReplaceOptions::default()
    };
    let out = replace_text_advanced(&path, "Total: $100", "shifted", 0, &options).unwrap();

    let text = extract_text_elements(&out).unwrap();
    let shifted = text.pages[0]
        .elements
        .iter()
        .find(|e| e.content == "shifted")
        .unwrap();
    assert!((shifted.x - 82.0).abs() <= 0.01);
    assert!((shifted.y - 665.0).abs() <= 0.01);
}
