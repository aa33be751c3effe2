//! Synthetic PDF builders shared by the integration tests.
#![allow(dead_code)]

use lopdf::{dictionary, Object, Stream};
use std::path::PathBuf;

/// Content stream of the standard one-page invoice fixture.
pub const INVOICE_CONTENT: &[u8] =
    b"BT /F1 12 Tf 72 700 Td (Invoice Number: 12345) Tj 0 -30 Td (Total: $100) Tj ET";

/// Build a PDF with one Helvetica page per content stream, US Letter.
pub fn build_pdf(contents: &[&[u8]]) -> Vec<u8> {
    build_pdf_with_rotation(contents, None)
}

/// [`build_pdf`], with a /Rotate entry on every page when given.
pub fn build_pdf_with_rotation(contents: &[&[u8]], rotate: Option<i64>) -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => Object::Reference(font_id) },
    });

    let mut kids = Vec::new();
    for content in contents {
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.to_vec()));
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "Contents" => Object::Reference(content_id),
        };
        if let Some(angle) = rotate {
            page.set("Rotate", angle);
        }
        let page_id = doc.add_object(page);
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => Object::Reference(resources_id),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Write the one-page invoice fixture into `dir` and return its path.
pub fn write_invoice(dir: &tempfile::TempDir) -> PathBuf {
    write_pdf(dir, "invoice.pdf", &[INVOICE_CONTENT])
}

/// Write a PDF built from `contents` into `dir` and return its path.
pub fn write_pdf(dir: &tempfile::TempDir, name: &str, contents: &[&[u8]]) -> PathBuf {
    let _ = env_logger::builder().is_test(true).try_init();
    let path = dir.path().join(name);
    std::fs::write(&path, build_pdf(contents)).unwrap();
    path
}

/// Write a one-page PDF with a /Rotate entry into `dir` and return its path.
pub fn write_rotated_pdf(
    dir: &tempfile::TempDir,
    name: &str,
    content: &[u8],
    rotate: i64,
) -> PathBuf {
    let _ = env_logger::builder().is_test(true).try_init();
    let path = dir.path().join(name);
    std::fs::write(&path, build_pdf_with_rotation(&[content], Some(rotate))).unwrap();
    path
}
