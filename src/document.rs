//! Document access layer over lopdf.
//!
//! Wraps a loaded PDF and exposes the page-level views the rest of the crate
//! works in terms of: decoded content-stream bytes, page geometry from the
//! page tree (with inherited attributes), font resources, and atomic saving.

use crate::error::{Error, Result};
use crate::fonts::FontStyle;
use log::{debug, warn};
use lopdf::{dictionary, Dictionary, Object, ObjectId, Stream};
use std::collections::HashMap;
use std::path::Path;

/// Page-tree attributes that inherit through /Parent.
const INHERITABLE: [&[u8]; 3] = [b"MediaBox", b"Rotate", b"Resources"];

/// Prefix for font resource names this crate registers.
const FONT_RESOURCE_PREFIX: &str = "RTF";

/// A loaded PDF document.
pub struct Document {
    inner: lopdf::Document,
    /// Page object ids in document order
    page_ids: Vec<ObjectId>,
}

impl Document {
    /// Load a document from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Document> {
        let inner = lopdf::Document::load(path)?;
        Ok(Self::from_inner(inner))
    }

    /// Load a document from an in-memory buffer.
    pub fn from_bytes(data: &[u8]) -> Result<Document> {
        let inner = lopdf::Document::load_mem(data)?;
        Ok(Self::from_inner(inner))
    }

    fn from_inner(inner: lopdf::Document) -> Document {
        let page_ids = inner.get_pages().into_values().collect();
        Document { inner, page_ids }
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Object id for a 1-based page number.
    pub fn page_id(&self, page: u32) -> Result<ObjectId> {
        if page == 0 {
            return Err(Error::InvalidPage {
                page,
                count: self.page_ids.len(),
            });
        }
        self.page_ids
            .get(page as usize - 1)
            .copied()
            .ok_or(Error::InvalidPage {
                page,
                count: self.page_ids.len(),
            })
    }

    /// Page size in points, from the (possibly inherited) /MediaBox.
    ///
    /// Falls back to US Letter when the box is missing or malformed.
    pub fn page_size(&self, page: u32) -> Result<(f32, f32)> {
        let page_id = self.page_id(page)?;
        let media_box = self
            .inherited_attribute(page_id, b"MediaBox")
            .and_then(|obj| self.rect_values(&obj));
        match media_box {
            Some([x0, y0, x1, y1]) => Ok(((x1 - x0).abs(), (y1 - y0).abs())),
            None => {
                warn!("page {} has no usable MediaBox, assuming Letter", page);
                Ok((612.0, 792.0))
            },
        }
    }

    /// Page rotation in degrees, normalized to 0/90/180/270.
    pub fn page_rotation(&self, page: u32) -> Result<i32> {
        let page_id = self.page_id(page)?;
        let rotation = self
            .inherited_attribute(page_id, b"Rotate")
            .and_then(|obj| obj.as_i64().ok())
            .unwrap_or(0);
        Ok((rotation.rem_euclid(360) as i32 / 90) * 90)
    }

    /// Decoded content-stream bytes for a page, with multiple streams joined
    /// by a newline as the viewer model requires.
    pub fn content_bytes(&self, page: u32) -> Result<Vec<u8>> {
        let page_id = self.page_id(page)?;
        let mut out = Vec::new();

        for stream_id in self.content_stream_ids(page_id)? {
            let stream = match self.inner.get_object(stream_id).and_then(Object::as_stream) {
                Ok(s) => s,
                Err(_) => {
                    warn!("content stream {:?} is not a stream object", stream_id);
                    continue;
                },
            };
            let data = stream
                .decompressed_content()
                .unwrap_or_else(|_| stream.content.clone());
            if !out.is_empty() {
                out.push(b'\n');
            }
            out.extend_from_slice(&data);
        }

        Ok(out)
    }

    /// Replace a page's content with a single uncompressed stream.
    pub fn set_content(&mut self, page: u32, data: Vec<u8>) -> Result<()> {
        let page_id = self.page_id(page)?;
        let stream_id = self
            .inner
            .add_object(Stream::new(dictionary! {}, data));
        let page_dict = self.page_dict_mut(page_id)?;
        page_dict.set("Contents", Object::Reference(stream_id));
        Ok(())
    }

    /// Append a new content stream after a page's existing ones.
    ///
    /// The /Contents entry is normalized to an array so existing streams keep
    /// their bytes untouched.
    pub fn append_content(&mut self, page: u32, data: Vec<u8>) -> Result<()> {
        let page_id = self.page_id(page)?;
        let mut refs: Vec<Object> = self
            .content_stream_ids(page_id)?
            .into_iter()
            .map(Object::Reference)
            .collect();
        let stream_id = self
            .inner
            .add_object(Stream::new(dictionary! {}, data));
        refs.push(Object::Reference(stream_id));

        let page_dict = self.page_dict_mut(page_id)?;
        page_dict.set("Contents", Object::Array(refs));
        Ok(())
    }

    /// Font resources visible to a page: resource name to /BaseFont name.
    ///
    /// Non-dictionary entries and fonts without a /BaseFont are skipped.
    pub fn page_fonts(&self, page: u32) -> Result<HashMap<String, String>> {
        let page_id = self.page_id(page)?;
        let mut fonts = HashMap::new();

        let Some(resources) = self.inherited_attribute(page_id, b"Resources") else {
            return Ok(fonts);
        };
        let Ok(resources) = self.resolve(&resources).and_then(Object::as_dict) else {
            return Ok(fonts);
        };
        let Ok(font_dict) = resources.get(b"Font") else {
            return Ok(fonts);
        };
        let Ok(font_dict) = self.resolve(font_dict).and_then(Object::as_dict) else {
            return Ok(fonts);
        };

        for (name, font) in font_dict.iter() {
            let Ok(font) = self.resolve(font).and_then(Object::as_dict) else {
                continue;
            };
            if let Ok(base) = font.get(b"BaseFont").and_then(Object::as_name) {
                fonts.insert(
                    String::from_utf8_lossy(name).into_owned(),
                    String::from_utf8_lossy(base).into_owned(),
                );
            }
        }

        Ok(fonts)
    }

    /// Make a standard-14 font available to a page, returning its resource
    /// name. Reuses an existing resource that already maps to the same base
    /// font before registering a new one.
    pub fn ensure_base14_font(&mut self, page: u32, style: &FontStyle) -> Result<String> {
        let base_name = style.base14_name();
        for (resource, base) in self.page_fonts(page)? {
            if base == base_name {
                return Ok(resource);
            }
        }

        let page_id = self.page_id(page)?;
        let font_id = self.inner.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => base_name,
        });

        // Inherited resources must be copied down before being extended, or
        // sibling pages would see the new font too.
        let mut resources = self
            .inherited_attribute(page_id, b"Resources")
            .and_then(|obj| self.resolve(&obj).and_then(Object::as_dict).ok().cloned())
            .unwrap_or_default();
        let mut font_dict = match resources.get(b"Font") {
            Ok(fonts) => self
                .resolve(fonts)
                .and_then(Object::as_dict)
                .ok()
                .cloned()
                .unwrap_or_default(),
            Err(_) => Dictionary::new(),
        };

        let mut n = 1;
        let resource_name = loop {
            let candidate = format!("{}{}", FONT_RESOURCE_PREFIX, n);
            if !font_dict.has(candidate.as_bytes()) {
                break candidate;
            }
            n += 1;
        };
        font_dict.set(resource_name.as_bytes(), Object::Reference(font_id));
        resources.set("Font", Object::Dictionary(font_dict));

        let page_dict = self.page_dict_mut(page_id)?;
        page_dict.set("Resources", Object::Dictionary(resources));

        debug!("registered {} as /{} on page {}", base_name, resource_name, page);
        Ok(resource_name)
    }

    /// Serialize the document to bytes.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.inner.save_to(&mut buffer)?;
        Ok(buffer)
    }

    /// Write the document to `path` atomically: serialize to a scratch file
    /// in the same directory, then rename over the target.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let scratch = dir.join(format!(".{}.pdf.tmp", uuid::Uuid::new_v4()));

        let bytes = self.to_bytes()?;
        std::fs::write(&scratch, &bytes)?;
        match std::fs::rename(&scratch, path) {
            Ok(()) => Ok(()),
            Err(e) => {
                let _ = std::fs::remove_file(&scratch);
                Err(e.into())
            },
        }
    }

    /// Ids of a page's content streams in order. Handles a direct reference,
    /// an array of references, and a missing /Contents entry.
    fn content_stream_ids(&self, page_id: ObjectId) -> Result<Vec<ObjectId>> {
        let page_dict = self
            .inner
            .get_object(page_id)
            .and_then(Object::as_dict)
            .map_err(|_| Error::Decode(format!("page object {:?} is not a dictionary", page_id)))?;

        let contents = match page_dict.get(b"Contents") {
            Ok(obj) => obj,
            Err(_) => return Ok(Vec::new()),
        };

        match contents {
            Object::Reference(id) => {
                // A single reference may point at a stream or at an array
                match self.inner.get_object(*id) {
                    Ok(Object::Array(items)) => Ok(items
                        .iter()
                        .filter_map(|item| item.as_reference().ok())
                        .collect()),
                    _ => Ok(vec![*id]),
                }
            },
            Object::Array(items) => Ok(items
                .iter()
                .filter_map(|item| item.as_reference().ok())
                .collect()),
            _ => Ok(Vec::new()),
        }
    }

    /// Look up a page attribute, walking up the /Parent chain for the
    /// inheritable ones.
    fn inherited_attribute(&self, page_id: ObjectId, key: &[u8]) -> Option<Object> {
        let mut current = page_id;
        // Depth cap guards against cyclic page trees
        for _ in 0..64 {
            let dict = self.inner.get_object(current).and_then(Object::as_dict).ok()?;
            if let Ok(value) = dict.get(key) {
                return self.resolve(value).ok().cloned();
            }
            if !INHERITABLE.contains(&key) {
                return None;
            }
            match dict.get(b"Parent").and_then(Object::as_reference) {
                Ok(parent) => current = parent,
                Err(_) => return None,
            }
        }
        None
    }

    /// Follow reference chains to the underlying object.
    fn resolve<'a>(&'a self, obj: &'a Object) -> lopdf::Result<&'a Object> {
        let mut current = obj;
        for _ in 0..16 {
            match current {
                Object::Reference(id) => current = self.inner.get_object(*id)?,
                other => return Ok(other),
            }
        }
        Err(lopdf::Error::ReferenceLimit)
    }

    fn page_dict_mut(&mut self, page_id: ObjectId) -> Result<&mut Dictionary> {
        self.inner
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .map_err(|_| Error::Decode(format!("page object {:?} is not a dictionary", page_id)))
    }

    fn rect_values(&self, obj: &Object) -> Option<[f32; 4]> {
        let items = obj.as_array().ok()?;
        if items.len() != 4 {
            return None;
        }
        let mut values = [0.0f32; 4];
        for (slot, item) in values.iter_mut().zip(items) {
            *slot = match self.resolve(item).ok()? {
                Object::Integer(i) => *i as f32,
                Object::Real(r) => *r,
                _ => return None,
            };
        }
        Some(values)
    }
}
