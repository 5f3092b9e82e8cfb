//! Page geometry and content helpers
//!
//! Low-level lopdf operations on single pages: reading (possibly
//! inherited) page attributes, creating pages, registering image
//! resources and appending content streams.

use crate::constants::{DEFAULT_PAGE_DIMENSIONS, emu_to_pt, pt_to_emu};
use crate::layout::{Location, Size};
use crate::types::{Result, SlideFitError};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

/// Parent chain deeper than this is treated as malformed
const MAX_TREE_DEPTH: usize = 32;

// =============================================================================
// Geometry
// =============================================================================

/// A page box in PDF points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    /// Left edge
    pub x: f32,
    /// Bottom edge
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PageBox {
    /// Box at the origin for a canvas size in EMU
    pub fn from_size(size: Size) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: emu_to_pt(size.width),
            height: emu_to_pt(size.height),
        }
    }

    /// Canvas size in EMU
    pub fn size(&self) -> Size {
        Size::new(pt_to_emu(self.width), pt_to_emu(self.height))
    }

    fn to_array(self) -> Object {
        Object::Array(vec![
            Object::Real(self.x),
            Object::Real(self.y),
            Object::Real(self.x + self.width),
            Object::Real(self.y + self.height),
        ])
    }

    fn from_array(array: &[Object]) -> Option<Self> {
        if array.len() != 4 {
            return None;
        }
        let values: Vec<f32> = array.iter().filter_map(extract_number).collect();
        if values.len() != 4 {
            return None;
        }
        let (x0, x1) = (values[0].min(values[2]), values[0].max(values[2]));
        let (y0, y1) = (values[1].min(values[3]), values[1].max(values[3]));
        Some(Self {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }
}

/// How a page is laid out and displayed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub media_box: PageBox,
    pub crop_box: Option<PageBox>,
    /// Clockwise display rotation in degrees: 0, 90, 180 or 270
    pub rotate: i64,
}

impl PageGeometry {
    /// Unrotated page for a canvas size in EMU
    pub fn blank(size: Size) -> Self {
        Self {
            media_box: PageBox::from_size(size),
            crop_box: None,
            rotate: 0,
        }
    }

    fn quarter_turned(&self) -> bool {
        self.rotate % 180 == 90
    }

    /// Canvas size in EMU as the page is displayed
    pub fn display_size(&self) -> Size {
        let size = self.media_box.size();
        if self.quarter_turned() {
            Size::new(size.height, size.width)
        } else {
            size
        }
    }

    /// `cm` matrix drawing an image at `location` (measured from the top-left
    /// corner of the displayed page) with the given render size.
    pub fn image_matrix(&self, location: Location, render_size: Size) -> [f32; 6] {
        let PageBox {
            x,
            y,
            width: w,
            height: h,
        } = self.media_box;
        let display_height = if self.quarter_turned() { w } else { h };

        let (width, height) = (emu_to_pt(render_size.width), emu_to_pt(render_size.height));
        // Bottom-left corner of the image on the displayed page, y up
        let left = emu_to_pt(location.left);
        let bottom = display_height - emu_to_pt(location.top + render_size.height);

        // Displayed page to user space
        let [a, b, c, d, e, f] = match self.rotate {
            90 => [0.0, 1.0, -1.0, 0.0, x + w, y],
            180 => [-1.0, 0.0, 0.0, -1.0, x + w, y + h],
            270 => [0.0, -1.0, 1.0, 0.0, x, y + h],
            _ => [1.0, 0.0, 0.0, 1.0, x, y],
        };
        [
            width * a,
            width * b,
            height * c,
            height * d,
            left * a + bottom * c + e,
            left * b + bottom * d + f,
        ]
    }
}

/// Get the MediaBox of a page, following inheritance
pub fn page_box(doc: &Document, page_id: ObjectId) -> Result<PageBox> {
    let media_box = inherited_attribute(doc, page_id, b"MediaBox")?
        .and_then(|obj| resolve(doc, &obj).as_array().ok().cloned())
        .and_then(|array| PageBox::from_array(&array));

    Ok(media_box.unwrap_or(PageBox {
        x: 0.0,
        y: 0.0,
        width: DEFAULT_PAGE_DIMENSIONS.0,
        height: DEFAULT_PAGE_DIMENSIONS.1,
    }))
}

/// Extract numeric value from a PDF object
fn extract_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Look up a page attribute on the page or its ancestors
fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Result<Option<Object>> {
    let mut node = doc.get_dictionary(page_id)?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Ok(Some(value.clone()));
        }
        match node.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent) => node = doc.get_dictionary(parent)?,
            Err(_) => return Ok(None),
        }
    }
    Ok(None)
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

// =============================================================================
// Page Tree
// =============================================================================

/// Find the root Pages node of a document
pub fn root_pages_id(doc: &Document) -> Result<ObjectId> {
    let catalog_id = doc.trailer.get(b"Root")?.as_reference()?;
    let catalog = doc.get_dictionary(catalog_id)?;
    Ok(catalog.get(b"Pages")?.as_reference()?)
}

/// Append a new empty page to the root Pages node
pub fn append_page(
    doc: &mut Document,
    pages_id: ObjectId,
    geometry: &PageGeometry,
    resources: Dictionary,
) -> Result<ObjectId> {
    let content_id = doc.add_object(Stream::new(Dictionary::new(), Vec::new()));

    let mut page_dict = Dictionary::new();
    page_dict.set("Type", Object::Name(b"Page".to_vec()));
    page_dict.set("Parent", Object::Reference(pages_id));
    page_dict.set("MediaBox", geometry.media_box.to_array());
    if let Some(crop_box) = geometry.crop_box {
        page_dict.set("CropBox", crop_box.to_array());
    }
    if geometry.rotate != 0 {
        page_dict.set("Rotate", Object::Integer(geometry.rotate));
    }
    page_dict.set("Contents", Object::Reference(content_id));
    page_dict.set("Resources", Object::Dictionary(resources));
    let page_id = doc.add_object(page_dict);

    let pages_dict = doc.get_dictionary_mut(pages_id)?;
    let count = pages_dict
        .get(b"Count")
        .and_then(Object::as_i64)
        .unwrap_or(0);
    if !matches!(pages_dict.get(b"Kids"), Ok(Object::Array(_))) {
        pages_dict.set("Kids", Object::Array(Vec::new()));
    }
    if let Ok(Object::Array(kids)) = pages_dict.get_mut(b"Kids") {
        kids.push(Object::Reference(page_id));
    }
    pages_dict.set("Count", Object::Integer(count + 1));

    Ok(page_id)
}

/// Geometry of an existing page, following inheritance
pub fn page_geometry(doc: &Document, page_id: ObjectId) -> Result<PageGeometry> {
    let media_box = page_box(doc, page_id)?;
    let crop_box = inherited_attribute(doc, page_id, b"CropBox")?
        .and_then(|obj| resolve(doc, &obj).as_array().ok().cloned())
        .and_then(|array| PageBox::from_array(&array));
    let rotate = inherited_attribute(doc, page_id, b"Rotate")?
        .and_then(|obj| resolve(doc, &obj).as_i64().ok())
        .map_or(0, normalize_rotation);
    Ok(PageGeometry {
        media_box,
        crop_box,
        rotate,
    })
}

/// Snap a /Rotate value to a quarter turn in 0..360
fn normalize_rotation(degrees: i64) -> i64 {
    degrees.rem_euclid(360) / 90 * 90
}

/// Copy of the resources an existing page uses, for a page cloned from it.
///
/// The XObject map is copied too, so images drawn on the clone stay off the
/// source page.
pub fn inherited_resources(doc: &Document, page_id: ObjectId) -> Result<Dictionary> {
    let Some(obj) = inherited_attribute(doc, page_id, b"Resources")? else {
        return Ok(Dictionary::new());
    };
    let mut resources = resolve(doc, &obj)
        .as_dict()
        .cloned()
        .unwrap_or_else(|_| Dictionary::new());

    let xobjects_id = resources
        .get(b"XObject")
        .ok()
        .and_then(|obj| obj.as_reference().ok());
    if let Some(id) = xobjects_id {
        let xobjects = doc.get_dictionary(id)?.clone();
        resources.set("XObject", Object::Dictionary(xobjects));
    }
    Ok(resources)
}

// =============================================================================
// Resources
// =============================================================================

/// Register an XObject under `name` in the resources of a page.
///
/// Inherited or inline resources are copied into a page-owned object first;
/// shared resource objects are extended in place.
pub fn register_xobject(
    doc: &mut Document,
    page_id: ObjectId,
    name: &str,
    xobject_id: ObjectId,
) -> Result<()> {
    let resources_id = match inherited_attribute(doc, page_id, b"Resources")? {
        Some(Object::Reference(id)) => id,
        Some(Object::Dictionary(dict)) => {
            let id = doc.add_object(dict);
            doc.get_dictionary_mut(page_id)?
                .set("Resources", Object::Reference(id));
            id
        }
        _ => {
            let id = doc.add_object(Dictionary::new());
            doc.get_dictionary_mut(page_id)?
                .set("Resources", Object::Reference(id));
            id
        }
    };

    let existing = doc.get_dictionary(resources_id)?.get(b"XObject").ok().cloned();
    match existing {
        Some(Object::Reference(id)) => {
            doc.get_dictionary_mut(id)?
                .set(name, Object::Reference(xobject_id));
        }
        Some(Object::Dictionary(mut xobjects)) => {
            xobjects.set(name, Object::Reference(xobject_id));
            doc.get_dictionary_mut(resources_id)?
                .set("XObject", Object::Dictionary(xobjects));
        }
        _ => {
            let mut xobjects = Dictionary::new();
            xobjects.set(name, Object::Reference(xobject_id));
            doc.get_dictionary_mut(resources_id)?
                .set("XObject", Object::Dictionary(xobjects));
        }
    }

    Ok(())
}

// =============================================================================
// Content
// =============================================================================

/// Append drawing operators to a page.
///
/// Existing content is wrapped in `q`/`Q` so that graphics state it leaves
/// behind does not affect the appended operators.
pub fn append_content(doc: &mut Document, page_id: ObjectId, ops: Vec<u8>) -> Result<()> {
    let existing = match doc.get_dictionary(page_id)?.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id)? {
            Object::Array(refs) => refs.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(Object::Array(refs)) => refs.clone(),
        Ok(other) => {
            return Err(SlideFitError::Config(format!(
                "Unsupported page Contents entry: {:?}",
                other
            )));
        }
        Err(_) => Vec::new(),
    };

    let mut contents = Vec::with_capacity(existing.len() + 2);
    if !existing.is_empty() {
        let save_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        contents.push(Object::Reference(save_id));
        contents.extend(existing);
    }

    let mut appended = Vec::with_capacity(ops.len() + 2);
    if contents.len() > 1 {
        appended.extend_from_slice(b"\nQ\n");
    }
    appended.extend_from_slice(&ops);
    let appended_id = doc.add_object(Stream::new(Dictionary::new(), appended));
    contents.push(Object::Reference(appended_id));

    doc.get_dictionary_mut(page_id)?
        .set("Contents", Object::Array(contents));
    Ok(())
}

/// PDF operators drawing an image XObject with the given `cm` matrix
pub fn image_draw_command(name: &str, matrix: [f32; 6]) -> String {
    let [a, b, c, d, e, f] = matrix;
    format!("q {} {} {} {} {} {} cm /{} Do Q\n", a, b, c, d, e, f, name)
}
