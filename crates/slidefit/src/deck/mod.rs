//! Output document
//!
//! A `Deck` owns the PDF being built. Its pages are the canvases: existing
//! template pages keep their content, new pages are appended empty, and
//! images are drawn on top.

mod density;
mod image;
mod io;
mod page;

pub use density::{Density, read_density};
pub use self::image::{ImageSource, ImageXObject, read_image_source, read_image_sources};
pub use io::{load_template, save_deck};
pub use page::{PageBox, PageGeometry};

use crate::constants::IMAGE_RESOURCE_PREFIX;
use crate::layout::{Location, Size};
use crate::select::{CanvasTarget, NewCanvasLayout};
use crate::types::*;
use lopdf::{Dictionary, Document, Object, ObjectId};
use page::{
    append_content, append_page, image_draw_command, inherited_resources, page_geometry,
    register_xobject, root_pages_id,
};
use std::collections::HashMap;
use std::path::PathBuf;

/// One image to draw on a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDraw {
    /// Embedded image XObject
    pub xobject: ObjectId,
    pub location: Location,
    pub size: Size,
}

/// A PDF under construction
#[derive(Debug)]
pub struct Deck {
    doc: Document,
    pages_id: ObjectId,
    /// Pages present before any were added, in document order
    existing: Vec<ObjectId>,
    /// Embedded images by source path
    embedded: HashMap<PathBuf, ObjectId>,
}

impl Deck {
    /// Empty document with a page tree and catalog
    pub fn blank() -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let pages_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(Vec::new())),
            ("Count", Object::Integer(0)),
        ]);
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

        let catalog_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        doc.trailer.set("Root", catalog_id);

        Self {
            doc,
            pages_id,
            existing: Vec::new(),
            embedded: HashMap::new(),
        }
    }

    /// Build on an existing template document
    pub fn from_template(doc: Document) -> Result<Self> {
        let pages_id = root_pages_id(&doc)?;
        let existing = doc.get_pages().values().copied().collect();
        Ok(Self {
            doc,
            pages_id,
            existing,
            embedded: HashMap::new(),
        })
    }

    /// Number of template pages
    pub fn page_count(&self) -> usize {
        self.existing.len()
    }

    /// Geometry of an existing page, 0-based
    pub fn existing_geometry(&self, index: usize) -> Result<Option<PageGeometry>> {
        self.existing
            .get(index)
            .map(|&id| page_geometry(&self.doc, id))
            .transpose()
    }

    /// Add an empty page.
    ///
    /// A clone copies the source page's boxes, rotation and resources, not
    /// its content.
    pub fn add_page(&mut self, layout: NewCanvasLayout, blank: Size) -> Result<ObjectId> {
        let (geometry, resources) = match layout {
            NewCanvasLayout::Blank => (PageGeometry::blank(blank), Dictionary::new()),
            NewCanvasLayout::CloneOf(index) => {
                let source = self.existing_page(index)?;
                (
                    page_geometry(&self.doc, source)?,
                    inherited_resources(&self.doc, source)?,
                )
            }
        };
        append_page(&mut self.doc, self.pages_id, &geometry, resources)
    }

    /// Turn selected canvases into page ids, creating pages as needed.
    ///
    /// `blank` is the size of pages created with the blank layout.
    pub fn materialize(&mut self, targets: &[CanvasTarget], blank: Size) -> Result<Vec<ObjectId>> {
        targets
            .iter()
            .map(|target| match *target {
                CanvasTarget::Existing(index) => self.existing_page(index),
                CanvasTarget::New(layout) => self.add_page(layout, blank),
            })
            .collect()
    }

    /// Embed an image once per source path
    pub fn embed_image(&mut self, source: &ImageSource) -> Result<ObjectId> {
        if let Some(&id) = self.embedded.get(&source.path) {
            return Ok(id);
        }
        let xobject = ImageXObject::from_path(&source.path)?;
        let id = xobject.embed(&mut self.doc);
        self.embedded.insert(source.path.clone(), id);
        Ok(id)
    }

    /// Draw images on a page
    pub fn draw_images(&mut self, page_id: ObjectId, draws: &[ImageDraw]) -> Result<()> {
        if draws.is_empty() {
            return Ok(());
        }

        let geometry = page_geometry(&self.doc, page_id)?;
        let mut ops = String::new();
        for draw in draws {
            let name = format!("{}{}", IMAGE_RESOURCE_PREFIX, draw.xobject.0);
            register_xobject(&mut self.doc, page_id, &name, draw.xobject)?;

            ops.push_str(&image_draw_command(
                &name,
                geometry.image_matrix(draw.location, draw.size),
            ));
        }

        append_content(&mut self.doc, page_id, ops.into_bytes())
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn into_document(self) -> Document {
        self.doc
    }

    fn existing_page(&self, index: usize) -> Result<ObjectId> {
        self.existing.get(index).copied().ok_or_else(|| {
            SlideFitError::Config(format!(
                "Template page {} does not exist ({} pages)",
                index + 1,
                self.existing.len()
            ))
        })
    }
}
