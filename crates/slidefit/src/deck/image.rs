//! Input images
//!
//! Reading native sizes and encoding images as PDF image XObjects.

use super::density::{Density, read_density};
use crate::constants::px_to_emu;
use crate::layout::Size;
use crate::types::Result;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use image::{ColorType, DynamicImage, ImageDecoder, ImageFormat, ImageReader};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

// =============================================================================
// Sources
// =============================================================================

/// An input image, its pixel dimensions and declared resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSource {
    pub path: PathBuf,
    pub width_px: u32,
    pub height_px: u32,
    /// Resolution from the file's own headers
    pub density: Option<Density>,
}

impl ImageSource {
    pub fn new(path: impl Into<PathBuf>, width_px: u32, height_px: u32) -> Self {
        Self {
            path: path.into(),
            width_px,
            height_px,
            density: None,
        }
    }

    pub fn with_density(mut self, density: Density) -> Self {
        self.density = Some(density);
        self
    }

    /// Native size in EMU, at the image's own resolution when it declares
    /// one and at `fallback_dpi` otherwise
    pub fn native_size(&self, fallback_dpi: f32) -> Size {
        let (x_dpi, y_dpi) = match self.density {
            Some(density) => (density.horizontal, density.vertical),
            None => (fallback_dpi, fallback_dpi),
        };
        Size::new(px_to_emu(self.width_px, x_dpi), px_to_emu(self.height_px, y_dpi))
    }
}

/// Read the dimensions and resolution of an image file
pub async fn read_image_source(path: impl AsRef<Path>) -> Result<ImageSource> {
    let path = path.as_ref().to_owned();
    let file = path.clone();
    let (width, height, density) = tokio::task::spawn_blocking(move || -> Result<_> {
        let bytes = std::fs::read(&file)?;
        let (width, height) = ImageReader::new(Cursor::new(&bytes))
            .with_guessed_format()?
            .into_dimensions()?;
        Ok((width, height, read_density(&bytes)))
    })
    .await??;

    if let Some(density) = density {
        log::debug!(
            "{}: {}x{} px at {}x{} dpi",
            path.display(),
            width,
            height,
            density.horizontal,
            density.vertical
        );
    }
    Ok(ImageSource {
        density,
        ..ImageSource::new(path, width, height)
    })
}

/// Read the dimensions of several image files, in order
pub async fn read_image_sources(paths: &[impl AsRef<Path>]) -> Result<Vec<ImageSource>> {
    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        sources.push(read_image_source(path).await?);
    }
    Ok(sources)
}

// =============================================================================
// XObject Encoding
// =============================================================================

/// Image data ready to embed in a PDF
#[derive(Debug, Clone)]
pub struct ImageXObject {
    pub width: u32,
    pub height: u32,
    /// "DeviceRGB" or "DeviceGray"
    pub color_space: &'static str,
    /// "DCTDecode" for JPEG passthrough, "FlateDecode" otherwise
    pub filter: &'static str,
    /// Encoded sample data
    pub data: Vec<u8>,
    /// Zlib-compressed 8-bit alpha channel, if the image has one
    pub alpha: Option<Vec<u8>>,
}

impl ImageXObject {
    /// Load and encode an image file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Encode image file contents.
    ///
    /// Gray and RGB JPEGs are embedded as-is; everything else is decoded
    /// and recompressed.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let format = image::guess_format(bytes)?;
        if format == ImageFormat::Jpeg {
            let decoder = ImageReader::with_format(Cursor::new(bytes), format).into_decoder()?;
            let (width, height) = decoder.dimensions();
            let color_space = match decoder.color_type() {
                ColorType::L8 => Some("DeviceGray"),
                ColorType::Rgb8 => Some("DeviceRGB"),
                _ => None,
            };
            if let Some(color_space) = color_space {
                return Ok(Self {
                    width,
                    height,
                    color_space,
                    filter: "DCTDecode",
                    data: bytes.to_vec(),
                    alpha: None,
                });
            }
        }

        let image = image::load_from_memory_with_format(bytes, format)?;
        Self::from_image(&image)
    }

    /// Encode decoded pixels
    pub fn from_image(image: &DynamicImage) -> Result<Self> {
        let (width, height) = (image.width(), image.height());
        let has_alpha = image.color().has_alpha();
        let gray = !image.color().has_color();

        let (samples, color_space) = if gray {
            (image.to_luma8().into_raw(), "DeviceGray")
        } else {
            (image.to_rgb8().into_raw(), "DeviceRGB")
        };

        let alpha = if has_alpha {
            let alpha: Vec<u8> = image.to_rgba8().pixels().map(|p| p[3]).collect();
            Some(zlib(&alpha)?)
        } else {
            None
        };

        Ok(Self {
            width,
            height,
            color_space,
            filter: "FlateDecode",
            data: zlib(&samples)?,
            alpha,
        })
    }

    /// Add the image (and its soft mask) to a document
    pub fn embed(&self, doc: &mut Document) -> ObjectId {
        let mut dict = self.base_dictionary(self.color_space);
        dict.set("Filter", Object::Name(self.filter.as_bytes().to_vec()));

        if let Some(alpha) = &self.alpha {
            let mut mask_dict = self.base_dictionary("DeviceGray");
            mask_dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));
            let mask_id = doc.add_object(Stream::new(mask_dict, alpha.clone()));
            dict.set("SMask", Object::Reference(mask_id));
        }

        doc.add_object(Stream::new(dict, self.data.clone()))
    }

    fn base_dictionary(&self, color_space: &str) -> Dictionary {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name(b"XObject".to_vec()));
        dict.set("Subtype", Object::Name(b"Image".to_vec()));
        dict.set("Width", Object::Integer(self.width as i64));
        dict.set("Height", Object::Integer(self.height as i64));
        dict.set("ColorSpace", Object::Name(color_space.as_bytes().to_vec()));
        dict.set("BitsPerComponent", Object::Integer(8));
        dict
    }
}

fn zlib(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}
