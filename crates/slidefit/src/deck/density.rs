//! Image resolution from file headers
//!
//! PNG carries it in a `pHYs` chunk and JPEG in its JFIF segment. Anything
//! else (TIFF, or a JPEG without JFIF density) is tried through EXIF.

use crate::constants::MIN_DPI;
use exif::{In, Reader, Tag, Value};
use std::io::Cursor;

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const INCHES_PER_METER: f32 = 0.0254;
const CM_PER_INCH: f32 = 2.54;

/// Horizontal and vertical resolution in dots per inch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Density {
    pub horizontal: f32,
    pub vertical: f32,
}

impl Density {
    /// Whole-dpi density, or `None` when either axis rounds below `MIN_DPI`
    pub fn from_dpi(horizontal: f32, vertical: f32) -> Option<Self> {
        let (horizontal, vertical) = (horizontal.round(), vertical.round());
        let usable = |dpi: f32| dpi.is_finite() && dpi >= MIN_DPI;
        (usable(horizontal) && usable(vertical)).then_some(Self {
            horizontal,
            vertical,
        })
    }
}

/// Resolution declared by an image file, if it declares a usable one
pub fn read_density(bytes: &[u8]) -> Option<Density> {
    if bytes.starts_with(PNG_SIGNATURE) {
        return png_density(bytes);
    }
    if bytes.starts_with(&[0xFF, 0xD8]) {
        if let Some(density) = jfif_density(bytes) {
            return Some(density);
        }
    }
    exif_density(bytes)
}

fn be_u16(bytes: &[u8], at: usize) -> Option<u16> {
    Some(u16::from_be_bytes(bytes.get(at..at + 2)?.try_into().ok()?))
}

fn be_u32(bytes: &[u8], at: usize) -> Option<u32> {
    Some(u32::from_be_bytes(bytes.get(at..at + 4)?.try_into().ok()?))
}

/// `pHYs` density; the chunk must precede the image data
fn png_density(bytes: &[u8]) -> Option<Density> {
    let mut at = PNG_SIGNATURE.len();
    loop {
        let length = be_u32(bytes, at)? as usize;
        let kind = bytes.get(at + 4..at + 8)?;
        let data = bytes.get(at + 8..(at + 8).checked_add(length)?)?;
        match kind {
            b"pHYs" => {
                // Unit 0 only gives the pixel aspect ratio
                if *data.get(8)? != 1 {
                    return None;
                }
                let x = be_u32(data, 0)? as f32 * INCHES_PER_METER;
                let y = be_u32(data, 4)? as f32 * INCHES_PER_METER;
                return Density::from_dpi(x, y);
            }
            b"IDAT" | b"IEND" => return None,
            _ => at += 12 + length,
        }
    }
}

/// JFIF APP0 density; segments are scanned up to the start of scan
fn jfif_density(bytes: &[u8]) -> Option<Density> {
    let mut at = 2;
    loop {
        if *bytes.get(at)? != 0xFF {
            return None;
        }
        let marker = *bytes.get(at + 1)?;
        match marker {
            // Fill byte
            0xFF => {
                at += 1;
                continue;
            }
            // Start of scan or end of image
            0xDA | 0xD9 => return None,
            // Markers without a length
            0x01 | 0xD0..=0xD7 => {
                at += 2;
                continue;
            }
            _ => {}
        }

        let length = be_u16(bytes, at + 2)? as usize;
        let segment = bytes.get(at + 4..at + 2 + length)?;
        if marker == 0xE0 && segment.starts_with(b"JFIF\0") {
            let x = be_u16(segment, 8)? as f32;
            let y = be_u16(segment, 10)? as f32;
            return match segment.get(7)? {
                1 => Density::from_dpi(x, y),
                2 => Density::from_dpi(x * CM_PER_INCH, y * CM_PER_INCH),
                _ => None,
            };
        }
        at += 2 + length;
    }
}

/// EXIF XResolution and YResolution
fn exif_density(bytes: &[u8]) -> Option<Density> {
    let exif = Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .ok()?;

    let resolution = |tag| match exif.get_field(tag, In::PRIMARY) {
        Some(field) => match field.value {
            Value::Rational(ref v) if !v.is_empty() => Some(v[0].to_f64() as f32),
            _ => None,
        },
        None => None,
    };
    let x = resolution(Tag::XResolution)?;
    let y = resolution(Tag::YResolution).unwrap_or(x);

    // ResolutionUnit 2 is inches (the default), 3 is centimeters
    let per_cm = exif
        .get_field(Tag::ResolutionUnit, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        == Some(3);
    if per_cm {
        Density::from_dpi(x * CM_PER_INCH, y * CM_PER_INCH)
    } else {
        Density::from_dpi(x, y)
    }
}
