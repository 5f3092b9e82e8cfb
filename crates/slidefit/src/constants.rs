//! Shared constants for slide fitting
//!
//! All layout arithmetic is done in English Metric Units (EMU), an integer
//! unit fine enough that flooring to it loses nothing visible. PDF points are
//! only used when writing the document.

// =============================================================================
// Unit Conversion
// =============================================================================

/// EMU per inch
pub const EMU_PER_INCH: i64 = 914_400;

/// EMU per millimeter (1 mm is 36000 EMU)
pub const EMU_PER_MM: i64 = 36_000;

/// EMU per PDF point (1 inch = 72 points)
pub const EMU_PER_PT: i64 = 12_700;

/// Convert EMU to PDF points
#[inline]
pub fn emu_to_pt(emu: i64) -> f32 {
    (emu as f64 / EMU_PER_PT as f64) as f32
}

/// Convert PDF points to EMU
#[inline]
pub fn pt_to_emu(pt: f32) -> i64 {
    (pt as f64 * EMU_PER_PT as f64).round() as i64
}

/// Convert a pixel count to EMU at the given resolution
#[inline]
pub fn px_to_emu(px: u32, dpi: f32) -> i64 {
    (px as f64 * EMU_PER_INCH as f64 / dpi as f64) as i64
}

// =============================================================================
// Defaults
// =============================================================================

/// Page size in points used when a page declares no MediaBox
/// (a 4:3 slide, 10in × 7.5in)
pub const DEFAULT_PAGE_DIMENSIONS: (f32, f32) = (720.0, 540.0);

/// Resolution for images whose headers declare none, unless configured
pub const DEFAULT_DPI: f32 = 72.0;

/// Lowest resolution accepted from options or image headers
pub const MIN_DPI: f32 = 1.0;

/// Default output file name
pub const DEFAULT_OUTPUT: &str = "slidefit-output.pdf";

/// Prefix for image XObject resource names
pub const IMAGE_RESOURCE_PREFIX: &str = "SfIm";
