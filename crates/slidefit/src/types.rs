use std::path::PathBuf;
use thiserror::Error;

use crate::constants::{EMU_PER_INCH, EMU_PER_MM};
use crate::layout::Size;

#[derive(Error, Debug)]
pub enum SlideFitError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("Invalid page selection \"{expr}\": {reason}")]
    Parse { expr: String, reason: String },
    #[error(
        "Reserved {axis} space ({reserved}) leaves nothing of the canvas {axis} ({available})"
    )]
    InvalidMargins {
        axis: Axis,
        reserved: i64,
        available: i64,
    },
    #[error("Grid must have at least one row and one column, got {rows},{cols}")]
    InvalidGrid { rows: usize, cols: usize },
    #[error("Reference image has no area ({width}x{height})")]
    InvalidImageSize { width: i64, height: i64 },
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("No images to place")]
    NoImages,
    #[error("File exist, not over-writing ({})", .0.display())]
    DestinationExists(PathBuf),
}

pub type Result<T> = std::result::Result<T, SlideFitError>;

/// Canvas axis, used for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::Horizontal => f.write_str("width"),
            Axis::Vertical => f.write_str("height"),
        }
    }
}

/// Canvas orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// Width > height (default for slides)
    #[default]
    Landscape,
    /// Height > width
    Portrait,
}

/// Canvas sizes for decks created without a template
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CanvasPreset {
    /// 4:3 slide, 10in × 7.5in
    #[default]
    Standard,
    /// 16:9 slide, 13.333in × 7.5in
    Widescreen,
    A4,
    Letter,
    Custom { width_mm: f32, height_mm: f32 },
}

impl CanvasPreset {
    /// Base dimensions in EMU, landscape for slide presets
    pub fn dimensions_emu(self) -> (i64, i64) {
        match self {
            CanvasPreset::Standard => (10 * EMU_PER_INCH, EMU_PER_INCH * 15 / 2),
            CanvasPreset::Widescreen => (12_192_000, EMU_PER_INCH * 15 / 2),
            CanvasPreset::A4 => (297 * EMU_PER_MM, 210 * EMU_PER_MM),
            CanvasPreset::Letter => (11 * EMU_PER_INCH, EMU_PER_INCH * 17 / 2),
            CanvasPreset::Custom {
                width_mm,
                height_mm,
            } => (
                (width_mm as f64 * EMU_PER_MM as f64) as i64,
                (height_mm as f64 * EMU_PER_MM as f64) as i64,
            ),
        }
    }

    /// Canvas size with orientation applied
    pub fn size(self, orientation: Orientation) -> Size {
        let (a, b) = self.dimensions_emu();
        let (long, short) = (a.max(b), a.min(b));
        match orientation {
            Orientation::Landscape => Size::new(long, short),
            Orientation::Portrait => Size::new(short, long),
        }
    }
}
