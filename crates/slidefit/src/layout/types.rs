//! Layout data types
//!
//! All lengths are integer EMU. Locations are measured from the top-left
//! corner of the canvas.

use crate::types::{Axis, Result, SlideFitError};

/// Width and height of a canvas or an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: i64,
    pub height: i64,
}

impl Size {
    pub fn new(width: i64, height: i64) -> Self {
        Self { width, height }
    }

    /// Width over height
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

/// Offset of an image's top-left corner within a canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub left: i64,
    pub top: i64,
}

impl Location {
    pub fn new(left: i64, top: i64) -> Self {
        Self { left, top }
    }
}

/// Reserved blank space around the image grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Margins {
    pub top: i64,
    pub bottom: i64,
    pub left: i64,
    pub right: i64,
}

impl Margins {
    pub fn new(top: i64, bottom: i64, left: i64, right: i64) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
        }
    }

    /// Derive margins from percentages of the canvas.
    ///
    /// `vertical` is (top, bottom) in percent of the canvas height,
    /// `horizontal` is (left, right) in percent of the canvas width.
    /// Each side is truncated to whole EMU.
    pub fn from_percentages(canvas: Size, vertical: (f64, f64), horizontal: (f64, f64)) -> Self {
        let part = |percent: f64, length: i64| (percent / 100.0 * length as f64) as i64;
        Self {
            top: part(vertical.0, canvas.height),
            bottom: part(vertical.1, canvas.height),
            left: part(horizontal.0, canvas.width),
            right: part(horizontal.1, canvas.width),
        }
    }

    /// Space left for the grid once the margins are taken off the canvas.
    ///
    /// Fails if either axis is fully consumed.
    pub fn available(&self, canvas: Size) -> Result<Size> {
        let width = canvas.width - self.left - self.right;
        if width <= 0 {
            return Err(SlideFitError::InvalidMargins {
                axis: Axis::Horizontal,
                reserved: self.left + self.right,
                available: canvas.width,
            });
        }

        let height = canvas.height - self.top - self.bottom;
        if height <= 0 {
            return Err(SlideFitError::InvalidMargins {
                axis: Axis::Vertical,
                reserved: self.top + self.bottom,
                available: canvas.height,
            });
        }

        Ok(Size::new(width, height))
    }
}

/// Rows and columns of images on each canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridShape {
    pub rows: usize,
    pub cols: usize,
}

impl GridShape {
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        let grid = Self { rows, cols };
        grid.validate()?;
        Ok(grid)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(SlideFitError::InvalidGrid {
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }

    /// Number of images per canvas
    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Canvases needed to hold `image_count` images
    pub fn canvases_for(&self, image_count: usize) -> usize {
        image_count.div_ceil(self.cell_count())
    }
}

impl Default for GridShape {
    fn default() -> Self {
        Self { rows: 1, cols: 1 }
    }
}

/// Which axis limited the render size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingAxis {
    /// Width kept its cell length, height was scaled to match
    Width,
    /// Height kept its cell length, width was scaled to match
    Height,
}

/// Result of fitting the grid onto a canvas
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FitLayout {
    /// Size every image is drawn at
    pub render_size: Size,
    /// Image positions in fill order (row-major)
    pub locations: Vec<Location>,
    /// Axis that bound the aspect-locked scale
    pub binding: BindingAxis,
}

impl FitLayout {
    /// Number of images one canvas holds
    pub fn capacity(&self) -> usize {
        self.locations.len()
    }
}
