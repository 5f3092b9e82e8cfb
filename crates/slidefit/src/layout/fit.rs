//! Grid fitting
//!
//! Sizes one image cell so that `rows × cols` images of the reference
//! image's aspect ratio fit inside the canvas margins, then spreads the
//! leftover space into gaps.

use crate::types::{Result, SlideFitError};

use super::{BindingAxis, FitLayout, GridShape, Location, Margins, Size};

// =============================================================================
// Layout
// =============================================================================

/// Compute the render size and placement locations for one canvas.
///
/// # Arguments
/// * `canvas` - Canvas size
/// * `margins` - Reserved space around the grid
/// * `grid` - Rows and columns per canvas
/// * `reference` - Native size of the first image; all images are
///   assumed to share its aspect ratio
pub fn compute_layout(
    canvas: Size,
    margins: Margins,
    grid: GridShape,
    reference: Size,
) -> Result<FitLayout> {
    grid.validate()?;
    if reference.width <= 0 || reference.height <= 0 {
        return Err(SlideFitError::InvalidImageSize {
            width: reference.width,
            height: reference.height,
        });
    }

    let available = margins.available(canvas)?;
    let (render_size, binding) = fit_render_size(available, grid, reference);

    let width_slice = slack_slice(available.width, render_size.width, grid.cols);
    let height_slice = slack_slice(available.height, render_size.height, grid.rows);

    let lefts: Vec<i64> = (0..grid.cols as i64)
        .map(|col| col * render_size.width + width_slice + margins.left)
        .collect();

    let mut locations = Vec::with_capacity(grid.cell_count());
    for row in 0..grid.rows as i64 {
        let top = row * render_size.height + height_slice + margins.top;
        for &left in &lefts {
            locations.push(Location::new(left, top));
        }
    }

    log::debug!(
        "Fitted {}x{} grid: render {}x{} EMU ({:?}-bound), slices {}/{}",
        grid.rows,
        grid.cols,
        render_size.width,
        render_size.height,
        binding,
        width_slice,
        height_slice
    );

    Ok(FitLayout {
        render_size,
        locations,
        binding,
    })
}

// =============================================================================
// Sizing
// =============================================================================

/// Aspect-locked size of one image.
///
/// An axis keeps the native length while the whole row or column fits
/// uncompressed, otherwise it is bounded by its share of the available
/// space. The axis scaled down the most then binds the other one.
fn fit_render_size(available: Size, grid: GridShape, reference: Size) -> (Size, BindingAxis) {
    let width = axis_length(reference.width, available.width, grid.cols);
    let height = axis_length(reference.height, available.height, grid.rows);

    let width_frac = width as f64 / reference.width as f64;
    let height_frac = height as f64 / reference.height as f64;

    match binding_axis(width_frac, height_frac) {
        BindingAxis::Width => (
            Size::new(width, (reference.height as f64 * width_frac).round() as i64),
            BindingAxis::Width,
        ),
        BindingAxis::Height => (
            Size::new((reference.width as f64 * height_frac).round() as i64, height),
            BindingAxis::Height,
        ),
    }
}

/// The smaller scale fraction binds. Ties go to height.
fn binding_axis(width_frac: f64, height_frac: f64) -> BindingAxis {
    if width_frac < height_frac {
        BindingAxis::Width
    } else {
        BindingAxis::Height
    }
}

/// Length of one cell along an axis holding `count` images.
fn axis_length(native: i64, available: i64, count: usize) -> i64 {
    if native.saturating_mul(count as i64) < available {
        native
    } else {
        available / count as i64
    }
}

/// One gap along an axis: leftover space split into `count + 1` slices.
///
/// The remainder of the floor division stays in the trailing gap.
fn slack_slice(available: i64, render_length: i64, count: usize) -> i64 {
    let slack = available - render_length * count as i64;
    slack / (count as i64 + 1)
}

// =============================================================================
// Tests
// =============================================================================
