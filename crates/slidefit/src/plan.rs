//! Fill order
//!
//! Images are dealt onto the selected canvases in order: every location of
//! the first canvas (row-major), then the next canvas.

use crate::layout::Location;

/// One image assigned to a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Index into the input images
    pub image: usize,
    /// Index into the selected canvases
    pub canvas: usize,
    pub location: Location,
}

/// All assignments for a run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FillPlan {
    pub placements: Vec<Placement>,
    /// Images left over once every slot is used
    pub dropped: usize,
}

impl FillPlan {
    pub fn placed(&self) -> usize {
        self.placements.len()
    }

    pub fn overflowed(&self) -> bool {
        self.dropped > 0
    }

    /// Placements on one canvas, in fill order
    pub fn for_canvas(&self, canvas: usize) -> impl Iterator<Item = &Placement> {
        self.placements.iter().filter(move |p| p.canvas == canvas)
    }
}

/// Assign `image_count` images to `canvas_count` canvases with the given
/// per-canvas locations.
pub fn plan_fill(canvas_count: usize, locations: &[Location], image_count: usize) -> FillPlan {
    let slots = (0..canvas_count).flat_map(|canvas| {
        locations
            .iter()
            .map(move |&location| (canvas, location))
    });

    let placements: Vec<Placement> = slots
        .zip(0..image_count)
        .map(|((canvas, location), image)| Placement {
            image,
            canvas,
            location,
        })
        .collect();

    let dropped = image_count - placements.len();
    if dropped > 0 {
        log::warn!(
            "Not all images could be inserted: {} of {} dropped",
            dropped,
            image_count
        );
    }

    FillPlan {
        placements,
        dropped,
    }
}
