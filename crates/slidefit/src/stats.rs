use crate::layout::{FitLayout, GridShape};
use crate::plan::FillPlan;
use crate::select::Selection;

/// Statistics about a fitting run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutStatistics {
    /// Number of input images
    pub images: usize,
    /// Grid cells per canvas
    pub images_per_canvas: usize,
    /// Canvases receiving images (or available to)
    pub canvases: usize,
    /// Template canvases reused
    pub reused_canvases: usize,
    /// Canvases created for this run
    pub new_canvases: usize,
    /// Total slots across all canvases
    pub capacity: usize,
    pub images_placed: usize,
    pub images_dropped: usize,
    /// Selected template pages were missing
    pub truncated: bool,
}

/// Calculate statistics for a run
pub fn calculate_statistics(
    image_count: usize,
    grid: GridShape,
    selection: &Selection,
    layout: &FitLayout,
    plan: &FillPlan,
) -> LayoutStatistics {
    let canvases = selection.targets.len();

    LayoutStatistics {
        images: image_count,
        images_per_canvas: grid.cell_count(),
        canvases,
        reused_canvases: selection.existing_count(),
        new_canvases: selection.new_count(),
        capacity: canvases * layout.capacity(),
        images_placed: plan.placed(),
        images_dropped: plan.dropped,
        truncated: selection.truncated,
    }
}
