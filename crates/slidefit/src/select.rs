//! Canvas selection
//!
//! Decides which canvases receive images: fresh blank ones, the pages of a
//! template topped up with clones of its last page, or an explicit subset of
//! template pages.

use crate::layout::GridShape;
use crate::range::PageSelection;
use crate::types::Result;

/// Where target canvases come from
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasSource {
    /// No template: every canvas is created blank
    Blank,
    /// Use every template page, then add pages as needed
    Template { page_count: usize },
    /// Use only the selected template pages, never add pages
    TemplatePages {
        page_count: usize,
        pages: PageSelection,
    },
}

/// Layout a new canvas is created from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewCanvasLayout {
    /// Default blank page
    Blank,
    /// Same geometry as the existing canvas at this index
    CloneOf(usize),
}

/// One canvas to fill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasTarget {
    /// Existing template canvas, 0-based in document order
    Existing(usize),
    /// Canvas to be created
    New(NewCanvasLayout),
}

impl CanvasTarget {
    pub fn is_new(&self) -> bool {
        matches!(self, CanvasTarget::New(_))
    }
}

/// Ordered canvases to fill
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    pub targets: Vec<CanvasTarget>,
    /// Some selected template pages did not exist
    pub truncated: bool,
}

impl Selection {
    pub fn new_count(&self) -> usize {
        self.targets.iter().filter(|t| t.is_new()).count()
    }

    pub fn existing_count(&self) -> usize {
        self.targets.len() - self.new_count()
    }
}

/// Choose the canvases that will receive `image_count` images.
pub fn select_canvases(
    image_count: usize,
    grid: GridShape,
    source: &CanvasSource,
) -> Result<Selection> {
    grid.validate()?;
    let required = grid.canvases_for(image_count);

    let selection = match source {
        CanvasSource::Blank => Selection {
            targets: vec![CanvasTarget::New(NewCanvasLayout::Blank); required],
            truncated: false,
        },
        CanvasSource::Template { page_count } => extend_template(*page_count, required),
        CanvasSource::TemplatePages { page_count, pages } => {
            resolve_pages(*page_count, pages)
        }
    };

    log::debug!(
        "Selected {} canvases ({} new) for {} images",
        selection.targets.len(),
        selection.new_count(),
        image_count
    );

    Ok(selection)
}

fn extend_template(page_count: usize, required: usize) -> Selection {
    let layout = match page_count.checked_sub(1) {
        Some(last) => NewCanvasLayout::CloneOf(last),
        None => NewCanvasLayout::Blank,
    };

    let mut targets: Vec<CanvasTarget> = (0..page_count).map(CanvasTarget::Existing).collect();
    let missing = required.saturating_sub(page_count);
    targets.extend(std::iter::repeat_n(CanvasTarget::New(layout), missing));

    Selection {
        targets,
        truncated: false,
    }
}

fn resolve_pages(page_count: usize, pages: &PageSelection) -> Selection {
    let mut targets = Vec::new();
    let mut truncated = false;

    for index in pages.sorted_indices() {
        if index >= page_count {
            log::warn!(
                "Pages missing in template relative to --pages: page {} requested, template has {}",
                index + 1,
                page_count
            );
            truncated = true;
            break;
        }
        targets.push(CanvasTarget::Existing(index));
    }

    Selection { targets, truncated }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn existing(indices: &[usize]) -> Vec<CanvasTarget> {
        indices.iter().copied().map(CanvasTarget::Existing).collect()
    }

    #[test]
    fn test_blank_creates_required_canvases() {
        let selection =
            select_canvases(10, GridShape::new(2, 2).unwrap(), &CanvasSource::Blank).unwrap();
        assert_eq!(selection.targets.len(), 3);
        assert!(
            selection
                .targets
                .iter()
                .all(|t| *t == CanvasTarget::New(NewCanvasLayout::Blank))
        );
        assert!(!selection.truncated);
    }

    #[test]
    fn test_blank_with_no_images() {
        let selection =
            select_canvases(0, GridShape::default(), &CanvasSource::Blank).unwrap();
        assert!(selection.targets.is_empty());
    }

    #[test]
    fn test_template_is_topped_up_with_clones_of_last_page() {
        let selection = select_canvases(
            7,
            GridShape::new(1, 2).unwrap(),
            &CanvasSource::Template { page_count: 2 },
        )
        .unwrap();

        let mut expected = existing(&[0, 1]);
        expected.push(CanvasTarget::New(NewCanvasLayout::CloneOf(1)));
        expected.push(CanvasTarget::New(NewCanvasLayout::CloneOf(1)));
        assert_eq!(selection.targets, expected);
        assert_eq!(selection.new_count(), 2);
        assert_eq!(selection.existing_count(), 2);
    }

    #[test]
    fn test_template_keeps_all_pages_when_more_than_needed() {
        let selection = select_canvases(
            1,
            GridShape::default(),
            &CanvasSource::Template { page_count: 4 },
        )
        .unwrap();
        assert_eq!(selection.targets, existing(&[0, 1, 2, 3]));
    }

    #[test]
    fn test_empty_template_falls_back_to_blank_layout() {
        let selection = select_canvases(
            2,
            GridShape::default(),
            &CanvasSource::Template { page_count: 0 },
        )
        .unwrap();
        assert_eq!(
            selection.targets,
            vec![CanvasTarget::New(NewCanvasLayout::Blank); 2]
        );
    }

    #[test]
    fn test_template_pages_resolve_in_sorted_order() {
        let source = CanvasSource::TemplatePages {
            page_count: 5,
            pages: PageSelection::parse("4-5,2").unwrap(),
        };
        let selection = select_canvases(3, GridShape::default(), &source).unwrap();
        assert_eq!(selection.targets, existing(&[1, 3, 4]));
        assert!(!selection.truncated);
    }

    #[test]
    fn test_template_pages_stop_at_first_missing_page() {
        let source = CanvasSource::TemplatePages {
            page_count: 3,
            pages: PageSelection::parse("2,5").unwrap(),
        };
        let selection = select_canvases(2, GridShape::default(), &source).unwrap();
        assert_eq!(selection.targets, existing(&[1]));
        assert!(selection.truncated);
    }

    #[test]
    fn test_huge_range_against_small_template() {
        let source = CanvasSource::TemplatePages {
            page_count: 3,
            pages: PageSelection::parse("2,1-4000000000").unwrap(),
        };
        let selection = select_canvases(5, GridShape::default(), &source).unwrap();
        assert_eq!(selection.targets, existing(&[0, 1, 2]));
        assert!(selection.truncated);
    }

    #[test]
    fn test_template_pages_never_create_canvases() {
        let source = CanvasSource::TemplatePages {
            page_count: 5,
            pages: PageSelection::parse("1").unwrap(),
        };
        let selection = select_canvases(40, GridShape::default(), &source).unwrap();
        assert_eq!(selection.targets, existing(&[0]));
        assert_eq!(selection.new_count(), 0);
    }

    #[test]
    fn test_duplicate_pages_are_targeted_once() {
        let source = CanvasSource::TemplatePages {
            page_count: 5,
            pages: PageSelection::parse("3,1-3").unwrap(),
        };
        let selection = select_canvases(3, GridShape::default(), &source).unwrap();
        assert_eq!(selection.targets, existing(&[0, 1, 2]));
    }

    #[test]
    fn test_zero_grid_is_rejected() {
        let grid = GridShape { rows: 0, cols: 2 };
        assert!(select_canvases(1, grid, &CanvasSource::Blank).is_err());
    }
}
