//! Fitting images into slides
//!
//! This module orchestrates a run:
//! 1. Read image sizes and load the template
//! 2. Fit the grid onto the canvas
//! 3. Select target canvases and deal images onto them
//! 4. Draw into the output document

use crate::deck::{Deck, ImageDraw, ImageSource, load_template, read_image_sources};
use crate::layout::{FitLayout, Size, compute_layout};
use crate::options::SlideFitOptions;
use crate::plan::{FillPlan, plan_fill};
use crate::select::{Selection, select_canvases};
use crate::stats::{LayoutStatistics, calculate_statistics};
use crate::types::*;
use lopdf::Document;

/// A recoverable problem: the run completed with fewer images placed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// Selected template pages were missing
    TemplateUnderCapacity { template_pages: usize },
    /// More images than slots; the rest were dropped
    ImageOverflow { dropped: usize, total: usize },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::TemplateUnderCapacity { template_pages } => write!(
                f,
                "pages missing in template relative to --pages (template has {} pages)",
                template_pages
            ),
            Warning::ImageOverflow { dropped, total } => write!(
                f,
                "not all images could be inserted by given command ({} of {} dropped)",
                dropped, total
            ),
        }
    }
}

/// Decisions made for a run, before anything is drawn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutPlan {
    pub layout: FitLayout,
    pub selection: Selection,
    pub fill: FillPlan,
    pub statistics: LayoutStatistics,
}

impl LayoutPlan {
    pub fn warnings(&self, template_pages: Option<usize>) -> Vec<Warning> {
        let mut warnings = Vec::new();
        if self.selection.truncated {
            warnings.push(Warning::TemplateUnderCapacity {
                template_pages: template_pages.unwrap_or(0),
            });
        }
        if self.fill.overflowed() {
            warnings.push(Warning::ImageOverflow {
                dropped: self.fill.dropped,
                total: self.statistics.images,
            });
        }
        warnings
    }
}

/// Result of a run
#[derive(Debug)]
pub struct Composition {
    pub document: Document,
    pub plan: LayoutPlan,
    pub warnings: Vec<Warning>,
}

impl Composition {
    /// Every image was placed and every selected page existed
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn statistics(&self) -> &LayoutStatistics {
        &self.plan.statistics
    }
}

/// Load inputs named by `options` and build the output document
pub async fn compose(options: &SlideFitOptions) -> Result<Composition> {
    options.validate()?;

    let images = read_image_sources(&options.images).await?;
    let template = match &options.template {
        Some(path) => Some(load_template(path).await?),
        None => None,
    };

    let options = options.clone();
    tokio::task::spawn_blocking(move || compose_with(template, &images, &options)).await?
}

/// Plan a run without drawing anything
pub async fn plan_run(options: &SlideFitOptions) -> Result<LayoutPlan> {
    options.validate()?;

    let images = read_image_sources(&options.images).await?;
    let deck = match &options.template {
        Some(path) => Some(Deck::from_template(load_template(path).await?)?),
        None => None,
    };

    plan_with(deck.as_ref(), &images, options)
}

/// Build the output document from already loaded inputs
pub fn compose_with(
    template: Option<Document>,
    images: &[ImageSource],
    options: &SlideFitOptions,
) -> Result<Composition> {
    let deck = match template {
        Some(doc) => Some(Deck::from_template(doc)?),
        None => None,
    };
    let template_pages = deck.as_ref().map(Deck::page_count);

    // Everything that can fail on bad input happens before a page is added
    let plan = plan_with(deck.as_ref(), images, options)?;
    let warnings = plan.warnings(template_pages);

    let mut deck = deck.unwrap_or_else(Deck::blank);
    let canvas = canvas_size(Some(&deck), options)?;
    let pages = deck.materialize(&plan.selection.targets, canvas)?;

    for (canvas_index, &page_id) in pages.iter().enumerate() {
        let draws = plan
            .fill
            .for_canvas(canvas_index)
            .map(|placement| {
                Ok(ImageDraw {
                    xobject: deck.embed_image(&images[placement.image])?,
                    location: placement.location,
                    size: plan.layout.render_size,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        deck.draw_images(page_id, &draws)?;
    }

    log::info!(
        "Placed {} of {} images on {} canvases ({} new)",
        plan.statistics.images_placed,
        plan.statistics.images,
        plan.statistics.canvases,
        plan.statistics.new_canvases
    );

    Ok(Composition {
        document: deck.into_document(),
        plan,
        warnings,
    })
}

fn plan_with(
    deck: Option<&Deck>,
    images: &[ImageSource],
    options: &SlideFitOptions,
) -> Result<LayoutPlan> {
    let first = images.first().ok_or(SlideFitError::NoImages)?;

    let source = options.canvas_source(deck.map(Deck::page_count))?;
    let canvas = canvas_size(deck, options)?;
    let margins = options.reserved.margins(canvas);

    let layout = compute_layout(canvas, margins, options.grid, first.native_size(options.dpi))?;
    let selection = select_canvases(images.len(), options.grid, &source)?;
    let fill = plan_fill(selection.targets.len(), &layout.locations, images.len());
    let statistics = calculate_statistics(images.len(), options.grid, &selection, &layout, &fill);

    Ok(LayoutPlan {
        layout,
        selection,
        fill,
        statistics,
    })
}

/// Canvas size for the run: the template's first page as displayed, or the
/// configured blank canvas.
fn canvas_size(deck: Option<&Deck>, options: &SlideFitOptions) -> Result<Size> {
    let first_page = match deck {
        Some(deck) => deck.existing_geometry(0)?,
        None => None,
    };
    Ok(first_page
        .map(|page| page.display_size())
        .unwrap_or_else(|| options.blank_canvas_size()))
}
