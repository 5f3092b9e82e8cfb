use crate::constants::{DEFAULT_DPI, DEFAULT_OUTPUT, MIN_DPI};
use crate::layout::{GridShape, Margins, Size};
use crate::range::PageSelection;
use crate::select::CanvasSource;
use crate::types::*;
use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Space reserved around the grid, in percent of the canvas.
/// Top and bottom are relative to the canvas height, left and right to
/// its width.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReservedSpace {
    pub top_percent: f64,
    pub bottom_percent: f64,
    pub left_percent: f64,
    pub right_percent: f64,
}

impl ReservedSpace {
    /// Margins in EMU for a canvas of the given size
    pub fn margins(&self, canvas: Size) -> Margins {
        Margins::from_percentages(
            canvas,
            (self.top_percent, self.bottom_percent),
            (self.left_percent, self.right_percent),
        )
    }
}

/// Everything a fitting run needs
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SlideFitOptions {
    // Input
    pub images: Vec<PathBuf>,
    pub template: Option<PathBuf>,
    /// Template pages to use, e.g. `2,5-7`. Ignored without a template.
    pub pages: Option<String>,

    // Output
    pub output: PathBuf,

    // Layout
    pub grid: GridShape,
    pub reserved: ReservedSpace,

    // Canvas for decks created without a template
    pub canvas: CanvasPreset,
    pub orientation: Orientation,

    /// Resolution for images whose headers declare none
    pub dpi: f32,
}

impl Default for SlideFitOptions {
    fn default() -> Self {
        Self {
            images: Vec::new(),
            template: None,
            pages: None,
            output: PathBuf::from(DEFAULT_OUTPUT),
            grid: GridShape::default(),
            reserved: ReservedSpace::default(),
            canvas: CanvasPreset::default(),
            orientation: Orientation::default(),
            dpi: DEFAULT_DPI,
        }
    }
}

impl SlideFitOptions {
    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| SlideFitError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| SlideFitError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if self.images.is_empty() {
            return Err(SlideFitError::NoImages);
        }

        self.grid.validate()?;

        let percents = [
            ("top", self.reserved.top_percent),
            ("bottom", self.reserved.bottom_percent),
            ("left", self.reserved.left_percent),
            ("right", self.reserved.right_percent),
        ];
        for (side, value) in percents {
            if !value.is_finite() || value < 0.0 {
                return Err(SlideFitError::Config(format!(
                    "Reserved {} space must be a non-negative percentage, got {}",
                    side, value
                )));
            }
        }
        if self.reserved.top_percent + self.reserved.bottom_percent >= 100.0 {
            return Err(SlideFitError::Config(
                "Reserved vertical space must sum to less than 100%".to_string(),
            ));
        }
        if self.reserved.left_percent + self.reserved.right_percent >= 100.0 {
            return Err(SlideFitError::Config(
                "Reserved horizontal space must sum to less than 100%".to_string(),
            ));
        }

        if !(self.dpi.is_finite() && self.dpi >= MIN_DPI) {
            return Err(SlideFitError::Config(format!(
                "DPI must be at least {}, got {}",
                MIN_DPI, self.dpi
            )));
        }

        if let CanvasPreset::Custom {
            width_mm,
            height_mm,
        } = self.canvas
        {
            if width_mm <= 0.0 || height_mm <= 0.0 {
                return Err(SlideFitError::Config(
                    "Custom canvas dimensions must be positive".to_string(),
                ));
            }
        }

        if self.template.is_some() {
            self.page_selection()?;
        }

        Ok(())
    }

    /// Parsed page selection, if any
    pub fn page_selection(&self) -> Result<Option<PageSelection>> {
        self.pages.as_deref().map(PageSelection::parse).transpose()
    }

    /// Canvas size for a deck created without a template
    pub fn blank_canvas_size(&self) -> Size {
        self.canvas.size(self.orientation)
    }

    /// Build the canvas source for a template with `template_pages` pages
    /// (`None` when running without a template).
    pub fn canvas_source(&self, template_pages: Option<usize>) -> Result<CanvasSource> {
        let Some(page_count) = template_pages else {
            if self.pages.is_some() {
                log::debug!("Ignoring page selection: no template given");
            }
            return Ok(CanvasSource::Blank);
        };
        let source = match self.page_selection()? {
            None => CanvasSource::Template { page_count },
            Some(pages) => CanvasSource::TemplatePages { page_count, pages },
        };
        Ok(source)
    }
}
