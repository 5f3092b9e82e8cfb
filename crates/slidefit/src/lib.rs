pub mod compose;
pub mod constants;
pub mod deck;
pub mod layout;
mod options;
pub mod plan;
pub mod range;
pub mod select;
mod stats;
mod types;

pub use compose::{Composition, LayoutPlan, Warning, compose, compose_with, plan_run};
pub use deck::{Deck, Density, ImageSource, load_template, read_image_sources, save_deck};
pub use layout::{BindingAxis, FitLayout, GridShape, Location, Margins, Size, compute_layout};
pub use options::*;
pub use range::PageSelection;
pub use select::{CanvasSource, CanvasTarget, NewCanvasLayout, Selection, select_canvases};
pub use stats::*;
pub use types::*;
