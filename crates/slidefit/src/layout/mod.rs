//! Layout calculation for slide fitting
//!
//! - Value types (sizes, margins, grid shape, locations)
//! - Grid fitting (render size, slack gaps, placement locations)

mod fit;
mod types;

pub use fit::*;
pub use types::*;
