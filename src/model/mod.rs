//! Module defining the data model.

mod color;

pub use self::color::{Color, Palette};
