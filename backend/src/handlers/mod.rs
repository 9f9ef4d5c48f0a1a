//! HTTP handlers for the smart irrigation API

mod decisions;
mod health;
mod measurements;
mod plant_heights;
mod reporting;
mod settings;

pub use decisions::*;
pub use health::*;
pub use measurements::*;
pub use plant_heights::*;
pub use reporting::*;
pub use settings::*;
