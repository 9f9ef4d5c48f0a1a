//! Domain models for the irrigation decision engine

mod config;
mod decision;
mod measurement;

pub use config::*;
pub use decision::*;
pub use measurement::*;
