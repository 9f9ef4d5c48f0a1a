//! Irrigation decision engine for the smart irrigation trial
//!
//! This crate holds the pure decision core shared by the backend service and
//! the WebAssembly module: growth stage banding, the NDVI canopy model, the
//! root-zone water balance and the per-treatment irrigation policies.

pub mod canopy;
pub mod models;
pub mod policy;
pub mod stage;
pub mod types;
pub mod validation;
pub mod water_balance;

pub use models::*;
pub use policy::{DecisionEngine, Policy};
pub use types::*;
pub use validation::*;
