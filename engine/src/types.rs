//! Common types used across the engine

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::policy::Policy;

/// Crop growth stage, banded by days after transplant
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Ini,
    Mid,
    Late,
}

impl Stage {
    pub fn code(&self) -> &'static str {
        match self {
            Stage::Ini => "ini",
            Stage::Mid => "mid",
            Stage::Late => "late",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Treatment plots of the trial
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Treatment {
    /// Farmer-managed control
    T1,
    /// Soil moisture or water balance
    T2,
    /// Canopy-gated water balance
    T3,
    /// Strict multi-trigger conjunction
    T4,
}

impl Treatment {
    pub const ALL: [Treatment; 4] = [Treatment::T1, Treatment::T2, Treatment::T3, Treatment::T4];

    pub fn code(&self) -> &'static str {
        match self {
            Treatment::T1 => "T1",
            Treatment::T2 => "T2",
            Treatment::T3 => "T3",
            Treatment::T4 => "T4",
        }
    }

    /// Decision policy assigned to this plot
    pub fn policy(&self) -> Policy {
        match self {
            Treatment::T1 => Policy::Manual,
            Treatment::T2 => Policy::SoilOrBalance,
            Treatment::T3 => Policy::CanopyGated,
            Treatment::T4 => Policy::StrictConjunction,
        }
    }
}

impl std::fmt::Display for Treatment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown treatment plot: {0}")]
pub struct UnknownTreatment(pub String);

impl FromStr for Treatment {
    type Err = UnknownTreatment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "T1" => Ok(Treatment::T1),
            "T2" => Ok(Treatment::T2),
            "T3" => Ok(Treatment::T3),
            "T4" => Ok(Treatment::T4),
            _ => Err(UnknownTreatment(s.to_string())),
        }
    }
}

/// Outcome of a daily decision
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Decision {
    Irrigate,
    Skip,
    /// Decided by the operator outside the engine
    Manual,
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Irrigate => write!(f, "Irrigate"),
            Decision::Skip => write!(f, "Skip"),
            Decision::Manual => write!(f, "Manual"),
        }
    }
}

impl FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Irrigate" => Ok(Decision::Irrigate),
            "Skip" => Ok(Decision::Skip),
            "Manual" => Ok(Decision::Manual),
            other => Err(format!("Unknown decision: {}", other)),
        }
    }
}
