//! Core value types shared by the ensemble engine
//!
//! - `NVec3` / `Force` – 3-component vectors (nalgebra)
//! - `Species` – per-particle tag, knows its own mass
//!
//! Phase-space storage itself lives in [`crate::simulation::ensemble`]; the
//! types here are small and `Copy` so callbacks can hand them around freely.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

pub type NVec3 = Vector3<f64>;

/// A force vector, in newtons
pub type Force = NVec3;

/// Number of spatial dimensions. Particle `i` owns `[DIMS*i, DIMS*i + DIMS)`
/// in every flat phase-space buffer.
pub const DIMS: usize = 3;

/// Unified atomic mass unit in kg
const AMU: f64 = 1.660_539_066_60e-27;

/// Particle species tag
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Species {
    #[default]
    #[serde(rename = "CaF")]
    CaF, // calcium monofluoride
    #[serde(rename = "Rb87")]
    Rb87,
    #[serde(rename = "Li7")]
    Li7,
    #[serde(rename = "Sr88")]
    Sr88,
}

impl Species {
    /// Mass of one particle of this species, in kg
    pub fn mass(self) -> f64 {
        let amu = match self {
            Species::CaF => 59.076,
            Species::Rb87 => 86.909_180,
            Species::Li7 => 7.016_003,
            Species::Sr88 => 87.905_612,
        };
        amu * AMU
    }

    pub fn name(self) -> &'static str {
        match self {
            Species::CaF => "CaF",
            Species::Rb87 => "Rb87",
            Species::Li7 => "Li7",
            Species::Sr88 => "Sr88",
        }
    }
}

/// A coordinate axis
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    #[serde(rename = "x")]
    X,
    #[serde(rename = "y")]
    Y,
    #[serde(rename = "z")]
    Z,
}

impl Axis {
    /// Offset of this axis within a particle's 3-slot block
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Read a 3-component slice as a vector
#[inline]
pub fn vec3(s: &[f64]) -> NVec3 {
    NVec3::new(s[0], s[1], s[2])
}
