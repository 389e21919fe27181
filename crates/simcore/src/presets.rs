//! Gravity environments
//!
//! Read-only table shared by every layer so boundary code and the engine agree
//! on the same numbers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::SimError;

/// Predefined gravity environments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum GravityPreset {
    Earth,
    Mars,
    Moon,
}

impl GravityPreset {
    pub const ALL: [GravityPreset; 3] = [GravityPreset::Earth, GravityPreset::Mars, GravityPreset::Moon];

    /// Surface gravitational acceleration (m/s²)
    pub const fn acceleration(self) -> f64 {
        match self {
            GravityPreset::Earth => 9.81,
            GravityPreset::Mars => 3.71,
            GravityPreset::Moon => 1.62,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            GravityPreset::Earth => "EARTH",
            GravityPreset::Mars => "MARS",
            GravityPreset::Moon => "MOON",
        }
    }
}

impl fmt::Display for GravityPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GravityPreset {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GravityPreset::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                SimError::validation(
                    "gravity",
                    format!("unknown preset {s:?}, valid options: EARTH, MARS, MOON"),
                )
            })
    }
}

impl TryFrom<String> for GravityPreset {
    type Error = SimError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<GravityPreset> for String {
    fn from(preset: GravityPreset) -> Self {
        preset.name().to_owned()
    }
}

/// Gravity as it arrives from a boundary: a number or a preset name
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GravitySetting {
    Value(f64),
    Preset(GravityPreset),
}

impl GravitySetting {
    pub fn acceleration(self) -> f64 {
        match self {
            GravitySetting::Value(g) => g,
            GravitySetting::Preset(preset) => preset.acceleration(),
        }
    }
}

impl From<GravityPreset> for GravitySetting {
    fn from(preset: GravityPreset) -> Self {
        GravitySetting::Preset(preset)
    }
}

impl From<f64> for GravitySetting {
    fn from(value: f64) -> Self {
        GravitySetting::Value(value)
    }
}

/// `deserialize_with` helper for plain `f64` gravity fields
pub fn deserialize_gravity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    GravitySetting::deserialize(deserializer).map(GravitySetting::acceleration)
}
