//! PID tuning presets

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use simcore::SimError;

use crate::pid::PidGains;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PidPreset {
    /// Fast response, noticeable overshoot
    Aggressive,
    Balanced,
    /// Slow and well damped
    Smooth,
}

impl PidPreset {
    pub const ALL: [PidPreset; 3] = [PidPreset::Aggressive, PidPreset::Balanced, PidPreset::Smooth];

    pub const fn gains(self) -> PidGains {
        match self {
            PidPreset::Aggressive => PidGains { kp: 1.5, ki: 0.3, kd: 0.5 },
            PidPreset::Balanced => PidGains { kp: 0.5, ki: 0.1, kd: 0.2 },
            PidPreset::Smooth => PidGains { kp: 0.2, ki: 0.05, kd: 0.1 },
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            PidPreset::Aggressive => "aggressive",
            PidPreset::Balanced => "balanced",
            PidPreset::Smooth => "smooth",
        }
    }
}

impl fmt::Display for PidPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PidPreset {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PidPreset::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                SimError::validation(
                    "pid_preset",
                    format!("unknown preset {s:?}, valid options: aggressive, balanced, smooth"),
                )
            })
    }
}

impl From<PidPreset> for PidGains {
    fn from(preset: PidPreset) -> Self {
        preset.gains()
    }
}
