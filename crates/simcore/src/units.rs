//! Angle helpers
//!
//! Everything inside the simulation runs in radians. Serialized records carry
//! degrees; the [`degrees`] module converts at that boundary and is meant to be
//! used with `#[serde(with = "simcore::units::degrees")]`.

/// Wrap an angle to [-pi, pi]
pub fn wrap_angle(angle: f64) -> f64 {
    angle.sin().atan2(angle.cos())
}

/// Serde adapter: radians in memory, degrees on the wire
pub mod degrees {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(radians: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(radians.to_degrees())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        f64::deserialize(deserializer).map(f64::to_radians)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use serde::{Deserialize, Serialize};
    use std::f64::consts::PI;

    #[derive(Serialize, Deserialize)]
    struct Heading {
        #[serde(with = "degrees")]
        value: f64,
    }

    #[test]
    fn test_wrap_angle_stays_in_range() {
        assert_abs_diff_eq!(wrap_angle(0.5), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(wrap_angle(2.0 * PI + 0.25), 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(wrap_angle(-2.0 * PI - 0.25), -0.25, epsilon = 1e-12);
        assert!(wrap_angle(7.0 * PI).abs() <= PI + 1e-12);
    }

    #[test]
    fn test_degrees_adapter_converts_at_boundary() {
        let json = serde_json::to_string(&Heading { value: PI / 2.0 }).unwrap();
        assert_eq!(json, r#"{"value":90.0}"#);

        let parsed: Heading = serde_json::from_str(r#"{"value":180.0}"#).unwrap();
        assert_abs_diff_eq!(parsed.value, PI, epsilon = 1e-12);
    }
}
