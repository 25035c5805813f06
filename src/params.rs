//! Galaxy parameters.
//!
//! A [`ParameterSet`] is an immutable snapshot of everything that shapes one
//! generation. The valid range of every numeric field is exposed as a
//! constant so the control panel and the loader clamp against the same
//! bounds.
//!
//! # Example
//!
//! ```ignore
//! use galaxy::ParameterSet;
//!
//! let params = ParameterSet {
//!     branches: 3,
//!     spin: -2.0,
//!     ..Default::default()
//! };
//! params.save("galaxy.json")?;
//! ```

use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ParamsError;

/// Valid particle counts.
pub const COUNT_RANGE: RangeInclusive<u32> = 100..=1_000_000;
/// Valid point sizes.
pub const SIZE_RANGE: RangeInclusive<f32> = 0.001..=0.1;
/// Valid galaxy radii.
pub const RADIUS_RANGE: RangeInclusive<f32> = 0.01..=20.0;
/// Valid branch counts.
pub const BRANCHES_RANGE: RangeInclusive<u32> = 2..=20;
/// Valid spin values.
pub const SPIN_RANGE: RangeInclusive<f32> = -5.0..=5.0;
/// Valid randomness values.
pub const RANDOMNESS_RANGE: RangeInclusive<f32> = 0.0..=2.0;
/// Valid jitter exponents.
pub const RAND_POWER_RANGE: RangeInclusive<f32> = 1.0..=10.0;

/// Parameters for one galaxy generation.
///
/// Colors are RGB with components in `[0, 1]`, in display (sRGB-encoded)
/// space. They serialize as `"#rrggbb"`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParameterSet {
    /// Number of particles.
    pub count: u32,
    /// Point size. World-ish units since size attenuation is on.
    pub size: f32,
    /// Outer radius of the disc.
    pub radius: f32,
    /// Number of spiral arms.
    pub branches: u32,
    /// Angular twist per unit radius.
    pub spin: f32,
    /// Exposed and persisted, but not read by the position formula.
    pub randomness: f32,
    /// Exponent biasing radii and jitter toward zero.
    pub rand_power: f32,
    /// Color at the center.
    #[serde(with = "hex_color")]
    pub inside_color: Vec3,
    /// Color at the rim.
    #[serde(with = "hex_color")]
    pub outside_color: Vec3,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            count: 100_000,
            size: 0.01,
            radius: 8.0,
            branches: 6,
            spin: 1.0,
            randomness: 0.2,
            rand_power: 3.0,
            inside_color: rgb_from_hex(0xff5588),
            outside_color: rgb_from_hex(0x1b3984),
        }
    }
}

impl ParameterSet {
    /// Copy with every numeric field clamped to its documented range.
    pub fn clamped(&self) -> Self {
        Self {
            count: clamp_range(self.count, &COUNT_RANGE),
            size: clamp_range(self.size, &SIZE_RANGE),
            radius: clamp_range(self.radius, &RADIUS_RANGE),
            branches: clamp_range(self.branches, &BRANCHES_RANGE),
            spin: clamp_range(self.spin, &SPIN_RANGE),
            randomness: clamp_range(self.randomness, &RANDOMNESS_RANGE),
            rand_power: clamp_range(self.rand_power, &RAND_POWER_RANGE),
            inside_color: self.inside_color.clamp(Vec3::ZERO, Vec3::ONE),
            outside_color: self.outside_color.clamp(Vec3::ZERO, Vec3::ONE),
        }
    }

    /// Whether every field already lies within its range.
    pub fn is_in_range(&self) -> bool {
        *self == self.clamped()
    }

    /// Save the parameters to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ParamsError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load parameters from a JSON file.
    ///
    /// Missing fields take their defaults and out-of-range values are
    /// clamped.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ParamsError> {
        let json = fs::read_to_string(path.as_ref())?;
        let params = Self::from_json(&json)?;
        Ok(params)
    }

    /// Parse parameters from a JSON string, clamping out-of-range values.
    pub fn from_json(json: &str) -> Result<Self, ParamsError> {
        let raw: Self = serde_json::from_str(json)?;
        let params = raw.clamped();
        if params != raw {
            warn!(?raw, "parameters out of range, clamped");
        }
        Ok(params)
    }
}

fn clamp_range<T: PartialOrd + Copy>(value: T, range: &RangeInclusive<T>) -> T {
    if value < *range.start() {
        *range.start()
    } else if value > *range.end() {
        *range.end()
    } else {
        value
    }
}

/// Convert a packed `0xRRGGBB` value to an RGB vector in `[0, 1]`.
pub fn rgb_from_hex(hex: u32) -> Vec3 {
    let r = (hex >> 16) & 0xff;
    let g = (hex >> 8) & 0xff;
    let b = hex & 0xff;
    Vec3::new(r as f32, g as f32, b as f32) / 255.0
}

/// Pack an RGB vector in `[0, 1]` into `0xRRGGBB`.
pub fn rgb_to_hex(color: Vec3) -> u32 {
    let c = (color.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
    ((c.x as u32) << 16) | ((c.y as u32) << 8) | c.z as u32
}

/// Serde adapter for colors: writes `"#rrggbb"`, reads `"#rrggbb"`,
/// `"0xrrggbb"` or a plain integer.
mod hex_color {
    use glam::Vec3;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{rgb_from_hex, rgb_to_hex};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum HexRepr {
        Int(u32),
        Text(String),
    }

    pub fn serialize<S: Serializer>(color: &Vec3, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("#{:06x}", rgb_to_hex(*color)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec3, D::Error> {
        let hex = match HexRepr::deserialize(deserializer)? {
            HexRepr::Int(v) => v,
            HexRepr::Text(s) => {
                let digits = s
                    .strip_prefix('#')
                    .or_else(|| s.strip_prefix("0x"))
                    .unwrap_or(&s);
                u32::from_str_radix(digits, 16)
                    .map_err(|_| D::Error::custom(format!("invalid hex color `{s}`")))?
            }
        };
        if hex > 0xff_ffff {
            return Err(D::Error::custom(format!("color {hex:#x} exceeds 0xffffff")));
        }
        Ok(rgb_from_hex(hex))
    }
}
