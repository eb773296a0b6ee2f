use std::{fmt, str::FromStr};

use crate::foundation::{
    core::Canvas,
    error::{FramecardError, FramecardResult},
};

pub const RADIUS_MAX: f64 = 50.0;
pub const MARGIN_MAX: f64 = 50.0;
pub const PADDING_MAX: f64 = 50.0;
pub const SHADOW_MAX: f64 = 150.0;
pub const BACKGROUND_COUNT: usize = 6;

/// Output proportions relative to the host width.
///
/// Width is always the driving dimension: the surface is
/// `host_width * width_ratio` by `host_width * height_ratio`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AspectRatio {
    pub width_ratio: f64,
    pub height_ratio: f64,
}

impl AspectRatio {
    pub fn new(width_ratio: f64, height_ratio: f64) -> FramecardResult<Self> {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        if !ok(width_ratio) || !ok(height_ratio) {
            return Err(FramecardError::validation(format!(
                "aspect ratios must be finite and > 0, got {width_ratio}:{height_ratio}"
            )));
        }
        Ok(Self {
            width_ratio,
            height_ratio,
        })
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        AspectPreset::Square.ratio()
    }
}

/// The fixed set of proportions offered by the control surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum AspectPreset {
    Square,
    FourThree,
    ThreeTwo,
    SixteenNine,
}

impl AspectPreset {
    pub const ALL: [AspectPreset; 4] = [
        AspectPreset::Square,
        AspectPreset::FourThree,
        AspectPreset::ThreeTwo,
        AspectPreset::SixteenNine,
    ];

    pub fn ratio(self) -> AspectRatio {
        let height_ratio = match self {
            AspectPreset::Square => 1.0,
            AspectPreset::FourThree => 0.75,
            AspectPreset::ThreeTwo => 0.66,
            AspectPreset::SixteenNine => 0.5625,
        };
        AspectRatio {
            width_ratio: 1.0,
            height_ratio,
        }
    }

    /// The preset producing exactly `ratio`.
    pub fn from_ratio(ratio: AspectRatio) -> FramecardResult<Self> {
        AspectPreset::ALL
            .into_iter()
            .find(|p| p.ratio() == ratio)
            .ok_or_else(|| {
                FramecardError::validation(format!(
                    "aspect {}:{} is not one of 1:1, 4:3, 3:2 or 16:9",
                    ratio.width_ratio, ratio.height_ratio
                ))
            })
    }

    pub fn label(self) -> &'static str {
        match self {
            AspectPreset::Square => "1:1",
            AspectPreset::FourThree => "4:3",
            AspectPreset::ThreeTwo => "3:2",
            AspectPreset::SixteenNine => "16:9",
        }
    }
}

impl fmt::Display for AspectPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AspectPreset {
    type Err = FramecardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AspectPreset::ALL
            .into_iter()
            .find(|p| p.label() == s.trim())
            .ok_or_else(|| {
                FramecardError::validation(format!(
                    "unknown aspect preset '{s}' (expected 1:1, 4:3, 3:2 or 16:9)"
                ))
            })
    }
}

/// One immutable snapshot of every style control.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StyleParameters {
    pub corner_radius: f64,
    pub margin: f64,
    pub padding: f64,
    pub shadow_radius: f64,
    pub aspect: AspectRatio,
    pub background_index: usize,
}

impl Default for StyleParameters {
    fn default() -> Self {
        Self {
            corner_radius: 15.0,
            margin: 20.0,
            padding: 0.0,
            shadow_radius: 5.0,
            aspect: AspectRatio::default(),
            background_index: 0,
        }
    }
}

impl StyleParameters {
    /// Checks every field against the control-surface domains.
    pub fn validate(&self) -> FramecardResult<()> {
        check_range("corner_radius", self.corner_radius, RADIUS_MAX)?;
        check_range("margin", self.margin, MARGIN_MAX)?;
        check_range("padding", self.padding, PADDING_MAX)?;
        check_range("shadow_radius", self.shadow_radius, SHADOW_MAX)?;
        AspectPreset::from_ratio(self.aspect)?;
        check_background_index(self.background_index)?;
        Ok(())
    }

    pub fn from_json(s: &str) -> FramecardResult<Self> {
        let params: Self = serde_json::from_str(s)?;
        params.validate()?;
        Ok(params)
    }

    pub fn to_json_pretty(&self) -> FramecardResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub(crate) fn check_range(name: &str, v: f64, max: f64) -> FramecardResult<()> {
    if !v.is_finite() || !(0.0..=max).contains(&v) {
        return Err(FramecardError::validation(format!(
            "{name} must be within [0, {max}], got {v}"
        )));
    }
    Ok(())
}

pub(crate) fn check_background_index(index: usize) -> FramecardResult<()> {
    if index >= BACKGROUND_COUNT {
        return Err(FramecardError::validation(format!(
            "background index {index} out of range (0..{BACKGROUND_COUNT})"
        )));
    }
    Ok(())
}

/// Surface size for a host width and aspect ratio.
pub fn canvas_size(host_width: u32, aspect: AspectRatio) -> FramecardResult<Canvas> {
    let aspect = AspectRatio::new(aspect.width_ratio, aspect.height_ratio)?;
    let host = f64::from(host_width);
    let side = |ratio: f64| -> FramecardResult<u32> {
        let v = (host * ratio).round();
        if v > f64::from(u16::MAX) {
            return Err(FramecardError::validation(format!(
                "canvas side {v} exceeds {}",
                u16::MAX
            )));
        }
        Ok((v as u32).max(1))
    };
    Canvas::new(side(aspect.width_ratio)?, side(aspect.height_ratio)?)
}
