use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;

/// Open interval of width/height ratios classified as landscape (around 16:9).
const LANDSCAPE_RATIO: (f64, f64) = (1.6, 1.9);
/// Open interval of width/height ratios classified as portrait (around 9:16).
const PORTRAIT_RATIO: (f64, f64) = (0.4, 0.6);

/// Coarse aspect bucket of a video, decided once at upload and used as the storage key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AspectClass {
    Landscape,
    Portrait,
    Other,
}

impl AspectClass {
    /// Classify a width/height ratio. Interval bounds are exclusive, so 1.6, 1.9, 0.4
    /// and 0.6 all land in `Other`, as does NaN.
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio > LANDSCAPE_RATIO.0 && ratio < LANDSCAPE_RATIO.1 {
            AspectClass::Landscape
        } else if ratio > PORTRAIT_RATIO.0 && ratio < PORTRAIT_RATIO.1 {
            AspectClass::Portrait
        } else {
            AspectClass::Other
        }
    }

    /// Classify pixel dimensions. Returns `None` when `height` is zero and the ratio is undefined.
    pub fn from_dimensions(width: u32, height: u32) -> Option<Self> {
        if height == 0 {
            return None;
        }
        Some(Self::from_ratio(f64::from(width) / f64::from(height)))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectClass::Landscape => "landscape",
            AspectClass::Portrait => "portrait",
            AspectClass::Other => "other",
        }
    }
}

impl Display for AspectClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "landscape" => Ok(AspectClass::Landscape),
            "portrait" => Ok(AspectClass::Portrait),
            "other" => Ok(AspectClass::Other),
            _ => Err(format!("Invalid aspect class: {}", s)),
        }
    }
}
