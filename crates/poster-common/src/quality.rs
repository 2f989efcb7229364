//! Render quality tiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PosterError;

/// Output quality tier. Scales the simplification budget and tolerance and
/// the basemap resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderQuality {
    /// Fast on-screen preview.
    Preview,
    #[default]
    Standard,
    /// Print export (300 dpi class output).
    Export,
}

impl RenderQuality {
    pub const ALL: [RenderQuality; 3] = [
        RenderQuality::Preview,
        RenderQuality::Standard,
        RenderQuality::Export,
    ];

    /// Maximum number of route points kept after simplification.
    pub fn point_budget(&self) -> usize {
        match self {
            RenderQuality::Preview => 800,
            RenderQuality::Standard => 2_000,
            RenderQuality::Export => 6_000,
        }
    }

    /// Simplification tolerance expressed in output pixels.
    pub fn tolerance_px(&self) -> f64 {
        match self {
            RenderQuality::Preview => 1.0,
            RenderQuality::Standard => 0.5,
            RenderQuality::Export => 0.25,
        }
    }

    /// Fraction of the map rectangle's pixel size requested from the basemap
    /// provider.
    pub fn basemap_resolution(&self) -> f64 {
        match self {
            RenderQuality::Preview => 0.5,
            RenderQuality::Standard | RenderQuality::Export => 1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RenderQuality::Preview => "preview",
            RenderQuality::Standard => "standard",
            RenderQuality::Export => "export",
        }
    }
}

impl fmt::Display for RenderQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenderQuality {
    type Err = PosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "preview" => Ok(RenderQuality::Preview),
            "standard" => Ok(RenderQuality::Standard),
            "export" => Ok(RenderQuality::Export),
            other => Err(PosterError::invalid_parameter(
                "quality",
                format!("unknown quality tier '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers_are_monotonic() {
        let budgets: Vec<usize> = RenderQuality::ALL.iter().map(|q| q.point_budget()).collect();
        assert!(budgets.windows(2).all(|w| w[0] < w[1]));
        let tolerances: Vec<f64> = RenderQuality::ALL.iter().map(|q| q.tolerance_px()).collect();
        assert!(tolerances.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_parse() {
        assert_eq!("Export".parse::<RenderQuality>().unwrap(), RenderQuality::Export);
        assert!("ultra".parse::<RenderQuality>().is_err());
    }
}
