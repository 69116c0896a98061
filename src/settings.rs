//! Hydrology settings consumed from the map generation configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_SEA_LEVEL, MAX_ELEVATION};
use crate::erosion::ErosionStrategy;
use crate::error::HydrologyError;

/// Settings for one hydrology run.
///
/// Validated once before any stage executes; a rejected configuration
/// aborts generation without touching the graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HydrologySettings {
    /// Minimum flux for a cell to carry a traced river.
    pub river_threshold: f32,

    /// Upper bound on per-cell elevation loss in one downcut pass.
    pub max_downcut: u8,

    /// Cells below this elevation are never downcut.
    pub min_erosion_height: u8,

    /// Boundary of the elevation band between ocean and land.
    pub sea_level: u8,

    /// Which erosion model to run.
    pub erosion: ErosionStrategy,

    /// Rounds of neighbor-based erosion.
    pub erosion_iterations: u32,

    /// Per-neighbor elevation delta for neighbor-based erosion.
    pub erosion_amount: f32,

    /// Scale for lake surface evaporation.
    pub base_evaporation_rate: f32,

    /// Mean path precipitation below which a river runs seasonally.
    pub seasonal_precipitation_threshold: f32,

    /// Whether river paths are densified into meandering curves.
    pub meandering_enabled: bool,

    /// Base meander amplitude, as a multiple of the per-segment fraction.
    pub meandering_factor: f32,

    /// Interpolated points inserted between consecutive cell centers.
    pub meander_points_per_segment: u32,

    /// Seed for the per-stage RNG streams.
    pub seed: u64,
}

impl Default for HydrologySettings {
    fn default() -> Self {
        Self {
            river_threshold: 30.0,
            max_downcut: 4,
            min_erosion_height: 25,
            sea_level: DEFAULT_SEA_LEVEL,
            erosion: ErosionStrategy::SimpleDowncut,
            erosion_iterations: 3,
            erosion_amount: 0.3,
            base_evaporation_rate: 1.0,
            seasonal_precipitation_threshold: 15.0,
            meandering_enabled: true,
            meandering_factor: 0.5,
            meander_points_per_segment: 4,
            seed: 0,
        }
    }
}

impl HydrologySettings {
    /// Validate the configuration before the pipeline runs.
    pub fn validate(&self) -> Result<(), HydrologyError> {
        check_finite_non_negative("river_threshold", self.river_threshold)?;
        check_finite_non_negative("erosion_amount", self.erosion_amount)?;
        check_finite_non_negative("base_evaporation_rate", self.base_evaporation_rate)?;
        check_finite_non_negative(
            "seasonal_precipitation_threshold",
            self.seasonal_precipitation_threshold,
        )?;
        check_finite_non_negative("meandering_factor", self.meandering_factor)?;

        if self.sea_level == 0 || self.sea_level > MAX_ELEVATION {
            return Err(HydrologyError::Configuration(format!(
                "sea_level must be within 1..={MAX_ELEVATION}, got {}",
                self.sea_level
            )));
        }
        if self.min_erosion_height > MAX_ELEVATION {
            return Err(HydrologyError::Configuration(format!(
                "min_erosion_height must be at most {MAX_ELEVATION}, got {}",
                self.min_erosion_height
            )));
        }
        if self.meander_points_per_segment == 0 {
            return Err(HydrologyError::Configuration(
                "meander_points_per_segment must be at least 1".into(),
            ));
        }

        Ok(())
    }
}

fn check_finite_non_negative(field: &str, value: f32) -> Result<(), HydrologyError> {
    if !value.is_finite() || value < 0.0 {
        return Err(HydrologyError::Configuration(format!(
            "{field} must be finite and non-negative, got {value}"
        )));
    }
    Ok(())
}
