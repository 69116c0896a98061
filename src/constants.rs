//! Constants for hydrology generation.

/// Top of the elevation band.
pub const MAX_ELEVATION: u8 = 100;

/// Default boundary of the elevation band between ocean and land.
/// Cells at 0-19 are ocean by convention, 20-100 are land.
pub const DEFAULT_SEA_LEVEL: u8 = 20;

// River width and classification

/// Narrowest stored river width.
pub const MIN_RIVER_WIDTH: u8 = 1;

/// Widest stored river width.
pub const MAX_RIVER_WIDTH: u8 = 20;

/// Widths up to this value classify as streams.
pub const STREAM_WIDTH_MAX: u8 = 2;

/// Widths up to this value classify as rivers; anything wider is a major river.
pub const RIVER_WIDTH_MAX: u8 = 8;

/// Stored-width multiplier applied to seasonal rivers.
/// Classification uses the pre-reduction width, so a reduced width never
/// reclassifies the river.
pub const SEASONAL_WIDTH_FACTOR: f32 = 0.5;

// Erosion

/// Higher-neighbor count at which neighbor-based erosion leaves a cell
/// unchanged. Fewer higher neighbors erodes the cell, more deposits onto it.
pub const STABLE_HIGHER_NEIGHBORS: f32 = 3.0;

// Lake water balance

/// Per-cell precipitation contribution to lake inflow.
pub const LAKE_PRECIPITATION_INFLOW: f32 = 0.05;

/// Precipitation offset against lake surface evaporation.
pub const EVAPORATION_PRECIPITATION_REDUCTION: f32 = 0.02;

/// Offset applied to mean lake temperature before the evaporation factor.
/// Lakes at -10 and below evaporate nothing.
pub const EVAPORATION_TEMP_OFFSET: f32 = 10.0;

/// Divisor normalizing the shifted mean temperature into the evaporation
/// factor. A lake at 20 degrees gets a factor of 1.0.
pub const EVAPORATION_TEMP_SCALE: f32 = 30.0;

// Meandering

/// Meander amplitude as a fraction of segment length at full strength.
pub const MEANDER_AMPLITUDE_FRACTION: f32 = 0.3;

/// Amplitude decay per cell of distance from the source. Rivers straighten
/// as they are traced downstream into wider valleys.
pub const MEANDER_DECAY_RATE: f32 = 0.05;

/// Amplitude damping per unit of elevation drop across a segment.
/// Steeper terrain produces straighter flow.
pub const MEANDER_SLOPE_DAMPING: f32 = 0.2;

/// Phase advance per cell along a meandering river.
pub const MEANDER_PHASE_STEP: f32 = 1.7;
