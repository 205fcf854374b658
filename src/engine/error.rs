// Construction-time errors.
//
// The tick loop itself never fails: out-of-bounds agents, empty collections
// and stale grid membership are all resolved by local policy. Anything that
// would poison the simulation (NaN, empty grid, bad speeds) is rejected here
// before a CrowdMap exists.

use thiserror::Error;

/// Errors raised while validating configuration or building the marker field.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Grid must have at least one cell on each axis.
    #[error("grid dimensions must be positive, got {width}x{height}")]
    EmptyGrid { width: u32, height: u32 },

    /// `width * height` or the marker count overflows, or exceeds
    /// `MAX_GRID_CELLS` / `MAX_MARKERS`.
    #[error("grid {width}x{height} with density {density} is too large")]
    GridTooLarge { width: u32, height: u32, density: u32 },

    #[error("max_speed must be finite and > 0, got {0}")]
    InvalidMaxSpeed(f32),

    #[error("agent radius must be finite and >= 0, got {0}")]
    InvalidRadius(f32),

    /// A point supplied in configuration (target or spawn position) has a NaN/inf component.
    #[error("{what} must be finite, got ({x}, {y})")]
    NonFinitePoint { what: &'static str, x: f32, y: f32 },

    /// The scalar-field provider returned NaN or infinity for a cell.
    #[error("scalar field returned non-finite value {value} at cell ({cell_x}, {cell_y})")]
    NonFiniteFieldSample { cell_x: u32, cell_y: u32, value: f32 },

    /// Raster data length does not match its declared dimensions.
    #[error("raster of {width}x{height} needs {expected} samples, got {actual}")]
    RasterSizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}
