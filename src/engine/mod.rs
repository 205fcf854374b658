// Engine module - marker-field crowd steering
//
// sampler -> markers -> map <- grid, agent
// components/systems mirror the map into a bevy_ecs world for presentation.

pub mod agent;
pub mod components;
pub mod config;
pub mod error;
pub mod grid;
pub mod map;
pub mod markers;
pub mod sampler;
pub mod systems;

// Re-export commonly used items
pub use agent::{Agent, CellState};
pub use components::*;
pub use config::{CrowdConfig, MAX_GRID_CELLS, MAX_MARKERS, SpawnLayout};
pub use error::ConfigError;
pub use grid::CrowdGrid;
pub use map::{CrowdMap, MAX_FRAME_DT, TickStats, clamp_frame_delta};
pub use markers::{Marker, MarkerField};
pub use sampler::{FieldSampler, RasterField, ScalarField, UniformField};
