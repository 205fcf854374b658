// ECS components and resources exposing the crowd to a presentation layer.
// The simulation itself lives in CrowdMap; entities here are read-only
// mirrors refreshed once per tick.

use bevy_ecs::prelude::*;
use glam::Vec3;
use super::map::{CrowdMap, TickStats, clamp_frame_delta};

/// Position of an entity in 3D space. Crowd agents live on the XZ ground
/// plane: simulation `(x, y)` maps to `(x, 0, y)`.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
        }
    }
}

/// RGB color for rendering
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Agents inside the grid.
    pub const ACTIVE: Color = Color { r: 0.0, g: 0.0, b: 1.0 };
    /// Agents that have left the grid.
    pub const OUT_OF_BOUNDS: Color = Color { r: 1.0, g: 0.0, b: 0.0 };
}

/// Velocity of an entity in 3D space (units per second)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct Velocity {
    pub linear: Vec3,
}

/// Links an entity to `CrowdMap::agents()[index]`.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrowdAgent {
    pub index: usize,
}

/// The simulation, owned by the ECS world.
#[derive(Resource)]
pub struct Crowd(pub CrowdMap);

/// Frame time fed to the next tick, in seconds.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTime {
    pub delta: f32,
}

impl FrameTime {
    /// Frame time limited to `MAX_FRAME_DT`.
    pub fn clamped(raw_delta: f32) -> Self {
        Self {
            delta: clamp_frame_delta(raw_delta),
        }
    }
}

/// Statistics of the most recent tick.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LastTick(pub TickStats);
