// Agent kinematics: marker accumulation and velocity integration.

use glam::Vec2;

/// Steering targets shorter than this snap to zero before smoothing.
/// Keeps near-equilibrium agents from jittering on marker noise.
pub const SNAP_THRESHOLD: f32 = 0.1;

/// Per-tick lerp factor from current velocity toward the velocity target.
/// The only source of inertia in the model.
pub const VELOCITY_SMOOTHING: f32 = 0.15;

/// Grid membership of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    /// Inside the grid, filed under this row-major cell index.
    Active(usize),
    /// Outside the grid. Still moves, but never receives markers.
    OutOfBounds,
}

impl CellState {
    pub fn from_index(index: Option<usize>) -> Self {
        match index {
            Some(i) => CellState::Active(i),
            None => CellState::OutOfBounds,
        }
    }

    #[inline]
    pub fn index(self) -> Option<usize> {
        match self {
            CellState::Active(i) => Some(i),
            CellState::OutOfBounds => None,
        }
    }

    #[inline]
    pub fn is_active(self) -> bool {
        matches!(self, CellState::Active(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Sum of this tick's marker contributions. Cleared at the start of every tick.
    pub velocity_target: Vec2,
    /// Goal point last supplied by the controller.
    pub target: Vec2,
    /// Unit vector from `position` toward `target` (zero when they coincide).
    pub to_target: Vec2,
    pub radius: f32,
    pub max_speed: f32,
    pub(crate) cell: CellState,
}

impl Agent {
    /// New agent at rest. It is not on any grid until the controller files it.
    pub fn new(position: Vec2, target: Vec2, radius: f32, max_speed: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            velocity_target: Vec2::ZERO,
            target,
            to_target: (target - position).normalize_or_zero(),
            radius,
            max_speed,
            cell: CellState::OutOfBounds,
        }
    }

    pub fn cell(&self) -> CellState {
        self.cell
    }

    /// Inside the grid and eligible to receive markers.
    pub fn is_active(&self) -> bool {
        self.cell.is_active()
    }

    /// Distance from `point` to the agent's body surface, floored at zero.
    #[inline]
    pub fn surface_distance(&self, point: Vec2) -> f32 {
        (point.distance(self.position) - self.radius).max(0.0)
    }

    pub fn reset_contribution(&mut self) {
        self.velocity_target = Vec2::ZERO;
    }

    /// Add one marker's pull to `velocity_target`.
    ///
    /// Markers inside the body radius are discarded (returns `false`).
    /// Otherwise the pull is the unit direction to the marker scaled by
    /// `weight * alignment * falloff^2`, where alignment rescales the cosine
    /// to the goal into `[0,1]` and falloff is `1 - distance` past the radius,
    /// so nothing farther than one unit beyond the body contributes.
    pub fn accumulate(&mut self, marker_position: Vec2, marker_weight: f32) -> bool {
        let to_marker = marker_position - self.position;
        let gap = to_marker.length() - self.radius;
        if gap < 0.0 {
            return false;
        }

        let direction = to_marker.normalize_or_zero();
        let alignment = direction.dot(self.to_target) * 0.5 + 0.5;
        let falloff = (1.0 - gap).max(0.0);

        self.velocity_target += direction * (marker_weight * alignment * falloff * falloff);
        true
    }

    /// Advance one tick toward `goal`.
    pub fn integrate(&mut self, delta_time: f32, goal: Vec2) {
        if self.velocity_target.length() < SNAP_THRESHOLD {
            self.velocity_target = Vec2::ZERO;
        }

        self.velocity = self
            .velocity
            .lerp(self.velocity_target, VELOCITY_SMOOTHING)
            .clamp_length_max(self.max_speed);

        self.position += self.velocity * delta_time;

        self.target = goal;
        self.to_target = (goal - self.position).normalize_or_zero();
    }
}
