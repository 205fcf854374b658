// Simulation configuration supplied by the host at construction time.

use glam::Vec2;
use super::error::ConfigError;

/// Upper bound on `width * height`. Each cell costs a bucket allocation.
pub const MAX_GRID_CELLS: usize = 1 << 24;

/// Upper bound on `width * height * density`.
pub const MAX_MARKERS: usize = 1 << 27;

/// Where agents start.
#[derive(Debug, Clone, PartialEq)]
pub enum SpawnLayout {
    /// `agent_count` agents spread along the bottom row: agent `i` starts at
    /// `(i * width / agent_count, 0.5)`.
    Row,
    /// One agent per listed position; `agent_count` is ignored.
    Explicit(Vec<Vec2>),
}

/// Everything the controller needs to build the grid, marker field and agents.
#[derive(Debug, Clone, PartialEq)]
pub struct CrowdConfig {
    /// Grid width in cells (one world unit per cell).
    pub width: u32,
    /// Grid height in cells.
    pub height: u32,
    /// Markers generated per cell.
    pub density: u32,
    pub agent_count: usize,
    /// Velocity magnitude cap in world units/sec.
    pub max_speed: f32,
    /// Dead-zone radius: markers closer than this never steer the agent.
    pub agent_radius: f32,
    /// Goal point. `None` means the far corner `(width, height)`.
    pub target: Option<Vec2>,
    /// XORed into every per-cell seed. With 0 the seed is exactly the cell index.
    pub field_seed: u64,
    pub spawn: SpawnLayout,
}

impl Default for CrowdConfig {
    fn default() -> Self {
        Self {
            width: 32,
            height: 32,
            density: 8,
            agent_count: 10,
            max_speed: 1.0,
            agent_radius: 0.1,
            target: None,
            field_seed: 0,
            spawn: SpawnLayout::Row,
        }
    }
}

impl CrowdConfig {
    /// Square grid of `grid_size` x `grid_size` cells, other options default.
    pub fn square(grid_size: u32) -> Self {
        Self {
            width: grid_size,
            height: grid_size,
            ..Self::default()
        }
    }

    pub fn with_density(mut self, density: u32) -> Self {
        self.density = density;
        self
    }

    pub fn with_agent_count(mut self, count: usize) -> Self {
        self.agent_count = count;
        self
    }

    pub fn with_max_speed(mut self, max_speed: f32) -> Self {
        self.max_speed = max_speed;
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.agent_radius = radius;
        self
    }

    pub fn with_target(mut self, target: Vec2) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_field_seed(mut self, seed: u64) -> Self {
        self.field_seed = seed;
        self
    }

    pub fn with_spawn_positions(mut self, positions: Vec<Vec2>) -> Self {
        self.spawn = SpawnLayout::Explicit(positions);
        self
    }

    /// Resolved goal point.
    pub fn target(&self) -> Vec2 {
        self.target
            .unwrap_or_else(|| Vec2::new(self.width as f32, self.height as f32))
    }

    /// Start positions for every agent, in spawn order.
    pub fn spawn_positions(&self) -> Vec<Vec2> {
        match &self.spawn {
            SpawnLayout::Row => {
                let count = self.agent_count;
                (0..count)
                    .map(|i| Vec2::new(i as f32 * self.width as f32 / count as f32, 0.5))
                    .collect()
            }
            SpawnLayout::Explicit(positions) => positions.clone(),
        }
    }

    /// Reject anything that would make the simulation ill-defined.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.width,
                height: self.height,
            });
        }

        let too_large = ConfigError::GridTooLarge {
            width: self.width,
            height: self.height,
            density: self.density,
        };
        let cells = (self.width as usize)
            .checked_mul(self.height as usize)
            .filter(|&cells| cells <= MAX_GRID_CELLS)
            .ok_or_else(|| too_large.clone())?;
        cells
            .checked_mul(self.density as usize)
            .filter(|&markers| markers <= MAX_MARKERS)
            .ok_or(too_large)?;

        if !self.max_speed.is_finite() || self.max_speed <= 0.0 {
            return Err(ConfigError::InvalidMaxSpeed(self.max_speed));
        }
        if !self.agent_radius.is_finite() || self.agent_radius < 0.0 {
            return Err(ConfigError::InvalidRadius(self.agent_radius));
        }

        check_finite("target", self.target())?;
        if let SpawnLayout::Explicit(positions) = &self.spawn {
            for p in positions {
                check_finite("spawn position", *p)?;
            }
        }
        Ok(())
    }
}

fn check_finite(what: &'static str, p: Vec2) -> Result<(), ConfigError> {
    if p.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinitePoint { what, x: p.x, y: p.y })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid_and_targets_far_corner() {
        let config = CrowdConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.target(), Vec2::new(32.0, 32.0));
    }

    #[test]
    fn row_layout_spreads_agents_along_bottom() {
        let config = CrowdConfig::square(8).with_agent_count(4);
        let positions = config.spawn_positions();
        assert_eq!(
            positions,
            vec![
                Vec2::new(0.0, 0.5),
                Vec2::new(2.0, 0.5),
                Vec2::new(4.0, 0.5),
                Vec2::new(6.0, 0.5),
            ]
        );
    }

    #[test]
    fn zero_agents_is_allowed() {
        let config = CrowdConfig::square(4).with_agent_count(0);
        assert!(config.validate().is_ok());
        assert!(config.spawn_positions().is_empty());
    }

    #[test]
    fn rejects_empty_grid() {
        let config = CrowdConfig::square(0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptyGrid { width: 0, height: 0 })
        );
    }

    #[test]
    fn rejects_bad_speed_and_radius() {
        let nan_speed = CrowdConfig::default().with_max_speed(f32::NAN);
        assert!(matches!(nan_speed.validate(), Err(ConfigError::InvalidMaxSpeed(_))));

        let zero_speed = CrowdConfig::default().with_max_speed(0.0);
        assert!(matches!(zero_speed.validate(), Err(ConfigError::InvalidMaxSpeed(_))));

        let negative_radius = CrowdConfig::default().with_radius(-0.5);
        assert_eq!(
            negative_radius.validate(),
            Err(ConfigError::InvalidRadius(-0.5))
        );
    }

    #[test]
    fn rejects_non_finite_points() {
        let config = CrowdConfig::default().with_target(Vec2::new(f32::INFINITY, 1.0));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFinitePoint { what: "target", .. })
        ));

        let config = CrowdConfig::default()
            .with_spawn_positions(vec![Vec2::new(1.0, 1.0), Vec2::new(f32::NAN, 0.0)]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFinitePoint { what: "spawn position", .. })
        ));
    }

    #[test]
    fn rejects_overflowing_marker_count() {
        let config = CrowdConfig::square(u32::MAX).with_density(u32::MAX);
        assert!(matches!(config.validate(), Err(ConfigError::GridTooLarge { .. })));
    }

    #[test]
    fn rejects_grids_past_the_cell_and_marker_caps() {
        // 10^10 cells fits in usize but would never allocate.
        assert_eq!(
            CrowdConfig::square(100_000).validate(),
            Err(ConfigError::GridTooLarge { width: 100_000, height: 100_000, density: 8 })
        );

        let at_cap = CrowdConfig::square(4096).with_density(1);
        assert_eq!(at_cap.width as usize * at_cap.height as usize, MAX_GRID_CELLS);
        assert!(at_cap.validate().is_ok());
        assert!(matches!(
            CrowdConfig::square(4097).with_density(1).validate(),
            Err(ConfigError::GridTooLarge { .. })
        ));

        // Within the cell cap, but 2^24 * 9 markers is over the marker cap.
        assert!(matches!(
            CrowdConfig::square(4096).with_density(9).validate(),
            Err(ConfigError::GridTooLarge { .. })
        ));
        assert!(CrowdConfig::square(4096).with_density(8).validate().is_ok());
    }
}
