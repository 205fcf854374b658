// Simulation controller: owns the grid, the marker field and the agents,
// and runs the per-tick steering update.
//
// A tick is two strictly separated passes:
//   1. reset every agent's velocity target, then hand each marker to the
//      nearest active agent in its 3x3 neighbourhood (positions frozen);
//   2. integrate every agent and refresh its grid membership.
// Pass 2 must not start before pass 1 has finished, otherwise markers late
// in the field would see a mix of old and new agent positions.

use glam::Vec2;
use log::{debug, info, trace, warn};
use super::agent::{Agent, CellState};
use super::config::CrowdConfig;
use super::error::ConfigError;
use super::grid::CrowdGrid;
use super::markers::MarkerField;
use super::sampler::{FieldSampler, ScalarField};

/// Largest step drivers should feed into [`CrowdMap::step`]. Longer frames
/// (window drags, debugger pauses) make the integrator overshoot.
pub const MAX_FRAME_DT: f32 = 1.0 / 30.0;

/// Clamp a raw frame time into `[0, MAX_FRAME_DT]`; non-finite becomes 0.
pub fn clamp_frame_delta(delta_time: f32) -> f32 {
    if delta_time.is_finite() {
        delta_time.clamp(0.0, MAX_FRAME_DT)
    } else {
        0.0
    }
}

/// What happened during one [`CrowdMap::step`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Markers handed to an agent (including ones that agent then discarded).
    pub assigned: usize,
    /// Assigned markers that fell inside the receiving agent's radius.
    pub discarded: usize,
    /// Markers with no active agent in their neighbourhood.
    pub unassigned: usize,
    pub active_agents: usize,
    pub out_of_bounds: usize,
    /// Agents whose grid cell changed this tick.
    pub cell_changes: usize,
}

pub struct CrowdMap {
    grid: CrowdGrid,
    markers: MarkerField,
    agents: Vec<Agent>,
    target: Vec2,
    agent_radius: f32,
    max_speed: f32,
    ticks: u64,
}

impl CrowdMap {
    /// Build a map with unit marker weights.
    pub fn new(config: &CrowdConfig) -> Result<Self, ConfigError> {
        Self::build(config, None)
    }

    /// Build a map whose marker weights come from `field`.
    pub fn with_field(config: &CrowdConfig, field: &dyn ScalarField) -> Result<Self, ConfigError> {
        Self::build(config, Some(field))
    }

    fn build(config: &CrowdConfig, field: Option<&dyn ScalarField>) -> Result<Self, ConfigError> {
        config.validate()?;

        let sampler = FieldSampler::new(config.width, config.field_seed);
        let markers = MarkerField::build(config.width, config.height, config.density, &sampler, field)?;

        let mut map = Self {
            grid: CrowdGrid::new(config.width, config.height),
            markers,
            agents: Vec::new(),
            target: config.target(),
            agent_radius: config.agent_radius,
            max_speed: config.max_speed,
            ticks: 0,
        };

        for position in config.spawn_positions() {
            map.spawn_agent(position);
        }

        info!(
            "crowd map ready: {}x{} grid, {} markers, {} agents, target ({:.2}, {:.2})",
            config.width,
            config.height,
            map.markers.len(),
            map.agents.len(),
            map.target.x,
            map.target.y
        );
        Ok(map)
    }

    /// Add an agent at `position` during setup and file it on the grid.
    /// Returns its index, which stays stable for the life of the map.
    pub fn spawn_agent(&mut self, position: Vec2) -> usize {
        let index = self.agents.len();
        let mut agent = Agent::new(position, self.target, self.agent_radius, self.max_speed);

        agent.cell = CellState::from_index(self.grid.cell_index_of(position));
        match agent.cell {
            CellState::Active(cell) => self.grid.insert(index, cell),
            CellState::OutOfBounds => {
                warn!("agent {} spawned outside the grid at ({}, {})", index, position.x, position.y)
            }
        }

        self.agents.push(agent);
        index
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, index: usize) -> Option<&Agent> {
        self.agents.get(index)
    }

    pub fn grid(&self) -> &CrowdGrid {
        &self.grid
    }

    pub fn markers(&self) -> &MarkerField {
        &self.markers
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    /// Move the shared goal. Takes effect at the next integration.
    pub fn set_target(&mut self, target: Vec2) {
        self.target = target;
    }

    /// Number of completed ticks.
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Active agent whose body surface is closest to `point`, searching the
    /// 3x3 cells around it. Ties go to the first agent visited.
    pub fn nearest_valid_agent(&self, point: Vec2) -> Option<usize> {
        nearest_valid_agent(&self.grid, &self.agents, point)
    }

    /// Run one tick of `delta_time` seconds.
    ///
    /// Callers are expected to clamp frame time (see [`clamp_frame_delta`]);
    /// a non-finite or negative step is treated as zero.
    pub fn step(&mut self, delta_time: f32) -> TickStats {
        let delta_time = if delta_time.is_finite() && delta_time >= 0.0 {
            delta_time
        } else {
            warn!("ignoring invalid delta_time {delta_time}");
            0.0
        };

        let mut stats = TickStats::default();

        // Pass 1: marker assignment against frozen positions.
        for agent in &mut self.agents {
            agent.reset_contribution();
        }
        for marker in &self.markers {
            match nearest_valid_agent(&self.grid, &self.agents, marker.position) {
                Some(index) => {
                    stats.assigned += 1;
                    if !self.agents[index].accumulate(marker.position, marker.weight) {
                        stats.discarded += 1;
                    }
                }
                None => stats.unassigned += 1,
            }
        }

        // Pass 2: integration and membership refresh.
        let goal = self.target;
        for (index, agent) in self.agents.iter_mut().enumerate() {
            agent.integrate(delta_time, goal);

            let cell = CellState::from_index(self.grid.cell_index_of(agent.position));
            if cell != agent.cell {
                if let Some(old) = agent.cell.index() {
                    self.grid.remove(index, old);
                }
                if let Some(new) = cell.index() {
                    self.grid.insert(index, new);
                }
                trace!("agent {} moved {:?} -> {:?}", index, agent.cell, cell);
                agent.cell = cell;
                stats.cell_changes += 1;
            }

            if cell.is_active() {
                stats.active_agents += 1;
            } else {
                stats.out_of_bounds += 1;
            }
        }

        self.ticks += 1;
        debug!(
            "tick {}: {} assigned ({} discarded), {} unassigned, {} active, {} out of bounds, {} cell changes",
            self.ticks,
            stats.assigned,
            stats.discarded,
            stats.unassigned,
            stats.active_agents,
            stats.out_of_bounds,
            stats.cell_changes
        );
        stats
    }

    /// True when every agent is filed in exactly the bucket matching its
    /// position (or in none when out of bounds) and the grid holds nothing else.
    pub fn membership_consistent(&self) -> bool {
        let mut filed = 0;
        for (index, agent) in self.agents.iter().enumerate() {
            let expected = CellState::from_index(self.grid.cell_index_of(agent.position));
            if agent.cell != expected {
                return false;
            }
            if let Some(cell) = expected.index() {
                if self.grid.bucket(cell).iter().filter(|&&a| a == index).count() != 1 {
                    return false;
                }
                filed += 1;
            }
        }
        self.grid.member_count() == filed
    }
}

fn nearest_valid_agent(grid: &CrowdGrid, agents: &[Agent], point: Vec2) -> Option<usize> {
    let cell_x = point.x.floor() as i32;
    let cell_y = point.y.floor() as i32;

    let mut best: Option<(usize, f32)> = None;
    for index in grid.neighbors_3x3(cell_x, cell_y) {
        let Some(agent) = agents.get(index) else {
            continue;
        };
        if !agent.is_active() {
            continue;
        }
        let distance = agent.surface_distance(point);
        if best.is_none_or(|(_, best_distance)| distance < best_distance) {
            best = Some((index, distance));
        }
    }
    best.map(|(index, _)| index)
}
