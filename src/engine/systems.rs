// ECS systems driving the crowd and mirroring it onto entities.
// Order matters: step first, then sync, so renderers never see a
// half-updated crowd.

use bevy_ecs::prelude::*;
use glam::Vec3;
use log::debug;
use super::components::*;
use super::map::CrowdMap;

/// Insert the crowd resources and spawn one mirror entity per agent.
pub fn install_crowd(world: &mut World, map: CrowdMap) {
    let count = map.agents().len();
    world.insert_resource(Crowd(map));
    world.insert_resource(FrameTime::default());
    world.insert_resource(LastTick::default());
    spawn_agent_entities(world, count);
    debug!("spawned {} crowd agent entities", count);
}

fn spawn_agent_entities(world: &mut World, count: usize) {
    for index in 0..count {
        world.spawn((
            CrowdAgent { index },
            Transform::default(),
            Velocity::default(),
            Color::ACTIVE,
        ));
    }
}

/// Advance the simulation by the current `FrameTime`.
pub fn crowd_step_system(
    mut crowd: ResMut<Crowd>,
    frame: Res<FrameTime>,
    mut last: ResMut<LastTick>,
) {
    last.0 = crowd.0.step(frame.delta);
}

/// Copy agent state onto mirror entities. Out-of-bounds agents turn red.
pub fn sync_agent_transforms_system(
    crowd: Res<Crowd>,
    mut query: Query<(&CrowdAgent, &mut Transform, &mut Velocity, &mut Color)>,
) {
    let agents = crowd.0.agents();
    for (handle, mut transform, mut velocity, mut color) in &mut query {
        let Some(agent) = agents.get(handle.index) else {
            continue;
        };
        transform.position = Vec3::new(agent.position.x, 0.0, agent.position.y);
        velocity.linear = Vec3::new(agent.velocity.x, 0.0, agent.velocity.y);
        *color = if agent.is_active() {
            Color::ACTIVE
        } else {
            Color::OUT_OF_BOUNDS
        };
    }
}

/// Schedule running one tick followed by the mirror sync.
pub fn crowd_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems((crowd_step_system, sync_agent_transforms_system).chain());
    schedule
}
