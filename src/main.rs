// Headless driver: builds a crowd map, runs it through the ECS schedule for a
// fixed number of ticks and reports progress. Rendering is left to whatever
// host consumes the Transform/Color components.

use anyhow::{Context, Result};
use bevy_ecs::prelude::*;
use clap::Parser;
use glam::Vec2;
use log::info;
use marker_crowd::engine::{
    CrowdAgent, CrowdConfig, CrowdMap, Crowd, FrameTime, LastTick, Transform,
    systems::{crowd_schedule, install_crowd},
};

#[derive(Parser, Debug)]
#[command(
    name = "marker_crowd",
    version,
    about = "Run a marker-field crowd steering simulation without a window"
)]
struct Cli {
    /// Grid width and height in cells.
    #[arg(long, default_value_t = 32)]
    grid_size: u32,

    /// Markers generated per cell.
    #[arg(long, default_value_t = 8)]
    density: u32,

    /// Number of agents, spawned along the bottom row.
    #[arg(long, default_value_t = 10)]
    agents: usize,

    #[arg(long, default_value_t = 1.0)]
    max_speed: f32,

    /// Agent body radius; markers inside it are ignored.
    #[arg(long, default_value_t = 0.1)]
    radius: f32,

    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Seconds per tick (clamped to 1/30).
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Marker field seed.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Move the goal on a circle of this radius around the grid centre
    /// instead of keeping it at the far corner.
    #[arg(long)]
    orbit: Option<f32>,

    /// Orbit angular speed in radians per second.
    #[arg(long, default_value_t = 0.25)]
    orbit_speed: f32,

    /// Log a summary every N ticks.
    #[arg(long, default_value_t = 60)]
    report_every: u64,
}

/// How the shared goal moves over time.
#[derive(Debug, Clone, Copy)]
enum TargetPath {
    Fixed(Vec2),
    Orbit {
        center: Vec2,
        radius: f32,
        angular_speed: f32,
    },
}

impl TargetPath {
    fn at(&self, time: f32) -> Vec2 {
        match *self {
            TargetPath::Fixed(p) => p,
            TargetPath::Orbit { center, radius, angular_speed } => {
                let angle = time * angular_speed;
                center + Vec2::new(angle.cos(), angle.sin()) * radius
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = CrowdConfig::square(cli.grid_size)
        .with_density(cli.density)
        .with_agent_count(cli.agents)
        .with_max_speed(cli.max_speed)
        .with_radius(cli.radius)
        .with_field_seed(cli.seed);

    let path = match cli.orbit {
        Some(radius) => TargetPath::Orbit {
            center: Vec2::splat(cli.grid_size as f32 * 0.5),
            radius,
            angular_speed: cli.orbit_speed,
        },
        None => TargetPath::Fixed(config.target()),
    };

    let map = CrowdMap::new(&config).context("invalid crowd configuration")?;

    let mut world = World::new();
    install_crowd(&mut world, map);
    world.insert_resource(FrameTime::clamped(cli.dt));
    let dt = world.resource::<FrameTime>().delta;

    let mut schedule = crowd_schedule();
    let mut time = 0.0f32;
    for tick in 1..=cli.ticks {
        time += dt;
        world.resource_mut::<Crowd>().0.set_target(path.at(time));
        schedule.run(&mut world);

        if cli.report_every > 0 && tick % cli.report_every == 0 {
            let stats = world.resource::<LastTick>().0;
            let goal = world.resource::<Crowd>().0.target();
            info!(
                "tick {} t={:.2}s goal=({:.2}, {:.2}): {} active, {} out of bounds, {} markers assigned",
                tick, time, goal.x, goal.y, stats.active_agents, stats.out_of_bounds, stats.assigned
            );
        }
    }

    let mut agents: Vec<(usize, Vec2)> = world
        .query::<(&CrowdAgent, &Transform)>()
        .iter(&world)
        .map(|(handle, t)| (handle.index, Vec2::new(t.position.x, t.position.z)))
        .collect();
    agents.sort_unstable_by_key(|(index, _)| *index);

    println!("Ran {} ticks ({:.2}s simulated)", cli.ticks, time);
    for (index, position) in agents {
        println!("agent {:>3}: ({:.3}, {:.3})", index, position.x, position.y);
    }
    Ok(())
}
