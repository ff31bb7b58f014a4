use std::{
    thread,
    time::{Duration, Instant},
};

use glam::{Mat4, Vec3};
use hecs::{Entity, World};
use log::{debug, info};

use crate::{
    metrics::TickMetrics,
    renderer::MeshSink,
    systems::physics::{
        BoxCollider, Contacts, Gravity, Transform, Velocity, system_gravity, system_movement,
    },
    voxels::VoxelWorld,
};

const DEFAULT_GRAVITY: f32 = 20.0;

/// Voxel world plus the entities moving through it
pub struct Simulation<S: MeshSink> {
    voxels: VoxelWorld<S>,
    ecs: World,
    pub metrics: TickMetrics,
}

impl<S: MeshSink> Simulation<S> {
    pub fn new(voxels: VoxelWorld<S>) -> Simulation<S> {
        Self {
            voxels,
            ecs: World::new(),
            metrics: TickMetrics::new(),
        }
    }

    pub fn voxels(&self) -> &VoxelWorld<S> {
        &self.voxels
    }

    pub fn voxels_mut(&mut self) -> &mut VoxelWorld<S> {
        &mut self.voxels
    }

    pub fn ecs(&self) -> &World {
        &self.ecs
    }

    pub fn ecs_mut(&mut self) -> &mut World {
        &mut self.ecs
    }

    /// Spawns a box shaped body affected by gravity
    pub fn spawn_body(&mut self, position: Vec3, half_extents: Vec3) -> Entity {
        self.ecs.spawn((
            Transform(Mat4::from_translation(position)),
            Velocity(Vec3::ZERO),
            Gravity(DEFAULT_GRAVITY),
            BoxCollider { half_extents },
            Contacts::default(),
        ))
    }

    /// One world update: block updates and liquids first, then entity movement
    pub fn tick(&mut self, dt: f32) {
        let start = Instant::now();
        self.voxels.tick();
        system_gravity(&mut self.ecs, dt);
        system_movement(&mut self.ecs, &self.voxels, dt);
        self.metrics.ticks += 1;
        self.metrics
            .sma_tick_time
            .add(start.elapsed().as_secs_f32() * 1e6);
    }

    /// Remeshes whatever went stale during the last ticks and draws every chunk
    pub fn render(&mut self) {
        let start = Instant::now();
        let remeshed = self.voxels.remesh_dirty();
        self.voxels.draw();
        self.metrics.sma_remeshed.add(remeshed as f32);
        self.metrics
            .sma_render_time
            .add(start.elapsed().as_secs_f32() * 1e6);
    }

    /// Runs `ticks` fixed steps paced at `ticks_per_second`, rendering after
    /// every batch of steps
    pub fn run(&mut self, ticks: u64, ticks_per_second: u64) {
        info!("Starting headless simulation: {ticks} ticks at {ticks_per_second} tps");
        let tick_duration = Duration::from_nanos(1_000_000_000 / ticks_per_second.max(1));
        let mut last_instant = Instant::now();
        let mut tick_accumulator = tick_duration;
        let mut remaining = ticks;

        while remaining > 0 {
            let now = Instant::now();
            tick_accumulator += now - last_instant;
            last_instant = now;

            // Run simulation ticks for every tick_duration that has passed
            while tick_accumulator >= tick_duration && remaining > 0 {
                self.tick(tick_duration.as_secs_f32());
                tick_accumulator -= tick_duration;
                remaining -= 1;
            }
            self.render();
            debug!("{remaining} ticks left");

            // Sleep until next tick to avoid busy waiting
            let sleep_duration = tick_duration
                .checked_sub(tick_accumulator)
                .unwrap_or(Duration::ZERO);
            if remaining > 0 {
                thread::sleep(sleep_duration);
            }
        }
        self.metrics.log_summary();
    }
}

#[cfg(test)]
mod tests {
    use glam::{IVec3, Vec3};

    use crate::{
        config::WorldConfig,
        renderer::MemorySink,
        systems::physics::{Contacts, Transform},
        voxels::{BlockKind, VoxelWorld, generators::flat::FlatHeightField},
    };

    use super::Simulation;

    fn simulation() -> Simulation<MemorySink> {
        let config = WorldConfig {
            liquid_tick_delay: 1,
            ..WorldConfig::default()
        };
        let mut voxels =
            VoxelWorld::new(config, Box::new(FlatHeightField::new(0)), MemorySink::new());
        voxels.create_or_get(0, 0);
        Simulation::new(voxels)
    }

    #[test]
    fn test_tick_runs_liquids_and_render_uploads() {
        let mut sim = simulation();
        sim.voxels_mut().set_block(IVec3::new(8, 1, 8), BlockKind::Water);
        sim.tick(1.0 / 60.0);
        assert_eq!(sim.voxels().liquid_strength(IVec3::new(8, 1, 8)), 7);
        sim.render();
        let chunk = sim.voxels().get(8, 8).unwrap();
        assert!(chunk.dirty().is_empty());
        let liquid = sim.voxels().sink().buffer(chunk.liquid_buffer()).unwrap();
        assert!(liquid.vertex_count() > 0);
        assert_eq!(liquid.draws, 1);
        assert_eq!(sim.metrics.ticks, 1);
    }

    #[test]
    fn test_body_lands_on_terrain() {
        let mut sim = simulation();
        let body = sim.spawn_body(Vec3::new(5.5, 6.0, 5.5), Vec3::new(0.4, 0.4, 0.4));
        for _ in 0..120 {
            sim.tick(1.0 / 60.0);
        }
        let y = sim.ecs().get::<&Transform>(body).unwrap().position().y;
        assert!((y - 1.4).abs() < 0.01);
        assert!(sim.ecs().get::<&Contacts>(body).unwrap().is_grounded());
    }

    #[test]
    fn test_run_executes_all_ticks() {
        let mut sim = simulation();
        sim.run(5, 1000);
        assert_eq!(sim.metrics.ticks, 5);
        assert_eq!(sim.voxels().current_tick(), 5);
    }
}
