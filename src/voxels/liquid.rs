use std::time::Instant;

use glam::{IVec3, Vec3};
use log::trace;

use crate::renderer::MeshSink;

use super::{
    BlockKind, VoxelWorld,
    chunk::{CHUNK_HEIGHT, DirtyFlags},
};

/// Strength of source blocks and of liquid falling straight down. Never decays.
pub const SOURCE_STRENGTH: i32 = 7;

const HORIZONTAL: [IVec3; 4] = [IVec3::X, IVec3::NEG_X, IVec3::Z, IVec3::NEG_Z];

/// One actively flowing liquid cell
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Liquid {
    pub position: IVec3,
    /// Direction entities standing in this cell are pushed into. Unit length or zero.
    pub push: Vec3,
    /// 1..=7
    pub strength: i32,
    /// Tick of the last strength change
    pub last_change: u64,
    /// Received its liquid from the cell directly above
    pub from_above: bool,
}

impl Liquid {
    fn source(position: IVec3, tick: u64) -> Liquid {
        Self {
            position,
            push: Vec3::ZERO,
            strength: SOURCE_STRENGTH,
            last_change: tick,
            from_above: false,
        }
    }

    fn falling(position: IVec3, tick: u64) -> Liquid {
        Self {
            position,
            push: Vec3::NEG_Y,
            strength: SOURCE_STRENGTH,
            last_change: tick,
            from_above: true,
        }
    }
}

impl<S: MeshSink> VoxelWorld<S> {
    /// Advances the world by one tick: drains the update queue and re-evaluates
    /// every liquid cell in it. Coordinates queued while doing so wait for the next tick.
    pub fn tick(&mut self) {
        self.tick += 1;
        let start = Instant::now();
        let batch = self.queue.drain();
        let processed = batch.len();
        for coords in batch {
            self.update_liquid(coords);
        }
        if processed > 0 {
            trace!(
                "Tick {}: processed {processed} liquid updates in {}ms, {} pending",
                self.tick,
                start.elapsed().as_secs_f32() * 1000.0,
                self.queue.len()
            );
        }
    }

    pub fn liquid(&self, coords: IVec3) -> Option<&Liquid> {
        self.get(coords.x, coords.z)?.liquid(coords)
    }

    /// 0 if there is no liquid cell at `coords`
    pub fn liquid_strength(&self, coords: IVec3) -> i32 {
        self.liquid(coords).map_or(0, |l| l.strength)
    }

    /// Push vector of the liquid cell containing `point`
    pub fn liquid_push_at(&self, point: Vec3) -> Vec3 {
        self.liquid(point.floor().as_ivec3())
            .map_or(Vec3::ZERO, |l| l.push)
    }

    pub fn liquid_count(&self) -> usize {
        self.chunks.values().map(|c| c.liquids().len()).sum()
    }

    fn update_liquid(&mut self, coords: IVec3) {
        let block = self.get_block(coords);
        let Some(liquid) = self.liquid(coords).copied() else {
            if block.is_liquid() {
                self.put_liquid(Liquid::source(coords, self.tick));
                self.flow(coords);
            }
            return;
        };

        let lost_inflow = liquid.from_above && !self.get_block(coords + IVec3::Y).is_liquid();
        if !block.is_liquid() || lost_inflow {
            self.remove_liquid(coords);
            return;
        }
        if self.tick - liquid.last_change < self.config.liquid_tick_delay {
            self.queue.enqueue(coords);
            return;
        }
        if self.spread(coords) {
            self.flow(coords);
        }
    }

    /// Recomputes the strength of a cell from its horizontal neighbours.
    /// Returns whether the cell holds liquid afterwards.
    fn spread(&mut self, coords: IVec3) -> bool {
        if !(0..CHUNK_HEIGHT as i32).contains(&coords.y) {
            return false;
        }
        let block = self.get_block(coords);
        if block.is_solid() {
            return false;
        }
        let existing = self.liquid(coords).copied();
        match existing {
            // Sources and falling liquid are not affected by weaker inbound flow
            Some(l) if l.strength == SOURCE_STRENGTH => return true,
            // Source block that was not picked up from the queue yet
            None if block.is_liquid() => return true,
            _ => {}
        }

        let strengths = HORIZONTAL.map(|dir| self.liquid_strength(coords + dir));
        let strength = strengths.iter().max().copied().unwrap_or(0) - 1;
        if strength <= 0 {
            if existing.is_some() {
                self.remove_liquid(coords);
            }
            return false;
        }

        // Weaker neighbours pull harder
        let push = HORIZONTAL
            .iter()
            .zip(strengths)
            .fold(Vec3::ZERO, |acc, (dir, s)| {
                acc + dir.as_vec3() * (8 - s) as f32
            })
            .normalize_or_zero();

        let tick = self.tick;
        match existing {
            Some(l) if l.strength == strength => {
                if let Some(cell) = self.liquid_mut(coords) {
                    cell.push = push;
                }
            }
            Some(_) => {
                if let Some(cell) = self.liquid_mut(coords) {
                    cell.strength = strength;
                    cell.push = push;
                    cell.last_change = tick;
                }
                if let Some(chunk) = self.get_mut(coords.x, coords.z) {
                    chunk.mark_dirty(DirtyFlags::LIQUID);
                }
                self.queue.enqueue(coords);
            }
            None => {
                // Flowing into unloaded terrain generates it, which may turn out solid
                self.create_or_get(coords.x, coords.z);
                if self.get_block(coords).is_solid() {
                    return false;
                }
                self.put_liquid(Liquid {
                    position: coords,
                    push,
                    strength,
                    last_change: tick,
                    from_above: false,
                });
            }
        }
        true
    }

    /// Falling takes priority: sideways spreading only happens on top of a solid floor
    fn flow(&mut self, coords: IVec3) {
        let below = coords - IVec3::Y;
        if below.y < 0 {
            return;
        }
        let below_block = self.get_block(below);
        if below_block.is_solid() {
            for dir in HORIZONTAL {
                self.spread(coords + dir);
            }
        } else if self.liquid(below).is_none() && !below_block.is_liquid() {
            self.put_liquid(Liquid::falling(below, self.tick));
        }
    }

    fn liquid_mut(&mut self, coords: IVec3) -> Option<&mut Liquid> {
        self.get_mut(coords.x, coords.z)?.liquid_mut(coords)
    }

    fn put_liquid(&mut self, liquid: Liquid) {
        let position = liquid.position;
        self.write_block(position, BlockKind::Water, DirtyFlags::LIQUID);
        if let Some(chunk) = self.get_mut(position.x, position.z) {
            chunk.insert_liquid(liquid);
        }
        self.queue.enqueue(position);
    }

    fn remove_liquid(&mut self, coords: IVec3) {
        if let Some(chunk) = self.get_mut(coords.x, coords.z) {
            chunk.remove_liquid(coords);
        }
        // Only drain the block if nothing solid was placed into the cell
        if self.get_block(coords).is_liquid() {
            self.write_block(coords, BlockKind::Air, DirtyFlags::LIQUID);
        }
        // Neighbours may have been fed by this cell
        for dir in HORIZONTAL {
            self.enqueue_if_liquid(coords + dir);
        }
        self.enqueue_if_liquid(coords - IVec3::Y);
    }

    fn enqueue_if_liquid(&mut self, coords: IVec3) {
        if self.liquid(coords).is_some() {
            self.queue.enqueue(coords);
        }
    }
}
