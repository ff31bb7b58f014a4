use glam::{IVec3, Vec3};

use crate::{
    collision::{AABB, CollisionFaces, IAabb, Ray, move_entity},
    renderer::MeshSink,
};

use super::{BlockFilter, VoxelWorld, chunk::CHUNK_HEIGHT};

/// Result of a voxel ray cast. `min` and `max` are the entry and exit points of
/// the struck block, or the ends of the cast segment when nothing was hit.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayHit {
    pub block: Option<IVec3>,
    pub min: Vec3,
    pub max: Vec3,
}

impl RayHit {
    pub fn is_hit(&self) -> bool {
        self.block.is_some()
    }
}

impl<S: MeshSink> VoxelWorld<S> {
    /// Unit boxes of every solid block in the inclusive region spanned by `a`
    /// and `b`, at most `capacity` of them.
    pub fn region_aabbs(&self, a: IVec3, b: IVec3, capacity: usize) -> Vec<AABB> {
        let region = IAabb::from_corners(a, b);
        let mut res = Vec::with_capacity(capacity.min(region.volume()));
        for block in region.iter() {
            if res.len() >= capacity {
                break;
            }
            if self.get_block(block).is_solid() {
                res.push(AABB::from_block(block));
            }
        }
        res
    }

    /// Casts a ray of `max_length` and returns the block matching `filter` whose
    /// centre is closest to `start`
    pub fn ray_cast(
        &self,
        start: Vec3,
        direction: Vec3,
        max_length: f32,
        filter: BlockFilter,
    ) -> RayHit {
        let ray = Ray::new(start, direction);
        let end = ray.at(max_length);
        let mut res = RayHit {
            block: None,
            min: start,
            max: end,
        };
        if ray.direction == Vec3::ZERO {
            return res;
        }

        let mut region = IAabb::from_corners(start.floor().as_ivec3(), end.floor().as_ivec3());
        region.min.y = region.min.y.max(0);
        region.max.y = region.max.y.min(CHUNK_HEIGHT as i32 - 1);
        if region.min.y > region.max.y {
            return res;
        }

        let mut closest = f32::MAX;
        for block in region.iter() {
            if !filter.accepts(self.get_block(block)) {
                continue;
            }
            let aabb = AABB::from_block(block);
            let Some((t_min, t_max)) = ray.intersect_aabb(&aabb) else {
                continue;
            };
            if t_min < 0.0 || t_min > max_length {
                continue;
            }
            let distance = aabb.center().distance_squared(start);
            if distance < closest {
                closest = distance;
                res = RayHit {
                    block: Some(block),
                    min: ray.at(t_min),
                    max: ray.at(t_max.min(max_length)),
                };
            }
        }
        res
    }

    /// Moves a box through the world, stopping it at solid blocks.
    pub fn move_aabb(&self, aabb: &AABB, delta: Vec3) -> (AABB, CollisionFaces) {
        let bounds = aabb.union(&aabb.translated(delta)).expanded(1.0);
        let region = IAabb::from(&bounds);
        let candidates = self.region_aabbs(
            region.min,
            region.max,
            self.config.region_query_capacity,
        );
        move_entity(aabb, delta, &candidates)
    }
}

/// The block adjacent to the struck face, i.e. where a block placed against the
/// hit would go. A miss passes through unchanged.
pub fn ray_neighbor(hit: &RayHit) -> RayHit {
    let Some(block) = hit.block else {
        return *hit;
    };
    let offset = hit.min - AABB::from_block(block).center();
    let distance = offset.abs();
    let axis = if distance.x >= distance.y && distance.x >= distance.z {
        0
    } else if distance.y >= distance.z {
        1
    } else {
        2
    };
    let mut neighbor = block;
    neighbor[axis] += if offset[axis] < 0.0 { -1 } else { 1 };
    RayHit {
        block: Some(neighbor),
        ..*hit
    }
}
