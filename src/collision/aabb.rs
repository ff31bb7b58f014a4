use glam::{IVec3, Vec3};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AABB {
    pub min: Vec3,
    pub max: Vec3,
}

impl AABB {
    pub fn new(min: Vec3, max: Vec3) -> AABB {
        debug_assert!(max.x >= min.x, "Invalid bounds: x axis");
        debug_assert!(max.y >= min.y, "Invalid bounds: y axis");
        debug_assert!(max.z >= min.z, "Invalid bounds: z axis");
        Self { min, max }
    }

    pub fn new_center(center: &Vec3, half_extents: &Vec3) -> AABB {
        debug_assert!(half_extents.min_element() > 0.0, "Size of BB needs to be > 0");
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Unit cube occupied by the block at `block`
    pub fn from_block(block: IVec3) -> AABB {
        let min = block.as_vec3();
        Self {
            min,
            max: min + Vec3::ONE,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn translated(&self, offset: Vec3) -> AABB {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Strict overlap. Boxes that merely touch do not overlap, otherwise an entity
    /// resting on the floor would be stuck in it.
    pub fn overlaps(&self, other: &AABB) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// Smallest box containing both
    pub fn union(&self, other: &AABB) -> AABB {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn expanded(&self, amount: f32) -> AABB {
        Self {
            min: self.min - Vec3::splat(amount),
            max: self.max + Vec3::splat(amount),
        }
    }
}

/// Inclusive block region. Both corners are part of the region.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct IAabb {
    pub min: IVec3,
    pub max: IVec3,
}

impl IAabb {
    /// Accepts the corners in any order
    pub fn from_corners(a: IVec3, b: IVec3) -> IAabb {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn contains(&self, block: IVec3) -> bool {
        block.cmpge(self.min).all() && block.cmple(self.max).all()
    }

    pub fn volume(&self) -> usize {
        let size = self.max - self.min + IVec3::ONE;
        size.x as usize * size.y as usize * size.z as usize
    }

    /// Iterates all block coordinates, x fastest, then z, then y
    pub fn iter(&self) -> impl Iterator<Item = IVec3> + use<> {
        let (min, max) = (self.min, self.max);
        (min.y..=max.y).flat_map(move |y| {
            (min.z..=max.z).flat_map(move |z| (min.x..=max.x).map(move |x| IVec3::new(x, y, z)))
        })
    }
}

impl From<&AABB> for IAabb {
    /// Every block the box touches, including blocks it only shares a face with
    fn from(other: &AABB) -> Self {
        IAabb::from_corners(other.min.floor().as_ivec3(), other.max.floor().as_ivec3())
    }
}
