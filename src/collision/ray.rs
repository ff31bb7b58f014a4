use glam::Vec3;

use super::AABB;

pub struct Ray {
    pub origin: Vec3,
    /// Unit length
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Ray {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Returns tuple of (t_min, t_max) where the ray enters and leaves the box.
    /// `t_min` is negative if the origin is inside the box.
    pub fn intersect_aabb(&self, aabb: &AABB) -> Option<(f32, f32)> {
        fn slab(min: f32, max: f32, origin: f32, direction: f32) -> (f32, f32) {
            if direction != 0.0 {
                let inv_d = 1.0 / direction;
                let mut t0 = (min - origin) * inv_d;
                let mut t1 = (max - origin) * inv_d;
                if t0 > t1 {
                    std::mem::swap(&mut t0, &mut t1);
                }
                (t0, t1)
            } else if origin < min || origin > max {
                // Parallel and outside
                (f32::INFINITY, -f32::INFINITY)
            } else {
                (-f32::INFINITY, f32::INFINITY)
            }
        }

        let (tx_min, tx_max) = slab(aabb.min.x, aabb.max.x, self.origin.x, self.direction.x);
        let (ty_min, ty_max) = slab(aabb.min.y, aabb.max.y, self.origin.y, self.direction.y);
        let (tz_min, tz_max) = slab(aabb.min.z, aabb.max.z, self.origin.z, self.direction.z);

        let t_min = tx_min.max(ty_min).max(tz_min);
        let t_max = tx_max.min(ty_max).min(tz_max);

        if t_max < t_min.max(0.0) {
            return None;
        }
        Some((t_min, t_max))
    }
}

#[cfg(test)]
mod tests {
    use glam::{IVec3, Vec3};

    use crate::collision::AABB;

    use super::Ray;

    #[test]
    fn test_ray_hits_box_in_front() {
        let ray = Ray::new(Vec3::new(-5.0, 0.5, 0.5), Vec3::new(2.0, 0.0, 0.0));
        let (t_min, t_max) = ray
            .intersect_aabb(&AABB::from_block(IVec3::ZERO))
            .expect("Ray should hit");
        assert_eq!(t_min, 5.0);
        assert_eq!(t_max, 6.0);
    }

    #[test]
    fn test_ray_misses_box_behind() {
        let ray = Ray::new(Vec3::new(5.0, 0.5, 0.5), Vec3::X);
        assert!(ray.intersect_aabb(&AABB::from_block(IVec3::ZERO)).is_none());
    }

    #[test]
    fn test_ray_parallel_outside_slab() {
        let ray = Ray::new(Vec3::new(-5.0, 2.0, 0.5), Vec3::X);
        assert!(ray.intersect_aabb(&AABB::from_block(IVec3::ZERO)).is_none());
    }

    #[test]
    fn test_ray_origin_inside_box() {
        let ray = Ray::new(Vec3::splat(0.5), Vec3::Y);
        let (t_min, t_max) = ray
            .intersect_aabb(&AABB::from_block(IVec3::ZERO))
            .expect("Ray should hit");
        assert!(t_min < 0.0);
        assert_eq!(t_max, 0.5);
    }
}
