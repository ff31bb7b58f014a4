use glam::Vec3;

use super::{AABB, CollisionFaces};

/// Margin kept between a moving box and whatever it collided with
pub const SWEEP_EPSILON: f32 = 0.001;

/// Moves `aabb` by `delta`, one axis at a time (x, y, z), stopping short of every
/// candidate box. Returns the resolved box and the faces that were blocked.
///
/// Whenever a candidate is hit, the remaining delta on that axis shrinks by the
/// overlap depth plus [`SWEEP_EPSILON`] and the candidates are tested again.
pub fn move_entity(aabb: &AABB, delta: Vec3, candidates: &[AABB]) -> (AABB, CollisionFaces) {
    let mut resolved = *aabb;
    let mut faces = CollisionFaces::empty();
    for axis in 0..3 {
        let mut d = delta[axis];
        if d.abs() < SWEEP_EPSILON {
            continue;
        }
        let mut moved = resolved.translated(axis_offset(axis, d));
        // Test the swept volume so large deltas cannot tunnel through thin floors
        while let Some(hit) = candidates
            .iter()
            .find(|c| resolved.union(&moved).overlaps(c))
        {
            faces |= CollisionFaces::for_axis(axis, d);
            let depth = if d > 0.0 {
                moved.max[axis] - hit.min[axis]
            } else {
                hit.max[axis] - moved.min[axis]
            };
            let shrunk = d - d.signum() * (depth + SWEEP_EPSILON);
            // Never reverse direction: a box that already started inside a candidate stays put
            d = if shrunk * d <= 0.0 || shrunk.abs() < SWEEP_EPSILON {
                0.0
            } else {
                shrunk
            };
            moved = resolved.translated(axis_offset(axis, d));
            if d == 0.0 {
                break;
            }
        }
        resolved = moved;
    }
    (resolved, faces)
}

fn axis_offset(axis: usize, d: f32) -> Vec3 {
    let mut offset = Vec3::ZERO;
    offset[axis] = d;
    offset
}
