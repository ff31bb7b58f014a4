use bitflags::bitflags;
use glam::Vec3;

bitflags! {
    /// Sides of a moving box that were blocked during movement.
    /// `NEG_Y` means the box was stopped while moving down, i.e. it is grounded.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CollisionFaces: u8 {
        const POS_X = 1 << 0;
        const NEG_X = 1 << 1;
        const POS_Y = 1 << 2;
        const NEG_Y = 1 << 3;
        const POS_Z = 1 << 4;
        const NEG_Z = 1 << 5;
    }
}

impl CollisionFaces {
    /// Face flag for movement along `axis` (0 = x, 1 = y, 2 = z) in the direction of `delta`
    pub fn for_axis(axis: usize, delta: f32) -> CollisionFaces {
        match (axis, delta > 0.0) {
            (0, true) => Self::POS_X,
            (0, false) => Self::NEG_X,
            (1, true) => Self::POS_Y,
            (1, false) => Self::NEG_Y,
            (2, true) => Self::POS_Z,
            (2, false) => Self::NEG_Z,
            _ => unreachable!("Invalid axis {axis}"),
        }
    }

    pub fn is_grounded(self) -> bool {
        self.contains(Self::NEG_Y)
    }

    /// Per-axis mask that is 0.0 for every blocked axis and 1.0 otherwise
    pub fn free_axes(self) -> Vec3 {
        let axis = |flags: CollisionFaces| if self.intersects(flags) { 0.0 } else { 1.0 };
        Vec3::new(
            axis(Self::POS_X | Self::NEG_X),
            axis(Self::POS_Y | Self::NEG_Y),
            axis(Self::POS_Z | Self::NEG_Z),
        )
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::CollisionFaces;

    #[test]
    fn test_for_axis() {
        assert_eq!(CollisionFaces::for_axis(1, -3.0), CollisionFaces::NEG_Y);
        assert_eq!(CollisionFaces::for_axis(0, 0.5), CollisionFaces::POS_X);
        assert_eq!(CollisionFaces::for_axis(2, -0.1), CollisionFaces::NEG_Z);
    }

    #[test]
    fn test_free_axes() {
        let faces = CollisionFaces::NEG_Y | CollisionFaces::POS_Z;
        assert!(faces.is_grounded());
        assert_eq!(faces.free_axes(), Vec3::new(1.0, 0.0, 0.0));
    }
}
