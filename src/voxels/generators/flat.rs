use super::HeightField;

/// Same height everywhere. Used mainly for testing purposes.
pub struct FlatHeightField {
    height: i32,
}

impl FlatHeightField {
    pub fn new(height: i32) -> FlatHeightField {
        Self { height }
    }

    /// No terrain at all
    pub fn empty() -> FlatHeightField {
        Self { height: -1 }
    }
}

impl HeightField for FlatHeightField {
    fn height(&self, _world_x: i32, _world_z: i32) -> i32 {
        self.height
    }
}
