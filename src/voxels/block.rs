use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Ordinal minus one is the texture atlas slot. Air has no slot.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    #[default]
    Air = 0,
    Grass = 1,
    Dirt = 2,
    Stone = 3,
    Water = 4,
}

/// Number of block kinds including air
pub const BLOCK_COUNT: usize = 5;

impl BlockKind {
    pub fn is_solid(self) -> bool {
        !matches!(self, BlockKind::Air | BlockKind::Water)
    }

    pub fn is_liquid(self) -> bool {
        matches!(self, BlockKind::Water)
    }

    pub fn atlas_slot(self) -> Option<u32> {
        match self {
            BlockKind::Air => None,
            _ => Some(self as u32 - 1),
        }
    }

    pub fn category(self) -> BlockFilter {
        if self.is_solid() {
            BlockFilter::SOLID
        } else if self.is_liquid() {
            BlockFilter::LIQUID
        } else {
            BlockFilter::AIR
        }
    }
}

bitflags! {
    /// Block categories a ray cast accepts as a hit
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BlockFilter: u8 {
        const SOLID = 1 << 0;
        const LIQUID = 1 << 1;
        const AIR = 1 << 2;
    }
}

impl BlockFilter {
    pub fn accepts(self, kind: BlockKind) -> bool {
        self.intersects(kind.category())
    }
}
