pub mod collision;
pub mod config;
pub mod metrics;
pub mod renderer;
pub mod simulation;
pub mod systems;
pub mod util;
pub mod voxels;
