mod aabb;
mod model;
mod ray;
mod sweep;

pub use aabb::AABB;
pub use aabb::IAabb;
pub use model::CollisionFaces;
pub use ray::Ray;
pub use sweep::SWEEP_EPSILON;
pub use sweep::move_entity;
