use glam::{Mat4, Vec3, Vec4Swizzles};
use hecs::World;
use serde::{Deserialize, Serialize};

use crate::{
    collision::{AABB, CollisionFaces},
    renderer::MeshSink,
    voxels::VoxelWorld,
};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Transform(pub Mat4);

impl Transform {
    pub fn position(&self) -> Vec3 {
        self.0.w_axis.xyz()
    }

    fn translate(&mut self, offset: Vec3) {
        self.0.w_axis.x += offset.x;
        self.0.w_axis.y += offset.y;
        self.0.w_axis.z += offset.z;
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Velocity(pub Vec3);

/// Downward acceleration in blocks per second squared
#[derive(Debug, Clone, Copy)]
pub struct Gravity(pub f32);

/// Axis aligned box centered on the transform's translation
#[derive(Debug, Clone, Copy)]
pub struct BoxCollider {
    pub half_extents: Vec3,
}

impl BoxCollider {
    pub fn aabb(&self, center: Vec3) -> AABB {
        AABB::new_center(&center, &self.half_extents)
    }
}

/// Faces that were blocked during the last movement
#[derive(Debug, Clone, Copy, Default)]
pub struct Contacts(pub CollisionFaces);

impl Contacts {
    pub fn is_grounded(&self) -> bool {
        self.0.is_grounded()
    }
}

pub fn system_gravity(world: &mut World, dt: f32) {
    for (_entity, (velocity, gravity)) in world.query_mut::<(&mut Velocity, &Gravity)>() {
        velocity.0.y -= gravity.0 * dt;
    }
}

/// Integrates velocities. Entities with a collider move through the voxel world
/// and get carried along by the liquid they are in.
pub fn system_movement<S: MeshSink>(world: &mut World, voxels: &VoxelWorld<S>, dt: f32) {
    for (_entity, (transform, velocity, collider, contacts)) in world.query_mut::<(
        &mut Transform,
        &mut Velocity,
        Option<&BoxCollider>,
        Option<&mut Contacts>,
    )>() {
        let Some(collider) = collider else {
            transform.translate(velocity.0 * dt);
            continue;
        };

        let center = transform.position();
        let push = voxels.liquid_push_at(center);
        let delta = (velocity.0 + push) * dt;
        let aabb = collider.aabb(center);
        let (resolved, faces) = voxels.move_aabb(&aabb, delta);
        transform.translate(resolved.center() - center);
        // Stop along blocked axes so gravity does not keep accumulating
        velocity.0 *= faces.free_axes();
        if let Some(contacts) = contacts {
            contacts.0 = faces;
        }
    }
}
