use crate::components::entity::Entity;
use crate::core::physics::{ColliderDesc, PhysicsWorld};
use crate::renderer::instance::{RenderBuffer, RenderInstance};

/// Build the render buffer from the physics bodies of a set of entities.
/// Entities without a body, or whose collider is gone, are skipped.
pub fn build_render_buffer<'a>(
    entities: impl Iterator<Item = &'a Entity>,
    physics: &PhysicsWorld,
    buffer: &mut RenderBuffer,
) {
    buffer.clear();

    for entity in entities {
        if !entity.active {
            continue;
        }
        let Some(body) = &entity.body else {
            continue;
        };
        let Some(shape) = physics.collider_shape(body) else {
            continue;
        };

        let (half_width, half_height, kind) = match shape {
            ColliderDesc::Ball { radius } => (radius, radius, RenderInstance::SHAPE_BALL),
            ColliderDesc::Cuboid { half_width, half_height } => {
                (half_width, half_height, RenderInstance::SHAPE_BOX)
            }
            ColliderDesc::CapsuleY { half_height, radius } => {
                (radius, half_height + radius, RenderInstance::SHAPE_CAPSULE)
            }
        };

        buffer.push(RenderInstance {
            x: entity.pos.x,
            y: entity.pos.y,
            rotation: entity.rotation,
            half_width,
            half_height,
            shape: kind,
            alpha: 1.0,
            reserved: 0.0,
        });
    }
}
