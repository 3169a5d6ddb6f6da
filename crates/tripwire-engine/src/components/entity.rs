use glam::Vec2;
use crate::api::types::EntityId;
#[cfg(feature = "physics")]
use crate::core::physics::PhysicsBody;

/// A level object: tag, transform and an optional physics body.
#[derive(Debug, Clone)]
pub struct Entity {
    /// Unique identifier.
    pub id: EntityId,
    /// Name used to look entities up from configuration (e.g. `"Player"`).
    pub tag: String,
    /// Whether this entity is active (inactive entities are skipped).
    pub active: bool,
    /// Position in world space.
    pub pos: Vec2,
    /// Rotation in radians.
    pub rotation: f32,
    /// Backing rigid body, if the entity takes part in physics.
    #[cfg(feature = "physics")]
    pub body: Option<PhysicsBody>,
}

impl Entity {
    /// Create a new entity with the given ID at the origin.
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            tag: String::new(),
            active: true,
            pos: Vec2::ZERO,
            rotation: 0.0,
            #[cfg(feature = "physics")]
            body: None,
        }
    }

    // -- Builder pattern --

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_pos(mut self, pos: Vec2) -> Self {
        self.pos = pos;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    #[cfg(feature = "physics")]
    pub fn with_body(mut self, body: PhysicsBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Map a world-space point into this entity's local frame.
    pub fn to_local(&self, world: Vec2) -> Vec2 {
        Vec2::from_angle(-self.rotation).rotate(world - self.pos)
    }

    /// Map a local-space point into world space.
    pub fn to_world(&self, local: Vec2) -> Vec2 {
        self.pos + Vec2::from_angle(self.rotation).rotate(local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_world_round_trip_under_rotation() {
        let e = Entity::new(EntityId(1))
            .with_pos(Vec2::new(10.0, 5.0))
            .with_rotation(std::f32::consts::FRAC_PI_2);

        // Local +X points down (world +Y) after a quarter turn.
        let world = e.to_world(Vec2::new(4.0, 0.0));
        assert!((world - Vec2::new(10.0, 9.0)).length() < 1e-4, "{:?}", world);

        let local = e.to_local(Vec2::new(10.0, 9.0));
        assert!((local - Vec2::new(4.0, 0.0)).length() < 1e-4, "{:?}", local);
    }
}
