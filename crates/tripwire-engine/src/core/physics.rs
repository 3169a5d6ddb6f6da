use glam::Vec2;
use rapier2d::control::{CharacterLength, KinematicCharacterController};
use rapier2d::prelude::*;
use serde::{Deserialize, Serialize};

use crate::api::types::EntityId;

// ---------------------------------------------------------------------------
// glam <-> nalgebra conversions
// ---------------------------------------------------------------------------

fn vec2_to_na(v: Vec2) -> nalgebra::Vector2<f32> {
    nalgebra::Vector2::new(v.x, v.y)
}

fn na_to_vec2(v: &nalgebra::Vector2<f32>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

fn vec2_to_point(v: Vec2) -> nalgebra::Point2<f32> {
    nalgebra::Point2::new(v.x, v.y)
}

fn na_iso_to_pos_rot(iso: &nalgebra::Isometry2<f32>) -> (Vec2, f32) {
    let pos = Vec2::new(iso.translation.x, iso.translation.y);
    let rot = iso.rotation.angle();
    (pos, rot)
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// The kind of rigid body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyType {
    /// Simulated: reacts to gravity, impulses and joints.
    Dynamic,
    /// Immovable.
    Fixed,
    /// Moved explicitly through [`PhysicsWorld::move_and_slide`].
    Kinematic,
}

impl BodyType {
    fn to_rapier(self) -> RigidBodyType {
        match self {
            BodyType::Dynamic => RigidBodyType::Dynamic,
            BodyType::Fixed => RigidBodyType::Fixed,
            BodyType::Kinematic => RigidBodyType::KinematicPositionBased,
        }
    }
}

/// Shape description for a collider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ColliderDesc {
    Ball { radius: f32 },
    Cuboid { half_width: f32, half_height: f32 },
    CapsuleY { half_height: f32, radius: f32 },
}

impl ColliderDesc {
    fn build_collider(&self) -> ColliderBuilder {
        match *self {
            ColliderDesc::Ball { radius } => ColliderBuilder::ball(radius),
            ColliderDesc::Cuboid { half_width, half_height } => {
                ColliderBuilder::cuboid(half_width, half_height)
            }
            ColliderDesc::CapsuleY { half_height, radius } => {
                ColliderBuilder::capsule_y(half_height, radius)
            }
        }
    }

    /// Whether every dimension of the shape is strictly positive and finite.
    pub fn is_valid(&self) -> bool {
        let ok = |v: f32| v.is_finite() && v > 0.0;
        match *self {
            ColliderDesc::Ball { radius } => ok(radius),
            ColliderDesc::Cuboid { half_width, half_height } => ok(half_width) && ok(half_height),
            // A capsule with zero half-height degenerates into a ball, which is fine.
            ColliderDesc::CapsuleY { half_height, radius } => {
                ok(radius) && half_height.is_finite() && half_height >= 0.0
            }
        }
    }
}

/// Physical material properties for a collider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColliderMaterial {
    pub restitution: f32,
    pub friction: f32,
    pub density: f32,
}

impl Default for ColliderMaterial {
    fn default() -> Self {
        Self {
            restitution: 0.3,
            friction: 0.5,
            density: 1.0,
        }
    }
}

/// Collision layer bits a collider lives on, and the layer bits it collides with.
///
/// Two colliders interact only when each one's `mask` intersects the other's `layer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionLayers {
    pub layer: u32,
    pub mask: u32,
}

impl CollisionLayers {
    /// Lives on no layer and collides with nothing. Invisible to ray casts.
    pub const NONE: CollisionLayers = CollisionLayers { layer: 0, mask: 0 };

    pub const fn new(layer: u32, mask: u32) -> Self {
        Self { layer, mask }
    }

    fn to_rapier(self) -> InteractionGroups {
        InteractionGroups::new(
            Group::from_bits_truncate(self.layer),
            Group::from_bits_truncate(self.mask),
        )
    }
}

impl Default for CollisionLayers {
    fn default() -> Self {
        Self { layer: 1, mask: 1 }
    }
}

/// Builder for describing a rigid body before creation.
#[derive(Debug, Clone)]
pub struct BodyDesc {
    pub body_type: BodyType,
    pub position: Vec2,
    pub rotation: f32,
    pub gravity_scale: f32,
    pub fixed_rotation: bool,
    pub collider: ColliderDesc,
    pub layers: CollisionLayers,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl BodyDesc {
    fn with_type(body_type: BodyType, collider: ColliderDesc) -> Self {
        Self {
            body_type,
            position: Vec2::ZERO,
            rotation: 0.0,
            gravity_scale: 1.0,
            fixed_rotation: false,
            collider,
            layers: CollisionLayers::default(),
            linear_damping: 0.0,
            angular_damping: 0.0,
        }
    }

    /// Create a dynamic body description with the given collider shape.
    pub fn dynamic(collider: ColliderDesc) -> Self {
        Self::with_type(BodyType::Dynamic, collider)
    }

    /// Create a fixed (static) body description with the given collider shape.
    pub fn fixed(collider: ColliderDesc) -> Self {
        Self {
            gravity_scale: 0.0,
            fixed_rotation: true,
            ..Self::with_type(BodyType::Fixed, collider)
        }
    }

    /// Create a kinematic character body. Rotation is locked and gravity ignored;
    /// the body only moves through `move_and_slide`.
    pub fn kinematic(collider: ColliderDesc) -> Self {
        Self {
            gravity_scale: 0.0,
            fixed_rotation: true,
            ..Self::with_type(BodyType::Kinematic, collider)
        }
    }

    pub fn with_position(mut self, pos: Vec2) -> Self {
        self.position = pos;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_layers(mut self, layers: CollisionLayers) -> Self {
        self.layers = layers;
        self
    }

    /// Set the linear damping (velocity decay). Higher values slow the body faster.
    pub fn with_linear_damping(mut self, damping: f32) -> Self {
        self.linear_damping = damping;
        self
    }

    /// Set the angular damping (rotation decay). Higher values slow rotation faster.
    pub fn with_angular_damping(mut self, damping: f32) -> Self {
        self.angular_damping = damping;
        self
    }
}

/// Handle pair stored on an Entity, referencing Rapier internals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsBody {
    pub body_handle: RigidBodyHandle,
    pub collider_handle: ColliderHandle,
}

/// Handle to a joint in the physics simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointHandle(pub(crate) ImpulseJointHandle);

/// A pin joint: keeps one point of each body coincident while letting both rotate freely.
///
/// Anchors are expressed in each body's local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinJointDesc {
    pub anchor_a: Vec2,
    pub anchor_b: Vec2,
    /// Suppress contacts between the two joined bodies.
    pub disable_collision: bool,
}

/// Nearest hit returned by [`PhysicsWorld::cast_ray`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub entity: EntityId,
    /// World-space contact point.
    pub point: Vec2,
    /// Distance from the ray origin to `point`.
    pub distance: f32,
}

// ---------------------------------------------------------------------------
// PhysicsWorld
// ---------------------------------------------------------------------------

/// Wraps all Rapier2D boilerplate into a single, easy-to-use struct.
pub struct PhysicsWorld {
    gravity: nalgebra::Vector2<f32>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    pub(crate) bodies: RigidBodySet,
    pub(crate) colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    /// Set when colliders were added or removed since the query pipeline last saw them.
    queries_stale: bool,
    character_controller: KinematicCharacterController,
}

impl PhysicsWorld {
    /// Create a new physics world with the given gravity vector.
    /// For Y-down coordinate systems, use positive Y for downward gravity
    /// (e.g., `Vec2::new(0.0, 981.0)` for ~10× Earth gravity in pixels).
    pub fn new(gravity: Vec2) -> Self {
        let mut character_controller = KinematicCharacterController::default();
        // Y-down world: "up" points toward negative Y.
        character_controller.up = nalgebra::Unit::new_normalize(nalgebra::Vector2::new(0.0, -1.0));
        character_controller.offset = CharacterLength::Absolute(0.1);
        character_controller.snap_to_ground = None;
        character_controller.autostep = None;
        character_controller.slide = true;

        Self {
            gravity: vec2_to_na(gravity),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            queries_stale: false,
            character_controller,
        }
    }

    /// Set the integration timestep.
    pub fn set_dt(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
    }

    /// The integration timestep.
    pub fn dt(&self) -> f32 {
        self.integration_parameters.dt
    }

    /// Create a rigid body + collider and return handles.
    /// The EntityId is stored in the body's `user_data` for joint and ray lookups.
    pub fn create_body(
        &mut self,
        entity_id: EntityId,
        desc: &BodyDesc,
        material: ColliderMaterial,
    ) -> PhysicsBody {
        let rb = RigidBodyBuilder::new(desc.body_type.to_rapier())
            .translation(vec2_to_na(desc.position))
            .rotation(desc.rotation)
            .gravity_scale(desc.gravity_scale)
            .locked_axes(if desc.fixed_rotation {
                LockedAxes::ROTATION_LOCKED
            } else {
                LockedAxes::empty()
            })
            .linear_damping(desc.linear_damping)
            .angular_damping(desc.angular_damping)
            .user_data(entity_id.0 as u128)
            .build();

        let body_handle = self.bodies.insert(rb);

        let collider = desc
            .collider
            .build_collider()
            .restitution(material.restitution)
            .friction(material.friction)
            .density(material.density)
            .collision_groups(desc.layers.to_rapier())
            .build();

        let collider_handle =
            self.colliders
                .insert_with_parent(collider, body_handle, &mut self.bodies);
        self.queries_stale = true;

        PhysicsBody {
            body_handle,
            collider_handle,
        }
    }

    /// Remove a body, its colliders and any joints attached to it.
    pub fn remove_body(&mut self, body: &PhysicsBody) {
        self.bodies.remove(
            body.body_handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        self.queries_stale = true;
    }

    /// Advance the simulation by one timestep.
    pub fn step(&mut self) {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
        self.queries_stale = false;
    }

    /// Apply an instantaneous impulse to a body.
    pub fn apply_impulse(&mut self, body: &PhysicsBody, impulse: Vec2) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.apply_impulse(vec2_to_na(impulse), true);
        }
    }

    /// Get the current linear velocity of a body.
    pub fn velocity(&self, body: &PhysicsBody) -> Vec2 {
        self.bodies
            .get(body.body_handle)
            .map(|rb| na_to_vec2(rb.linvel()))
            .unwrap_or(Vec2::ZERO)
    }

    /// Move a body to `pos` without simulating the path in between.
    pub fn set_body_position(&mut self, body: &PhysicsBody, pos: Vec2) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_translation(vec2_to_na(pos), true);
            if rb.is_kinematic() {
                rb.set_next_kinematic_translation(vec2_to_na(pos));
            }
        }
    }

    /// Get the current position and rotation of a body.
    pub fn body_position(&self, body: &PhysicsBody) -> (Vec2, f32) {
        self.bodies
            .get(body.body_handle)
            .map(|rb| na_iso_to_pos_rot(rb.position()))
            .unwrap_or((Vec2::ZERO, 0.0))
    }

    /// Number of rigid bodies in the simulation.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Query the collider shape of a physics body.
    /// Returns `None` if the collider no longer exists or has an unsupported shape.
    pub fn collider_shape(&self, body: &PhysicsBody) -> Option<ColliderDesc> {
        let collider = self.colliders.get(body.collider_handle)?;
        let shape = collider.shape();
        if let Some(ball) = shape.as_ball() {
            Some(ColliderDesc::Ball { radius: ball.radius })
        } else if let Some(cuboid) = shape.as_cuboid() {
            Some(ColliderDesc::Cuboid {
                half_width: cuboid.half_extents.x,
                half_height: cuboid.half_extents.y,
            })
        } else if let Some(capsule) = shape.as_capsule() {
            Some(ColliderDesc::CapsuleY {
                half_height: capsule.half_height(),
                radius: capsule.radius,
            })
        } else {
            None
        }
    }

    // -- Joint methods --

    /// Pin two bodies together. The joint goes away with either body.
    pub fn create_pin_joint(
        &mut self,
        body_a: &PhysicsBody,
        body_b: &PhysicsBody,
        desc: &PinJointDesc,
    ) -> JointHandle {
        let joint = RevoluteJointBuilder::new()
            .local_anchor1(vec2_to_point(desc.anchor_a))
            .local_anchor2(vec2_to_point(desc.anchor_b))
            .contacts_enabled(!desc.disable_collision)
            .build();
        JointHandle(
            self.impulse_joints
                .insert(body_a.body_handle, body_b.body_handle, joint, true),
        )
    }

    /// Number of joints in the simulation.
    pub fn joint_count(&self) -> usize {
        self.impulse_joints.len()
    }

    /// The two entities a joint connects, in creation order.
    pub fn joint_entities(&self, handle: JointHandle) -> Option<(EntityId, EntityId)> {
        let joint = self.impulse_joints.get(handle.0)?;
        let a = self.bodies.get(joint.body1)?;
        let b = self.bodies.get(joint.body2)?;
        Some((EntityId(a.user_data as u32), EntityId(b.user_data as u32)))
    }

    /// Local anchors of a joint on its first and second body.
    pub fn joint_anchors(&self, handle: JointHandle) -> Option<(Vec2, Vec2)> {
        let joint = self.impulse_joints.get(handle.0)?;
        let a = joint.data.local_anchor1();
        let b = joint.data.local_anchor2();
        Some((Vec2::new(a.x, a.y), Vec2::new(b.x, b.y)))
    }

    /// Whether contacts between the two joined bodies are still generated.
    pub fn joint_contacts_enabled(&self, handle: JointHandle) -> Option<bool> {
        self.impulse_joints
            .get(handle.0)
            .map(|joint| joint.data.contacts_enabled)
    }

    // -- Queries --

    /// Cast a ray and return the nearest solid, non-sensor hit whose collision layer
    /// intersects `mask`.
    ///
    /// Bodies added since the last step are visible immediately.
    pub fn cast_ray(
        &mut self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: u32,
    ) -> Option<RayHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec2::ZERO || !(max_distance > 0.0) {
            return None;
        }
        self.refresh_queries();

        let ray = Ray::new(vec2_to_point(origin), vec2_to_na(direction));
        let on_mask = |_: ColliderHandle, collider: &Collider| {
            collider.collision_groups().memberships.bits() & mask != 0
        };
        let filter = QueryFilter::default().exclude_sensors().predicate(&on_mask);

        let (handle, distance) = self.query_pipeline.cast_ray(
            &self.bodies,
            &self.colliders,
            &ray,
            max_distance,
            true,
            filter,
        )?;
        let entity = self.collider_to_entity(handle)?;
        let point = ray.point_at(distance);

        Some(RayHit {
            entity,
            point: Vec2::new(point.x, point.y),
            distance,
        })
    }

    /// Move a kinematic body by `velocity * dt`, sliding along whatever it runs into.
    /// Only colliders its collision layers interact with block it.
    ///
    /// The move is applied on the next step. Returns the displacement that will
    /// actually be applied.
    pub fn move_and_slide(&mut self, body: &PhysicsBody, velocity: Vec2, dt: f32) -> Vec2 {
        self.refresh_queries();

        let (Some(rb), Some(collider)) = (
            self.bodies.get(body.body_handle),
            self.colliders.get(body.collider_handle),
        ) else {
            return Vec2::ZERO;
        };
        let current = *rb.translation();

        let movement = self.character_controller.move_shape(
            dt,
            &self.bodies,
            &self.colliders,
            &self.query_pipeline,
            collider.shape(),
            rb.position(),
            vec2_to_na(velocity * dt),
            QueryFilter::default()
                .exclude_rigid_body(body.body_handle)
                .exclude_sensors()
                .groups(collider.collision_groups()),
            |_| {},
        );

        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_next_kinematic_translation(current + movement.translation);
        }
        na_to_vec2(&movement.translation)
    }

    // -- private helpers --

    fn refresh_queries(&mut self) {
        if self.queries_stale {
            self.query_pipeline.update(&self.colliders);
            self.queries_stale = false;
        }
    }

    fn collider_to_entity(&self, collider_handle: ColliderHandle) -> Option<EntityId> {
        let collider = self.colliders.get(collider_handle)?;
        let body_handle = collider.parent()?;
        let body = self.bodies.get(body_handle)?;
        Some(EntityId(body.user_data as u32))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
