use crate::core::scene::Scene;
use crate::api::types::{EntityId, GameEvent};
use crate::input::actions::ActionState;
use crate::input::queue::InputQueue;
use crate::renderer::lines::LineBuffer;
#[cfg(feature = "physics")]
use crate::core::physics::{
    PhysicsWorld, BodyDesc, ColliderMaterial, RayHit,
};
#[cfg(feature = "physics")]
use crate::components::entity::Entity;
#[cfg(feature = "physics")]
use glam::Vec2;

/// Configuration for the engine, provided by the game.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Fixed timestep in seconds (default: 1/60).
    pub fixed_dt: f32,
    /// World width in game units.
    pub world_width: f32,
    /// World height in game units.
    pub world_height: f32,
    /// Maximum number of body render instances (default: 256).
    pub max_instances: usize,
    /// Maximum number of line segments per frame (default: 64).
    pub max_lines: usize,
    /// Maximum number of game events per frame (default: 32).
    pub max_events: usize,
    /// Gravity vector for physics simulation. Default: zero (no gravity).
    /// For Y-down coordinate systems, use positive Y for downward gravity.
    #[cfg(feature = "physics")]
    pub gravity: glam::Vec2,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            world_width: 800.0,
            world_height: 600.0,
            max_instances: 256,
            max_lines: 64,
            max_events: 32,
            #[cfg(feature = "physics")]
            gravity: glam::Vec2::ZERO,
        }
    }
}

/// The core contract every game must fulfill.
pub trait Game {
    /// Return engine configuration. Called once before init.
    fn config(&self) -> GameConfig {
        GameConfig::default()
    }

    /// Setup initial state, spawn entities, configure the scene.
    fn init(&mut self, ctx: &mut EngineContext);

    /// One fixed tick. Read input, move bodies, react to the world.
    /// The physics step runs right after this returns.
    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue);

    /// Optional read-only render pass for custom line drawing.
    fn render(&self, _ctx: &mut RenderContext) {}
}

/// Mutable access to engine state, passed to Game::init and Game::update.
pub struct EngineContext {
    pub scene: Scene,
    pub events: Vec<GameEvent>,
    /// Named input actions, refreshed by the runner before each frame's updates.
    pub actions: ActionState,
    dt: f32,
    next_id: u32,
    #[cfg(feature = "physics")]
    pub physics: PhysicsWorld,
}

impl EngineContext {
    pub fn new() -> Self {
        Self::from_config(&GameConfig::default())
    }

    /// Create an EngineContext honoring the config's timestep and gravity.
    pub fn from_config(config: &GameConfig) -> Self {
        #[cfg(feature = "physics")]
        let physics = {
            let mut physics = PhysicsWorld::new(config.gravity);
            physics.set_dt(config.fixed_dt);
            physics
        };
        Self {
            scene: Scene::new(),
            events: Vec::with_capacity(config.max_events),
            actions: ActionState::default(),
            dt: config.fixed_dt,
            next_id: 1,
            #[cfg(feature = "physics")]
            physics,
        }
    }

    /// Create an EngineContext with a custom gravity vector.
    #[cfg(feature = "physics")]
    pub fn with_gravity(gravity: Vec2) -> Self {
        Self::from_config(&GameConfig {
            gravity,
            ..GameConfig::default()
        })
    }

    /// Duration of one fixed tick in seconds.
    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Generate the next unique entity ID.
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Emit a game event to be forwarded to the host page.
    pub fn emit_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Clear the events collected for the host page this frame.
    pub fn clear_frame_data(&mut self) {
        self.events.clear();
    }

    /// World position of an entity.
    pub fn position(&self, id: EntityId) -> Option<glam::Vec2> {
        self.scene.get(id).map(|e| e.pos)
    }

    // -- Physics convenience methods --

    /// Spawn an entity with a physics body. Returns the EntityId.
    /// The entity's position and rotation are taken from the BodyDesc.
    #[cfg(feature = "physics")]
    pub fn spawn_with_body(
        &mut self,
        entity: Entity,
        desc: BodyDesc,
        material: ColliderMaterial,
    ) -> EntityId {
        let id = entity.id;
        let body = self.physics.create_body(id, &desc, material);
        let entity = entity
            .with_pos(desc.position)
            .with_rotation(desc.rotation)
            .with_body(body);
        self.scene.spawn(entity);
        id
    }

    /// Despawn an entity, cleaning up its physics body if present.
    #[cfg(feature = "physics")]
    pub fn despawn(&mut self, id: EntityId) {
        if let Some(entity) = self.scene.despawn(id) {
            if let Some(body) = &entity.body {
                self.physics.remove_body(body);
            }
        }
    }

    /// Apply an instantaneous impulse to an entity's physics body.
    #[cfg(feature = "physics")]
    pub fn apply_impulse(&mut self, id: EntityId, impulse: Vec2) {
        if let Some(entity) = self.scene.get(id) {
            if let Some(body) = &entity.body {
                self.physics.apply_impulse(body, impulse);
            }
        }
    }

    /// Get the linear velocity of an entity's physics body.
    #[cfg(feature = "physics")]
    pub fn velocity(&self, id: EntityId) -> Vec2 {
        self.scene
            .get(id)
            .and_then(|e| e.body.as_ref())
            .map(|body| self.physics.velocity(body))
            .unwrap_or(Vec2::ZERO)
    }

    /// Teleport an entity and its body. Ray casts see the new position after the next step.
    #[cfg(feature = "physics")]
    pub fn teleport(&mut self, id: EntityId, pos: Vec2) {
        if let Some(entity) = self.scene.get_mut(id) {
            entity.pos = pos;
            if let Some(body) = &entity.body {
                self.physics.set_body_position(body, pos);
            }
        }
    }

    /// Cast a ray against the current world. See [`PhysicsWorld::cast_ray`].
    #[cfg(feature = "physics")]
    pub fn cast_ray(
        &mut self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: u32,
    ) -> Option<RayHit> {
        self.physics.cast_ray(origin, direction, max_distance, mask)
    }

    /// Slide an entity's kinematic body by `velocity` over one tick.
    /// Returns the displacement that the next physics step will apply.
    #[cfg(feature = "physics")]
    pub fn move_and_slide(&mut self, id: EntityId, velocity: Vec2) -> Vec2 {
        let Some(body) = self.scene.get(id).and_then(|e| e.body) else {
            return Vec2::ZERO;
        };
        self.physics.move_and_slide(&body, velocity, self.dt)
    }

    /// Step the physics simulation and sync positions back to entities.
    /// Called automatically by the game runner after `Game::update()`.
    #[cfg(feature = "physics")]
    pub fn step_physics(&mut self) {
        self.physics.step();

        for entity in self.scene.iter_mut() {
            if let Some(body) = &entity.body {
                let (pos, rot) = self.physics.body_position(body);
                entity.pos = pos;
                entity.rotation = rot;
            }
        }
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Render context for optional custom render commands.
pub struct RenderContext<'a> {
    pub scene: &'a Scene,
    pub lines: &'a mut LineBuffer,
}

#[cfg(test)]
#[cfg(feature = "physics")]
mod physics_tests {
    use super::*;
    use crate::core::physics::{BodyDesc, ColliderDesc, ColliderMaterial};

    #[test]
    fn spawn_with_body_creates_entity_and_physics() {
        let mut ctx = EngineContext::new();
        let id = ctx.next_id();
        let desc = BodyDesc::dynamic(ColliderDesc::Ball { radius: 10.0 })
            .with_position(Vec2::new(100.0, 200.0));

        ctx.spawn_with_body(Entity::new(id), desc, ColliderMaterial::default());

        assert_eq!(ctx.scene.len(), 1);
        assert_eq!(ctx.physics.body_count(), 1);
        assert!(ctx.scene.get(id).unwrap().body.is_some());
        assert_eq!(ctx.position(id), Some(Vec2::new(100.0, 200.0)));
    }

    #[test]
    fn despawn_cleans_up_physics() {
        let mut ctx = EngineContext::new();
        let id = ctx.next_id();
        let desc = BodyDesc::dynamic(ColliderDesc::Ball { radius: 10.0 });

        ctx.spawn_with_body(Entity::new(id), desc, ColliderMaterial::default());
        assert_eq!(ctx.physics.body_count(), 1);

        ctx.despawn(id);
        assert_eq!(ctx.scene.len(), 0);
        assert_eq!(ctx.physics.body_count(), 0);
    }

    #[test]
    fn step_physics_syncs_positions() {
        let mut ctx = EngineContext::with_gravity(Vec2::new(0.0, 100.0));

        let id = ctx.next_id();
        let desc = BodyDesc::dynamic(ColliderDesc::Ball { radius: 5.0 })
            .with_position(Vec2::new(100.0, 0.0));
        ctx.spawn_with_body(Entity::new(id), desc, ColliderMaterial::default());

        for _ in 0..10 {
            ctx.step_physics();
        }

        let entity = ctx.scene.get(id).unwrap();
        assert!(entity.pos.y > 0.0, "Entity should have moved down: y={}", entity.pos.y);
    }

    #[test]
    fn teleport_moves_entity_and_body() {
        let mut ctx = EngineContext::new();
        let id = ctx.next_id();
        ctx.spawn_with_body(
            Entity::new(id),
            BodyDesc::kinematic(ColliderDesc::Ball { radius: 4.0 }),
            ColliderMaterial::default(),
        );

        ctx.teleport(id, Vec2::new(300.0, 40.0));
        assert_eq!(ctx.position(id), Some(Vec2::new(300.0, 40.0)));

        ctx.step_physics();
        let hit = ctx
            .cast_ray(Vec2::new(300.0, 0.0), Vec2::Y, 100.0, u32::MAX)
            .expect("ray should find the teleported body");
        assert_eq!(hit.entity, id);
    }

    #[test]
    fn move_and_slide_uses_fixed_dt() {
        let mut ctx = EngineContext::new();
        let id = ctx.next_id();
        ctx.spawn_with_body(
            Entity::new(id),
            BodyDesc::kinematic(ColliderDesc::Ball { radius: 8.0 }),
            ColliderMaterial::default(),
        );

        let moved = ctx.move_and_slide(id, Vec2::new(120.0, 0.0));
        assert!((moved.x - 2.0).abs() < 0.01, "moved {:?}", moved);
        ctx.step_physics();
        assert!((ctx.position(id).unwrap().x - 2.0).abs() < 0.01);

        assert_eq!(ctx.move_and_slide(EntityId(404), Vec2::X), Vec2::ZERO);
    }
}
