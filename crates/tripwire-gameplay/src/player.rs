use glam::Vec2;
use serde::{Deserialize, Serialize};
use tripwire_engine::input::actions::{UI_DOWN, UI_LEFT, UI_RIGHT, UI_UP};
use tripwire_engine::{BodyDesc, ColliderDesc, ColliderMaterial, CollisionLayers, EngineContext, Entity, EntityId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub name: String,
    pub position: Vec2,
    /// Movement speed in units per second.
    pub speed: f32,
    pub radius: f32,
    pub layers: CollisionLayers,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            name: "Player".to_string(),
            position: Vec2::ZERO,
            speed: 220.0,
            radius: 12.0,
            layers: CollisionLayers::default(),
        }
    }
}

/// Top-down character moved by the `ui_*` direction actions.
#[derive(Debug)]
pub struct PlayerController {
    entity: EntityId,
    speed: f32,
    velocity: Vec2,
}

impl PlayerController {
    /// Spawn the player's kinematic body.
    pub fn spawn(ctx: &mut EngineContext, config: &PlayerConfig) -> Self {
        let id = ctx.next_id();
        let entity = ctx.spawn_with_body(
            Entity::new(id).with_tag(config.name.clone()),
            BodyDesc::kinematic(ColliderDesc::Ball { radius: config.radius })
                .with_position(config.position)
                .with_layers(config.layers),
            ColliderMaterial::default(),
        );
        Self {
            entity,
            speed: config.speed,
            velocity: Vec2::ZERO,
        }
    }

    /// Move by the current input for one fixed tick, sliding along obstacles.
    pub fn tick(&mut self, ctx: &mut EngineContext) {
        let input = ctx.actions.get_vector(UI_LEFT, UI_RIGHT, UI_UP, UI_DOWN);
        self.velocity = input * self.speed;
        ctx.move_and_slide(self.entity, self.velocity);
    }

    /// Velocity commanded on the last tick.
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tripwire_engine::input::actions::keys;
    use tripwire_engine::InputEvent;

    fn press(ctx: &mut EngineContext, key: u32) {
        ctx.actions.ingest(&[InputEvent::KeyDown { key_code: key }]);
    }

    #[test]
    fn full_right_input_moves_at_speed() {
        let mut ctx = EngineContext::new();
        let mut player = PlayerController::spawn(&mut ctx, &PlayerConfig::default());
        press(&mut ctx, keys::RIGHT);

        player.tick(&mut ctx);
        assert_eq!(player.velocity(), Vec2::new(220.0, 0.0));

        ctx.step_physics();
        let x = ctx.position(player.entity()).unwrap().x;
        assert!((x - 220.0 / 60.0).abs() < 0.01, "x = {}", x);
    }

    #[test]
    fn diagonal_speed_is_not_faster() {
        let mut ctx = EngineContext::new();
        let mut player = PlayerController::spawn(&mut ctx, &PlayerConfig::default());
        press(&mut ctx, keys::LEFT);
        press(&mut ctx, keys::UP);

        player.tick(&mut ctx);
        let v = player.velocity();
        assert!((v.length() - 220.0).abs() < 1e-3, "{:?}", v);
        assert!(v.x < 0.0 && v.y < 0.0);
    }

    #[test]
    fn no_input_stands_still() {
        let mut ctx = EngineContext::new();
        let mut player = PlayerController::spawn(&mut ctx, &PlayerConfig {
            position: Vec2::new(50.0, 50.0),
            ..PlayerConfig::default()
        });

        player.tick(&mut ctx);
        ctx.step_physics();
        assert_eq!(player.velocity(), Vec2::ZERO);
        assert_eq!(ctx.position(player.entity()), Some(Vec2::new(50.0, 50.0)));
    }

    #[test]
    fn walls_stop_the_player() {
        let mut ctx = EngineContext::new();
        let wall = ctx.next_id();
        ctx.spawn_with_body(
            Entity::new(wall),
            BodyDesc::fixed(ColliderDesc::Cuboid { half_width: 10.0, half_height: 100.0 })
                .with_position(Vec2::new(40.0, 0.0)),
            ColliderMaterial::default(),
        );
        let mut player = PlayerController::spawn(&mut ctx, &PlayerConfig::default());
        press(&mut ctx, keys::RIGHT);

        for _ in 0..60 {
            player.tick(&mut ctx);
            ctx.step_physics();
        }

        // Wall face at x = 30, player radius 12.
        let x = ctx.position(player.entity()).unwrap().x;
        assert!(x < 18.5 && x > 10.0, "x = {}", x);
    }

    #[test]
    fn walls_outside_the_mask_do_not_block() {
        let mut ctx = EngineContext::new();
        let wall = ctx.next_id();
        ctx.spawn_with_body(
            Entity::new(wall),
            BodyDesc::fixed(ColliderDesc::Cuboid { half_width: 10.0, half_height: 100.0 })
                .with_position(Vec2::new(40.0, 0.0))
                .with_layers(CollisionLayers::new(0b01, 0b01)),
            ColliderMaterial::default(),
        );
        let mut player = PlayerController::spawn(&mut ctx, &PlayerConfig {
            layers: CollisionLayers::new(0b10, 0b10),
            ..PlayerConfig::default()
        });
        press(&mut ctx, keys::RIGHT);

        for _ in 0..60 {
            player.tick(&mut ctx);
            ctx.step_physics();
        }

        let x = ctx.position(player.entity()).unwrap().x;
        assert!((x - 220.0).abs() < 0.5, "x = {}", x);
    }
}
