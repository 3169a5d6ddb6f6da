//! Laser tripwire: a ray cast every tick from its owner, drawn as a line, that
//! raises an alarm while it touches a designated target.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tripwire_engine::{
    Color, EngineContext, Entity, EntityId, GameEvent, LineComponent, RayHit, RepeatTimer,
};

/// Game event emitted when a laser starts alarming. `a` = laser entity id, `b/c` = hit point.
pub const EVENT_ALARM_RAISED: f32 = 1.0;
/// Game event emitted when a laser stops alarming. `a` = laser entity id.
pub const EVENT_ALARM_CLEARED: f32 = 2.0;

/// Tunable laser settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaserConfig {
    /// Tag of the laser's owner entity.
    pub name: String,
    pub position: Vec2,
    /// The beam points along local +X rotated by this angle (radians).
    pub rotation: f32,
    pub length: f32,
    pub color_normal: Color,
    pub color_alert: Color,
    pub width: f32,
    /// Seconds between color flips while alarming.
    pub flash_interval: f32,
    /// Only bodies on these collision layers stop the beam.
    pub collision_mask: u32,
    /// Tag of the entity that trips the alarm. `None` disables detection.
    pub target: Option<String>,
}

impl Default for LaserConfig {
    fn default() -> Self {
        Self {
            name: "Laser".to_string(),
            position: Vec2::ZERO,
            rotation: 0.0,
            length: 500.0,
            color_normal: Color::GREEN,
            color_alert: Color::RED,
            width: 3.0,
            flash_interval: 0.15,
            collision_mask: u32::MAX,
            target: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmState {
    Idle,
    Alarming,
}

pub struct LaserDetector {
    config: LaserConfig,
    owner: EntityId,
    target: Option<EntityId>,
    state: AlarmState,
    beam: LineComponent,
    flash: RepeatTimer,
    last_hit: Option<RayHit>,
}

impl LaserDetector {
    /// Spawn the laser's owner entity and resolve its target by tag.
    pub fn attach(ctx: &mut EngineContext, config: LaserConfig) -> Self {
        let owner = ctx.next_id();
        ctx.scene.spawn(
            Entity::new(owner)
                .with_tag(config.name.clone())
                .with_pos(config.position)
                .with_rotation(config.rotation),
        );

        let target = match config.target.as_deref() {
            Some(tag) => {
                let id = ctx.scene.id_by_tag(tag);
                if id.is_none() {
                    log::warn!("{}: target '{}' not found, detection disabled", config.name, tag);
                }
                id
            }
            None => {
                log::warn!("{}: no target configured, detection disabled", config.name);
                None
            }
        };

        let mut beam = LineComponent::new(config.width, config.color_normal);
        beam.set_segment(Vec2::ZERO, Vec2::new(config.length, 0.0));

        Self {
            flash: RepeatTimer::new(config.flash_interval),
            config,
            owner,
            target,
            state: AlarmState::Idle,
            beam,
            last_hit: None,
        }
    }

    /// Recast the beam against the current world and update the alarm.
    pub fn tick(&mut self, ctx: &mut EngineContext, dt: f32) {
        let Some(owner) = ctx.scene.get(self.owner).cloned() else {
            return;
        };

        let direction = Vec2::from_angle(owner.rotation);
        let hit = ctx.cast_ray(owner.pos, direction, self.config.length, self.config.collision_mask);
        self.last_hit = hit;

        match hit {
            Some(hit) => {
                self.beam.set_segment(Vec2::ZERO, owner.to_local(hit.point));
                if self.target.is_some_and(|target| target == hit.entity) {
                    self.trigger(ctx, hit.point);
                } else {
                    self.reset(ctx);
                }
            }
            None => {
                self.beam.set_segment(Vec2::ZERO, Vec2::new(self.config.length, 0.0));
                self.reset(ctx);
            }
        }

        // An odd number of flips leaves the color changed.
        if self.flash.tick(dt) % 2 == 1 && self.state == AlarmState::Alarming {
            self.beam.color = if self.beam.color == self.config.color_alert {
                self.config.color_normal
            } else {
                self.config.color_alert
            };
        }
    }

    fn trigger(&mut self, ctx: &mut EngineContext, at: Vec2) {
        if self.state == AlarmState::Alarming {
            return;
        }
        self.state = AlarmState::Alarming;
        self.beam.color = self.config.color_alert;
        self.flash.start();
        log::info!("{}: ALARM! target detected at {}", self.config.name, at);
        ctx.emit_event(GameEvent {
            kind: EVENT_ALARM_RAISED,
            a: self.owner.0 as f32,
            b: at.x,
            c: at.y,
        });
    }

    fn reset(&mut self, ctx: &mut EngineContext) {
        if self.state == AlarmState::Idle {
            return;
        }
        self.state = AlarmState::Idle;
        self.beam.color = self.config.color_normal;
        self.flash.stop();
        log::debug!("{}: alarm cleared", self.config.name);
        ctx.emit_event(GameEvent {
            kind: EVENT_ALARM_CLEARED,
            a: self.owner.0 as f32,
            b: 0.0,
            c: 0.0,
        });
    }

    pub fn state(&self) -> AlarmState {
        self.state
    }

    pub fn is_alarming(&self) -> bool {
        self.state == AlarmState::Alarming
    }

    /// The beam in the owner's local frame.
    pub fn beam(&self) -> &LineComponent {
        &self.beam
    }

    pub fn color(&self) -> Color {
        self.beam.color
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn target(&self) -> Option<EntityId> {
        self.target
    }

    /// Result of the most recent ray cast.
    pub fn last_hit(&self) -> Option<RayHit> {
        self.last_hit
    }

    pub fn config(&self) -> &LaserConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tripwire_engine::{BodyDesc, ColliderDesc, ColliderMaterial};

    const DT: f32 = 1.0 / 60.0;

    fn spawn_ball(ctx: &mut EngineContext, tag: &str, pos: Vec2) -> EntityId {
        let id = ctx.next_id();
        ctx.spawn_with_body(
            Entity::new(id).with_tag(tag),
            BodyDesc::kinematic(ColliderDesc::Ball { radius: 10.0 }).with_position(pos),
            ColliderMaterial::default(),
        )
    }

    fn spawn_block(ctx: &mut EngineContext, pos: Vec2) -> EntityId {
        let id = ctx.next_id();
        ctx.spawn_with_body(
            Entity::new(id).with_tag("Block"),
            BodyDesc::fixed(ColliderDesc::Cuboid { half_width: 10.0, half_height: 10.0 })
                .with_position(pos),
            ColliderMaterial::default(),
        )
    }

    fn laser_at_origin(ctx: &mut EngineContext) -> LaserDetector {
        LaserDetector::attach(ctx, LaserConfig {
            target: Some("Player".to_string()),
            ..LaserConfig::default()
        })
    }

    fn events_of(ctx: &EngineContext, kind: f32) -> usize {
        ctx.events.iter().filter(|e| e.kind == kind).count()
    }

    #[test]
    fn idle_beam_spans_full_length() {
        let mut ctx = EngineContext::new();
        let mut laser = laser_at_origin(&mut ctx);
        laser.tick(&mut ctx, DT);

        assert_eq!(laser.state(), AlarmState::Idle);
        assert_eq!(laser.beam().end(), Some(Vec2::new(500.0, 0.0)));
        assert_eq!(laser.color(), Color::GREEN);
        assert!(laser.last_hit().is_none());
        assert!(ctx.events.is_empty());
    }

    #[test]
    fn target_in_beam_raises_alarm_once() {
        let mut ctx = EngineContext::new();
        let player = spawn_ball(&mut ctx, "Player", Vec2::new(200.0, 0.0));
        let mut laser = laser_at_origin(&mut ctx);
        assert_eq!(laser.target(), Some(player));

        for _ in 0..5 {
            laser.tick(&mut ctx, DT);
        }

        assert!(laser.is_alarming());
        assert_eq!(laser.color(), Color::RED);
        let end = laser.beam().end().unwrap();
        assert!((end - Vec2::new(190.0, 0.0)).length() < 0.01, "beam end {:?}", end);
        assert_eq!(events_of(&ctx, EVENT_ALARM_RAISED), 1);
        assert_eq!(events_of(&ctx, EVENT_ALARM_CLEARED), 0);
    }

    #[test]
    fn losing_the_target_clears_alarm() {
        let mut ctx = EngineContext::new();
        let player = spawn_ball(&mut ctx, "Player", Vec2::new(200.0, 0.0));
        let mut laser = laser_at_origin(&mut ctx);
        laser.tick(&mut ctx, DT);
        assert!(laser.is_alarming());

        ctx.despawn(player);
        laser.tick(&mut ctx, DT);

        assert_eq!(laser.state(), AlarmState::Idle);
        assert_eq!(laser.color(), Color::GREEN);
        assert_eq!(laser.beam().end(), Some(Vec2::new(500.0, 0.0)));
        assert_eq!(events_of(&ctx, EVENT_ALARM_CLEARED), 1);
    }

    #[test]
    fn obstacle_in_front_of_target_blocks_detection() {
        let mut ctx = EngineContext::new();
        spawn_ball(&mut ctx, "Player", Vec2::new(200.0, 0.0));
        spawn_block(&mut ctx, Vec2::new(100.0, 0.0));
        let mut laser = laser_at_origin(&mut ctx);
        laser.tick(&mut ctx, DT);

        assert!(!laser.is_alarming());
        let end = laser.beam().end().unwrap();
        assert!((end.x - 90.0).abs() < 0.01, "beam end {:?}", end);
    }

    #[test]
    fn missing_target_disables_detection() {
        let mut ctx = EngineContext::new();
        spawn_ball(&mut ctx, "Player", Vec2::new(200.0, 0.0));
        let mut laser = LaserDetector::attach(&mut ctx, LaserConfig::default());
        assert_eq!(laser.target(), None);

        laser.tick(&mut ctx, DT);
        assert!(!laser.is_alarming());
        assert!(laser.last_hit().is_some());
        assert!(laser.beam().end().unwrap().x < 200.0);
    }

    #[test]
    fn rotated_laser_reports_hit_in_local_frame() {
        let mut ctx = EngineContext::new();
        spawn_ball(&mut ctx, "Player", Vec2::new(50.0, 250.0));
        let mut laser = LaserDetector::attach(&mut ctx, LaserConfig {
            position: Vec2::new(50.0, 50.0),
            rotation: std::f32::consts::FRAC_PI_2,
            target: Some("Player".to_string()),
            ..LaserConfig::default()
        });
        laser.tick(&mut ctx, DT);

        assert!(laser.is_alarming());
        let end = laser.beam().end().unwrap();
        assert!((end - Vec2::new(190.0, 0.0)).length() < 0.05, "beam end {:?}", end);
    }

    #[test]
    fn alarm_flashes_while_active_and_stops_on_reset() {
        let mut ctx = EngineContext::new();
        let player = spawn_ball(&mut ctx, "Player", Vec2::new(200.0, 0.0));
        let mut laser = laser_at_origin(&mut ctx);

        laser.tick(&mut ctx, 0.1);
        assert_eq!(laser.color(), Color::RED);
        laser.tick(&mut ctx, 0.1); // 0.2 s elapsed: one flip
        assert_eq!(laser.color(), Color::GREEN);
        assert!(laser.is_alarming());
        laser.tick(&mut ctx, 0.2); // 0.05 carried + 0.2: one more flip
        assert_eq!(laser.color(), Color::RED);

        ctx.despawn(player);
        laser.tick(&mut ctx, 0.1);
        assert_eq!(laser.color(), Color::GREEN);
        for _ in 0..5 {
            laser.tick(&mut ctx, 0.1);
            assert_eq!(laser.color(), Color::GREEN);
        }
    }

    #[test]
    fn alarm_tracks_latest_cast_over_a_sequence() {
        let mut ctx = EngineContext::new();
        let player = spawn_ball(&mut ctx, "Player", Vec2::new(200.0, 0.0));
        let mut laser = laser_at_origin(&mut ctx);

        // Player steps in and out of the beam (y = 0).
        let path = [0.0, 80.0, 5.0, 5.0, 300.0, -300.0, 0.0, 12.0];
        for y in path {
            ctx.teleport(player, Vec2::new(200.0, y));
            ctx.step_physics();
            laser.tick(&mut ctx, DT);

            let hit_target = laser.last_hit().is_some_and(|hit| hit.entity == player);
            assert_eq!(laser.is_alarming(), hit_target, "y = {}", y);
            assert_eq!(laser.is_alarming(), y.abs() < 10.0, "y = {}", y);
        }
        assert_eq!(events_of(&ctx, EVENT_ALARM_RAISED), 3);
        assert_eq!(events_of(&ctx, EVENT_ALARM_CLEARED), 3);
    }

    #[test]
    fn config_defaults_fill_missing_json_fields() {
        let config: LaserConfig =
            serde_json::from_str(r#"{ "name": "Hall", "length": 320.0, "target": "Player" }"#).unwrap();
        assert_eq!(config.name, "Hall");
        assert_eq!(config.length, 320.0);
        assert_eq!(config.target.as_deref(), Some("Player"));
        assert_eq!(config.color_normal, Color::GREEN);
        assert_eq!(config.color_alert, Color::RED);
        assert!((config.flash_interval - 0.15).abs() < 1e-6);
    }
}
