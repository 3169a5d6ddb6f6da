//! A rope of rigid segments hanging from a fixed anchor, linked by pin joints.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tripwire_engine::input::actions::UI_ACCEPT;
use tripwire_engine::{
    BodyDesc, ColliderDesc, ColliderMaterial, CollisionLayers, EngineContext, Entity, EntityId,
    JointHandle, PhysicsBody, PinJointDesc,
};

use crate::error::ChainError;

/// Impulse magnitude applied to the last segment when the player yanks the rope.
pub const YANK_IMPULSE: f32 = 300.0;

/// Body template shared by every segment of a chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentPrototype {
    pub collider: ColliderDesc,
    pub material: ColliderMaterial,
    pub layers: CollisionLayers,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl Default for SegmentPrototype {
    fn default() -> Self {
        Self {
            collider: ColliderDesc::Cuboid { half_width: 4.0, half_height: 12.0 },
            material: ColliderMaterial::default(),
            layers: CollisionLayers::default(),
            linear_damping: 0.0,
            angular_damping: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Tag prefix for log lines. The anchor itself is tagged `Anchor`.
    pub name: String,
    /// Anchor position.
    pub position: Vec2,
    pub segment_count: usize,
    /// Distance between consecutive segment centers.
    pub segment_distance: f32,
    /// Direction segments are laid out in, normalized on build.
    pub axis: Vec2,
    pub segment_prototype: Option<SegmentPrototype>,
    /// Tag of the entity a yank pulls toward.
    pub player: Option<String>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            name: "PhysicsChain".to_string(),
            position: Vec2::ZERO,
            segment_count: 8,
            segment_distance: 30.0,
            axis: Vec2::Y,
            segment_prototype: None,
            player: None,
        }
    }
}

/// A pin joint created by the chain, with the world position it was created at.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainJoint {
    pub name: String,
    pub handle: JointHandle,
    pub body_a: EntityId,
    pub body_b: EntityId,
    pub position: Vec2,
}

#[derive(Debug)]
pub struct PhysicsChain {
    name: String,
    anchor: EntityId,
    segments: Vec<EntityId>,
    joints: Vec<ChainJoint>,
    player: Option<EntityId>,
}

impl PhysicsChain {
    /// Spawn the anchor, every segment and every joint. On error nothing is spawned.
    pub fn build(ctx: &mut EngineContext, config: &ChainConfig) -> Result<Self, ChainError> {
        let prototype = config
            .segment_prototype
            .as_ref()
            .ok_or(ChainError::MissingSegmentPrototype)?;
        if !prototype.collider.is_valid() {
            return Err(ChainError::InvalidSegmentPrototype(prototype.collider));
        }
        if config.segment_count == 0 {
            return Err(ChainError::NoSegments);
        }
        let axis = config.axis.normalize_or_zero();
        if axis == Vec2::ZERO || !axis.is_finite() {
            return Err(ChainError::InvalidAxis);
        }

        let (anchor, anchor_body) = spawn_body(
            ctx,
            "Anchor",
            BodyDesc::fixed(ColliderDesc::Ball { radius: 1.0 })
                .with_position(config.position)
                .with_layers(CollisionLayers::NONE),
            ColliderMaterial::default(),
        );

        let mut segments = Vec::with_capacity(config.segment_count);
        let mut joints = Vec::with_capacity(config.segment_count);
        let mut prev = (anchor, anchor_body, config.position);

        for i in 0..config.segment_count {
            let pos = config.position + axis * (i as f32 + 1.0) * config.segment_distance;
            let desc = BodyDesc::dynamic(prototype.collider)
                .with_position(pos)
                .with_layers(prototype.layers)
                .with_linear_damping(prototype.linear_damping)
                .with_angular_damping(prototype.angular_damping);
            let (segment, body) = spawn_body(ctx, &format!("ChainSegment_{}", i), desc, prototype.material);
            log::debug!("{}: segment {} at {}", config.name, i, pos);

            let (prev_id, prev_body, prev_pos) = prev;
            let joint_pos = if i == 0 { pos } else { (prev_pos + pos) * 0.5 };
            let handle = ctx.physics.create_pin_joint(&prev_body, &body, &PinJointDesc {
                anchor_a: joint_pos - prev_pos,
                anchor_b: joint_pos - pos,
                disable_collision: true,
            });
            log::debug!("{}: Joint_{} at {} links {:?} and {:?}", config.name, i, joint_pos, prev_id, segment);

            joints.push(ChainJoint {
                name: format!("Joint_{}", i),
                handle,
                body_a: prev_id,
                body_b: segment,
                position: joint_pos,
            });
            segments.push(segment);
            prev = (segment, body, pos);
        }

        let player = config.player.as_deref().and_then(|tag| {
            let id = ctx.scene.id_by_tag(tag);
            if id.is_none() {
                log::warn!("{}: player '{}' not found, yank disabled", config.name, tag);
            }
            id
        });

        log::info!("{}: built {} segments", config.name, segments.len());
        Ok(Self {
            name: config.name.clone(),
            anchor,
            segments,
            joints,
            player,
        })
    }

    /// Apply an impulse to segment `index`. Out-of-range indices do nothing.
    pub fn apply_impulse_to_segment(&self, ctx: &mut EngineContext, index: usize, impulse: Vec2) {
        if let Some(&segment) = self.segments.get(index) {
            ctx.apply_impulse(segment, impulse);
        }
    }

    /// Yank the rope toward the player when `ui_accept` was just pressed.
    pub fn handle_input(&self, ctx: &mut EngineContext) {
        if ctx.actions.is_action_just_pressed(UI_ACCEPT) {
            self.yank_toward_player(ctx);
        }
    }

    fn yank_toward_player(&self, ctx: &mut EngineContext) {
        let (Some(player), Some(&last)) = (self.player, self.segments.last()) else {
            return;
        };
        let (Some(player_pos), Some(last_pos)) = (ctx.position(player), ctx.position(last)) else {
            return;
        };
        let impulse = (player_pos - last_pos).normalize_or_zero() * YANK_IMPULSE;
        ctx.apply_impulse(last, impulse);
        log::info!("{}: yanked toward player with {}", self.name, impulse);
    }

    pub fn anchor(&self) -> EntityId {
        self.anchor
    }

    pub fn segments(&self) -> &[EntityId] {
        &self.segments
    }

    pub fn joints(&self) -> &[ChainJoint] {
        &self.joints
    }

    pub fn player(&self) -> Option<EntityId> {
        self.player
    }
}

fn spawn_body(
    ctx: &mut EngineContext,
    tag: &str,
    desc: BodyDesc,
    material: ColliderMaterial,
) -> (EntityId, PhysicsBody) {
    let id = ctx.next_id();
    let body = ctx.physics.create_body(id, &desc, material);
    ctx.scene.spawn(
        Entity::new(id)
            .with_tag(tag)
            .with_pos(desc.position)
            .with_rotation(desc.rotation)
            .with_body(body),
    );
    (id, body)
}
