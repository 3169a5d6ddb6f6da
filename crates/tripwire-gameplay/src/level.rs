//! JSON level description and the `Game` that plays it.

use anyhow::Context;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tripwire_engine::{
    ActionMap, BodyDesc, ColliderDesc, ColliderMaterial, CollisionLayers, EngineContext, Entity,
    Game, GameConfig, InputQueue, RenderContext,
};

use crate::chain::{ChainConfig, PhysicsChain, SegmentPrototype};
use crate::laser::{LaserConfig, LaserDetector};
use crate::player::{PlayerConfig, PlayerController};

/// Custom host event: `a` = segment index of the first chain, `b/c` = impulse.
pub const CUSTOM_IMPULSE: u32 = 1;

/// A static box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallConfig {
    pub position: Vec2,
    pub half_extents: Vec2,
    pub layers: CollisionLayers,
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            half_extents: Vec2::splat(10.0),
            layers: CollisionLayers::default(),
        }
    }
}

impl WallConfig {
    fn new(position: Vec2, half_extents: Vec2) -> Self {
        Self {
            position,
            half_extents,
            ..Self::default()
        }
    }
}

/// Fields missing from JSON fall back to [`LevelConfig::empty`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default = "LevelConfig::empty")]
pub struct LevelConfig {
    pub world_width: f32,
    pub world_height: f32,
    pub gravity: Vec2,
    pub fixed_dt: f32,
    pub actions: ActionMap,
    pub player: Option<PlayerConfig>,
    pub walls: Vec<WallConfig>,
    pub lasers: Vec<LaserConfig>,
    pub chains: Vec<ChainConfig>,
}

impl LevelConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// An empty room of the default size.
    pub fn empty() -> Self {
        Self {
            world_width: 800.0,
            world_height: 600.0,
            gravity: Vec2::new(0.0, 980.0),
            fixed_dt: 1.0 / 60.0,
            actions: ActionMap::ui_defaults(),
            player: None,
            walls: Vec::new(),
            lasers: Vec::new(),
            chains: Vec::new(),
        }
    }

    /// The security room: a player, one laser across the middle and a rope to yank.
    pub fn security_room() -> Self {
        let (w, h) = (800.0, 600.0);
        Self {
            player: Some(PlayerConfig {
                position: Vec2::new(120.0, 300.0),
                ..PlayerConfig::default()
            }),
            walls: vec![
                WallConfig::new(Vec2::new(w / 2.0, h - 10.0), Vec2::new(w / 2.0, 10.0)),
                WallConfig::new(Vec2::new(w / 2.0, 10.0), Vec2::new(w / 2.0, 10.0)),
                WallConfig::new(Vec2::new(10.0, h / 2.0), Vec2::new(10.0, h / 2.0)),
                WallConfig::new(Vec2::new(w - 10.0, h / 2.0), Vec2::new(10.0, h / 2.0)),
            ],
            lasers: vec![LaserConfig {
                position: Vec2::new(400.0, 100.0),
                rotation: std::f32::consts::FRAC_PI_2,
                target: Some("Player".to_string()),
                ..LaserConfig::default()
            }],
            chains: vec![ChainConfig {
                position: Vec2::new(600.0, 50.0),
                segment_prototype: Some(SegmentPrototype::default()),
                player: Some("Player".to_string()),
                ..ChainConfig::default()
            }],
            ..Self::empty()
        }
    }
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self::security_room()
    }
}

/// Plays a [`LevelConfig`]: walls, an optional player, chains and lasers.
pub struct SecurityRoom {
    level: LevelConfig,
    player: Option<PlayerController>,
    chains: Vec<PhysicsChain>,
    lasers: Vec<LaserDetector>,
}

impl SecurityRoom {
    pub fn new() -> Self {
        Self::from_config(LevelConfig::default())
    }

    pub fn from_config(level: LevelConfig) -> Self {
        Self {
            level,
            player: None,
            chains: Vec::new(),
            lasers: Vec::new(),
        }
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let level = LevelConfig::from_json(json).context("invalid level JSON")?;
        Ok(Self::from_config(level))
    }

    pub fn level(&self) -> &LevelConfig {
        &self.level
    }

    pub fn player(&self) -> Option<&PlayerController> {
        self.player.as_ref()
    }

    pub fn chains(&self) -> &[PhysicsChain] {
        &self.chains
    }

    pub fn lasers(&self) -> &[LaserDetector] {
        &self.lasers
    }

    fn spawn_wall(ctx: &mut EngineContext, wall: &WallConfig) {
        let id = ctx.next_id();
        ctx.spawn_with_body(
            Entity::new(id).with_tag("Wall"),
            BodyDesc::fixed(ColliderDesc::Cuboid {
                half_width: wall.half_extents.x,
                half_height: wall.half_extents.y,
            })
            .with_position(wall.position)
            .with_layers(wall.layers),
            ColliderMaterial::default(),
        );
    }

    fn apply_custom_impulse(&self, ctx: &mut EngineContext, index: f32, impulse: Vec2) {
        if index < 0.0 || index.fract() != 0.0 {
            log::warn!("impulse event ignored: bad segment index {}", index);
            return;
        }
        if let Some(chain) = self.chains.first() {
            chain.apply_impulse_to_segment(ctx, index as usize, impulse);
        }
    }
}

impl Default for SecurityRoom {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for SecurityRoom {
    fn config(&self) -> GameConfig {
        GameConfig {
            fixed_dt: self.level.fixed_dt,
            world_width: self.level.world_width,
            world_height: self.level.world_height,
            gravity: self.level.gravity,
            ..GameConfig::default()
        }
    }

    fn init(&mut self, ctx: &mut EngineContext) {
        ctx.actions.set_map(self.level.actions.clone());

        for wall in &self.level.walls {
            Self::spawn_wall(ctx, wall);
        }

        self.player = self
            .level
            .player
            .as_ref()
            .map(|config| PlayerController::spawn(ctx, config));

        for config in &self.level.chains {
            match PhysicsChain::build(ctx, config) {
                Ok(chain) => self.chains.push(chain),
                Err(err) => log::error!("{}: {}", config.name, err),
            }
        }

        for config in &self.level.lasers {
            self.lasers.push(LaserDetector::attach(ctx, config.clone()));
        }

        log::info!(
            "level ready: {} walls, {} chains, {} lasers",
            self.level.walls.len(),
            self.chains.len(),
            self.lasers.len()
        );
    }

    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue) {
        for chain in &self.chains {
            chain.handle_input(ctx);
        }

        for (index, x, y) in input.custom(CUSTOM_IMPULSE) {
            self.apply_custom_impulse(ctx, index, Vec2::new(x, y));
        }

        if let Some(player) = self.player.as_mut() {
            player.tick(ctx);
        }

        let dt = ctx.dt();
        for laser in &mut self.lasers {
            laser.tick(ctx, dt);
        }
    }

    fn render(&self, ctx: &mut RenderContext) {
        for laser in &self.lasers {
            if let Some(owner) = ctx.scene.get(laser.owner()) {
                ctx.lines.push_polyline(laser.beam(), |p| owner.to_world(p));
            }
        }
    }
}
