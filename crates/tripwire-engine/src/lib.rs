pub mod api;
pub mod core;
pub mod components;
pub mod systems;
pub mod renderer;
pub mod input;

// Re-export key types at crate root for convenience
pub use api::game::{Game, GameConfig, EngineContext, RenderContext};
pub use api::types::{Color, EntityId, GameEvent};
pub use components::entity::Entity;
pub use components::line::LineComponent;
pub use core::scene::Scene;
pub use core::time::{FixedTimestep, RepeatTimer};
pub use renderer::instance::{RenderInstance, RenderBuffer};
pub use renderer::lines::{LineInstance, LineBuffer};
pub use input::queue::{InputEvent, InputQueue};
pub use input::actions::{ActionMap, ActionState};

#[cfg(feature = "physics")]
pub use core::physics::{
    PhysicsWorld, PhysicsBody, BodyDesc, BodyType,
    ColliderDesc, ColliderMaterial, CollisionLayers,
    JointHandle, PinJointDesc, RayHit,
};
#[cfg(feature = "physics")]
pub use systems::render::build_render_buffer;
