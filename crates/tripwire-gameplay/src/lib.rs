pub mod chain;
pub mod error;
pub mod laser;
pub mod level;
pub mod player;

pub use chain::{ChainConfig, ChainJoint, PhysicsChain, SegmentPrototype};
pub use error::ChainError;
pub use laser::{AlarmState, LaserConfig, LaserDetector, EVENT_ALARM_CLEARED, EVENT_ALARM_RAISED};
pub use level::{LevelConfig, SecurityRoom, WallConfig, CUSTOM_IMPULSE};
pub use player::{PlayerConfig, PlayerController};
