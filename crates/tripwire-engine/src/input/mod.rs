pub mod actions;
pub mod queue;
