pub mod entity;
pub mod line;
