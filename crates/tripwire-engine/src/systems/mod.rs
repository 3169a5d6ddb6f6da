#[cfg(feature = "physics")]
pub mod render;
