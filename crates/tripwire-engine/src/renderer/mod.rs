pub mod instance;
pub mod lines;
