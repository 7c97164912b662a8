pub mod collisions;
pub mod config;
pub mod debug;
pub mod plugin;
pub mod prelude;
