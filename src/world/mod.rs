//! Demo world housing the scene, camera controls, and compass test inputs.
pub mod components;
pub mod plugin;
pub mod systems;

pub use plugin::WorldPlugin;
