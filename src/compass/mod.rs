//! Heads-up compass overlay: a horizontal bar across the top of the screen
//! showing the cardinal directions and the minimap's pins at their bearings,
//! with distance- and edge-based fading and a smoothed display heading.

pub mod angle;
pub mod bar;
pub mod components;
pub mod config;
pub mod draw;
pub mod fade;
pub mod icons;
pub mod locator;
pub mod plugin;
pub mod presenter;
pub mod smoothing;
pub mod systems;

pub use plugin::CompassPlugin;
