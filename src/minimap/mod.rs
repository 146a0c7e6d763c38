//! Minimap data the compass consumes: the pin store and the optional hiding
//! of the small corner map widget.

pub mod plugin;
pub mod store;
pub mod visibility;

pub use plugin::MinimapPlugin;
