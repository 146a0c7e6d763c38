// src/minimap/plugin.rs
//
// Plugin registration for the minimap pin store and widget visibility.

use bevy::prelude::*;

use super::store::MinimapStore;
use super::visibility::{apply_small_map_visibility, SmallMapHandle};

/// Plugin owning the minimap pin store the compass reads from.
///
/// Hosts push their pins into [`MinimapStore`]; the compass locator pulls
/// them back out. Also hides the small corner map widget when the config
/// asks for the compass to replace it.
pub struct MinimapPlugin;

impl Plugin for MinimapPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(MinimapStore::current_generation())
            .init_resource::<SmallMapHandle>()
            .add_systems(Update, apply_small_map_visibility);

        info!("MinimapPlugin registered");
    }
}
