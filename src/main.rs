use bevy::prelude::*;

mod compass;
mod minimap;
mod world;

use crate::{compass::CompassPlugin, minimap::MinimapPlugin, world::WorldPlugin};

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins,
            WorldPlugin,
            MinimapPlugin,
            CompassPlugin, // After MinimapPlugin so the pin store exists
        ))
        .run();
}
