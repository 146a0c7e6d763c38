//! WorldPlugin sets up the demo scene, fly camera, and the keyboard toggles
//! that drive the compass's occlusion flags and runtime pins.
use bevy::prelude::*;

use crate::world::systems::{
    drop_demo_pins, fly_camera_mouse_look, fly_camera_translate, seed_demo_pins,
    spawn_small_map_widget, spawn_world_environment, toggle_occlusion_flags, update_cursor_grab,
    NextPinId,
};

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NextPinId>()
            .add_systems(
                Startup,
                (spawn_world_environment, seed_demo_pins, spawn_small_map_widget),
            )
            .add_systems(
                Update,
                (
                    update_cursor_grab,
                    fly_camera_mouse_look.after(update_cursor_grab),
                    fly_camera_translate,
                    toggle_occlusion_flags,
                    drop_demo_pins,
                ),
            );
    }
}
