//! Systems for the demo world: scene setup, fly camera, seeded minimap pins,
//! and keyboard toggles that exercise the compass's occlusion and pin paths.
use bevy::{
    ecs::message::MessageReader,
    input::{mouse::MouseMotion, ButtonInput},
    math::primitives::{Cuboid, Plane3d},
    prelude::*,
    window::{CursorGrabMode, CursorOptions},
};

use crate::compass::components::{CompassObserver, UiOcclusion};
use crate::minimap::store::{MinimapStore, PinData, PinId};
use crate::minimap::visibility::SmallMapWidget;
use crate::world::components::{FlyCamera, Landmark};

const GROUND_SCALE: f32 = 600.0;
const CAMERA_START_POS: Vec3 = Vec3::new(0.0, 8.0, -30.0);
/// Identity the demo assigns to the local player.
const LOCAL_PLAYER_ID: u64 = 1;
/// Some other player, for foreign shout pins.
const REMOTE_PLAYER_ID: u64 = 99;

/// Running id for pins dropped at runtime. Seeded pins use ids below this.
#[derive(Resource, Debug)]
pub struct NextPinId(u64);

impl Default for NextPinId {
    fn default() -> Self {
        Self(100)
    }
}

impl NextPinId {
    fn take(&mut self) -> PinId {
        let id = PinId::new(self.0);
        self.0 += 1;
        id
    }
}

/// Spawns the scene: ground plane, light, and the observer camera.
pub fn spawn_world_environment(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Mesh3d(meshes.add(Mesh::from(Plane3d::default()))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb_u8(90, 140, 90),
            perceptual_roughness: 0.9,
            metallic: 0.0,
            ..default()
        })),
        Transform::from_scale(Vec3::splat(GROUND_SCALE)),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 20_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(16.0, 32.0, 16.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let mut camera_transform = Transform::from_translation(CAMERA_START_POS);
    camera_transform.look_at(Vec3::new(0.0, 8.0, 0.0), Vec3::Y);
    let (yaw, pitch) = yaw_pitch_from_transform(&camera_transform);

    commands.spawn((
        Camera3d::default(),
        camera_transform,
        FlyCamera::new(yaw, pitch),
        CompassObserver {
            player_id: LOCAL_PLAYER_ID,
        },
    ));
}

/// Seeds a few landmarks at a spread of bearings and distances, each with a
/// matching pin in the minimap store.
pub fn seed_demo_pins(
    mut commands: Commands,
    mut store: ResMut<MinimapStore>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    asset_server: Res<AssetServer>,
) {
    let landmarks: [(u64, Vec3, &str, Option<u64>); 4] = [
        (1, Vec3::new(0.0, 0.0, 120.0), "mapicon_house", None),
        (2, Vec3::new(180.0, 0.0, 180.0), "mapicon_portal", None),
        (3, Vec3::new(-90.0, 0.0, 260.0), "mapicon_house", None),
        // Foreign shout: drawn and pulsing.
        (
            4,
            Vec3::new(60.0, 0.0, 240.0),
            "mapicon_shout",
            Some(REMOTE_PLAYER_ID),
        ),
    ];

    let landmark_mesh = meshes.add(Mesh::from(Cuboid::new(4.0, 12.0, 4.0)));
    let landmark_material = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(170, 150, 110),
        ..default()
    });

    for (id, position, icon_name, owner) in landmarks {
        commands.spawn((
            Mesh3d(landmark_mesh.clone()),
            MeshMaterial3d(landmark_material.clone()),
            Transform::from_translation(position + Vec3::Y * 6.0),
            Landmark,
        ));
        store.add(PinData {
            id: PinId::new(id),
            position,
            icon: asset_server.load(format!("compass/{icon_name}.png")),
            icon_name: icon_name.to_string(),
            owner,
        });
    }

    info!("Seeded {} demo pins", store.len());
}

/// Spawns a placeholder corner map widget so the hide-small-map setting has
/// something to act on.
pub fn spawn_small_map_widget(mut commands: Commands) {
    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            right: Val::Px(16.0),
            bottom: Val::Px(16.0),
            width: Val::Px(160.0),
            height: Val::Px(160.0),
            ..default()
        },
        BackgroundColor(Color::srgba(0.12, 0.14, 0.18, 0.85)),
        SmallMapWidget,
    ));
}

/// Toggles cursor grab when engaging the fly camera look mode.
pub fn update_cursor_grab(
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mut cursor_options: Single<&mut CursorOptions>,
) {
    if mouse_buttons.just_pressed(MouseButton::Right) {
        cursor_options.visible = false;
        cursor_options.grab_mode = CursorGrabMode::Locked;
    } else if mouse_buttons.just_released(MouseButton::Right) {
        cursor_options.visible = true;
        cursor_options.grab_mode = CursorGrabMode::None;
    }
}

/// Applies mouse look to the fly camera when the right mouse button is held.
pub fn fly_camera_mouse_look(
    mut motion_events: MessageReader<MouseMotion>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    time: Res<Time>,
    mut query: Query<(&mut FlyCamera, &mut Transform)>,
) {
    let mut cumulative_delta = Vec2::ZERO;
    for ev in motion_events.read() {
        cumulative_delta += ev.delta;
    }

    if !mouse_buttons.pressed(MouseButton::Right) {
        return;
    }

    if cumulative_delta == Vec2::ZERO {
        return;
    }

    if let Ok((mut fly_cam, mut transform)) = query.single_mut() {
        fly_cam.yaw -= cumulative_delta.x * fly_cam.look_sensitivity * time.delta_secs();
        fly_cam.pitch -= cumulative_delta.y * fly_cam.look_sensitivity * time.delta_secs();
        fly_cam.pitch = fly_cam.pitch.clamp(-1.54, 1.54);

        let rotation = Quat::from_axis_angle(Vec3::Y, fly_cam.yaw)
            * Quat::from_axis_angle(Vec3::X, fly_cam.pitch);
        transform.rotation = rotation.normalize();
    }
}

/// Moves the fly camera using WASD + Space/LShift.
pub fn fly_camera_translate(
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut query: Query<(&FlyCamera, &mut Transform)>,
) {
    if let Ok((fly_cam, mut transform)) = query.single_mut() {
        let mut direction = Vec3::ZERO;
        let forward = {
            let f = transform.forward().as_vec3();
            Vec3::new(f.x, 0.0, f.z).normalize_or_zero()
        };
        let right = {
            let r = transform.right().as_vec3();
            Vec3::new(r.x, 0.0, r.z).normalize_or_zero()
        };
        if keyboard.pressed(KeyCode::KeyW) {
            direction += forward;
        }
        if keyboard.pressed(KeyCode::KeyS) {
            direction += -forward;
        }
        if keyboard.pressed(KeyCode::KeyA) {
            direction += -right;
        }
        if keyboard.pressed(KeyCode::KeyD) {
            direction += right;
        }
        if keyboard.pressed(KeyCode::Space) {
            direction += Vec3::Y;
        }
        if keyboard.pressed(KeyCode::ShiftLeft) {
            direction += -Vec3::Y;
        }

        if direction.length_squared() > 0.0 {
            let modifier = if keyboard.pressed(KeyCode::ControlLeft) {
                2.5
            } else {
                1.0
            };
            transform.translation +=
                direction.normalize() * fly_cam.move_speed * modifier * time.delta_secs();
        }
    }
}

/// Keyboard toggles for the blocking-UI flags the compass fade watches.
/// Tab = inventory, M = big map, Escape = modal menu, T = chat focus.
pub fn toggle_occlusion_flags(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut occlusion: ResMut<UiOcclusion>,
) {
    if keyboard.just_pressed(KeyCode::Tab) {
        occlusion.inventory_open = !occlusion.inventory_open;
    }
    if keyboard.just_pressed(KeyCode::KeyM) {
        occlusion.big_map_open = !occlusion.big_map_open;
    }
    if keyboard.just_pressed(KeyCode::Escape) {
        occlusion.modal_open = !occlusion.modal_open;
    }
    if keyboard.just_pressed(KeyCode::KeyT) {
        occlusion.text_input_focused = !occlusion.text_input_focused;
    }
}

/// P drops a ping pin well ahead of the camera; O drops the local player's
/// own shout at their feet, which the compass must suppress.
pub fn drop_demo_pins(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut store: ResMut<MinimapStore>,
    mut next_id: ResMut<NextPinId>,
    asset_server: Res<AssetServer>,
    observers: Query<&Transform, With<CompassObserver>>,
) {
    let Ok(transform) = observers.single() else {
        return;
    };

    if keyboard.just_pressed(KeyCode::KeyP) {
        let forward = transform.forward().as_vec3();
        let flat = Vec3::new(forward.x, 0.0, forward.z).normalize_or_zero();
        store.add(PinData {
            id: next_id.take(),
            position: transform.translation + flat * 400.0,
            icon: asset_server.load("compass/mapicon_ping.png"),
            icon_name: "mapicon_ping".to_string(),
            owner: None,
        });
    }

    if keyboard.just_pressed(KeyCode::KeyO) {
        store.add(PinData {
            id: next_id.take(),
            position: transform.translation,
            icon: asset_server.load("compass/mapicon_shout.png"),
            icon_name: "mapicon_shout".to_string(),
            owner: Some(LOCAL_PLAYER_ID),
        });
    }
}

fn yaw_pitch_from_transform(transform: &Transform) -> (f32, f32) {
    let forward = -transform.forward().as_vec3();
    let yaw = forward.x.atan2(forward.z);
    let pitch = forward.y.asin();
    (yaw, pitch)
}
