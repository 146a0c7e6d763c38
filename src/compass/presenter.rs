//! Turns the frame's draw list into UI image nodes.
//!
//! The presenter owns a pool of absolutely-positioned child nodes under a
//! full-screen overlay root. Each frame it maps draw command N onto slot N,
//! growing the pool when the list is longer than it has ever been and hiding
//! the slots past the end of the list. Slot order doubles as z-order, so the
//! compositor's shadow-bar-cardinals-pins sequence stacks correctly.

use bevy::prelude::*;

use crate::compass::draw::CompassDrawList;

/// Z-index of the overlay root: above the 3D scene, below modal panels.
const OVERLAY_Z_INDEX: i32 = 90;

/// Entity id of the overlay root that all compass slots parent to.
#[derive(Resource, Debug)]
pub struct CompassUiRoot(pub Entity);

/// One pooled image node; `index` is its position in the draw list.
#[derive(Component, Debug)]
pub struct CompassSlot {
    index: usize,
}

/// Set up the full-screen transparent overlay the compass draws into.
pub fn setup_compass_root(mut commands: Commands) {
    let root = commands
        .spawn(Node {
            position_type: PositionType::Absolute,
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        })
        .insert(ZIndex(OVERLAY_Z_INDEX))
        .insert(BackgroundColor(Color::NONE))
        .id();

    commands.insert_resource(CompassUiRoot(root));
    info!("Compass UI root created");
}

/// Sync the slot pool with the current draw list.
pub fn present_draw_list(
    mut commands: Commands,
    list: Res<CompassDrawList>,
    root: Res<CompassUiRoot>,
    mut slots: Query<(&CompassSlot, &mut Node, &mut ImageNode, &mut Visibility)>,
) {
    let pooled = slots.iter().count();
    for index in pooled..list.len() {
        let slot = commands
            .spawn((
                CompassSlot { index },
                Node {
                    position_type: PositionType::Absolute,
                    ..default()
                },
                ImageNode::default(),
                Visibility::Hidden,
                ZIndex(index as i32),
            ))
            .id();
        commands.entity(root.0).add_child(slot);
    }

    for (slot, mut node, mut image, mut visibility) in &mut slots {
        let Some(command) = list.commands().get(slot.index) else {
            *visibility = Visibility::Hidden;
            continue;
        };
        node.left = Val::Px(command.rect.min.x);
        node.top = Val::Px(command.rect.min.y);
        node.width = Val::Px(command.rect.width());
        node.height = Val::Px(command.rect.height());
        if image.image != command.image {
            image.image = command.image.clone();
        }
        image.color = command.color;
        *visibility = Visibility::Visible;
    }
}
