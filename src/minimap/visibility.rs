//! Optional hiding of the corner map widget while the compass replaces it.
//!
//! The host may rebuild its HUD at any time, so the widget entity is not
//! trusted across frames: the cached id is dropped the moment it stops
//! resolving and is re-looked-up on a short frame interval regardless.

use bevy::prelude::*;

use crate::compass::config::CompassSettings;

/// How often the cached widget entity is re-resolved.
const RESOLVE_INTERVAL_FRAMES: u32 = 30;

/// Marks the host's small corner map widget.
#[derive(Component, Debug, Default)]
pub struct SmallMapWidget;

/// Cached widget entity plus the re-resolve counter.
#[derive(Resource, Debug, Default)]
pub struct SmallMapHandle {
    entity: Option<Entity>,
    frames: u32,
}

fn desired_visibility(hide: bool) -> Visibility {
    if hide {
        Visibility::Hidden
    } else {
        Visibility::Inherited
    }
}

pub fn apply_small_map_visibility(
    settings: Res<CompassSettings>,
    mut handle: ResMut<SmallMapHandle>,
    widgets: Query<Entity, With<SmallMapWidget>>,
    mut visibilities: Query<&mut Visibility>,
) {
    handle.frames += 1;
    let stale = handle.entity.is_none_or(|entity| widgets.get(entity).is_err());
    if stale || handle.frames >= RESOLVE_INTERVAL_FRAMES {
        handle.frames = 0;
        handle.entity = widgets.iter().next();
    }

    let Some(entity) = handle.entity else {
        return;
    };
    let Ok(mut visibility) = visibilities.get_mut(entity) else {
        return;
    };
    let desired = desired_visibility(settings.hud.hide_small_map);
    if *visibility != desired {
        *visibility = desired;
    }
}
