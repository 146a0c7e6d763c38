// src/compass/plugin.rs
//
// Plugin registration for the compass overlay.

use bevy::prelude::*;
#[cfg(feature = "compass_debug")]
use bevy::time::TimerMode;

use super::bar::BarGeometry;
use super::components::UiOcclusion;
use super::config::CompassSettings;
use super::draw::CompassDrawList;
use super::icons::{load_compass_icons, recheck_cardinal_locale};
use super::locator::PinLocator;
use super::presenter::{present_draw_list, setup_compass_root};
use super::smoothing::{DisplayHeading, OpacityCache};
use super::systems::{
    advance_global_fade, compose_compass, establish_bar_geometry, prune_pin_caches,
    smooth_display_heading, GlobalFade, PruneClock, SeenPins, ShoutOwnerCache,
};

#[cfg(feature = "compass_debug")]
#[derive(Resource)]
struct DebugStatTimer {
    timer: Timer,
}

#[cfg(feature = "compass_debug")]
impl Default for DebugStatTimer {
    fn default() -> Self {
        Self {
            timer: Timer::from_seconds(1.0, TimerMode::Repeating),
        }
    }
}

#[cfg(feature = "compass_debug")]
fn log_compass_stats(
    time: Res<Time>,
    mut stat_timer: ResMut<DebugStatTimer>,
    list: Res<CompassDrawList>,
    fade: Res<GlobalFade>,
    locator: Res<PinLocator>,
) {
    if !stat_timer.timer.tick(time.delta()).just_finished() {
        return;
    }
    debug!(
        "compass: {} draw commands, fade {:.2}, strategy {:?}",
        list.len(),
        fade.alpha(),
        locator.resolved_strategy()
    );
}

/// Plugin providing the heads-up compass overlay.
///
/// Reads the observer marker and the minimap pin store, composes an ordered
/// draw list each frame, and presents it as pooled UI image nodes.
///
/// # System Ordering
///
/// 1. `establish_bar_geometry` - one-shot bar rectangle from the window
/// 2. `advance_global_fade` / `smooth_display_heading` - per-frame smoothing
/// 3. `compose_compass` - builds the draw list from the smoothed state
/// 4. `present_draw_list` / `prune_pin_caches` - output and cache upkeep
///
/// # Dependencies
///
/// - The host must attach `CompassObserver` to the local player's camera or
///   character and keep `UiOcclusion` current.
/// - `MinimapPlugin` must be registered before this plugin (provides the
///   `MinimapStore` the locator reads).
pub struct CompassPlugin;

impl Plugin for CompassPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(CompassSettings::load_or_default())
            .init_resource::<BarGeometry>()
            .init_resource::<UiOcclusion>()
            .init_resource::<GlobalFade>()
            .init_resource::<DisplayHeading>()
            .init_resource::<OpacityCache>()
            .init_resource::<ShoutOwnerCache>()
            .init_resource::<SeenPins>()
            .init_resource::<PruneClock>()
            .init_resource::<PinLocator>()
            .init_resource::<CompassDrawList>()
            .add_systems(Startup, (setup_compass_root, load_compass_icons))
            .add_systems(
                Update,
                (
                    establish_bar_geometry,
                    advance_global_fade,
                    smooth_display_heading,
                    recheck_cardinal_locale,
                    compose_compass
                        .after(establish_bar_geometry)
                        .after(advance_global_fade)
                        .after(smooth_display_heading),
                    present_draw_list.after(compose_compass),
                    prune_pin_caches.after(compose_compass),
                ),
            );

        #[cfg(feature = "compass_debug")]
        {
            app.init_resource::<DebugStatTimer>()
                .add_systems(Update, log_compass_stats.after(compose_compass));
        }

        info!("CompassPlugin registered");
    }
}
