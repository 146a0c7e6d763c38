//! Per-frame compass composition.
//!
//! Frame order is fixed: the global fade advances, the display heading is
//! smoothed, then the compositor projects cardinals and pins into the draw
//! list (shadow, bar, cardinals, pins — later commands draw on top). While
//! the overlay is hidden the compositor clears the list and does no
//! projection or decay work at all.

use std::collections::{HashMap, HashSet};

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::compass::angle::bearing_degrees;
use crate::compass::bar::{BarGeometry, BarProjection};
use crate::compass::components::{CompassObserver, UiOcclusion};
use crate::compass::config::CompassSettings;
use crate::compass::draw::{CompassDrawList, DrawCommand};
use crate::compass::fade::{
    cardinal_scale, distance_fade, distance_scale, edge_fade, lerp, pulse_scale, MIN_VISIBLE_ALPHA,
};
use crate::compass::icons::CompassIcons;
use crate::compass::locator::PinLocator;
use crate::compass::smoothing::{exponential_step, DisplayHeading, OpacityCache};
use crate::minimap::store::{MinimapStore, PinData, PinId, PinKind};

/// Offset of the drop shadow behind the bar, in pixels.
const SHADOW_OFFSET: f32 = 3.0;
/// Shadow darkness relative to the global fade.
const SHADOW_ALPHA: f32 = 0.45;
/// Shouts born within this range of the observer are classified as their own
/// when the pin carries no owner id.
const OWN_SHOUT_RADIUS: f32 = 3.0;
/// Stale per-pin cache entries are swept at most this often.
const PRUNE_INTERVAL_FRAMES: u32 = 120;

/// Global show/hide fade. Driven toward 1 when no blocking UI is open and the
/// world-entered latch is set, toward 0 otherwise.
#[derive(Resource, Debug, Default)]
pub struct GlobalFade {
    alpha: f32,
    world_entered: bool,
}

impl GlobalFade {
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Below this the compositor skips all per-frame work.
    pub fn is_hidden(&self) -> bool {
        self.alpha <= MIN_VISIBLE_ALPHA
    }

    /// Advances the fade one frame. The first non-occluded frame sets the
    /// world-entered latch; until then the target stays 0 so the overlay
    /// cannot flash before the player first spawns.
    pub fn advance(&mut self, blocking_ui: bool, rate: f32, delta_seconds: f32) {
        if !self.world_entered && !blocking_ui {
            self.world_entered = true;
        }
        let target = if !blocking_ui && self.world_entered {
            1.0
        } else {
            0.0
        };
        self.alpha = lerp(self.alpha, target, exponential_step(rate, delta_seconds));
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn reset(&mut self) {
        self.alpha = 0.0;
        self.world_entered = false;
    }
}

/// Cached verdicts for "is this shout the local player's own?". A pin without
/// an owner id is classified once, by proximity at first sighting, and the
/// verdict is reused for its remaining lifetime.
#[derive(Resource, Debug, Default)]
pub struct ShoutOwnerCache {
    entries: HashMap<PinId, bool>,
}

impl ShoutOwnerCache {
    pub fn is_local_shout(
        &mut self,
        pin: &PinData,
        local_player_id: u64,
        observer_position: Vec3,
    ) -> bool {
        if pin.kind() != PinKind::Shout {
            return false;
        }
        if let Some(&verdict) = self.entries.get(&pin.id) {
            return verdict;
        }
        let verdict = match pin.owner {
            Some(owner) => owner == local_player_id,
            None => {
                pin.position.distance_squared(observer_position)
                    <= OWN_SHOUT_RADIUS * OWN_SHOUT_RADIUS
            }
        };
        self.entries.insert(pin.id, verdict);
        verdict
    }

    pub fn retain_live(&mut self, live: &HashSet<PinId>) {
        self.entries.retain(|id, _| live.contains(id));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Pin identities enumerated on the most recent frame the locator yielded a
/// result. The periodic sweep prunes cache entries against this set.
#[derive(Resource, Debug, Default)]
pub struct SeenPins {
    pub ids: HashSet<PinId>,
}

/// Frame counter for the periodic cache sweep.
#[derive(Resource, Debug, Default)]
pub struct PruneClock {
    frames: u32,
}

/// Everything the composition math needs for one frame.
pub struct FrameContext<'a> {
    pub settings: &'a CompassSettings,
    pub bar: Rect,
    pub heading: f32,
    pub global_alpha: f32,
    pub elapsed_seconds: f32,
    pub delta_seconds: f32,
    pub observer_position: Vec3,
    pub local_player_id: u64,
}

fn centered_rect(center_x: f32, bar: Rect, width: f32, height: f32) -> Rect {
    let x = center_x - width / 2.0;
    let y = bar.min.y + (bar.height() - height) / 2.0;
    Rect::new(x, y, x + width, y + height)
}

/// Builds the frame's draw list: shadow, bar, cardinals, then pins.
pub fn compose_frame<'a>(
    ctx: &FrameContext<'_>,
    icons: &CompassIcons,
    pins: Option<Box<dyn Iterator<Item = &'a PinData> + 'a>>,
    opacities: &mut OpacityCache,
    shouts: &mut ShoutOwnerCache,
    seen: &mut HashSet<PinId>,
    out: &mut CompassDrawList,
) {
    out.clear();

    let shadow = Rect::new(
        ctx.bar.min.x + SHADOW_OFFSET,
        ctx.bar.min.y + SHADOW_OFFSET,
        ctx.bar.max.x + SHADOW_OFFSET,
        ctx.bar.max.y + SHADOW_OFFSET,
    );
    out.push(DrawCommand::full_texture(
        shadow,
        icons.bar.clone(),
        Color::srgba(0.0, 0.0, 0.0, SHADOW_ALPHA * ctx.global_alpha),
    ));
    out.push(DrawCommand::full_texture(
        ctx.bar,
        icons.bar.clone(),
        Color::WHITE.with_alpha(ctx.global_alpha),
    ));

    compose_cardinals(ctx, icons, out);
    if let Some(pins) = pins {
        compose_pins(ctx, pins, opacities, shouts, seen, out);
    }
}

fn compose_cardinals(ctx: &FrameContext<'_>, icons: &CompassIcons, out: &mut CompassDrawList) {
    let tuning = &ctx.settings.cardinals;
    let projection =
        BarProjection::for_class(ctx.bar, tuning.span_degrees, tuning.usable_width_fraction);

    let cardinals: [(f32, &Handle<Image>); 4] = [
        (0.0, &icons.north),
        (90.0, &icons.east),
        (180.0, &icons.south),
        (-90.0, &icons.west),
    ];

    for (bearing, icon) in cardinals {
        let Some(item) = projection.project(ctx.heading, bearing) else {
            continue;
        };
        // Cardinals have no distance: edge fade only.
        let alpha = edge_fade(
            item.offset_degrees,
            projection.half_span(),
            tuning.edge_fade_inner_fraction,
        ) * ctx.global_alpha;
        if alpha <= MIN_VISIBLE_ALPHA {
            continue;
        }
        let size =
            tuning.icon_size * cardinal_scale(item.offset_degrees, projection.half_span(), tuning);
        out.push(DrawCommand::full_texture(
            centered_rect(item.x, ctx.bar, size, size),
            icon.clone(),
            Color::WHITE.with_alpha(alpha),
        ));
    }
}

fn compose_pins<'a>(
    ctx: &FrameContext<'_>,
    pins: Box<dyn Iterator<Item = &'a PinData> + 'a>,
    opacities: &mut OpacityCache,
    shouts: &mut ShoutOwnerCache,
    seen: &mut HashSet<PinId>,
    out: &mut CompassDrawList,
) {
    let tuning = &ctx.settings.pins;
    let disappear = ctx.settings.hud.pin_disappear_distance;
    let projection =
        BarProjection::for_class(ctx.bar, tuning.span_degrees, tuning.usable_width_fraction);

    seen.clear();
    for pin in pins {
        seen.insert(pin.id);

        let offset = pin.position - ctx.observer_position;
        let distance = offset.length();
        if distance >= disappear {
            continue;
        }
        if shouts.is_local_shout(pin, ctx.local_player_id, ctx.observer_position) {
            continue;
        }

        let bearing = bearing_degrees(offset.x, offset.z);
        let Some(item) = projection.project(ctx.heading, bearing) else {
            continue;
        };

        let mut scale = distance_scale(distance, tuning);
        if pin.kind().pulses() {
            scale *= pulse_scale(ctx.elapsed_seconds, tuning);
        }

        let target = distance_fade(distance, disappear, tuning.fade_start_fraction)
            * edge_fade(
                item.offset_degrees,
                projection.half_span(),
                tuning.edge_fade_inner_fraction,
            )
            * ctx.global_alpha;
        let alpha = opacities.smooth(
            pin.id,
            target,
            ctx.settings.smoothing.opacity_hz,
            ctx.delta_seconds,
        );
        if alpha <= MIN_VISIBLE_ALPHA {
            continue;
        }

        let size = tuning.base_icon_height * scale;
        out.push(DrawCommand::full_texture(
            centered_rect(item.x, ctx.bar, size, size),
            pin.icon.clone(),
            Color::WHITE.with_alpha(alpha),
        ));
    }
}

/// Derives the bar rectangle from the window on the first frame one exists.
/// Never re-runs its math afterwards; resizing the window mid-session does
/// not move the bar.
pub fn establish_bar_geometry(
    settings: Res<CompassSettings>,
    mut geometry: ResMut<BarGeometry>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    if geometry.is_ready() {
        return;
    }
    let Ok(window) = windows.single() else {
        return;
    };
    geometry.establish(window.resolution.width(), &settings.bar);
    if let Some(rect) = geometry.rect() {
        info!(
            "Compass bar geometry established: {:.0}x{:.0} at ({:.0}, {:.0})",
            rect.width(),
            rect.height(),
            rect.min.x,
            rect.min.y
        );
    }
}

pub fn advance_global_fade(
    settings: Res<CompassSettings>,
    occlusion: Res<UiOcclusion>,
    time: Res<Time>,
    mut fade: ResMut<GlobalFade>,
    observers: Query<(), With<CompassObserver>>,
) {
    if !settings.hud.enabled || observers.is_empty() {
        return;
    }
    fade.advance(
        occlusion.any_blocking(),
        settings.smoothing.global_fade_rate,
        time.delta_secs(),
    );
}

pub fn smooth_display_heading(
    settings: Res<CompassSettings>,
    time: Res<Time>,
    mut heading: ResMut<DisplayHeading>,
    observers: Query<&Transform, With<CompassObserver>>,
) {
    let Ok(transform) = observers.single() else {
        return;
    };
    let forward = transform.forward().as_vec3();
    let target = bearing_degrees(forward.x, forward.z);
    heading.advance(target, settings.smoothing.heading_rate, time.delta_secs());
}

#[allow(clippy::too_many_arguments)]
pub fn compose_compass(
    settings: Res<CompassSettings>,
    geometry: Res<BarGeometry>,
    fade: Res<GlobalFade>,
    heading: Res<DisplayHeading>,
    icons: Res<CompassIcons>,
    store: Res<MinimapStore>,
    time: Res<Time>,
    mut locator: ResMut<PinLocator>,
    mut opacities: ResMut<OpacityCache>,
    mut shouts: ResMut<ShoutOwnerCache>,
    mut seen: ResMut<SeenPins>,
    mut draw_list: ResMut<CompassDrawList>,
    observers: Query<(&Transform, &CompassObserver)>,
) {
    if !settings.hud.enabled {
        draw_list.clear();
        return;
    }
    let Some(bar) = geometry.rect() else {
        draw_list.clear();
        return;
    };
    let Ok((transform, observer)) = observers.single() else {
        draw_list.clear();
        return;
    };
    if fade.is_hidden() {
        draw_list.clear();
        return;
    }

    let ctx = FrameContext {
        settings: &settings,
        bar,
        heading: heading.degrees(),
        global_alpha: fade.alpha(),
        elapsed_seconds: time.elapsed_secs(),
        delta_seconds: time.delta_secs(),
        observer_position: transform.translation,
        local_player_id: observer.player_id,
    };
    let pins = locator.try_get_pins(&store, true);
    compose_frame(
        &ctx,
        &icons,
        pins,
        &mut opacities,
        &mut shouts,
        &mut seen.ids,
        &mut draw_list,
    );
}

/// Sweeps stale per-pin cache entries. Runs its check every frame but only
/// prunes once per interval, so a pin vanishing from the provider costs at
/// most one sweep's worth of stale memory.
pub fn prune_pin_caches(
    mut clock: ResMut<PruneClock>,
    seen: Res<SeenPins>,
    mut opacities: ResMut<OpacityCache>,
    mut shouts: ResMut<ShoutOwnerCache>,
) {
    clock.frames += 1;
    if clock.frames < PRUNE_INTERVAL_FRAMES {
        return;
    }
    clock.frames = 0;
    opacities.retain_live(&seen.ids);
    shouts.retain_live(&seen.ids);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compass::config::CompassSettings;

    const DT: f32 = 0.016;

    fn settings() -> CompassSettings {
        CompassSettings::default()
    }

    fn test_bar() -> Rect {
        Rect::new(400.0, 40.0, 880.0, 100.0)
    }

    fn context<'a>(settings: &'a CompassSettings) -> FrameContext<'a> {
        FrameContext {
            settings,
            bar: test_bar(),
            heading: 0.0,
            global_alpha: 1.0,
            elapsed_seconds: 0.0,
            delta_seconds: DT,
            observer_position: Vec3::ZERO,
            local_player_id: 1,
        }
    }

    fn pin(id: u64, position: Vec3, icon_name: &str, owner: Option<u64>) -> PinData {
        PinData {
            id: PinId::new(id),
            position,
            icon: Handle::default(),
            icon_name: icon_name.into(),
            owner,
        }
    }

    fn compose(
        ctx: &FrameContext<'_>,
        pins: &[PinData],
        opacities: &mut OpacityCache,
        shouts: &mut ShoutOwnerCache,
        seen: &mut HashSet<PinId>,
    ) -> CompassDrawList {
        let mut out = CompassDrawList::default();
        compose_frame(
            ctx,
            &CompassIcons::default(),
            Some(Box::new(pins.iter())),
            opacities,
            shouts,
            seen,
            &mut out,
        );
        out
    }

    #[test]
    fn global_fade_approaches_one_without_overshoot() {
        let settings = settings();
        let mut fade = GlobalFade::default();

        // Blocking UI open: stays hidden.
        fade.advance(true, settings.smoothing.global_fade_rate, DT);
        fade.advance(true, settings.smoothing.global_fade_rate, DT);
        assert!(fade.is_hidden());

        // UI closes: monotone rise, never negative, never above 1.
        let mut previous = fade.alpha();
        for _ in 0..600 {
            fade.advance(false, settings.smoothing.global_fade_rate, DT);
            let alpha = fade.alpha();
            assert!(alpha >= previous - 1e-6);
            assert!((0.0..=1.0).contains(&alpha));
            previous = alpha;
        }
        assert!(fade.alpha() > 0.99);
    }

    #[test]
    fn world_entered_latch_holds_fade_down_before_first_clear_frame() {
        let settings = settings();
        let mut fade = GlobalFade::default();
        for _ in 0..100 {
            fade.advance(true, settings.smoothing.global_fade_rate, DT);
        }
        assert_eq!(fade.alpha(), 0.0);
        assert!(fade.is_hidden());
    }

    #[test]
    fn due_north_pin_lands_at_bar_center() {
        let settings = settings();
        let ctx = context(&settings);
        let pins = [pin(1, Vec3::new(0.0, 0.0, 100.0), "house", None)];
        let list = compose(
            &ctx,
            &pins,
            &mut OpacityCache::default(),
            &mut ShoutOwnerCache::default(),
            &mut HashSet::new(),
        );

        // Shadow, bar, the north cardinal, and the pin.
        assert_eq!(list.len(), 4);
        let pin_rect = list.commands().last().unwrap().rect;
        let mid_x = 640.0;
        assert!((pin_rect.center().x - mid_x).abs() < 1e-2);
    }

    #[test]
    fn pin_beyond_half_span_is_excluded() {
        let settings = settings();
        let ctx = context(&settings);
        // Due east while facing north: 90 degrees off, half span 45.
        let pins = [pin(1, Vec3::new(100.0, 0.0, 0.0), "house", None)];
        let list = compose(
            &ctx,
            &pins,
            &mut OpacityCache::default(),
            &mut ShoutOwnerCache::default(),
            &mut HashSet::new(),
        );
        // Only shadow, bar, and the north cardinal remain.
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn pin_at_or_beyond_disappear_distance_is_excluded() {
        let settings = settings();
        let ctx = context(&settings);
        let disappear = settings.hud.pin_disappear_distance;
        let pins = [pin(1, Vec3::new(0.0, 0.0, disappear), "house", None)];
        let list = compose(
            &ctx,
            &pins,
            &mut OpacityCache::default(),
            &mut ShoutOwnerCache::default(),
            &mut HashSet::new(),
        );
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn own_shout_is_suppressed_but_foreign_shout_draws() {
        let settings = settings();
        let ctx = context(&settings);
        let pins = [
            pin(1, Vec3::new(0.0, 0.0, 50.0), "shout", Some(1)),
            pin(2, Vec3::new(5.0, 0.0, 50.0), "shout", Some(99)),
        ];
        let mut shouts = ShoutOwnerCache::default();
        let list = compose(
            &ctx,
            &pins,
            &mut OpacityCache::default(),
            &mut shouts,
            &mut HashSet::new(),
        );
        // Shadow, bar, north cardinal, and only the foreign shout.
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn ownerless_shout_near_observer_is_classified_once_by_proximity() {
        let settings = settings();
        let mut ctx = context(&settings);
        let near_shout = pin(1, Vec3::new(0.0, 0.0, 2.0), "shout", None);
        let mut shouts = ShoutOwnerCache::default();
        assert!(shouts.is_local_shout(&near_shout, 1, ctx.observer_position));

        // The verdict sticks even after the observer walks away.
        ctx.observer_position = Vec3::new(0.0, 0.0, -200.0);
        assert!(shouts.is_local_shout(&near_shout, 1, ctx.observer_position));
        assert_eq!(shouts.len(), 1);
    }

    #[test]
    fn draw_order_is_shadow_bar_cardinals_pins() {
        let settings = settings();
        let ctx = context(&settings);
        let pins = [pin(1, Vec3::new(0.0, 0.0, 100.0), "house", None)];
        let list = compose(
            &ctx,
            &pins,
            &mut OpacityCache::default(),
            &mut ShoutOwnerCache::default(),
            &mut HashSet::new(),
        );

        let commands = list.commands();
        // Shadow first (black), then the bar at full width, then icons.
        assert!(commands[0].color.alpha() < 1.0);
        assert!((commands[0].rect.min.x - (ctx.bar.min.x + SHADOW_OFFSET)).abs() < 1e-3);
        assert_eq!(commands[1].rect, ctx.bar);
        assert!(commands[2].rect.width() < ctx.bar.width());
    }

    #[test]
    fn pin_opacity_rises_over_consecutive_frames() {
        let settings = settings();
        let ctx = context(&settings);
        let pins = [pin(1, Vec3::new(0.0, 0.0, 100.0), "house", None)];
        let mut opacities = OpacityCache::default();
        let mut shouts = ShoutOwnerCache::default();
        let mut seen = HashSet::new();

        let first = compose(&ctx, &pins, &mut opacities, &mut shouts, &mut seen);
        let first_alpha = first.commands().last().unwrap().color.alpha();
        let second = compose(&ctx, &pins, &mut opacities, &mut shouts, &mut seen);
        let second_alpha = second.commands().last().unwrap().color.alpha();

        assert!(first_alpha > 0.0);
        assert!(second_alpha > first_alpha);
        assert!(second_alpha <= 1.0);
    }

    #[test]
    fn pulsing_pin_size_follows_the_clock() {
        let settings = settings();
        let mut ctx = context(&settings);
        let pins = [pin(1, Vec3::new(0.0, 0.0, 100.0), "mapicon_ping", None)];

        // Pulse peak at elapsed = (pi/2) / speed.
        ctx.elapsed_seconds = std::f32::consts::FRAC_PI_2 / settings.pins.pulse_speed;
        let at_peak = compose(
            &ctx,
            &pins,
            &mut OpacityCache::default(),
            &mut ShoutOwnerCache::default(),
            &mut HashSet::new(),
        );
        ctx.elapsed_seconds = 0.0;
        let at_zero = compose(
            &ctx,
            &pins,
            &mut OpacityCache::default(),
            &mut ShoutOwnerCache::default(),
            &mut HashSet::new(),
        );

        let peak_height = at_peak.commands().last().unwrap().rect.height();
        let base_height = at_zero.commands().last().unwrap().rect.height();
        assert!(peak_height > base_height);
    }

    #[test]
    fn prune_clock_sweeps_on_its_interval_only() {
        let mut opacities = OpacityCache::default();
        let mut shouts = ShoutOwnerCache::default();
        opacities.smooth(PinId::new(9), 1.0, 8.0, DT);
        shouts.entries.insert(PinId::new(9), false);

        let seen = SeenPins::default();
        let mut clock = PruneClock::default();
        for frame in 0..PRUNE_INTERVAL_FRAMES {
            // Emulate the system body without an App.
            clock.frames += 1;
            if clock.frames >= PRUNE_INTERVAL_FRAMES {
                clock.frames = 0;
                opacities.retain_live(&seen.ids);
                shouts.retain_live(&seen.ids);
            }
            if frame < PRUNE_INTERVAL_FRAMES - 1 {
                assert_eq!(opacities.len(), 1, "swept too early at frame {frame}");
            }
        }
        assert!(opacities.is_empty());
        assert!(shouts.is_empty());
    }

    #[test]
    fn seen_set_reflects_every_enumerated_pin() {
        let settings = settings();
        let ctx = context(&settings);
        let pins = [
            pin(1, Vec3::new(0.0, 0.0, 100.0), "house", None),
            // Excluded by distance, still part of the provider's set.
            pin(2, Vec3::new(0.0, 0.0, 9000.0), "house", None),
            // Excluded by angle, still part of the provider's set.
            pin(3, Vec3::new(100.0, 0.0, 0.0), "house", None),
        ];
        let mut seen = HashSet::new();
        compose(
            &ctx,
            &pins,
            &mut OpacityCache::default(),
            &mut ShoutOwnerCache::default(),
            &mut seen,
        );
        assert_eq!(seen.len(), 3);
    }
}
