//! Visual decay: distance scale curve, distance fade, edge fade, and the
//! periodic pulse applied to ping/shout pins.
//!
//! Each contribution is computed independently and multiplied into a single
//! composite opacity. An item whose composite falls at or below
//! [`MIN_VISIBLE_ALPHA`] is skipped outright rather than drawn at alpha zero.

use crate::compass::config::{CardinalTuning, PinTuning};

/// Composite opacities at or below this value are not drawn at all.
pub const MIN_VISIBLE_ALPHA: f32 = 0.01;

/// Normalized position of `value` between `from` and `to`, clamped to `[0, 1]`.
/// `from > to` reverses the ramp, matching how the fade formulas use it.
pub fn inverse_lerp(from: f32, to: f32, value: f32) -> f32 {
    if from == to {
        return 0.0;
    }
    ((value - from) / (to - from)).clamp(0.0, 1.0)
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Distance-based icon scale: `max_scale` at the near threshold, shrinking
/// linearly to `min_scale` at the far threshold. Beyond the far threshold the
/// scale clamps at the minimum; items never vanish from the scale curve alone.
pub fn distance_scale(distance: f32, tuning: &PinTuning) -> f32 {
    let t = inverse_lerp(tuning.scale_near_distance, tuning.scale_far_distance, distance);
    lerp(tuning.max_scale, tuning.min_scale, t)
}

/// Distance-based opacity: 1 up to `disappear_distance * fade_start_fraction`,
/// then linear to 0 at `disappear_distance`. Callers exclude items at or
/// beyond the disappear distance before drawing anything.
pub fn distance_fade(distance: f32, disappear_distance: f32, fade_start_fraction: f32) -> f32 {
    let fade_start = disappear_distance * fade_start_fraction;
    1.0 - inverse_lerp(fade_start, disappear_distance, distance)
}

/// Opacity falloff toward the bar edges: 1 inside `half_span * inner_fraction`
/// of the center, linear to 0 at the half-span boundary.
pub fn edge_fade(offset_degrees: f32, half_span: f32, inner_fraction: f32) -> f32 {
    inverse_lerp(half_span, half_span * inner_fraction, offset_degrees.abs())
}

/// Mild size taper for cardinal letters: slightly enlarged at bar center,
/// slightly shrunk at the edges. Cardinals have no distance, so this replaces
/// the distance scale curve for them.
pub fn cardinal_scale(offset_degrees: f32, half_span: f32, tuning: &CardinalTuning) -> f32 {
    let t = (offset_degrees.abs() / half_span).clamp(0.0, 1.0);
    lerp(tuning.center_scale, tuning.edge_scale, t)
}

/// Multiplicative pulse for ping and shout pins, driven by clock seconds so
/// the pulsation rate is independent of frame rate.
pub fn pulse_scale(elapsed_seconds: f32, tuning: &PinTuning) -> f32 {
    1.0 + tuning.pulse_amplitude * (elapsed_seconds * tuning.pulse_speed).sin()
}
