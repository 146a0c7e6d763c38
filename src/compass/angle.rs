//! Periodic-angle arithmetic shared by the projection and smoothing code.
//!
//! All angles are degrees. Deltas are normalized to `(-180, 180]` before any
//! positioning or fade math touches them; raw headings in `[0, 360)` are never
//! subtracted directly.

/// Wraps an arbitrary angle into `[0, 360)`.
pub fn normalize_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped == 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Signed minimal rotation from `from` to `to`, in `(-180, 180]`.
///
/// The antipodal case ties toward the positive side:
/// `shortest_delta(0.0, 180.0) == 180.0`.
pub fn shortest_delta(from: f32, to: f32) -> f32 {
    let delta = normalize_degrees(to - from);
    if delta > 180.0 {
        delta - 360.0
    } else {
        delta
    }
}

/// Moves `current` toward `target` along the shortest arc by fraction `t`.
///
/// `t` is clamped to `[0, 1]`; `t = 1` lands on `target` (mod 360). Wrapping
/// across the 0/360 boundary is handled by the delta, so interpolating from
/// 350 toward 10 passes through 0 rather than sweeping backwards.
pub fn lerp_angle(current: f32, target: f32, t: f32) -> f32 {
    let delta = shortest_delta(current, target);
    normalize_degrees(current + delta * t.clamp(0.0, 1.0))
}

/// Bearing, in degrees, of a planar offset `(dx, dz)` measured from the +Z
/// axis with +X at 90 degrees. This is the yaw frame shared by the observer
/// heading and every projected pin.
pub fn bearing_degrees(dx: f32, dz: f32) -> f32 {
    normalize_degrees(dx.atan2(dz).to_degrees())
}
