//! Temporal smoothing for the display heading and per-pin opacities.
//!
//! The heading uses a proportional shortest-arc approach (`rate * dt` per
//! frame), which is visually adequate rather than physically exact. Pin
//! opacities use a true frame-rate-independent exponential low-pass so a pin
//! appearing or disappearing from the provider's result set never pops.

use std::collections::{HashMap, HashSet};

use bevy::prelude::*;

use crate::compass::angle::{lerp_angle, normalize_degrees};
use crate::compass::fade::lerp;
use crate::minimap::store::PinId;

/// Fraction of the remaining gap covered by an exponential low-pass over one
/// step of `delta_seconds` at the given smoothing frequency.
pub fn exponential_step(hz: f32, delta_seconds: f32) -> f32 {
    1.0 - (-hz * delta_seconds).exp()
}

/// The smoothed heading shown on the bar. Lives for the whole session; only
/// overlay teardown resets it.
#[derive(Resource, Debug, Default)]
pub struct DisplayHeading {
    degrees: f32,
    initialized: bool,
}

impl DisplayHeading {
    pub fn degrees(&self) -> f32 {
        self.degrees
    }

    /// Moves the display heading toward the observer's raw heading. The first
    /// sighting of an observer snaps instead of sweeping in from 0.
    pub fn advance(&mut self, target_degrees: f32, rate: f32, delta_seconds: f32) {
        if !self.initialized {
            self.degrees = normalize_degrees(target_degrees);
            self.initialized = true;
            return;
        }
        let t = (rate * delta_seconds).min(1.0);
        self.degrees = lerp_angle(self.degrees, target_degrees, t);
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn reset(&mut self) {
        self.degrees = 0.0;
        self.initialized = false;
    }
}

/// Last smoothed opacity per pin identity. Entries are created lazily on the
/// first sighting of a pin and removed by the periodic prune sweep once the
/// pin stops appearing in the provider's result set.
#[derive(Resource, Debug, Default)]
pub struct OpacityCache {
    entries: HashMap<PinId, f32>,
}

impl OpacityCache {
    /// Low-passes the stored opacity for `id` toward `target` and returns the
    /// smoothed value. A pin seen for the first time starts from 0 and fades
    /// in rather than snapping to the target.
    pub fn smooth(&mut self, id: PinId, target: f32, hz: f32, delta_seconds: f32) -> f32 {
        let entry = self.entries.entry(id).or_insert(0.0);
        *entry = lerp(*entry, target, exponential_step(hz, delta_seconds));
        *entry
    }

    /// Drops entries whose pin identity is not in `live`. Called from the
    /// periodic sweep, not per frame.
    pub fn retain_live(&mut self, live: &HashSet<PinId>) {
        self.entries.retain(|id, _| live.contains(id));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
