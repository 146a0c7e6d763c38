//! Compass configuration loaded from `config/compass.toml`.
//!
//! Every tuning constant the overlay uses is a config default here rather
//! than a hard-coded number, so the bar span, fade edges, and scale curve can
//! be re-tuned without touching code.

use std::{fs, path::Path};

use bevy::prelude::*;
use serde::Deserialize;

const CONFIG_PATH: &str = "config/compass.toml";

#[derive(Debug, Clone, Deserialize, Default)]
struct RawCompassConfig {
    #[serde(default)]
    hud: RawHud,
    #[serde(default)]
    bar: RawBar,
    #[serde(default)]
    cardinals: RawCardinals,
    #[serde(default)]
    pins: RawPins,
    #[serde(default)]
    smoothing: RawSmoothing,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawHud {
    enabled: bool,
    hide_small_map: bool,
    pin_disappear_distance: f32,
}

impl Default for RawHud {
    fn default() -> Self {
        Self {
            enabled: true,
            hide_small_map: false,
            pin_disappear_distance: 500.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawBar {
    width_fraction: f32,
    aspect_ratio: f32,
    top_margin: f32,
}

impl Default for RawBar {
    fn default() -> Self {
        Self {
            width_fraction: 0.32,
            aspect_ratio: 7.0,
            top_margin: 40.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawCardinals {
    span_degrees: f32,
    usable_width_fraction: f32,
    edge_fade_inner_fraction: f32,
    icon_size: f32,
    center_scale: f32,
    edge_scale: f32,
}

impl Default for RawCardinals {
    fn default() -> Self {
        Self {
            span_degrees: 90.0,
            usable_width_fraction: 1.0 / 1.1,
            edge_fade_inner_fraction: 0.45,
            icon_size: 48.0,
            center_scale: 1.15,
            edge_scale: 0.90,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawPins {
    span_degrees: f32,
    usable_width_fraction: f32,
    edge_fade_inner_fraction: f32,
    base_icon_height: f32,
    scale_near_distance: f32,
    scale_far_distance: f32,
    min_scale: f32,
    max_scale: f32,
    fade_start_fraction: f32,
    pulse_amplitude: f32,
    pulse_speed: f32,
}

impl Default for RawPins {
    fn default() -> Self {
        Self {
            span_degrees: 90.0,
            usable_width_fraction: 1.0,
            edge_fade_inner_fraction: 0.6,
            base_icon_height: 28.0,
            scale_near_distance: 0.0,
            scale_far_distance: 300.0,
            min_scale: 0.20,
            max_scale: 2.50,
            fade_start_fraction: 0.75,
            pulse_amplitude: 0.15,
            pulse_speed: 6.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawSmoothing {
    heading_rate: f32,
    global_fade_rate: f32,
    opacity_hz: f32,
}

impl Default for RawSmoothing {
    fn default() -> Self {
        Self {
            heading_rate: 2.5,
            global_fade_rate: 2.5,
            opacity_hz: 8.0,
        }
    }
}

/// Runtime compass configuration derived from `config/compass.toml`.
#[derive(Resource, Debug, Clone)]
pub struct CompassSettings {
    pub hud: HudSettings,
    pub bar: BarLayout,
    pub cardinals: CardinalTuning,
    pub pins: PinTuning,
    pub smoothing: SmoothingTuning,
}

#[derive(Debug, Clone)]
pub struct HudSettings {
    /// Master switch for the whole overlay.
    pub enabled: bool,
    /// Pass-through for the minimap module; unrelated to the projection core.
    pub hide_small_map: bool,
    /// Distance at which pin icons fully disappear, in world units.
    pub pin_disappear_distance: f32,
}

#[derive(Debug, Clone)]
pub struct BarLayout {
    pub width_fraction: f32,
    pub aspect_ratio: f32,
    pub top_margin: f32,
}

#[derive(Debug, Clone)]
pub struct CardinalTuning {
    pub span_degrees: f32,
    pub usable_width_fraction: f32,
    pub edge_fade_inner_fraction: f32,
    pub icon_size: f32,
    pub center_scale: f32,
    pub edge_scale: f32,
}

#[derive(Debug, Clone)]
pub struct PinTuning {
    pub span_degrees: f32,
    pub usable_width_fraction: f32,
    pub edge_fade_inner_fraction: f32,
    pub base_icon_height: f32,
    pub scale_near_distance: f32,
    pub scale_far_distance: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    pub fade_start_fraction: f32,
    pub pulse_amplitude: f32,
    pub pulse_speed: f32,
}

#[derive(Debug, Clone)]
pub struct SmoothingTuning {
    pub heading_rate: f32,
    pub global_fade_rate: f32,
    pub opacity_hz: f32,
}

impl CompassSettings {
    pub fn load_or_default() -> Self {
        let path = Path::new(CONFIG_PATH);
        match fs::read_to_string(path) {
            Ok(raw) => match toml::from_str::<RawCompassConfig>(&raw) {
                Ok(parsed) => parsed.into(),
                Err(err) => {
                    warn!(
                        "Failed to parse {} ({}). Falling back to defaults.",
                        CONFIG_PATH, err
                    );
                    RawCompassConfig::default().into()
                }
            },
            Err(err) => {
                warn!(
                    "Failed to read {} ({}). Falling back to defaults.",
                    CONFIG_PATH, err
                );
                RawCompassConfig::default().into()
            }
        }
    }
}

impl Default for CompassSettings {
    fn default() -> Self {
        RawCompassConfig::default().into()
    }
}

impl From<RawCompassConfig> for CompassSettings {
    fn from(value: RawCompassConfig) -> Self {
        let hud = HudSettings {
            enabled: value.hud.enabled,
            hide_small_map: value.hud.hide_small_map,
            pin_disappear_distance: value.hud.pin_disappear_distance.max(1.0),
        };

        let bar = BarLayout {
            width_fraction: value.bar.width_fraction.clamp(0.05, 1.0),
            aspect_ratio: value.bar.aspect_ratio.max(1.0),
            top_margin: value.bar.top_margin.max(0.0),
        };

        let cardinals = CardinalTuning {
            span_degrees: value.cardinals.span_degrees.clamp(10.0, 360.0),
            usable_width_fraction: value.cardinals.usable_width_fraction.clamp(0.1, 1.0),
            edge_fade_inner_fraction: value.cardinals.edge_fade_inner_fraction.clamp(0.0, 0.99),
            icon_size: value.cardinals.icon_size.max(1.0),
            center_scale: value.cardinals.center_scale.max(0.01),
            edge_scale: value.cardinals.edge_scale.max(0.01),
        };

        let min_scale = value.pins.min_scale.max(0.01);
        let pins = PinTuning {
            span_degrees: value.pins.span_degrees.clamp(10.0, 360.0),
            usable_width_fraction: value.pins.usable_width_fraction.clamp(0.1, 1.0),
            edge_fade_inner_fraction: value.pins.edge_fade_inner_fraction.clamp(0.0, 0.99),
            base_icon_height: value.pins.base_icon_height.max(1.0),
            scale_near_distance: value.pins.scale_near_distance.max(0.0),
            scale_far_distance: value
                .pins
                .scale_far_distance
                .max(value.pins.scale_near_distance + 1.0),
            min_scale,
            max_scale: value.pins.max_scale.max(min_scale),
            fade_start_fraction: value.pins.fade_start_fraction.clamp(0.0, 0.99),
            pulse_amplitude: value.pins.pulse_amplitude.clamp(0.0, 1.0),
            pulse_speed: value.pins.pulse_speed.max(0.0),
        };

        let smoothing = SmoothingTuning {
            heading_rate: value.smoothing.heading_rate.max(0.01),
            global_fade_rate: value.smoothing.global_fade_rate.max(0.01),
            opacity_hz: value.smoothing.opacity_hz.max(0.01),
        };

        Self {
            hud,
            bar,
            cardinals,
            pins,
            smoothing,
        }
    }
}
