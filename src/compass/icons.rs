//! Bar and cardinal icon handles, with locale-dependent east/west naming.
//!
//! Portuguese installs label east/west as L/O instead of E/W, so the east and
//! west icons resolve through a prioritized filename chain that falls back to
//! the other convention when the preferred file is missing. The locale has no
//! change notification, so it is re-checked on a 2 second timer.

use std::path::Path;

use bevy::prelude::*;

const ASSET_DIR: &str = "assets/compass";
const LOCALE_CHECK_SECONDS: f32 = 2.0;

/// Language convention for the east/west cardinal letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardinalLocale {
    /// N / E / S / W
    EnglishLike,
    /// N / L / S / O
    Portuguese,
}

impl CardinalLocale {
    /// Reads the locale from the environment; Unity's saved language
    /// preference has no analog here.
    pub fn detect() -> Self {
        let lang = std::env::var("LC_ALL")
            .or_else(|_| std::env::var("LANG"))
            .unwrap_or_default()
            .to_ascii_lowercase();
        if lang.starts_with("pt") || lang.contains("portugu") {
            Self::Portuguese
        } else {
            Self::EnglishLike
        }
    }
}

/// Icon filename candidates for one cardinal, preferred name first.
pub fn east_candidates(locale: CardinalLocale) -> [&'static str; 2] {
    match locale {
        CardinalLocale::Portuguese => ["PinL.png", "PinE.png"],
        CardinalLocale::EnglishLike => ["PinE.png", "PinL.png"],
    }
}

pub fn west_candidates(locale: CardinalLocale) -> [&'static str; 2] {
    match locale {
        CardinalLocale::Portuguese => ["PinO.png", "PinW.png"],
        CardinalLocale::EnglishLike => ["PinW.png", "PinO.png"],
    }
}

/// Texture handles used by the compositor. North and south never change;
/// east/west are swapped by the locale re-check.
#[derive(Resource, Debug, Default)]
pub struct CompassIcons {
    pub bar: Handle<Image>,
    pub north: Handle<Image>,
    pub east: Handle<Image>,
    pub south: Handle<Image>,
    pub west: Handle<Image>,
}

/// Timer and last-seen locale for the periodic re-check.
#[derive(Resource, Debug)]
pub struct LocaleCheck {
    timer: Timer,
    last: CardinalLocale,
}

/// Loads the first candidate that exists on disk; when none do, loads the
/// preferred name anyway (the presenter simply has nothing to draw for it)
/// and warns once at resolution time.
fn resolve_icon(asset_server: &AssetServer, candidates: &[&str]) -> Handle<Image> {
    for name in candidates {
        if Path::new(ASSET_DIR).join(name).exists() {
            return asset_server.load(format!("compass/{name}"));
        }
    }
    warn!(
        "No icon found for any of {:?} under {}; using '{}' regardless.",
        candidates, ASSET_DIR, candidates[0]
    );
    asset_server.load(format!("compass/{}", candidates[0]))
}

pub fn load_compass_icons(mut commands: Commands, asset_server: Res<AssetServer>) {
    let locale = CardinalLocale::detect();
    commands.insert_resource(CompassIcons {
        bar: asset_server.load("compass/bar.png"),
        north: resolve_icon(&asset_server, &["PinN.png"]),
        east: resolve_icon(&asset_server, &east_candidates(locale)),
        south: resolve_icon(&asset_server, &["PinS.png"]),
        west: resolve_icon(&asset_server, &west_candidates(locale)),
    });
    commands.insert_resource(LocaleCheck {
        timer: Timer::from_seconds(LOCALE_CHECK_SECONDS, TimerMode::Repeating),
        last: locale,
    });
    info!("Compass icons loaded (locale {:?}).", locale);
}

/// Re-resolves the east/west icons when the locale changes between checks.
pub fn recheck_cardinal_locale(
    time: Res<Time>,
    asset_server: Res<AssetServer>,
    mut check: ResMut<LocaleCheck>,
    mut icons: ResMut<CompassIcons>,
) {
    if !check.timer.tick(time.delta()).just_finished() {
        return;
    }
    let locale = CardinalLocale::detect();
    if locale == check.last {
        return;
    }
    check.last = locale;
    icons.east = resolve_icon(&asset_server, &east_candidates(locale));
    icons.west = resolve_icon(&asset_server, &west_candidates(locale));
    info!("Cardinal icons reloaded for locale {:?}.", locale);
}
