//! Pin storage for the minimap subsystem.
//!
//! The store's internal layout has shifted across map-data generations: the
//! current generation keeps a flat pin list, an older one kept a separate
//! "legacy" list, and one intermediate build grouped pins by layer name. A
//! deployment populates exactly one of the containers; readers go through the
//! compass locator's ranked strategies rather than assuming a layout.

use std::collections::HashMap;

use bevy::prelude::*;

/// Stable identity for one logical pin across frames. Used as the cache key
/// for opacity smoothing and shout-owner classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PinId(u64);

impl PinId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Icon category, derived from the icon's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinKind {
    /// Map ping; pulses on the bar like it does on the minimap.
    Ping,
    /// Shout/exclamation marker; pulses, and the local player's own shouts
    /// are suppressed entirely.
    Shout,
    Plain,
}

impl PinKind {
    pub fn classify(icon_name: &str) -> Self {
        let name = icon_name.to_ascii_lowercase();
        if name.contains("ping") {
            Self::Ping
        } else if name.contains("shout") || name.contains("exclam") {
            Self::Shout
        } else {
            Self::Plain
        }
    }

    pub fn pulses(self) -> bool {
        matches!(self, Self::Ping | Self::Shout)
    }
}

/// One point of interest owned by the minimap subsystem. The compass never
/// mutates pins; it only reads them and keeps per-id auxiliary state.
#[derive(Debug, Clone)]
pub struct PinData {
    pub id: PinId,
    pub position: Vec3,
    pub icon: Handle<Image>,
    pub icon_name: String,
    /// Player id of whoever placed the pin, when the map data carries it.
    pub owner: Option<u64>,
}

impl PinData {
    pub fn kind(&self) -> PinKind {
        PinKind::classify(&self.icon_name)
    }
}

/// The minimap's pin storage. Exactly one container is populated per
/// deployment; see the module docs.
#[derive(Resource, Debug, Default)]
pub struct MinimapStore {
    pins: Option<Vec<PinData>>,
    legacy_pins: Option<Vec<PinData>>,
    grouped_pins: Option<HashMap<String, Vec<PinData>>>,
}

impl MinimapStore {
    /// Store backed by the current-generation flat list.
    pub fn current_generation() -> Self {
        Self {
            pins: Some(Vec::new()),
            ..Self::default()
        }
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn legacy_generation() -> Self {
        Self {
            legacy_pins: Some(Vec::new()),
            ..Self::default()
        }
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn grouped_generation() -> Self {
        Self {
            grouped_pins: Some(HashMap::new()),
            ..Self::default()
        }
    }

    /// Adds a pin to whichever container this deployment uses. Grouped stores
    /// file pins under their icon name.
    pub fn add(&mut self, pin: PinData) {
        if let Some(pins) = self.pins.as_mut() {
            pins.push(pin);
        } else if let Some(pins) = self.legacy_pins.as_mut() {
            pins.push(pin);
        } else if let Some(groups) = self.grouped_pins.as_mut() {
            groups.entry(pin.icon_name.clone()).or_default().push(pin);
        }
    }

    /// Total pin count across whichever container is populated.
    pub fn len(&self) -> usize {
        self.pins.as_ref().map_or(0, Vec::len)
            + self.legacy_pins.as_ref().map_or(0, Vec::len)
            + self
                .grouped_pins
                .as_ref()
                .map_or(0, |groups| groups.values().map(Vec::len).sum())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn remove(&mut self, id: PinId) {
        if let Some(pins) = self.pins.as_mut() {
            pins.retain(|pin| pin.id != id);
        }
        if let Some(pins) = self.legacy_pins.as_mut() {
            pins.retain(|pin| pin.id != id);
        }
        if let Some(groups) = self.grouped_pins.as_mut() {
            for pins in groups.values_mut() {
                pins.retain(|pin| pin.id != id);
            }
        }
    }

    // Raw container accessors used by the locator's read strategies. Each
    // returns `None` on deployments that never had the container.

    pub(crate) fn current_field(&self) -> Option<&[PinData]> {
        self.pins.as_deref()
    }

    pub(crate) fn legacy_field(&self) -> Option<&[PinData]> {
        self.legacy_pins.as_deref()
    }

    pub(crate) fn grouped_field(&self) -> Option<&HashMap<String, Vec<PinData>>> {
        self.grouped_pins.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_icon_names() {
        assert_eq!(PinKind::classify("mapicon_ping"), PinKind::Ping);
        assert_eq!(PinKind::classify("Shout_01"), PinKind::Shout);
        assert_eq!(PinKind::classify("icon_exclamation"), PinKind::Shout);
        assert_eq!(PinKind::classify("house"), PinKind::Plain);
        assert!(PinKind::Ping.pulses());
        assert!(PinKind::Shout.pulses());
        assert!(!PinKind::Plain.pulses());
    }

    #[test]
    fn add_and_remove_respect_the_populated_container() {
        let pin = PinData {
            id: PinId::new(1),
            position: Vec3::ZERO,
            icon: Handle::default(),
            icon_name: "house".into(),
            owner: None,
        };

        let mut current = MinimapStore::current_generation();
        current.add(pin.clone());
        assert_eq!(current.current_field().unwrap().len(), 1);
        assert!(current.legacy_field().is_none());
        current.remove(PinId::new(1));
        assert!(current.current_field().unwrap().is_empty());

        let mut grouped = MinimapStore::grouped_generation();
        grouped.add(pin);
        assert_eq!(grouped.grouped_field().unwrap()["house"].len(), 1);
    }
}
