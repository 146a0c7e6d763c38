//! Resilient pin retrieval from the minimap store.
//!
//! The store's internal layout differs between map-data generations, so the
//! locator tries a ranked list of read strategies exactly once, on the first
//! frame an observer exists, and caches the winner for the rest of the
//! process. If no strategy matches, that outcome is cached too and logged a
//! single time; later frames fail fast instead of re-resolving or re-logging.
//! Reads through the cached strategy are retried every frame.

use bevy::prelude::*;

use crate::minimap::store::{MinimapStore, PinData};

/// One way of reading pins out of a particular store generation.
pub trait PinReadStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// `None` when this deployment's store never had the container this
    /// strategy reads; `Some` (possibly empty) when it does.
    fn read<'a>(
        &self,
        store: &'a MinimapStore,
    ) -> Option<Box<dyn Iterator<Item = &'a PinData> + 'a>>;
}

struct CurrentField;

impl PinReadStrategy for CurrentField {
    fn name(&self) -> &'static str {
        "current"
    }

    fn read<'a>(
        &self,
        store: &'a MinimapStore,
    ) -> Option<Box<dyn Iterator<Item = &'a PinData> + 'a>> {
        store
            .current_field()
            .map(|pins| Box::new(pins.iter()) as Box<dyn Iterator<Item = &'a PinData> + 'a>)
    }
}

struct LegacyField;

impl PinReadStrategy for LegacyField {
    fn name(&self) -> &'static str {
        "legacy"
    }

    fn read<'a>(
        &self,
        store: &'a MinimapStore,
    ) -> Option<Box<dyn Iterator<Item = &'a PinData> + 'a>> {
        store
            .legacy_field()
            .map(|pins| Box::new(pins.iter()) as Box<dyn Iterator<Item = &'a PinData> + 'a>)
    }
}

/// Last resort: walk the grouped table and flatten it.
struct GroupedScan;

impl PinReadStrategy for GroupedScan {
    fn name(&self) -> &'static str {
        "grouped-scan"
    }

    fn read<'a>(
        &self,
        store: &'a MinimapStore,
    ) -> Option<Box<dyn Iterator<Item = &'a PinData> + 'a>> {
        store.grouped_field().map(|groups| {
            Box::new(groups.values().flat_map(|pins| pins.iter()))
                as Box<dyn Iterator<Item = &'a PinData> + 'a>
        })
    }
}

/// Strategies in priority order: the primary accessor first, the structural
/// scan last.
const STRATEGIES: &[&dyn PinReadStrategy] = &[&CurrentField, &LegacyField, &GroupedScan];

/// Locator state: the cached winning strategy and the one-shot logging
/// latches. Owned by the compass plugin, cleared only on teardown.
#[derive(Resource, Debug, Default)]
pub struct PinLocator {
    resolved: Option<usize>,
    resolution_attempted: bool,
    logged_failure: bool,
}

impl PinLocator {
    /// Retrieves the current pin set. Returns `None` when the observer is
    /// absent (no resolution is attempted), when no strategy ever matched, or
    /// when the cached strategy transiently yields nothing.
    pub fn try_get_pins<'a>(
        &mut self,
        store: &'a MinimapStore,
        observer_present: bool,
    ) -> Option<Box<dyn Iterator<Item = &'a PinData> + 'a>> {
        if !observer_present {
            return None;
        }

        if !self.resolution_attempted {
            self.resolution_attempted = true;
            for (index, strategy) in STRATEGIES.iter().enumerate() {
                if strategy.read(store).is_some() {
                    self.resolved = Some(index);
                    info!("Pin storage resolved via '{}' strategy.", strategy.name());
                    break;
                }
            }
        }

        match self.resolved {
            Some(index) => STRATEGIES[index].read(store),
            None => {
                if !self.logged_failure {
                    self.logged_failure = true;
                    warn!("No pin storage strategy matched; compass pins disabled.");
                }
                None
            }
        }
    }

    pub fn resolved_strategy(&self) -> Option<&'static str> {
        self.resolved.map(|index| STRATEGIES[index].name())
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn reset(&mut self) {
        self.resolved = None;
        self.resolution_attempted = false;
        self.logged_failure = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minimap::store::{PinData, PinId};

    fn pin(id: u64) -> PinData {
        PinData {
            id: PinId::new(id),
            position: Vec3::new(id as f32, 0.0, 0.0),
            icon: Handle::default(),
            icon_name: "house".into(),
            owner: None,
        }
    }

    #[test]
    fn resolves_the_primary_strategy_first() {
        let mut store = MinimapStore::current_generation();
        store.add(pin(1));
        let mut locator = PinLocator::default();

        let pins: Vec<_> = locator.try_get_pins(&store, true).unwrap().collect();
        assert_eq!(pins.len(), 1);
        assert_eq!(locator.resolved_strategy(), Some("current"));
    }

    #[test]
    fn falls_back_to_the_legacy_layout() {
        let mut store = MinimapStore::legacy_generation();
        store.add(pin(1));
        store.add(pin(2));
        let mut locator = PinLocator::default();

        let pins: Vec<_> = locator.try_get_pins(&store, true).unwrap().collect();
        assert_eq!(pins.len(), 2);
        assert_eq!(locator.resolved_strategy(), Some("legacy"));
    }

    #[test]
    fn grouped_scan_flattens_all_layers() {
        let mut store = MinimapStore::grouped_generation();
        store.add(pin(1));
        let mut shout = pin(2);
        shout.icon_name = "shout".into();
        store.add(shout);
        let mut locator = PinLocator::default();

        let pins: Vec<_> = locator.try_get_pins(&store, true).unwrap().collect();
        assert_eq!(pins.len(), 2);
        assert_eq!(locator.resolved_strategy(), Some("grouped-scan"));
    }

    #[test]
    fn absent_observer_defers_resolution() {
        let mut store = MinimapStore::current_generation();
        store.add(pin(1));
        let mut locator = PinLocator::default();

        assert!(locator.try_get_pins(&store, false).is_none());
        assert_eq!(locator.resolved_strategy(), None);

        // Resolution still works once the observer shows up.
        assert!(locator.try_get_pins(&store, true).is_some());
        assert_eq!(locator.resolved_strategy(), Some("current"));
    }

    #[test]
    fn total_failure_is_remembered_and_not_reattempted() {
        let store = MinimapStore::default();
        let mut locator = PinLocator::default();

        assert!(locator.try_get_pins(&store, true).is_none());
        assert!(locator.logged_failure);
        assert_eq!(locator.resolved_strategy(), None);

        // A store that would now resolve is ignored: resolution ran once.
        let mut late_store = MinimapStore::current_generation();
        late_store.add(pin(1));
        assert!(locator.try_get_pins(&late_store, true).is_none());
    }

    #[test]
    fn empty_reads_through_a_resolved_strategy_are_transient() {
        let mut store = MinimapStore::current_generation();
        store.add(pin(1));
        let mut locator = PinLocator::default();
        assert!(locator.try_get_pins(&store, true).is_some());

        store.remove(PinId::new(1));
        // Container still exists, so the read succeeds with zero pins.
        let pins: Vec<_> = locator.try_get_pins(&store, true).unwrap().collect();
        assert!(pins.is_empty());
        assert!(!locator.logged_failure);
    }
}
