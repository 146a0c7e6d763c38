//! Contracts the compass consumes from its host: the observer marker and the
//! UI-occlusion oracle. The host attaches/maintains these; the compass only
//! reads them.

use bevy::prelude::*;

/// Marks the entity whose position and yaw drive the compass. When no entity
/// carries this marker, the overlay does no work for the frame.
#[derive(Component, Debug)]
pub struct CompassObserver {
    /// Identity of the local player, used to suppress their own shout pins.
    pub player_id: u64,
}

/// Blocking-UI state maintained by the host. Any flag being set drives the
/// global fade toward hidden.
#[derive(Resource, Debug, Default)]
pub struct UiOcclusion {
    pub inventory_open: bool,
    pub big_map_open: bool,
    pub modal_open: bool,
    pub text_input_focused: bool,
}

impl UiOcclusion {
    pub fn any_blocking(&self) -> bool {
        self.inventory_open || self.big_map_open || self.modal_open || self.text_input_focused
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_single_flag_blocks() {
        assert!(!UiOcclusion::default().any_blocking());
        for index in 0..4 {
            let mut occlusion = UiOcclusion::default();
            match index {
                0 => occlusion.inventory_open = true,
                1 => occlusion.big_map_open = true,
                2 => occlusion.modal_open = true,
                _ => occlusion.text_input_focused = true,
            }
            assert!(occlusion.any_blocking());
        }
    }
}
