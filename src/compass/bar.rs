//! Compass bar geometry and the bearing-to-pixel projection.
//!
//! The bar rectangle is derived from the window once, on the first frame a
//! window exists, and is never recomputed afterwards. Resizing the window
//! mid-session leaves the bar where it was; that is a known limitation, not
//! something the projection tries to compensate for.

use bevy::prelude::*;

use crate::compass::angle::shortest_delta;
use crate::compass::config::BarLayout;

/// Screen rectangle of the compass bar, in UI pixels (origin top-left).
///
/// `None` until the first successful initialization pass; the whole overlay
/// draws nothing while the geometry is unestablished.
#[derive(Resource, Debug, Default)]
pub struct BarGeometry {
    rect: Option<Rect>,
}

impl BarGeometry {
    pub fn rect(&self) -> Option<Rect> {
        self.rect
    }

    pub fn is_ready(&self) -> bool {
        self.rect.is_some()
    }

    /// Establishes the bar rectangle from the window width. Later calls are
    /// ignored; the geometry is fixed for the rest of the session.
    pub fn establish(&mut self, window_width: f32, layout: &BarLayout) {
        if self.rect.is_some() {
            return;
        }
        let width = window_width * layout.width_fraction;
        let height = width / layout.aspect_ratio;
        let x = (window_width - width) / 2.0;
        let y = layout.top_margin;
        self.rect = Some(Rect::new(x, y, x + width, y + height));
    }

    /// Clears the geometry. Only used on overlay teardown.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn reset(&mut self) {
        self.rect = None;
    }
}

/// Linear angular-to-pixel mapping for one item class (cardinals or pins).
///
/// Equal angular offsets always map to equal pixel offsets; distance affects
/// scale and opacity elsewhere, never the horizontal position.
#[derive(Debug, Clone, Copy)]
pub struct BarProjection {
    mid_x: f32,
    pixels_per_degree: f32,
    half_span: f32,
}

/// A pin or cardinal successfully placed on the bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedItem {
    /// Horizontal pixel coordinate of the item's center.
    pub x: f32,
    /// Signed angular offset from the display heading, in `(-180, 180]`.
    pub offset_degrees: f32,
}

impl BarProjection {
    /// Builds the mapping for a class from the bar rectangle, the class's
    /// visible span, and the fraction of the bar width it may occupy.
    pub fn for_class(bar: Rect, span_degrees: f32, usable_width_fraction: f32) -> Self {
        let usable_width = bar.width() * usable_width_fraction;
        Self {
            mid_x: bar.min.x + bar.width() / 2.0,
            pixels_per_degree: usable_width / span_degrees,
            half_span: span_degrees / 2.0,
        }
    }

    pub fn half_span(&self) -> f32 {
        self.half_span
    }

    /// Maps a bearing onto the bar. Returns `None` when the angular offset
    /// from `heading` exceeds half the visible span (the item is off-bar this
    /// frame and must not be drawn).
    pub fn project(&self, heading: f32, bearing: f32) -> Option<ProjectedItem> {
        let offset = shortest_delta(heading, bearing);
        if offset.abs() > self.half_span {
            return None;
        }
        Some(ProjectedItem {
            x: self.mid_x + offset * self.pixels_per_degree,
            offset_degrees: offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compass::angle::bearing_degrees;
    use crate::compass::config::BarLayout;

    const EPSILON: f32 = 1e-3;

    fn test_bar() -> Rect {
        Rect::new(400.0, 40.0, 400.0 + 480.0, 40.0 + 60.0)
    }

    #[test]
    fn geometry_is_established_once() {
        let layout = BarLayout {
            width_fraction: 0.32,
            aspect_ratio: 7.0,
            top_margin: 40.0,
        };
        let mut geometry = BarGeometry::default();
        assert!(!geometry.is_ready());

        geometry.establish(1000.0, &layout);
        let first = geometry.rect().unwrap();
        assert!((first.width() - 320.0).abs() < EPSILON);
        assert!((first.min.x - 340.0).abs() < EPSILON);
        assert!((first.min.y - 40.0).abs() < EPSILON);

        // A resize after the fact does not move the bar.
        geometry.establish(2000.0, &layout);
        assert_eq!(geometry.rect().unwrap(), first);
    }

    #[test]
    fn due_north_target_lands_at_bar_center() {
        let projection = BarProjection::for_class(test_bar(), 90.0, 1.0);
        let bearing = bearing_degrees(0.0, 100.0);
        let item = projection.project(0.0, bearing).unwrap();
        assert!((item.x - 640.0).abs() < EPSILON);
        assert!(item.offset_degrees.abs() < EPSILON);
    }

    #[test]
    fn target_beyond_half_span_is_excluded() {
        let projection = BarProjection::for_class(test_bar(), 90.0, 1.0);
        // Due east while facing north: 90 degrees off, half span is 45.
        let bearing = bearing_degrees(100.0, 0.0);
        assert!(projection.project(0.0, bearing).is_none());
    }

    #[test]
    fn mapping_is_linear_in_the_offset() {
        let projection = BarProjection::for_class(test_bar(), 90.0, 1.0);
        let center = projection.project(0.0, 0.0).unwrap().x;
        let at_ten = projection.project(0.0, 10.0).unwrap().x;
        let at_twenty = projection.project(0.0, 20.0).unwrap().x;
        assert!(((at_twenty - at_ten) - (at_ten - center)).abs() < EPSILON);
        // 480 px over 90 degrees.
        assert!(((at_ten - center) - 10.0 * 480.0 / 90.0).abs() < EPSILON);
    }

    #[test]
    fn usable_width_fraction_narrows_the_mapping() {
        let full = BarProjection::for_class(test_bar(), 90.0, 1.0);
        let narrowed = BarProjection::for_class(test_bar(), 90.0, 1.0 / 1.1);
        let full_x = full.project(0.0, 30.0).unwrap().x;
        let narrow_x = narrowed.project(0.0, 30.0).unwrap().x;
        assert!(narrow_x < full_x);
        // Same visibility cutoff regardless of usable width.
        assert!(narrowed.project(0.0, 44.9).is_some());
        assert!(narrowed.project(0.0, 45.1).is_none());
    }

    #[test]
    fn projection_is_pure() {
        let projection = BarProjection::for_class(test_bar(), 90.0, 1.0);
        let first = projection.project(17.0, 40.0).unwrap();
        let second = projection.project(17.0, 40.0).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn negative_offsets_map_left_of_center() {
        let projection = BarProjection::for_class(test_bar(), 90.0, 1.0);
        let item = projection.project(0.0, 350.0).unwrap();
        assert!((item.offset_degrees + 10.0).abs() < EPSILON);
        assert!(item.x < 640.0);
    }
}
