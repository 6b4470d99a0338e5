//! Monitor topology and coordinate-space mapping.
//!
//! Two coordinate spaces exist and must never be mixed:
//!
//! * **image space** — pixel offsets into the composite screenshot, anchored
//!   at the top-left corner of the capture region;
//! * **screen space** — absolute virtual-desktop coordinates, the ones the OS
//!   understands for clicking and window rectangles. Monitors placed left of
//!   or above the primary make these negative.
//!
//! [`CoordinateMapper`] is the only conversion point between the two; the
//! distinct point/box types make accidental mixing a type error.

use serde::{Deserialize, Serialize};

/// A point in image space (composite-screenshot pixels).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePoint {
    pub x: i32,
    pub y: i32,
}

/// A point in screen space (absolute virtual-desktop coordinates).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

/// An axis-aligned box in image space. Bounds are exclusive when used as a
/// detection region: points on the edge do not count as inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl ImageBox {
    /// Strict interior test (exclusive bounds on every edge).
    pub fn contains_exclusive(&self, p: ImagePoint) -> bool {
        self.left < p.x && p.x < self.right && self.top < p.y && p.y < self.bottom
    }
}

/// An axis-aligned box in screen space, as returned by window queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl ScreenBox {
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Shrinks the box by moving every edge inward. X edges move by a
    /// fraction of the width, y edges by a fraction of the height.
    pub fn shrink_by_fraction(&self, fraction: f64) -> ScreenBox {
        let dx = (self.width() as f64 * fraction) as i32;
        let dy = (self.height() as f64 * fraction) as i32;
        ScreenBox {
            left: self.left + dx,
            top: self.top + dy,
            right: self.right - dx,
            bottom: self.bottom - dy,
        }
    }
}

/// One physical display as enumerated at startup. Origins may be negative for
/// monitors left of / above the primary. Immutable after enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monitor {
    pub origin_x: i32,
    pub origin_y: i32,
    pub width: u32,
    pub height: u32,
}

/// The region of the virtual desktop handed to the capture backend,
/// in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRegion {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

/// Geometry derived once from the monitor set. Recomputed only if the monitor
/// topology changes, which is not expected mid-run.
#[derive(Debug, Clone)]
pub struct VirtualDesktopGeometry {
    monitors: Vec<Monitor>,
    negative_x_offset: i32,
    negative_y_offset: i32,
    /// Monitor with the largest |origin_x|; anchors the composite-height
    /// estimate in multi-monitor layouts.
    reference: Monitor,
}

impl VirtualDesktopGeometry {
    /// Derives the virtual-desktop geometry from an enumerated monitor set.
    /// Monitors are ordered left-to-right by origin. Panics on an empty set;
    /// enumeration failing to find any monitor is a fatal startup condition
    /// handled before this point.
    pub fn new(mut monitors: Vec<Monitor>) -> Self {
        assert!(!monitors.is_empty(), "monitor set must not be empty");
        monitors.sort_by_key(|m| m.origin_x);

        let negative_x_offset = monitors
            .iter()
            .filter(|m| m.origin_x < 0)
            .map(|m| m.origin_x)
            .sum();
        let negative_y_offset = monitors.iter().map(|m| m.origin_y).min().unwrap_or(0);
        let reference = *monitors
            .iter()
            .max_by_key(|m| m.origin_x.unsigned_abs())
            .unwrap();

        tracing::debug!(
            count = monitors.len(),
            negative_x_offset,
            negative_y_offset,
            "derived virtual desktop geometry"
        );

        Self {
            monitors,
            negative_x_offset,
            negative_y_offset,
            reference,
        }
    }

    pub fn monitors(&self) -> &[Monitor] {
        &self.monitors
    }

    pub fn negative_x_offset(&self) -> i32 {
        self.negative_x_offset
    }

    pub fn negative_y_offset(&self) -> i32 {
        self.negative_y_offset
    }

    fn has_negative_displays(&self) -> bool {
        self.monitors.iter().any(|m| m.origin_x < 0)
    }

    /// The screen-space region to capture each tick. Origin is the
    /// top-left-most monitor corner and the width spans all monitors. With a
    /// single monitor the height is that monitor's native height; with
    /// several, the height is estimated from the reference monitor's origin
    /// scaled by the aspect ratio of the leftmost monitor (or the rightmost
    /// one when negative-origin displays exist).
    pub fn capture_region(&self) -> CaptureRegion {
        let left = self.monitors.iter().map(|m| m.origin_x).min().unwrap_or(0);
        let top = self.negative_y_offset;
        let width: u32 = self.monitors.iter().map(|m| m.width).sum();

        let height = if self.monitors.len() > 1 {
            let aspect_source = if self.has_negative_displays() {
                self.monitors.last().unwrap()
            } else {
                self.monitors.first().unwrap()
            };
            let inverse_aspect = aspect_source.height as f64 / aspect_source.width as f64;
            ((self.reference.origin_x as f64 * inverse_aspect) as i64).unsigned_abs() as u32
        } else {
            self.monitors[0].height
        };

        CaptureRegion {
            left,
            top,
            width,
            height,
        }
    }

    pub fn mapper(&self) -> CoordinateMapper {
        CoordinateMapper {
            negative_x_offset: self.negative_x_offset,
            negative_y_offset: self.negative_y_offset,
            single_monitor: self.monitors.len() == 1,
        }
    }
}

/// Pure arithmetic transforms between image space and screen space.
///
/// With a single monitor both directions are the identity. With two or more,
/// image→screen applies both offsets while screen→image corrects x only: the
/// capture anchor is already y-aligned to the topmost monitor. The asymmetry
/// is intentional and load-bearing for single-row layouts; window boxes are
/// mapped corner by corner through the same rule.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateMapper {
    negative_x_offset: i32,
    negative_y_offset: i32,
    single_monitor: bool,
}

impl CoordinateMapper {
    pub fn image_to_screen(&self, p: ImagePoint) -> ScreenPoint {
        if self.single_monitor {
            ScreenPoint { x: p.x, y: p.y }
        } else {
            ScreenPoint {
                x: p.x + self.negative_x_offset,
                y: p.y + self.negative_y_offset,
            }
        }
    }

    pub fn screen_to_image(&self, p: ScreenPoint) -> ImagePoint {
        if self.single_monitor {
            ImagePoint { x: p.x, y: p.y }
        } else {
            ImagePoint {
                x: p.x - self.negative_x_offset,
                y: p.y,
            }
        }
    }

    /// Maps a screen-space box into image space by converting its two corner
    /// points independently.
    pub fn screen_box_to_image(&self, b: ScreenBox) -> ImageBox {
        let top_left = self.screen_to_image(ScreenPoint {
            x: b.left,
            y: b.top,
        });
        let bottom_right = self.screen_to_image(ScreenPoint {
            x: b.right,
            y: b.bottom,
        });
        ImageBox {
            left: top_left.x,
            top: top_left.y,
            right: bottom_right.x,
            bottom: bottom_right.y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor(origin_x: i32, origin_y: i32, width: u32, height: u32) -> Monitor {
        Monitor {
            origin_x,
            origin_y,
            width,
            height,
        }
    }

    fn single() -> VirtualDesktopGeometry {
        VirtualDesktopGeometry::new(vec![monitor(0, 0, 1920, 1080)])
    }

    fn side_by_side() -> VirtualDesktopGeometry {
        VirtualDesktopGeometry::new(vec![
            monitor(0, 0, 1920, 1080),
            monitor(1920, 0, 1920, 1080),
        ])
    }

    fn left_of_primary() -> VirtualDesktopGeometry {
        VirtualDesktopGeometry::new(vec![
            monitor(-1920, 0, 1920, 1080),
            monitor(0, 0, 1920, 1080),
        ])
    }

    #[test]
    fn single_monitor_mapping_is_identity() {
        let mapper = single().mapper();
        let p = ImagePoint { x: 345, y: 678 };
        let s = mapper.image_to_screen(p);
        assert_eq!((s.x, s.y), (345, 678));
        assert_eq!(mapper.screen_to_image(s), p);
    }

    #[test]
    fn negative_offsets_derived_from_left_monitor() {
        let geo = left_of_primary();
        assert_eq!(geo.negative_x_offset(), -1920);
        assert_eq!(geo.negative_y_offset(), 0);
    }

    #[test]
    fn image_point_maps_left_of_origin() {
        let mapper = left_of_primary().mapper();
        let s = mapper.image_to_screen(ImagePoint { x: 100, y: 50 });
        assert_eq!((s.x, s.y), (-1820, 50));
    }

    #[test]
    fn round_trip_holds_on_all_fixtures() {
        for geo in [single(), side_by_side(), left_of_primary()] {
            let mapper = geo.mapper();
            for &(x, y) in &[(0, 0), (1, 1), (512, 384), (1919, 1079), (3000, 700)] {
                let p = ImagePoint { x, y };
                assert_eq!(mapper.screen_to_image(mapper.image_to_screen(p)), p);
            }
        }
    }

    #[test]
    fn screen_box_maps_corner_by_corner() {
        let mapper = left_of_primary().mapper();
        let b = mapper.screen_box_to_image(ScreenBox {
            left: -1800,
            top: 100,
            right: -200,
            bottom: 900,
        });
        // x corrected by the offset, y passed through untouched.
        assert_eq!(b, ImageBox {
            left: 120,
            top: 100,
            right: 1720,
            bottom: 900,
        });
    }

    #[test]
    fn capture_region_single_monitor_uses_native_height() {
        let region = single().capture_region();
        assert_eq!(region.left, 0);
        assert_eq!(region.top, 0);
        assert_eq!(region.width, 1920);
        assert_eq!(region.height, 1080);
    }

    #[test]
    fn capture_region_spans_all_monitors() {
        let region = left_of_primary().capture_region();
        assert_eq!(region.left, -1920);
        assert_eq!(region.width, 3840);
        // Reference monitor is the one at -1920; height estimated from the
        // rightmost monitor's aspect ratio: |-1920| * 1080/1920.
        assert_eq!(region.height, 1080);
    }

    #[test]
    fn monitors_sorted_by_origin() {
        let geo = VirtualDesktopGeometry::new(vec![
            monitor(1920, 0, 1920, 1080),
            monitor(0, 0, 1920, 1080),
        ]);
        assert_eq!(geo.monitors()[0].origin_x, 0);
        assert_eq!(geo.monitors()[1].origin_x, 1920);
    }

    #[test]
    fn shrink_moves_every_edge_inward() {
        let b = ScreenBox {
            left: 0,
            top: 0,
            right: 1000,
            bottom: 500,
        };
        let shrunk = b.shrink_by_fraction(0.1);
        assert_eq!(shrunk, ScreenBox {
            left: 100,
            top: 50,
            right: 900,
            bottom: 450,
        });
    }
}
