//! Screen capture adapter: one operation, "capture the virtual desktop as a
//! pixel buffer". Monitor enumeration and compositing stay behind it.

use async_trait::async_trait;
use image::RgbaImage;

use crate::errors::{ModPilotError, ModPilotResult};
use crate::geometry::{CaptureRegion, Monitor};
use crate::vision::types::Frame;

fn capture_err(e: impl std::fmt::Display) -> ModPilotError {
    ModPilotError::Capture(e.to_string())
}

/// Enumerates the physical displays. With `force_primary` the set is
/// restricted to the primary display only.
pub fn enumerate_monitors(force_primary: bool) -> ModPilotResult<Vec<Monitor>> {
    let all = xcap::Monitor::all().map_err(capture_err)?;
    let mut monitors = Vec::new();
    for m in &all {
        if force_primary && !m.is_primary().map_err(capture_err)? {
            continue;
        }
        monitors.push(Monitor {
            origin_x: m.x().map_err(capture_err)?,
            origin_y: m.y().map_err(capture_err)?,
            width: m.width().map_err(capture_err)?,
            height: m.height().map_err(capture_err)?,
        });
    }
    if monitors.is_empty() {
        return Err(ModPilotError::Capture("no monitors found".into()));
    }
    tracing::info!(count = monitors.len(), force_primary, "enumerated monitors");
    Ok(monitors)
}

#[async_trait]
pub trait ScreenCapturer: Send {
    async fn capture_virtual_desktop(&mut self, region: CaptureRegion) -> ModPilotResult<Frame>;
}

/// Captures every monitor intersecting the region and composites the images
/// onto one canvas anchored at the region origin.
pub struct XcapScreenCapturer;

#[async_trait]
impl ScreenCapturer for XcapScreenCapturer {
    async fn capture_virtual_desktop(&mut self, region: CaptureRegion) -> ModPilotResult<Frame> {
        let mut canvas = RgbaImage::new(region.width, region.height);

        for monitor in xcap::Monitor::all().map_err(capture_err)? {
            let x = monitor.x().map_err(capture_err)?;
            let y = monitor.y().map_err(capture_err)?;
            let width = monitor.width().map_err(capture_err)? as i64;

            // Skip displays fully outside the capture region (force-primary
            // runs still enumerate them all here).
            let offset_x = x as i64 - region.left as i64;
            let offset_y = y as i64 - region.top as i64;
            if offset_x + width <= 0 || offset_x >= region.width as i64 {
                continue;
            }

            let shot = monitor.capture_image().map_err(capture_err)?;
            image::imageops::overlay(&mut canvas, &shot, offset_x, offset_y);
        }

        let pixels = image::DynamicImage::ImageRgba8(canvas).to_luma8();
        tracing::debug!(
            width = region.width,
            height = region.height,
            "captured virtual desktop"
        );
        Ok(Frame::new(pixels, region))
    }
}
