use image::GrayImage;

use crate::geometry::CaptureRegion;

/// One captured composite screenshot plus the region it was captured from.
/// Recreated every scan tick and discarded after a single match pass.
pub struct Frame {
    pub pixels: GrayImage,
    pub region: CaptureRegion,
}

impl Frame {
    pub fn new(pixels: GrayImage, region: CaptureRegion) -> Self {
        Self { pixels, region }
    }
}
