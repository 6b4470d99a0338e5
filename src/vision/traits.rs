//! Capability seams for the vision layer. The detector logic works purely in
//! terms of these traits, so the concrete feature library never leaks into
//! the matching or state-machine code.

use image::GrayImage;

use crate::errors::ModPilotResult;
use crate::geometry::ImagePoint;

/// A keypoint/descriptor collection extracted from one image. Opaque except
/// for the keypoint positions the consensus step needs.
pub trait Descriptors {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Image-space location of the keypoint behind descriptor `index`.
    fn keypoint(&self, index: usize) -> ImagePoint;
}

/// Extracts keypoints and descriptors from a grayscale image. Template and
/// frame descriptors must come from the same extractor instance so their
/// distances are comparable.
pub trait FeatureExtractor {
    type Output: Descriptors;

    fn extract(&mut self, image: &GrayImage) -> ModPilotResult<Self::Output>;
}

/// One nearest-neighbour candidate for a query descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnnMatch {
    /// Index into the target descriptor set.
    pub target_index: usize,
    pub distance: u32,
}

/// k-nearest-neighbour matching between two descriptor sets.
pub trait DescriptorMatcher {
    type Descriptors: Descriptors;

    /// For every query descriptor, the up-to-`k` nearest target descriptors,
    /// closest first. An empty target set yields empty inner vectors.
    fn knn_match(
        &self,
        query: &Self::Descriptors,
        target: &Self::Descriptors,
        k: usize,
    ) -> Vec<Vec<KnnMatch>>;
}
