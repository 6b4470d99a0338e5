//! Concrete vision binding: FAST-9 corners + 256-bit BRIEF binary
//! descriptors from `imageproc`, matched brute-force by Hamming distance.

use image::GrayImage;
use imageproc::binary_descriptors::brief::{brief, BriefDescriptor, TestPair};
use imageproc::binary_descriptors::BinaryDescriptor;
use imageproc::corners::corners_fast9;
use imageproc::point::Point;

use crate::errors::{ModPilotError, ModPilotResult};
use crate::geometry::ImagePoint;
use crate::vision::traits::{DescriptorMatcher, Descriptors, FeatureExtractor, KnnMatch};

/// Keypoints closer than this to any image edge are dropped so the BRIEF
/// sampling window always stays inside the image.
const EDGE_MARGIN: u32 = 20;

/// Descriptor length in bits.
const DESCRIPTOR_BITS: usize = 256;

pub struct BriefDescriptors {
    descriptors: Vec<BriefDescriptor>,
}

impl std::fmt::Debug for BriefDescriptors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BriefDescriptors")
            .field("len", &self.descriptors.len())
            .finish()
    }
}

impl Descriptors for BriefDescriptors {
    fn len(&self) -> usize {
        self.descriptors.len()
    }

    fn keypoint(&self, index: usize) -> ImagePoint {
        let p = self.descriptors[index].position();
        ImagePoint {
            x: p.x as i32,
            y: p.y as i32,
        }
    }
}

/// FAST-9 + BRIEF extractor. The BRIEF test-pair pattern is generated on the
/// first extraction and reused for every later one; descriptors from
/// different patterns are not comparable.
pub struct BriefExtractor {
    corner_threshold: u8,
    test_pairs: Option<Vec<TestPair>>,
}

impl BriefExtractor {
    pub fn new(corner_threshold: u8) -> Self {
        Self {
            corner_threshold,
            test_pairs: None,
        }
    }
}

impl FeatureExtractor for BriefExtractor {
    type Output = BriefDescriptors;

    fn extract(&mut self, image: &GrayImage) -> ModPilotResult<BriefDescriptors> {
        let (width, height) = image.dimensions();
        let corners = corners_fast9(image, self.corner_threshold);
        let keypoints: Vec<Point<u32>> = corners
            .iter()
            .filter(|c| {
                c.x >= EDGE_MARGIN
                    && c.y >= EDGE_MARGIN
                    && c.x + EDGE_MARGIN < width
                    && c.y + EDGE_MARGIN < height
            })
            .map(|c| Point::new(c.x, c.y))
            .collect();

        let (descriptors, pairs) =
            brief(image, &keypoints, DESCRIPTOR_BITS, self.test_pairs.as_ref())
                .map_err(|e| ModPilotError::Vision(e.to_string()))?;
        if self.test_pairs.is_none() {
            self.test_pairs = Some(pairs);
        }

        tracing::trace!(
            corners = corners.len(),
            descriptors = descriptors.len(),
            "extracted frame features"
        );
        Ok(BriefDescriptors { descriptors })
    }
}

/// Exhaustive Hamming-distance matcher over BRIEF descriptors.
pub struct HammingMatcher;

impl DescriptorMatcher for HammingMatcher {
    type Descriptors = BriefDescriptors;

    fn knn_match(
        &self,
        query: &BriefDescriptors,
        target: &BriefDescriptors,
        k: usize,
    ) -> Vec<Vec<KnnMatch>> {
        query
            .descriptors
            .iter()
            .map(|q| {
                let mut neighbours: Vec<KnnMatch> = target
                    .descriptors
                    .iter()
                    .enumerate()
                    .map(|(target_index, t)| KnnMatch {
                        target_index,
                        distance: q.hamming_distance(t),
                    })
                    .collect();
                neighbours.sort_by_key(|m| m.distance);
                neighbours.truncate(k);
                neighbours
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn noise_image(width: u32, height: u32, seed: u64) -> GrayImage {
        let mut rng = StdRng::seed_from_u64(seed);
        GrayImage::from_fn(width, height, |_, _| image::Luma([rng.gen::<u8>()]))
    }

    #[test]
    fn extractor_finds_features_in_textured_image() {
        let mut extractor = BriefExtractor::new(20);
        let image = noise_image(200, 200, 1);
        let features = extractor.extract(&image).unwrap();
        assert!(!features.is_empty());
        // Every surviving keypoint honours the edge margin.
        for i in 0..features.len() {
            let p = features.keypoint(i);
            assert!(p.x >= EDGE_MARGIN as i32 && p.x < (200 - EDGE_MARGIN) as i32);
            assert!(p.y >= EDGE_MARGIN as i32 && p.y < (200 - EDGE_MARGIN) as i32);
        }
    }

    #[test]
    fn identical_content_matches_at_distance_zero() {
        let mut extractor = BriefExtractor::new(20);
        let image = noise_image(120, 120, 2);
        let a = extractor.extract(&image).unwrap();
        let b = extractor.extract(&image).unwrap();
        assert_eq!(a.len(), b.len());

        let matches = HammingMatcher.knn_match(&a, &b, 2);
        assert_eq!(matches.len(), a.len());
        for neighbours in &matches {
            assert_eq!(neighbours.first().map(|m| m.distance), Some(0));
        }
    }

    #[test]
    fn knn_returns_at_most_k_sorted_neighbours() {
        let mut extractor = BriefExtractor::new(20);
        let a = extractor.extract(&noise_image(120, 120, 3)).unwrap();
        let b = extractor.extract(&noise_image(120, 120, 4)).unwrap();

        for neighbours in HammingMatcher.knn_match(&a, &b, 2) {
            assert!(neighbours.len() <= 2);
            if neighbours.len() == 2 {
                assert!(neighbours[0].distance <= neighbours[1].distance);
            }
        }
    }

    #[test]
    fn empty_target_yields_empty_neighbour_lists() {
        let mut extractor = BriefExtractor::new(20);
        let a = extractor.extract(&noise_image(120, 120, 5)).unwrap();
        // A flat image has no corners at all.
        let flat = GrayImage::from_pixel(120, 120, image::Luma([128]));
        let b = extractor.extract(&flat).unwrap();
        assert!(b.is_empty());

        for neighbours in HammingMatcher.knn_match(&a, &b, 2) {
            assert!(neighbours.is_empty());
        }
    }
}
