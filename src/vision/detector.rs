//! Template detection: k=2 nearest-neighbour matching, an absolute
//! distance cutoff, optional region filtering, and a coordinate-wise median
//! consensus over the surviving keypoints.
//!
//! The median is the noise-rejection step. Spurious matches are expected;
//! as long as they stay a minority, the consensus point lands inside the
//! inlier cluster. An empty point set is the normal "target absent from this
//! frame" outcome, not an error.

use crate::geometry::{ImageBox, ImagePoint};
use crate::vision::traits::{DescriptorMatcher, Descriptors};

/// Locates a template inside a frame's descriptor set.
///
/// For every template descriptor the two nearest frame descriptors are
/// found; the best one is accepted when its distance is strictly below
/// `distance_threshold`. Accepted keypoints strictly outside `region` (when
/// given, exclusive bounds) are discarded. Returns the coordinate-wise
/// median of the survivors, or `None` when nothing survives.
pub fn detect<D, M>(
    matcher: &M,
    template: &D,
    frame: &D,
    distance_threshold: u32,
    region: Option<ImageBox>,
) -> Option<ImagePoint>
where
    D: Descriptors,
    M: DescriptorMatcher<Descriptors = D>,
{
    let matches = matcher.knn_match(template, frame, 2);

    let mut points: Vec<ImagePoint> = matches
        .iter()
        .filter_map(|neighbours| neighbours.first())
        .filter(|best| best.distance < distance_threshold)
        .map(|best| frame.keypoint(best.target_index))
        .collect();

    if let Some(region) = region {
        points.retain(|p| region.contains_exclusive(*p));
    }

    let consensus = median_point(&points);
    tracing::trace!(
        accepted = points.len(),
        found = consensus.is_some(),
        "detection pass"
    );
    consensus
}

/// Coordinate-wise median, rounded to integer pixels. `None` for an empty
/// set.
fn median_point(points: &[ImagePoint]) -> Option<ImagePoint> {
    if points.is_empty() {
        return None;
    }
    let xs: Vec<i32> = points.iter().map(|p| p.x).collect();
    let ys: Vec<i32> = points.iter().map(|p| p.y).collect();
    Some(ImagePoint {
        x: median(xs),
        y: median(ys),
    })
}

fn median(mut values: Vec<i32>) -> i32 {
    values.sort_unstable();
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        ((values[mid - 1] as f64 + values[mid] as f64) / 2.0).round() as i32
    }
}
