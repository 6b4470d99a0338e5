//! The seam between the scan state machine and the vision stack: "find this
//! template in this frame". Mockable so the state machine tests without real
//! images.

use crate::assets::{TemplateKind, TemplateLibrary};
use crate::errors::ModPilotResult;
use crate::geometry::{ImageBox, ImagePoint};
use crate::vision::brief::{BriefExtractor, HammingMatcher};
use crate::vision::detector::detect;
use crate::vision::traits::FeatureExtractor;
use crate::vision::types::Frame;

pub trait TargetFinder {
    /// Best-estimate image-space location of `kind` in `frame`, constrained
    /// to `region` when given. `Ok(None)` is the normal "target absent"
    /// outcome.
    fn find(
        &mut self,
        frame: &Frame,
        kind: TemplateKind,
        region: Option<ImageBox>,
    ) -> ModPilotResult<Option<ImagePoint>>;
}

/// Production finder: extracts frame features and runs the consensus
/// detector against the precomputed template descriptors. Frame features are
/// re-extracted per call; a frame lives for one tick only.
pub struct VisionFinder {
    extractor: BriefExtractor,
    matcher: HammingMatcher,
    library: TemplateLibrary,
}

impl VisionFinder {
    pub fn new(extractor: BriefExtractor, matcher: HammingMatcher, library: TemplateLibrary) -> Self {
        Self {
            extractor,
            matcher,
            library,
        }
    }
}

impl TargetFinder for VisionFinder {
    fn find(
        &mut self,
        frame: &Frame,
        kind: TemplateKind,
        region: Option<ImageBox>,
    ) -> ModPilotResult<Option<ImagePoint>> {
        let frame_features = self.extractor.extract(&frame.pixels)?;
        let asset = self.library.get(kind);
        Ok(detect(
            &self.matcher,
            &asset.descriptors,
            &frame_features,
            asset.threshold,
            region,
        ))
    }
}
