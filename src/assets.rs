//! The fixed set of template button images the workflow knows about, loaded
//! once at startup with their descriptors precomputed.

use std::path::Path;

use crate::config::ThresholdConfig;
use crate::errors::{ModPilotError, ModPilotResult};
use crate::vision::brief::{BriefDescriptors, BriefExtractor};
use crate::vision::traits::{Descriptors, FeatureExtractor};

/// The known template images. The set is fixed; anything missing on disk is
/// a fatal startup error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    /// The mod manager's own download button (the primary target).
    VortexDownload,
    /// The slow-download button on the mod page.
    WebsiteDownload,
    /// The "click here" confirmation link shown once a download starts.
    ClickHere,
    /// The "Understood" dialog dismiss button.
    Understood,
    /// The staging-folder notice dismiss button.
    Staging,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 5] = [
        TemplateKind::VortexDownload,
        TemplateKind::WebsiteDownload,
        TemplateKind::ClickHere,
        TemplateKind::Understood,
        TemplateKind::Staging,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            TemplateKind::VortexDownload => "VortexDownloadButton.png",
            TemplateKind::WebsiteDownload => "WebsiteDownloadButton.png",
            TemplateKind::ClickHere => "ClickHereButton.png",
            TemplateKind::Understood => "UnderstoodButton.png",
            TemplateKind::Staging => "StagingButton.png",
        }
    }
}

/// A loaded template: its precomputed descriptors and its tuned
/// match-distance threshold. The pixel buffer is not kept; only the
/// descriptors matter after startup.
#[derive(Debug)]
pub struct TemplateAsset {
    pub kind: TemplateKind,
    pub descriptors: BriefDescriptors,
    pub threshold: u32,
}

/// All template assets, ready for per-tick matching. Immutable for the
/// process lifetime.
#[derive(Debug)]
pub struct TemplateLibrary {
    assets: Vec<TemplateAsset>,
}

impl TemplateLibrary {
    /// Loads every known template from `dir` and precomputes its
    /// descriptors. A missing file fails fast, naming the asset.
    pub fn load(
        dir: &Path,
        thresholds: &ThresholdConfig,
        extractor: &mut BriefExtractor,
    ) -> ModPilotResult<Self> {
        let mut assets = Vec::with_capacity(TemplateKind::ALL.len());
        for kind in TemplateKind::ALL {
            let path = dir.join(kind.file_name());
            if !path.is_file() {
                return Err(ModPilotError::Asset(format!(
                    "missing template asset: {}",
                    path.display()
                )));
            }
            let image = image::open(&path)?.to_luma8();
            let descriptors = extractor.extract(&image)?;
            tracing::info!(
                asset = kind.file_name(),
                features = descriptors.len(),
                "loaded template asset"
            );
            assets.push(TemplateAsset {
                kind,
                descriptors,
                threshold: threshold_for(kind, thresholds),
            });
        }
        Ok(Self { assets })
    }

    pub fn get(&self, kind: TemplateKind) -> &TemplateAsset {
        self.assets
            .iter()
            .find(|a| a.kind == kind)
            .expect("library holds every template kind")
    }
}

fn threshold_for(kind: TemplateKind, thresholds: &ThresholdConfig) -> u32 {
    match kind {
        TemplateKind::VortexDownload => thresholds.vortex_download,
        TemplateKind::WebsiteDownload => thresholds.website_download,
        TemplateKind::ClickHere => thresholds.click_here,
        TemplateKind::Understood => thresholds.understood,
        TemplateKind::Staging => thresholds.staging,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThresholdConfig;

    #[test]
    fn missing_asset_is_named_in_the_error() {
        let mut extractor = BriefExtractor::new(20);
        let err = TemplateLibrary::load(
            Path::new("/nonexistent"),
            &ThresholdConfig::default(),
            &mut extractor,
        )
        .unwrap_err();
        match err {
            ModPilotError::Asset(msg) => assert!(msg.contains("VortexDownloadButton.png")),
            other => panic!("expected asset error, got {other}"),
        }
    }

    #[test]
    fn thresholds_follow_config() {
        let thresholds = ThresholdConfig::default();
        assert_eq!(threshold_for(TemplateKind::VortexDownload, &thresholds), 100);
        assert_eq!(threshold_for(TemplateKind::Staging, &thresholds), 80);
    }
}
