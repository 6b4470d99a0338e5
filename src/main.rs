use std::path::Path;

use clap::Parser;

use modpilot::assets::TemplateLibrary;
use modpilot::capture::{enumerate_monitors, XcapScreenCapturer};
use modpilot::config::{load_config, Browser, RunOptions};
use modpilot::errors::ModPilotResult;
use modpilot::geometry::VirtualDesktopGeometry;
use modpilot::input::EnigoActuator;
use modpilot::scan::engine::ScanEngine;
use modpilot::vision::brief::{BriefExtractor, HammingMatcher};
use modpilot::vision::finder::VisionFinder;
use modpilot::window::XcapWindowProbe;

#[derive(Parser, Debug)]
#[command(
    name = "modpilot",
    about = "Automates mod-download clicking via visual template matching"
)]
struct Args {
    /// Browser the external placement helper pairs with the mod manager.
    /// Only valid together with --vortex.
    #[arg(long, value_enum)]
    browser: Option<Browser>,

    /// Enable the two-phase Vortex workflow (drive the mod manager's
    /// download button, then wait for the confirmation page).
    #[arg(long)]
    vortex: bool,

    /// Verbose logging.
    #[arg(long)]
    verbose: bool,

    /// Restrict detection to the primary display only.
    #[arg(long)]
    force_primary: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(if args.verbose { "debug" } else { "info" })
            }),
        )
        .init();

    if let Err(e) = run(args).await {
        tracing::error!(error = %e, "fatal");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> ModPilotResult<()> {
    let options = RunOptions::new(args.vortex, args.browser, args.force_primary)?;
    let config = load_config()?;

    tracing::info!(
        two_phase = options.two_phase,
        browser = ?options.browser,
        force_primary = options.force_primary,
        "starting modpilot"
    );

    let monitors = enumerate_monitors(options.force_primary)?;
    let geometry = VirtualDesktopGeometry::new(monitors);

    let mut extractor = BriefExtractor::new(config.detection.corner_threshold);
    let library = TemplateLibrary::load(
        Path::new(&config.assets.dir),
        &config.thresholds,
        &mut extractor,
    )?;
    let finder = VisionFinder::new(extractor, HammingMatcher, library);

    let mut engine = ScanEngine::new(
        finder,
        XcapScreenCapturer,
        EnigoActuator::new()?,
        XcapWindowProbe,
        &geometry,
        &options,
        &config,
    );
    engine.run_loop().await
}
