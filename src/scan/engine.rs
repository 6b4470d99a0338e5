//! The scan loop: capture, detect, click, sleep, forever.
//!
//! `tick` holds all the decision logic and touches no OS resource beyond the
//! injected finder and window probe, so the state machine is testable with
//! scripted collaborators and no real sleeps. `run_loop` is the thin driver
//! that feeds it frames and executes the actions it returns.

use std::time::Duration;

use crate::assets::TemplateKind;
use crate::capture::ScreenCapturer;
use crate::config::{AppConfig, RunOptions};
use crate::errors::ModPilotResult;
use crate::geometry::{CaptureRegion, CoordinateMapper, ImageBox, VirtualDesktopGeometry};
use crate::input::ClickActuator;
use crate::scan::state::{ScanPhase, ScanState, TickAction};
use crate::vision::finder::TargetFinder;
use crate::vision::types::Frame;
use crate::window::WindowProbe;

pub struct ScanEngine<F, C, A, W>
where
    F: TargetFinder,
    C: ScreenCapturer,
    A: ClickActuator,
    W: WindowProbe,
{
    finder: F,
    capturer: C,
    actuator: A,
    probe: W,
    mapper: CoordinateMapper,
    region: CaptureRegion,
    state: ScanState,
    two_phase: bool,
    window_title: String,
    window_margin_fraction: f64,
    miss_streak_limit: u32,
    tick_interval: Duration,
    settle_pause: Duration,
    confirm_pause: Duration,
}

impl<F, C, A, W> ScanEngine<F, C, A, W>
where
    F: TargetFinder,
    C: ScreenCapturer,
    A: ClickActuator,
    W: WindowProbe,
{
    pub fn new(
        finder: F,
        capturer: C,
        actuator: A,
        probe: W,
        geometry: &VirtualDesktopGeometry,
        options: &RunOptions,
        config: &AppConfig,
    ) -> Self {
        Self {
            finder,
            capturer,
            actuator,
            probe,
            mapper: geometry.mapper(),
            region: geometry.capture_region(),
            state: ScanState::new(options.two_phase),
            two_phase: options.two_phase,
            window_title: config.detection.window_title.clone(),
            window_margin_fraction: config.detection.window_margin_fraction,
            miss_streak_limit: config.detection.web_miss_streak_limit,
            tick_interval: Duration::from_secs(config.timing.tick_seconds),
            settle_pause: Duration::from_secs(config.timing.settle_seconds),
            confirm_pause: Duration::from_secs(config.timing.confirm_pause_seconds),
        }
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    /// Runs the loop until the process is terminated. A failed capture skips
    /// the tick; only startup problems are fatal.
    pub async fn run_loop(&mut self) -> ModPilotResult<()> {
        tracing::info!(
            two_phase = self.two_phase,
            phase = ?self.state.phase,
            "entering scan loop"
        );
        loop {
            match self.capturer.capture_virtual_desktop(self.region).await {
                Ok(frame) => {
                    let actions = self.tick(&frame).await?;
                    for action in actions {
                        match action {
                            TickAction::Click(point) => self.actuator.click(point).await?,
                            TickAction::Settle(pause) => tokio::time::sleep(pause).await,
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "capture failed, skipping tick");
                }
            }
            tokio::time::sleep(self.tick_interval).await;
        }
    }

    /// One decision pass over a captured frame. Mutates the phase state and
    /// returns the side effects for the driver, in execution order.
    pub async fn tick(&mut self, frame: &Frame) -> ModPilotResult<Vec<TickAction>> {
        match self.state.phase {
            ScanPhase::SeekingPrimaryButton => self.seek_primary(frame).await,
            ScanPhase::SeekingWebButton => self.seek_web(frame),
            ScanPhase::AwaitingSecondaryTarget => self.await_confirmation(frame),
        }
    }

    async fn seek_primary(&mut self, frame: &Frame) -> ModPilotResult<Vec<TickAction>> {
        let mut actions = Vec::new();

        let region = self.primary_region().await;
        let primary = self
            .finder
            .find(frame, TemplateKind::VortexDownload, region)?;
        let staging = self.finder.find(frame, TemplateKind::Staging, None)?;
        let understood = self.finder.find(frame, TemplateKind::Understood, None)?;

        // Dismiss whichever dialog is up, most specific first.
        if let Some(p) = staging {
            let target = self.mapper.image_to_screen(p);
            tracing::info!(x = target.x, y = target.y, "staging dialog found, dismissing");
            actions.push(TickAction::Click(target));
            actions.push(TickAction::Settle(self.settle_pause));
        } else if let Some(p) = understood {
            let target = self.mapper.image_to_screen(p);
            tracing::info!(x = target.x, y = target.y, "understood dialog found, dismissing");
            actions.push(TickAction::Click(target));
            actions.push(TickAction::Settle(self.settle_pause));
        }

        if let Some(p) = primary {
            let target = self.mapper.image_to_screen(p);
            tracing::info!(x = target.x, y = target.y, "primary button found, clicking");
            actions.push(TickAction::Click(target));
            self.state.phase = ScanPhase::SeekingWebButton;
            self.state.web_miss_streak = 0;
        }

        Ok(actions)
    }

    fn seek_web(&mut self, frame: &Frame) -> ModPilotResult<Vec<TickAction>> {
        let mut actions = Vec::new();

        match self.finder.find(frame, TemplateKind::WebsiteDownload, None)? {
            Some(p) => {
                let target = self.mapper.image_to_screen(p);
                tracing::info!(x = target.x, y = target.y, "web button found, clicking");
                actions.push(TickAction::Click(target));
                self.state.web_miss_streak = 0;
                if self.two_phase {
                    self.state.phase = ScanPhase::AwaitingSecondaryTarget;
                }
            }
            None => {
                self.state.web_miss_streak += 1;
                if self.state.web_miss_streak > self.miss_streak_limit {
                    // Page or app state has drifted; restart from the top.
                    tracing::info!(
                        streak = self.state.web_miss_streak,
                        "web button still missing, restarting workflow"
                    );
                    self.state = ScanState::new(self.two_phase);
                } else {
                    tracing::debug!(streak = self.state.web_miss_streak, "web button not found");
                }
            }
        }

        Ok(actions)
    }

    fn await_confirmation(&mut self, frame: &Frame) -> ModPilotResult<Vec<TickAction>> {
        let mut actions = Vec::new();

        if let Some(p) = self.finder.find(frame, TemplateKind::ClickHere, None)? {
            // No click needed; the link appearing means the download started.
            tracing::info!(x = p.x, y = p.y, "confirmation link found, restarting workflow");
            actions.push(TickAction::Settle(self.confirm_pause));
            self.state = ScanState::new(self.two_phase);
        }

        Ok(actions)
    }

    /// Image-space detection region derived from the mod-manager window,
    /// shrunk inward to suppress matches on window chrome. `None` when the
    /// window is not open or the probe fails; detection then runs
    /// unconstrained for this tick.
    async fn primary_region(&mut self) -> Option<ImageBox> {
        match self.probe.find_window(&self.window_title).await {
            Ok(Some(bounds)) => {
                let shrunk = bounds.shrink_by_fraction(self.window_margin_fraction);
                Some(self.mapper.screen_box_to_image(shrunk))
            }
            Ok(None) => {
                tracing::debug!(title = %self.window_title, "window not open, scanning unconstrained");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "window probe failed, scanning unconstrained");
                None
            }
        }
    }
}
