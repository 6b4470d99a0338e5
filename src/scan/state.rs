use std::time::Duration;

use crate::geometry::ScreenPoint;

/// Workflow phases of the scan loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    /// Looking for the mod manager's download button, dismissing dialogs on
    /// the way. Start phase of the two-phase workflow.
    SeekingPrimaryButton,
    /// Looking for the slow-download button on the web page. Start (and
    /// only) phase when the two-phase workflow is off.
    SeekingWebButton,
    /// Waiting for the confirmation link that signals the download started.
    AwaitingSecondaryTarget,
}

/// Mutable scan-loop state, owned exclusively by the engine. Counters are
/// reset only on explicit phase transitions.
#[derive(Debug, Clone)]
pub struct ScanState {
    pub phase: ScanPhase,
    /// Consecutive ticks the web button was not found.
    pub web_miss_streak: u32,
}

impl ScanState {
    pub fn new(two_phase: bool) -> Self {
        Self {
            phase: if two_phase {
                ScanPhase::SeekingPrimaryButton
            } else {
                ScanPhase::SeekingWebButton
            },
            web_miss_streak: 0,
        }
    }
}

/// Side effects one tick asks the driver to perform, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickAction {
    Click(ScreenPoint),
    /// Extra pause to let a UI transition settle before the next tick.
    Settle(Duration),
}
