//! Window geometry probe: the bounding rectangle of a named top-level
//! window, in screen space. The window being closed is a normal outcome.

use async_trait::async_trait;

use crate::errors::{ModPilotError, ModPilotResult};
use crate::geometry::ScreenBox;

fn window_err(e: impl std::fmt::Display) -> ModPilotError {
    ModPilotError::Window(e.to_string())
}

#[async_trait]
pub trait WindowProbe: Send {
    /// `Ok(None)` when no window with that exact title is open.
    async fn find_window(&mut self, title: &str) -> ModPilotResult<Option<ScreenBox>>;
}

pub struct XcapWindowProbe;

#[async_trait]
impl WindowProbe for XcapWindowProbe {
    async fn find_window(&mut self, title: &str) -> ModPilotResult<Option<ScreenBox>> {
        for window in xcap::Window::all().map_err(window_err)? {
            // Windows whose metadata cannot be read are skipped rather than
            // failing the whole probe.
            let Ok(window_title) = window.title() else {
                continue;
            };
            if window_title != title {
                continue;
            }
            let left = window.x().map_err(window_err)?;
            let top = window.y().map_err(window_err)?;
            let width = window.width().map_err(window_err)? as i32;
            let height = window.height().map_err(window_err)? as i32;
            return Ok(Some(ScreenBox {
                left,
                top,
                right: left + width,
                bottom: top + height,
            }));
        }
        Ok(None)
    }
}
