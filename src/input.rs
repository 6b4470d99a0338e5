//! Synthetic mouse input. The cursor is a shared resource with the human
//! operator, so every click saves and restores the pointer position.

use async_trait::async_trait;
use enigo::{Button, Coordinate, Direction, Enigo, Mouse, Settings};

use crate::errors::{ModPilotError, ModPilotResult};
use crate::geometry::ScreenPoint;

fn input_err(e: impl std::fmt::Display) -> ModPilotError {
    ModPilotError::Input(e.to_string())
}

#[async_trait]
pub trait ClickActuator: Send {
    /// Left-clicks at the given screen-space point. Safe to call repeatedly;
    /// never fails for coordinates inside the virtual desktop.
    async fn click(&mut self, point: ScreenPoint) -> ModPilotResult<()>;
}

pub struct EnigoActuator {
    enigo: Enigo,
}

impl EnigoActuator {
    pub fn new() -> ModPilotResult<Self> {
        Ok(Self {
            enigo: Enigo::new(&Settings::default()).map_err(input_err)?,
        })
    }
}

#[async_trait]
impl ClickActuator for EnigoActuator {
    async fn click(&mut self, point: ScreenPoint) -> ModPilotResult<()> {
        let (prev_x, prev_y) = self.enigo.location().map_err(input_err)?;

        self.enigo
            .move_mouse(point.x, point.y, Coordinate::Abs)
            .map_err(input_err)?;
        self.enigo
            .button(Button::Left, Direction::Click)
            .map_err(input_err)?;
        self.enigo
            .move_mouse(prev_x, prev_y, Coordinate::Abs)
            .map_err(input_err)?;

        tracing::info!(x = point.x, y = point.y, "clicked");
        Ok(())
    }
}
