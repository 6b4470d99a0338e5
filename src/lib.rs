pub mod assets;
pub mod capture;
pub mod config;
pub mod errors;
pub mod geometry;
pub mod input;
pub mod scan;
pub mod vision;
pub mod window;

pub use crate::errors::{ModPilotError, ModPilotResult};
