pub mod brief;
pub mod detector;
pub mod finder;
pub mod traits;
pub mod types;
