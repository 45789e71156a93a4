//! CPU rasterization and encoding of layout plans.

pub mod blur;
pub mod cpu;
pub mod encode;
/// Named renderer strategies.
pub mod strategy;
