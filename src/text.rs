/// Font registration and face selection.
pub mod fonts;
/// Text shaping and height measurement.
pub mod shaper;
