/// Card layouts and the stacking cursor.
pub mod engine;
/// Drawables and the plan they form.
pub mod plan;
