use crate::foundation::error::{CardError, CardResult};

pub use kurbo::Rect;

/// Output surface dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    /// Standard social card size.
    pub const CARD: Canvas = Canvas {
        width: 1200,
        height: 628,
    };

    pub fn new(width: u32, height: u32) -> CardResult<Self> {
        if width == 0 || height == 0 {
            return Err(CardError::validation("canvas dimensions must be > 0"));
        }
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(CardError::validation("canvas dimensions must fit in u16"));
        }
        Ok(Self { width, height })
    }

    pub fn width_f64(self) -> f64 {
        f64::from(self.width)
    }

    pub fn height_f64(self) -> f64 {
        f64::from(self.height)
    }

    pub fn bounds(self) -> Rect {
        Rect::new(0.0, 0.0, self.width_f64(), self.height_f64())
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::CARD
    }
}

/// Straight (non-premultiplied) RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const WHITE: Rgba8 = Rgba8::new(255, 255, 255, 255);
    pub const BLACK: Rgba8 = Rgba8::new(0, 0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
