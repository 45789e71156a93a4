use crate::assets::decode::PreparedImage;
use crate::foundation::core::{Canvas, Rect, Rgba8};

/// Weight used for light caption text.
pub const WEIGHT_THIN: u16 = 100;
/// Regular text weight.
pub const WEIGHT_NORMAL: u16 = 400;
/// Bold text weight.
pub const WEIGHT_BOLD: u16 = 700;

/// Visual style of a text block.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct TextStyle {
    pub size_px: f32,
    pub weight: u16,
    /// Line height as a multiple of the font size.
    pub line_height: f32,
    /// Extra advance between glyphs, in em.
    pub letter_spacing_em: f32,
    pub color: Rgba8,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size_px: 12.0,
            weight: WEIGHT_NORMAL,
            line_height: 0.8,
            letter_spacing_em: 0.0,
            color: Rgba8::WHITE,
        }
    }
}

/// What a text block represents on the card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum TextRole {
    Caption,
    Section,
    Watermark,
    Title,
    Subtitle,
    Description,
}

impl TextRole {
    /// Roles that take part in top-to-bottom stacking. The watermark floats behind everything.
    pub fn is_stacked(self) -> bool {
        !matches!(self, TextRole::Watermark)
    }
}

/// Background photo scaled to `frame`.
#[derive(Clone, Debug, serde::Serialize)]
pub struct ImageLayer {
    pub frame: Rect,
    pub opacity: f32,
    /// Blur strength in `0..=1`, relative to the frame size.
    pub blur: f32,
    #[serde(skip)]
    pub image: PreparedImage,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct RectLayer {
    pub frame: Rect,
    pub fill: Rgba8,
}

/// A wrapped text block. `frame.width()` is the wrap width, `frame.height()` the measured height.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TextLayer {
    pub role: TextRole,
    pub text: String,
    pub frame: Rect,
    pub style: TextStyle,
}

#[derive(Clone, Debug, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Drawable {
    Image(ImageLayer),
    Rect(RectLayer),
    Text(TextLayer),
}

/// Ordered, immutable list of drawables; later items paint over earlier ones.
#[derive(Clone, Debug, serde::Serialize)]
pub struct LayoutPlan {
    pub canvas: Canvas,
    pub items: Vec<Drawable>,
}

impl LayoutPlan {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, item: Drawable) {
        self.items.push(item);
    }

    pub fn texts(&self) -> impl Iterator<Item = &TextLayer> {
        self.items.iter().filter_map(|d| match d {
            Drawable::Text(t) => Some(t),
            _ => None,
        })
    }

    pub fn rects(&self) -> impl Iterator<Item = &RectLayer> {
        self.items.iter().filter_map(|d| match d {
            Drawable::Rect(r) => Some(r),
            _ => None,
        })
    }

    pub fn image(&self) -> Option<&ImageLayer> {
        self.items.iter().find_map(|d| match d {
            Drawable::Image(i) => Some(i),
            _ => None,
        })
    }

    pub fn text(&self, role: TextRole) -> Option<&TextLayer> {
        self.texts().find(|t| t.role == role)
    }

    /// Text blocks that participate in vertical stacking, in paint order.
    pub fn stacked_texts(&self) -> Vec<&TextLayer> {
        self.texts().filter(|t| t.role.is_stacked()).collect()
    }
}

/// Measures wrapped text height with the same rules the renderer uses to draw it.
pub trait TextMeasurer {
    fn measure(&mut self, text: &str, style: &TextStyle, max_width: f64) -> f64;
}
