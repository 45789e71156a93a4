use std::borrow::Cow;

use crate::layout::plan::{TextMeasurer, TextStyle};
use crate::text::fonts::FontBook;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub struct TextBrushRgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

/// A shaped, line-broken text block together with the face its glyphs come from.
pub struct ShapedText {
    pub layout: parley::Layout<TextBrushRgba8>,
    pub font: vello_cpu::peniko::FontData,
}

struct FaceSlot {
    family: String,
    weight: u16,
    font_ctx: parley::FontContext,
    draw_font: vello_cpu::peniko::FontData,
}

/// Shapes text against the registered fonts.
///
/// Each face gets its own `FontContext` so the glyphs parley picks always belong to the face the
/// renderer draws with. Measuring and drawing both go through [`TextShaper::shape`], so the
/// heights a layout sees match what ends up on the canvas. With no fonts registered, heights fall
/// back to [`estimate_text_height`] and nothing is drawn.
pub struct TextShaper {
    book: FontBook,
    family: Option<String>,
    slots: Vec<FaceSlot>,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
}

impl TextShaper {
    pub fn new(book: &FontBook, preferred_family: Option<&str>) -> Self {
        let family = book.default_family(preferred_family).map(str::to_string);
        let slots = book
            .faces()
            .iter()
            .map(|face| {
                let mut font_ctx = parley::FontContext::default();
                font_ctx
                    .collection
                    .register_fonts(face.blob.clone(), None);
                FaceSlot {
                    family: face.native_family.clone(),
                    weight: face.weight,
                    font_ctx,
                    draw_font: face.draw_font.clone(),
                }
            })
            .collect();

        Self {
            book: book.clone(),
            family,
            slots,
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    pub fn has_fonts(&self) -> bool {
        !self.slots.is_empty()
    }

    /// Shape `text` wrapped to `max_width`. Returns `None` when no font is registered.
    pub fn shape(&mut self, text: &str, style: &TextStyle, max_width: f64) -> Option<ShapedText> {
        let family = self.family.as_deref()?;
        let idx = self.book.select(family, style.weight)?;
        let slot = self.slots.get_mut(idx)?;

        let brush = TextBrushRgba8 {
            r: style.color.r,
            g: style.color.g,
            b: style.color.b,
            a: style.color.a,
        };

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut slot.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(slot.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(style.size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::new(f32::from(slot.weight)),
        ));
        builder.push_default(parley::style::StyleProperty::LineHeight(
            parley::style::LineHeight::FontSizeRelative(style.line_height),
        ));
        if style.letter_spacing_em != 0.0 {
            builder.push_default(parley::style::StyleProperty::LetterSpacing(
                style.letter_spacing_em * style.size_px,
            ));
        }
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        let w = max_width as f32;
        layout.break_all_lines(Some(w));
        layout.align(
            Some(w),
            parley::Alignment::Start,
            parley::AlignmentOptions::default(),
        );

        Some(ShapedText {
            layout,
            font: slot.draw_font.clone(),
        })
    }
}

impl TextMeasurer for TextShaper {
    fn measure(&mut self, text: &str, style: &TextStyle, max_width: f64) -> f64 {
        match self.shape(text, style, max_width) {
            Some(shaped) => f64::from(shaped.layout.height()),
            None => estimate_text_height(text, style, max_width),
        }
    }
}

const AVG_ADVANCE_EM: f64 = 0.55;
const FIRST_LINE_EM: f64 = 1.13;

/// Font-free height estimate: greedy word wrap at an average glyph advance.
pub fn estimate_text_height(text: &str, style: &TextStyle, max_width: f64) -> f64 {
    let size = f64::from(style.size_px);
    let advance = (AVG_ADVANCE_EM + f64::from(style.letter_spacing_em)).max(0.1) * size;
    let chars_per_line = ((max_width / advance).floor() as usize).max(1);

    let mut lines = 0usize;
    for paragraph in text.split('\n') {
        let mut cur = 0usize;
        let mut para_lines = 1usize;
        for word in paragraph.split_whitespace() {
            let len = word.chars().count();
            if cur > 0 && cur + 1 + len > chars_per_line {
                para_lines += 1;
                cur = 0;
            }
            if cur > 0 {
                cur += 1;
            }
            cur += len;
            // Words longer than a line break mid-word.
            while cur > chars_per_line {
                para_lines += 1;
                cur -= chars_per_line;
            }
        }
        lines += para_lines;
    }
    let lines = lines.max(1) as f64;

    size * FIRST_LINE_EM + (lines - 1.0) * size * f64::from(style.line_height)
}

#[cfg(test)]
#[path = "../../tests/unit/text/shaper.rs"]
mod tests;
