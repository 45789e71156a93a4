//! Card layouts.
//!
//! A layout turns page metadata into a [`LayoutPlan`] without touching the filesystem or network:
//! the background photo arrives already decoded and text heights come from a [`TextMeasurer`].
//! Blocks are stacked with a running vertical cursor, each one placed below the measured height
//! of the block before it.

use crate::assets::decode::PreparedImage;
use crate::foundation::core::{Canvas, Rect, Rgba8};
use crate::layout::plan::{
    Drawable, ImageLayer, LayoutPlan, RectLayer, TextLayer, TextMeasurer, TextRole, TextStyle,
    WEIGHT_BOLD, WEIGHT_NORMAL, WEIGHT_THIN,
};
use crate::meta::extract::PageMetadata;

/// Everything a layout may look at.
#[derive(Clone, Copy, Debug)]
pub struct LayoutInput<'a> {
    pub meta: &'a PageMetadata,
    pub background: Option<&'a PreparedImage>,
    pub canvas: Canvas,
    /// Caption shown at the top of every card.
    pub fixed_text: &'a str,
}

/// A pure function from metadata to a plan.
pub trait CardLayout: Send + Sync {
    fn layout(&self, input: &LayoutInput<'_>, measurer: &mut dyn TextMeasurer) -> LayoutPlan;
}

const MARGIN_LEFT: f64 = 50.0;
const CAPTION_TOP: f64 = 30.0;
const CAPTION_ADVANCE: f64 = 90.0;
const CAPTION_BACKDROP_PAD: f64 = 60.0;
const NARROW_INSET: f64 = 300.0;
const WIDE_INSET: f64 = 100.0;
const SUBTITLE_GAP: f64 = 80.0;
const NO_SUBTITLE_ADVANCE: f64 = 100.0;
const DESCRIPTION_BACKDROP_LEAD: f64 = 50.0;
const DESCRIPTION_BACKDROP_OVERFLOW: f64 = 120.0;
const BACKGROUND_OPACITY: f32 = 0.60;
const BACKGROUND_BLUR: f32 = 0.33;
const WATERMARK_TOP: f64 = -30.0;

const BACKDROP: Rgba8 = Rgba8::new(0, 0, 0, 0x50);

/// Photo background, top caption bar, section, watermark, title, subtitle and description.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultLayout;

impl CardLayout for DefaultLayout {
    fn layout(&self, input: &LayoutInput<'_>, measurer: &mut dyn TextMeasurer) -> LayoutPlan {
        let canvas = input.canvas;
        let (w, h) = (canvas.width_f64(), canvas.height_f64());
        let meta = input.meta;
        let mut b = StackBuilder::new(canvas, measurer);

        if let Some(img) = input.background {
            b.plan.push(Drawable::Image(ImageLayer {
                frame: canvas.bounds(),
                opacity: BACKGROUND_OPACITY,
                blur: BACKGROUND_BLUR,
                image: img.clone(),
            }));
        }

        let caption_style = TextStyle {
            size_px: 32.0,
            weight: WEIGHT_THIN,
            color: Rgba8::new(255, 255, 255, 0xfb),
            ..TextStyle::default()
        };
        let caption = b.text(
            TextRole::Caption,
            input.fixed_text,
            MARGIN_LEFT,
            CAPTION_TOP,
            w - WIDE_INSET,
            caption_style,
        );
        // The backdrop sits under the caption even though its height depends on it.
        b.plan.push(Drawable::Rect(RectLayer {
            frame: Rect::new(0.0, 0.0, w, caption.frame.height() + CAPTION_BACKDROP_PAD),
            fill: BACKDROP,
        }));
        let caption_bottom = caption.frame.y1;
        b.plan.push(Drawable::Text(caption));

        let mut cursor = (CAPTION_TOP + CAPTION_ADVANCE).max(caption_bottom);

        if let Some(section) = non_empty(meta.section.as_deref()) {
            let style = TextStyle {
                size_px: 28.0,
                line_height: 1.2,
                color: Rgba8::new(255, 255, 255, 0x90),
                ..TextStyle::default()
            };
            let layer = b.text(
                TextRole::Section,
                section,
                MARGIN_LEFT,
                cursor,
                w - NARROW_INSET,
                style,
            );
            cursor += layer.frame.height();
            b.plan.push(Drawable::Text(layer));
        }

        let watermark_style = TextStyle {
            size_px: 408.0,
            weight: WEIGHT_NORMAL,
            line_height: 0.7,
            letter_spacing_em: -0.040,
            color: Rgba8::new(255, 255, 255, 0x10),
        };
        let watermark = b.text(
            TextRole::Watermark,
            meta.display_title(),
            0.0,
            WATERMARK_TOP,
            w - WIDE_INSET,
            watermark_style,
        );
        b.plan.push(Drawable::Text(watermark));

        if let Some(title) = non_empty(meta.clean_title.as_deref()) {
            let style = TextStyle {
                size_px: 80.0,
                weight: WEIGHT_BOLD,
                color: Rgba8::new(255, 255, 255, 0xf0),
                ..TextStyle::default()
            };
            let layer = b.text(TextRole::Title, title, MARGIN_LEFT, cursor, w - WIDE_INSET, style);
            cursor += layer.frame.height();
            b.plan.push(Drawable::Text(layer));
        }

        if let Some(sub_title) = non_empty(meta.sub_title.as_deref()) {
            let style = TextStyle {
                size_px: 25.0,
                color: Rgba8::new(255, 255, 255, 0xf0),
                ..TextStyle::default()
            };
            let layer = b.text(
                TextRole::Subtitle,
                sub_title,
                MARGIN_LEFT,
                cursor,
                w - WIDE_INSET,
                style,
            );
            cursor += SUBTITLE_GAP + layer.frame.height();
            b.plan.push(Drawable::Text(layer));
        } else {
            cursor += NO_SUBTITLE_ADVANCE;
        }

        if let Some(desc) = non_empty(meta.description.as_deref()) {
            b.plan.push(Drawable::Rect(RectLayer {
                frame: Rect::new(
                    0.0,
                    cursor - DESCRIPTION_BACKDROP_LEAD,
                    w,
                    h + DESCRIPTION_BACKDROP_OVERFLOW - DESCRIPTION_BACKDROP_LEAD,
                ),
                fill: BACKDROP,
            }));
            let style = TextStyle {
                size_px: 32.0,
                line_height: 1.2,
                color: Rgba8::new(255, 255, 255, 0xaa),
                ..TextStyle::default()
            };
            let layer = b.text(
                TextRole::Description,
                desc,
                MARGIN_LEFT,
                cursor,
                w - NARROW_INSET,
                style,
            );
            b.plan.push(Drawable::Text(layer));
        }

        b.finish()
    }
}

/// Flat dark card with title and description only; no photo, caption or watermark.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainLayout;

impl CardLayout for PlainLayout {
    fn layout(&self, input: &LayoutInput<'_>, measurer: &mut dyn TextMeasurer) -> LayoutPlan {
        let canvas = input.canvas;
        let w = canvas.width_f64();
        let meta = input.meta;
        let mut b = StackBuilder::new(canvas, measurer);

        b.plan.push(Drawable::Rect(RectLayer {
            frame: canvas.bounds(),
            fill: Rgba8::new(0x1b, 0x1f, 0x24, 255),
        }));

        let mut cursor = 80.0;
        if let Some(title) = non_empty(meta.clean_title.as_deref()) {
            let style = TextStyle {
                size_px: 72.0,
                weight: WEIGHT_BOLD,
                line_height: 1.1,
                ..TextStyle::default()
            };
            let layer = b.text(TextRole::Title, title, 80.0, cursor, w - 160.0, style);
            cursor += layer.frame.height() + 40.0;
            b.plan.push(Drawable::Text(layer));
        }
        if let Some(desc) = non_empty(meta.description.as_deref()) {
            let style = TextStyle {
                size_px: 32.0,
                line_height: 1.3,
                color: Rgba8::new(255, 255, 255, 0xcc),
                ..TextStyle::default()
            };
            let layer = b.text(TextRole::Description, desc, 80.0, cursor, w - 160.0, style);
            b.plan.push(Drawable::Text(layer));
        }

        b.finish()
    }
}

struct StackBuilder<'m> {
    plan: LayoutPlan,
    measurer: &'m mut dyn TextMeasurer,
}

impl<'m> StackBuilder<'m> {
    fn new(canvas: Canvas, measurer: &'m mut dyn TextMeasurer) -> Self {
        Self {
            plan: LayoutPlan::new(canvas),
            measurer,
        }
    }

    fn text(
        &mut self,
        role: TextRole,
        text: &str,
        left: f64,
        top: f64,
        width: f64,
        style: TextStyle,
    ) -> TextLayer {
        let width = width.max(1.0);
        let height = self.measurer.measure(text, &style, width).max(0.0);
        TextLayer {
            role,
            text: text.to_string(),
            frame: Rect::new(left, top, left + width, top + height),
            style,
        }
    }

    fn finish(self) -> LayoutPlan {
        self.plan
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "../../tests/unit/layout/engine.rs"]
mod tests;
