use std::sync::Arc;

use crate::assets::decode::PreparedImage;
use crate::foundation::core::{Canvas, Rect, Rgba8};
use crate::foundation::error::{CardError, CardResult};
use crate::layout::plan::{Drawable, ImageLayer, LayoutPlan, RectLayer, TextLayer};
use crate::render::blur::soften;
use crate::text::shaper::TextShaper;

/// Rendered frame in row-major, premultiplied RGBA8. Cards are opaque, so this equals straight RGBA.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl FrameRGBA {
    /// RGBA bytes of the pixel at `(x, y)`, as stored.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + x as usize) * 4;
        let px = self.data.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Paints a [`LayoutPlan`] onto an opaque black canvas, in order.
pub struct CpuRasterizer {
    shaper: TextShaper,
    ctx: Option<vello_cpu::RenderContext>,
    background: Rgba8,
}

impl CpuRasterizer {
    pub fn new(shaper: TextShaper) -> Self {
        Self {
            shaper,
            ctx: None,
            background: Rgba8::BLACK,
        }
    }

    pub fn render(&mut self, plan: &LayoutPlan) -> CardResult<FrameRGBA> {
        let canvas = plan.canvas;
        let (w, h) = canvas_dims_u16(canvas)?;

        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w && ctx.height() == h => ctx,
            _ => vello_cpu::RenderContext::new(w, h),
        };
        ctx.reset();

        let result = self.paint(plan, &mut ctx);
        let out = result.map(|()| {
            let mut pixmap = vello_cpu::Pixmap::new(w, h);
            ctx.flush();
            ctx.render_to_pixmap(&mut pixmap);
            FrameRGBA {
                width: canvas.width,
                height: canvas.height,
                data: pixmap.data_as_u8_slice().to_vec(),
            }
        });
        self.ctx = Some(ctx);
        out
    }

    fn paint(&mut self, plan: &LayoutPlan, ctx: &mut vello_cpu::RenderContext) -> CardResult<()> {
        ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(color_to_cpu(self.background));
        ctx.fill_rect(&rect_to_cpu(plan.canvas.bounds()));

        let mut skipped_text = 0usize;
        for item in &plan.items {
            match item {
                Drawable::Image(layer) => draw_image(layer, ctx)?,
                Drawable::Rect(layer) => draw_rect(layer, ctx),
                Drawable::Text(layer) => {
                    if !self.draw_text(layer, ctx) {
                        skipped_text += 1;
                    }
                }
            }
        }
        if skipped_text > 0 {
            tracing::warn!(skipped_text, "no fonts registered; text layers were not drawn");
        }
        Ok(())
    }

    /// Returns false when the text could not be shaped.
    fn draw_text(&mut self, layer: &TextLayer, ctx: &mut vello_cpu::RenderContext) -> bool {
        if layer.text.is_empty() {
            return true;
        }
        let Some(shaped) = self
            .shaper
            .shape(&layer.text, &layer.style, layer.frame.width())
        else {
            return false;
        };

        ctx.set_transform(vello_cpu::kurbo::Affine::translate((
            layer.frame.x0,
            layer.frame.y0,
        )));
        for line in shaped.layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&shaped.font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        true
    }
}

fn draw_rect(layer: &RectLayer, ctx: &mut vello_cpu::RenderContext) {
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(color_to_cpu(layer.fill));
    ctx.fill_rect(&rect_to_cpu(layer.frame));
}

fn draw_image(layer: &ImageLayer, ctx: &mut vello_cpu::RenderContext) -> CardResult<()> {
    let fw = layer.frame.width().round().max(1.0) as u32;
    let fh = layer.frame.height().round().max(1.0) as u32;

    let mut pixels = scale_to_fill(&layer.image, fw, fh)?;
    soften(&mut pixels, fw, layer.blur);

    let pixmap = pixmap_from_premul_bytes(&pixels, fw, fh)?;
    let paint = vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    };

    let opacity = layer.opacity.clamp(0.0, 1.0);
    ctx.set_transform(vello_cpu::kurbo::Affine::translate((
        layer.frame.x0,
        layer.frame.y0,
    )));
    ctx.set_paint(paint);
    if opacity < 1.0 {
        ctx.push_opacity_layer(opacity);
    }
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, fw as f64, fh as f64));
    if opacity < 1.0 {
        ctx.pop_layer();
    }
    Ok(())
}

/// Stretch to exactly `width x height`; each axis scales independently.
fn scale_to_fill(img: &PreparedImage, width: u32, height: u32) -> CardResult<Vec<u8>> {
    if img.width == width && img.height == height {
        return Ok(img.rgba8_premul.as_ref().clone());
    }
    let src = image::RgbaImage::from_raw(img.width, img.height, img.rgba8_premul.as_ref().clone())
        .ok_or_else(|| CardError::render("background image buffer size mismatch"))?;
    let resized =
        image::imageops::resize(&src, width, height, image::imageops::FilterType::Triangle);
    Ok(resized.into_raw())
}

fn canvas_dims_u16(canvas: Canvas) -> CardResult<(u16, u16)> {
    let w: u16 = canvas
        .width
        .try_into()
        .map_err(|_| CardError::render("canvas width exceeds u16"))?;
    let h: u16 = canvas
        .height
        .try_into()
        .map_err(|_| CardError::render("canvas height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(CardError::render("canvas must not be empty"));
    }
    Ok((w, h))
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> CardResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| CardError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| CardError::render("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(CardError::render("pixmap byte len mismatch"));
    }
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (width as usize) * (height as usize),
    );
    for px in bytes.chunks_exact(4) {
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    let may_have_opacities = bytes.chunks_exact(4).any(|px| px[3] != 255);
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
