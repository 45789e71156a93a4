use std::collections::BTreeMap;
use std::sync::Arc;

use crate::assets::decode::PreparedImage;
use crate::foundation::core::Canvas;
use crate::foundation::error::{CardError, CardResult};
use crate::layout::engine::{CardLayout, DefaultLayout, LayoutInput, PlainLayout};
use crate::layout::plan::LayoutPlan;
use crate::meta::extract::PageMetadata;
use crate::render::cpu::CpuRasterizer;
use crate::render::encode::encode_jpeg;
use crate::text::fonts::FontBook;
use crate::text::shaper::TextShaper;

/// Name of the renderer used when the configuration does not pick one.
pub const DEFAULT_RENDERER: &str = "default";

/// Shared inputs for one card render, besides the page metadata.
#[derive(Clone, Copy, Debug)]
pub struct CardContext<'a> {
    pub background: Option<&'a PreparedImage>,
    pub canvas: Canvas,
    pub fixed_text: &'a str,
    pub fonts: &'a FontBook,
    pub font_family: Option<&'a str>,
    pub jpeg_quality: u8,
}

/// Produces encoded card bytes from page metadata.
///
/// Implementations run on a blocking thread and must not do network or cache I/O.
pub trait CardRenderer: Send + Sync {
    fn render(&self, meta: &PageMetadata, ctx: &CardContext<'_>) -> CardResult<Vec<u8>>;

    /// The plan this renderer would paint, for renderers that are layout-driven.
    fn plan(&self, _meta: &PageMetadata, _ctx: &CardContext<'_>) -> Option<LayoutPlan> {
        None
    }
}

/// Lays the card out with `L`, rasterizes on the CPU and encodes as JPEG.
#[derive(Clone, Copy, Debug, Default)]
pub struct LayoutRenderer<L> {
    layout: L,
}

impl<L: CardLayout> LayoutRenderer<L> {
    pub fn new(layout: L) -> Self {
        Self { layout }
    }

    fn plan_with(
        &self,
        meta: &PageMetadata,
        ctx: &CardContext<'_>,
        shaper: &mut TextShaper,
    ) -> LayoutPlan {
        let input = LayoutInput {
            meta,
            background: ctx.background,
            canvas: ctx.canvas,
            fixed_text: ctx.fixed_text,
        };
        self.layout.layout(&input, shaper)
    }
}

impl<L: CardLayout> CardRenderer for LayoutRenderer<L> {
    #[tracing::instrument(level = "debug", skip_all, fields(canvas = ?ctx.canvas))]
    fn render(&self, meta: &PageMetadata, ctx: &CardContext<'_>) -> CardResult<Vec<u8>> {
        let mut shaper = TextShaper::new(ctx.fonts, ctx.font_family);
        let plan = self.plan_with(meta, ctx, &mut shaper);
        tracing::debug!(items = plan.items.len(), "layout planned");
        render_jpeg(&plan, shaper, ctx.jpeg_quality)
    }

    fn plan(&self, meta: &PageMetadata, ctx: &CardContext<'_>) -> Option<LayoutPlan> {
        let mut shaper = TextShaper::new(ctx.fonts, ctx.font_family);
        Some(self.plan_with(meta, ctx, &mut shaper))
    }
}

/// Rasterize `plan` with the fonts in `shaper` and encode it as JPEG.
pub fn render_jpeg(plan: &LayoutPlan, shaper: TextShaper, quality: u8) -> CardResult<Vec<u8>> {
    let mut rasterizer = CpuRasterizer::new(shaper);
    let frame = rasterizer.render(plan)?;
    encode_jpeg(&frame, quality)
}

/// Renderers addressable by name from configuration.
#[derive(Clone)]
pub struct RendererRegistry {
    renderers: BTreeMap<String, Arc<dyn CardRenderer>>,
}

impl RendererRegistry {
    /// Empty registry.
    pub fn empty() -> Self {
        Self {
            renderers: BTreeMap::new(),
        }
    }

    /// Registry with `"default"` (photo card) and `"plain"` (flat card).
    pub fn with_builtins() -> Self {
        let mut reg = Self::empty();
        reg.register(DEFAULT_RENDERER, LayoutRenderer::new(DefaultLayout));
        reg.register("plain", LayoutRenderer::new(PlainLayout));
        reg
    }

    /// Add or replace the renderer stored under `name`.
    pub fn register(&mut self, name: impl Into<String>, renderer: impl CardRenderer + 'static) {
        self.renderers.insert(name.into(), Arc::new(renderer));
    }

    pub fn get(&self, name: &str) -> CardResult<Arc<dyn CardRenderer>> {
        self.renderers.get(name).cloned().ok_or_else(|| {
            CardError::validation(format!(
                "unknown renderer '{name}' (available: {})",
                self.names().collect::<Vec<_>>().join(", ")
            ))
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.renderers.keys().map(String::as_str)
    }
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/strategy.rs"]
mod tests;
