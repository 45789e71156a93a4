use std::sync::Arc;

use anyhow::Context;

use crate::assets::background::prepare_background;
use crate::assets::decode::PreparedImage;
use crate::cache::store::{BootstrapReport, CacheStatus, CardCache, cache_key};
use crate::config::settings::CardConfig;
use crate::fetch::page::{HttpFetcher, PageFetcher};
use crate::foundation::core::Canvas;
use crate::foundation::error::{CardError, CardResult};
use crate::layout::plan::LayoutPlan;
use crate::meta::extract::{PageMetadata, extract};
use crate::render::strategy::{CardContext, CardRenderer, RendererRegistry};
use crate::text::fonts::FontBook;

/// Host used for the page fetch when the card request carries no `Host` header.
pub const DEFAULT_HOST: &str = "127.0.0.1:3000";

pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";

/// An encoded card, ready to send.
#[derive(Clone, Debug)]
pub struct CardImage {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub cache: CacheStatus,
}

/// Result of the one-time startup work.
#[derive(Clone, Debug)]
pub struct InitReport {
    pub fonts: usize,
    pub cache: BootstrapReport,
}

struct Runtime {
    fonts: Arc<FontBook>,
    report: InitReport,
}

/// Turns request paths into card images: cache lookup, page fetch, extraction, render, store.
pub struct CardService {
    config: Arc<CardConfig>,
    canvas: Canvas,
    cache: CardCache,
    fetcher: Arc<dyn PageFetcher>,
    renderer: Arc<dyn CardRenderer>,
    runtime: tokio::sync::OnceCell<Runtime>,
}

impl CardService {
    /// Service with the built-in renderers and an HTTP fetcher.
    pub fn from_config(config: CardConfig) -> CardResult<Self> {
        let fetcher = HttpFetcher::new(config.fetch_timeout())?;
        Self::new(config, &RendererRegistry::with_builtins(), Arc::new(fetcher))
    }

    pub fn new(
        config: CardConfig,
        renderers: &RendererRegistry,
        fetcher: Arc<dyn PageFetcher>,
    ) -> CardResult<Self> {
        config.validate()?;
        let canvas = config.canvas()?;
        let renderer = renderers.get(&config.renderer)?;
        let cache = CardCache::new(config.cache_dir.clone(), config.force_regenerate);
        Ok(Self {
            config: Arc::new(config),
            canvas,
            cache,
            fetcher,
            renderer,
            runtime: tokio::sync::OnceCell::new(),
        })
    }

    pub fn config(&self) -> &CardConfig {
        &self.config
    }

    pub fn cache(&self) -> &CardCache {
        &self.cache
    }

    /// Register fonts and purge the cache directory. Runs once; later calls return the first report.
    pub async fn init(&self) -> &InitReport {
        &self.runtime().await.report
    }

    async fn runtime(&self) -> &Runtime {
        self.runtime
            .get_or_init(|| async {
                let descriptors = self.config.fonts.clone();
                let fonts = match tokio::task::spawn_blocking(move || FontBook::load(&descriptors))
                    .await
                {
                    Ok(book) => book,
                    Err(e) => {
                        tracing::error!(error = %e, "font loading task failed");
                        FontBook::default()
                    }
                };
                if fonts.is_empty() {
                    tracing::warn!("no fonts registered; cards will be rendered without text");
                }
                let cache = self.cache.bootstrap().await;
                let report = InitReport {
                    fonts: fonts.faces().len(),
                    cache,
                };
                tracing::info!(
                    fonts = report.fonts,
                    cache_dir = %self.cache.dir().display(),
                    "card service initialized"
                );
                Runtime {
                    fonts: Arc::new(fonts),
                    report,
                }
            })
            .await
    }

    /// True when `path` points back at the card route.
    pub fn is_card_route(&self, path: &str) -> bool {
        let mount = self.config.mount_path.trim_end_matches('/');
        let target = path.split(['?', '#']).next().unwrap_or(path);
        let target = target.trim_end_matches('/');
        target == mount
            || target
                .strip_prefix(mount)
                .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Card for the page at `path`, from cache when present.
    #[tracing::instrument(skip(self))]
    pub async fn card_for_path(&self, path: &str, host: &str) -> CardResult<CardImage> {
        if path.is_empty() {
            return Err(CardError::validation("path must not be empty"));
        }
        if self.is_card_route(path) {
            tracing::warn!("refusing to render a card of the card route");
            return Err(CardError::validation(format!(
                "path '{path}' targets the card route"
            )));
        }

        // The stale-card purge must finish before the first lookup.
        self.runtime().await;

        let key = cache_key(path);
        let result = self
            .cache
            .get_or_create(&key, || async {
                let html = self.fetcher.fetch_html(host, path).await?;
                self.render_html(html).await
            })
            .await;

        match result {
            Ok(outcome) => {
                tracing::info!(status = ?outcome.status, bytes = outcome.bytes.len(), "card served");
                Ok(CardImage {
                    bytes: outcome.bytes,
                    content_type: JPEG_CONTENT_TYPE,
                    cache: outcome.status,
                })
            }
            Err(e) => {
                tracing::error!(error = %e, "card generation failed");
                Err(e)
            }
        }
    }

    /// Render a card from already-fetched HTML without touching the cache entry.
    pub async fn render_html(&self, html: String) -> CardResult<Vec<u8>> {
        let fonts = self.runtime().await.fonts.clone();
        let config = self.config.clone();
        let renderer = self.renderer.clone();
        let canvas = self.canvas;
        tokio::task::spawn_blocking(move || {
            let page = PreparedPage::from_html(&html, &config);
            renderer.render(&page.meta, &page.context(&config, canvas, &fonts))
        })
        .await
        .context("render task failed")?
    }
}

/// Extracted metadata and decoded background for one page.
pub struct PreparedPage {
    pub meta: PageMetadata,
    pub background: Option<PreparedImage>,
}

impl PreparedPage {
    pub fn from_html(html: &str, config: &CardConfig) -> Self {
        let meta = extract(html);
        let background = prepare_background(&meta.images, &config.public_dir);
        tracing::debug!(
            title = ?meta.clean_title,
            images = meta.images.len(),
            background = background.is_some(),
            "page prepared"
        );
        Self { meta, background }
    }

    pub fn context<'a>(
        &'a self,
        config: &'a CardConfig,
        canvas: Canvas,
        fonts: &'a FontBook,
    ) -> CardContext<'a> {
        CardContext {
            background: self.background.as_ref(),
            canvas,
            fixed_text: &config.fixed_text,
            fonts,
            font_family: config.font_family.as_deref(),
            jpeg_quality: config.jpeg_quality,
        }
    }

    /// Plan the configured renderer would paint, when it exposes one.
    pub fn plan(
        &self,
        renderer: &dyn CardRenderer,
        config: &CardConfig,
        canvas: Canvas,
        fonts: &FontBook,
    ) -> Option<LayoutPlan> {
        renderer.plan(&self.meta, &self.context(config, canvas, fonts))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/service.rs"]
mod tests;
