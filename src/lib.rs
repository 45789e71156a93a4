//! ogcard generates social preview cards for web pages.
//!
//! A card request names a page path. The page is fetched from the site that serves it, its
//! metadata is extracted, and a 1200x628 JPEG is laid out, rasterized on the CPU and cached on
//! disk by path:
//!
//! - [`meta`] reads titles, descriptions and image candidates out of raw HTML
//! - [`layout`] turns metadata into an ordered [`LayoutPlan`]
//! - [`render`] paints plans and encodes JPEG, behind the [`CardRenderer`] strategy trait
//! - [`pipeline`] ties fetch, cache and render together in [`CardService`]
//! - [`server`] exposes the service over HTTP
#![forbid(unsafe_code)]

mod foundation;

pub mod assets;
pub mod cache;
pub mod config;
pub mod fetch;
pub mod layout;
pub mod meta;
pub mod pipeline;
pub mod render;
pub mod server;
pub mod text;

pub use crate::foundation::core::{Canvas, Rect, Rgba8};
pub use crate::foundation::error::{CardError, CardResult};

pub use crate::cache::store::{CacheStatus, CardCache, cache_key};
pub use crate::config::settings::CardConfig;
pub use crate::fetch::page::{HttpFetcher, PageFetcher};
pub use crate::layout::plan::{Drawable, LayoutPlan, TextRole};
pub use crate::meta::extract::{PageMetadata, extract};
pub use crate::pipeline::service::{CardImage, CardService, PreparedPage};
pub use crate::render::strategy::{CardContext, CardRenderer, RendererRegistry};
pub use crate::text::fonts::{FontBook, FontDescriptor};
