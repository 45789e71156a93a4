/// Background image lookup under the public directory.
pub mod background;
/// Raster decoding into premultiplied RGBA8.
pub mod decode;
