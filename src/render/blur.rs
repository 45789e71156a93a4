//! Background softening for card photos.
//!
//! The photo layer carries a relative blur amount; the kernel radius follows from the size the
//! photo is drawn at, so the same amount looks alike on every canvas size.

/// Largest radius a blur amount of `1.0` maps to, as a fraction of the shorter image side.
const MAX_RADIUS_FRACTION: f32 = 0.05;

/// Convert a relative blur amount (`0..=1`) into a kernel radius for a `width x height` image.
pub fn radius_for_amount(amount: f32, width: u32, height: u32) -> u32 {
    if !amount.is_finite() || amount <= 0.0 {
        return 0;
    }
    let short_side = width.min(height) as f32;
    (amount.min(1.0) * MAX_RADIUS_FRACTION * short_side).round() as u32
}

/// Blur premultiplied RGBA8 `pixels` in place, rows `width` pixels wide, by a relative `amount`.
///
/// Edges repeat the outermost pixel, so a solid photo keeps its color up to the border.
pub fn soften(pixels: &mut [u8], width: u32, amount: f32) {
    let row_len = width as usize * 4;
    if row_len == 0 {
        return;
    }
    let height = pixels.len() / row_len;
    let radius = radius_for_amount(amount, width, height as u32);
    if radius == 0 || height == 0 {
        return;
    }
    let kernel = gaussian_weights(radius);
    let pixels = &mut pixels[..row_len * height];

    let mut line = vec![0u8; row_len.max(height * 4)];

    for row in pixels.chunks_exact_mut(row_len) {
        let src = &mut line[..row_len];
        src.copy_from_slice(row);
        convolve_line(src, row, 4, &kernel);
    }

    for x in 0..width as usize {
        let src = &mut line[..height * 4];
        for (y, px) in src.chunks_exact_mut(4).enumerate() {
            let at = y * row_len + x * 4;
            px.copy_from_slice(&pixels[at..at + 4]);
        }
        convolve_line(src, &mut pixels[x * 4..], row_len, &kernel);
    }
}

/// Normalized gaussian taps for `radius`, with sigma at half the radius.
fn gaussian_weights(radius: u32) -> Vec<f32> {
    let sigma = radius as f32 / 2.0;
    let denom = 2.0 * sigma * sigma;
    let r = radius as i32;
    let mut weights: Vec<f32> = (-r..=r)
        .map(|i| (-((i * i) as f32) / denom).exp())
        .collect();
    let total: f32 = weights.iter().sum();
    for w in &mut weights {
        *w /= total;
    }
    weights
}

/// Convolve one packed line of pixels. Output pixel `i` is written at `dst[i * stride..]`.
fn convolve_line(src: &[u8], dst: &mut [u8], stride: usize, kernel: &[f32]) {
    let count = src.len() / 4;
    let radius = kernel.len() / 2;
    for i in 0..count {
        let mut acc = [0.0f32; 4];
        for (k, &w) in kernel.iter().enumerate() {
            let j = (i + k).saturating_sub(radius).min(count - 1);
            for (a, &v) in acc.iter_mut().zip(&src[j * 4..j * 4 + 4]) {
                *a += w * f32::from(v);
            }
        }
        let out = &mut dst[i * stride..i * stride + 4];
        for (o, a) in out.iter_mut().zip(acc) {
            *o = a.round().clamp(0.0, 255.0) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/blur.rs"]
mod tests;
