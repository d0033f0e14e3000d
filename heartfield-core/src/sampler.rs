//! Target point generation.
//!
//! Text labels are rasterized by a host-provided [`GlyphRasterizer`] into an
//! [`AlphaMask`], which is scanned on a coarse grid for opaque cells. The
//! heart comes from the parametric curve
//! `x = 16 sin³t`, `y = 13 cos t − 5 cos 2t − 2 cos 3t − cos 4t`.
//!
//! Every public sampler returns exactly `count` points.

use crate::config::{FieldConfig, HeartStyle, TextSampling};
use crate::math;
use crate::rng::RandomSource;
use crate::Vector2D;
use alloc::vec::Vec;
use core::f32::consts::TAU;
use heartfield_shared::TargetLabel;

/// Coverage bitmap produced by a rasterizer, one alpha byte per pixel, row-major
#[derive(Debug, Clone, PartialEq)]
pub struct AlphaMask {
    width: usize,
    height: usize,
    alpha: Vec<u8>,
}

impl AlphaMask {
    /// Fully transparent mask
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            alpha: alloc::vec![0; width * height],
        }
    }

    /// Take the alpha channel of an RGBA8 buffer. Returns `None` when the
    /// buffer length does not match the dimensions.
    pub fn from_rgba(width: usize, height: usize, rgba: &[u8]) -> Option<Self> {
        if rgba.len() != width * height * 4 {
            return None;
        }
        let alpha = rgba.chunks_exact(4).map(|px| px[3]).collect();
        Some(Self {
            width,
            height,
            alpha,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Out-of-range coordinates read as transparent
    pub fn get(&self, x: usize, y: usize) -> u8 {
        if x < self.width && y < self.height {
            self.alpha[y * self.width + x]
        } else {
            0
        }
    }

    /// Out-of-range writes are dropped
    pub fn set(&mut self, x: usize, y: usize, alpha: u8) {
        if x < self.width && y < self.height {
            self.alpha[y * self.width + x] = alpha;
        }
    }

    /// Fill the `size`×`size` block whose top-left corner is at (x, y), clipped
    pub fn fill_block(&mut self, x: i64, y: i64, size: usize, alpha: u8) {
        for dy in 0..size as i64 {
            for dx in 0..size as i64 {
                let (px, py) = (x + dx, y + dy);
                if px >= 0 && py >= 0 {
                    self.set(px as usize, py as usize, alpha);
                }
            }
        }
    }
}

/// Host capability that draws text into an offscreen bitmap.
///
/// Implementations center `text` in a `width`×`height` mask using a bold
/// face of roughly `font_px` pixels. Returning `None` means offscreen
/// rendering is unavailable; the sampler then falls back to the heart.
pub trait GlyphRasterizer {
    fn rasterize(&mut self, text: &str, width: u32, height: u32, font_px: f32) -> Option<AlphaMask>;
}

/// Rasterizer for hosts with no text rendering at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRasterizer;

impl GlyphRasterizer for NoRasterizer {
    fn rasterize(
        &mut self,
        _text: &str,
        _width: u32,
        _height: u32,
        _font_px: f32,
    ) -> Option<AlphaMask> {
        None
    }
}

/// Point on the heart curve in curve units, y pointing up
pub fn heart_curve(t: f32) -> Vector2D {
    let s = math::sin(t);
    let x = 16.0 * s * s * s;
    let y = 13.0 * math::cos(t)
        - 5.0 * math::cos(2.0 * t)
        - 2.0 * math::cos(3.0 * t)
        - math::cos(4.0 * t);
    Vector2D::new(x, y)
}

/// Where curve point `p` lands on screen for a heart scaled by `scale`
pub fn heart_to_screen(
    p: Vector2D,
    width: f32,
    height: f32,
    scale: f32,
    config: &FieldConfig,
) -> Vector2D {
    let center = heart_center(width, height, config);
    Vector2D::new(center.x + p.x * scale, center.y - p.y * scale)
}

pub fn heart_center(width: f32, height: f32, config: &FieldConfig) -> Vector2D {
    Vector2D::new(width / 2.0, height / 2.0 + config.heart_offset_y)
}

/// Curve units to pixels for this viewport
pub fn heart_scale(width: f32, height: f32, config: &FieldConfig) -> f32 {
    width.min(height) * config.heart_scale
}

/// One outline: `count` points evenly spaced over a single turn, starting at t = 0
pub fn simple_heart_targets(
    width: f32,
    height: f32,
    count: usize,
    config: &FieldConfig,
) -> Vec<Vector2D> {
    let scale = heart_scale(width, height, config);
    (0..count)
        .map(|i| {
            let t = i as f32 / count as f32 * TAU;
            heart_to_screen(heart_curve(t), width, height, scale, config)
        })
        .collect()
}

/// Concentric outlines. Point `i` belongs to layer `i mod layers.len()` while
/// t sweeps `layers.len()` full turns across the set, so every layer gets
/// points spread around its whole outline. Each point is nudged diagonally by
/// a single jitter draw shared by both axes.
pub fn layered_heart_targets<R: RandomSource>(
    width: f32,
    height: f32,
    count: usize,
    layers: &[f32],
    jitter: f32,
    config: &FieldConfig,
    rng: &mut R,
) -> Vec<Vector2D> {
    if layers.is_empty() {
        return simple_heart_targets(width, height, count, config);
    }

    let base_scale = heart_scale(width, height, config);
    let turns = layers.len() as f32;
    (0..count)
        .map(|i| {
            let layer = layers[i % layers.len()];
            let t = (i + 1) as f32 / count as f32 * TAU * turns;
            let point = heart_to_screen(heart_curve(t), width, height, base_scale * layer, config);
            let nudge = rng.centered(jitter);
            point + Vector2D::new(nudge, nudge)
        })
        .collect()
}

pub fn heart_targets<R: RandomSource>(
    width: f32,
    height: f32,
    count: usize,
    config: &FieldConfig,
    rng: &mut R,
) -> Vec<Vector2D> {
    match &config.heart_style {
        HeartStyle::Simple => simple_heart_targets(width, height, count, config),
        HeartStyle::Layered { layers, jitter } => {
            layered_heart_targets(width, height, count, layers, *jitter, config, rng)
        }
    }
}

/// Font size for the viewport width, clamped
pub fn font_size(width: f32, text: &TextSampling) -> f32 {
    (width * text.font_scale).clamp(text.min_font_px, text.max_font_px)
}

/// Grid step for the bitmap scan; coarser on wider viewports
pub fn sampling_stride(width: f32, text: &TextSampling) -> usize {
    let stride = if text.stride_divisor > 0.0 {
        math::floor(width / text.stride_divisor).max(0.0) as usize
    } else {
        0
    };
    stride.max(text.min_stride).max(1)
}

/// Every grid cell whose alpha exceeds `threshold`, in scan order
pub fn opaque_points(mask: &AlphaMask, stride: usize, threshold: u8) -> Vec<Vector2D> {
    let stride = stride.max(1);
    let mut points = Vec::new();
    for y in (0..mask.height()).step_by(stride) {
        for x in (0..mask.width()).step_by(stride) {
            if mask.get(x, y) > threshold {
                points.push(Vector2D::new(x as f32, y as f32));
            }
        }
    }
    points
}

/// Cycle through `points` until `count` are produced. Empty input yields an empty set.
pub fn cycle_points(points: &[Vector2D], count: usize) -> Vec<Vector2D> {
    if points.is_empty() {
        return Vec::new();
    }
    points.iter().copied().cycle().take(count).collect()
}

/// Targets spelling `text`, or the heart when the text cannot be rendered
pub fn text_targets<G: GlyphRasterizer, R: RandomSource>(
    text: &str,
    width: f32,
    height: f32,
    count: usize,
    config: &FieldConfig,
    rasterizer: &mut G,
    rng: &mut R,
) -> Vec<Vector2D> {
    let font_px = font_size(width, &config.text);
    let mask = match rasterizer.rasterize(text, width as u32, height as u32, font_px) {
        Some(mask) => mask,
        None => {
            log::warn!("text rendering unavailable, showing heart instead of {:?}", text);
            return heart_targets(width, height, count, config, rng);
        }
    };

    let stride = sampling_stride(width, &config.text);
    let points = opaque_points(&mask, stride, config.text.alpha_threshold);
    if points.is_empty() {
        log::warn!("{:?} rendered no visible pixels, showing heart instead", text);
        return heart_targets(width, height, count, config, rng);
    }

    log::debug!(
        "sampled {} opaque cells for {:?} (stride {}, font {}px)",
        points.len(),
        text,
        stride,
        font_px
    );
    cycle_points(&points, count)
}

/// Target set for `label`, always exactly `count` points long
pub fn sample_targets<G: GlyphRasterizer, R: RandomSource>(
    label: &TargetLabel,
    width: f32,
    height: f32,
    count: usize,
    config: &FieldConfig,
    rasterizer: &mut G,
    rng: &mut R,
) -> Vec<Vector2D> {
    if count == 0 {
        return Vec::new();
    }
    match label {
        TargetLabel::Heart => heart_targets(width, height, count, config, rng),
        TargetLabel::Text(text) => {
            text_targets(text, width, height, count, config, rasterizer, rng)
        }
    }
}
