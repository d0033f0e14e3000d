//! Headless host for the particle scene.
//!
//! Renders text with an embedded bitmap font and draws frames into an RGBA
//! image so the engine can run and be inspected without a browser.

use anyhow::{Context, Result};
use embedded_graphics::{
    mono_font::{iso_8859_1::FONT_9X18_BOLD, MonoFont, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};
use heartfield_core::{AlphaMask, Color, GlyphRasterizer, RandomSource, Scene, Surface, Vector2D};
use heartfield_shared::PhraseSequence;
use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};

/// Simulated display refresh rate
pub const FRAMES_PER_SECOND: f64 = 60.0;

/// Draws text with a monospace bitmap font, scaled up in whole-pixel blocks
pub struct MonoFontRasterizer {
    font: &'static MonoFont<'static>,
}

impl MonoFontRasterizer {
    pub fn new() -> Self {
        Self {
            font: &FONT_9X18_BOLD,
        }
    }

    /// Integer block size that brings the font closest to `font_px`
    pub fn scale_for(&self, font_px: f32) -> u32 {
        let glyph_height = self.font.character_size.height as f32;
        ((font_px / glyph_height).round() as u32).max(1)
    }
}

impl Default for MonoFontRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Draw target that writes each font pixel as a `scale`×`scale` block of the mask
struct ScaledMask<'a> {
    mask: &'a mut AlphaMask,
    origin: (i64, i64),
    scale: u32,
    glyph_area: Size,
}

impl DrawTarget for ScaledMask<'_> {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let scale = self.scale as i64;
        for Pixel(point, color) in pixels {
            if color.is_on() {
                self.mask.fill_block(
                    self.origin.0 + point.x as i64 * scale,
                    self.origin.1 + point.y as i64 * scale,
                    self.scale as usize,
                    255,
                );
            }
        }
        Ok(())
    }
}

impl OriginDimensions for ScaledMask<'_> {
    fn size(&self) -> Size {
        self.glyph_area
    }
}

impl GlyphRasterizer for MonoFontRasterizer {
    fn rasterize(
        &mut self,
        text: &str,
        width: u32,
        height: u32,
        font_px: f32,
    ) -> Option<AlphaMask> {
        if width == 0 || height == 0 {
            return None;
        }

        let scale = self.scale_for(font_px);
        let advance = self.font.character_size.width + self.font.character_spacing;
        let glyph_area = Size::new(
            advance * text.chars().count() as u32,
            self.font.character_size.height,
        );
        let origin = (
            (width as i64 - (glyph_area.width * scale) as i64) / 2,
            (height as i64 - (glyph_area.height * scale) as i64) / 2,
        );

        let mut mask = AlphaMask::new(width as usize, height as usize);
        let mut target = ScaledMask {
            mask: &mut mask,
            origin,
            scale,
            glyph_area,
        };
        let style = MonoTextStyle::new(self.font, BinaryColor::On);
        Text::with_baseline(text, Point::zero(), style, Baseline::Top)
            .draw(&mut target)
            .ok()?;

        Some(mask)
    }
}

/// Frame buffer over an opaque black page
pub struct ImageSurface {
    image: RgbaImage,
}

impl ImageSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255])),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Count of pixels that are not pure black
    pub fn lit_pixels(&self) -> usize {
        self.image
            .pixels()
            .filter(|px| px.0[0] > 0 || px.0[1] > 0 || px.0[2] > 0)
            .count()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.image
            .save(path)
            .with_context(|| format!("Failed to write frame to {}", path.display()))
    }

    fn blend(&mut self, x: u32, y: u32, color: Color, alpha: f32) {
        let px = self.image.get_pixel_mut(x, y);
        let mix = |dst: u8, src: u8| -> u8 {
            (dst as f32 + (src as f32 - dst as f32) * alpha).round().clamp(0.0, 255.0) as u8
        };
        px.0 = [
            mix(px.0[0], color.r),
            mix(px.0[1], color.g),
            mix(px.0[2], color.b),
            255,
        ];
    }
}

impl Surface for ImageSurface {
    fn clear(&mut self) {
        for px in self.image.pixels_mut() {
            *px = Rgba([0, 0, 0, 255]);
        }
    }

    fn fade(&mut self, alpha: f32) {
        let keep = (1.0 - alpha).clamp(0.0, 1.0);
        for px in self.image.pixels_mut() {
            for channel in px.0.iter_mut().take(3) {
                *channel = (*channel as f32 * keep) as u8;
            }
        }
    }

    fn fill_circle(&mut self, center: Vector2D, radius: f32, color: Color, alpha: f32) {
        let (width, height) = self.image.dimensions();
        let reach = radius + 0.5;
        let min_x = (center.x - reach).floor().max(0.0) as i64;
        let min_y = (center.y - reach).floor().max(0.0) as i64;
        let max_x = ((center.x + reach).ceil() as i64).min(width as i64 - 1);
        let max_y = ((center.y + reach).ceil() as i64).min(height as i64 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let pixel_center = Vector2D::new(x as f32 + 0.5, y as f32 + 0.5);
                // one pixel of soft edge so sub-pixel particles still show up
                let coverage = (reach - pixel_center.distance(&center)).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(x as u32, y as u32, color, alpha * coverage);
                }
            }
        }
    }
}

/// Options for a headless run
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub width: u32,
    pub height: u32,
    pub frames: u32,
    /// Write a PNG every this many frames; 0 disables snapshots
    pub snapshot_every: u32,
    pub out_dir: Option<PathBuf>,
}

/// Drive `scene` through `sequence` at a simulated 60 Hz.
///
/// Returns the paths of written snapshots along with the final frame.
pub fn run_sequence<G: GlyphRasterizer, R: RandomSource>(
    scene: &mut Scene<G, R>,
    sequence: &PhraseSequence,
    options: &RunOptions,
) -> Result<(Vec<PathBuf>, ImageSurface)> {
    let mut surface = ImageSurface::new(options.width, options.height);
    let mut written = Vec::new();

    if let Some(dir) = &options.out_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    }

    scene.set_label(sequence.initial_label());
    scene.start(options.width as f32, options.height as f32);
    if !scene.is_running() {
        anyhow::bail!(
            "Scene could not start at {}x{}",
            options.width,
            options.height
        );
    }

    for frame in 0..options.frames {
        let elapsed_ms = frame as f64 * 1000.0 / FRAMES_PER_SECOND;
        let label = sequence.label_at(elapsed_ms);
        if &label != scene.label() {
            log::info!("t={:.0}ms: {}", elapsed_ms, label.as_str());
            scene.set_label(label);
        }

        scene.frame(&mut surface);

        if let Some(dir) = &options.out_dir {
            if options.snapshot_every > 0 && (frame + 1) % options.snapshot_every == 0 {
                let path = dir.join(format!("frame_{:05}.png", frame + 1));
                surface.save(&path)?;
                log::debug!("Wrote {}", path.display());
                written.push(path);
            }
        }
    }

    scene.stop();
    Ok((written, surface))
}
