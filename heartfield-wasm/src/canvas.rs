use heartfield_core::{AlphaMask, Color, GlyphRasterizer, Surface, Vector2D};
use std::f64::consts::TAU;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement};

/// Renders frames into a 2D canvas context
pub struct CanvasSurface<'a> {
    context: &'a CanvasRenderingContext2d,
    width: f64,
    height: f64,
}

impl<'a> CanvasSurface<'a> {
    pub fn new(context: &'a CanvasRenderingContext2d, width: f64, height: f64) -> Self {
        Self {
            context,
            width,
            height,
        }
    }
}

impl Surface for CanvasSurface<'_> {
    fn clear(&mut self) {
        self.context.clear_rect(0.0, 0.0, self.width, self.height);
    }

    fn fade(&mut self, alpha: f32) {
        self.context
            .set_fill_style_str(&format!("rgba(0, 0, 0, {})", alpha));
        self.context.fill_rect(0.0, 0.0, self.width, self.height);
    }

    fn fill_circle(&mut self, center: Vector2D, radius: f32, color: Color, alpha: f32) {
        self.context.set_global_alpha(alpha as f64);
        self.context.set_fill_style_str(&color.to_string());
        self.context.begin_path();
        if self
            .context
            .arc(center.x as f64, center.y as f64, radius as f64, 0.0, TAU)
            .is_ok()
        {
            self.context.fill();
        }
        self.context.set_global_alpha(1.0);
    }
}

/// Draws labels on a throwaway canvas and reads back its alpha channel
pub struct OffscreenTextRasterizer {
    document: Option<Document>,
}

impl OffscreenTextRasterizer {
    pub fn new(document: Option<Document>) -> Self {
        Self { document }
    }

    fn render(
        &self,
        text: &str,
        width: u32,
        height: u32,
        font_px: f32,
    ) -> Result<Option<AlphaMask>, JsValue> {
        let Some(document) = &self.document else {
            return Ok(None);
        };
        if width == 0 || height == 0 {
            return Ok(None);
        }

        let canvas = document
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()?;
        canvas.set_width(width);
        canvas.set_height(height);

        let Some(context) = canvas.get_context("2d")? else {
            return Ok(None);
        };
        let context = context.dyn_into::<CanvasRenderingContext2d>()?;

        let (w, h) = (width as f64, height as f64);
        context.clear_rect(0.0, 0.0, w, h);
        context.set_fill_style_str("#fff");
        context.set_text_align("center");
        context.set_text_baseline("middle");
        context.set_font(&format!("700 {}px system-ui, sans-serif", font_px));
        context.fill_text(text, w / 2.0, h / 2.0)?;

        let image_data = context.get_image_data(0.0, 0.0, w, h)?;
        let pixels = image_data.data();
        Ok(AlphaMask::from_rgba(width as usize, height as usize, &pixels.0))
    }
}

impl GlyphRasterizer for OffscreenTextRasterizer {
    fn rasterize(
        &mut self,
        text: &str,
        width: u32,
        height: u32,
        font_px: f32,
    ) -> Option<AlphaMask> {
        match self.render(text, width, height, font_px) {
            Ok(mask) => mask,
            Err(err) => {
                log::warn!("offscreen text rendering failed: {:?}", err);
                None
            }
        }
    }
}
