use std::f64::consts::TAU;

use folio_engine::effects::eggs::RAIN_GLYPHS;
use folio_engine::{DrawInstance, Shape};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

fn rgba(i: &DrawInstance, alpha: f32) -> String {
    format!(
        "rgba({}, {}, {}, {:.3})",
        (i.r.clamp(0.0, 1.0) * 255.0).round() as u8,
        (i.g.clamp(0.0, 1.0) * 255.0).round() as u8,
        (i.b.clamp(0.0, 1.0) * 255.0).round() as u8,
        alpha.clamp(0.0, 1.0),
    )
}

/// Paints a sorted draw buffer onto a full-screen 2D canvas.
pub struct CanvasPainter {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    glyphs: Vec<String>,
    width: f64,
    height: f64,
}

impl CanvasPainter {
    /// `None` when the browser cannot give us a 2D context.
    pub fn attach(canvas: HtmlCanvasElement) -> Option<Self> {
        let ctx = match canvas.get_context("2d") {
            Ok(Some(obj)) => obj.dyn_into::<CanvasRenderingContext2d>().ok()?,
            _ => {
                log::warn!("2d context unavailable, canvas renderer disabled");
                return None;
            }
        };
        Some(Self {
            width: canvas.width() as f64,
            height: canvas.height() as f64,
            canvas,
            ctx,
            glyphs: RAIN_GLYPHS.chars().map(String::from).collect(),
        })
    }

    /// Match the backing store to the viewport. Existing particles are untouched.
    pub fn resize(&mut self, width: f64, height: f64) {
        if width == self.width && height == self.height {
            return;
        }
        self.width = width;
        self.height = height;
        self.canvas.set_width(width.max(0.0) as u32);
        self.canvas.set_height(height.max(0.0) as u32);
    }

    pub fn paint(&self, instances: &[DrawInstance]) -> Result<(), JsValue> {
        self.ctx.clear_rect(0.0, 0.0, self.width, self.height);
        for instance in instances {
            match instance.shape() {
                Some(Shape::Dot) => self.dot(instance)?,
                Some(Shape::Bubble) => self.bubble(instance)?,
                Some(Shape::Ray) => self.ray(instance)?,
                Some(Shape::Glow) => self.glow(instance)?,
                Some(Shape::Glyph) => self.glyph(instance)?,
                Some(Shape::Ring) => self.ring(instance)?,
                None => {}
            }
        }
        self.ctx.set_global_alpha(1.0);
        Ok(())
    }

    fn dot(&self, i: &DrawInstance) -> Result<(), JsValue> {
        self.ctx.begin_path();
        self.ctx.arc(i.x as f64, i.y as f64, i.size.max(0.0) as f64, 0.0, TAU)?;
        self.ctx.set_fill_style_str(&rgba(i, i.alpha));
        self.ctx.fill();
        Ok(())
    }

    fn bubble(&self, i: &DrawInstance) -> Result<(), JsValue> {
        let (x, y, r) = (i.x as f64, i.y as f64, i.size.max(0.0) as f64);
        self.ctx.begin_path();
        self.ctx.arc(x, y, r, 0.0, TAU)?;
        self.ctx.set_fill_style_str(&rgba(i, i.alpha * 0.15));
        self.ctx.fill();
        self.ctx.set_stroke_style_str(&rgba(i, i.alpha * 0.6));
        self.ctx.set_line_width(1.0);
        self.ctx.stroke();
        // Highlight
        self.ctx.begin_path();
        self.ctx.arc(x - r * 0.3, y - r * 0.3, r * 0.25, 0.0, TAU)?;
        self.ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {:.3})", i.alpha * 0.5));
        self.ctx.fill();
        Ok(())
    }

    fn ray(&self, i: &DrawInstance) -> Result<(), JsValue> {
        self.ctx.save();
        self.ctx.translate(i.x as f64, i.y as f64)?;
        self.ctx.rotate(i.rotation as f64)?;
        let gradient = self.ctx.create_linear_gradient(0.0, 0.0, 0.0, i.extent as f64);
        gradient.add_color_stop(0.0, &rgba(i, i.alpha))?;
        gradient.add_color_stop(1.0, &rgba(i, 0.0))?;
        self.ctx.set_fill_style_canvas_gradient(&gradient);
        let half = i.size as f64 * 0.5;
        self.ctx.fill_rect(-half, 0.0, i.size as f64, i.extent as f64);
        self.ctx.restore();
        Ok(())
    }

    fn glow(&self, i: &DrawInstance) -> Result<(), JsValue> {
        let (x, y, r) = (i.x as f64, i.y as f64, i.size.max(0.0) as f64);
        let gradient = self.ctx.create_radial_gradient(x, y, 0.0, x, y, r)?;
        gradient.add_color_stop(0.0, &rgba(i, i.alpha))?;
        gradient.add_color_stop(1.0, &rgba(i, 0.0))?;
        self.ctx.set_fill_style_canvas_gradient(&gradient);
        self.ctx.fill_rect(x - r, y - r, r * 2.0, r * 2.0);
        Ok(())
    }

    fn glyph(&self, i: &DrawInstance) -> Result<(), JsValue> {
        let Some(glyph) = self.glyphs.get(i.extent.max(0.0) as usize) else {
            return Ok(());
        };
        self.ctx.set_font(&format!("{}px monospace", i.size));
        self.ctx.set_fill_style_str(&rgba(i, i.alpha));
        self.ctx.fill_text(glyph, i.x as f64, i.y as f64)
    }

    fn ring(&self, i: &DrawInstance) -> Result<(), JsValue> {
        self.ctx.begin_path();
        self.ctx.arc(i.x as f64, i.y as f64, i.size.max(0.0) as f64, 0.0, TAU)?;
        self.ctx.set_stroke_style_str(&rgba(i, i.alpha));
        self.ctx.set_line_width(i.extent.max(0.5) as f64);
        self.ctx.stroke();
        Ok(())
    }
}
