//! Canvas 2D backend
//!
//! Executes a display list on a `CanvasRenderingContext2d`. Images load lazily
//! from `assets/<name>.png`; until one is decoded (or if it fails) the sprite's
//! fallback color is drawn instead.

use std::collections::HashMap;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use glam::Vec2;
use web_sys::{CanvasGradient, CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use super::shapes::{Color, DrawCmd, css_color};
use crate::sim::Aabb;

const FONT_FAMILY: &str = "system-ui, -apple-system, Segoe UI, Roboto";

pub struct CanvasRenderer {
    ctx: CanvasRenderingContext2d,
    images: HashMap<String, HtmlImageElement>,
    asset_root: String,
    /// Device pixels per CSS pixel
    scale: f64,
}

impl CanvasRenderer {
    /// `None` when the canvas has no 2d context
    pub fn new(canvas: &HtmlCanvasElement, asset_root: &str, scale: f64) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(Self {
            ctx,
            images: HashMap::new(),
            asset_root: asset_root.trim_end_matches('/').to_string(),
            scale,
        })
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    /// Decoded image for `asset`, starting the load on first request
    fn image(&mut self, asset: &str) -> Option<&HtmlImageElement> {
        if asset.is_empty() {
            return None;
        }
        if !self.images.contains_key(asset) {
            let img = HtmlImageElement::new().ok()?;
            let name = asset.to_string();
            let on_error = Closure::<dyn FnMut()>::new(move || {
                log::warn!("Asset '{}' failed to load; drawing fallback", name);
            });
            img.set_onerror(Some(on_error.as_ref().unchecked_ref()));
            on_error.forget();
            img.set_src(&format!("{}/{}.png", self.asset_root, asset));
            self.images.insert(asset.to_string(), img);
        }
        self.images
            .get(asset)
            .filter(|img| img.complete() && img.natural_width() > 0)
    }

    fn fill(&self, rect: &Aabb, color: Color) {
        self.ctx.set_fill_style_str(&css_color(color));
        self.ctx.fill_rect(
            rect.min.x as f64,
            rect.min.y as f64,
            rect.width() as f64,
            rect.height() as f64,
        );
    }

    fn vertical_gradient(&self, y0: f32, y1: f32, top: Color, bottom: Color) -> CanvasGradient {
        let gradient = self
            .ctx
            .create_linear_gradient(0.0, y0 as f64, 0.0, y1 as f64);
        let _ = gradient.add_color_stop(0.0, &css_color(top));
        let _ = gradient.add_color_stop(1.0, &css_color(bottom));
        gradient
    }

    fn trace(&self, points: &[Vec2]) {
        for (i, p) in points.iter().enumerate() {
            if i == 0 {
                self.ctx.move_to(p.x as f64, p.y as f64);
            } else {
                self.ctx.line_to(p.x as f64, p.y as f64);
            }
        }
    }

    fn grid(&self, rect: &Aabb, spacing: f32, color: Color) {
        if !(spacing > 0.0) {
            return;
        }
        self.ctx.set_stroke_style_str(&css_color(color));
        self.ctx.set_line_width(1.0);
        self.ctx.begin_path();
        let mut x = rect.min.x;
        while x <= rect.max.x {
            self.ctx.move_to(x as f64, rect.min.y as f64);
            self.ctx.line_to(x as f64, rect.max.y as f64);
            x += spacing;
        }
        let mut y = rect.min.y;
        while y <= rect.max.y {
            self.ctx.move_to(rect.min.x as f64, y as f64);
            self.ctx.line_to(rect.max.x as f64, y as f64);
            y += spacing;
        }
        self.ctx.stroke();
    }

    pub fn draw(&mut self, cmds: &[DrawCmd]) {
        let _ = self
            .ctx
            .set_transform(self.scale, 0.0, 0.0, self.scale, 0.0, 0.0);
        self.ctx.set_global_alpha(1.0);

        for cmd in cmds {
            match cmd {
                DrawCmd::Gradient { rect, top, bottom } => {
                    let gradient = self.vertical_gradient(rect.min.y, rect.max.y, *top, *bottom);
                    self.ctx.set_fill_style_canvas_gradient(&gradient);
                    self.ctx.fill_rect(
                        rect.min.x as f64,
                        rect.min.y as f64,
                        rect.width() as f64,
                        rect.height() as f64,
                    );
                }
                DrawCmd::Rect { rect, color } => self.fill(rect, *color),
                DrawCmd::Grid {
                    rect,
                    spacing,
                    color,
                } => self.grid(rect, *spacing, *color),
                DrawCmd::Line {
                    points,
                    width,
                    color,
                    glow,
                    blur,
                } => {
                    self.ctx.save();
                    self.ctx.begin_path();
                    self.trace(points);
                    self.ctx.set_line_width(*width as f64);
                    self.ctx.set_shadow_color(&css_color(*glow));
                    self.ctx.set_shadow_blur(*blur as f64);
                    self.ctx.set_stroke_style_str(&css_color(*color));
                    self.ctx.stroke();
                    self.ctx.restore();
                }
                DrawCmd::Area {
                    points,
                    baseline,
                    top,
                    bottom,
                } => {
                    let (Some(first), Some(last)) = (points.first(), points.last()) else {
                        continue;
                    };
                    self.ctx.begin_path();
                    self.trace(points);
                    self.ctx.line_to(last.x as f64, *baseline as f64);
                    self.ctx.line_to(first.x as f64, *baseline as f64);
                    self.ctx.close_path();
                    let gradient = self.vertical_gradient(0.0, *baseline, *top, *bottom);
                    self.ctx.set_fill_style_canvas_gradient(&gradient);
                    self.ctx.fill();
                }
                DrawCmd::Sprite {
                    asset,
                    rect,
                    fallback,
                    alpha,
                    angle,
                } => {
                    let (w, h) = (rect.width() as f64, rect.height() as f64);
                    let center = (rect.min + rect.max) / 2.0;
                    self.ctx.save();
                    self.ctx.set_global_alpha(*alpha as f64);
                    let _ = self.ctx.translate(center.x as f64, center.y as f64);
                    let _ = self.ctx.rotate(*angle as f64);
                    match self.image(asset).cloned() {
                        Some(img) => {
                            let _ = self
                                .ctx
                                .draw_image_with_html_image_element_and_dw_and_dh(
                                    &img,
                                    -w / 2.0,
                                    -h / 2.0,
                                    w,
                                    h,
                                );
                        }
                        None => {
                            let local = Aabb::from_origin_size(
                                -rect.width() / 2.0,
                                -rect.height() / 2.0,
                                rect.width(),
                                rect.height(),
                            );
                            self.fill(&local, *fallback);
                        }
                    }
                    self.ctx.restore();
                }
                DrawCmd::Text {
                    text,
                    pos,
                    size,
                    bold,
                    color,
                } => {
                    let weight = if *bold { "bold " } else { "" };
                    self.ctx
                        .set_font(&format!("{}{}px {}", weight, size, FONT_FAMILY));
                    self.ctx.set_text_align("center");
                    self.ctx.set_fill_style_str(&css_color(*color));
                    let _ = self.ctx.fill_text(text, pos.x as f64, pos.y as f64);
                }
            }
        }
    }
}
