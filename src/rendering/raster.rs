//! Rasterizer: executes paint commands into an RGBA bitmap.
//!
//! Commands are in logical pixels; the canvas multiplies everything by an
//! integer supersampling factor. Coverage is tested at pixel centers and
//! blending uses integer math, so the same commands always produce the same
//! bytes.

use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use log::warn;

use crate::ingest::EmbeddableImage;
use crate::rendering::layout::{Fill, Rect, TextRun, GLYPH};
use crate::rendering::paint::PaintCommand;
use crate::rendering::palette::Color;
use crate::{Error, Result};

pub struct Canvas {
    img: RgbaImage,
    scale: u32,
}

impl Canvas {
    /// A fully transparent canvas of `width`x`height` logical pixels.
    pub fn new(width: u32, height: u32, scale: u32) -> Self {
        let scale = scale.max(1);
        Self {
            img: RgbaImage::new(width * scale, height * scale),
            scale,
        }
    }

    pub fn execute(&mut self, cmd: &PaintCommand) {
        match cmd {
            PaintCommand::FillRoundedRect { rect, radius, fill } => {
                self.fill_rounded_rect(rect, *radius, fill)
            }
            PaintCommand::StrokeRoundedRect {
                rect,
                radius,
                width,
                color,
            } => self.stroke_rounded_rect(rect, *radius, *width, *color),
            PaintCommand::FillDisc { rect, color } => self.fill_disc(rect, *color),
            PaintCommand::Text { x, y, run } => self.draw_text(*x, *y, run),
            PaintCommand::Image { rect, radius, image } => {
                // Undecodable artwork leaves the frame background visible,
                // as a browser does with a broken image.
                if let Err(e) = self.draw_image(rect, *radius, image) {
                    warn!("skipping artwork: {}", e);
                }
            }
        }
    }

    pub fn into_image(self) -> RgbaImage {
        self.img
    }

    /// Device-pixel span covering `rect`, clipped to the canvas.
    fn device_span(&self, rect: &Rect) -> (u32, u32, u32, u32) {
        let s = self.scale as i64;
        let clip = |v: i64, max: u32| v.clamp(0, max as i64) as u32;
        (
            clip(rect.x as i64 * s, self.img.width()),
            clip(rect.y as i64 * s, self.img.height()),
            clip(rect.right() as i64 * s, self.img.width()),
            clip(rect.bottom() as i64 * s, self.img.height()),
        )
    }

    /// Logical coordinates of a device pixel's center.
    fn sample(&self, px: u32, py: u32) -> (f32, f32) {
        let s = self.scale as f32;
        ((px as f32 + 0.5) / s, (py as f32 + 0.5) / s)
    }

    fn blend_at(&mut self, px: u32, py: u32, color: Color) {
        let dst = *self.img.get_pixel(px, py);
        self.img.put_pixel(px, py, blend(dst, color));
    }

    fn fill_rounded_rect(&mut self, rect: &Rect, radius: u32, fill: &Fill) {
        let (x0, y0, x1, y1) = self.device_span(rect);
        for py in y0..y1 {
            for px in x0..x1 {
                let (x, y) = self.sample(px, py);
                if inside_rounded(rect, radius as f32, x, y) {
                    self.blend_at(px, py, fill_color(fill, rect, x, y));
                }
            }
        }
    }

    fn stroke_rounded_rect(&mut self, rect: &Rect, radius: u32, width: u32, color: Color) {
        let inner = rect.inset(width);
        let inner_radius = radius.saturating_sub(width) as f32;
        let (x0, y0, x1, y1) = self.device_span(rect);
        for py in y0..y1 {
            for px in x0..x1 {
                let (x, y) = self.sample(px, py);
                if inside_rounded(rect, radius as f32, x, y)
                    && !inside_rounded(&inner, inner_radius, x, y)
                {
                    self.blend_at(px, py, color);
                }
            }
        }
    }

    fn fill_disc(&mut self, rect: &Rect, color: Color) {
        let rx = rect.width as f32 / 2.0;
        let ry = rect.height as f32 / 2.0;
        if rx <= 0.0 || ry <= 0.0 {
            return;
        }
        let cx = rect.x as f32 + rx;
        let cy = rect.y as f32 + ry;
        let (x0, y0, x1, y1) = self.device_span(rect);
        for py in y0..y1 {
            for px in x0..x1 {
                let (x, y) = self.sample(px, py);
                let dx = (x - cx) / rx;
                let dy = (y - cy) / ry;
                if dx * dx + dy * dy <= 1.0 {
                    self.blend_at(px, py, color);
                }
            }
        }
    }

    fn draw_text(&mut self, x: i32, y: i32, run: &TextRun) {
        let cell = (run.scale.max(1) * self.scale) as i64;
        let advance = cell * GLYPH as i64;
        let line_advance = (run.line_height * run.scale.max(1) * self.scale) as i64;
        let origin_x = x as i64 * self.scale as i64;
        let mut cursor_y = y as i64 * self.scale as i64;

        for line in run.text.split('\n') {
            let mut cursor_x = origin_x;
            for ch in line.chars() {
                let rows = glyph(ch);
                for (row_idx, row) in rows.iter().enumerate() {
                    for col in 0..8i64 {
                        if (row >> col) & 1 == 0 {
                            continue;
                        }
                        let gx = cursor_x + col * cell;
                        let gy = cursor_y + row_idx as i64 * cell;
                        self.fill_device_square(gx, gy, cell, run.color);
                        if run.bold {
                            self.fill_device_square(gx + self.scale as i64, gy, cell, run.color);
                        }
                    }
                }
                cursor_x += advance;
            }
            cursor_y += line_advance;
        }
    }

    fn fill_device_square(&mut self, x: i64, y: i64, size: i64, color: Color) {
        let w = self.img.width() as i64;
        let h = self.img.height() as i64;
        for py in y.max(0)..(y + size).min(h) {
            for px in x.max(0)..(x + size).min(w) {
                self.blend_at(px as u32, py as u32, color);
            }
        }
    }

    fn draw_image(&mut self, rect: &Rect, radius: u32, image: &EmbeddableImage) -> Result<()> {
        let bytes = image.decode_bytes()?;
        let src = image::load_from_memory(&bytes)
            .map_err(|e| Error::RenderError(format!("cannot decode {}: {}", image.mime_type(), e)))?
            .to_rgba8();
        if src.width() == 0 || src.height() == 0 {
            return Err(Error::RenderError("artwork has no pixels".into()));
        }

        let (x0, y0, x1, y1) = self.device_span(rect);
        let tw = rect.width * self.scale;
        let th = rect.height * self.scale;
        if tw == 0 || th == 0 {
            return Ok(());
        }

        // Cover: cut a centred window with the target's aspect out of the
        // source, then resize only that window. Output size never depends on
        // the source's aspect ratio.
        let (cx, cy, cw, ch) = cover_window(src.width(), src.height(), tw, th);
        let window = imageops::crop_imm(&src, cx, cy, cw, ch).to_image();
        let scaled = imageops::resize(&window, tw, th, FilterType::Triangle);
        let left = (rect.x.max(0) as u32) * self.scale;
        let top = (rect.y.max(0) as u32) * self.scale;

        for py in y0..y1 {
            for px in x0..x1 {
                let (x, y) = self.sample(px, py);
                if !inside_rounded(rect, radius as f32, x, y) {
                    continue;
                }
                let (sx, sy) = (px - left, py - top);
                if sx >= tw || sy >= th {
                    continue;
                }
                let p = scaled.get_pixel(sx, sy);
                self.blend_at(
                    px,
                    py,
                    Color {
                        r: p[0],
                        g: p[1],
                        b: p[2],
                        a: p[3],
                    },
                );
            }
        }
        Ok(())
    }
}

/// Execute `commands` on a fresh transparent canvas.
pub fn rasterize(commands: &[PaintCommand], width: u32, height: u32, scale: u32) -> RgbaImage {
    let mut canvas = Canvas::new(width, height, scale);
    for cmd in commands {
        canvas.execute(cmd);
    }
    canvas.into_image()
}

/// Centred source window `(x, y, w, h)` with the aspect ratio of a
/// `tw`x`th` target.
fn cover_window(sw: u32, sh: u32, tw: u32, th: u32) -> (u32, u32, u32, u32) {
    let (sw64, sh64, tw64, th64) = (sw as u64, sh as u64, tw as u64, th as u64);
    let (cw, ch) = if sw64 * th64 > sh64 * tw64 {
        // Source is wider than the target: keep full height.
        (((sh64 * tw64 + th64 / 2) / th64).clamp(1, sw64), sh64)
    } else {
        (sw64, ((sw64 * th64 + tw64 / 2) / tw64).clamp(1, sh64))
    };
    let (cw, ch) = (cw as u32, ch as u32);
    ((sw - cw) / 2, (sh - ch) / 2, cw, ch)
}

fn glyph(ch: char) -> [u8; 8] {
    let ch = match ch {
        '★' => '*',
        '…' => '.',
        c => c,
    };
    BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

fn inside_rounded(rect: &Rect, radius: f32, x: f32, y: f32) -> bool {
    let l = rect.x as f32;
    let t = rect.y as f32;
    let r = l + rect.width as f32;
    let b = t + rect.height as f32;
    if x < l || x >= r || y < t || y >= b {
        return false;
    }
    let radius = radius.min(rect.width as f32 / 2.0).min(rect.height as f32 / 2.0);
    let cx = x.clamp(l + radius, r - radius);
    let cy = y.clamp(t + radius, b - radius);
    let dx = x - cx;
    let dy = y - cy;
    dx * dx + dy * dy <= radius * radius
}

fn lerp(a: Color, b: Color, t: f32) -> Color {
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    Color {
        r: mix(a.r, b.r),
        g: mix(a.g, b.g),
        b: mix(a.b, b.b),
        a: mix(a.a, b.a),
    }
}

fn fill_color(fill: &Fill, rect: &Rect, x: f32, y: f32) -> Color {
    let w = rect.width.max(1) as f32;
    let h = rect.height.max(1) as f32;
    match fill {
        Fill::Solid(c) => *c,
        Fill::Diagonal(from, to) => {
            let t = (((x - rect.x as f32) / w + (y - rect.y as f32) / h) / 2.0).clamp(0.0, 1.0);
            lerp(*from, *to, t)
        }
        Fill::Vertical(stops) => {
            let pct = ((y - rect.y as f32) / h * 100.0).clamp(0.0, 100.0);
            let Some(first) = stops.first() else {
                return Color::TRANSPARENT;
            };
            if pct <= first.0 as f32 {
                return first.1;
            }
            for pair in stops.windows(2) {
                let (p0, c0) = pair[0];
                let (p1, c1) = pair[1];
                if pct <= p1 as f32 {
                    let span = (p1 as f32 - p0 as f32).max(f32::EPSILON);
                    return lerp(c0, c1, (pct - p0 as f32) / span);
                }
            }
            stops.last().map(|s| s.1).unwrap_or(Color::TRANSPARENT)
        }
    }
}

/// Source-over compositing in integer arithmetic.
fn blend(dst: Rgba<u8>, src: Color) -> Rgba<u8> {
    if src.a == 255 {
        return Rgba([src.r, src.g, src.b, 255]);
    }
    if src.a == 0 {
        return dst;
    }
    let sa = src.a as u32;
    let da = dst[3] as u32;
    let out_a = sa * 255 + da * (255 - sa);
    let ch = |s: u8, d: u8| ((s as u32 * sa * 255 + d as u32 * da * (255 - sa) + out_a / 2) / out_a) as u8;
    Rgba([
        ch(src.r, dst[0]),
        ch(src.g, dst[1]),
        ch(src.b, dst[2]),
        ((out_a + 127) / 255) as u8,
    ])
}
