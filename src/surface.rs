// The raster surface the mural is painted on, plus the canvas-style primitives
// the brushes are built from.
// Visual: `pixels` is exactly what the window shows; every brush stroke ends up
// as a handful of blended pixel writes in here.

use std::io::Cursor;

use base64::Engine;
use image::{ImageFormat, RgbImage, RgbaImage};

use crate::error::Error;
use crate::types::{Color, Point};

/// Prefix of the embedded-image strings produced by [`RasterSurface::to_data_url`].
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineCap {
    Butt,
    Round,
    Square,
}

/// Joins only matter for multi-segment paths; brushes stroke one segment at a
/// time, so this is carried for completeness of the stroke style.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineJoin {
    Round,
    Miter,
    Bevel,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeStyle {
    pub width: f32,
    pub cap: LineCap,
    pub join: LineJoin,
}

/// Axis-aligned destination rectangle for image blits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    /// Square of side `side` centered on `c`.
    pub fn centered_square(c: Point, side: f32) -> Self {
        Self { x: c.x - side / 2.0, y: c.y - side / 2.0, w: side, h: side }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

/// Drawing primitives and compositing state, in the shape of a 2D canvas context.
///
/// Brushes only talk to this trait, so they can be exercised against a
/// recording double as well as a real [`RasterSurface`].
pub trait Canvas {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    /// Color the eraser paints with.
    fn background(&self) -> Color;

    fn global_alpha(&self) -> f32;
    /// Clamped to `[0, 1]`; non-finite values are ignored.
    fn set_global_alpha(&mut self, alpha: f32);

    /// Active dash pattern; empty means solid.
    fn line_dash(&self) -> &[f32];
    /// Negative or non-finite entries reject the whole pattern.
    /// An odd-length pattern is repeated to make it even.
    fn set_line_dash(&mut self, dash: &[f32]);

    fn stroke_segment(&mut self, from: Point, to: Point, style: StrokeStyle, color: Color);
    fn fill_circle(&mut self, center: Point, radius: f32, color: Color);
    fn draw_image(&mut self, image: &RgbaImage, dest: Rect);
}

/// Normalize a dash pattern the way a canvas context does, or `None` to reject it.
fn normalize_dash(dash: &[f32]) -> Option<Vec<f32>> {
    if dash.iter().any(|d| !d.is_finite() || *d < 0.0) {
        return None;
    }
    let mut out = dash.to_vec();
    if out.len() % 2 == 1 {
        out.extend_from_slice(dash);
    }
    Some(out)
}

/// Is arc-length `along` inside an "on" interval of the dash pattern?
fn dash_on(dash: &[f32], along: f32) -> bool {
    let total: f32 = dash.iter().sum();
    if dash.is_empty() || total <= 0.0 {
        return true;
    }
    let mut pos = along.rem_euclid(total);
    for (i, len) in dash.iter().enumerate() {
        if pos < *len {
            return i % 2 == 0;
        }
        pos -= len;
    }
    true
}

/// Fixed-size, opaque RGB pixel buffer with canvas-like drawing state.
#[derive(Clone, Debug)]
pub struct RasterSurface {
    width: usize,
    height: usize,
    pixels: Vec<u32>, // 0x00RRGGBB, row-major, what minifb presents
    global_alpha: f32,
    line_dash: Vec<f32>,
}

impl RasterSurface {
    /// A blank (white) surface.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::WHITE.to_rgb_u32(); width * height],
            global_alpha: 1.0,
            line_dash: Vec::new(),
        }
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }

    /// Back to a blank white sheet. Compositing state is left alone.
    pub fn clear(&mut self) {
        self.pixels.fill(Color::WHITE.to_rgb_u32());
    }

    /// Source-over blend of `color` into one pixel, scaled by `coverage` and
    /// the global alpha. Out-of-bounds writes are dropped.
    #[inline]
    fn blend(&mut self, x: i64, y: i64, color: Color, coverage: f32) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return;
        }
        let a = (f32::from(color.a) / 255.0 * coverage * self.global_alpha).clamp(0.0, 1.0);
        if a <= 0.0 {
            return;
        }
        let idx = y * self.width + x;
        if a >= 1.0 {
            self.pixels[idx] = color.to_rgb_u32();
            return;
        }
        let dst = Color::from_rgb_u32(self.pixels[idx]);
        let mix = |s: u8, d: u8| (f32::from(s) * a + f32::from(d) * (1.0 - a)).round().clamp(0.0, 255.0) as u8;
        self.pixels[idx] = Color::rgb(mix(color.r, dst.r), mix(color.g, dst.g), mix(color.b, dst.b)).to_rgb_u32();
    }

    /// Integer pixel range whose centers may fall inside `[lo, hi]`, clipped to `len`.
    fn span(lo: f32, hi: f32, len: usize) -> std::ops::Range<i64> {
        if !(lo.is_finite() && hi.is_finite()) || len == 0 {
            return 0..0;
        }
        let start = (lo - 0.5).floor().max(0.0) as i64;
        let end = ((hi - 0.5).ceil() as i64 + 1).min(len as i64);
        start..end.max(start)
    }

    /// Copy out as an `image` RGB buffer.
    pub fn to_rgb_image(&self) -> RgbImage {
        let mut raw = Vec::with_capacity(self.pixels.len() * 3);
        for px in &self.pixels {
            let c = Color::from_rgb_u32(*px);
            raw.extend_from_slice(&[c.r, c.g, c.b]);
        }
        RgbImage::from_raw(self.width as u32, self.height as u32, raw)
            .unwrap_or_else(|| RgbImage::new(self.width as u32, self.height as u32))
    }

    pub fn from_rgb_image(img: &RgbImage) -> Self {
        let (w, h) = img.dimensions();
        let mut surface = Self::new(w as usize, h as usize);
        for (i, p) in img.pixels().enumerate() {
            surface.pixels[i] = Color::rgb(p[0], p[1], p[2]).to_rgb_u32();
        }
        surface
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut out = Vec::new();
        self.to_rgb_image().write_to(&mut Cursor::new(&mut out), ImageFormat::Png)?;
        Ok(out)
    }

    /// The whole surface as a single embedded-image string.
    pub fn to_data_url(&self) -> Result<String, image::ImageError> {
        let png = self.encode_png()?;
        Ok(format!(
            "{PNG_DATA_URL_PREFIX}{}",
            base64::engine::general_purpose::STANDARD.encode(png)
        ))
    }

    /// Decode a string produced by [`Self::to_data_url`] (e.g. for a gallery thumbnail).
    pub fn from_data_url(url: &str) -> Result<Self, Error> {
        let encoded = url
            .strip_prefix(PNG_DATA_URL_PREFIX)
            .ok_or_else(|| Error::Payload("not a PNG data URL".into()))?;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| Error::Payload(e.to_string()))?;
        let img = image::load_from_memory_with_format(&bytes, ImageFormat::Png)?;
        Ok(Self::from_rgb_image(&img.to_rgb8()))
    }
}

impl Canvas for RasterSurface {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn background(&self) -> Color {
        Color::WHITE
    }

    fn global_alpha(&self) -> f32 {
        self.global_alpha
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        if alpha.is_finite() {
            self.global_alpha = alpha.clamp(0.0, 1.0);
        }
    }

    fn line_dash(&self) -> &[f32] {
        &self.line_dash
    }

    fn set_line_dash(&mut self, dash: &[f32]) {
        if let Some(dash) = normalize_dash(dash) {
            self.line_dash = dash;
        }
    }

    /// Coverage is binary per pixel center; each pixel is blended at most once
    /// per call, so translucent strokes don't darken where caps overlap.
    fn stroke_segment(&mut self, from: Point, to: Point, style: StrokeStyle, color: Color) {
        let half = style.width / 2.0;
        if !(half > 0.0) {
            return;
        }
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let len = (dx * dx + dy * dy).sqrt();

        if !(len > 0.0) {
            // Zero-length segment: only the caps have area.
            match style.cap {
                LineCap::Butt => {}
                LineCap::Round => self.fill_circle(from, half, color),
                LineCap::Square => {
                    for y in Self::span(from.y - half, from.y + half, self.height) {
                        for x in Self::span(from.x - half, from.x + half, self.width) {
                            self.blend(x, y, color, 1.0);
                        }
                    }
                }
            }
            return;
        }

        let (ux, uy) = (dx / len, dy / len);
        let ext = if style.cap == LineCap::Square { half } else { 0.0 };
        let pad = half + ext;
        let xs = Self::span(from.x.min(to.x) - pad, from.x.max(to.x) + pad, self.width);
        let ys = Self::span(from.y.min(to.y) - pad, from.y.max(to.y) + pad, self.height);
        let dash = self.line_dash.clone();

        for y in ys {
            for x in xs.clone() {
                let cx = x as f32 + 0.5 - from.x;
                let cy = y as f32 + 0.5 - from.y;
                let along = cx * ux + cy * uy;
                let across = -cx * uy + cy * ux;

                let inside = match style.cap {
                    LineCap::Butt => (0.0..=len).contains(&along) && across.abs() <= half,
                    LineCap::Square => (-ext..=len + ext).contains(&along) && across.abs() <= half,
                    LineCap::Round => {
                        let over = along - along.clamp(0.0, len);
                        over * over + across * across <= half * half
                    }
                };
                if inside && dash_on(&dash, along.clamp(0.0, len)) {
                    self.blend(x, y, color, 1.0);
                }
            }
        }
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Color) {
        if !(radius > 0.0) || !center.x.is_finite() || !center.y.is_finite() {
            return;
        }
        let r2 = radius * radius;
        let (home_x, home_y) = (center.x.floor() as i64, center.y.floor() as i64);
        for y in Self::span(center.y - radius, center.y + radius, self.height) {
            for x in Self::span(center.x - radius, center.x + radius, self.width) {
                let dx = x as f32 + 0.5 - center.x;
                let dy = y as f32 + 0.5 - center.y;
                // Tiny dots still mark the pixel they sit in.
                if dx * dx + dy * dy <= r2 || (x == home_x && y == home_y) {
                    self.blend(x, y, color, 1.0);
                }
            }
        }
    }

    /// Nearest-neighbour scaled blit; source alpha and global alpha both apply.
    fn draw_image(&mut self, image: &RgbaImage, dest: Rect) {
        let (iw, ih) = image.dimensions();
        if iw == 0 || ih == 0 || !(dest.w > 0.0) || !(dest.h > 0.0) {
            return;
        }
        for y in Self::span(dest.y, dest.y + dest.h, self.height) {
            let v = (y as f32 + 0.5 - dest.y) / dest.h;
            if !(0.0..1.0).contains(&v) {
                continue;
            }
            let sy = ((v * ih as f32) as u32).min(ih - 1);
            for x in Self::span(dest.x, dest.x + dest.w, self.width) {
                let u = (x as f32 + 0.5 - dest.x) / dest.w;
                if !(0.0..1.0).contains(&u) {
                    continue;
                }
                let sx = ((u * iw as f32) as u32).min(iw - 1);
                let p = image.get_pixel(sx, sy);
                self.blend(x, y, Color { r: p[0], g: p[1], b: p[2], a: p[3] }, 1.0);
            }
        }
    }
}

/// Test double that records every primitive call along with the alpha and
/// dash state in effect at the time.
#[cfg(test)]
pub(crate) mod recording {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    pub enum Op {
        Segment { from: Point, to: Point, style: StrokeStyle, color: Color, alpha: f32, dash: Vec<f32> },
        Circle { center: Point, radius: f32, color: Color, alpha: f32 },
        Image { dest: Rect, alpha: f32 },
    }

    pub struct RecordingCanvas {
        pub ops: Vec<Op>,
        alpha: f32,
        dash: Vec<f32>,
    }

    impl RecordingCanvas {
        pub fn new() -> Self {
            Self { ops: Vec::new(), alpha: 1.0, dash: Vec::new() }
        }
    }

    impl Canvas for RecordingCanvas {
        fn width(&self) -> usize {
            100
        }
        fn height(&self) -> usize {
            100
        }
        fn background(&self) -> Color {
            Color::WHITE
        }
        fn global_alpha(&self) -> f32 {
            self.alpha
        }
        fn set_global_alpha(&mut self, alpha: f32) {
            self.alpha = alpha;
        }
        fn line_dash(&self) -> &[f32] {
            &self.dash
        }
        fn set_line_dash(&mut self, dash: &[f32]) {
            if let Some(d) = normalize_dash(dash) {
                self.dash = d;
            }
        }
        fn stroke_segment(&mut self, from: Point, to: Point, style: StrokeStyle, color: Color) {
            self.ops.push(Op::Segment { from, to, style, color, alpha: self.alpha, dash: self.dash.clone() });
        }
        fn fill_circle(&mut self, center: Point, radius: f32, color: Color) {
            self.ops.push(Op::Circle { center, radius, color, alpha: self.alpha });
        }
        fn draw_image(&mut self, _image: &RgbaImage, dest: Rect) {
            self.ops.push(Op::Image { dest, alpha: self.alpha });
        }
    }
}
