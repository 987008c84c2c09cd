// Stroke rendering: one type per brush, each turning (from, to, color, size)
// into canvas primitives.
// Visual: this is where "pencil vs marker vs spray" actually looks different.

use rand::{Rng, RngCore};

use crate::error::BrushError;
use crate::photo::PhotoAsset;
use crate::surface::{Canvas, LineCap, LineJoin, Rect, StrokeStyle};
use crate::types::{Color, Point};

pub const PENCIL: &str = "pencil";
pub const MARKER: &str = "marker";
pub const SPRAY: &str = "spray";
pub const CALLIGRAPHY: &str = "calligraphy";
pub const ERASER: &str = "eraser";
pub const PHOTO: &str = "photo";

/// Largest brush size the session accepts; strokes clamp to it as well.
pub const MAX_SIZE: f32 = 100.0;

const MARKER_ALPHA: f32 = 0.5;
const PHOTO_ALPHA: f32 = 0.7;
/// Stamps closer than a quarter pixel apart look the same as fewer stamps.
const STAMPS_PER_PIXEL: f32 = 4.0;
/// Hard ceiling for one stroke, whatever the distance.
const MAX_STAMPS: f32 = 4096.0;

/// One pointer-move worth of painting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub from: Point,
    pub to: Point,
    pub color: Color,
    /// Always finite and within `0..=MAX_SIZE`.
    pub size: f32,
}

impl Stroke {
    /// Negative or non-finite sizes become 0, which draws (almost) nothing.
    /// Oversized ones clamp to [`MAX_SIZE`].
    pub fn new(from: Point, to: Point, color: Color, size: f32) -> Self {
        let size = if size.is_finite() { size.clamp(0.0, MAX_SIZE) } else { 0.0 };
        Self { from, to, color, size }
    }
}

/// Session state a brush may need beyond the stroke itself.
pub struct StrokeContext<'a> {
    pub photo: Option<&'a PhotoAsset>,
    pub rng: &'a mut dyn RngCore,
}

pub trait Brush {
    fn id(&self) -> &str;

    /// Paint `stroke` onto `canvas`. Must leave the canvas's alpha and dash
    /// state as it found them (fully opaque, solid).
    fn render(&self, canvas: &mut dyn Canvas, stroke: &Stroke, ctx: &mut StrokeContext<'_>) -> Result<(), BrushError>;
}

/// Plain round line at full opacity.
pub struct Pencil;

impl Brush for Pencil {
    fn id(&self) -> &str {
        PENCIL
    }

    fn render(&self, canvas: &mut dyn Canvas, s: &Stroke, _: &mut StrokeContext<'_>) -> Result<(), BrushError> {
        let style = StrokeStyle { width: s.size, cap: LineCap::Round, join: LineJoin::Round };
        canvas.stroke_segment(s.from, s.to, style, s.color);
        Ok(())
    }
}

/// Wide, square-tipped, half transparent.
pub struct Marker;

impl Brush for Marker {
    fn id(&self) -> &str {
        MARKER
    }

    fn render(&self, canvas: &mut dyn Canvas, s: &Stroke, _: &mut StrokeContext<'_>) -> Result<(), BrushError> {
        let style = StrokeStyle { width: s.size * 2.0, cap: LineCap::Square, join: LineJoin::Miter };
        canvas.set_global_alpha(MARKER_ALPHA);
        canvas.stroke_segment(s.from, s.to, style, s.color);
        canvas.set_global_alpha(1.0);
        Ok(())
    }
}

/// Random dots scattered around the *current* point only; fast strokes leave
/// gaps because nothing is sampled along the segment.
pub struct SprayPaint;

impl SprayPaint {
    pub fn density(size: f32) -> usize {
        (size.clamp(0.0, MAX_SIZE) * 2.0).floor() as usize
    }
}

impl Brush for SprayPaint {
    fn id(&self) -> &str {
        SPRAY
    }

    fn render(&self, canvas: &mut dyn Canvas, s: &Stroke, ctx: &mut StrokeContext<'_>) -> Result<(), BrushError> {
        let size = s.size;
        for _ in 0..Self::density(size) {
            let dx = ctx.rng.random_range(-size..=size);
            let dy = ctx.rng.random_range(-size..=size);
            let radius = ctx.rng.random_range(0.0..=size / 4.0);
            canvas.fill_circle(Point::new(s.to.x + dx, s.to.y + dy), radius, s.color);
        }
        Ok(())
    }
}

/// Dashed, flat-ended nib.
pub struct Calligraphy;

impl Brush for Calligraphy {
    fn id(&self) -> &str {
        CALLIGRAPHY
    }

    fn render(&self, canvas: &mut dyn Canvas, s: &Stroke, _: &mut StrokeContext<'_>) -> Result<(), BrushError> {
        let style = StrokeStyle { width: s.size * 2.0, cap: LineCap::Butt, join: LineJoin::Miter };
        canvas.set_line_dash(&[s.size, s.size / 2.0]);
        canvas.stroke_segment(s.from, s.to, style, s.color);
        canvas.set_line_dash(&[]);
        Ok(())
    }
}

/// Paints the background color over whatever is there; pixels are never made
/// transparent.
pub struct Eraser;

impl Brush for Eraser {
    fn id(&self) -> &str {
        ERASER
    }

    fn render(&self, canvas: &mut dyn Canvas, s: &Stroke, _: &mut StrokeContext<'_>) -> Result<(), BrushError> {
        let style = StrokeStyle { width: s.size * 2.0, cap: LineCap::Round, join: LineJoin::Round };
        let bg = canvas.background();
        canvas.stroke_segment(s.from, s.to, style, bg);
        Ok(())
    }
}

/// Stamps the uploaded photo along the stroke.
pub struct PhotoBrush;

impl PhotoBrush {
    /// Where the stamps go for a stroke of this size.
    ///
    /// Spacing is half the size. Short moves (or a zero spacing) stamp once at
    /// `to`; longer ones stamp `floor(distance / spacing) + 1` times, evenly
    /// from `from` to `to` inclusive. Tiny sizes are capped at a few stamps
    /// per pixel travelled.
    pub fn stamp_centers(from: Point, to: Point, size: f32) -> Vec<Point> {
        let spacing = size / 2.0;
        let distance = from.distance(to);
        if !(spacing > 0.0) || !(distance >= spacing) {
            return vec![to];
        }
        let steps = (distance / spacing)
            .floor()
            .min((distance.ceil() * STAMPS_PER_PIXEL).max(1.0))
            .min(MAX_STAMPS) as usize;
        (0..=steps).map(|i| from.lerp(to, i as f32 / steps as f32)).collect()
    }
}

impl Brush for PhotoBrush {
    fn id(&self) -> &str {
        PHOTO
    }

    fn render(&self, canvas: &mut dyn Canvas, s: &Stroke, ctx: &mut StrokeContext<'_>) -> Result<(), BrushError> {
        let asset = ctx.photo.ok_or(BrushError::MissingPhotoAsset)?;
        let side = s.size * 2.0;
        for center in Self::stamp_centers(s.from, s.to, s.size) {
            canvas.set_global_alpha(PHOTO_ALPHA);
            canvas.draw_image(asset.image(), Rect::centered_square(center, side));
            canvas.set_global_alpha(1.0);
        }
        Ok(())
    }
}
