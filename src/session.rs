// One drawing visit: the surface, the tool settings, the input state and the
// loaded photo, all in one place instead of ambient globals.

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::brush::{self, Stroke, StrokeContext};
use crate::error::{BrushError, UploadError};
use crate::input::{InputState, Phase, PointerEvent, Transition};
use crate::mapper;
use crate::photo::{DecodeResult, PhotoAsset, PhotoLoader};
use crate::registry::BrushRegistry;
use crate::surface::{Canvas, RasterSurface};
use crate::types::{Color, ElementBounds, Point};

/// Something the user has to be told about (a blocking alert in a browser).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    /// The photo brush was used before any image was loaded. The brush
    /// selection has been switched back to the pencil.
    MissingPhotoAsset,
    /// The uploaded file could not be used. Nothing was changed.
    UnsupportedUpload { reason: UploadError },
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::MissingPhotoAsset => f.write_str("Please upload an image first to use the photo brush"),
            Notice::UnsupportedUpload { reason } => write!(f, "Please upload a valid image file ({reason})"),
        }
    }
}

pub struct DrawingSession {
    surface: RasterSurface,
    registry: BrushRegistry,
    brush_id: String,
    color: Color,
    size: f32,
    input: InputState,
    bounds: ElementBounds,
    photo: Option<PhotoAsset>,
    loader: PhotoLoader,
    rng: StdRng,
}

impl DrawingSession {
    /// Blank surface, pencil selected, black, size 5, surface displayed 1:1.
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_rng(width, height, StdRng::from_os_rng())
    }

    /// Deterministic spray paint.
    pub fn with_seed(width: usize, height: usize, seed: u64) -> Self {
        Self::with_rng(width, height, StdRng::seed_from_u64(seed))
    }

    fn with_rng(width: usize, height: usize, rng: StdRng) -> Self {
        Self {
            surface: RasterSurface::new(width, height),
            registry: BrushRegistry::with_defaults(),
            brush_id: brush::PENCIL.to_string(),
            color: Color::BLACK,
            size: 5.0,
            input: InputState::Idle,
            bounds: ElementBounds::new(0.0, 0.0, width as f32, height as f32),
            photo: None,
            loader: PhotoLoader::new(),
            rng,
        }
    }

    pub fn surface(&self) -> &RasterSurface {
        &self.surface
    }

    pub fn registry(&self) -> &BrushRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut BrushRegistry {
        &mut self.registry
    }

    pub fn input_state(&self) -> InputState {
        self.input
    }

    pub fn clear(&mut self) {
        self.surface.clear();
        log::debug!("surface cleared");
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    /// Non-finite sizes are ignored; others clamp to `0..=brush::MAX_SIZE`.
    pub fn set_size(&mut self, size: f32) {
        if size.is_finite() {
            self.size = size.clamp(0.0, brush::MAX_SIZE);
        }
    }

    pub fn brush_id(&self) -> &str {
        &self.brush_id
    }

    /// Any id is accepted; unknown ones draw with the pencil.
    pub fn select_brush(&mut self, id: &str) {
        if !self.registry.contains(id) {
            log::warn!("unknown brush {id:?}, strokes will use the pencil");
        }
        self.brush_id = id.to_string();
    }

    /// Where the surface currently sits on screen.
    pub fn set_bounds(&mut self, bounds: ElementBounds) {
        self.bounds = bounds;
    }

    pub fn has_photo(&self) -> bool {
        self.photo.is_some()
    }

    /// Feed one raw input event through the state machine, painting if it
    /// extends a stroke.
    pub fn handle(&mut self, event: PointerEvent) -> Option<Notice> {
        let buffer = (self.surface.width(), self.surface.height());
        let at = match mapper::try_map(event.client, self.bounds, buffer) {
            Some(p) => p,
            // No layout: a release still ends the stroke, nothing else can happen.
            None if matches!(event.phase, Phase::Up | Phase::Leave) => Point::default(),
            None => {
                log::debug!("dropping {:?}: surface has no displayed area", event.phase);
                return None;
            }
        };
        match self.input.advance(event.phase, at) {
            Transition::Segment(from, to) => self.stroke(from, to),
            Transition::Started(_) | Transition::Ended | Transition::Ignored => None,
        }
    }

    /// Render one segment with the current brush, color and size.
    pub fn stroke(&mut self, from: Point, to: Point) -> Option<Notice> {
        let active = self.registry.get(&self.brush_id);
        let stroke = Stroke::new(from, to, self.color, self.size);
        let mut ctx = StrokeContext { photo: self.photo.as_ref(), rng: &mut self.rng };
        match active.render(&mut self.surface, &stroke, &mut ctx) {
            Ok(()) => None,
            Err(BrushError::MissingPhotoAsset) => {
                log::warn!("photo brush used without an image, switching back to pencil");
                self.brush_id = brush::PENCIL.to_string();
                Some(Notice::MissingPhotoAsset)
            }
        }
    }

    /// Decode an upload right away and make it the photo-brush image.
    pub fn load_photo(&mut self, bytes: &[u8]) -> Option<Notice> {
        self.apply_decoded(PhotoAsset::decode(bytes))
    }

    /// Decode an upload in the background; see [`Self::poll_photo_loads`].
    pub fn upload_photo(&mut self, bytes: Vec<u8>) {
        self.loader.spawn_decode(bytes);
    }

    /// Apply finished background decodes, in completion order.
    pub fn poll_photo_loads(&mut self) -> Vec<Notice> {
        self.loader
            .completed()
            .into_iter()
            .filter_map(|result| self.apply_decoded(result))
            .collect()
    }

    /// Block until the next background decode lands and apply it. Returns
    /// at once when no upload is in flight.
    pub fn wait_for_photo(&mut self) -> Option<Notice> {
        let result = self.loader.wait_one()?;
        self.apply_decoded(result)
    }

    fn apply_decoded(&mut self, result: DecodeResult) -> Option<Notice> {
        match result {
            Ok(asset) => {
                let (w, h) = asset.dimensions();
                if self.photo.replace(asset).is_some() {
                    log::info!("photo brush image replaced ({w}x{h})");
                } else {
                    log::info!("photo brush image loaded ({w}x{h})");
                }
                None
            }
            Err(reason) => {
                log::warn!("rejected upload: {reason}");
                Some(Notice::UnsupportedUpload { reason })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use image::RgbaImage;

    use crate::gallery::Gallery;
    use crate::input::Phase::{Down, Leave, Move, Up};
    use crate::store::{MemoryStore, SlotArtworkStore};

    const WHITE: u32 = 0x00FF_FFFF;

    fn png_bytes() -> Vec<u8> {
        let img = RgbaImage::from_pixel(8, 8, image::Rgba([0, 0, 0, 255]));
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png).unwrap();
        out
    }

    fn blank(session: &DrawingSession) -> bool {
        session.surface().pixels().iter().all(|p| *p == WHITE)
    }

    #[test]
    fn pencil_stroke_save_then_delete() {
        let mut session = DrawingSession::with_seed(64, 32, 1);
        session.set_color("#ff0000".parse().unwrap());
        session.set_size(5.0);
        session.handle(PointerEvent::mouse(Down, 10.0, 10.0));
        session.handle(PointerEvent::mouse(Move, 20.0, 10.0));
        session.handle(PointerEvent::mouse(Up, 20.0, 10.0));
        assert_eq!(session.surface().pixel(15, 10), Some(0x00FF_0000));

        let mut gallery = Gallery::new(SlotArtworkStore::new(MemoryStore::new()));
        let art = gallery.save_surface(session.surface()).unwrap();
        assert!(!art.id.is_empty());
        assert_eq!(gallery.list().unwrap().len(), 1);

        let left = gallery.delete(&art.id).unwrap();
        assert!(left.is_empty());
        assert!(gallery.list().unwrap().is_empty());
    }

    #[test]
    fn photo_brush_without_image_warns_and_reverts() {
        let mut session = DrawingSession::with_seed(32, 32, 1);
        session.select_brush(brush::PHOTO);
        assert_eq!(session.handle(PointerEvent::mouse(Down, 5.0, 5.0)), None);
        let notice = session.handle(PointerEvent::mouse(Move, 15.0, 5.0));
        assert_eq!(notice, Some(Notice::MissingPhotoAsset));
        assert_eq!(session.brush_id(), brush::PENCIL);
        assert!(blank(&session));

        // The rest of the gesture continues with the pencil.
        assert_eq!(session.handle(PointerEvent::mouse(Move, 25.0, 5.0)), None);
        assert!(!blank(&session));
    }

    #[test]
    fn photo_brush_stamps_once_loaded() {
        let mut session = DrawingSession::with_seed(32, 32, 1);
        assert_eq!(session.load_photo(&png_bytes()), None);
        assert!(session.has_photo());
        session.select_brush(brush::PHOTO);
        session.handle(PointerEvent::mouse(Down, 16.0, 16.0));
        assert_eq!(session.handle(PointerEvent::mouse(Move, 16.0, 16.0)), None);
        // 70% black over white.
        assert_eq!(session.surface().pixel(16, 16), Some(0x004D_4D4D));
        assert_eq!(session.surface().global_alpha(), 1.0);
    }

    #[test]
    fn bad_upload_changes_nothing() {
        let mut session = DrawingSession::with_seed(8, 8, 1);
        let notice = session.load_photo(b"%PDF-1.4 definitely not a picture");
        assert_eq!(notice, Some(Notice::UnsupportedUpload { reason: UploadError::NotAnImage }));
        assert!(!session.has_photo());
    }

    #[test]
    fn background_upload_lands_on_poll() {
        let mut session = DrawingSession::with_seed(8, 8, 1);
        session.upload_photo(png_bytes());
        assert_eq!(session.wait_for_photo(), None);
        assert!(session.has_photo());
        assert!(session.poll_photo_loads().is_empty());
    }

    #[test]
    fn waiting_without_an_upload_returns_immediately() {
        let mut session = DrawingSession::with_seed(8, 8, 1);
        assert_eq!(session.wait_for_photo(), None);
        assert!(!session.has_photo());
    }

    #[test]
    fn size_is_clamped() {
        let mut session = DrawingSession::with_seed(8, 8, 1);
        session.set_size(1e20);
        assert_eq!(session.size(), brush::MAX_SIZE);
        session.set_size(-4.0);
        assert_eq!(session.size(), 0.0);
        session.set_size(f32::NAN);
        assert_eq!(session.size(), 0.0);
    }

    #[test]
    fn moves_without_press_do_not_paint() {
        let mut session = DrawingSession::with_seed(32, 32, 1);
        session.handle(PointerEvent::mouse(Move, 1.0, 1.0));
        session.handle(PointerEvent::mouse(Move, 30.0, 30.0));
        assert!(blank(&session));

        session.handle(PointerEvent::touch(Down, 1.0, 1.0));
        session.handle(PointerEvent::touch(Leave, 1.0, 1.0));
        session.handle(PointerEvent::touch(Move, 30.0, 30.0));
        assert!(blank(&session));
    }

    #[test]
    fn events_are_mapped_through_bounds() {
        let mut session = DrawingSession::with_seed(100, 100, 1);
        // Displayed at half size, offset by (50, 20).
        session.set_bounds(ElementBounds::new(50.0, 20.0, 50.0, 50.0));
        session.set_size(2.0);
        session.handle(PointerEvent::mouse(Down, 60.0, 45.0));
        session.handle(PointerEvent::mouse(Move, 70.0, 45.0));
        // Surface segment (20, 50) -> (40, 50).
        assert_eq!(session.surface().pixel(30, 49), Some(0));
        assert_eq!(session.surface().pixel(30, 40), Some(WHITE));
    }

    #[test]
    fn unlaid_out_surface_ignores_presses() {
        let mut session = DrawingSession::with_seed(10, 10, 1);
        session.set_bounds(ElementBounds::new(0.0, 0.0, 0.0, 0.0));
        session.handle(PointerEvent::mouse(Down, 1.0, 1.0));
        assert!(!session.input_state().is_drawing());
    }

    #[test]
    fn unknown_brush_draws_with_pencil() {
        let mut session = DrawingSession::with_seed(32, 32, 1);
        session.select_brush("glitter");
        assert_eq!(session.stroke(Point::new(2.0, 2.0), Point::new(20.0, 2.0)), None);
        assert!(!blank(&session));
    }

    #[test]
    fn spray_is_reproducible_with_a_seed() {
        let paint = || {
            let mut session = DrawingSession::with_seed(64, 64, 42);
            session.select_brush(brush::SPRAY);
            session.set_size(10.0);
            session.stroke(Point::new(32.0, 32.0), Point::new(32.0, 32.0));
            session.surface().pixels().to_vec()
        };
        assert_eq!(paint(), paint());
    }
}
