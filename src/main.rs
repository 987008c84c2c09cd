// What you SEE:
// • A white mural. Hold Left Mouse to paint with the current brush.
// • 1..6 pick pencil / marker / spray / calligraphy / eraser / photo.
// • Up/Down change the brush size, Tab cycles the color.
// • X clears, S saves to the gallery, D deletes the newest saved artwork.
// • ESC quits.
// Pass an image path as the first argument to load it into the photo brush.

mod draw;

use std::time::{Duration, Instant};

use draw::{Drawer, Screen, draw_crosshair, draw_text_5x7, fill_rect, text_width};
use minifb::Key;
use mural::brush;
use mural::config::Config;
use mural::gallery::Gallery;
use mural::input::{Phase, PointerEvent};
use mural::store::{ArtworkStore, FileStore, SlotArtworkStore};
use mural::types::ElementBounds;
use mural::{Color, DrawingSession, Error, Notice};

const BRUSH_KEYS: [(Key, &str); 6] = [
    (Key::Key1, brush::PENCIL),
    (Key::Key2, brush::MARKER),
    (Key::Key3, brush::SPRAY),
    (Key::Key4, brush::CALLIGRAPHY),
    (Key::Key5, brush::ERASER),
    (Key::Key6, brush::PHOTO),
];

const PALETTE: [Color; 8] = [
    Color::rgb(0x00, 0x00, 0x00),
    Color::rgb(0xff, 0x00, 0x00),
    Color::rgb(0xff, 0x8c, 0x00),
    Color::rgb(0xff, 0xd7, 0x00),
    Color::rgb(0x22, 0x8b, 0x22),
    Color::rgb(0x1e, 0x90, 0xff),
    Color::rgb(0x8a, 0x2b, 0xe2),
    Color::rgb(0x8b, 0x45, 0x13),
];

const MESSAGE_TTL: Duration = Duration::from_secs(4);

/// The "navigation" after a save: show what the gallery now holds.
fn log_gallery<S: ArtworkStore>(gallery: &Gallery<S>) -> usize {
    match gallery.list() {
        Ok(artworks) => {
            log::info!("gallery has {} artwork(s)", artworks.len());
            for art in &artworks {
                log::info!("  {} ({} bytes)", art.id, art.data.len());
            }
            artworks.len()
        }
        Err(e) => {
            log::error!("gallery unavailable: {e}");
            0
        }
    }
}

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env();
    log::info!("mural {}x{}, artworks in {}", config.width, config.height, config.data_dir.display());

    /* --- Session + gallery ---
       Visual: blank white mural, pencil selected. */
    let mut session = DrawingSession::new(config.width, config.height);
    session.set_color(config.color);
    session.set_size(config.brush_size);
    let mut palette_idx = PALETTE.iter().position(|c| *c == config.color).unwrap_or(0);

    let mut gallery = Gallery::new(SlotArtworkStore::new(FileStore::new(&config.data_dir)));
    let mut saved_count = log_gallery(&gallery);

    // Photo-brush image decodes in the background; it shows up a few frames later.
    if let Some(path) = std::env::args_os().nth(1) {
        match std::fs::read(&path) {
            Ok(bytes) => session.upload_photo(bytes),
            Err(e) => log::error!("cannot read photo {}: {e}", path.to_string_lossy()),
        }
    }

    let mut drawer = Drawer::new("Mural", config.width, config.height)?;
    let mut screen = Screen::new(config.width, config.height);

    // Pointer bookkeeping so we emit down/move/up edges, not raw polls.
    let mut was_down = false;
    let mut last_mouse: Option<(f32, f32)> = None;

    let mut message: Option<(String, Instant)> = None;
    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        let now = Instant::now();
        let mut notices = session.poll_photo_loads();

        /* 1) Tool keys */
        for (key, id) in BRUSH_KEYS {
            if drawer.pressed_once(key) {
                session.select_brush(id);
            }
        }
        if drawer.pressed_repeating(Key::Up) {
            session.set_size((session.size() + 1.0).min(brush::MAX_SIZE));
        }
        if drawer.pressed_repeating(Key::Down) {
            session.set_size((session.size() - 1.0).max(1.0));
        }
        if drawer.pressed_once(Key::Tab) {
            palette_idx = (palette_idx + 1) % PALETTE.len();
            session.set_color(PALETTE[palette_idx]);
        }
        if drawer.pressed_once(Key::X) {
            session.clear();
        }
        if drawer.pressed_once(Key::S) {
            // A broken gallery must not take the drawing down with it.
            match gallery.save_surface(session.surface()) {
                Ok(art) => {
                    saved_count = log_gallery(&gallery);
                    message = Some((format!("saved {}", art.id), now));
                }
                Err(e) => {
                    log::error!("save failed: {e}");
                    message = Some(("save failed".into(), now));
                }
            }
        }
        if drawer.pressed_once(Key::D) {
            match gallery.list().map(|all| all.last().map(|a| a.id.clone())) {
                Ok(Some(id)) => match gallery.delete(&id) {
                    Ok(left) => {
                        saved_count = left.len();
                        message = Some((format!("deleted {id}"), now));
                    }
                    Err(e) => log::error!("delete failed: {e}"),
                },
                Ok(None) => message = Some(("gallery is empty".into(), now)),
                Err(e) => log::error!("gallery unavailable: {e}"),
            }
        }

        /* 2) Pointer -> session events
           Visual: strokes appear under the cursor while LMB is held. */
        let (win_w, win_h) = drawer.window_size();
        session.set_bounds(ElementBounds::new(0.0, 0.0, win_w as f32, win_h as f32));
        let mouse = drawer.mouse_pos();
        let down = drawer.left_mouse_down();
        let event = match (mouse, down, was_down) {
            (Some((x, y)), true, false) => Some(PointerEvent::mouse(Phase::Down, x, y)),
            (Some((x, y)), true, true) if last_mouse != mouse => Some(PointerEvent::mouse(Phase::Move, x, y)),
            (Some((x, y)), false, true) => Some(PointerEvent::mouse(Phase::Up, x, y)),
            (None, _, true) => {
                let (x, y) = last_mouse.unwrap_or_default();
                Some(PointerEvent::mouse(Phase::Leave, x, y))
            }
            _ => None,
        };
        if let Some(event) = event {
            notices.extend(session.handle(event));
        }
        was_down = down && mouse.is_some();
        last_mouse = mouse;

        for notice in notices {
            log::warn!("{notice}");
            let short = match notice {
                Notice::MissingPhotoAsset => "load a photo first - back to pencil".to_string(),
                Notice::UnsupportedUpload { .. } => "not an image".to_string(),
            };
            message = Some((short, now));
        }

        /* 3) Overlay: crosshair + HUD on a copy of the mural */
        screen.copy_from(session.surface());
        if let Some((mx, my)) = mouse {
            let sx = mx * config.width as f32 / win_w.max(1) as f32;
            let sy = my * config.height as f32 / win_h.max(1) as f32;
            draw_crosshair(&mut screen, sx as i32, sy as i32, session.size() as i32, 0x0080_8080);
        }

        let hud = format!(
            "{} | SIZE {} | {} | {} SAVED",
            session.brush_id(),
            session.size(),
            session.color(),
            saved_count
        );
        fill_rect(&mut screen, 4, 4, text_width(&hud) + 8, 14, 0x0040_4040);
        draw_text_5x7(&mut screen, 8, 8, &hud, 0x00FF_FFFF);
        if message.as_ref().is_some_and(|(_, since)| now.duration_since(*since) >= MESSAGE_TTL) {
            message = None;
        }
        if let Some((text, _)) = &message {
            fill_rect(&mut screen, 4, 20, text_width(text) + 8, 14, 0x0080_2020);
            draw_text_5x7(&mut screen, 8, 24, text, 0x00FF_FFFF);
        }

        /* 4) Present */
        drawer.present(&screen)?;

        /* 5) FPS to the debug log once per second */
        frames_this_second += 1;
        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let secs = now.duration_since(last_fps_time).as_secs_f32();
            log::debug!("FPS: {:.1}", frames_this_second as f32 / secs);
            frames_this_second = 0;
            last_fps_time = now;
        }
    }

    Ok(())
}
