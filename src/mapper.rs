// Client-space pointer positions -> surface pixel positions.
// Visual: when the window is stretched, strokes still land under the cursor.

use crate::types::{ElementBounds, Point};

/// Map a client-space position onto the surface buffer.
///
/// The horizontal and vertical scale factors are computed independently as
/// `buffer / displayed`, so a non-uniformly stretched surface still maps
/// correctly. A zero-sized element yields non-finite coordinates; use
/// [`try_map`] when the layout is not guaranteed.
pub fn map(client: (f32, f32), bounds: ElementBounds, buffer: (usize, usize)) -> Point {
    let scale_x = buffer.0 as f32 / bounds.width;
    let scale_y = buffer.1 as f32 / bounds.height;
    Point {
        x: (client.0 - bounds.left) * scale_x,
        y: (client.1 - bounds.top) * scale_y,
    }
}

/// Like [`map`], but `None` while the element has no displayed area.
pub fn try_map(client: (f32, f32), bounds: ElementBounds, buffer: (usize, usize)) -> Option<Point> {
    if bounds.width > 0.0 && bounds.height > 0.0 {
        Some(map(client, bounds, buffer))
    } else {
        None
    }
}
