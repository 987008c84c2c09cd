// Uploaded images for the photo brush.
// Decoding can be slow for big photos, so it may run on a worker thread; the
// result is handed back over a channel and applied by the drawing thread.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use image::RgbaImage;

use crate::error::UploadError;

/// A decoded photo-brush image.
#[derive(Clone, Debug)]
pub struct PhotoAsset {
    image: RgbaImage,
}

impl PhotoAsset {
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Decode uploaded bytes. Anything that isn't a recognisable image is
    /// rejected.
    pub fn decode(bytes: &[u8]) -> Result<Self, UploadError> {
        let format = image::guess_format(bytes).map_err(|_| UploadError::NotAnImage)?;
        let img = image::load_from_memory_with_format(bytes, format).map_err(|e| UploadError::Decode {
            format: format!("{format:?}"),
            message: e.to_string(),
        })?;
        if img.width() == 0 || img.height() == 0 {
            return Err(UploadError::Empty);
        }
        Ok(Self { image: img.to_rgba8() })
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Result of one background decode.
pub type DecodeResult = Result<PhotoAsset, UploadError>;

/// Fire-and-forget background decoder. Completed decodes queue up in order;
/// whoever polls last wins, so a newer upload simply replaces an older one.
pub struct PhotoLoader {
    tx: Sender<DecodeResult>,
    rx: Receiver<DecodeResult>,
    /// Decodes started but not yet handed out.
    pending: usize,
}

impl PhotoLoader {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx, pending: 0 }
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Start decoding `bytes` on a worker thread.
    pub fn spawn_decode(&mut self, bytes: Vec<u8>) {
        self.pending += 1;
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = PhotoAsset::decode(&bytes);
            // The loader may already be gone (session closed); nothing to do then.
            let _ = tx.send(result);
        });
    }

    /// Drain finished decodes without blocking, oldest first.
    pub fn completed(&mut self) -> Vec<DecodeResult> {
        let mut out = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(result) => {
                    self.pending = self.pending.saturating_sub(1);
                    out.push(result);
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        out
    }

    /// Block until the next decode finishes. `None` right away when nothing
    /// is in flight.
    pub fn wait_one(&mut self) -> Option<DecodeResult> {
        if self.pending == 0 {
            return None;
        }
        let result = self.rx.recv().ok()?;
        self.pending -= 1;
        Some(result)
    }
}

impl Default for PhotoLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]));
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png).unwrap();
        out
    }

    #[test]
    fn decodes_png() {
        let asset = PhotoAsset::decode(&png_bytes(3, 2)).unwrap();
        assert_eq!(asset.dimensions(), (3, 2));
        assert_eq!(asset.image().get_pixel(0, 0).0, [10, 20, 30, 255]);
    }

    #[test]
    fn rejects_text_file() {
        let err = PhotoAsset::decode(b"hello, not an image").unwrap_err();
        assert_eq!(err, UploadError::NotAnImage);
    }

    #[test]
    fn truncated_png_is_a_decode_error() {
        let bytes = png_bytes(4, 4);
        let err = PhotoAsset::decode(&bytes[..bytes.len() / 2]).unwrap_err();
        assert!(matches!(err, UploadError::Decode { ref format, .. } if format == "Png"));
    }

    #[test]
    fn wait_with_nothing_pending_returns_none() {
        let mut loader = PhotoLoader::new();
        assert_eq!(loader.pending(), 0);
        assert!(loader.wait_one().is_none());
    }

    #[test]
    fn background_decode_comes_back_over_channel() {
        let mut loader = PhotoLoader::new();
        loader.spawn_decode(png_bytes(5, 5));
        assert_eq!(loader.pending(), 1);
        let result = loader.wait_one().unwrap();
        assert_eq!(result.unwrap().dimensions(), (5, 5));
        assert_eq!(loader.pending(), 0);
        assert!(loader.completed().is_empty());
        assert!(loader.wait_one().is_none());
    }
}
