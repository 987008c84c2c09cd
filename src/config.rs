// Start-up settings, read from the environment with sane defaults.

use std::path::PathBuf;

use crate::brush::MAX_SIZE;
use crate::types::Color;

const DEFAULT_WIDTH: usize = 800;
const DEFAULT_HEIGHT: usize = 600;
const DEFAULT_BRUSH_SIZE: f32 = 5.0;
const DEFAULT_COLOR: Color = Color::BLACK;
const DEFAULT_DATA_DIR: &str = "mural-data";

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Surface width in pixels (`MURAL_WIDTH`).
    pub width: usize,
    /// Surface height in pixels (`MURAL_HEIGHT`).
    pub height: usize,
    /// Initial brush size (`MURAL_BRUSH_SIZE`), at most `brush::MAX_SIZE`.
    pub brush_size: f32,
    /// Initial color, `#rrggbb` (`MURAL_COLOR`).
    pub color: Color,
    /// Where the artwork store keeps its files (`MURAL_DATA_DIR`).
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            brush_size: DEFAULT_BRUSH_SIZE,
            color: DEFAULT_COLOR,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let width = env_parse("MURAL_WIDTH", DEFAULT_WIDTH).max(1);
        let height = env_parse("MURAL_HEIGHT", DEFAULT_HEIGHT).max(1);
        let brush_size = env_parse("MURAL_BRUSH_SIZE", DEFAULT_BRUSH_SIZE);
        let color = env_parse("MURAL_COLOR", DEFAULT_COLOR);
        let data_dir = std::env::var_os("MURAL_DATA_DIR").map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from);
        Self {
            width,
            height,
            brush_size: if brush_size.is_finite() && brush_size >= 0.0 {
                brush_size.min(MAX_SIZE)
            } else {
                DEFAULT_BRUSH_SIZE
            },
            color,
            data_dir,
        }
    }
}

/// Parse `key` from the environment, falling back to `default` when it is
/// missing or malformed.
pub fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or_else(|_| {
            log::warn!("ignoring malformed {key}={raw:?}");
            default
        }),
        Err(_) => default,
    }
}
