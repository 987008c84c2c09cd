// Mural: a raster paint surface with a handful of brushes, pointer/touch
// input, and a local gallery of saved artworks.

pub mod brush;
pub mod config;
pub mod error;
pub mod gallery;
pub mod input;
pub mod mapper;
pub mod photo;
pub mod registry;
pub mod session;
pub mod store;
pub mod surface;
pub mod types;

pub use error::Error;
pub use session::{DrawingSession, Notice};
pub use surface::{Canvas, RasterSurface};
pub use types::{Color, Point};
