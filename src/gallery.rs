// Saved artworks: snapshotting the surface into the store, listing, deleting.

use serde::{Deserialize, Serialize};

use crate::error::{Error, StoreError};
use crate::store::ArtworkStore;
use crate::surface::RasterSurface;

/// One saved snapshot. Immutable once saved, except for deletion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artwork {
    /// Millisecond timestamp of the save, as a string.
    pub id: String,
    /// `data:image/png;base64,...`
    pub data: String,
}

impl Artwork {
    /// Decode the payload back into pixels, e.g. for a thumbnail.
    pub fn decode(&self) -> Result<RasterSurface, Error> {
        RasterSurface::from_data_url(&self.data)
    }
}

/// Source of artwork ids.
pub trait Clock {
    fn now_millis(&self) -> i64;
}

/// Wall clock. Two saves within one millisecond get the same id.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

pub struct Gallery<S, C = SystemClock> {
    store: S,
    clock: C,
}

impl<S: ArtworkStore> Gallery<S> {
    pub fn new(store: S) -> Self {
        Self { store, clock: SystemClock }
    }
}

impl<S: ArtworkStore, C: Clock> Gallery<S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Encode the whole surface, append it to the stored collection and
    /// write the collection back.
    pub fn save_surface(&mut self, surface: &RasterSurface) -> Result<Artwork, StoreError> {
        let data = surface.to_data_url()?;
        let mut artworks = self.store.load()?;
        let artwork = Artwork { id: self.clock.now_millis().to_string(), data };
        artworks.push(artwork.clone());
        self.store.save(&artworks)?;
        log::info!("saved artwork {} ({} in gallery)", artwork.id, artworks.len());
        Ok(artwork)
    }

    /// Stored order, oldest first.
    pub fn list(&self) -> Result<Vec<Artwork>, StoreError> {
        self.store.load()
    }

    /// Drop the artwork with `id` and return the refreshed list. Unknown ids
    /// leave the collection as it was (it is still written back).
    pub fn delete(&mut self, id: &str) -> Result<Vec<Artwork>, StoreError> {
        let mut artworks = self.store.load()?;
        let before = artworks.len();
        artworks.retain(|a| a.id != id);
        self.store.save(&artworks)?;
        if artworks.len() == before {
            log::warn!("delete: no artwork with id {id}");
        } else {
            log::info!("deleted artwork {id} ({} left)", artworks.len());
        }
        Ok(artworks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::HashSet;

    use crate::store::{ARTWORKS_KEY, KeyValueStore, MemoryStore, SlotArtworkStore};
    use crate::surface::{Canvas, LineCap, LineJoin, StrokeStyle};
    use crate::types::{Color, Point};

    /// Ticks forward one millisecond per read.
    struct StepClock(Cell<i64>);

    impl Clock for StepClock {
        fn now_millis(&self) -> i64 {
            let t = self.0.get();
            self.0.set(t + 1);
            t
        }
    }

    fn gallery() -> Gallery<SlotArtworkStore<MemoryStore>, StepClock> {
        Gallery::with_clock(SlotArtworkStore::new(MemoryStore::new()), StepClock(Cell::new(1_700_000_000_000)))
    }

    fn doodle() -> RasterSurface {
        let mut s = RasterSurface::new(24, 16);
        let style = StrokeStyle { width: 3.0, cap: LineCap::Round, join: LineJoin::Round };
        s.stroke_segment(Point::new(2.0, 2.0), Point::new(20.0, 12.0), style, Color::rgb(0, 0, 255));
        s
    }

    #[test]
    fn save_then_list_round_trips_pixels() {
        let mut g = gallery();
        let surface = doodle();
        let saved = g.save_surface(&surface).unwrap();
        assert_eq!(saved.id, "1700000000000");

        let listed = g.list().unwrap();
        assert_eq!(listed, vec![saved.clone()]);
        assert_eq!(listed[0].decode().unwrap().pixels(), surface.pixels());
    }

    #[test]
    fn ids_are_unique_and_order_is_insertion_order() {
        let mut g = gallery();
        let s = doodle();
        let ids: Vec<String> = (0..4).map(|_| g.save_surface(&s).unwrap().id).collect();
        let listed: Vec<String> = g.list().unwrap().into_iter().map(|a| a.id).collect();
        assert_eq!(listed, ids);
        let unique: HashSet<&String> = ids.iter().collect();
        assert_eq!(unique.len(), 4);
    }

    #[test]
    fn delete_removes_only_the_match() {
        let mut g = gallery();
        let s = doodle();
        let a = g.save_surface(&s).unwrap();
        let b = g.save_surface(&s).unwrap();
        let c = g.save_surface(&s).unwrap();

        let left = g.delete(&b.id).unwrap();
        assert_eq!(left, vec![a.clone(), c.clone()]);
        assert_eq!(g.list().unwrap(), vec![a, c]);

        let unchanged = g.delete("nope").unwrap();
        assert_eq!(unchanged.len(), 2);
    }

    #[test]
    fn corrupt_collection_blocks_gallery_not_surface() {
        let mut kv = MemoryStore::new();
        kv.set(ARTWORKS_KEY, "[{\"id\": 1").unwrap();
        let mut g = Gallery::with_clock(SlotArtworkStore::new(kv), StepClock(Cell::new(0)));
        let surface = doodle();
        assert!(matches!(g.list(), Err(StoreError::Corrupt(_))));
        assert!(matches!(g.save_surface(&surface), Err(StoreError::Corrupt(_))));
        // The surface itself is still perfectly usable.
        assert!(surface.to_data_url().is_ok());
    }

    #[test]
    fn system_clock_ids_are_non_empty() {
        let mut g = Gallery::new(SlotArtworkStore::new(MemoryStore::new()));
        let art = g.save_surface(&doodle()).unwrap();
        assert!(!art.id.is_empty());
        assert!(art.id.parse::<i64>().unwrap() > 0);
    }
}
