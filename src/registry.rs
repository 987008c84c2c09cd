// Brush id -> brush lookup. Unknown ids fall back to the pencil so drawing
// never hard-fails on a bad selection.

use std::collections::HashMap;
use std::rc::Rc;

use crate::brush::{self, Brush, Calligraphy, Eraser, Marker, Pencil, PhotoBrush, SprayPaint};

pub struct BrushRegistry {
    brushes: HashMap<String, Rc<dyn Brush>>,
    fallback: Rc<dyn Brush>,
}

impl BrushRegistry {
    /// Registry holding only the pencil.
    pub fn new() -> Self {
        let pencil: Rc<dyn Brush> = Rc::new(Pencil);
        let mut brushes = HashMap::new();
        brushes.insert(brush::PENCIL.to_string(), Rc::clone(&pencil));
        Self { brushes, fallback: pencil }
    }

    /// Registry with every built-in brush.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Marker);
        registry.register(SprayPaint);
        registry.register(Calligraphy);
        registry.register(Eraser);
        registry.register(PhotoBrush);
        registry
    }

    /// Add a brush under its own id. An existing brush with the same id is
    /// replaced; other entries are untouched.
    pub fn register<B: Brush + 'static>(&mut self, brush: B) {
        self.register_as(brush.id().to_string(), Rc::new(brush));
    }

    /// Add a brush under an explicit id.
    pub fn register_as(&mut self, id: impl Into<String>, brush: Rc<dyn Brush>) {
        let id = id.into();
        if self.brushes.insert(id.clone(), brush).is_some() {
            log::debug!("brush {id:?} re-registered");
        } else {
            log::debug!("brush {id:?} registered");
        }
    }

    /// The brush for `id`, or the pencil if there is none.
    pub fn get(&self, id: &str) -> Rc<dyn Brush> {
        self.brushes.get(id).map_or_else(|| Rc::clone(&self.fallback), Rc::clone)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.brushes.contains_key(id)
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.brushes.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl Default for BrushRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brush::{Stroke, StrokeContext};
    use crate::error::BrushError;
    use crate::surface::Canvas;

    struct Confetti;

    impl Brush for Confetti {
        fn id(&self) -> &str {
            "confetti"
        }
        fn render(&self, _: &mut dyn Canvas, _: &Stroke, _: &mut StrokeContext<'_>) -> Result<(), BrushError> {
            Ok(())
        }
    }

    #[test]
    fn unknown_id_gets_pencil() {
        let registry = BrushRegistry::with_defaults();
        assert_eq!(registry.get("no-such-brush").id(), brush::PENCIL);
        assert_eq!(registry.get("").id(), brush::PENCIL);
    }

    #[test]
    fn defaults_are_all_there() {
        let registry = BrushRegistry::with_defaults();
        assert_eq!(registry.ids(), vec!["calligraphy", "eraser", "marker", "pencil", "photo", "spray"]);
        assert_eq!(registry.get(brush::SPRAY).id(), brush::SPRAY);
    }

    #[test]
    fn late_registration_leaves_others_alone() {
        let mut registry = BrushRegistry::with_defaults();
        let marker_before = registry.get(brush::MARKER);
        assert!(!registry.contains("confetti"));
        registry.register(Confetti);
        assert_eq!(registry.get("confetti").id(), "confetti");
        assert!(Rc::ptr_eq(&marker_before, &registry.get(brush::MARKER)));
    }

    #[test]
    fn bare_registry_only_has_pencil() {
        let registry = BrushRegistry::new();
        assert_eq!(registry.ids(), vec!["pencil"]);
        assert_eq!(registry.get(brush::PHOTO).id(), brush::PENCIL);
    }
}
