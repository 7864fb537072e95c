//! Host map surface seam.
//!
//! The engine never renders tiles itself. It drives an external map surface
//! (pan/zoom/tile fetching live there) through the minimal capability set in
//! [`MapSurface`]: mount a layer by URL template, unmount it, query mount
//! state, and set its opacity. All mutation originates from a single owner
//! (the layer cache), so implementations need no internal locking.

use std::collections::HashSet;

/// Opaque identity of one mounted layer, assigned by the layer cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(u64);

impl LayerId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id value, for logging and diagnostics.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "layer#{}", self.0)
    }
}

/// Capabilities the engine consumes from the host map surface.
///
/// `url_template` keeps its `{z}/{x}/{y}` placeholders verbatim; the surface
/// fills them per visible tile. A failed tile image fetch is a surface
/// concern (broken-image tile) and is invisible to the engine.
pub trait MapSurface {
    /// Mounts a raster layer identified by `id` with the given URL template.
    fn mount(&mut self, id: LayerId, url_template: &str);

    /// Unmounts a previously mounted layer. Unknown ids are ignored.
    fn unmount(&mut self, id: LayerId);

    /// Whether the layer is currently mounted.
    fn is_mounted(&self, id: LayerId) -> bool;

    /// Sets the layer's opacity in `[0, 1]`.
    fn set_opacity(&mut self, id: LayerId, opacity: f64);
}

/// A surface that tracks mount state but renders nothing.
///
/// Useful for headless runs and for embedders that wire the engine up
/// before a real surface is available.
#[derive(Debug, Default)]
pub struct NullSurface {
    mounted: HashSet<LayerId>,
}

impl NullSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of currently mounted layers.
    pub fn mounted_len(&self) -> usize {
        self.mounted.len()
    }
}

impl MapSurface for NullSurface {
    fn mount(&mut self, id: LayerId, _url_template: &str) {
        self.mounted.insert(id);
    }

    fn unmount(&mut self, id: LayerId) {
        self.mounted.remove(&id);
    }

    fn is_mounted(&self, id: LayerId) -> bool {
        self.mounted.contains(&id)
    }

    fn set_opacity(&mut self, _id: LayerId, _opacity: f64) {}
}

#[cfg(test)]
pub use tests::{RecordingSurface, SurfaceEvent};
