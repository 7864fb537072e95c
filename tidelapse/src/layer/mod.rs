//! Per-timestep tile layer ownership.
//!
//! [`TileLayerCache`] is the exclusive owner of every [`LayerHandle`] in a
//! session, keyed by `(TimeKey, LayerKind)`. Layers are created lazily on
//! first reference and stay mounted for the whole session: crossfade between
//! frames is implemented as opacity changes on mounted layers, so scrubbing
//! back to a previously visited frame never re-fetches tiles.
//!
//! The cache also owns the host [`MapSurface`], making it the single writer
//! for all mount/unmount/opacity mutations (see the ordering guarantees in
//! the animation module).

mod url;

pub use url::TileUrlTemplate;

use std::collections::HashMap;

use tracing::debug;

use crate::surface::{LayerId, MapSurface};
use crate::timekey::TimeKey;

/// Opacity assigned to a freshly created magnitude layer.
///
/// Near-zero rather than exactly zero: some map surfaces skip the network
/// fetch for sources at literal zero opacity, which would defeat prefetch.
pub const PRELOAD_OPACITY: f64 = 0.01;

/// The two raster layer kinds per timestep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// Sea-current magnitude raster; crossfaded during playback.
    Magnitude,
    /// Direction arrow overlay; constant opacity, no crossfade.
    Arrow,
}

impl LayerKind {
    /// The tile-server route segment for this kind.
    pub fn route(&self) -> &'static str {
        match self {
            LayerKind::Magnitude => "mpl_req",
            LayerKind::Arrow => "arr_req",
        }
    }
}

/// One mountable raster layer for one timestep and kind.
///
/// At most one handle exists per `(TimeKey, LayerKind)` pair for the
/// lifetime of a session.
#[derive(Debug, Clone)]
pub struct LayerHandle {
    id: LayerId,
    kind: LayerKind,
    key: TimeKey,
    url: String,
    opacity: f64,
    mounted: bool,
}

impl LayerHandle {
    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    pub fn key(&self) -> &TimeKey {
        &self.key
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }
}

/// Lazily creates and owns per-timestep tile layers against a host surface.
pub struct TileLayerCache<S: MapSurface> {
    surface: S,
    template: TileUrlTemplate,
    layers: HashMap<(TimeKey, LayerKind), LayerHandle>,
    arrows_enabled: bool,
    arrow_opacity: f64,
    next_id: u64,
}

impl<S: MapSurface> TileLayerCache<S> {
    pub fn new(
        surface: S,
        template: TileUrlTemplate,
        arrows_enabled: bool,
        arrow_opacity: f64,
    ) -> Self {
        Self {
            surface,
            template,
            layers: HashMap::new(),
            arrows_enabled,
            arrow_opacity,
            next_id: 0,
        }
    }

    /// Ensures the layers for `key` exist and are mounted.
    ///
    /// Creates the magnitude layer (and the arrow layer when enabled) on
    /// first reference; mounts anything unmounted; leaves the opacity of
    /// pre-existing layers untouched. Idempotent: a second call for the
    /// same key changes nothing observable.
    pub fn ensure(&mut self, key: &TimeKey) {
        self.ensure_kind(key, LayerKind::Magnitude, PRELOAD_OPACITY);
        if self.arrows_enabled {
            let opacity = self.arrow_opacity;
            self.ensure_kind(key, LayerKind::Arrow, opacity);
        }
    }

    fn ensure_kind(&mut self, key: &TimeKey, kind: LayerKind, initial_opacity: f64) {
        let template = &self.template;
        let next_id = &mut self.next_id;
        let handle = self
            .layers
            .entry((key.clone(), kind))
            .or_insert_with(|| {
                let id = LayerId::new(*next_id);
                *next_id += 1;
                debug!(%id, key = %key, ?kind, "creating tile layer");
                LayerHandle {
                    id,
                    kind,
                    key: key.clone(),
                    url: template.url_for(kind, key),
                    opacity: initial_opacity,
                    mounted: false,
                }
            });
        if !self.surface.is_mounted(handle.id) {
            self.surface.mount(handle.id, &handle.url);
            self.surface.set_opacity(handle.id, handle.opacity);
            handle.mounted = true;
        }
    }

    /// Sets the magnitude layer's opacity for `key`.
    ///
    /// Silent no-op when the key has no cached layer; callers are expected
    /// to `ensure` first, but rapid scrubbing can legitimately race past
    /// that expectation.
    pub fn set_visible(&mut self, key: &TimeKey, opacity: f64) {
        if let Some(handle) = self.layers.get_mut(&(key.clone(), LayerKind::Magnitude)) {
            handle.opacity = opacity;
            self.surface.set_opacity(handle.id, opacity);
        }
    }

    /// Fades the magnitude layer for `key` to zero without unmounting it.
    ///
    /// Mounted-but-invisible layers are what makes crossfade instantaneous
    /// when scrubbing back to a visited frame. Silent no-op for unknown
    /// keys.
    pub fn fade_out(&mut self, key: &TimeKey) {
        if let Some(handle) = self.layers.get_mut(&(key.clone(), LayerKind::Magnitude)) {
            handle.opacity = 0.0;
            self.surface.set_opacity(handle.id, 0.0);
        }
    }

    /// Unmounts every cached layer of both kinds and clears the cache.
    ///
    /// Session teardown only; playback must already be stopped.
    pub fn release_all(&mut self) {
        for handle in self.layers.values_mut() {
            self.surface.unmount(handle.id);
            handle.mounted = false;
        }
        debug!(layers = self.layers.len(), "released all tile layers");
        self.layers.clear();
    }

    /// Number of cached layer handles (both kinds).
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// True when no layers have been created yet.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// The cached handle for `(key, kind)`, if any.
    pub fn handle(&self, key: &TimeKey, kind: LayerKind) -> Option<&LayerHandle> {
        self.layers.get(&(key.clone(), kind))
    }

    /// Iterates over all cached handles, both kinds, unordered.
    pub fn handles(&self) -> impl Iterator<Item = &LayerHandle> {
        self.layers.values()
    }

    /// Read access to the host surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }
}
