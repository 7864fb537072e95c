//! Tidelapse - temporal tile animation for sea-current maps
//!
//! This library animates a time-indexed stack of raster map tiles (current
//! magnitude plus optional direction arrows) over a host map surface,
//! providing VCR-style playback: play/stop, prev/next, scrubbing, crossfade
//! between frames, and background prefetch of upcoming frames.
//!
//! # Architecture
//!
//! ```text
//! Session::load() ──► ModelRunResolver ──► TimeSeriesBuilder
//!                                                │
//!                      AnimationController ◄─────┘
//!                             │
//!                      TileLayerCache ──► MapSurface (host collaborator)
//! ```
//!
//! The host map surface (pan/zoom/tile rendering) and the widget layer are
//! external collaborators behind the [`surface::MapSurface`] and
//! [`animation::AnimationObserver`] traits; this crate owns everything in
//! between.

pub mod animation;
pub mod layer;
pub mod runlist;
pub mod series;
pub mod session;
pub mod surface;
pub mod timekey;

pub use animation::{AnimationController, AnimationObserver, NullObserver, Player};
pub use layer::{LayerHandle, LayerKind, TileLayerCache, TileUrlTemplate, PRELOAD_OPACITY};
pub use runlist::{AsyncHttpClient, FetchError, ModelRunResolver, ReqwestClient};
pub use series::{best_start_index, build_sequence, snap_to_cadence, FrameSequence};
pub use session::{RunSelector, Session, SessionConfig, SessionError};
pub use surface::{LayerId, MapSurface, NullSurface};
pub use timekey::{TimeKey, TimeKeyError, TIME_KEY_LEN};
