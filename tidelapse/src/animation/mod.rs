//! Playback position and crossfade orchestration.
//!
//! [`AnimationController`] owns the current frame position and the
//! stopped/playing mode, and drives the [`TileLayerCache`] to crossfade
//! between frames. All index arithmetic is circular: scrubbing past either
//! end of the sequence wraps around, giving a continuously looping
//! timeline.
//!
//! Ordering guarantee: within one position change, the target layer is
//! ensured-present before any visibility mutation, and the previous frame
//! is faded out before the new frame is faded in. Both happen synchronously
//! under the single owner, so no intermediate state is ever observable
//! where two frames are absent or an unmounted frame is active.
//!
//! Autoplay is driven by [`Player`], which wraps the controller for use
//! from a tokio timer task.

mod player;

pub use player::Player;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::layer::TileLayerCache;
use crate::series::FrameSequence;
use crate::surface::MapSurface;
use crate::timekey::TimeKey;

/// Receives notifications the (external) presentation layer can wire to
/// sliders and labels. All methods have empty defaults.
pub trait AnimationObserver: Send {
    /// The visible frame changed to `index`, displayable as `label`.
    fn position_changed(&mut self, index: usize, label: &str) {
        let _ = (index, label);
    }

    /// The configured magnitude opacity changed.
    fn opacity_changed(&mut self, value: f64) {
        let _ = value;
    }
}

/// Observer that ignores every notification.
#[derive(Debug, Default)]
pub struct NullObserver;

impl AnimationObserver for NullObserver {}

/// Playback mode. The cancellation token exists only while playing and is
/// the sole handle to the pending timer task.
enum PlaybackMode {
    Stopped,
    Playing(CancellationToken),
}

/// Frame position and play/stop state machine.
///
/// Owns the layer cache exclusively; every surface mutation in a session
/// flows through this controller, which is what makes the single-writer
/// assumption of [`MapSurface`] hold.
pub struct AnimationController<S: MapSurface> {
    cache: TileLayerCache<S>,
    sequence: FrameSequence,
    position: usize,
    /// False until the first non-preload position change; the "previous
    /// frame" is undefined before that.
    shown: bool,
    opacity: f64,
    mode: PlaybackMode,
    observer: Box<dyn AnimationObserver>,
}

impl<S: MapSurface> AnimationController<S> {
    pub fn new(
        cache: TileLayerCache<S>,
        opacity: f64,
        observer: Box<dyn AnimationObserver>,
    ) -> Self {
        Self {
            cache,
            sequence: FrameSequence::default(),
            position: 0,
            shown: false,
            opacity: opacity.clamp(0.0, 1.0),
            mode: PlaybackMode::Stopped,
            observer,
        }
    }

    /// Installs the frame sequence and starting position. Mounts nothing by
    /// itself; the first `show_frame` does that.
    pub fn initialize(&mut self, sequence: FrameSequence, start_index: usize) {
        self.position = if sequence.is_empty() {
            0
        } else {
            start_index.min(sequence.len() - 1)
        };
        self.sequence = sequence;
        self.shown = false;
    }

    /// Makes `target` the visible frame, then prefetches one frame further
    /// in the direction of travel.
    ///
    /// The visible commit happens strictly before the prefetch, so the
    /// transition is never delayed by prefetch work.
    pub fn show_frame(&mut self, target: i64) {
        if self.sequence.is_empty() {
            return;
        }
        // Forward when stationary.
        let direction: i64 = if target < self.position as i64 { -1 } else { 1 };
        self.change_position(target, false);
        self.change_position(target + direction, true);
    }

    /// Core position change. `raw` may be any integer; it is wrapped into
    /// `[0, len)` with euclidean modulo. With `preload_only` the target
    /// layer is ensured and mounted but neither the position nor any
    /// visible opacity changes.
    fn change_position(&mut self, raw: i64, preload_only: bool) {
        let len = self.sequence.len();
        if len == 0 {
            return;
        }
        let index = raw.rem_euclid(len as i64) as usize;
        let key = self.sequence.keys()[index].clone();

        // Both modes need the layer present before anything else.
        self.cache.ensure(&key);
        if preload_only {
            return;
        }

        let previous: Option<TimeKey> = self
            .shown
            .then(|| self.sequence.keys()[self.position].clone());
        if let Some(prev) = previous {
            if prev != key {
                self.cache.fade_out(&prev);
            }
        }

        self.position = index;
        self.shown = true;
        self.cache.set_visible(&key, self.opacity);

        let label = key.display_label();
        debug!(index, key = %key, "frame visible");
        self.observer.position_changed(index, &label);
    }

    /// Updates the configured opacity and re-applies it to the currently
    /// visible frame only; other cached, faded frames keep their state.
    pub fn set_opacity(&mut self, value: f64) {
        let value = value.clamp(0.0, 1.0);
        self.opacity = value;
        if self.shown {
            if let Some(key) = self.sequence.get(self.position).cloned() {
                self.cache.set_visible(&key, value);
            }
        }
        self.observer.opacity_changed(value);
    }

    /// Cancels pending autoplay, if any. Idempotent; returns whether a
    /// timer was actually cancelled, which the facade uses to implement a
    /// single toggle button.
    pub fn stop(&mut self) -> bool {
        match std::mem::replace(&mut self.mode, PlaybackMode::Stopped) {
            PlaybackMode::Playing(token) => {
                token.cancel();
                debug!("playback stopped");
                true
            }
            PlaybackMode::Stopped => false,
        }
    }

    /// Steps to the next frame. Manual navigation interrupts autoplay.
    pub fn next(&mut self) {
        self.stop();
        self.show_frame(self.position as i64 + 1);
    }

    /// Steps to the previous frame. Manual navigation interrupts autoplay.
    pub fn prev(&mut self) {
        self.stop();
        self.show_frame(self.position as i64 - 1);
    }

    /// Scrubs directly to `index` (wrapped). Interrupts autoplay.
    pub fn set_position(&mut self, index: i64) {
        self.stop();
        self.show_frame(index);
    }

    /// Stops playback and unmounts every layer. Called at session teardown,
    /// in this order, so a timer can never fire against released layers.
    pub fn teardown(&mut self) {
        self.stop();
        self.cache.release_all();
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.mode, PlaybackMode::Playing(_))
    }

    /// Transitions to playing. Only [`Player::play`] calls this, with the
    /// token its timer task watches.
    pub(crate) fn begin_playing(&mut self, token: CancellationToken) {
        self.mode = PlaybackMode::Playing(token);
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn sequence(&self) -> &FrameSequence {
        &self.sequence
    }

    /// Read access to the layer cache.
    pub fn cache(&self) -> &TileLayerCache<S> {
        &self.cache
    }
}
