//! Autoplay timer wrapping the controller.
//!
//! [`Player`] shares the [`AnimationController`] with a tokio timer task via
//! `Arc<Mutex<_>>`. The timer advances one frame per interval until its
//! cancellation token fires; `stop()` on the controller is the single
//! cancellation path and is safe to call from any state.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::AnimationController;
use crate::surface::MapSurface;

/// Facade over the controller adding timer-driven playback.
///
/// All imperative entry points the presentation layer wires buttons to live
/// here: `play`, `stop`, `play_stop`, `next`, `prev`, `set_position`,
/// `set_opacity`.
pub struct Player<S: MapSurface + Send + 'static> {
    controller: Arc<Mutex<AnimationController<S>>>,
    interval: Duration,
}

impl<S: MapSurface + Send + 'static> Player<S> {
    pub fn new(controller: AnimationController<S>, interval: Duration) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
            interval,
        }
    }

    /// Starts autoplay: advances one frame immediately, then one frame per
    /// interval. No-op when already playing.
    ///
    /// Must be called from within a tokio runtime (the timer is a spawned
    /// task).
    pub fn play(&self) {
        let token = {
            let mut ctrl = self.controller.lock();
            // Nothing to animate: stay Stopped rather than arming a timer
            // whose ticks could never advance anything.
            if ctrl.is_playing() || ctrl.sequence().is_empty() {
                return;
            }
            let target = ctrl.position() as i64 + 1;
            ctrl.show_frame(target);
            let token = CancellationToken::new();
            ctrl.begin_playing(token.clone());
            token
        };
        debug!(interval_ms = self.interval.as_millis() as u64, "playback started");

        let controller = Arc::clone(&self.controller);
        let interval = self.interval;
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {
                        let mut ctrl = controller.lock();
                        // A stop between ticks wins; never advance after it.
                        if !ctrl.is_playing() {
                            break;
                        }
                        let target = ctrl.position() as i64 + 1;
                        ctrl.show_frame(target);
                    }
                }
            }
        });
    }

    /// Cancels autoplay if running; returns whether a timer was cancelled.
    pub fn stop(&self) -> bool {
        self.controller.lock().stop()
    }

    /// Single-button toggle: stop if playing, otherwise start playing.
    /// Needs no separately tracked boolean.
    pub fn play_stop(&self) {
        if !self.stop() {
            self.play();
        }
    }

    /// Steps forward one frame, interrupting autoplay.
    pub fn next(&self) {
        self.controller.lock().next();
    }

    /// Steps backward one frame, interrupting autoplay.
    pub fn prev(&self) {
        self.controller.lock().prev();
    }

    /// Scrubs to an arbitrary (wrapped) index, interrupting autoplay.
    pub fn set_position(&self, index: i64) {
        self.controller.lock().set_position(index);
    }

    /// Updates the configured opacity for the visible frame.
    pub fn set_opacity(&self, value: f64) {
        self.controller.lock().set_opacity(value);
    }

    /// Stops playback and releases every layer, in that order.
    pub fn shutdown(&self) {
        self.controller.lock().teardown();
    }

    pub fn is_playing(&self) -> bool {
        self.controller.lock().is_playing()
    }

    /// Current frame index.
    pub fn position(&self) -> usize {
        self.controller.lock().position()
    }

    /// Runs `f` with read access to the controller.
    pub fn with_controller<R>(&self, f: impl FnOnce(&AnimationController<S>) -> R) -> R {
        f(&self.controller.lock())
    }
}
