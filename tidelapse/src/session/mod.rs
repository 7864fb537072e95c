//! Session lifecycle: load, drive, unload.
//!
//! [`Session`] wires the pieces together, mirroring the data flow
//! `load()` → run resolution → sequence construction → controller
//! initialization → first visible frame. Everything a load creates (layers,
//! controller, timer) is destroyed en masse by `unload()`; no entity
//! outlives its session.
//!
//! Overlapping loads: `load` takes `&mut self`, so two resolutions for the
//! same session cannot race — a second `load` cannot begin until the first
//! completes, and it starts by tearing down the previous session's player
//! and layers. This supersedes the unguarded behavior where a stale
//! resolution could win non-deterministically.

mod config;
mod error;

pub use config::{
    RunSelector, SessionConfig, DEFAULT_ARROW_OPACITY, DEFAULT_CADENCE_HOURS,
    DEFAULT_FRAME_COUNT, DEFAULT_INTERVAL_MS, DEFAULT_MODEL, DEFAULT_OPACITY,
};
pub use error::SessionError;

use std::time::Duration;

use chrono::Utc;
use tracing::info;

use crate::animation::{AnimationController, AnimationObserver, NullObserver, Player};
use crate::layer::{TileLayerCache, TileUrlTemplate};
use crate::runlist::{AsyncHttpClient, ModelRunResolver};
use crate::series::{best_start_index, build_sequence, FrameSequence};
use crate::surface::MapSurface;
use crate::timekey::TimeKey;

/// One animated tile playback session against a host map surface.
pub struct Session<S, C>
where
    S: MapSurface + Send + 'static,
    C: AsyncHttpClient,
{
    config: SessionConfig,
    resolver: ModelRunResolver<C>,
    player: Option<Player<S>>,
}

impl<S, C> std::fmt::Debug for Session<S, C>
where
    S: MapSurface + Send + 'static,
    C: AsyncHttpClient,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<S, C> Session<S, C>
where
    S: MapSurface + Send + 'static,
    C: AsyncHttpClient,
{
    /// Creates a session from a validated configuration.
    pub fn new(config: SessionConfig, http_client: C) -> Result<Self, SessionError> {
        config.validate()?;
        let resolver = ModelRunResolver::new(
            http_client,
            config.modelrun_endpoint.clone(),
            config.model.clone(),
        );
        Ok(Self {
            config,
            resolver,
            player: None,
        })
    }

    /// Loads the session onto `surface`: resolves the run, builds the frame
    /// sequence, shows the best starting frame, and arms the player.
    ///
    /// A reload tears down the previous load first.
    pub async fn load(
        &mut self,
        surface: S,
        observer: Box<dyn AnimationObserver>,
    ) -> Result<(), SessionError> {
        self.unload();

        let run = match &self.config.run {
            RunSelector::Fixed(id) => id.clone(),
            RunSelector::Auto => self.resolver.resolve().await.to_string(),
        };

        let sequence = self.build_frames()?;
        let start = best_start_index(&sequence, Utc::now());
        info!(
            run = %run,
            frames = sequence.len(),
            start,
            "session loaded"
        );

        let template = TileUrlTemplate::new(
            self.config.base_url.clone(),
            self.config.model.clone(),
            self.config.tile_id.clone(),
            self.config.level.clone(),
            run,
            self.config.query.clone(),
        );
        let cache = TileLayerCache::new(
            surface,
            template,
            self.config.arrows_enabled,
            self.config.arrow_opacity,
        );
        let mut controller = AnimationController::new(cache, self.config.opacity, observer);
        controller.initialize(sequence, start);
        controller.show_frame(start as i64);

        self.player = Some(Player::new(
            controller,
            Duration::from_millis(self.config.interval_ms),
        ));
        Ok(())
    }

    /// Loads with a no-op observer.
    pub async fn load_silent(&mut self, surface: S) -> Result<(), SessionError> {
        self.load(surface, Box::new(NullObserver)).await
    }

    /// Stops playback, then unmounts and drops everything the load created.
    /// Safe to call when nothing is loaded.
    pub fn unload(&mut self) {
        if let Some(player) = self.player.take() {
            // Stop-before-release: the timer must never fire against
            // unmounted layers.
            player.shutdown();
            info!("session unloaded");
        }
    }

    /// The player for the current load, if any. All playback entry points
    /// (`play`, `stop`, `play_stop`, `next`, `prev`, `set_position`,
    /// `set_opacity`) live on it.
    pub fn player(&self) -> Option<&Player<S>> {
        self.player.as_ref()
    }

    /// The session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn build_frames(&self) -> Result<FrameSequence, SessionError> {
        match &self.config.time_list {
            Some(list) => {
                let keys = list
                    .iter()
                    .map(|raw| TimeKey::from_key(raw))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(FrameSequence::new(keys))
            }
            None => Ok(build_sequence(
                self.config.frame_count,
                self.config.cadence_hours,
                Utc::now(),
            )),
        }
    }
}
