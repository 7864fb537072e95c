//! Session configuration.
//!
//! One immutable structure, validated and defaulted at construction,
//! enumerating everything the engine consumes: cadence, frame count,
//! opacities, autoplay interval, run selection, and the URL template
//! parameters.

use super::error::SessionError;

/// Hours between model timesteps.
pub const DEFAULT_CADENCE_HOURS: u32 = 3;

/// Frames in the playback window.
pub const DEFAULT_FRAME_COUNT: usize = 8;

/// Opacity of the visible magnitude layer.
pub const DEFAULT_OPACITY: f64 = 0.6;

/// Milliseconds between autoplay frames.
pub const DEFAULT_INTERVAL_MS: u64 = 500;

/// Opacity of arrow layers when enabled.
pub const DEFAULT_ARROW_OPACITY: f64 = 0.8;

/// Model name keyed in the run-list document.
pub const DEFAULT_MODEL: &str = "inaflows";

/// How the session obtains its model run id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunSelector {
    /// Resolve the latest run from the run-list endpoint at load time.
    Auto,
    /// Use this id verbatim, bypassing resolution entirely.
    Fixed(String),
}

impl RunSelector {
    /// Parses the configuration sentinel: `"auto"` resolves, anything else
    /// is a fixed run id.
    pub fn parse(raw: &str) -> Self {
        if raw == "auto" {
            RunSelector::Auto
        } else {
            RunSelector::Fixed(raw.to_string())
        }
    }
}

/// Configuration for one playback session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Run-list endpoint, fetched when `run` is [`RunSelector::Auto`].
    pub modelrun_endpoint: String,

    /// Tile server base URL.
    pub base_url: String,

    /// Model name, both the run-list key and a URL path segment.
    pub model: String,

    /// Tile id path segment.
    pub tile_id: String,

    /// Level path segment.
    pub level: String,

    /// Fixed query parameters appended to every tile URL.
    pub query: String,

    /// Hours between frames.
    pub cadence_hours: u32,

    /// Number of frames in the window.
    pub frame_count: usize,

    /// Initial magnitude opacity.
    pub opacity: f64,

    /// Autoplay interval in milliseconds.
    pub interval_ms: u64,

    /// Whether to mount arrow layers alongside magnitude layers.
    pub arrows_enabled: bool,

    /// Constant opacity for arrow layers.
    pub arrow_opacity: f64,

    /// Run id selection.
    pub run: RunSelector,

    /// Explicit time keys, bypassing sequence construction when present.
    pub time_list: Option<Vec<String>>,
}

impl SessionConfig {
    /// Creates a config with defaults for the given endpoints.
    pub fn new(modelrun_endpoint: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            modelrun_endpoint: modelrun_endpoint.into(),
            base_url: base_url.into(),
            model: DEFAULT_MODEL.to_string(),
            tile_id: String::new(),
            level: String::new(),
            query: String::new(),
            cadence_hours: DEFAULT_CADENCE_HOURS,
            frame_count: DEFAULT_FRAME_COUNT,
            opacity: DEFAULT_OPACITY,
            interval_ms: DEFAULT_INTERVAL_MS,
            arrows_enabled: false,
            arrow_opacity: DEFAULT_ARROW_OPACITY,
            run: RunSelector::Auto,
            time_list: None,
        }
    }

    /// Set the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the tile id path segment.
    pub fn with_tile_id(mut self, tile_id: impl Into<String>) -> Self {
        self.tile_id = tile_id.into();
        self
    }

    /// Set the level path segment.
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Set the fixed tile query parameters.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Set the frame cadence in hours.
    pub fn with_cadence_hours(mut self, cadence_hours: u32) -> Self {
        self.cadence_hours = cadence_hours;
        self
    }

    /// Set the frame count.
    pub fn with_frame_count(mut self, frame_count: usize) -> Self {
        self.frame_count = frame_count;
        self
    }

    /// Set the initial magnitude opacity.
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    /// Set the autoplay interval.
    pub fn with_interval_ms(mut self, interval_ms: u64) -> Self {
        self.interval_ms = interval_ms;
        self
    }

    /// Enable arrow layers at the given opacity.
    pub fn with_arrows(mut self, opacity: f64) -> Self {
        self.arrows_enabled = true;
        self.arrow_opacity = opacity;
        self
    }

    /// Set the run selector.
    pub fn with_run(mut self, run: RunSelector) -> Self {
        self.run = run;
        self
    }

    /// Supply an explicit time list, bypassing sequence construction.
    pub fn with_time_list(mut self, keys: Vec<String>) -> Self {
        self.time_list = Some(keys);
        self
    }

    /// Validates the configuration. Called once by `Session::new`.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.cadence_hours == 0 {
            return Err(SessionError::Config(
                "cadence_hours must be at least 1".to_string(),
            ));
        }
        if self.interval_ms == 0 {
            return Err(SessionError::Config(
                "interval_ms must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("opacity", self.opacity),
            ("arrow_opacity", self.arrow_opacity),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(SessionError::Config(format!(
                    "{} must be a finite value in [0, 1], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}
