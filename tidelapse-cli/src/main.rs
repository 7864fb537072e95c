//! Tidelapse CLI - headless playback driver
//!
//! Loads a playback session against a logging map surface and steps through
//! a number of autoplay frames. Useful for checking run resolution, frame
//! windows, and the tile URLs a deployment will request, without a browser
//! or map widget.

use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tidelapse::{
    AnimationObserver, LayerId, MapSurface, ReqwestClient, RunSelector, Session, SessionConfig,
};

#[derive(Parser, Debug)]
#[command(name = "tidelapse", version, about = "Animated sea-current tile playback")]
struct Args {
    /// Run-list endpoint returning JSON model run timestamps
    #[arg(long)]
    endpoint: String,

    /// Tile server base URL
    #[arg(long)]
    base_url: String,

    /// Model name (run-list key and URL path segment)
    #[arg(long, default_value = "inaflows")]
    model: String,

    /// Tile id path segment
    #[arg(long, default_value = "sfc")]
    tile_id: String,

    /// Level path segment
    #[arg(long, default_value = "L1")]
    level: String,

    /// Fixed query parameters appended to tile URLs
    #[arg(long, default_value = "")]
    query: String,

    /// Frames in the playback window
    #[arg(long, default_value_t = 8)]
    frames: usize,

    /// Hours between frames
    #[arg(long, default_value_t = 3)]
    cadence: u32,

    /// Autoplay interval in milliseconds
    #[arg(long, default_value_t = 500)]
    interval_ms: u64,

    /// Magnitude layer opacity
    #[arg(long, default_value_t = 0.6)]
    opacity: f64,

    /// Mount direction-arrow layers as well
    #[arg(long)]
    arrows: bool,

    /// Run id, or "auto" to resolve the latest from the endpoint
    #[arg(long, default_value = "auto")]
    run: String,

    /// Number of autoplay frames to step through before exiting
    #[arg(long, default_value_t = 8)]
    steps: u32,
}

/// Map surface that logs every mutation instead of rendering.
#[derive(Default)]
struct LogSurface {
    mounted: std::collections::HashSet<LayerId>,
}

impl MapSurface for LogSurface {
    fn mount(&mut self, id: LayerId, url_template: &str) {
        info!(%id, url = url_template, "mount");
        self.mounted.insert(id);
    }

    fn unmount(&mut self, id: LayerId) {
        info!(%id, "unmount");
        self.mounted.remove(&id);
    }

    fn is_mounted(&self, id: LayerId) -> bool {
        self.mounted.contains(&id)
    }

    fn set_opacity(&mut self, id: LayerId, opacity: f64) {
        info!(%id, opacity, "set opacity");
    }
}

/// Observer that logs frame changes the way a UI would display them.
struct LogObserver;

impl AnimationObserver for LogObserver {
    fn position_changed(&mut self, index: usize, label: &str) {
        info!(index, label, "frame");
    }

    fn opacity_changed(&mut self, value: f64) {
        info!(value, "opacity");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let config = SessionConfig::new(args.endpoint, args.base_url)
        .with_model(args.model)
        .with_tile_id(args.tile_id)
        .with_level(args.level)
        .with_query(args.query)
        .with_frame_count(args.frames)
        .with_cadence_hours(args.cadence)
        .with_interval_ms(args.interval_ms)
        .with_opacity(args.opacity)
        .with_run(RunSelector::parse(&args.run));
    let config = if args.arrows {
        config.with_arrows(tidelapse::session::DEFAULT_ARROW_OPACITY)
    } else {
        config
    };

    let http_client = ReqwestClient::new()?;
    let mut session = Session::new(config, http_client)?;
    session.load(LogSurface::default(), Box::new(LogObserver)).await?;

    if let Some(player) = session.player() {
        player.play();
        tokio::time::sleep(Duration::from_millis(
            args.interval_ms * u64::from(args.steps) + args.interval_ms / 2,
        ))
        .await;
        player.stop();
    }

    session.unload();
    Ok(())
}
