//! Tile URL template construction.
//!
//! The tile server exposes one route per layer kind:
//!
//! - magnitude: `<base>/mpl_req/<model>/<tile_id>/<level>/<run>/<key>/{z}/{x}/{y}.png?<query>`
//! - arrows:    `<base>/arr_req/<model>/<tile_id>/<level>/<run>/<key>/{z}/{x}/{y}.png?<query>`
//!
//! The `{z}/{x}/{y}` placeholders are left verbatim; the host map surface
//! fills them per visible tile.

use super::LayerKind;
use crate::timekey::TimeKey;

/// Builds per-frame tile URL templates for one session.
///
/// The run id is fixed at construction and held constant for the lifetime
/// of the loaded session.
#[derive(Debug, Clone)]
pub struct TileUrlTemplate {
    base_url: String,
    model: String,
    tile_id: String,
    level: String,
    run: String,
    query: String,
}

impl TileUrlTemplate {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        tile_id: impl Into<String>,
        level: impl Into<String>,
        run: impl Into<String>,
        query: impl Into<String>,
    ) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            model: model.into(),
            tile_id: tile_id.into(),
            level: level.into(),
            run: run.into(),
            query: query.into(),
        }
    }

    /// The run id the session was loaded with.
    pub fn run(&self) -> &str {
        &self.run
    }

    /// Builds the URL template for one layer kind at one timestep.
    pub fn url_for(&self, kind: LayerKind, key: &TimeKey) -> String {
        let mut url = format!(
            "{}/{}/{}/{}/{}/{}/{}/{{z}}/{{x}}/{{y}}.png",
            self.base_url,
            kind.route(),
            self.model,
            self.tile_id,
            self.level,
            self.run,
            key
        );
        if !self.query.is_empty() {
            url.push('?');
            url.push_str(&self.query);
        }
        url
    }
}
