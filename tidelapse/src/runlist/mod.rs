//! Model run resolution.
//!
//! Tile URLs embed the identifier of the model run that produced the data.
//! The [`ModelRunResolver`] fetches the run-list document from the remote
//! endpoint (a JSON object mapping model name to an array of ISO-8601 UTC
//! timestamps) and selects the chronologically latest run.
//!
//! Resolution is deliberately infallible: a visualization must render with
//! a best-guess run rather than block indefinitely, so every failure
//! (network error, malformed JSON, missing model, empty list) falls back to
//! a deterministic run id derived from the current UTC date. Tile fetches
//! against a run the server does not have degrade to broken tiles, which is
//! the accepted trade-off.

mod http;

pub use http::{AsyncHttpClient, FetchError, ReqwestClient};

#[cfg(test)]
pub use http::tests::MockHttpClient;

use std::collections::HashMap;

use chrono::{DateTime, NaiveTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::timekey::TimeKey;

/// The run-list document: model name → ISO-8601 run timestamps, in no
/// guaranteed order.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
struct RunListDoc(HashMap<String, Vec<String>>);

/// Internal failure taxonomy for the success path. Never escapes
/// [`ModelRunResolver::resolve`]; mapped to the fallback run instead.
#[derive(Debug, Error)]
enum ResolveError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("run list is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("run list has no entries for model {0:?}")]
    MissingModel(String),

    #[error("run list for model {0:?} has no parseable timestamps")]
    NoParseableRuns(String),
}

/// Resolves the latest available model run from a remote run-list endpoint.
pub struct ModelRunResolver<C: AsyncHttpClient> {
    http_client: C,
    endpoint: String,
    model: String,
}

impl<C: AsyncHttpClient> ModelRunResolver<C> {
    /// Creates a resolver for `model` against `endpoint`.
    pub fn new(http_client: C, endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http_client,
            endpoint: endpoint.into(),
            model: model.into(),
        }
    }

    /// Resolves the latest run id. Never fails: all errors are mapped to
    /// the deterministic fallback run for the resolution-time instant.
    pub async fn resolve(&self) -> TimeKey {
        match self.try_resolve().await {
            Ok(run) => {
                debug!(model = %self.model, run = %run, "resolved latest model run");
                run
            }
            Err(err) => {
                let run = Self::fallback(Utc::now());
                warn!(
                    model = %self.model,
                    error = %err,
                    fallback = %run,
                    "model run resolution failed, using fallback run"
                );
                run
            }
        }
    }

    async fn try_resolve(&self) -> Result<TimeKey, ResolveError> {
        let body = self.http_client.get(&self.endpoint).await?;
        let runs: RunListDoc = serde_json::from_slice(&body)?;
        let entries = runs
            .0
            .get(&self.model)
            .filter(|list| !list.is_empty())
            .ok_or_else(|| ResolveError::MissingModel(self.model.clone()))?;

        // Parse to instants and compare chronologically rather than trusting
        // lexicographic order of the raw strings; individually malformed
        // entries are skipped, not fatal.
        let latest = entries
            .iter()
            .filter_map(|raw| {
                DateTime::parse_from_rfc3339(raw)
                    .map(|dt| dt.with_timezone(&Utc))
                    .ok()
            })
            .max()
            .ok_or_else(|| ResolveError::NoParseableRuns(self.model.clone()))?;

        Ok(TimeKey::encode(latest))
    }

    /// The deterministic fallback run: midnight UTC of `now`'s date,
    /// rendered `YYYYMMDD0000`.
    pub fn fallback(now: DateTime<Utc>) -> TimeKey {
        TimeKey::encode(now.date_naive().and_time(NaiveTime::MIN).and_utc())
    }
}
