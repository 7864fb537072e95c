//! Session error types.

use thiserror::Error;

use crate::timekey::TimeKeyError;

/// Errors surfaced to the embedder at the session boundary.
///
/// Deliberately small: run resolution recovers internally (see the runlist
/// module) and tile fetch failures belong to the host surface, so the only
/// fallible seams are configuration validation and explicit time-list
/// parsing.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Configuration rejected at construction.
    #[error("configuration error: {0}")]
    Config(String),

    /// An entry of the explicit time list failed to parse.
    #[error("invalid time key in time list: {0}")]
    TimeKey(#[from] TimeKeyError),
}
