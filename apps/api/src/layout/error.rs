use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the layout core.
///
/// Only font resolution can fail. An unfittable wrap is reported through
/// `WrappedBlock::degenerate`, never as an error.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("Font file {path} could not be read: {source}")]
    FontRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Font file {path} could not be loaded: {reason}")]
    FontLoad { path: PathBuf, reason: String },
}
