use neue_core::{EmitError, ParseError, TransformError};
use neue_read_payload::FetchError;

use crate::render_path::RenderPathError;

/// Any failure while building or rendering a thread.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Emit(#[from] EmitError),

    #[error(transparent)]
    RenderPath(#[from] RenderPathError),
}
