//! neue-core: the NPF (Neue Post Format) document model.
//!
//! This crate holds the block model, layout descriptors, the formatting
//! engine shared by both writers, and the error and warning types used
//! across the workspace. It performs no I/O.

mod block;
mod error;
mod fidelity;
pub mod formatting;
mod layout;
mod media;
mod options;
mod post;

pub use block::*;
pub use error::*;
pub use fidelity::*;
pub use formatting::{FormattingKind, FormattingRange, ItalicMarker, MentionedBlog, Target};
pub use layout::*;
pub use media::*;
pub use options::*;
pub use post::*;
