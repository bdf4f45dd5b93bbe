//! neue - NPF post threads to sanitized HTML and preview Markdown.
//!
//! A post payload, as served by the upstream API, carries its reblog trail
//! as a list of posts in the Neue Post Format: typed content blocks plus a
//! layout that reorders, truncates and marks asks by block index. neue reads
//! that into an immutable [`Thread`] and renders it:
//! - [`Thread::to_html`] nests each earlier post in a quote and runs the
//!   result through the allow-list sanitizer;
//! - [`Thread::to_markdown`] flattens the thread for link-preview text.
//!
//! # Quick Start
//!
//! ```rust
//! use neue::prelude::*;
//!
//! let payload = serde_json::json!({
//!     "id_string": "2",
//!     "blog_name": "b",
//!     "timestamp": 1700000000,
//!     "trail": [{
//!         "blog": { "name": "a" },
//!         "post": { "id": "1" },
//!         "content": [{ "type": "text", "text": "hello" }],
//!         "layout": []
//!     }],
//!     "content": [{ "type": "text", "text": "world" }],
//!     "layout": []
//! });
//!
//! let thread = Thread::from_payload(&payload, &ReadOptions::default()).unwrap();
//! let markdown = thread.to_markdown(&MarkdownOptions::default()).unwrap();
//! assert_eq!(markdown, "a:\nhello\n\nb:\nworld");
//! ```
//!
//! # Architecture
//!
//! Each stage lives in its own crate and is re-exported here:
//! - [`payload`] reads API payloads into [`Post`]s;
//! - [`transforms`] resolves layouts and computes list and quote wrappers;
//! - [`html`] and [`markdown`] write annotated block sequences;
//! - [`sanitize`] is the final HTML allow-list pass.
//!
//! Rendering never mutates a thread: every call resolves and annotates a
//! fresh block sequence.

pub use neue_core::*;

mod error;
mod thread;

pub mod embed;
pub mod render_path;

pub use error::Error;
pub use neue_read_payload::{
    AvatarSource, FetchError, PollResultsMap, PollResultsSource, PostSource,
};
pub use thread::{Thread, ThreadInfo};

/// Payload reading.
pub mod payload {
    pub use neue_read_payload::{
        ParsedThread, parse, parse_block, parse_layout, parse_value, parse_with_options,
        vote_counts,
    };
}

/// Layout resolution and wrapper annotation.
pub mod transforms {
    pub use neue_transforms::{MAX_INDENT_DEPTH, annotate, prepare, resolve, resolve_post};
}

/// HTML writer.
pub mod html {
    pub use neue_write_html::{IMAGE_WIDTH, emit, emit_block, emit_with_options};
}

/// Markdown writer.
pub mod markdown {
    pub use neue_write_markdown::{IMAGE_WIDTH, emit, emit_block, emit_with_options};
}

/// HTML allow-list sanitizer.
pub mod sanitize {
    pub use neue_sanitize::{allowed_attributes, is_safe_url, sanitize};
}

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        Block, ConversionResult, Error, HtmlOptions, MarkdownOptions, Post, ReadOptions, Thread,
        ThreadInfo,
    };
}
