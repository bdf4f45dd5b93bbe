//! Error types, split by pipeline phase.

/// Error while reading an upstream payload into the block model.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    #[error("missing required field `{field}` in {context}")]
    MissingRequiredField {
        field: &'static str,
        context: String,
    },
    #[error("unimplemented block kind: {0}")]
    UnimplementedBlockKind(String),
    #[error("unknown layout type: {0}")]
    UnknownLayoutType(String),
    #[error("invalid json: {0}")]
    InvalidJson(String),
}

impl ParseError {
    pub fn missing(field: &'static str, context: impl Into<String>) -> Self {
        ParseError::MissingRequiredField {
            field,
            context: context.into(),
        }
    }
}

/// Error while rendering blocks to HTML or Markdown.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("unsupported formatting kind: {0}")]
    UnsupportedFormattingKind(String),
}

/// Error while resolving layouts.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("unknown layout type: {0}")]
    UnknownLayoutType(String),
    #[error("layout references block {index} but the post has {len} blocks")]
    LayoutIndexOutOfRange { index: usize, len: usize },
}
