//! Layout descriptors and the annotated block sequence they resolve to.

use std::borrow::Cow;

use crate::Block;

/// Deepest nesting of list and quote structure that is rendered. Deeper
/// indent levels are rendered at this depth.
pub const MAX_INDENT_DEPTH: usize = 8;

/// One entry of a post's layout array.
///
/// Indices always refer to positions in the post's raw block array.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum LayoutEntry {
    /// Ordered rows of block indices, optionally truncated.
    Rows {
        rows: Vec<Vec<usize>>,
        /// Last block index shown before "keep reading".
        truncate_after: Option<usize>,
    },
    /// Blocks forming the question of an ask.
    Ask {
        blocks: Vec<usize>,
        attribution: Option<AskAttribution>,
    },
    /// Entry type this crate does not understand.
    Unknown(String),
}

impl LayoutEntry {
    pub fn kind(&self) -> &str {
        match self {
            LayoutEntry::Rows { .. } => "rows",
            LayoutEntry::Ask { .. } => "ask",
            LayoutEntry::Unknown(kind) => kind,
        }
    }
}

/// Who asked the question of an ask post. Anonymous asks carry none.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AskAttribution {
    pub blog_name: String,
    pub url: Option<String>,
}

/// A block placed in render order, with wrapper markup around it.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedBlock<'a> {
    /// Borrowed from the post, or owned when synthesized.
    pub block: Cow<'a, Block>,
    /// Markup emitted before the block.
    pub prefix: String,
    /// Markup emitted after the block.
    pub suffix: String,
    pub is_ask: bool,
    pub ask_attribution: Option<AskAttribution>,
}

impl<'a> AnnotatedBlock<'a> {
    pub fn borrowed(block: &'a Block) -> Self {
        Self::new(Cow::Borrowed(block))
    }

    pub fn owned(block: Block) -> Self {
        Self::new(Cow::Owned(block))
    }

    fn new(block: Cow<'a, Block>) -> Self {
        Self {
            block,
            prefix: String::new(),
            suffix: String::new(),
            is_ask: false,
            ask_attribution: None,
        }
    }

    /// Mark the block as part of an ask.
    pub fn into_ask(mut self, attribution: Option<AskAttribution>) -> Self {
        self.is_ask = true;
        self.ask_attribution = attribution;
        self
    }

    /// Clear prefix and suffix.
    pub fn reset(&mut self) {
        self.prefix.clear();
        self.suffix.clear();
    }
}
