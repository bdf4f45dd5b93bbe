//! A single post: the root of a thread or one of its reblogs.

use crate::{AskAttribution, Block, LayoutEntry};

/// A post with its raw content blocks and layout.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Post {
    pub blog_name: String,
    pub avatar_url: Option<String>,
    pub post_id: String,
    pub post_url: String,
    pub tags: Vec<String>,
    pub is_submission: bool,
    pub submitted_by: Option<String>,
    /// Raw blocks in upstream order. Layouts index into this.
    pub content: Vec<Block>,
    pub layout: Vec<LayoutEntry>,
}

impl Post {
    pub fn new(blog_name: impl Into<String>, post_id: impl Into<String>) -> Self {
        let blog_name = blog_name.into();
        let post_id = post_id.into();
        Self {
            post_url: post_url(&blog_name, &post_id),
            blog_name,
            post_id,
            ..Self::default()
        }
    }

    /// Append a content block.
    pub fn with_block(mut self, block: Block) -> Self {
        self.content.push(block);
        self
    }

    /// Append a layout entry.
    pub fn with_layout(mut self, entry: LayoutEntry) -> Self {
        self.layout.push(entry);
        self
    }

    /// Whether any layout entry marks an ask.
    pub fn has_ask(&self) -> bool {
        self.layout
            .iter()
            .any(|entry| matches!(entry, LayoutEntry::Ask { .. }))
    }

    /// Attribution of the first ask entry, if the asker is not anonymous.
    pub fn ask_attribution(&self) -> Option<&AskAttribution> {
        self.layout.iter().find_map(|entry| match entry {
            LayoutEntry::Ask { attribution, .. } => attribution.as_ref(),
            _ => None,
        })
    }

    /// Indices of blocks that belong to an ask.
    pub fn ask_indices(&self) -> Vec<usize> {
        let mut indices = Vec::new();
        for entry in &self.layout {
            if let LayoutEntry::Ask { blocks, .. } = entry {
                for &index in blocks {
                    if !indices.contains(&index) {
                        indices.push(index);
                    }
                }
            }
        }
        indices
    }

    /// Raw blocks that are not part of an ask, in upstream order.
    pub fn non_ask_blocks(&self) -> impl Iterator<Item = &Block> {
        let asks = self.ask_indices();
        self.content
            .iter()
            .enumerate()
            .filter(move |(i, _)| !asks.contains(i))
            .map(|(_, block)| block)
    }

    /// Name shown for a submission: the submitter, else the blog.
    pub fn submitter(&self) -> &str {
        self.submitted_by.as_deref().unwrap_or(&self.blog_name)
    }
}

/// Canonical URL of a post.
pub fn post_url(blog_name: &str, post_id: &str) -> String {
    format!("https://www.tumblr.com/{blog_name}/{post_id}")
}
