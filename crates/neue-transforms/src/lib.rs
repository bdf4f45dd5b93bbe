//! Block sequence transforms for neue.
//!
//! Turning a post into renderable order happens in two steps:
//! - [`resolve`] applies the post's layout to its raw blocks, deduplicating,
//!   truncating and moving ask blocks to the front;
//! - [`annotate`] computes the wrapper tags (`<ol>`, `<ul>`, `<blockquote>`)
//!   that open and close around runs of list and indented blocks.
//!
//! Both return or rewrite a fresh sequence on every call; the post itself is
//! never modified.

mod annotate;
mod resolve;

pub use annotate::annotate;
pub use neue_core::MAX_INDENT_DEPTH;
pub use resolve::{resolve, resolve_post};

use neue_core::{AnnotatedBlock, ConversionResult, Post, ReadOptions, TransformError};

/// Resolve and annotate a post in one go.
///
/// The leading ask blocks and the answer are annotated separately, so no
/// wrapper tag spans the boundary between question and answer.
pub fn prepare<'a>(
    post: &'a Post,
    options: &ReadOptions,
) -> Result<ConversionResult<Vec<AnnotatedBlock<'a>>>, TransformError> {
    let mut result = resolve_post(post, options)?;
    let asks = result.value.iter().take_while(|b| b.is_ask).count();
    let (question, answer) = result.value.split_at_mut(asks);
    annotate(question);
    annotate(answer);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use neue_core::{Block, LayoutEntry, Subtype, TextBlock};

    #[test]
    fn test_prepare_splits_ask_from_answer() {
        let item = |text: &str| {
            Block::Text(TextBlock::new(text).with_subtype(Subtype::UnorderedListItem))
        };
        let post = Post::new("blog", "1")
            .with_block(item("q"))
            .with_block(item("a"))
            .with_layout(LayoutEntry::Ask {
                blocks: vec![0],
                attribution: None,
            });
        let blocks = prepare(&post, &ReadOptions::default()).unwrap().value;
        assert_eq!(blocks[0].prefix, "<ul>");
        assert_eq!(blocks[0].suffix, "</ul>");
        assert_eq!(blocks[1].prefix, "<ul>");
        assert_eq!(blocks[1].suffix, "</ul>");
    }
}
