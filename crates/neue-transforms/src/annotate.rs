//! Wrapper tag annotation for lists and indented blocks.

use neue_core::{AnnotatedBlock, MAX_INDENT_DEPTH};

/// Compute the wrapper-tag prefix and suffix of every block.
///
/// Walks the sequence once, keeping a stack of open wrapper tags. Each
/// block's subtype and indent level select the stack it needs: the family's
/// tag repeated up to `indent_level + 1` deep, keeping any outer tags of the
/// current stack. Tags above the common prefix of the two stacks are closed
/// in the block's prefix, then the missing ones are opened. Whatever is still
/// open after the last block is closed in its suffix, so every opening tag
/// has a matching closing tag.
///
/// Existing annotations are cleared first, so calling this twice gives the
/// same result as calling it once.
pub fn annotate(blocks: &mut [AnnotatedBlock<'_>]) {
    let mut stack: Vec<&'static str> = Vec::new();

    for block in blocks.iter_mut() {
        block.reset();

        let target = target_stack(
            &stack,
            block.block.subtype().wrapper_tag(),
            block.block.indent_level(),
        );
        let common = stack
            .iter()
            .zip(&target)
            .take_while(|(open, wanted)| open == wanted)
            .count();

        while stack.len() > common {
            if let Some(tag) = stack.pop() {
                block.prefix.push_str(&format!("</{tag}>"));
            }
        }
        for &tag in &target[common..] {
            block.prefix.push_str(&format!("<{tag}>"));
            stack.push(tag);
        }
    }

    if let Some(last) = blocks.last_mut() {
        while let Some(tag) = stack.pop() {
            last.suffix.push_str(&format!("</{tag}>"));
        }
    }
}

fn target_stack(
    stack: &[&'static str],
    family: Option<&'static str>,
    indent_level: u32,
) -> Vec<&'static str> {
    let Some(tag) = family else {
        return Vec::new();
    };
    let depth = usize::try_from(indent_level)
        .unwrap_or(usize::MAX)
        .saturating_add(1)
        .min(MAX_INDENT_DEPTH);
    let keep = stack.len().min(depth - 1);
    let mut target = stack[..keep].to_vec();
    target.resize(depth, tag);
    target
}
