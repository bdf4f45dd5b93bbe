//! Layout resolution.

use neue_core::{
    AnnotatedBlock, AskAttribution, Block, ConversionResult, LayoutEntry, Post, ReadOptions,
    Severity, SubmissionBlock, TransformError, Warning, WarningKind,
};

/// Put `raw_blocks` in display order according to `layout`.
///
/// Layout indices always refer to `raw_blocks`. With no usable layout
/// entries the raw order is kept. Duplicate indices are dropped. Unless
/// `options.unroll` is set, a rows entry stops at `truncate_after + 1` and a
/// [`Block::ReadMore`] is appended. Ask blocks come first, each marked with
/// its attribution.
///
/// In strict mode unknown layout types and out-of-range indices are errors;
/// otherwise they are skipped with a warning.
pub fn resolve<'a>(
    raw_blocks: &'a [Block],
    layout: &[LayoutEntry],
    options: &ReadOptions,
) -> Result<ConversionResult<Vec<AnnotatedBlock<'a>>>, TransformError> {
    let mut resolver = Resolver::new(raw_blocks.len(), options);
    for entry in layout {
        resolver.apply(entry)?;
    }
    let Resolver {
        order,
        asks,
        truncated,
        has_rows,
        has_asks,
        warnings,
        ..
    } = resolver;

    if !has_rows && !has_asks {
        let blocks = raw_blocks.iter().map(AnnotatedBlock::borrowed).collect();
        return Ok(ConversionResult::with_warnings(blocks, warnings));
    }

    let mut order = order;
    if !has_rows {
        let covered = order.clone();
        order.extend((0..raw_blocks.len()).filter(|i| !covered.contains(i)));
    }

    // Stable partition: ask blocks first, everything else after, both in
    // resolved order.
    let (ask_order, rest): (Vec<usize>, Vec<usize>) = order
        .into_iter()
        .partition(|i| asks.iter().any(|(index, _)| index == i));

    let mut blocks = Vec::with_capacity(ask_order.len() + rest.len() + 1);
    for index in ask_order {
        let attribution = asks
            .iter()
            .find(|(i, _)| *i == index)
            .and_then(|(_, attribution)| attribution.clone());
        blocks.push(AnnotatedBlock::borrowed(&raw_blocks[index]).into_ask(attribution));
    }
    blocks.extend(rest.into_iter().map(|i| AnnotatedBlock::borrowed(&raw_blocks[i])));

    if truncated {
        blocks.push(AnnotatedBlock::owned(Block::ReadMore));
    }

    Ok(ConversionResult::with_warnings(blocks, warnings))
}

/// Resolve a post, appending the submission notice for submitted posts.
pub fn resolve_post<'a>(
    post: &'a Post,
    options: &ReadOptions,
) -> Result<ConversionResult<Vec<AnnotatedBlock<'a>>>, TransformError> {
    let mut result = resolve(&post.content, &post.layout, options)?;
    if post.is_submission {
        result
            .value
            .push(AnnotatedBlock::owned(Block::Submission(SubmissionBlock {
                submitted_by: post.submitter().to_string(),
            })));
    }
    Ok(result)
}

struct Resolver {
    len: usize,
    strict: bool,
    unroll: bool,
    seen: Vec<bool>,
    order: Vec<usize>,
    asks: Vec<(usize, Option<AskAttribution>)>,
    truncated: bool,
    has_rows: bool,
    has_asks: bool,
    warnings: Vec<Warning>,
}

impl Resolver {
    fn new(len: usize, options: &ReadOptions) -> Self {
        Self {
            len,
            strict: options.strict,
            unroll: options.unroll,
            seen: vec![false; len],
            order: Vec::new(),
            asks: Vec::new(),
            truncated: false,
            has_rows: false,
            has_asks: false,
            warnings: Vec::new(),
        }
    }

    fn apply(&mut self, entry: &LayoutEntry) -> Result<(), TransformError> {
        match entry {
            LayoutEntry::Rows {
                rows,
                truncate_after,
            } => {
                self.has_rows = true;
                if self.truncated {
                    return Ok(());
                }
                let cutoff = truncate_after
                    .filter(|_| !self.unroll)
                    .and_then(|t| t.checked_add(1));
                for row in rows {
                    for &index in row {
                        if cutoff == Some(index) {
                            tracing::debug!(index, "layout truncated");
                            self.truncated = true;
                            return Ok(());
                        }
                        self.take(index)?;
                    }
                }
            }
            LayoutEntry::Ask {
                blocks,
                attribution,
            } => {
                self.has_asks = true;
                // Rows usually list the ask blocks too, before the ask entry.
                for &index in blocks {
                    self.take(index)?;
                    if index < self.len && !self.asks.iter().any(|(i, _)| *i == index) {
                        self.asks.push((index, attribution.clone()));
                    }
                }
            }
            LayoutEntry::Unknown(kind) => {
                if self.strict {
                    return Err(TransformError::UnknownLayoutType(kind.clone()));
                }
                self.warnings.push(Warning::new(
                    Severity::Minor,
                    WarningKind::UnknownLayout(kind.clone()),
                    format!("unknown layout type `{kind}`, ignored"),
                ));
            }
        }
        Ok(())
    }

    /// Append `index` to the order. Returns whether it was added.
    fn take(&mut self, index: usize) -> Result<bool, TransformError> {
        if index >= self.len {
            if self.strict {
                return Err(TransformError::LayoutIndexOutOfRange {
                    index,
                    len: self.len,
                });
            }
            self.warnings.push(Warning::new(
                Severity::Minor,
                WarningKind::LayoutIndexOutOfRange(index),
                format!("layout index {index} out of range for {} blocks", self.len),
            ));
            return Ok(false);
        }
        if self.seen[index] {
            tracing::debug!(index, "dropped duplicate layout index");
            return Ok(false);
        }
        self.seen[index] = true;
        self.order.push(index);
        Ok(true)
    }
}
