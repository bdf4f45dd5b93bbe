//! HTML writer for neue.
//!
//! Emits resolved, annotated block sequences as HTML fragments. The output
//! uses a small fixed vocabulary of tags and classes, which is exactly what
//! `neue-sanitize` lets through. Media is rendered statically: videos become
//! their poster with a play-button overlay, never a `<video>` element.

use neue_core::formatting::{apply_formatting, escape_attr, escape_html};
use neue_core::{
    AnnotatedBlock, AskAttribution, AudioBlock, Block, EmitError, HtmlOptions, ImageBlock,
    LinkBlock, MediaList, PollBlock, Subtype, Target, TextBlock, VideoBlock,
};

/// Rendition width used for images and posters.
pub const IMAGE_WIDTH: u32 = 540;

const PLAY_BUTTON: &str = "<svg class=\"play-button\" width=\"72\" role=\"presentation\" fill=\"#ffffff\" viewBox=\"0 0 24 24\"><path d=\"M20.508 11.126a1.022 1.022 0 010 1.748L7.257 20.788C6.258 21.384 5 20.653 5 19.478V4.522c0-1.176 1.258-1.907 2.257-1.31l13.25 7.913z\"></path></svg>";

/// Emit an annotated block sequence with default options.
pub fn emit(blocks: &[AnnotatedBlock<'_>]) -> Result<String, EmitError> {
    emit_with_options(blocks, &HtmlOptions::default())
}

/// Emit an annotated block sequence.
///
/// Leading ask blocks are grouped under a question header. Each block is
/// written between its prefix and suffix.
pub fn emit_with_options(
    blocks: &[AnnotatedBlock<'_>],
    options: &HtmlOptions,
) -> Result<String, EmitError> {
    let mut ctx = EmitContext::new(options);

    let asks = blocks.iter().take_while(|b| b.is_ask).count();
    if asks > 0 {
        emit_question_header(blocks[0].ask_attribution.as_ref(), &mut ctx);
    }

    for (i, block) in blocks.iter().enumerate() {
        ctx.write(&block.prefix);
        emit_block_into(&block.block, &mut ctx)?;
        ctx.write(&block.suffix);
        if i + 1 == asks {
            ctx.write("</div>");
        }
    }

    Ok(ctx.output)
}

/// Emit a single block.
///
/// List and quote wrapper tags (`<ol>`, `<ul>`, `<blockquote>`) are not
/// produced here; they come from `neue_transforms::annotate`. An indented or
/// list block rendered alone is therefore a bare `<p>` or `<li>`.
pub fn emit_block(block: &Block, options: &HtmlOptions) -> Result<String, EmitError> {
    let mut ctx = EmitContext::new(options);
    emit_block_into(block, &mut ctx)?;
    Ok(ctx.output)
}

struct EmitContext<'o> {
    output: String,
    options: &'o HtmlOptions,
}

impl<'o> EmitContext<'o> {
    fn new(options: &'o HtmlOptions) -> Self {
        Self {
            output: String::new(),
            options,
        }
    }

    fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    fn write_text(&mut self, s: &str) {
        self.output.push_str(&escape_html(s));
    }

    /// Write `<tag class="class">text</tag>` when `text` is present.
    fn write_optional(&mut self, tag: &str, class: &str, text: Option<&str>) {
        if let Some(text) = text.filter(|t| !t.is_empty()) {
            self.write(&format!("<{tag} class=\"{class}\">"));
            self.write_text(text);
            self.write(&format!("</{tag}>"));
        }
    }

    fn write_img(&mut self, class: Option<&str>, media: &MediaList, alt: Option<&str>) {
        let Some(rendition) = media.pick_one_size(IMAGE_WIDTH) else {
            return;
        };
        self.write("<img");
        if let Some(class) = class {
            self.write(&format!(" class=\"{class}\""));
        }
        self.write(" src=\"");
        self.write(&escape_attr(&rendition.url));
        self.write("\"");
        if let Some(alt) = alt {
            self.write(" alt=\"");
            self.write(&escape_attr(alt));
            self.write("\"");
        }
        self.write(">");
    }
}

fn emit_question_header(attribution: Option<&AskAttribution>, ctx: &mut EmitContext<'_>) {
    ctx.write("<div class=\"question\"><p class=\"question-header\">");
    match attribution {
        Some(AskAttribution {
            blog_name,
            url: Some(url),
        }) => {
            ctx.write("<a href=\"");
            ctx.write(&escape_attr(url));
            ctx.write("\">");
            ctx.write_text(blog_name);
            ctx.write("</a>");
        }
        Some(AskAttribution { blog_name, .. }) => ctx.write_text(blog_name),
        None => ctx.write("Anonymous"),
    }
    ctx.write(" asked:</p>");
}

fn emit_block_into(block: &Block, ctx: &mut EmitContext<'_>) -> Result<(), EmitError> {
    match block {
        Block::Text(text) => emit_text(text, ctx)?,
        Block::Image(image) => emit_image(image, ctx),
        Block::Video(video) => emit_video(video, ctx),
        Block::Audio(audio) => emit_audio(audio, ctx),
        Block::Link(link) => emit_link(link, ctx),
        Block::Poll(poll) => emit_poll(poll, ctx),
        Block::ReadMore => ctx.write("<div class=\"read-more\"><p>Keep reading</p></div>"),
        Block::Submission(submission) => {
            ctx.write("<div class=\"submission\"><p>Submitted by ");
            ctx.write_text(&submission.submitted_by);
            ctx.write("</p></div>");
        }
    }
    Ok(())
}

fn emit_text(block: &TextBlock, ctx: &mut EmitContext<'_>) -> Result<(), EmitError> {
    let body = if block.text.is_empty() {
        if block.subtype == Subtype::None {
            return Ok(());
        }
        "<br>".to_string()
    } else {
        apply_formatting(&block.text, &block.formatting, Target::Html, false)?.replace('\n', "<br>")
    };

    let (open, close) = match block.subtype {
        Subtype::Heading1 => ("<h1>", "</h1>"),
        Subtype::Heading2 => ("<h2>", "</h2>"),
        Subtype::OrderedListItem | Subtype::UnorderedListItem => ("<li>", "</li>"),
        Subtype::Indented => ("<p>", "</p>"),
        Subtype::Quote => ("<p class=\"npf-quote\">", "</p>"),
        Subtype::Chat => ("<p class=\"npf-chat\">", "</p>"),
        Subtype::Quirky => ("<p class=\"npf-quirky\">", "</p>"),
        Subtype::None => ("<p>", "</p>"),
    };

    // List items and indented text sit directly inside their wrapper tag.
    let wrapped = block.subtype.wrapper_tag().is_none();
    if wrapped {
        ctx.write("<div class=\"text-block\">");
    }
    ctx.write(open);
    ctx.write(&body);
    ctx.write(close);
    if wrapped {
        ctx.write("</div>");
    }
    Ok(())
}

fn emit_image(block: &ImageBlock, ctx: &mut EmitContext<'_>) {
    ctx.write("<figure class=\"image-block\">");
    ctx.write_img(None, &block.media, Some(block.alt_text.as_deref().unwrap_or("")));
    if block.is_gif() {
        ctx.write("<span class=\"gif-badge\">GIF</span>");
    }
    if let Some(caption) = block.caption.as_deref().filter(|c| !c.is_empty()) {
        ctx.write("<figcaption>");
        ctx.write_text(caption);
        ctx.write("</figcaption>");
    }
    ctx.write("</figure>");
}

fn emit_video(block: &VideoBlock, ctx: &mut EmitContext<'_>) {
    ctx.write("<div class=\"video-block\">");
    match &block.poster {
        Some(poster) => ctx.write_img(Some("video-poster"), poster, None),
        None => ctx.write("<div class=\"video-placeholder\"></div>"),
    }
    ctx.write(PLAY_BUTTON);
    ctx.write("</div>");
}

fn emit_audio(block: &AudioBlock, ctx: &mut EmitContext<'_>) {
    ctx.write("<div class=\"audio-block\">");
    if let Some(poster) = &block.poster {
        ctx.write_img(Some("audio-poster"), poster, None);
    }
    ctx.write("<div class=\"audio-info\">");
    let title = block
        .title
        .as_deref()
        .filter(|t| !t.is_empty())
        .unwrap_or("Audio");
    ctx.write_optional("p", "audio-title", Some(title));
    ctx.write_optional("p", "audio-artist", block.artist.as_deref());
    ctx.write_optional("p", "audio-album", block.album.as_deref());
    ctx.write("</div></div>");
}

fn emit_link(block: &LinkBlock, ctx: &mut EmitContext<'_>) {
    ctx.write("<a class=\"link-block\" href=\"");
    ctx.write(&escape_attr(&block.url));
    ctx.write("\">");
    if let Some(poster) = &block.poster {
        ctx.write_img(Some("link-poster"), poster, None);
    }
    ctx.write("<div class=\"link-info\">");
    ctx.write_optional("p", "link-title", Some(block.display_title()));
    ctx.write_optional("p", "link-description", block.description.as_deref());
    let site = block
        .site_name
        .as_deref()
        .or(block.display_url.as_deref());
    ctx.write_optional("p", "link-site", site);
    ctx.write("</div></a>");
}

fn emit_poll(block: &PollBlock, ctx: &mut EmitContext<'_>) {
    let over = block.is_over(ctx.options.now);
    // Percentages are only shown for closed polls with known results.
    let totals = block
        .total_votes()
        .zip(block.most_votes())
        .filter(|_| over);

    ctx.write(if over {
        "<div class=\"poll-block poll-over\">"
    } else {
        "<div class=\"poll-block\">"
    });
    ctx.write_optional("p", "poll-question", Some(block.question.as_str()));
    ctx.write("<ul class=\"poll-answers\">");
    for answer in &block.answers {
        let votes = block
            .results
            .as_ref()
            .map(|r| r.votes_for(&answer.client_id))
            .unwrap_or(0);
        let winner = totals.is_some_and(|(_, most)| most > 0 && votes == most);
        ctx.write(if winner {
            "<li class=\"poll-answer poll-winner\">"
        } else {
            "<li class=\"poll-answer\">"
        });
        ctx.write_optional("span", "poll-answer-text", Some(answer.answer_text.as_str()));
        if let Some((total, _)) = totals {
            let percent = percentage(votes, total);
            ctx.write(&format!(
                "<span class=\"poll-percentage\">{percent}%</span><span class=\"poll-bar\" style=\"width:{percent}%\"></span>"
            ));
        }
        ctx.write("</li>");
    }
    ctx.write("</ul>");

    if over {
        ctx.write("<p class=\"poll-footer\">Final result</p>");
    } else if let Some(expiry) = block.expires_at() {
        ctx.write(&format!(
            "<p class=\"poll-footer\">Voting ends {}</p>",
            expiry.format("%Y-%m-%d %H:%M UTC")
        ));
    } else {
        ctx.write("<p class=\"poll-footer\">Open poll</p>");
    }
    ctx.write("</div>");
}

/// `votes` as a rounded percentage of `total`.
fn percentage(votes: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    (votes.saturating_mul(100) + total / 2) / total
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use neue_core::{
        FormattingKind, FormattingRange, Media, PollAnswer, PollResults, SubmissionBlock,
    };
    use std::collections::BTreeMap;

    fn html(block: Block) -> String {
        emit_block(&block, &HtmlOptions::default()).unwrap()
    }

    fn text(s: &str) -> TextBlock {
        TextBlock::new(s)
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(
            html(Block::Text(text("hello"))),
            "<div class=\"text-block\"><p>hello</p></div>"
        );
    }

    #[test]
    fn test_text_escaped_and_broken() {
        assert_eq!(
            html(Block::Text(text("a<b\nc"))),
            "<div class=\"text-block\"><p>a&lt;b<br>c</p></div>"
        );
    }

    #[test]
    fn test_subtypes() {
        let cases = [
            (Subtype::Heading1, "<div class=\"text-block\"><h1>x</h1></div>"),
            (Subtype::Heading2, "<div class=\"text-block\"><h2>x</h2></div>"),
            (Subtype::OrderedListItem, "<li>x</li>"),
            (Subtype::UnorderedListItem, "<li>x</li>"),
            (Subtype::Indented, "<p>x</p>"),
            (Subtype::Quote, "<div class=\"text-block\"><p class=\"npf-quote\">x</p></div>"),
            (Subtype::Chat, "<div class=\"text-block\"><p class=\"npf-chat\">x</p></div>"),
            (Subtype::Quirky, "<div class=\"text-block\"><p class=\"npf-quirky\">x</p></div>"),
        ];
        for (subtype, expected) in cases {
            assert_eq!(html(Block::Text(text("x").with_subtype(subtype))), expected);
        }
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(html(Block::Text(text(""))), "");
        assert_eq!(
            html(Block::Text(text("").with_subtype(Subtype::Heading1))),
            "<div class=\"text-block\"><h1><br></h1></div>"
        );
    }

    #[test]
    fn test_formatted_text() {
        let block = text("a & b").with_formatting(FormattingRange::new(4, 5, FormattingKind::Bold));
        assert_eq!(
            html(Block::Text(block)),
            "<div class=\"text-block\"><p>a &amp; <b>b</b></p></div>"
        );
    }

    #[test]
    fn test_unknown_formatting_fails() {
        let block = text("x").with_formatting(FormattingRange::new(
            0,
            1,
            FormattingKind::Other("sparkle".to_string()),
        ));
        let err = emit_block(&Block::Text(block), &HtmlOptions::default()).unwrap_err();
        assert!(matches!(err, EmitError::UnsupportedFormattingKind(kind) if kind == "sparkle"));
    }

    #[test]
    fn test_image() {
        let media = MediaList::new(vec![
            Media::new("1280.gif", 1280, 720).with_mime_type("image/gif"),
            Media::new("540.gif", 540, 304).with_mime_type("image/gif"),
        ]);
        let mut image = ImageBlock::new(media).with_alt_text("a \"cat\"");
        image.caption = Some("caption".to_string());
        assert_eq!(
            html(Block::Image(image)),
            "<figure class=\"image-block\"><img src=\"540.gif\" alt=\"a &quot;cat&quot;\"><span class=\"gif-badge\">GIF</span><figcaption>caption</figcaption></figure>"
        );
    }

    #[test]
    fn test_video_uses_poster_not_video_tag() {
        let video = VideoBlock {
            media: Some(MediaList::new(vec![Media::new("v.mp4", 540, 300)])),
            poster: Some(MediaList::new(vec![Media::new("p.jpg", 540, 300)])),
            ..VideoBlock::default()
        };
        let out = html(Block::Video(video));
        assert!(out.starts_with("<div class=\"video-block\"><img class=\"video-poster\" src=\"p.jpg\">"));
        assert!(out.contains("class=\"play-button\""));
        assert!(!out.contains("<video"));
    }

    #[test]
    fn test_audio() {
        let audio = AudioBlock {
            embed_html: Some("<iframe></iframe>".to_string()),
            title: Some("Song".to_string()),
            artist: Some("Band".to_string()),
            ..AudioBlock::default()
        };
        assert_eq!(
            html(Block::Audio(audio)),
            "<div class=\"audio-block\"><div class=\"audio-info\"><p class=\"audio-title\">Song</p><p class=\"audio-artist\">Band</p></div></div>"
        );
    }

    #[test]
    fn test_link() {
        let mut link = LinkBlock::new("https://example.com/?a=1&b=2");
        link.site_name = Some("Example".to_string());
        assert_eq!(
            html(Block::Link(link)),
            "<a class=\"link-block\" href=\"https://example.com/?a=1&amp;b=2\"><div class=\"link-info\"><p class=\"link-title\">https://example.com/?a=1&amp;b=2</p><p class=\"link-site\">Example</p></div></a>"
        );
    }

    #[test]
    fn test_synthetic_blocks() {
        assert_eq!(
            html(Block::ReadMore),
            "<div class=\"read-more\"><p>Keep reading</p></div>"
        );
        assert_eq!(
            html(Block::Submission(SubmissionBlock {
                submitted_by: "anon".to_string()
            })),
            "<div class=\"submission\"><p>Submitted by anon</p></div>"
        );
    }

    fn poll(results: Option<[u64; 2]>) -> PollBlock {
        PollBlock {
            client_id: "p".to_string(),
            question: "Cats or dogs?".to_string(),
            answers: vec![
                PollAnswer {
                    client_id: "a".to_string(),
                    answer_text: "Cats".to_string(),
                },
                PollAnswer {
                    client_id: "b".to_string(),
                    answer_text: "Dogs".to_string(),
                },
            ],
            expire_after: Some(3600),
            created_at: Some(Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()),
            results: results.map(|[a, b]| PollResults {
                votes: BTreeMap::from([("a".to_string(), a), ("b".to_string(), b)]),
            }),
        }
    }

    fn two_hours_later() -> HtmlOptions {
        HtmlOptions::at(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_closed_poll_with_results() {
        let out = emit_block(&Block::Poll(poll(Some([1, 3]))), &two_hours_later()).unwrap();
        assert!(out.starts_with("<div class=\"poll-block poll-over\">"));
        assert!(out.contains("<span class=\"poll-percentage\">25%</span>"));
        assert!(out.contains(
            "<li class=\"poll-answer poll-winner\"><span class=\"poll-answer-text\">Dogs</span><span class=\"poll-percentage\">75%</span>"
        ));
        assert!(out.contains("Final result"));
    }

    #[test]
    fn test_closed_poll_without_results() {
        let out = emit_block(&Block::Poll(poll(None)), &two_hours_later()).unwrap();
        assert!(out.contains("poll-over"));
        assert!(out.contains("Final result"));
        assert!(!out.contains('%'));
        assert!(!out.contains("poll-winner"));
    }

    #[test]
    fn test_open_poll_hides_results() {
        let options = HtmlOptions::at(
            Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap() + Duration::minutes(30),
        );
        let out = emit_block(&Block::Poll(poll(Some([1, 3]))), &options).unwrap();
        assert!(!out.contains("poll-over"));
        assert!(!out.contains("poll-percentage"));
        assert!(out.contains("Voting ends 2024-01-01 11:00 UTC"));
    }

    #[test]
    fn test_tied_winners() {
        let out = emit_block(&Block::Poll(poll(Some([2, 2]))), &two_hours_later()).unwrap();
        assert_eq!(out.matches("poll-winner").count(), 2);
    }

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(0, 0), 0);
    }

    #[test]
    fn test_sequence_with_ask_and_wrappers() {
        let question = Block::Text(text("why?"));
        let answer = Block::Text(text("because").with_subtype(Subtype::UnorderedListItem));
        let mut first = AnnotatedBlock::borrowed(&question).into_ask(Some(AskAttribution {
            blog_name: "asker".to_string(),
            url: None,
        }));
        first.prefix.clear();
        let mut second = AnnotatedBlock::borrowed(&answer);
        second.prefix = "<ul>".to_string();
        second.suffix = "</ul>".to_string();
        let out = emit_with_options(&[first, second], &HtmlOptions::default()).unwrap();
        assert_eq!(
            out,
            "<div class=\"question\"><p class=\"question-header\">asker asked:</p><div class=\"text-block\"><p>why?</p></div></div><ul><li>because</li></ul>"
        );
    }
}
