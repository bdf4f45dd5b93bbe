//! Link-preview embeds built from a thread.
//!
//! The embed carries a short Markdown description of the thread and at most
//! one image or video. Threads that cannot be summarized that way (several
//! media, polls, rich formatting, long text) are flagged for a rendered
//! screenshot instead; when renders are enabled the embed then points at the
//! render's URL.

use neue_core::{MarkdownOptions, Media, post_url};
use neue_read_payload::AvatarSource;

use crate::render_path::filename_for;
use crate::{Error, Thread};

/// Longest description shown without a video.
pub const MAX_DESCRIPTION: usize = 349;
/// Longest description shown next to a video.
pub const MAX_VIDEO_DESCRIPTION: usize = 256;

const TRUNCATED: &str = "... (see full thread)";
const TRUNCATED_VIDEO: &str = "... (click to see full thread)";

/// Target width used when the first image has no original dimensions.
const FALLBACK_IMAGE_WIDTH: u32 = 640;

/// How the embed card is laid out by the consuming client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardType {
    Tweet,
    SummaryLargeImage,
    Video,
}

impl CardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardType::Tweet => "tweet",
            CardType::SummaryLargeImage => "summary_large_image",
            CardType::Video => "video",
        }
    }
}

/// Settings for [`build_embed`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbedOptions {
    /// Whether rendered screenshots are served.
    pub renders_enabled: bool,
    /// Public base URL of the service, without a trailing slash.
    pub base_url: String,
    /// Request the dark render theme.
    pub dark: bool,
    /// Post summary slug appended to the post URL.
    pub summary: Option<String>,
}

/// Everything a link-preview card needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Embed {
    /// `{by} 🔁 {from}` for reblogs, else the author.
    pub header: String,
    /// `{n} notes`.
    pub miniheader: String,
    pub description: String,
    pub card_type: CardType,
    pub image: Option<Media>,
    pub video: Option<Media>,
    pub video_thumbnail: Option<String>,
    pub avatar_url: Option<String>,
    pub post_url: String,
    /// Whether the card shows a rendered screenshot.
    pub should_render: bool,
}

/// Build the embed for `thread`.
///
/// `avatars` is consulted only when the payload carried no author avatar.
pub fn build_embed(
    thread: &Thread,
    options: &EmbedOptions,
    avatars: Option<&dyn AvatarSource>,
) -> Result<Embed, Error> {
    let info = &thread.thread_info;
    let mut should_render = false;

    let mut description = describe(thread)?;

    let mut image = None;
    if let Some(first) = info.images.first() {
        let target = first
            .media
            .original_dimensions()
            .map_or(FALLBACK_IMAGE_WIDTH, |(width, _)| width);
        image = first.media.pick_one_size(target).cloned();
        if info.images.len() > 1 {
            should_render = true;
        }
    }

    let mut video = None;
    let mut video_thumbnail = None;
    if let Some(first) = info.videos.first() {
        if info.videos.len() > 1 {
            should_render = true;
        }
        match first.media.as_ref().and_then(|media| media.first()) {
            Some(media) => {
                video = Some(media.clone());
                video_thumbnail = first
                    .poster
                    .as_ref()
                    .and_then(|poster| poster.first())
                    .map(|poster| poster.url.clone());
            }
            None => should_render = true,
        }
    }

    let (placeholder, limit) = if video.is_some() {
        (TRUNCATED_VIDEO, MAX_VIDEO_DESCRIPTION)
    } else {
        (TRUNCATED, MAX_DESCRIPTION)
    };
    let max_length = limit - placeholder.chars().count();
    if description.chars().count() > max_length {
        description = description.chars().take(max_length).collect();
        description.push_str(placeholder);
        should_render = true;
    }

    let header = match (&thread.reblogged_by, &thread.reblogged_from) {
        (Some(by), Some(from)) if by == from => format!("{by} 🔁"),
        (Some(by), Some(from)) => format!("{by} 🔁 {from}"),
        _ => thread.blog_name.clone(),
    };

    if image.is_some() && video.is_some() {
        should_render = true;
    }
    if !info.audio.is_empty() || !info.other_blocks.is_empty() || info.has_formatting {
        should_render = true;
    }

    let mut card_type = match (&image, &video) {
        (Some(_), None) => CardType::SummaryLargeImage,
        (None, Some(_)) => CardType::Video,
        _ => CardType::Tweet,
    };

    if options.renders_enabled && should_render {
        description = if video.is_some() {
            format!(
                "(Hint: You can get the raw video by pasting in the following link: {}/{}/{}?video)",
                options.base_url, thread.blog_name, thread.post_id
            )
        } else {
            String::new()
        };
        let mut modifiers = Vec::new();
        if thread.read_options().unroll {
            modifiers.push("unroll");
        }
        if options.dark {
            modifiers.push("dark");
        }
        let filename = filename_for(&thread.blog_name, &thread.post_id, "png", &modifiers[..])?;
        image = Some(Media::new(
            format!("{}/renders/{filename}", options.base_url),
            0,
            0,
        ));
        card_type = CardType::SummaryLargeImage;
        video = None;
    } else {
        should_render = false;
    }

    let avatar_url = thread.avatar_url.clone().or_else(|| {
        avatars.and_then(|source| source.fetch_avatar(&thread.blog_name))
    });

    let mut url = post_url(&thread.blog_name, &thread.post_id);
    if let Some(summary) = &options.summary {
        url.push('/');
        url.push_str(summary);
    }

    tracing::info!(
        blog = %thread.blog_name,
        id = %thread.post_id,
        rendered = should_render,
        "built embed"
    );

    Ok(Embed {
        header,
        miniheader: format!("{} notes", thread.note_count),
        description,
        card_type,
        image,
        video,
        video_thumbnail,
        avatar_url,
        post_url: url,
        should_render,
    })
}

/// The untruncated embed description.
fn describe(thread: &Thread) -> Result<String, Error> {
    let placeholders = MarkdownOptions::placeholders();

    // Pure reblogs carry no content of their own.
    let mut posts = Vec::new();
    for post in &thread.posts {
        if !thread.post_to_markdown(post, &placeholders)?.trim().is_empty() {
            posts.push(post);
        }
    }

    let mut description = String::new();
    if let [post] = posts.as_slice() {
        let single = MarkdownOptions {
            skip_single_placeholders: true,
            ..placeholders
        };
        if thread.is_reblog() {
            description.push_str(&format!("▪ {}:\n", post.blog_name));
        }
        description.push_str(thread.post_to_markdown(post, &single)?.trim());
    } else {
        for post in posts {
            let content = thread.post_to_markdown(post, &placeholders)?;
            description.push_str(&format!("\n\n▪ {}:\n{}", post.blog_name, content.trim()));
        }
    }

    if thread.is_submission {
        description.push_str(&format!("\n\n(Submitted by {})", thread.submitter()));
    }
    if !thread.tags.is_empty() {
        description.push_str(&format!("\n\n(#{})", thread.tags.join(" #")));
    }

    Ok(description.trim().to_string())
}
