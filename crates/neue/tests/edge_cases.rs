//! Edge case tests for neue.
//!
//! Tests Unicode offsets, escaping, hostile input and structural extremes.

use neue::prelude::*;
use neue::{FormattingKind, FormattingRange, Media, MediaList, TextBlock};
use serde_json::{Value, json};

fn post(content: Vec<Value>) -> Value {
    json!({
        "id_string": "1",
        "blog_name": "edge",
        "timestamp": 1700000000,
        "content": content,
        "layout": []
    })
}

fn read(payload: &Value) -> Thread {
    Thread::from_payload(payload, &ReadOptions::default()).unwrap()
}

fn html(payload: &Value) -> String {
    read(payload).to_html(&HtmlOptions::default()).unwrap()
}

fn markdown(payload: &Value) -> String {
    read(payload)
        .to_markdown(&MarkdownOptions::default())
        .unwrap()
}

/// Strip tags and decode the entities the writer produces.
fn visible_text(html: &str) -> String {
    let mut out = String::new();
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}

mod unicode {
    use super::*;

    #[test]
    fn test_emoji_offsets() {
        let payload = post(vec![json!({
            "type": "text",
            "text": "hi 👋 there",
            "formatting": [{ "type": "bold", "start": 5, "end": 10 }]
        })]);
        assert_eq!(
            html(&payload),
            "<div class=\"text-block\"><p>hi 👋 <b>there</b></p></div>"
        );
        assert_eq!(markdown(&payload), "edge:\nhi 👋 **there**");
    }

    #[test]
    fn test_combining_and_cjk() {
        let payload = post(vec![json!({
            "type": "text",
            "text": "e\u{301}日本語",
            "formatting": [{ "type": "italic", "start": 2, "end": 4 }]
        })]);
        assert_eq!(
            html(&payload),
            "<div class=\"text-block\"><p>e\u{301}<i>日本</i>語</p></div>"
        );
    }

    #[test]
    fn test_unicode_blog_names_escaped() {
        let payload = json!({
            "id_string": "2",
            "blog_name": "b",
            "timestamp": 1700000000,
            "trail": [{
                "blog": { "name": "ünï<côdé>" },
                "post": { "id": "1" },
                "content": [{ "type": "text", "text": "x" }]
            }],
            "content": [{ "type": "text", "text": "y" }]
        });
        let out = html(&payload);
        assert!(out.contains(">ünï&lt;côdé&gt;</a>:</p>"));
    }
}

mod escaping {
    use super::*;

    #[test]
    fn test_formatting_over_escaped_characters() {
        let payload = post(vec![json!({
            "type": "text",
            "text": "a & b <c> d",
            "formatting": [
                { "type": "bold", "start": 2, "end": 9 },
                { "type": "small", "start": 10, "end": 11 }
            ]
        })]);
        let out = html(&payload);
        assert_eq!(
            out,
            "<div class=\"text-block\"><p>a <b>&amp; b &lt;c&gt;</b> <small>d</small></p></div>"
        );
        assert_eq!(visible_text(&out), "a & b <c> d");
    }

    #[test]
    fn test_markdown_is_not_escaped() {
        let payload = post(vec![json!({ "type": "text", "text": "1 < 2 & 3" })]);
        assert_eq!(markdown(&payload), "edge:\n1 < 2 & 3");
    }

    #[test]
    fn test_link_href_escaped() {
        let payload = post(vec![json!({
            "type": "text",
            "text": "click",
            "formatting": [{
                "type": "link",
                "start": 0,
                "end": 5,
                "url": "https://example.com/?a=1&b=\"2\""
            }]
        })]);
        assert_eq!(
            html(&payload),
            "<div class=\"text-block\"><p><a href=\"https://example.com/?a=1&amp;b=&quot;2&quot;\">click</a></p></div>"
        );
    }
}

mod hostile {
    use super::*;

    #[test]
    fn test_markup_in_text_stays_text() {
        let payload = post(vec![json!({
            "type": "text",
            "text": "<script>alert(1)</script><img src=x onerror=y>"
        })]);
        let out = html(&payload);
        assert!(!out.contains("<script"));
        assert!(!out.contains("<img"));
        assert!(out.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_javascript_link_stripped() {
        let payload = post(vec![json!({
            "type": "link",
            "url": "javascript:alert(1)",
            "title": "free stuff"
        })]);
        let out = html(&payload);
        assert!(!out.contains("javascript"));
        assert!(out.contains("free stuff"));
    }

    #[test]
    fn test_color_style_injection() {
        let payload = post(vec![json!({
            "type": "text",
            "text": "red",
            "formatting": [{
                "type": "color",
                "start": 0,
                "end": 3,
                "hex": "#f00;background:url(x)"
            }]
        })]);
        let out = html(&payload);
        assert!(!out.contains("background"));
        assert!(!out.contains("url("));
    }

    #[test]
    fn test_out_of_range_formatting() {
        let payload = post(vec![json!({
            "type": "text",
            "text": "short",
            "formatting": [{ "type": "bold", "start": 3, "end": 99 }]
        })]);
        assert_eq!(
            html(&payload),
            "<div class=\"text-block\"><p>sho<b>rt</b></p></div>"
        );
    }
}

mod structure {
    use super::*;

    #[test]
    fn test_empty_post() {
        let payload = post(vec![]);
        let thread = read(&payload);
        assert!(thread.posts.is_empty());
        assert_eq!(thread.to_html(&HtmlOptions::default()).unwrap(), "");
        assert_eq!(thread.to_markdown(&MarkdownOptions::default()).unwrap(), "");
    }

    #[test]
    fn test_empty_text_blocks() {
        let payload = post(vec![
            json!({ "type": "text", "text": "" }),
            json!({ "type": "text", "text": "", "subtype": "heading1" }),
        ]);
        assert_eq!(html(&payload), "<div class=\"text-block\"><h1><br></h1></div>");
    }

    #[test]
    fn test_deep_indentation_balanced() {
        let content: Vec<Value> = (0..30)
            .map(|i| {
                json!({
                    "type": "text",
                    "subtype": if i % 3 == 0 { "indented" } else { "unordered-list-item" },
                    "indent_level": (i * 7) % 12,
                    "text": format!("t{i}")
                })
            })
            .collect();
        let out = html(&post(content));
        for tag in ["ul", "blockquote"] {
            assert_eq!(
                out.matches(&format!("<{tag}>")).count(),
                out.matches(&format!("</{tag}>")).count(),
                "{tag}"
            );
        }
        for i in 0..30 {
            assert!(out.contains(&format!("t{i}")));
        }
    }

    #[test]
    fn test_huge_indent_level_markdown() {
        let payload = post(vec![
            json!({
                "type": "text",
                "subtype": "ordered-list-item",
                "indent_level": 4000000000u64,
                "text": "deep"
            }),
            json!({
                "type": "text",
                "subtype": "indented",
                "indent_level": 4294967295u64,
                "text": "quoted"
            }),
        ]);
        let depth = neue::MAX_INDENT_DEPTH;
        assert_eq!(
            markdown(&payload),
            format!(
                "edge:\n{}1. deep\n{}quoted",
                "  ".repeat(depth - 1),
                "> ".repeat(depth)
            )
        );

        let thread = read(&payload);
        let embed = neue::embed::build_embed(
            &thread,
            &neue::embed::EmbedOptions::default(),
            None,
        )
        .unwrap();
        assert!(embed.description.contains("deep"));
    }

    #[test]
    fn test_long_trail() {
        let trail: Vec<Value> = (0..50)
            .map(|i| {
                json!({
                    "blog": { "name": format!("blog{i}") },
                    "post": { "id": format!("{i}") },
                    "content": [{ "type": "text", "text": format!("post {i}") }]
                })
            })
            .collect();
        let payload = json!({
            "id_string": "99",
            "blog_name": "leaf",
            "timestamp": 1700000000,
            "trail": trail
        });
        let thread = read(&payload);
        assert_eq!(thread.posts.len(), 50);
        let out = thread.to_html(&HtmlOptions::default()).unwrap();
        assert_eq!(out.matches("<blockquote>").count(), 49);
    }

    #[test]
    fn test_pick_one_size_is_member() {
        let list = MediaList::new(vec![
            Media::new("s.jpg", 250, 100),
            Media::new("m.jpg", 500, 200),
            Media::new("l.jpg", 1280, 512),
        ]);
        for width in [0, 100, 250, 499, 500, 1000, 5000] {
            let picked = list.pick_one_size(width).unwrap();
            assert!(list.iter().any(|m| m == picked));
            assert_eq!(list.pick_one_size(width), Some(picked));
        }
        assert_eq!(list.pick_one_size(5000).unwrap().url, "l.jpg");
        assert_eq!(list.pick_one_size(10).unwrap().url, "s.jpg");
    }

    #[test]
    fn test_single_block_render() {
        let block = Block::Text(TextBlock::new("sunset").with_formatting(
            FormattingRange::new(0, 3, FormattingKind::Strikethrough),
        ));
        assert_eq!(
            neue::markdown::emit_block(&block, &MarkdownOptions::default()).unwrap(),
            "~sun~set"
        );
    }
}
