//! End-to-end scenarios: payload in, HTML and Markdown out.

use chrono::{Duration, TimeZone, Utc};
use neue::prelude::*;
use neue::{Error, ParseError, PollResultsMap, PollResultsSource};
use serde_json::{Value, json};

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

fn text(s: &str) -> Value {
    json!({ "type": "text", "text": s })
}

/// A leaf post reblogging one trail post.
fn reblog(trail_content: Vec<Value>, content: Vec<Value>) -> Value {
    json!({
        "id_string": "2",
        "blog_name": "b",
        "timestamp": 1700000000,
        "reblogged_from_name": "a",
        "trail": [{
            "blog": { "name": "a" },
            "post": { "id": "1" },
            "content": trail_content,
            "layout": []
        }],
        "content": content,
        "layout": []
    })
}

/// An original post with the given content and layout.
fn original(content: Vec<Value>, layout: Vec<Value>) -> Value {
    json!({
        "id_string": "9",
        "blog_name": "solo",
        "timestamp": 1700000000,
        "content": content,
        "layout": layout
    })
}

fn read(payload: &Value) -> Thread {
    Thread::from_payload(payload, &ReadOptions::default()).unwrap()
}

fn html(thread: &Thread) -> String {
    thread.to_html(&HtmlOptions::at(now())).unwrap()
}

mod threads {
    use super::*;

    #[test]
    fn test_two_post_quote_nesting() {
        let thread = read(&reblog(vec![text("hello")], vec![text("world")]));
        assert_eq!(
            html(&thread),
            "<p><a href=\"https://www.tumblr.com/a/1\">a</a>:</p>\
             <blockquote><div class=\"text-block\"><p>hello</p></div></blockquote>\
             <div class=\"text-block\"><p>world</p></div>"
        );
    }

    #[test]
    fn test_three_posts_nest_outward() {
        let payload = json!({
            "id_string": "3",
            "blog_name": "c",
            "timestamp": 1700000000,
            "reblogged_from_name": "b",
            "trail": [
                { "blog": { "name": "a" }, "post": { "id": "1" }, "content": [text("one")] },
                { "blog": { "name": "b" }, "post": { "id": "2" }, "content": [text("two")] }
            ],
            "content": [text("three")]
        });
        let out = html(&read(&payload));
        let one = out.find("one").unwrap();
        let two = out.find("two").unwrap();
        let three = out.find("three").unwrap();
        assert!(one < two && two < three);
        assert!(out.starts_with("<p><a href=\"https://www.tumblr.com/b/2\">b</a>:</p><blockquote><p><a href=\"https://www.tumblr.com/a/1\">a</a>:</p><blockquote>"));
        assert_eq!(out.matches("<blockquote>").count(), 2);
        assert_eq!(out.matches("</blockquote>").count(), 2);
    }

    #[test]
    fn test_pure_reblog_leaf_is_not_a_post() {
        let thread = read(&reblog(vec![text("hello")], vec![]));
        assert_eq!(thread.posts.len(), 1);
        assert_eq!(html(&thread), "<div class=\"text-block\"><p>hello</p></div>");
        assert_eq!(thread.reblogged_by.as_deref(), Some("b"));
        assert_eq!(thread.reblogged_from.as_deref(), Some("a"));
    }

    #[test]
    fn test_markdown_sections() {
        let thread = read(&reblog(vec![text("hello")], vec![text("world")]));
        assert_eq!(
            thread.to_markdown(&MarkdownOptions::default()).unwrap(),
            "a:\nhello\n\nb:\nworld"
        );
    }

    #[test]
    fn test_render_twice_is_stable() {
        let item = |s: &str| json!({ "type": "text", "subtype": "ordered-list-item", "text": s });
        let thread = read(&original(vec![item("x"), item("y")], vec![]));
        let first = html(&thread);
        let markdown = thread.to_markdown(&MarkdownOptions::default()).unwrap();
        assert_eq!(html(&thread), first);
        assert_eq!(thread.to_markdown(&MarkdownOptions::default()).unwrap(), markdown);
        assert_eq!(first, "<ol><li>x</li><li>y</li></ol>");
    }

    #[test]
    fn test_submission_credit() {
        let mut payload = original(vec![text("hi")], vec![]);
        payload["is_submission"] = json!(true);
        payload["post_author"] = json!("fan");
        let thread = read(&payload);
        assert!(html(&thread).ends_with("<div class=\"submission\"><p>Submitted by fan</p></div>"));
        assert_eq!(
            thread.to_markdown(&MarkdownOptions::default()).unwrap(),
            "solo:\nhi\n\n(Submitted by fan)"
        );
    }

    #[test]
    fn test_missing_top_level_fields() {
        for field in ["id_string", "timestamp", "blog_name"] {
            let mut payload = original(vec![text("hi")], vec![]);
            payload.as_object_mut().unwrap().remove(field);
            assert!(
                matches!(
                    Thread::from_payload(&payload, &ReadOptions::default()),
                    Err(Error::Parse(ParseError::MalformedPayload(_)))
                ),
                "{field}"
            );
        }
    }
}

mod layouts {
    use super::*;

    fn numbered(n: usize) -> Vec<Value> {
        (0..n).map(|i| text(&format!("p{i}"))).collect()
    }

    #[test]
    fn test_truncation_appends_read_more() {
        let layout = vec![json!({
            "type": "rows",
            "display": [{ "blocks": [0, 1, 2, 3] }],
            "truncate_after": 2
        })];
        let payload = original(numbered(4), layout);

        let thread = read(&payload);
        let markdown = thread.to_markdown(&MarkdownOptions::default()).unwrap();
        assert_eq!(markdown, "solo:\np0\np1\np2\n(keep reading)");

        let unrolled = Thread::from_payload(&payload, &ReadOptions::unrolled()).unwrap();
        let markdown = unrolled.to_markdown(&MarkdownOptions::default()).unwrap();
        assert_eq!(markdown, "solo:\np0\np1\np2\np3");
    }

    #[test]
    fn test_duplicate_indices_dropped() {
        let layout = vec![json!({
            "type": "rows",
            "display": [{ "blocks": [1, 1] }, { "blocks": [0, 1] }]
        })];
        let thread = read(&original(numbered(2), layout));
        assert_eq!(
            thread.to_markdown(&MarkdownOptions::default()).unwrap(),
            "solo:\np1\np0"
        );
    }

    #[test]
    fn test_ask_header() {
        let layout = vec![json!({
            "type": "ask",
            "blocks": [0],
            "attribution": {
                "type": "blog",
                "blog": { "name": "curious", "url": "https://curious.example" }
            }
        })];
        let thread = read(&original(vec![text("why?"), text("because")], layout));
        assert_eq!(
            html(&thread),
            "<div class=\"question\"><p class=\"question-header\">\
             <a href=\"https://curious.example\">curious</a> asked:</p>\
             <div class=\"text-block\"><p>why?</p></div></div>\
             <div class=\"text-block\"><p>because</p></div>"
        );
        assert_eq!(
            thread.to_markdown(&MarkdownOptions::default()).unwrap(),
            "solo:\ncurious asked:\nwhy?\nbecause"
        );
    }

    #[test]
    fn test_unknown_layout_strictness() {
        let layout = vec![json!({ "type": "carousel", "blocks": [0] })];
        let payload = original(numbered(1), layout);

        let thread = read(&payload);
        assert!(!thread.warnings.is_empty());
        assert_eq!(
            thread.to_markdown(&MarkdownOptions::default()).unwrap(),
            "solo:\np0"
        );

        assert!(Thread::from_payload(&payload, &ReadOptions::strict()).is_err());
    }
}

mod polls {
    use super::*;

    fn poll_payload(created_at: chrono::DateTime<Utc>) -> Value {
        original(
            vec![json!({
                "type": "poll",
                "client_id": "poll-1",
                "question": "Best?",
                "answers": [
                    { "client_id": "x", "answer_text": "X" },
                    { "client_id": "y", "answer_text": "Y" }
                ],
                "settings": { "expire_after": 3600 },
                "created_at": created_at.to_rfc3339()
            })],
            vec![],
        )
    }

    fn results() -> PollResultsMap {
        let mut polls = PollResultsMap::new();
        polls.insert("poll-1", json!({ "results": { "x": 3, "y": 1 } }));
        polls
    }

    #[test]
    fn test_expired_poll_with_results() {
        let payload = poll_payload(now() - Duration::hours(2));
        let polls = results();
        let thread = Thread::from_payload_with(
            &payload,
            &ReadOptions::default(),
            Some(&polls as &dyn PollResultsSource),
        )
        .unwrap();
        let out = html(&thread);
        assert!(out.starts_with("<div class=\"poll-block poll-over\">"));
        assert!(out.contains("<li class=\"poll-answer poll-winner\"><span class=\"poll-answer-text\">X</span><span class=\"poll-percentage\">75%</span>"));
        assert!(out.contains("style=\"width:25%\""));
        assert!(out.contains("Final result"));
    }

    #[test]
    fn test_expired_poll_without_results() {
        let thread = read(&poll_payload(now() - Duration::hours(2)));
        let out = html(&thread);
        assert!(out.contains("poll-over"));
        assert!(out.contains("Final result"));
        assert!(!out.contains('%'));
    }

    #[test]
    fn test_open_poll_hides_results() {
        let payload = poll_payload(now() - Duration::minutes(10));
        let polls = results();
        let thread = Thread::from_payload_with(
            &payload,
            &ReadOptions::default(),
            Some(&polls as &dyn PollResultsSource),
        )
        .unwrap();
        let out = html(&thread);
        assert!(!out.contains("poll-over"));
        assert!(!out.contains("poll-percentage"));
        assert!(out.contains("Voting ends 2024-03-01 12:50 UTC"));
    }

    #[test]
    fn test_poll_markdown() {
        let thread = read(&poll_payload(now()));
        assert_eq!(
            thread.to_markdown(&MarkdownOptions::default()).unwrap(),
            "solo:\nBest?\n* X\n* Y"
        );
    }
}

mod schema_drift {
    use super::*;

    #[test]
    fn test_unknown_block_placeholder() {
        let thread = read(&original(vec![json!({ "type": "newthing" })], vec![]));
        let post = &thread.posts[0];
        assert_eq!(
            thread
                .post_to_markdown(post, &MarkdownOptions::default())
                .unwrap(),
            "(Unimplemented block; click to see the full post)"
        );
        assert!(!thread.warnings.is_empty());
    }

    #[test]
    fn test_unknown_block_strict() {
        let payload = original(vec![json!({ "type": "newthing" })], vec![]);
        assert!(matches!(
            Thread::from_payload(&payload, &ReadOptions::strict()),
            Err(Error::Parse(ParseError::UnimplementedBlockKind(_)))
        ));
    }

    #[test]
    fn test_unknown_formatting_fails_html_only() {
        let payload = original(
            vec![json!({
                "type": "text",
                "text": "sparkle",
                "formatting": [{ "type": "glitter", "start": 0, "end": 7 }]
            })],
            vec![],
        );
        let thread = read(&payload);
        assert!(matches!(
            thread.to_html(&HtmlOptions::at(now())),
            Err(Error::Emit(_))
        ));
        assert_eq!(
            thread.to_markdown(&MarkdownOptions::default()).unwrap(),
            "solo:\n*sparkle*"
        );
    }
}
