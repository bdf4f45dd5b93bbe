//! Collaborators that supply data the payload itself does not carry.
//!
//! Fetching, caching and retrying belong to the caller. The reader only sees
//! already-resolved JSON through these traits, so it can be driven entirely
//! from fixtures.

use std::collections::BTreeMap;

use serde_json::Value;

/// Why a post could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("post not found")]
    NotFound,
    #[error("blog is only visible to logged-in users")]
    LockedBlog,
    #[error("upstream error: {0}")]
    Upstream(String),
}

/// API error code for blogs hidden from logged-out visitors.
const LOCKED_BLOG_CODE: u64 = 4012;

impl FetchError {
    /// Classify an upstream API error body.
    ///
    /// A 404 carrying error code 4012 is a locked blog, any other 404 is a
    /// missing post, everything else is an upstream failure.
    pub fn from_api_error(body: &Value) -> Self {
        let status = body.pointer("/meta/status").and_then(Value::as_u64);
        if status != Some(404) {
            let msg = body
                .pointer("/meta/msg")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return match status {
                Some(status) => FetchError::Upstream(format!("{status} {msg}")),
                None => FetchError::Upstream(msg.to_string()),
            };
        }

        let code = body
            .get("errors")
            .or_else(|| body.pointer("/response/errors"))
            .and_then(Value::as_array)
            .and_then(|errors| errors.first())
            .and_then(|error| error.get("code"))
            .and_then(Value::as_u64);
        if code == Some(LOCKED_BLOG_CODE) {
            FetchError::LockedBlog
        } else {
            FetchError::NotFound
        }
    }
}

/// Supplies raw post payloads.
pub trait PostSource {
    fn fetch_post(&self, blog_name: &str, post_id: &str) -> Result<Value, FetchError>;
}

/// Supplies poll vote counts, merged into poll blocks while reading.
///
/// Returning `None` renders the poll without counts.
pub trait PollResultsSource {
    fn poll_results(
        &self,
        blog_name: &str,
        post_id: &str,
        poll_id: &str,
        block: &Value,
    ) -> Option<Value>;
}

impl<F> PollResultsSource for F
where
    F: Fn(&str, &str, &str, &Value) -> Option<Value>,
{
    fn poll_results(
        &self,
        blog_name: &str,
        post_id: &str,
        poll_id: &str,
        block: &Value,
    ) -> Option<Value> {
        self(blog_name, post_id, poll_id, block)
    }
}

/// Supplies blog avatar URLs.
pub trait AvatarSource {
    fn fetch_avatar(&self, blog_name: &str) -> Option<String>;
}

impl<F> AvatarSource for F
where
    F: Fn(&str) -> Option<String>,
{
    fn fetch_avatar(&self, blog_name: &str) -> Option<String> {
        self(blog_name)
    }
}

/// Poll results held in memory, keyed by poll client id.
#[derive(Debug, Clone, Default)]
pub struct PollResultsMap {
    polls: BTreeMap<String, Value>,
}

impl PollResultsMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object mapping poll ids to result payloads.
    ///
    /// Returns `None` when `value` is not an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self {
                polls: map.into_iter().collect(),
            }),
            _ => None,
        }
    }

    pub fn insert(&mut self, poll_id: impl Into<String>, results: Value) {
        self.polls.insert(poll_id.into(), results);
    }
}

impl PollResultsSource for PollResultsMap {
    fn poll_results(&self, _: &str, _: &str, poll_id: &str, _: &Value) -> Option<Value> {
        self.polls.get(poll_id).cloned()
    }
}

/// Extract vote counts from a results payload.
///
/// Accepts `{"results": {...}}` as well as the API envelope
/// `{"response": {"results": {...}}}`. Counts that are not non-negative
/// integers are skipped.
pub fn vote_counts(payload: &Value) -> Option<BTreeMap<String, u64>> {
    let results = payload
        .get("results")
        .or_else(|| payload.pointer("/response/results"))?
        .as_object()?;
    Some(
        results
            .iter()
            .filter_map(|(id, count)| Some((id.clone(), count.as_u64()?)))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_locked_blog() {
        let body = json!({
            "meta": {"status": 404, "msg": "Not Found"},
            "errors": [{"code": 4012, "title": "Not Found"}]
        });
        assert_eq!(FetchError::from_api_error(&body), FetchError::LockedBlog);
    }

    #[test]
    fn test_not_found() {
        let body = json!({"meta": {"status": 404, "msg": "Not Found"}, "errors": [{"code": 0}]});
        assert_eq!(FetchError::from_api_error(&body), FetchError::NotFound);
        let body = json!({"meta": {"status": 404}});
        assert_eq!(FetchError::from_api_error(&body), FetchError::NotFound);
    }

    #[test]
    fn test_upstream_error() {
        let body = json!({"meta": {"status": 500, "msg": "Server Error"}});
        assert_eq!(
            FetchError::from_api_error(&body),
            FetchError::Upstream("500 Server Error".to_string())
        );
        assert_eq!(
            FetchError::from_api_error(&json!({})),
            FetchError::Upstream("unknown error".to_string())
        );
    }

    #[test]
    fn test_vote_counts_shapes() {
        let direct = json!({"results": {"a": 3, "b": 0}});
        let wrapped = json!({"response": {"results": {"a": 3, "b": 0}}});
        assert_eq!(vote_counts(&direct), vote_counts(&wrapped));
        assert_eq!(vote_counts(&direct).unwrap()["a"], 3);
        assert!(vote_counts(&json!({"nothing": true})).is_none());
    }

    #[test]
    fn test_vote_counts_skips_bad_values() {
        let payload = json!({"results": {"a": -1, "b": "many", "c": 4}});
        let counts = vote_counts(&payload).unwrap();
        assert_eq!(counts.len(), 1);
        assert_eq!(counts["c"], 4);
    }

    #[test]
    fn test_poll_results_map() {
        let map = PollResultsMap::from_value(json!({"poll-1": {"results": {"a": 1}}})).unwrap();
        assert!(map.poll_results("b", "1", "poll-1", &Value::Null).is_some());
        assert!(map.poll_results("b", "1", "poll-2", &Value::Null).is_none());
        assert!(PollResultsMap::from_value(json!([1, 2])).is_none());
    }
}
