//! Layout entry parsing.

use neue_core::{AskAttribution, LayoutEntry, ParseError};
use serde_json::Value;

use crate::Reader;

impl Reader<'_> {
    pub(crate) fn parse_layout_entry(&mut self, value: &Value) -> Result<LayoutEntry, ParseError> {
        let kind = value.get("type").and_then(Value::as_str).unwrap_or_default();
        match kind {
            "rows" => Ok(self.parse_rows(value)),
            "ask" => Ok(self.parse_ask(value)),
            other if self.options.strict => Err(ParseError::UnknownLayoutType(other.to_string())),
            // The resolver reports it when it skips the entry.
            other => Ok(LayoutEntry::Unknown(other.to_string())),
        }
    }

    fn parse_rows(&mut self, value: &Value) -> LayoutEntry {
        // Current payloads use `display: [{blocks: [...]}]`; older ones a bare `rows` array.
        let raw_rows = value
            .get("display")
            .or_else(|| value.get("rows"))
            .and_then(Value::as_array);

        let mut rows = Vec::new();
        for row in raw_rows.into_iter().flatten() {
            let indices = match row {
                Value::Array(_) => row,
                _ => match row.get("blocks") {
                    Some(blocks) => blocks,
                    None => {
                        self.ignore("display", format!("layout row without blocks: {row}"));
                        continue;
                    }
                },
            };
            rows.push(self.indices(indices));
        }

        let truncate_after = value
            .get("truncate_after")
            .and_then(Value::as_u64)
            .and_then(|i| usize::try_from(i).ok());

        LayoutEntry::Rows {
            rows,
            truncate_after,
        }
    }

    fn parse_ask(&mut self, value: &Value) -> LayoutEntry {
        let blocks = value
            .get("blocks")
            .map(|blocks| self.indices(blocks))
            .unwrap_or_default();

        let attribution = value
            .pointer("/attribution/blog")
            .and_then(|blog| {
                let blog_name = blog.get("name")?.as_str()?.to_string();
                let url = blog.get("url").and_then(Value::as_str).map(str::to_string);
                Some(AskAttribution { blog_name, url })
            });

        LayoutEntry::Ask {
            blocks,
            attribution,
        }
    }

    fn indices(&mut self, value: &Value) -> Vec<usize> {
        let Some(items) = value.as_array() else {
            self.ignore("blocks", format!("layout blocks is not an array: {value}"));
            return Vec::new();
        };
        let mut indices = Vec::with_capacity(items.len());
        for item in items {
            match item.as_u64().and_then(|i| usize::try_from(i).ok()) {
                Some(index) => indices.push(index),
                None => self.ignore("blocks", format!("invalid layout block index: {item}")),
            }
        }
        indices
    }
}
