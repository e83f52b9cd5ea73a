//! Snippet extraction.
//!
//! Highlighting is opt-in: it is configured only when the caller asks for one of the
//! highlighted virtual fields.

use serde_json::{Map, Value, json};

use crate::SearchParameters;

/// Virtual field carrying the highlighted title.
pub const HIGHLIGHTED_TITLE: &str = "title_with_highlighting";

/// Virtual field carrying the highlighted description.
pub const HIGHLIGHTED_DESCRIPTION: &str = "description_with_highlighting";

/// Length of the description snippet, in characters.
const DESCRIPTION_FRAGMENT_SIZE: u32 = 285;

/// Highlight configuration; `None` when no highlighted field was requested.
pub fn highlight(params: &SearchParameters) -> Option<Value> {
    let mut fields = Map::new();
    if params.field_requested(HIGHLIGHTED_TITLE) {
        fields.insert("title".to_string(), json!({ "number_of_fragments": 0 }));
    }
    if params.field_requested(HIGHLIGHTED_DESCRIPTION) {
        fields.insert(
            "description".to_string(),
            json!({
                "number_of_fragments": 1,
                "fragment_size": DESCRIPTION_FRAGMENT_SIZE,
            }),
        );
    }
    if fields.is_empty() {
        return None;
    }

    Some(json!({
        "pre_tags": ["<mark>"],
        "post_tags": ["</mark>"],
        "encoder": "html",
        "fields": fields,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_without_highlighted_fields() {
        let params = SearchParameters::for_query("cheese")
            .with_return_fields(vec!["title".into(), "description".into()]);
        assert_eq!(highlight(&params), None);
    }

    #[test]
    fn test_title_and_description() {
        let params = SearchParameters::for_query("cheese").with_return_fields(vec![
            HIGHLIGHTED_TITLE.into(),
            HIGHLIGHTED_DESCRIPTION.into(),
        ]);
        let config = highlight(&params).unwrap();
        assert_eq!(config["pre_tags"], json!(["<mark>"]));
        assert_eq!(config["encoder"], "html");
        assert_eq!(config["fields"]["title"]["number_of_fragments"], 0);
        assert_eq!(config["fields"]["description"]["fragment_size"], 285);
    }

    #[test]
    fn test_description_only() {
        let params = SearchParameters::for_query("cheese")
            .with_return_fields(vec![HIGHLIGHTED_DESCRIPTION.into()]);
        let config = highlight(&params).unwrap();
        assert!(config["fields"].get("title").is_none());
    }
}
