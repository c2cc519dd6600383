use std::borrow::Cow;

use crate::record::{FieldValue, Record};

const TITLE: &str = "title";
const BODY: &str = "body";
const TAGS: &str = "tags";

const TITLE_REPEAT: usize = 3;
const TAGS_REPEAT: usize = 2;

/// Flatten a record into one searchable string.
///
/// Field importance is encoded as repetition: the title appears three times,
/// the body once and the space-joined tags twice, followed by every other
/// field in record order. A `null` top-level field counts as missing.
pub fn flatten(record: &Record) -> String {
    let mut parts: Vec<Cow<'_, str>> = Vec::new();

    if let Some(title) = record.get(TITLE).and_then(plain_text) {
        for _ in 0..TITLE_REPEAT {
            parts.push(title.clone());
        }
    }

    if let Some(body) = record.get(BODY).and_then(plain_text) {
        parts.push(body);
    }

    if let Some(FieldValue::List(tags)) = record.get(TAGS) {
        let joined = tags.iter().filter_map(plain_text).collect::<Vec<_>>().join(" ");
        for _ in 0..TAGS_REPEAT {
            parts.push(Cow::Owned(joined.clone()));
        }
    }

    for (key, value) in record.iter() {
        if matches!(key, TITLE | BODY | TAGS) { continue; }
        if let Some(text) = plain_text(value) {
            parts.push(text);
        }
    }

    parts.join(" ")
}

/// Natural text of a value: strings verbatim, scalars in their JSON form,
/// lists and maps as compact JSON. `None` for null.
fn plain_text(value: &FieldValue) -> Option<Cow<'_, str>> {
    match value {
        FieldValue::Null => None,
        FieldValue::Text(s) => Some(Cow::Borrowed(s.as_str())),
        FieldValue::Bool(b) => Some(Cow::Owned(b.to_string())),
        FieldValue::Number(n) => Some(Cow::Owned(n.to_string())),
        // string-keyed values always serialize
        FieldValue::List(_) | FieldValue::Map(_) => serde_json::to_string(value).ok().map(Cow::Owned),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_title_body_tags() {
        let rec = Record::new()
            .with("title", "Refund Policy")
            .with("body", "Returns in 30 days")
            .with("tags", vec!["refund", "policy"]);
        assert_eq!(
            flatten(&rec),
            "Refund Policy Refund Policy Refund Policy Returns in 30 days refund policy refund policy"
        );
    }

    #[test]
    fn generic_fields_follow_record_order() {
        let rec = Record::new()
            .with("id", 7)
            .with("tags", vec!["a1"])
            .with("meta", Record::new().with("k", vec![1, 2]))
            .with("active", true)
            .with("title", "T");
        assert_eq!(flatten(&rec), r#"T T T a1 a1 7 {"k":[1,2]} true"#);
    }

    #[test]
    fn skips_missing_and_null_fields() {
        let rec = Record::new().with("body", "only body").with("title", FieldValue::Null).with("note", FieldValue::Null);
        assert_eq!(flatten(&rec), "only body");
        assert_eq!(flatten(&Record::new()), "");
    }

    #[test]
    fn non_list_tags_are_ignored() {
        let rec = Record::new().with("tags", "not-a-list").with("body", "b");
        assert_eq!(flatten(&rec), "b");
    }

    #[test]
    fn nested_text_stays_utf8() {
        let rec = Record::new().with("meta", Record::new().with("place", "café"));
        assert_eq!(flatten(&rec), r#"{"place":"café"}"#);
        assert!(crate::tokenizer::tokenize(&flatten(&rec)).contains(&"café".to_string()));
    }

    #[test]
    fn is_reproducible() {
        let rec = Record::new().with("title", "x").with("score", 2.5).with("list", vec![FieldValue::Null, "s".into()]);
        assert_eq!(flatten(&rec), flatten(&rec.clone()));
        assert_eq!(flatten(&rec), r#"x x x 2.5 [null,"s"]"#);
    }
}
