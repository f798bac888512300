//! Partial document updates with dotted field paths.
//!
//! An update field named `attendees.u1` addresses the `u1` key inside the
//! `attendees` object, creating intermediate objects as needed. This mirrors
//! how the hosted store lets an attendee write only their own entry of the
//! attendee map.

use huddle_core::{HuddleError, HuddleResult};
use serde_json::{Map, Value};

pub(crate) fn apply_fields(doc: &mut Value, fields: &Map<String, Value>) -> HuddleResult<()> {
    for (path, value) in fields {
        set_path(doc, path, value.clone())?;
    }
    Ok(())
}

fn set_path(doc: &mut Value, path: &str, value: Value) -> HuddleResult<()> {
    let mut current = doc;
    let mut parts = path.split('.').peekable();

    while let Some(part) = parts.next() {
        let object = current
            .as_object_mut()
            .ok_or_else(|| HuddleError::Store(format!("'{path}' crosses a non-object value")))?;

        if parts.peek().is_none() {
            object.insert(part.to_string(), value);
            return Ok(());
        }

        current = object
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_top_level_merge_keeps_other_fields() {
        let mut doc = json!({ "title": "a", "location": "here" });
        let mut fields = Map::new();
        fields.insert("title".to_string(), json!("b"));

        apply_fields(&mut doc, &fields).unwrap();
        assert_eq!(doc, json!({ "title": "b", "location": "here" }));
    }

    #[test]
    fn test_dotted_path_creates_intermediates() {
        let mut doc = json!({});
        let mut fields = Map::new();
        fields.insert("attendees.u1".to_string(), json!("Yes"));

        apply_fields(&mut doc, &fields).unwrap();
        assert_eq!(doc, json!({ "attendees": { "u1": "Yes" } }));
    }

    #[test]
    fn test_dotted_path_through_scalar_fails() {
        let mut doc = json!({ "attendees": 3 });
        let mut fields = Map::new();
        fields.insert("attendees.u1".to_string(), json!("Yes"));

        assert!(apply_fields(&mut doc, &fields).is_err());
    }
}
