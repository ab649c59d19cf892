use serde_json::{Map, Value};

use crate::block::{Block, ContentValue, ListFormat, Media, TextRun, TextStyle};

/// Classify a decoded CMS value. Never fails: unexpected shapes degrade to
/// `Other`, `Invalid` or field defaults.
pub fn parse(value: &Value) -> ContentValue {
    match value {
        Value::Null => ContentValue::Null,
        Value::String(s) => ContentValue::Text(s.clone()),
        Value::Array(items) => ContentValue::Blocks(items.iter().map(parse_block).collect()),
        Value::Object(_) => ContentValue::Single(parse_block(value)),
        Value::Bool(_) | Value::Number(_) => ContentValue::Other,
    }
}

/// Convert one element of a block array
pub fn parse_block(value: &Value) -> Block {
    let Value::Object(obj) = value else {
        return Block::Invalid;
    };

    // The CMS wire name is `type`; `kind` is accepted as well
    let kind = obj
        .get("type")
        .or_else(|| obj.get("kind"))
        .and_then(Value::as_str)
        .unwrap_or_default();

    match kind {
        "text" => Block::Text(parse_text(obj)),
        "image" => Block::Image {
            media: obj
                .get("image")
                .or_else(|| obj.get("media"))
                .and_then(parse_media),
        },
        _ => {
            let children = parse_children(obj);
            match kind {
                "paragraph" => Block::Paragraph { children },
                "heading" => Block::Heading {
                    level: obj.get("level").and_then(parse_level),
                    children,
                },
                "list" => Block::List {
                    format: match obj.get("format").and_then(Value::as_str) {
                        Some("ordered") => ListFormat::Ordered,
                        _ => ListFormat::Unordered,
                    },
                    children,
                },
                "list-item" => Block::ListItem { children },
                "quote" => Block::Quote { children },
                "code" => Block::Code { children },
                "link" => Block::Link {
                    url: obj.get("url").and_then(Value::as_str).map(str::to_string),
                    children,
                },
                other => Block::Unknown {
                    kind: other.to_string(),
                    children,
                },
            }
        }
    }
}

fn parse_children(obj: &Map<String, Value>) -> Option<Vec<Block>> {
    match obj.get("children") {
        Some(Value::Array(items)) => Some(items.iter().map(parse_block).collect()),
        _ => None,
    }
}

/// Integers, integral floats and numeric strings (`"4"`) all count
fn parse_level(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        _ => value.as_i64().or_else(|| {
            value
                .as_f64()
                .filter(|f| f.fract() == 0.0)
                .map(|f| f as i64)
        }),
    }
}

fn parse_text(obj: &Map<String, Value>) -> TextRun {
    let text = match obj.get("text") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    let flag = |name: &str| obj.get(name).is_some_and(truthy);

    TextRun {
        text,
        style: TextStyle {
            bold: flag("bold"),
            italic: flag("italic"),
            underline: flag("underline"),
            strikethrough: flag("strikethrough"),
            code: flag("code"),
        },
    }
}

fn parse_media(value: &Value) -> Option<Media> {
    let Value::Object(obj) = value else {
        return None;
    };
    let url = obj
        .get("url")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let alt_text = obj
        .get("alternativeText")
        .or_else(|| obj.get("altText"))
        .and_then(Value::as_str)
        .map(str::to_string);
    Some(Media { url, alt_text })
}

/// Loose truthiness, so `"bold": 1` counts the same as `"bold": true`
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn top_level_shapes() {
        assert_eq!(parse(&Value::Null), ContentValue::Null);
        assert_eq!(parse(&json!("hi")), ContentValue::Text("hi".to_string()));
        assert_eq!(parse(&json!(42)), ContentValue::Other);
        assert_eq!(parse(&json!(true)), ContentValue::Other);
        assert!(matches!(parse(&json!([])), ContentValue::Blocks(b) if b.is_empty()));
        assert!(matches!(
            parse(&json!({"type": "paragraph"})),
            ContentValue::Single(Block::Paragraph { children: None })
        ));
    }

    #[test]
    fn non_objects_are_invalid_blocks() {
        assert_eq!(parse_block(&json!("x")), Block::Invalid);
        assert_eq!(parse_block(&json!(null)), Block::Invalid);
        assert_eq!(parse_block(&json!([1, 2])), Block::Invalid);
    }

    #[test]
    fn text_defaults_and_flags() {
        let Block::Text(run) = parse_block(&json!({"type": "text"})) else {
            panic!("expected text block");
        };
        assert_eq!(run, TextRun::default());

        let Block::Text(run) = parse_block(&json!({
            "type": "text",
            "text": 7,
            "bold": 1,
            "italic": "",
            "code": true
        })) else {
            panic!("expected text block");
        };
        assert_eq!(run.text, "7");
        assert!(run.style.bold);
        assert!(!run.style.italic);
        assert!(run.style.code);
    }

    #[test]
    fn kind_field_fallback() {
        assert!(matches!(
            parse_block(&json!({"kind": "quote", "children": []})),
            Block::Quote { children: Some(c) } if c.is_empty()
        ));
        // `type` wins when both are present
        assert!(matches!(
            parse_block(&json!({"type": "code", "kind": "quote"})),
            Block::Code { .. }
        ));
    }

    #[test]
    fn children_must_be_an_array() {
        assert_eq!(
            parse_block(&json!({"type": "paragraph", "children": "nope"})),
            Block::Paragraph { children: None }
        );
    }

    #[test]
    fn heading_level_accepts_floats_and_numeric_strings() {
        let level = |v: Value| match parse_block(&v) {
            Block::Heading { level, .. } => level,
            other => panic!("expected heading, got {other:?}"),
        };
        assert_eq!(level(json!({"type": "heading", "level": 4})), Some(4));
        assert_eq!(level(json!({"type": "heading", "level": 3.0})), Some(3));
        assert_eq!(level(json!({"type": "heading", "level": 2.5})), None);
        assert_eq!(level(json!({"type": "heading", "level": "3"})), Some(3));
        assert_eq!(level(json!({"type": "heading", "level": " 5 "})), Some(5));
        assert_eq!(level(json!({"type": "heading", "level": "three"})), None);
    }

    #[test]
    fn list_format() {
        let format = |v: Value| match parse_block(&v) {
            Block::List { format, .. } => format,
            other => panic!("expected list, got {other:?}"),
        };
        assert_eq!(format(json!({"type": "list", "format": "ordered"})), ListFormat::Ordered);
        assert_eq!(format(json!({"type": "list", "format": "ORDERED"})), ListFormat::Unordered);
        assert_eq!(format(json!({"type": "list"})), ListFormat::Unordered);
    }

    #[test]
    fn image_media_fields() {
        assert_eq!(
            parse_block(&json!({
                "type": "image",
                "image": {"url": "/uploads/a.png", "alternativeText": "A"}
            })),
            Block::Image {
                media: Some(Media {
                    url: "/uploads/a.png".to_string(),
                    alt_text: Some("A".to_string()),
                })
            }
        );
        assert_eq!(
            parse_block(&json!({"type": "image", "media": {"url": "b.png", "altText": "B"}})),
            Block::Image {
                media: Some(Media {
                    url: "b.png".to_string(),
                    alt_text: Some("B".to_string()),
                })
            }
        );
        assert_eq!(
            parse_block(&json!({"type": "image", "image": null})),
            Block::Image { media: None }
        );
    }

    #[test]
    fn unknown_kinds_keep_their_name() {
        assert_eq!(
            parse_block(&json!({"type": "callout"})),
            Block::Unknown {
                kind: "callout".to_string(),
                children: None,
            }
        );
        assert_eq!(
            parse_block(&json!({})),
            Block::Unknown {
                kind: String::new(),
                children: None,
            }
        );
    }
}
