//! The story payload embedded in a generated artifact.
//!
//! The payload is the JSON form of a [`StoryGraph`]: an object mapping scene
//! ids to `{ text, choices, icon, color }` records in document order. It is
//! placed inside a `<script type="application/json">` element, so the encoder
//! escapes every character that could end that element or confuse the HTML
//! parser. The escapes are plain JSON `\uXXXX` sequences and decode back to
//! the original text.
//!
//! Scene ids are written a second time as a JSON array in [`ORDER_ELEMENT_ID`].
//! Object key order does not survive every JSON reader (JavaScript lists
//! integer-like keys first), so readers that need the entry scene use the
//! array.

use crate::error::{CoreError, CoreResult};
use crate::graph::StoryGraph;

/// `id` of the script element that carries the payload.
pub const DATA_ELEMENT_ID: &str = "story-data";

/// `id` of the script element that lists scene ids in document order.
pub const ORDER_ELEMENT_ID: &str = "story-order";

/// Marker in an artifact template that is replaced by the payload element.
pub const PAYLOAD_PLACEHOLDER: &str = "<!-- story-data -->";

/// Encodes a graph as pretty-printed JSON, without any embedding escapes.
pub fn to_json(graph: &StoryGraph) -> CoreResult<String> {
    Ok(serde_json::to_string_pretty(graph)?)
}

/// Encodes a graph as JSON that is safe to place inside a script element.
pub fn to_embedded_json(graph: &StoryGraph) -> CoreResult<String> {
    Ok(escape_for_script(&serde_json::to_string(graph)?))
}

/// Escapes JSON text for an HTML script element.
///
/// `<`, `>` and `&` become `\u003c`, `\u003e` and `\u0026`, so neither
/// `</script>` nor `<!--` can appear. U+2028 and U+2029 are escaped as well
/// because some script parsers treat them as line terminators. These
/// characters can only occur inside JSON strings, where the escapes are valid.
pub fn escape_for_script(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            other => out.push(other),
        }
    }
    out
}

/// Encodes the scene ids, in document order, as an escaped JSON array.
pub fn to_embedded_order(graph: &StoryGraph) -> CoreResult<String> {
    let ids: Vec<&str> = graph.scenes().map(|s| s.id.as_str()).collect();
    Ok(escape_for_script(&serde_json::to_string(&ids)?))
}

/// Builds the payload element followed by the scene order element.
pub fn payload_element(graph: &StoryGraph) -> CoreResult<String> {
    Ok(format!(
        "<script id=\"{DATA_ELEMENT_ID}\" type=\"application/json\">{}</script>\
         <script id=\"{ORDER_ELEMENT_ID}\" type=\"application/json\">{}</script>",
        to_embedded_json(graph)?,
        to_embedded_order(graph)?
    ))
}

/// Replaces the placeholder in `template` with the payload elements.
pub fn embed(template: &str, graph: &StoryGraph) -> CoreResult<String> {
    let Some((head, tail)) = template.split_once(PAYLOAD_PLACEHOLDER) else {
        return Err(CoreError::MissingPlaceholder(PAYLOAD_PLACEHOLDER));
    };
    let element = payload_element(graph)?;
    let mut out = String::with_capacity(template.len() + element.len());
    out.push_str(head);
    out.push_str(&element);
    out.push_str(tail);
    Ok(out)
}

/// Decodes a graph from payload JSON (escaped or not).
pub fn from_json(json: &str) -> CoreResult<StoryGraph> {
    Ok(serde_json::from_str(json)?)
}

/// Finds the payload element in an artifact and decodes it.
pub fn extract(document: &str) -> CoreResult<StoryGraph> {
    let open = format!("<script id=\"{DATA_ELEMENT_ID}\" type=\"application/json\">");
    let start = document
        .find(&open)
        .map(|i| i + open.len())
        .ok_or(CoreError::MissingPayload(DATA_ELEMENT_ID))?;
    let len = document[start..]
        .find("</script>")
        .ok_or(CoreError::MissingPayload(DATA_ELEMENT_ID))?;
    from_json(&document[start..start + len])
}
