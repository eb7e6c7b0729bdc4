//! Payload codec
//!
//! Texture payloads travel as base64-encoded JSON documents of the form
//! `{"textures":{"SKIN":{"url":"…"}}}`. The core treats payloads as opaque
//! strings everywhere except tier 1 injection, which needs the embedded skin
//! URL back out.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};

/// Encode a skin URL into a texture payload.
pub fn encode_skin_url(url: &str) -> String {
    let doc = json!({ "textures": { "SKIN": { "url": url } } });
    STANDARD.encode(doc.to_string())
}

/// Extract the skin URL embedded in a payload, if any.
///
/// Returns `None` on malformed base64, malformed JSON, or a document without
/// a skin reference; tier 1 injection treats that as "try the next tier".
pub fn extract_skin_url(payload: &str) -> Option<String> {
    let raw = STANDARD.decode(payload).ok()?;
    let doc: Value = serde_json::from_slice(&raw).ok()?;
    doc.get("textures")?
        .get("SKIN")?
        .get("url")?
        .as_str()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_then_extract_round_trips() {
        let payload = encode_skin_url("https://textures.example/skin/abc123");
        assert_eq!(
            extract_skin_url(&payload).as_deref(),
            Some("https://textures.example/skin/abc123")
        );
    }

    #[test]
    fn empty_textures_document_has_no_url() {
        // {"textures":{}}
        assert_eq!(extract_skin_url("eyJ0ZXh0dXJlcyI6e319"), None);
    }

    #[test]
    fn malformed_input_is_none() {
        assert_eq!(extract_skin_url("not-base64!"), None);
        // Valid base64, invalid JSON
        assert_eq!(extract_skin_url(&STANDARD.encode("{oops")), None);
    }
}
