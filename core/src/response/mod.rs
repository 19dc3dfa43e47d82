//! Model output normalization
//!
//! Model responses arrive as plain text, raw bytes, content-block lists or
//! already-decoded JSON, frequently with stray prose around the JSON payload
//! and doubled-up escape sequences. `normalize` turns any of those shapes
//! into a JSON object, and it never fails: inputs that resist parsing come
//! back wrapped in a message envelope.

use serde_json::{json, Value};
use tracing::{debug, warn};

/// The shapes a model response can arrive in.
#[derive(Debug, Clone)]
pub enum RawOutput {
    Text(String),
    Bytes(Vec<u8>),
    Blocks(Vec<Value>),
    Value(Value),
}

/// Normalizes any raw model output into a JSON object.
pub fn normalize(raw: RawOutput) -> Value {
    let text = stringify(raw);
    let text = decode_unicode_escapes(&text);
    extract_json(&text)
}

fn stringify(raw: RawOutput) -> String {
    match raw {
        RawOutput::Text(text) => text,
        RawOutput::Bytes(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        RawOutput::Blocks(blocks) => {
            // Content-block lists carry the answer in the first block's text,
            // whether shaped {"text": ...} or {"type": "text", "text": ...}.
            match blocks.first().and_then(|b| b.get("text")).and_then(Value::as_str) {
                Some(text) => text.to_string(),
                None => Value::Array(blocks).to_string(),
            }
        }
        RawOutput::Value(value) => match value.get("text").and_then(Value::as_str) {
            Some(text) => text.to_string(),
            None => value.to_string(),
        },
    }
}

/// Resolves literal `\uXXXX` sequences, including surrogate pairs. Sequences
/// that do not decode are kept as-is.
fn decode_unicode_escapes(input: &str) -> String {
    if !input.contains("\\u") {
        return input.to_string();
    }

    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut pending_high: Option<u16> = None;
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '\\' && i + 5 < chars.len() && chars[i + 1] == 'u' {
            let hex: String = chars[i + 2..i + 6].iter().collect();
            if let Ok(code) = u16::from_str_radix(&hex, 16) {
                if (0xD800..0xDC00).contains(&code) {
                    pending_high = Some(code);
                    i += 6;
                    continue;
                }
                let decoded = match pending_high.take() {
                    Some(high) if (0xDC00..0xE000).contains(&code) => {
                        let combined = 0x10000
                            + (((high as u32) - 0xD800) << 10)
                            + ((code as u32) - 0xDC00);
                        char::from_u32(combined)
                    }
                    _ => char::from_u32(code as u32),
                };
                if let Some(c) = decoded {
                    out.push(c);
                    i += 6;
                    continue;
                }
            }
        }
        pending_high = None;
        out.push(chars[i]);
        i += 1;
    }

    out
}

/// Pulls the JSON object out of the text, or wraps the text in an envelope.
fn extract_json(text: &str) -> Value {
    let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) else {
        return json!({"message": text, "type": "agent_response"});
    };
    if end < start {
        return json!({"message": text, "type": "agent_response"});
    }

    let candidate = &text[start..=end];

    // Well-formed payloads parse as-is; the repair pass is a degraded mode
    // for output with broken escapes or embedded control characters.
    if let Ok(value) = serde_json::from_str::<Value>(candidate) {
        if value.is_object() {
            return value;
        }
    }

    let repaired = sanitize_json(candidate);
    match serde_json::from_str::<Value>(&repaired) {
        Ok(value) if value.is_object() => {
            warn!("model output required JSON repair");
            value
        }
        Ok(_) | Err(_) => {
            let sample: String = candidate.chars().take(200).collect();
            debug!(sample, "unparseable JSON payload");
            json!({
                "message": text,
                "type": "agent_response",
                "encoding_note": "JSON invalido na resposta",
            })
        }
    }
}

/// Strips control characters and invalid escape sequences.
fn sanitize_json(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let code = c as u32;
        // Control characters other than tab/newline/carriage return.
        if matches!(code, 0x00..=0x08 | 0x0b | 0x0c | 0x0e..=0x1f | 0x7f) {
            i += 1;
            continue;
        }
        if c == '\\' && i + 1 < chars.len() {
            match chars[i + 1] {
                // Single quotes never need escaping in JSON.
                '\'' => {
                    out.push('\'');
                    i += 2;
                    continue;
                }
                '"' => {
                    out.push('"');
                    i += 2;
                    continue;
                }
                next @ ('\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't') => {
                    out.push('\\');
                    out.push(next);
                    i += 2;
                    continue;
                }
                'u' if i + 5 < chars.len()
                    && chars[i + 2..i + 6].iter().all(|h| h.is_ascii_hexdigit()) =>
                {
                    out.extend(&chars[i..i + 6]);
                    i += 6;
                    continue;
                }
                _ => {
                    // Drop the stray backslash, keep what follows.
                    i += 1;
                    continue;
                }
            }
        }
        out.push(c);
        i += 1;
    }

    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_wrapped_in_the_envelope() {
        let value = normalize(RawOutput::Text("tudo certo por aqui".to_string()));

        assert_eq!(value["message"], "tudo certo por aqui");
        assert_eq!(value["type"], "agent_response");
    }

    #[test]
    fn embedded_json_is_extracted_from_surrounding_prose() {
        let value = normalize(RawOutput::Text(
            "Segue o resultado: {\"resposta\": \"tudo bem\"} espero ter ajudado".to_string(),
        ));

        assert_eq!(value["resposta"], "tudo bem");
    }

    #[test]
    fn unicode_escapes_are_decoded() {
        let value = normalize(RawOutput::Text(
            r#"{"resposta": "olá, tudo ótimo"}"#.to_string(),
        ));

        assert_eq!(value["resposta"], "olá, tudo ótimo");
    }

    #[test]
    fn bytes_are_decoded_lossily() {
        let mut bytes = br#"{"resposta": "ok"#.to_vec();
        bytes.push(0xFF);
        bytes.extend_from_slice(br#""}"#);

        let value = normalize(RawOutput::Bytes(bytes));
        assert!(value.is_object());
    }

    #[test]
    fn block_lists_use_the_first_text_block() {
        let blocks = vec![
            json!({"type": "text", "text": "{\"resposta\": \"primeiro\"}"}),
            json!({"type": "text", "text": "{\"resposta\": \"segundo\"}"}),
        ];

        let value = normalize(RawOutput::Blocks(blocks));
        assert_eq!(value["resposta"], "primeiro");
    }

    #[test]
    fn mappings_prefer_their_text_field() {
        let value = normalize(RawOutput::Value(
            json!({"text": "{\"resposta\": \"do campo text\"}", "stop_reason": "end"}),
        ));

        assert_eq!(value["resposta"], "do campo text");
    }

    #[test]
    fn broken_escapes_are_repaired() {
        let value = normalize(RawOutput::Text(
            r#"{"resposta": "it\'s fine", "extra": "a\qb"}"#.to_string(),
        ));

        assert_eq!(value["resposta"], "it's fine");
        assert_eq!(value["extra"], "aqb");
    }

    #[test]
    fn unrecoverable_json_falls_back_to_the_envelope() {
        let raw = "{\"resposta\": totalmente quebrado sem aspas}";
        let value = normalize(RawOutput::Text(raw.to_string()));

        assert_eq!(value["message"], raw);
        assert_eq!(value["type"], "agent_response");
        assert!(value.get("encoding_note").is_some());
    }

    #[test]
    fn control_characters_inside_json_are_stripped() {
        let raw = "{\"resposta\": \"linha\u{0001}limpa\"}".to_string();
        let value = normalize(RawOutput::Text(raw));

        assert_eq!(value["resposta"], "linhalimpa");
    }

    #[test]
    fn normalization_is_idempotent() {
        let inputs = vec![
            RawOutput::Text("sem json nenhum".to_string()),
            RawOutput::Text("{\"resposta\": \"ok\", \"itens\": [1, 2]}".to_string()),
            RawOutput::Text("{quebrado".to_string()),
        ];

        for input in inputs {
            let once = normalize(input);
            let twice = normalize(RawOutput::Value(once.clone()));
            assert_eq!(once, twice);
        }
    }
}
