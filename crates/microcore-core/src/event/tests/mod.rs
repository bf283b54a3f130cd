
#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::event::{EventMetadata, Envelope, METADATA_KEY, embed_metadata};

    fn metadata() -> EventMetadata {
        EventMetadata {
            correlation_id: "abc".to_string(),
            reply_to: "reply.ping.abc".to_string(),
        }
    }

    #[test]
    fn test_embed_metadata_into_object() {
        let payload = embed_metadata(json!({"v": 1}), &metadata());
        assert_eq!(payload["v"], 1);
        assert_eq!(payload[METADATA_KEY]["correlationId"], "abc");
        assert_eq!(payload[METADATA_KEY]["replyTo"], "reply.ping.abc");
    }

    #[test]
    fn test_embed_metadata_wraps_scalars_and_null() {
        let wrapped = embed_metadata(json!(42), &metadata());
        assert_eq!(wrapped["data"], 42);

        let empty = embed_metadata(serde_json::Value::Null, &metadata());
        let object = empty.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert!(object.contains_key(METADATA_KEY));
    }

    #[test]
    fn test_envelope_metadata_accessors() {
        let envelope = Envelope::new("ping", embed_metadata(json!({"q": "hi"}), &metadata()));
        assert_eq!(envelope.correlation_id().as_deref(), Some("abc"));
        assert_eq!(envelope.reply_to().as_deref(), Some("reply.ping.abc"));
        assert_eq!(envelope.body(), json!({"q": "hi"}));

        let plain = Envelope::new("x", json!({"v": 1}));
        assert!(plain.metadata().is_none());
        assert_eq!(plain.body(), json!({"v": 1}));
    }

    #[test]
    fn test_envelope_serializes_camel_case() {
        let envelope = Envelope::new("x", json!({"v": 1}));
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value, json!({"eventName": "x", "payload": {"v": 1}}));
    }
}
