//! Push payload parsing.
//!
//! Missing, empty or non-string fields take their configured default. A
//! payload that is absent, not JSON, or not a JSON object yields the default
//! notification.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Values used for any field a push payload leaves out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct NotificationDefaults {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub tag: String,
    pub url: String,
}

impl Default for NotificationDefaults {
    fn default() -> Self {
        Self {
            title: "Offgrid Alert".into(),
            body: "New alert received".into(),
            icon: "/icons/icon-192.png".into(),
            badge: "/icons/badge-72.png".into(),
            tag: "offgrid-notification".into(),
            url: "/".into(),
        }
    }
}

/// A notification ready for display. `data` holds the click target URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub tag: String,
    pub data: String,
}

/// Build a notification from an optional raw push payload.
pub fn parse_push(payload: Option<&[u8]>, defaults: &NotificationDefaults) -> Notification {
    let fields = match payload.map(serde_json::from_slice::<Value>) {
        Some(Ok(Value::Object(fields))) => fields,
        Some(Ok(other)) => {
            tracing::debug!(kind = json_kind(&other), "push payload is not an object, using defaults");
            Map::new()
        }
        Some(Err(e)) => {
            tracing::debug!(error = %e, "push payload is not valid JSON, using defaults");
            Map::new()
        }
        None => Map::new(),
    };

    let field = |name: &str, default: &str| -> String {
        match fields.get(name) {
            Some(Value::String(value)) if !value.is_empty() => value.clone(),
            _ => default.to_string(),
        }
    };

    Notification {
        title: field("title", &defaults.title),
        body: field("body", &defaults.body),
        icon: field("icon", &defaults.icon),
        badge: field("badge", &defaults.badge),
        tag: field("tag", &defaults.tag),
        data: field("url", &defaults.url),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> NotificationDefaults {
        NotificationDefaults::default()
    }

    #[test]
    fn test_absent_payload_uses_defaults() {
        let n = parse_push(None, &defaults());
        assert_eq!(n.title, "Offgrid Alert");
        assert_eq!(n.body, "New alert received");
        assert_eq!(n.tag, "offgrid-notification");
        assert_eq!(n.data, "/");
    }

    #[test]
    fn test_full_payload() {
        let payload = br#"{"title":"Storm","body":"Wind 90km/h","tag":"weather","url":"/alerts/7"}"#;
        let n = parse_push(Some(payload), &defaults());
        assert_eq!(n.title, "Storm");
        assert_eq!(n.body, "Wind 90km/h");
        assert_eq!(n.tag, "weather");
        assert_eq!(n.data, "/alerts/7");
        assert_eq!(n.icon, "/icons/icon-192.png");
        assert_eq!(n.badge, "/icons/badge-72.png");
    }

    #[test]
    fn test_icon_and_badge_overridable() {
        let payload = br#"{"icon":"/icons/storm.png","badge":"/icons/storm-badge.png"}"#;
        let n = parse_push(Some(payload), &defaults());
        assert_eq!(n.icon, "/icons/storm.png");
        assert_eq!(n.badge, "/icons/storm-badge.png");
        assert_eq!(n.title, "Offgrid Alert");
    }

    #[test]
    fn test_fields_default_individually() {
        let n = parse_push(Some(br#"{"title":"Only title","body":""}"#), &defaults());
        assert_eq!(n.title, "Only title");
        assert_eq!(n.body, "New alert received");
        assert_eq!(n.data, "/");
    }

    #[test]
    fn test_malformed_payload_uses_defaults() {
        let n = parse_push(Some(b"{not json"), &defaults());
        assert_eq!(n, parse_push(None, &defaults()));
    }

    #[test]
    fn test_non_object_payload_uses_defaults() {
        for payload in [&b"[1,2]"[..], &b"\"text\""[..], &b"null"[..], &b"42"[..]] {
            assert_eq!(parse_push(Some(payload), &defaults()), parse_push(None, &defaults()));
        }
    }

    #[test]
    fn test_wrong_field_types_use_defaults() {
        let n = parse_push(Some(br#"{"title":7,"url":{"path":"/x"}}"#), &defaults());
        assert_eq!(n.title, "Offgrid Alert");
        assert_eq!(n.data, "/");
    }

    #[test]
    fn test_configured_defaults() {
        let custom = NotificationDefaults { title: "Deploy".into(), ..Default::default() };
        assert_eq!(parse_push(None, &custom).title, "Deploy");
    }
}
