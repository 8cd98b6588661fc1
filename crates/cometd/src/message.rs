use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const META_PREFIX: &str = "/meta/";
pub const SERVICE_PREFIX: &str = "/service/";

pub const HANDSHAKE: &str = "/meta/handshake";
pub const CONNECT: &str = "/meta/connect";
pub const DISCONNECT: &str = "/meta/disconnect";
pub const SUBSCRIBE: &str = "/meta/subscribe";
pub const UNSUBSCRIBE: &str = "/meta/unsubscribe";

pub const VERSION: &str = "1.0";
pub const LONG_POLLING: &str = "long-polling";

/// What the server wants the client to do after a connect reply.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Reconnect {
    Retry,
    Handshake,
    None,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Advice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reconnect: Option<Reconnect>,
    /// Delay before the next connect, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u64>,
    /// How long the server may hold a connect request, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

/// A single Bayeux message. Requests and replies share the same shape.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub channel: Box<str>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_version: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supported_connection_types: Option<Vec<Box<str>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_type: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub successful: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advice: Option<Advice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<Value>,
}

impl Message {
    pub fn new(channel: &str) -> Self {
        Self { channel: channel.into(), ..Default::default() }
    }

    pub fn is_meta(&self) -> bool {
        self.channel.starts_with(META_PREFIX)
    }

    /// Messages pushed by the server rather than replies to our requests.
    pub fn is_event(&self) -> bool {
        !self.is_meta() && (!self.channel.starts_with(SERVICE_PREFIX) || self.id.is_none()) && self.data.is_some()
    }

    pub fn is_reply_to(&self, channel: &str, id: Option<&str>) -> bool {
        self.channel.as_ref() == channel && self.id.as_deref() == id && self.successful.is_some()
    }

    /// Replies without a `successful` field count as successful.
    pub fn is_failure(&self) -> bool {
        self.successful == Some(false)
    }

    /// Three-digit code at the start of the `error` field (e.g. `402::Unknown client`).
    pub fn error_code(&self) -> Option<u16> {
        let error = self.error.as_deref()?;
        let code = error.get(..3)?;
        if !code.bytes().all(|byte| byte.is_ascii_digit()) {
            return None;
        }
        code.parse().ok()
    }

    /// Description part of the `error` field, after the last colon.
    pub fn error_message(&self) -> Option<&str> {
        let error = self.error.as_deref()?;
        let (_, message) = error.rsplit_once(':')?;
        Some(message)
    }
}

#[cfg(test)]
mod tests {
    use super::{Advice, Message, Reconnect};
    use serde_json::json;

    #[test]
    fn omit_absent_fields() {
        let mut message = Message::new(super::SUBSCRIBE);
        message.id = Some("3".into());
        message.client_id = Some("abc".into());
        message.subscription = Some("/service/player".into());
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(
            value,
            json!({ "channel": "/meta/subscribe", "id": "3", "clientId": "abc", "subscription": "/service/player" })
        );
    }

    #[test]
    fn parse_reply_with_advice() {
        let message: Message = serde_json::from_value(json!({
            "channel": "/meta/connect",
            "id": "7",
            "successful": false,
            "error": "402::Unknown client",
            "advice": { "reconnect": "handshake", "interval": 500 }
        }))
        .unwrap();
        assert!(message.is_failure());
        assert!(message.is_reply_to("/meta/connect", Some("7")));
        assert!(!message.is_reply_to("/meta/connect", Some("8")));
        assert_eq!(message.error_code(), Some(402));
        assert_eq!(message.error_message(), Some("Unknown client"));
        assert_eq!(
            message.advice,
            Some(Advice { reconnect: Some(Reconnect::Handshake), interval: Some(500), timeout: None })
        );
    }

    #[test]
    fn classify_events() {
        let event = Message { data: Some(json!({ "id": 2 })), ..Message::new("/service/player") };
        assert!(event.is_event());

        let reply = Message { id: Some("4".into()), successful: Some(true), ..Message::new("/service/controller") };
        assert!(!reply.is_event());

        let echoed = Message { id: Some("4".into()), data: Some(json!({})), ..Message::new("/service/controller") };
        assert!(!echoed.is_event());

        let broadcast = Message { id: Some("9".into()), data: Some(json!(1)), ..Message::new("/status") };
        assert!(broadcast.is_event());

        let meta = Message { data: Some(json!({})), ..Message::new(super::CONNECT) };
        assert!(!meta.is_event());
        assert!(!Message::new(super::HANDSHAKE).is_failure());
    }
}
