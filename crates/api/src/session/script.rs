//! Canned CometD server for driving sessions in tests.

use cometd::{
    message::{self, Advice, Message, Reconnect},
    Error, Result, Transport,
};
use serde_json::Value;
use std::{collections::VecDeque, sync::Mutex};

#[derive(Default)]
pub struct Script {
    replies: Mutex<VecDeque<Result<Vec<Message>>>>,
    sent: Mutex<Vec<Message>>,
}

impl Script {
    pub fn new<I: IntoIterator<Item = Result<Vec<Message>>>>(replies: I) -> Self {
        Self { replies: Mutex::new(replies.into_iter().collect()), sent: Mutex::default() }
    }

    pub fn sent(&self) -> Vec<Message> {
        self.sent.lock().unwrap().clone()
    }

    /// Data of every message published on `channel`.
    pub fn published(&self, channel: &str) -> Vec<Value> {
        self.sent().into_iter().filter(|m| m.channel.as_ref() == channel).filter_map(|m| m.data).collect()
    }
}

impl Transport for &Script {
    async fn send(&self, batch: Vec<Message>) -> Result<Vec<Message>> {
        self.sent.lock().unwrap().extend(batch);
        self.replies.lock().unwrap().pop_front().unwrap_or(Err(Error::Transport))
    }
}

pub fn ok(channel: &str, id: u64) -> Message {
    Message { id: Some(id.to_string().into()), successful: Some(true), ..Message::new(channel) }
}

pub fn handshake(client: &str) -> Message {
    Message {
        client_id: Some(client.into()),
        supported_connection_types: Some(vec![message::LONG_POLLING.into()]),
        advice: Some(Advice { reconnect: Some(Reconnect::Retry), interval: Some(0), timeout: Some(30_000) }),
        ..ok(message::HANDSHAKE, 0)
    }
}

pub fn subscribed(id: u64, channel: &str) -> Message {
    Message { subscription: Some(channel.into()), ..ok(message::SUBSCRIBE, id) }
}

pub fn event(channel: &str, data: Value) -> Message {
    Message { data: Some(data), ..Message::new(channel) }
}

/// Replies for a complete login: handshake, connect, three subscriptions and the login publish (ids 0 to 5).
pub fn login() -> Vec<Result<Vec<Message>>> {
    Vec::from([
        Ok(vec![handshake("c1")]),
        Ok(vec![ok(message::CONNECT, 1)]),
        Ok(vec![subscribed(2, super::CONTROLLER)]),
        Ok(vec![subscribed(3, super::PLAYER)]),
        Ok(vec![subscribed(4, super::STATUS)]),
        Ok(vec![ok(super::CONTROLLER, 5)]),
    ])
}
